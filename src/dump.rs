//! Format the parsed model for display (`draftgen --dump`).

use crate::ast::{Field, MessageSpec, Shape};

/// One line per message, then one indented line per field; group members nest one level deeper.
pub fn model_to_dump(messages: &[MessageSpec]) -> String {
    let mut lines = Vec::new();
    for message in messages {
        lines.push(format!(
            "{} ({}) type={:#x}",
            message.name, message.spec_name, message.wire_type_id
        ));
        for field in &message.fields {
            field_lines(field, 1, &mut lines);
        }
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn field_lines(field: &Field, indent: usize, lines: &mut Vec<String>) {
    let pad = "  ".repeat(indent);
    match &field.shape {
        Shape::Group { nested_fields } => {
            lines.push(format!("{}{}: {} [optional group]", pad, field.name, field.alias_name));
            for member in nested_fields {
                field_lines(member, indent + 1, lines);
            }
        }
        shape => lines.push(format!("{}{}{}", pad, field_summary(field), shape_suffix(shape))),
    }
}

/// `name: Alias = type (spec) = default`
pub fn field_summary(field: &Field) -> String {
    let mut s = format!(
        "{}: {} = {} ({})",
        field.name, field.alias_name, field.alias_type, field.spec_type
    );
    if let Some(default) = &field.default_value {
        s.push_str(&format!(" = {}", default));
    }
    s
}

fn shape_suffix(shape: &Shape) -> String {
    match shape {
        Shape::Repeated {
            size_field,
            variable_length,
        } => {
            let kind = if *variable_length {
                "repeated, variable-length"
            } else {
                "repeated"
            };
            format!(" [{}, size: {}]", kind, size_name(size_field.as_deref()))
        }
        Shape::VariableLength { size_field } => {
            format!(" [variable-length, size: {}]", size_name(size_field.as_deref()))
        }
        Shape::Scalar | Shape::Group { .. } => String::new(),
    }
}

fn size_name(size_field: Option<&Field>) -> &str {
    size_field.map_or("none", |f| f.alias_name.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::Assembler;
    use crate::resolve::TypeResolver;

    #[test]
    fn dumps_tree() {
        let text = "CLIENT_SETUP Message {\n  Type (i) = 0x40,\n  Number of Versions (i),\n  Versions (i) ...,\n  [Path Len (i),\n   Path (..)]\n  Extra (blob),\n}\n";
        let messages = Assembler::new(TypeResolver::new([("i", "u64"), ("Path", "bytes")]))
            .parse_messages(text)
            .expect("parse")
            .messages;
        let dump = model_to_dump(&messages);
        let lines: Vec<_> = dump.lines().collect();
        assert_eq!(lines[0], "ClientSetup (CLIENT_SETUP) type=0x40");
        assert_eq!(lines[1], "  type: Type = u64 (i) = 0x40");
        assert_eq!(lines[2], "  versions: Versions = [u64] (i) [repeated, size: NumberofVersions]");
        assert_eq!(lines[3], "  group_0: ClientSetup::Group_0 [optional group]");
        assert_eq!(lines[4], "    path: Path = bytes (..) [variable-length, size: PathLen]");
        assert!(lines[5].starts_with("  extra: Extra = <unresolved ClientSetup::Extra (blob)>"));
    }
}
