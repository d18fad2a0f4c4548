//! Message assembly: drive the field grammar over each block, track optional groups,
//! elide size fields and pick up the wire type id.

use crate::ast::{AliasType, Block, Field, MessageSpec, Shape, TypeRef};
use crate::error::GenError;
use crate::parser::{extract_blocks, parse_field_decl, split_declarations};
use crate::resolve::TypeResolver;
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Canonical name of the field carrying the wire type id.
pub const TYPE_FIELD: &str = "type";

/// Messages that survived assembly, plus the labels of blocks that were dropped.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub messages: Vec<MessageSpec>,
    pub dropped: Vec<String>,
}

/// A field parsed from one declaration, before size-field elision decides its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// Always [`Shape::Scalar`] until elided into its final shape.
    pub field: Field,
    pub repeated: bool,
    pub variable_length: bool,
}

struct OpenGroup {
    name: String,
    fields: Vec<Field>,
}

/// One parse session. Owns the type resolver for the duration of the run.
#[derive(Debug, Clone)]
pub struct Assembler {
    resolver: TypeResolver,
}

impl Assembler {
    pub fn new(resolver: TypeResolver) -> Self {
        Assembler { resolver }
    }

    pub fn resolver(&self) -> &TypeResolver {
        &self.resolver
    }

    pub fn into_resolver(self) -> TypeResolver {
        self.resolver
    }

    /// Parse every block in `text`. Blocks without a wire type id are dropped and reported.
    pub fn parse_messages(&mut self, text: &str) -> Result<ParseOutcome, GenError> {
        let mut outcome = ParseOutcome::default();
        for block in extract_blocks(text)? {
            match self.assemble(&block) {
                Some(message) => outcome.messages.push(message),
                None => outcome.dropped.push(block.name.trim().to_string()),
            }
        }
        Ok(outcome)
    }

    /// Parse one declaration of `message_name`. `None` when it is not a field.
    pub fn parse_field(
        &self,
        message_name: &str,
        line: &str,
        group_name: Option<&str>,
    ) -> Option<ParsedLine> {
        let decl = parse_field_decl(line)?;
        let resolution = self
            .resolver
            .resolve(message_name, &decl.label, &decl.spec_type);
        if resolution.ty.is_unresolved() {
            warn!(
                message = message_name,
                field = %decl.label,
                spec_type = %decl.spec_type,
                "no type mapping, embedding sentinel"
            );
        }

        let compact: String = decl.label.split_whitespace().collect();
        let alias_name = if resolution.qualified {
            format!("{}{}", message_name, compact)
        } else {
            compact
        };
        let alias_type = if decl.repeated {
            AliasType::Container(resolution.ty.clone())
        } else {
            AliasType::Plain(resolution.ty.clone())
        };

        let field = Field {
            name: decl.label.to_lowercase().replace(' ', "_"),
            spec_name: decl.label,
            length: decl.spec_type.parse().ok(),
            spec_type: decl.spec_type,
            resolved_type: resolution.ty,
            alias_name,
            alias_type,
            default_value: decl.default_value,
            is_optional: decl.opens_group || group_name.is_some(),
            group_name: group_name.map(str::to_string),
            shape: Shape::Scalar,
        };
        Some(ParsedLine {
            field,
            repeated: decl.repeated,
            variable_length: decl.variable_length,
        })
    }

    /// Assemble one block. `None` when the block has no usable `Type` field.
    pub fn assemble(&mut self, block: &Block<'_>) -> Option<MessageSpec> {
        let spec_name = block.name.trim();
        let name = message_name(spec_name);
        debug!(message = %name, line = block.line, "assembling block");

        let mut fields = Vec::new();
        let mut optional_groups = IndexMap::new();
        let mut wire_type_id = None;
        let mut open: Option<OpenGroup> = None;

        for decl in block.body.lines().flat_map(split_declarations) {
            let mut content = decl;
            if let Some(rest) = content.strip_prefix('[') {
                if open.is_none() {
                    open = Some(OpenGroup {
                        name: format!("Group_{}", optional_groups.len()),
                        fields: Vec::new(),
                    });
                }
                content = rest.trim_start();
            }

            let Some(group) = open.as_mut() else {
                let Some(parsed) = self.parse_field(&name, content, None) else {
                    continue;
                };
                if parsed.field.name == TYPE_FIELD {
                    match parsed.field.default_value.as_deref().and_then(parse_wire_type_id) {
                        Some(id) => wire_type_id = Some(id),
                        None => warn!(
                            message = %name,
                            value = ?parsed.field.default_value,
                            "type field has no hexadecimal default"
                        ),
                    }
                }
                push_elided(&mut fields, parsed, &name);
                continue;
            };

            let (body, closes) = match content.strip_suffix(']') {
                Some(body) => (body.trim_end(), true),
                None => (content, false),
            };
            if !body.is_empty() {
                if let Some(parsed) = self.parse_field(&name, body, Some(&group.name)) {
                    push_elided(&mut group.fields, parsed, &name);
                }
            }
            if closes {
                if let Some(group) = open.take() {
                    self.close_group(&name, group, &mut fields, &mut optional_groups);
                }
            }
        }

        if let Some(group) = open.take() {
            warn!(message = %name, group = %group.name, "optional group not closed before end of block");
            self.close_group(&name, group, &mut fields, &mut optional_groups);
        }

        let Some(wire_type_id) = wire_type_id else {
            warn!(message = %name, line = block.line, "dropping message without wire type id");
            return None;
        };
        Some(MessageSpec {
            name,
            spec_name: spec_name.to_string(),
            wire_type_id,
            fields,
            optional_groups,
        })
    }

    fn close_group(
        &mut self,
        message_name: &str,
        group: OpenGroup,
        fields: &mut Vec<Field>,
        optional_groups: &mut IndexMap<String, Vec<Field>>,
    ) {
        let group_type = format!("{}::{}", message_name, group.name);
        debug!(group = %group_type, members = group.fields.len(), "closing optional group");
        fields.push(Field {
            name: group.name.to_lowercase(),
            spec_name: group.name.clone(),
            spec_type: "optional group".to_string(),
            resolved_type: TypeRef::Known(group_type.clone()),
            alias_name: group_type.clone(),
            alias_type: AliasType::Plain(TypeRef::Known(group_type.clone())),
            length: None,
            default_value: None,
            is_optional: true,
            group_name: Some(group.name.clone()),
            shape: Shape::Group {
                nested_fields: group.fields.clone(),
            },
        });
        self.resolver.register(&group_type);
        optional_groups.insert(group.name, group.fields);
    }
}

/// Append `parsed` to `seq`. A repeated or variable-length field consumes the
/// preceding sibling as its size field; without one it keeps no size field.
fn push_elided(seq: &mut Vec<Field>, parsed: ParsedLine, message_name: &str) {
    let ParsedLine {
        mut field,
        repeated,
        variable_length,
    } = parsed;
    if repeated || variable_length {
        let size_field = seq.pop().map(Box::new);
        if size_field.is_none() {
            warn!(
                message = message_name,
                field = %field.spec_name,
                "repeated or variable-length field has no preceding size field"
            );
        }
        field.shape = if repeated {
            Shape::Repeated {
                size_field,
                variable_length,
            }
        } else {
            Shape::VariableLength { size_field }
        };
    }
    seq.push(field);
}

/// `SUBSCRIBE_UPDATE` -> `SubscribeUpdate`: title-case each word, drop `_` and whitespace.
pub fn message_name(spec_name: &str) -> String {
    let mut out = String::with_capacity(spec_name.len());
    let mut prev_alpha = false;
    for c in spec_name.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            prev_alpha = false;
            if c != '_' && !c.is_whitespace() {
                out.push(c);
            }
        }
    }
    out
}

/// Hexadecimal with optional `0x`/`0X` prefix.
pub fn parse_wire_type_id(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    u64::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assembler() -> Assembler {
        Assembler::new(TypeResolver::new([
            ("i", "std::uint64_t"),
            ("8", "std::uint8_t"),
            ("16", "std::uint16_t"),
            ("Track Namespace", "quicr::TrackNamespace"),
            ("Parameters", "quicr::messages::Parameter"),
        ]))
    }

    #[test]
    fn title_cases_message_names() {
        assert_eq!(message_name("SUBSCRIBE_UPDATE"), "SubscribeUpdate");
        assert_eq!(message_name("MAX_SUBSCRIBE_ID"), "MaxSubscribeId");
        assert_eq!(message_name("Track Status"), "TrackStatus");
        assert_eq!(message_name("ExampleThing"), "Examplething");
    }

    #[test]
    fn wire_type_id_is_hex() {
        assert_eq!(parse_wire_type_id("0x05"), Some(5));
        assert_eq!(parse_wire_type_id("0X1a"), Some(26));
        assert_eq!(parse_wire_type_id("10"), Some(16));
        assert_eq!(parse_wire_type_id("zz"), None);
    }

    #[test]
    fn spec_example_block() {
        let text = "ExampleThing Message {\n  Type (8) = 0x05,\n  Track Namespace (tuple),\n}\n";
        let outcome = assembler().parse_messages(text).expect("parse");
        assert_eq!(outcome.messages.len(), 1);
        let m = &outcome.messages[0];
        assert_eq!(m.spec_name, "ExampleThing");
        assert_eq!(m.wire_type_id, 5);
        assert_eq!(m.fields.len(), 2);
        assert_eq!(m.fields[0].length, Some(8));
        assert_eq!(m.fields[1].name, "track_namespace");
        assert_eq!(m.fields[1].alias_name, "TrackNamespace");
        assert_eq!(
            m.fields[1].resolved_type,
            TypeRef::Known("quicr::TrackNamespace".into())
        );
    }

    #[test]
    fn repeated_field_elides_size_field() {
        let text = "SETUP Message {\n  Type (i) = 0x40,\n  Number of Parameters (i),\n  Parameters (..) ...,\n}\n";
        let outcome = assembler().parse_messages(text).expect("parse");
        let m = &outcome.messages[0];
        assert_eq!(m.fields.len(), 2);
        let params = &m.fields[1];
        assert!(params.is_repeated());
        assert!(params.is_variable_length());
        assert_eq!(
            params.size_field_type(),
            Some(&AliasType::Plain(TypeRef::Known("std::uint64_t".into())))
        );
        assert_eq!(
            params.alias_type,
            AliasType::Container(TypeRef::Known("quicr::messages::Parameter".into()))
        );
    }

    #[test]
    fn group_spanning_lines() {
        let text = "FETCH Message {\n  Type (i) = 0x16,\n  [Start Group (i),\n   Start Object (i)]\n  End Group (i),\n}\n";
        let mut a = assembler();
        let outcome = a.parse_messages(text).expect("parse");
        let m = &outcome.messages[0];
        assert_eq!(m.fields.len(), 3);
        let group = &m.fields[1];
        assert!(group.is_group() && group.is_optional);
        assert_eq!(group.alias_name, "Fetch::Group_0");
        let members = group.nested_fields();
        assert_eq!(members.len(), 2);
        assert!(members.iter().all(|f| f.is_optional));
        assert_eq!(members[1].group_name.as_deref(), Some("Group_0"));
        assert_eq!(m.optional_groups["Group_0"].len(), 2);
        assert!(a.resolver().contains("Fetch::Group_0"));
    }

    #[test]
    fn group_on_one_line_with_repetition() {
        let text = "M Message {\n  Type (i) = 0x1,\n  [ A (i) = 1, B (i) ... ]\n}\n";
        let outcome = assembler().parse_messages(text).expect("parse");
        let m = &outcome.messages[0];
        let group = &m.fields[1];
        let members = group.nested_fields();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].spec_name, "B");
        assert!(members[0].is_repeated());
        let size = members[0].size_field().expect("size field");
        assert_eq!(size.spec_name, "A");
        assert_eq!(size.default_value.as_deref(), Some("1"));
        assert_eq!(members[0].size_field_type(), Some(&size.alias_type));
    }

    #[test]
    fn second_group_gets_next_index() {
        let text = "M Message {\n  Type (i) = 0x1,\n  [A (i)]\n  [B (i)]\n}\n";
        let outcome = assembler().parse_messages(text).expect("parse");
        let names: Vec<_> = outcome.messages[0].optional_groups.keys().cloned().collect();
        assert_eq!(names, vec!["Group_0", "Group_1"]);
    }

    #[test]
    fn unterminated_group_is_closed_at_end() {
        let text = "M Message {\n  Type (i) = 0x1,\n  [A (i),\n  B (i)\n}\n";
        let outcome = assembler().parse_messages(text).expect("parse");
        let m = &outcome.messages[0];
        assert_eq!(m.fields.len(), 2);
        assert_eq!(m.fields[1].nested_fields().len(), 2);
    }

    #[test]
    fn message_without_type_is_dropped() {
        let text = "BROKEN Message {\n  Request ID (i),\n}\nOK Message {\n  Type (i) = 0x2,\n}\n";
        let outcome = assembler().parse_messages(text).expect("parse");
        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(outcome.messages[0].name, "Ok");
        assert_eq!(outcome.dropped, vec!["BROKEN".to_string()]);
    }

    #[test]
    fn repeated_without_predecessor_keeps_no_size_field() {
        let text = "M Message {\n  Items (i) ...,\n  Type (i) = 0x3,\n}\n";
        let outcome = assembler().parse_messages(text).expect("parse");
        let m = &outcome.messages[0];
        assert_eq!(m.fields.len(), 2);
        assert_eq!(m.fields[0].name, "items");
        assert!(m.fields[0].is_repeated());
        assert!(m.fields[0].size_field().is_none());
        assert_eq!(m.fields[1].name, "type");
    }

    #[test]
    fn repeated_first_group_member_is_kept() {
        let text = "ExampleThing Message {\n  Type (8) = 0x05,\n  Track Namespace (tuple),\n  [ Optional Thing (i) = 1 ... ]\n}\n";
        let outcome = assembler().parse_messages(text).expect("parse");
        let m = &outcome.messages[0];
        assert_eq!(m.fields.len(), 3);
        let members = m.fields[2].nested_fields();
        assert_eq!(members.len(), 1);
        let thing = &members[0];
        assert_eq!(thing.name, "optional_thing");
        assert_eq!(thing.default_value.as_deref(), Some("1"));
        assert!(thing.is_repeated() && thing.is_optional);
        assert!(thing.size_field_type().is_none());
        assert_eq!(
            thing.alias_type,
            AliasType::Container(TypeRef::Known("std::uint64_t".into()))
        );
    }

    #[test]
    fn prose_lines_are_skipped() {
        let text = "M Message {\n  Type (i) = 0x3,\n  this line is noise\n  Request ID (i),\n}\n";
        let outcome = assembler().parse_messages(text).expect("parse");
        assert_eq!(outcome.messages[0].fields.len(), 2);
    }
}
