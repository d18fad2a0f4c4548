//! C++ backend: a header of aliases, message type enum and structs, and a source file
//! of stream operators.

use super::{Artifacts, Backend, Model};
use crate::ast::{AliasType, Field, MessageSpec, TypeRef};
use crate::config::CppOptions;

#[derive(Debug, Clone, Default)]
pub struct CppBackend {
    options: CppOptions,
}

impl CppBackend {
    pub fn new(options: CppOptions) -> Self {
        CppBackend { options }
    }

    pub fn options(&self) -> &CppOptions {
        &self.options
    }
}

/// Type text for a resolved type; a miss becomes an `#error` naming the lookup key.
pub fn cpp_type(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Known(t) => t.clone(),
        TypeRef::Unresolved(key) => format!("#error \"no type mapping for {}\"", key),
    }
}

pub fn cpp_alias_type(ty: &AliasType) -> String {
    match ty {
        AliasType::Plain(t) => cpp_type(t),
        AliasType::Container(t) => format!("std::vector<{}>", cpp_type(t)),
    }
}

fn enum_entry(message: &MessageSpec) -> String {
    format!("k{}", message.name)
}

fn callback_type(message: &MessageSpec) -> String {
    format!("std::function<void({}&)>", message.name)
}

/// `(i) ... >> Alias` style trailer for a stream statement.
fn field_comment(field: &Field, op: &str) -> String {
    let repeated = if field.is_repeated() { " ..." } else { "" };
    format!("// ({}){} {} {}", field.spec_type, repeated, op, field.alias_name)
}

/// Member declarations of a message: `(type, name)`. A group contributes its
/// callback and its optional value.
fn members(model: &Model<'_>, message: &MessageSpec) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for field in model.payload(&message.fields) {
        match &field.group_name {
            Some(group) if field.is_group() => {
                out.push((callback_type(message), format!("{}_cb", field.name)));
                out.push((
                    format!("std::optional<{}>", message.group_type(group)),
                    field.name.clone(),
                ));
            }
            _ => out.push((field.alias_name.clone(), field.name.clone())),
        }
    }
    out
}

/// Size type used for container counts: the elided size field's type when plain and known.
fn container_size_type(representative: &Field) -> String {
    match representative.size_field_type() {
        Some(AliasType::Plain(TypeRef::Known(t))) => t.clone(),
        _ => "std::uint64_t".to_string(),
    }
}

impl CppBackend {
    fn usings(&self, model: &Model<'_>) -> String {
        let mut code = String::from("\n    // usings\n");
        for (name, field) in &model.aliases.aliases {
            code.push_str(&format!(
                "    using {} = {};\n",
                name,
                cpp_alias_type(&field.alias_type)
            ));
        }
        code
    }

    fn enums(&self, model: &Model<'_>) -> String {
        let mut code = String::from("\n    // enums\n");
        code.push_str(&format!(
            "    enum class {} : uint64_t\n    {{\n",
            self.options.message_type_enum
        ));
        for message in &model.messages {
            code.push_str(&format!(
                "        {} = {:#x},\n",
                enum_entry(message),
                message.wire_type_id
            ));
        }
        code.push_str("    };\n");
        code
    }

    fn struct_declaration(&self, model: &Model<'_>, message: &MessageSpec) -> String {
        let name = &message.name;
        let mut code = format!("\n    /**\n     * @brief {}\n     */\n    struct {}\n    {{\n", name, name);

        if message.has_optional_groups() {
            code.push_str("      public:\n        // Optional Groups\n");
            for (group, fields) in &message.optional_groups {
                code.push_str(&format!("        struct {}\n        {{\n", group));
                for field in model.payload(fields) {
                    code.push_str(&format!("            {} {};\n", field.alias_name, field.name));
                }
                code.push_str("        };\n");
            }
            code.push('\n');
        }

        code.push_str("      public:\n");
        if message.has_optional_groups() {
            code.push_str("        // Have optionals - delete default constructor\n");
            code.push_str(&format!("        {}() = delete;\n", name));
        } else {
            code.push_str("        // Default constructor\n");
            code.push_str(&format!("        {}() {{}}\n", name));
        }

        let members = members(model, message);
        if !members.is_empty() {
            let open = format!("        {}(", name);
            let align = " ".repeat(open.len());
            let params: Vec<String> = members.iter().map(|(ty, n)| format!("{} {}", ty, n)).collect();
            code.push_str("\n        // All fields constructor\n");
            code.push_str(&open);
            code.push_str(&params.join(&format!(",\n{}", align)));
            code.push_str(")\n");
            for (i, (_, n)) in members.iter().enumerate() {
                let lead = if i == 0 { ":" } else { "," };
                code.push_str(&format!("          {} {}({})\n", lead, n, n));
            }
            code.push_str("        {\n        }\n");
        }

        if message.has_optional_groups() {
            let callbacks: Vec<String> = message
                .optional_groups
                .keys()
                .map(|g| format!("{} {}_cb", callback_type(message), g.to_lowercase()))
                .collect();
            code.push_str("\n        // Optional callback constructor\n");
            code.push_str(&format!("        {}({});\n", name, callbacks.join(", ")));
        }

        code.push_str("\n      public:\n");
        for (ty, n) in &members {
            code.push_str(&format!("        {} {};\n", ty, n));
        }
        code.push_str("    };\n\n");

        code.push_str(&format!("    Bytes& operator<<(Bytes& buffer, const {}& msg);\n", name));
        code.push_str(&format!("    BytesSpan operator>>(BytesSpan buffer, {}& msg);\n", name));
        for group in message.optional_groups.keys() {
            let group_type = message.group_type(group);
            code.push_str(&format!(
                "\n    Bytes& operator<<(Bytes& buffer, const std::optional<{}>& grp);\n",
                group_type
            ));
            code.push_str(&format!(
                "    BytesSpan operator>>(BytesSpan buffer, std::optional<{}>& grp);\n",
                group_type
            ));
        }
        code
    }

    fn declarations_footer(&self, model: &Model<'_>) -> String {
        let mut code = String::new();
        for container in model.aliases.containers.keys() {
            let ty = cpp_alias_type(container);
            code.push_str(&format!("\n    Bytes& operator<<(Bytes& buffer, const {}& vec);\n", ty));
            code.push_str(&format!("    BytesSpan operator>>(BytesSpan buffer, {}& vec);\n", ty));
        }
        code.push_str(&format!(
            "\n    Bytes& operator<<(Bytes& buffer, {} message_type);\n",
            self.options.message_type_enum
        ));
        code.push_str(&format!("\n}} // namespace {}\n", self.options.namespace));
        code
    }

    fn declarations(&self, model: &Model<'_>) -> String {
        let mut code = String::from("#pragma once\n");
        for include in &self.options.includes {
            code.push_str(&format!("#include {}\n", include));
        }
        code.push_str(&format!("\nnamespace {} {{\n", self.options.namespace));
        code.push_str(&self.usings(model));
        code.push_str(&self.enums(model));
        for message in &model.messages {
            code.push_str(&self.struct_declaration(model, message));
        }
        code.push_str(&self.declarations_footer(model));
        code
    }

    fn container_operators(&self, model: &Model<'_>) -> String {
        let mut code = String::from("    // usings\n");
        for (container, representative) in &model.aliases.containers {
            let ty = cpp_alias_type(container);
            let item = cpp_type(container.element());
            let size = container_size_type(representative);
            code.push_str(&format!(
                "    Bytes& operator<<(Bytes& buffer, const {ty}& vec)\n    {{\n        // write vector size\n        buffer << static_cast<{size}>(vec.size());\n\n        // write elements of vector\n        for (const auto& item : vec) {{\n            buffer << item;\n        }}\n\n        return buffer;\n    }}\n\n"
            ));
            code.push_str(&format!(
                "    BytesSpan operator>>(BytesSpan buffer, {ty}& vec)\n    {{\n        {size} size = 0;\n        buffer = buffer >> size;\n\n        for ({size} i = 0; i < size; i++) {{\n            {item} item;\n            buffer = buffer >> item;\n            vec.push_back(item);\n        }}\n\n        return buffer;\n    }}\n\n"
            ));
        }
        code
    }

    fn callback_constructor(&self, message: &MessageSpec) -> String {
        let name = &message.name;
        let groups: Vec<String> = message.optional_groups.keys().map(|g| g.to_lowercase()).collect();
        let params: Vec<String> = groups
            .iter()
            .map(|g| format!("            std::function<void ({}&)> {}_cb", name, g))
            .collect();
        let inits: Vec<String> = groups.iter().map(|g| format!("            {g}_cb({g}_cb)")).collect();
        format!(
            "    /*\n     * {name} stream in constructor\n     */\n    {name}::{name}(\n{}\n        ):\n{}\n    {{\n    }}\n\n",
            params.join(",\n"),
            inits.join(",\n"),
        )
    }

    fn stream_in(&self, model: &Model<'_>, message: &MessageSpec) -> String {
        let name = &message.name;
        let mut code = format!(
            "    /*\n     * {name} stream in\n     */\n    BytesSpan operator>>(BytesSpan buffer, {name}& msg)\n    {{\n"
        );
        for field in model.payload(&message.fields) {
            if field.is_group() {
                code.push_str(&format!(
                    "        if (msg.{n}_cb) {{ msg.{n}_cb(msg); }}\n",
                    n = field.name
                ));
            }
            code.push_str(&format!(
                "        buffer = buffer >> msg.{}; {}\n",
                field.name,
                field_comment(field, ">>")
            ));
        }
        code.push_str("        return buffer;\n    }\n\n");
        code
    }

    fn stream_out(&self, model: &Model<'_>, message: &MessageSpec) -> String {
        let name = &message.name;
        let mut code = format!(
            "    /*\n     * {name} stream out\n     */\n    Bytes& operator<<(Bytes& buffer, const {name}& msg)\n    {{\n        Bytes payload;\n        // fill out payload\n"
        );
        for field in model.payload(&message.fields) {
            code.push_str(&format!(
                "        payload << msg.{}; {}\n",
                field.name,
                field_comment(field, "<<")
            ));
        }
        code.push_str(&format!(
            "\n        // fill out buffer\n        buffer << static_cast<std::uint64_t>({}::{});\n        buffer << payload;\n        return buffer;\n    }}\n\n",
            self.options.message_type_enum,
            enum_entry(message)
        ));
        code
    }

    fn group_operators(&self, model: &Model<'_>, message: &MessageSpec) -> String {
        let mut code = String::new();
        for (group, fields) in &message.optional_groups {
            let group_type = message.group_type(group);
            code.push_str(&format!(
                "    BytesSpan operator>>(BytesSpan buffer, std::optional<{}>& grp)\n    {{\n        if (grp.has_value()) {{\n",
                group_type
            ));
            for field in model.payload(fields) {
                code.push_str(&format!(
                    "            buffer = buffer >> grp->{}; {}\n",
                    field.name,
                    field_comment(field, ">>")
                ));
            }
            code.push_str("        }\n        return buffer;\n    }\n\n");

            code.push_str(&format!(
                "    Bytes& operator<<(Bytes& buffer, const std::optional<{}>& grp)\n    {{\n        if (grp.has_value()) {{\n",
                group_type
            ));
            for field in model.payload(fields) {
                code.push_str(&format!(
                    "            buffer << grp->{}; {}\n",
                    field.name,
                    field_comment(field, "<<")
                ));
            }
            code.push_str("        }\n        return buffer;\n    }\n\n");
        }
        code
    }

    fn definitions(&self, model: &Model<'_>) -> String {
        let include = match &self.options.definitions_include {
            Some(include) => include.clone(),
            None => format!("\"{}.{}\"", model.base_name, self.declarations_extension()),
        };
        let mut code = format!("#include {}\n\nnamespace {} {{\n", include, self.options.namespace);
        code.push_str(&self.container_operators(model));
        for message in &model.messages {
            if message.has_optional_groups() {
                code.push_str(&self.callback_constructor(message));
            }
            code.push_str(&self.stream_in(model, message));
            code.push_str(&self.stream_out(model, message));
            code.push_str(&self.group_operators(model, message));
        }
        code.push_str(&format!(
            "    Bytes& operator<<(Bytes& buffer, {} message_type)\n    {{\n        UintVar varint = static_cast<std::uint64_t>(message_type);\n        buffer << varint;\n        return buffer;\n    }}\n\n}} // namespace {}\n",
            self.options.message_type_enum, self.options.namespace
        ));
        code
    }
}

impl Backend for CppBackend {
    fn declarations_extension(&self) -> &str {
        "h"
    }

    fn definitions_extension(&self) -> &str {
        "cpp"
    }

    fn render(&self, model: &Model<'_>) -> Artifacts {
        Artifacts {
            declarations: self.declarations(model),
            definitions: self.definitions(model),
        }
    }
}
