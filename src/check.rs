//! Model checks run after assembly.
//!
//! ## Rules
//!
//! - **Duplicate wire type id**: two messages share an id and cannot be told apart on the wire.
//! - **Unresolved type**: a field fell through every lookup tier and carries a sentinel.
//!   A warning by default, an error under [`UnresolvedPolicy::Fail`].
//! - **Alias conflict**: one alias name is declared with two different types; the last
//!   one wins in the alias table.

use crate::ast::{AliasType, MessageSpec};
use crate::config::UnresolvedPolicy;
use std::collections::HashMap;

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Identifies which rule produced the finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckRule {
    DuplicateWireTypeId,
    UnresolvedType,
    AliasConflict,
}

impl CheckRule {
    pub fn id(self) -> &'static str {
        match self {
            CheckRule::DuplicateWireTypeId => "duplicate-wire-type-id",
            CheckRule::UnresolvedType => "unresolved-type",
            CheckRule::AliasConflict => "alias-conflict",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub rule: CheckRule,
    pub severity: Severity,
    /// Message the finding is about.
    pub message_name: String,
    pub text: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "{}: {}: {} [{}]",
            self.message_name,
            severity,
            self.text,
            self.rule.id()
        )
    }
}

/// Run all rules. Findings come in message order.
pub fn check(
    messages: &[MessageSpec],
    discards: &[String],
    policy: UnresolvedPolicy,
) -> Vec<Finding> {
    let mut out = Vec::new();
    let mut ids: HashMap<u64, &str> = HashMap::new();
    let mut alias_types: HashMap<&str, (&AliasType, &str)> = HashMap::new();
    let unresolved_severity = match policy {
        UnresolvedPolicy::Embed => Severity::Warning,
        UnresolvedPolicy::Fail => Severity::Error,
    };

    for message in messages {
        if let Some(first) = ids.insert(message.wire_type_id, message.name.as_str()) {
            out.push(Finding {
                rule: CheckRule::DuplicateWireTypeId,
                severity: Severity::Error,
                message_name: message.name.clone(),
                text: format!(
                    "wire type id {:#x} already used by {}",
                    message.wire_type_id, first
                ),
            });
        }

        for field in message.all_fields() {
            if field.resolved_type.is_unresolved() {
                out.push(Finding {
                    rule: CheckRule::UnresolvedType,
                    severity: unresolved_severity,
                    message_name: message.name.clone(),
                    text: format!(
                        "field `{}` ({}) has no type mapping",
                        field.spec_name, field.spec_type
                    ),
                });
            }
            if field.is_group() || discards.iter().any(|d| d.eq_ignore_ascii_case(&field.name)) {
                continue;
            }
            match alias_types.get(field.alias_name.as_str()) {
                Some((ty, owner)) if *ty != &field.alias_type => out.push(Finding {
                    rule: CheckRule::AliasConflict,
                    severity: Severity::Warning,
                    message_name: message.name.clone(),
                    text: format!(
                        "alias `{}` is {} here but {} in {}",
                        field.alias_name, field.alias_type, ty, owner
                    ),
                }),
                Some(_) => {}
                None => {
                    alias_types.insert(
                        field.alias_name.as_str(),
                        (&field.alias_type, message.name.as_str()),
                    );
                }
            }
        }
    }
    out
}

pub fn has_errors(findings: &[Finding]) -> bool {
    findings.iter().any(|f| f.severity == Severity::Error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::Assembler;
    use crate::resolve::TypeResolver;

    fn parse(text: &str) -> Vec<MessageSpec> {
        Assembler::new(TypeResolver::new([("i", "u64"), ("8", "u8")]))
            .parse_messages(text)
            .expect("parse")
            .messages
    }

    fn discards() -> Vec<String> {
        vec!["type".to_string(), "length".to_string()]
    }

    #[test]
    fn duplicate_wire_ids() {
        let messages = parse("A Message {\n Type (i) = 0x1,\n}\nB Message {\n Type (i) = 0x01,\n}\n");
        let findings = check(&messages, &discards(), UnresolvedPolicy::Embed);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, CheckRule::DuplicateWireTypeId);
        assert_eq!(findings[0].message_name, "B");
        assert!(has_errors(&findings));
    }

    #[test]
    fn unresolved_severity_follows_policy() {
        let messages = parse("A Message {\n Type (i) = 0x1,\n Blob (opaque),\n}\n");
        let embed = check(&messages, &discards(), UnresolvedPolicy::Embed);
        assert_eq!(embed.len(), 1);
        assert_eq!(embed[0].severity, Severity::Warning);
        assert!(!has_errors(&embed));
        let fail = check(&messages, &discards(), UnresolvedPolicy::Fail);
        assert_eq!(fail[0].severity, Severity::Error);
        assert!(fail[0].to_string().contains("unresolved-type"));
    }

    #[test]
    fn alias_conflict_is_a_warning() {
        let messages = parse("A Message {\n Type (i) = 0x1,\n Flags (i),\n}\nB Message {\n Type (i) = 0x2,\n Flags (8),\n}\n");
        let findings = check(&messages, &discards(), UnresolvedPolicy::Embed);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].rule, CheckRule::AliasConflict);
        assert_eq!(findings[0].severity, Severity::Warning);
    }

    #[test]
    fn clean_model_has_no_findings() {
        let messages = parse("A Message {\n Type (i) = 0x1,\n Flags (i),\n}\nB Message {\n Type (8) = 0x2,\n Flags (i),\n}\n");
        assert!(check(&messages, &discards(), UnresolvedPolicy::Fail).is_empty());
    }
}
