//! Alias aggregation across all messages: one declaration per alias name, in first-seen order.

use crate::ast::{AliasType, Field, MessageSpec};
use indexmap::IndexMap;

/// Aggregated alias declarations for a whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasTable {
    /// Alias name -> field. Position is the first time the name was seen;
    /// the value is the last field that carried it.
    pub aliases: IndexMap<String, Field>,
    /// Container alias type -> representative field, for every repeated alias.
    pub containers: IndexMap<AliasType, Field>,
}

impl AliasTable {
    /// Build both tables. Fields whose canonical name is in `discards` are structural
    /// and never aliased. Optional top-level fields are skipped, but group members are
    /// always included since the group declarations refer to them.
    pub fn aggregate(messages: &[MessageSpec], discards: &[String]) -> Self {
        let discarded = |f: &Field| discards.iter().any(|d| d.eq_ignore_ascii_case(&f.name));

        let mut aliases = IndexMap::new();
        for message in messages {
            for field in &message.fields {
                for member in field.nested_fields() {
                    if !discarded(member) {
                        aliases.insert(member.alias_name.clone(), member.clone());
                    }
                }
                if !discarded(field) && !field.is_optional {
                    aliases.insert(field.alias_name.clone(), field.clone());
                }
            }
        }

        let mut containers = IndexMap::new();
        for field in aliases.values() {
            if field.is_repeated() {
                containers.insert(field.alias_type.clone(), field.clone());
            }
        }

        AliasTable {
            aliases,
            containers,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
