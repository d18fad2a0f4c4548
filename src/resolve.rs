//! Type resolution: map a field to a target type through a growing lookup table.

use crate::ast::TypeRef;
use std::collections::HashMap;

/// Outcome of one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub ty: TypeRef,
    /// The `Message::Field` key matched; the alias name must carry the message prefix.
    pub qualified: bool,
}

/// Lookup table owned by one parse session.
///
/// Seeded with a caller-supplied base mapping; grows with each optional group the
/// assembler closes so later references to `Message::Group_n` resolve to themselves.
#[derive(Debug, Clone, Default)]
pub struct TypeResolver {
    table: HashMap<String, String>,
}

/// `Message::FieldLabel`, with whitespace removed from the label.
pub fn qualified_key(message_name: &str, field_name: &str) -> String {
    let compact: String = field_name.split_whitespace().collect();
    format!("{}::{}", message_name, compact)
}

impl TypeResolver {
    pub fn new<I, K, V>(base: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        TypeResolver {
            table: base
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// First hit wins: qualified `Message::Field`, bare field label, then the spec type token.
    /// A miss yields [`TypeRef::Unresolved`] naming the field and its type token.
    pub fn resolve(&self, message_name: &str, field_name: &str, spec_type: &str) -> Resolution {
        if let Some(t) = self.table.get(&qualified_key(message_name, field_name)) {
            return Resolution {
                ty: TypeRef::Known(t.clone()),
                qualified: true,
            };
        }
        let found = self
            .table
            .get(field_name)
            .or_else(|| self.table.get(spec_type));
        let ty = match found {
            Some(t) => TypeRef::Known(t.clone()),
            None => TypeRef::Unresolved(format!("{}::{} ({})", message_name, field_name, spec_type)),
        };
        Resolution {
            ty,
            qualified: false,
        }
    }

    /// Add a self-mapping so `type_name` resolves to itself.
    pub fn register(&mut self, type_name: &str) {
        self.table
            .insert(type_name.to_string(), type_name.to_string());
    }

    pub fn insert(&mut self, key: impl Into<String>, target: impl Into<String>) {
        self.table.insert(key.into(), target.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
