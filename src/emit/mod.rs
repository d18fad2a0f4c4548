//! Emission: render the assembled model into a declarations and a definitions artifact.
//!
//! Parsing, resolution and aggregation know nothing about the target language; a
//! [`Backend`] turns the finished [`Model`] into text. [`cpp::CppBackend`] is the only
//! backend today.

pub mod cpp;

use crate::alias::AliasTable;
use crate::ast::{Field, MessageSpec};

/// Everything a backend may read. Messages are ordered by ascending wire type id.
#[derive(Debug, Clone)]
pub struct Model<'a> {
    pub messages: Vec<&'a MessageSpec>,
    pub aliases: &'a AliasTable,
    pub discards: &'a [String],
    /// File stem the artifacts will be written under.
    pub base_name: &'a str,
}

impl<'a> Model<'a> {
    pub fn new(
        messages: &'a [MessageSpec],
        aliases: &'a AliasTable,
        discards: &'a [String],
        base_name: &'a str,
    ) -> Self {
        let mut sorted: Vec<&MessageSpec> = messages.iter().collect();
        sorted.sort_by_key(|m| m.wire_type_id);
        Model {
            messages: sorted,
            aliases,
            discards,
            base_name,
        }
    }

    pub fn is_discarded(&self, field: &Field) -> bool {
        self.discards
            .iter()
            .any(|d| d.eq_ignore_ascii_case(&field.name))
    }

    /// Fields that become members, in parse order.
    pub fn payload<'f>(&'f self, fields: &'f [Field]) -> impl Iterator<Item = &'f Field> + 'f {
        fields.iter().filter(move |f| !self.is_discarded(f))
    }
}

/// The two rendered artifacts of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub declarations: String,
    pub definitions: String,
}

/// A target language.
pub trait Backend {
    /// File extension of the declarations artifact, without the dot.
    fn declarations_extension(&self) -> &str;
    /// File extension of the definitions artifact, without the dot.
    fn definitions_extension(&self) -> &str;
    /// Render both artifacts. Must be a pure function of `model`.
    fn render(&self, model: &Model<'_>) -> Artifacts;
}

/// Render `messages` with `backend`.
pub fn emit(
    backend: &dyn Backend,
    messages: &[MessageSpec],
    aliases: &AliasTable,
    discards: &[String],
    base_name: &str,
) -> Artifacts {
    backend.render(&Model::new(messages, aliases, discards, base_name))
}
