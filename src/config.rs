//! Generator configuration: base type table, discards, strictness and backend options.
//!
//! Loaded from TOML; every key is optional.
//!
//! ```toml
//! discards = ["type", "length"]
//! unresolved = "fail"
//!
//! [types]
//! "Track Name" = "quicr::Bytes"
//! "Subscribe::Status" = "quicr::messages::SubscribeStatus"
//!
//! [cpp]
//! namespace = "quicr::messages"
//! ```

use crate::error::GenError;
use crate::resolve::TypeResolver;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Built-in table for MoQT drafts: wire scalars plus the named MoQT types.
pub const MOQT_TYPES: &[(&str, &str)] = &[
    ("i", "std::uint64_t"),
    ("8", "std::uint8_t"),
    ("16", "std::uint16_t"),
    ("32", "std::uint32_t"),
    ("64", "std::uint64_t"),
    ("Start Group", "quicr::messages::GroupId"),
    ("End Group", "quicr::messages::GroupId"),
    ("Start Object", "quicr::messages::ObjectId"),
    ("End Object", "quicr::messages::ObjectId"),
    ("Track Namespace", "quicr::TrackNamespace"),
    ("Track Name", "quicr::Bytes"),
    ("Track Namespace Prefix", "quicr::TrackNamespace"),
    ("Subscribe Parameters", "quicr::messages::Parameter"),
    ("Setup Parameters", "quicr::messages::Parameter"),
    ("New Session URI", "quicr::Bytes"),
    ("Parameters", "quicr::messages::Parameter"),
    ("Reason Phrase", "quicr::Bytes"),
    ("Filter Type", "quicr::messages::FilterType"),
    ("Group Order", "quicr::messages::GroupOrder"),
    ("Fetch Type", "quicr::messages::FetchType"),
    ("SubscribeDone::StatusCode", "quicr::messages::SubscribeDoneStatusCode"),
    ("SubscribeError::ErrorCode", "quicr::messages::SubscribeErrorCode"),
    ("AnnounceError::ErrorCode", "quicr::messages::AnnounceErrorCode"),
    ("AnnounceCancel::ErrorCode", "quicr::messages::AnnounceErrorCode"),
    ("SubscribeAnnouncesError::ErrorCode", "quicr::messages::SubscribeAnnouncesErrorCode"),
    ("FetchError::ErrorCode", "quicr::messages::FetchErrorCode"),
    ("Start Location", "quicr::messages::Location"),
    ("End Location", "quicr::messages::Location"),
    ("Largest Location", "quicr::messages::Location"),
    ("Start", "quicr::messages::Location"),
    ("Largest", "quicr::messages::Location"),
];

/// What to do when a field resolves to a sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedPolicy {
    /// Embed the sentinel in the artifacts and carry on.
    #[default]
    Embed,
    /// Refuse to write artifacts.
    Fail,
}

/// Options of the C++ backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CppOptions {
    pub namespace: String,
    /// Include targets with their delimiters, e.g. `<vector>` or `"types.h"`.
    pub includes: Vec<String>,
    pub message_type_enum: String,
    /// Include line of the definitions file; defaults to the declarations file name.
    pub definitions_include: Option<String>,
}

impl Default for CppOptions {
    fn default() -> Self {
        CppOptions {
            namespace: "quicr::messages".to_string(),
            includes: [
                "\"ctrl_message_types.h\"",
                "<quicr/common.h>",
                "<quicr/track_name.h>",
                "<functional>",
                "<optional>",
                "<vector>",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            message_type_enum: "ControlMessageType".to_string(),
            definitions_include: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Extra lookup keys; override built-in entries with the same key.
    pub types: BTreeMap<String, String>,
    /// Start from an empty table instead of [`MOQT_TYPES`].
    pub replace_default_types: bool,
    /// Canonical names of structural fields that are never payload.
    pub discards: Vec<String>,
    pub unresolved: UnresolvedPolicy,
    pub cpp: CppOptions,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            types: BTreeMap::new(),
            replace_default_types: false,
            discards: vec!["type".to_string(), "length".to_string()],
            unresolved: UnresolvedPolicy::default(),
            cpp: CppOptions::default(),
        }
    }
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self, GenError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> Result<Self, GenError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml(&source).map_err(|e| match e {
            GenError::Config(msg) => GenError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Fresh resolver seeded with the effective base table.
    pub fn resolver(&self) -> TypeResolver {
        let base: &[(&str, &str)] = if self.replace_default_types {
            &[]
        } else {
            MOQT_TYPES
        };
        let mut resolver = TypeResolver::new(base.iter().copied());
        for (key, target) in &self.types {
            resolver.insert(key.as_str(), target.as_str());
        }
        resolver
    }
}
