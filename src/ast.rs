//! Typed model of a draft: messages, fields and the types they resolve to.

use indexmap::IndexMap;
use std::fmt;

/// One `Name Message { ... }` region of the draft text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block<'a> {
    /// Label before `Message`, as written (e.g. `SUBSCRIBE_UPDATE`).
    pub name: &'a str,
    /// Text between the braces.
    pub body: &'a str,
    /// 1-based line of the block header in the draft.
    pub line: usize,
}

/// Target type chosen for a field by the type resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Known(String),
    /// No lookup tier matched. Carries the failed key so the sentinel names it.
    Unresolved(String),
}

impl TypeRef {
    pub fn is_unresolved(&self) -> bool {
        matches!(self, TypeRef::Unresolved(_))
    }

    pub fn as_known(&self) -> Option<&str> {
        match self {
            TypeRef::Known(t) => Some(t),
            TypeRef::Unresolved(_) => None,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Known(t) => f.write_str(t),
            TypeRef::Unresolved(key) => write!(f, "<unresolved {}>", key),
        }
    }
}

/// Declaration-facing type of a field: plain, or wrapped in a container when repeated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AliasType {
    Plain(TypeRef),
    Container(TypeRef),
}

impl AliasType {
    /// Element type (the resolved type itself for plain aliases).
    pub fn element(&self) -> &TypeRef {
        match self {
            AliasType::Plain(t) | AliasType::Container(t) => t,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, AliasType::Container(_))
    }
}

impl fmt::Display for AliasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AliasType::Plain(t) => write!(f, "{}", t),
            AliasType::Container(t) => write!(f, "[{}]", t),
        }
    }
}

/// How a field occupies the wire.
///
/// Repeated and variable-length fields own the sibling that preceded them in the
/// draft: that field is their implicit count/length prefix. It is `None` only when
/// nothing preceded them in their sequence (e.g. first member of a group).
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Scalar,
    /// `...` marker. `variable_length` is set when the type token was also `..`.
    Repeated {
        size_field: Option<Box<Field>>,
        variable_length: bool,
    },
    /// `(..)` type token without repetition.
    VariableLength { size_field: Option<Box<Field>> },
    /// Synthetic aggregate for a bracketed optional group.
    Group { nested_fields: Vec<Field> },
}

/// One parsed datum of a message or group.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Canonical identifier: lower-case words joined by `_`.
    pub name: String,
    /// Label as written in the draft.
    pub spec_name: String,
    /// Type token as written in the draft (`i`, `8`, `..`, `tuple`, ...).
    pub spec_type: String,
    pub resolved_type: TypeRef,
    /// Name used in alias declarations (message-prefixed on a qualified type match).
    pub alias_name: String,
    pub alias_type: AliasType,
    /// Bit width when the type token is a decimal integer.
    pub length: Option<u32>,
    pub default_value: Option<String>,
    pub is_optional: bool,
    /// Set when the field lives inside an optional group.
    pub group_name: Option<String>,
    pub shape: Shape,
}

impl Field {
    pub fn is_repeated(&self) -> bool {
        matches!(self.shape, Shape::Repeated { .. })
    }

    pub fn is_variable_length(&self) -> bool {
        matches!(
            self.shape,
            Shape::VariableLength { .. }
                | Shape::Repeated {
                    variable_length: true,
                    ..
                }
        )
    }

    pub fn is_group(&self) -> bool {
        matches!(self.shape, Shape::Group { .. })
    }

    /// The elided count/length prefix of a repeated or variable-length field.
    pub fn size_field(&self) -> Option<&Field> {
        match &self.shape {
            Shape::Repeated { size_field, .. } | Shape::VariableLength { size_field } => {
                size_field.as_deref()
            }
            _ => None,
        }
    }

    /// Alias type of the elided size field.
    pub fn size_field_type(&self) -> Option<&AliasType> {
        self.size_field().map(|f| &f.alias_type)
    }

    /// Members of a group aggregate; empty for every other shape.
    pub fn nested_fields(&self) -> &[Field] {
        match &self.shape {
            Shape::Group { nested_fields } => nested_fields,
            _ => &[],
        }
    }
}

/// One message definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSpec {
    /// Title-cased identifier (`SubscribeUpdate`).
    pub name: String,
    /// Label as written in the draft (`SUBSCRIBE_UPDATE`).
    pub spec_name: String,
    pub wire_type_id: u64,
    /// Flat field sequence; each optional group is one aggregate entry.
    pub fields: Vec<Field>,
    /// Group name -> member fields.
    pub optional_groups: IndexMap<String, Vec<Field>>,
}

impl MessageSpec {
    pub fn has_optional_groups(&self) -> bool {
        !self.optional_groups.is_empty()
    }

    /// Fully qualified type of one of this message's groups (`Subscribe::Group_0`).
    pub fn group_type(&self, group: &str) -> String {
        format!("{}::{}", self.name, group)
    }

    /// Every field including group members, in declaration order.
    pub fn all_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields
            .iter()
            .flat_map(|f| std::iter::once(f).chain(f.nested_fields().iter()))
    }
}
