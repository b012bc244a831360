//! The decoded object graph.
//!
//! A [`Tag`] owns one root [`Record`]; records own their values, and block
//! values own their element records. The graph is a plain tree so it can be
//! built by collaborators, compared, and serialized to JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{TagError, TagResult};
use crate::group::GroupCode;
use crate::header::TagHeader;
use crate::schema::TagGroupDef;
use crate::version::NULL_SALT;

/// A decoded field value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Int(i64),
    Real(f32),
    /// Degrees.
    Angle(f32),
    Point2([f32; 2]),
    Point3([f32; 3]),
    /// Degrees per component.
    Euler2([f32; 2]),
    /// Degrees per component.
    Euler3([f32; 3]),
    Bounds([f32; 2]),
    Rgb([f32; 3]),
    /// `[r, g, b, a]`, whatever the on-disk order.
    Rgba([f32; 4]),
    /// Raw enum value; option names live in the schema.
    Enum(i64),
    /// Raw flag bits; bit names live in the schema.
    Flags(u64),
    Text(String),
    Block(Vec<Record>),
    Reference(TagReference),
    Data(Vec<u8>),
}

impl Value {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Real(_) => "real",
            Value::Angle(_) => "angle",
            Value::Point2(_) => "point2",
            Value::Point3(_) => "point3",
            Value::Euler2(_) => "euler2",
            Value::Euler3(_) => "euler3",
            Value::Bounds(_) => "bounds",
            Value::Rgb(_) => "rgb",
            Value::Rgba(_) => "rgba",
            Value::Enum(_) => "enum",
            Value::Flags(_) => "flags",
            Value::Text(_) => "text",
            Value::Block(_) => "block",
            Value::Reference(_) => "reference",
            Value::Data(_) => "data",
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) | Value::Enum(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_real(&self) -> Option<f32> {
        match self {
            Value::Real(value) | Value::Angle(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_flags(&self) -> Option<u64> {
        match self {
            Value::Flags(bits) => Some(*bits),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&[Record]> {
        match self {
            Value::Block(elements) => Some(elements),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&TagReference> {
        match self {
            Value::Reference(reference) => Some(reference),
            _ => None,
        }
    }
}

/// One schema-described record: field name to value.
///
/// Padding never appears here. Field order is owned by the schema, so the map
/// is ordered by name only for stable output.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Record::insert`].
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_int)
    }

    pub fn real(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(Value::as_real)
    }

    pub fn flags(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_flags)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_text)
    }

    pub fn block(&self, name: &str) -> Option<&[Record]> {
        self.get(name).and_then(Value::as_block)
    }

    pub fn block_mut(&mut self, name: &str) -> Option<&mut Vec<Record>> {
        match self.fields.get_mut(name) {
            Some(Value::Block(elements)) => Some(elements),
            _ => None,
        }
    }

    pub fn reference(&self, name: &str) -> Option<&TagReference> {
        self.get(name).and_then(Value::as_reference)
    }
}

/// Cross-reference to another tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagReference {
    pub group: GroupCode,
    /// Tag path without extension; empty for a null reference.
    pub path: String,
    #[serde(default = "null_salt")]
    pub salt: u32,
}

fn null_salt() -> u32 {
    NULL_SALT
}

impl TagReference {
    pub fn new(group: GroupCode, path: impl Into<String>) -> Self {
        Self {
            group,
            path: path.into(),
            salt: NULL_SALT,
        }
    }

    /// Reference of `group` that resolves to nothing.
    pub fn null(group: GroupCode) -> Self {
        Self::new(group, String::new())
    }

    pub fn is_null(&self) -> bool {
        self.path.is_empty()
    }

    /// Compares paths the way the tools do: ASCII case-insensitive and
    /// separator-agnostic.
    pub fn same_path(&self, other: &TagReference) -> bool {
        let left = self.path.bytes().map(normalize_path_byte);
        let right = other.path.bytes().map(normalize_path_byte);
        left.eq(right)
    }
}

fn normalize_path_byte(byte: u8) -> u8 {
    if byte == b'/' {
        b'\\'
    } else {
        byte.to_ascii_lowercase()
    }
}

/// A whole tag: header plus root record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub header: TagHeader,
    pub root: Record,
}

impl Tag {
    /// Empty tag of `group`; every field reads back as its default.
    pub fn new(group: &TagGroupDef) -> Self {
        Self {
            header: TagHeader::for_group(group),
            root: Record::new(),
        }
    }

    pub fn with_root(group: &TagGroupDef, root: Record) -> Self {
        Self {
            header: TagHeader::for_group(group),
            root,
        }
    }

    pub fn to_json(&self) -> TagResult<String> {
        serde_json::to_string_pretty(self).map_err(TagError::from)
    }

    pub fn from_json(input: &str) -> TagResult<Self> {
        serde_json::from_str(input).map_err(TagError::from)
    }
}
