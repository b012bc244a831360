//! Declarative tag schemas.
//!
//! A schema is static data: a [`TagGroupDef`] names a root [`StructDef`], and
//! every struct is an ordered list of [`FieldDef`]s. Nothing in this module
//! touches a stream; the walker in `walk` is the only interpreter.

pub mod halo1;
pub mod halo2;
mod layout;
mod shared;

pub use layout::{FieldLayout, StructLayout};

use crate::engine::Engine;
use crate::group::GroupCode;
use crate::value::{Record, TagReference, Value};
use crate::version::{REFERENCE_SIZE, STRING_ID_SIZE};

/// Storage width of an integer-backed field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IntWidth {
    Byte,
    Short,
    Long,
}

impl IntWidth {
    pub const fn bytes(self) -> usize {
        match self {
            IntWidth::Byte => 1,
            IntWidth::Short => 2,
            IntWidth::Long => 4,
        }
    }

    pub const fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }
}

/// Option names of an enum field, indexed by raw value.
#[derive(Clone, Copy, Debug)]
pub struct EnumOptions(pub &'static [&'static str]);

impl EnumOptions {
    pub fn name_of(&self, raw: i64) -> Option<&'static str> {
        usize::try_from(raw)
            .ok()
            .and_then(|index| self.0.get(index).copied())
    }

    pub fn index_of(&self, name: &str) -> Option<i64> {
        self.0
            .iter()
            .position(|option| *option == name)
            .map(|index| index as i64)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Bit names of a flags field, indexed by bit position.
#[derive(Clone, Copy, Debug)]
pub struct FlagBits(pub &'static [&'static str]);

impl FlagBits {
    /// Names of the set bits that the schema knows about.
    pub fn names_of(&self, raw: u64) -> Vec<&'static str> {
        self.0
            .iter()
            .enumerate()
            .filter(|(bit, _)| raw & (1u64 << bit) != 0)
            .map(|(_, name)| *name)
            .collect()
    }

    pub fn bit_of(&self, name: &str) -> Option<u32> {
        self.0
            .iter()
            .position(|bit| *bit == name)
            .map(|bit| bit as u32)
    }

    pub fn name_of(&self, bit: u32) -> Option<&'static str> {
        self.0.get(bit as usize).copied()
    }

    /// Set bits with no name in the schema.
    pub fn unknown_bits(&self, raw: u64) -> u64 {
        let known = if self.0.len() >= 64 {
            u64::MAX
        } else {
            (1u64 << self.0.len()) - 1
        };
        raw & !known
    }
}

/// What a field stores and how many bytes it occupies inline.
#[derive(Clone, Copy, Debug)]
pub enum FieldKind {
    Int8,
    Int16,
    Int32,
    UInt8,
    UInt16,
    UInt32,
    Real,
    /// Radians on disk, degrees in memory.
    Angle,
    Point2,
    Point3,
    Euler2,
    Euler3,
    RealBounds,
    Rgb,
    /// Stored as a, r, g, b.
    Argb,
    Enum(IntWidth, EnumOptions),
    Flags(IntWidth, FlagBits),
    /// Zero-padded string of the given width.
    String(usize),
    /// Interned string; inline length, deferred bytes.
    StringId,
    Block(&'static StructDef),
    /// Allowed groups; the first one is used for null references.
    Reference(&'static [GroupCode]),
    /// Opaque payload; inline size, deferred bytes.
    Data,
    Pad(usize),
}

impl FieldKind {
    /// Bytes this field occupies in its record's fixed body.
    pub const fn inline_size(&self, engine: Engine) -> usize {
        match self {
            FieldKind::Int8 | FieldKind::UInt8 => 1,
            FieldKind::Int16 | FieldKind::UInt16 => 2,
            FieldKind::Int32 | FieldKind::UInt32 | FieldKind::Real | FieldKind::Angle => 4,
            FieldKind::Point2 | FieldKind::Euler2 | FieldKind::RealBounds => 8,
            FieldKind::Point3 | FieldKind::Euler3 | FieldKind::Rgb => 12,
            FieldKind::Argb => 16,
            FieldKind::Enum(width, _) | FieldKind::Flags(width, _) => width.bytes(),
            FieldKind::String(width) => *width,
            FieldKind::StringId => STRING_ID_SIZE,
            FieldKind::Block(_) => engine.block_descriptor_size(),
            FieldKind::Reference(_) => REFERENCE_SIZE,
            FieldKind::Data => engine.data_descriptor_size(),
            FieldKind::Pad(size) => *size,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            FieldKind::Int8 => "int8",
            FieldKind::Int16 => "int16",
            FieldKind::Int32 => "int32",
            FieldKind::UInt8 => "uint8",
            FieldKind::UInt16 => "uint16",
            FieldKind::UInt32 => "uint32",
            FieldKind::Real => "real",
            FieldKind::Angle => "angle",
            FieldKind::Point2 => "point2",
            FieldKind::Point3 => "point3",
            FieldKind::Euler2 => "euler2",
            FieldKind::Euler3 => "euler3",
            FieldKind::RealBounds => "bounds",
            FieldKind::Rgb => "rgb",
            FieldKind::Argb => "argb",
            FieldKind::Enum(IntWidth::Byte, _) => "enum8",
            FieldKind::Enum(IntWidth::Short, _) => "enum16",
            FieldKind::Enum(IntWidth::Long, _) => "enum32",
            FieldKind::Flags(IntWidth::Byte, _) => "flags8",
            FieldKind::Flags(IntWidth::Short, _) => "flags16",
            FieldKind::Flags(IntWidth::Long, _) => "flags32",
            FieldKind::String(_) => "string",
            FieldKind::StringId => "string_id",
            FieldKind::Block(_) => "block",
            FieldKind::Reference(_) => "reference",
            FieldKind::Data => "data",
            FieldKind::Pad(_) => "pad",
        }
    }

    /// Inclusive range of a plain integer kind.
    pub const fn int_range(&self) -> Option<(i64, i64)> {
        match self {
            FieldKind::Int8 => Some((i8::MIN as i64, i8::MAX as i64)),
            FieldKind::Int16 => Some((i16::MIN as i64, i16::MAX as i64)),
            FieldKind::Int32 => Some((i32::MIN as i64, i32::MAX as i64)),
            FieldKind::UInt8 => Some((0, u8::MAX as i64)),
            FieldKind::UInt16 => Some((0, u16::MAX as i64)),
            FieldKind::UInt32 => Some((0, u32::MAX as i64)),
            _ => None,
        }
    }

    /// Value a missing field is written as.
    pub fn default_value(&self) -> Option<Value> {
        Some(match self {
            FieldKind::Int8
            | FieldKind::Int16
            | FieldKind::Int32
            | FieldKind::UInt8
            | FieldKind::UInt16
            | FieldKind::UInt32 => Value::Int(0),
            FieldKind::Real => Value::Real(0.0),
            FieldKind::Angle => Value::Angle(0.0),
            FieldKind::Point2 => Value::Point2([0.0; 2]),
            FieldKind::Point3 => Value::Point3([0.0; 3]),
            FieldKind::Euler2 => Value::Euler2([0.0; 2]),
            FieldKind::Euler3 => Value::Euler3([0.0; 3]),
            FieldKind::RealBounds => Value::Bounds([0.0; 2]),
            FieldKind::Rgb => Value::Rgb([0.0; 3]),
            FieldKind::Argb => Value::Rgba([0.0; 4]),
            FieldKind::Enum(..) => Value::Enum(0),
            FieldKind::Flags(..) => Value::Flags(0),
            FieldKind::String(_) | FieldKind::StringId => Value::Text(String::new()),
            FieldKind::Block(_) => Value::Block(Vec::new()),
            FieldKind::Reference(groups) => Value::Reference(TagReference::null(
                groups.first().copied().unwrap_or(GroupCode::NONE),
            )),
            FieldKind::Data => Value::Data(Vec::new()),
            FieldKind::Pad(_) => return None,
        })
    }
}

/// Gate deciding whether a field is present.
#[derive(Clone, Copy, Debug)]
pub enum Condition {
    Engine(Engine),
    MinVersion(u16),
    MaxVersion(u16),
    /// Present when any bit of `mask` is set in the earlier flags field `field`.
    FlagSet { field: &'static str, mask: u64 },
    /// Present when no bit of `mask` is set in the earlier flags field `field`.
    FlagClear { field: &'static str, mask: u64 },
}

impl Condition {
    /// Evaluates engine and version gates; `None` for flag gates.
    pub fn holds_statically(&self, engine: Engine, version: u16) -> Option<bool> {
        match self {
            Condition::Engine(required) => Some(*required == engine),
            Condition::MinVersion(min) => Some(version >= *min),
            Condition::MaxVersion(max) => Some(version <= *max),
            Condition::FlagSet { .. } | Condition::FlagClear { .. } => None,
        }
    }

    /// Evaluates the gate against the fields read or supplied so far.
    pub fn holds(&self, engine: Engine, version: u16, record: &Record) -> bool {
        match self {
            Condition::FlagSet { field, mask } => record.flags(field).unwrap_or(0) & mask != 0,
            Condition::FlagClear { field, mask } => {
                record.flags(field).unwrap_or(0) & mask == 0
            }
            other => other.holds_statically(engine, version).unwrap_or(true),
        }
    }
}

/// Const-friendly default for numeric fields.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    Int(i64),
    Real(f32),
}

/// One entry of a struct definition.
#[derive(Clone, Copy, Debug)]
pub struct FieldDef {
    /// Empty for padding.
    pub name: &'static str,
    pub kind: FieldKind,
    pub condition: Option<Condition>,
    pub default: Option<Scalar>,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            condition: None,
            default: None,
        }
    }

    pub const fn when(self, condition: Condition) -> Self {
        Self {
            condition: Some(condition),
            ..self
        }
    }

    pub const fn default_to(self, value: Scalar) -> Self {
        Self {
            default: Some(value),
            ..self
        }
    }

    pub const fn is_pad(&self) -> bool {
        matches!(self.kind, FieldKind::Pad(_))
    }

    /// Schema default when one is declared, otherwise the kind's zero value.
    pub fn default_value(&self) -> Option<Value> {
        let declared = match (self.default, self.kind) {
            (Some(Scalar::Int(value)), FieldKind::Enum(..)) => Some(Value::Enum(value)),
            (Some(Scalar::Int(value)), FieldKind::Flags(..)) => Some(Value::Flags(value as u64)),
            (Some(Scalar::Int(value)), kind) if kind.int_range().is_some() => {
                Some(Value::Int(value))
            }
            (Some(Scalar::Real(value)), FieldKind::Real) => Some(Value::Real(value)),
            (Some(Scalar::Real(value)), FieldKind::Angle) => Some(Value::Angle(value)),
            _ => None,
        };
        declared.or_else(|| self.kind.default_value())
    }
}

/// Ordered field list of one record type.
#[derive(Debug)]
pub struct StructDef {
    pub name: &'static str,
    pub fields: &'static [FieldDef],
}

impl StructDef {
    /// Named (non-padding) field called `name`.
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields
            .iter()
            .find(|field| !field.is_pad() && field.name == name)
    }

    /// Fixed body size with every flag-gated field counted as present.
    pub fn nominal_size(&self, engine: Engine, version: u16) -> usize {
        self.fields
            .iter()
            .filter(|field| {
                field
                    .condition
                    .and_then(|condition| condition.holds_statically(engine, version))
                    .unwrap_or(true)
            })
            .map(|field| field.kind.inline_size(engine))
            .sum()
    }

    /// Fixed body size with every flag-gated field counted as absent.
    pub fn minimal_size(&self, engine: Engine, version: u16) -> usize {
        self.fields
            .iter()
            .filter(|field| match field.condition {
                None => true,
                Some(condition) => condition.holds_statically(engine, version) == Some(true),
            })
            .map(|field| field.kind.inline_size(engine))
            .sum()
    }

    pub fn layout(&self, engine: Engine, version: u16) -> StructLayout {
        StructLayout::compute(self, engine, version)
    }
}

/// One tag group under one engine.
#[derive(Debug)]
pub struct TagGroupDef {
    pub code: GroupCode,
    pub name: &'static str,
    pub engine: Engine,
    /// Version written into new headers.
    pub version: u16,
    pub root: &'static StructDef,
}

pub const fn int8(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::Int8)
}

pub const fn int16(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::Int16)
}

pub const fn int32(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::Int32)
}

pub const fn uint8(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::UInt8)
}

pub const fn uint16(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::UInt16)
}

pub const fn uint32(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::UInt32)
}

pub const fn real(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::Real)
}

pub const fn angle(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::Angle)
}

pub const fn point2(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::Point2)
}

pub const fn point3(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::Point3)
}

pub const fn euler2(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::Euler2)
}

pub const fn euler3(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::Euler3)
}

pub const fn real_bounds(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::RealBounds)
}

pub const fn rgb(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::Rgb)
}

pub const fn argb(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::Argb)
}

pub const fn enum8(name: &'static str, options: &'static [&'static str]) -> FieldDef {
    FieldDef::new(name, FieldKind::Enum(IntWidth::Byte, EnumOptions(options)))
}

pub const fn enum16(name: &'static str, options: &'static [&'static str]) -> FieldDef {
    FieldDef::new(name, FieldKind::Enum(IntWidth::Short, EnumOptions(options)))
}

pub const fn enum32(name: &'static str, options: &'static [&'static str]) -> FieldDef {
    FieldDef::new(name, FieldKind::Enum(IntWidth::Long, EnumOptions(options)))
}

pub const fn flags8(name: &'static str, bits: &'static [&'static str]) -> FieldDef {
    FieldDef::new(name, FieldKind::Flags(IntWidth::Byte, FlagBits(bits)))
}

pub const fn flags16(name: &'static str, bits: &'static [&'static str]) -> FieldDef {
    FieldDef::new(name, FieldKind::Flags(IntWidth::Short, FlagBits(bits)))
}

pub const fn flags32(name: &'static str, bits: &'static [&'static str]) -> FieldDef {
    FieldDef::new(name, FieldKind::Flags(IntWidth::Long, FlagBits(bits)))
}

pub const fn string32(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::String(32))
}

pub const fn string_id(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::StringId)
}

pub const fn block(name: &'static str, def: &'static StructDef) -> FieldDef {
    FieldDef::new(name, FieldKind::Block(def))
}

pub const fn reference(name: &'static str, groups: &'static [GroupCode]) -> FieldDef {
    FieldDef::new(name, FieldKind::Reference(groups))
}

pub const fn data(name: &'static str) -> FieldDef {
    FieldDef::new(name, FieldKind::Data)
}

/// Reserved bytes. Fields the tools leave unexposed are declared this way
/// rather than guessed at.
pub const fn pad(size: usize) -> FieldDef {
    FieldDef::new("", FieldKind::Pad(size))
}

#[cfg(test)]
#[path = "../tests/schema_tests.rs"]
mod tests;
