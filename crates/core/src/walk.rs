//! The schema interpreter.
//!
//! Every record is handled in two passes. The fixed pass reads or writes the
//! record's inline body and collects what is deferred; the deferred pass then
//! handles nested blocks, reference paths, string ids and data payloads in
//! field order. `block` sequences the passes across the elements of an array.

use crate::block;
use crate::engine::Engine;
use crate::error::{field_type_error, value_range_error, TagError, TagResult, TagWarning};
use crate::reference;
use crate::schema::{FieldDef, FieldKind, IntWidth, StructDef};
use crate::stream::{truncate_at_char_boundary, TagReader, TagWriter};
use crate::value::{Record, Value};
use crate::version::STRING_ID_MAX_LEN;

/// Deferred work discovered while reading a fixed body.
#[derive(Debug)]
pub(crate) enum Pending {
    Block {
        field: &'static str,
        count: i64,
        def: &'static StructDef,
    },
    Reference {
        field: &'static str,
        length: u32,
    },
    StringId {
        field: &'static str,
        length: u8,
    },
    Data {
        field: &'static str,
        size: i32,
    },
}

/// Deferred payloads owed by a fixed body that was just written.
#[derive(Debug)]
pub(crate) enum Deferred<'r> {
    Block {
        field: &'static str,
        elements: &'r [Record],
        def: &'static StructDef,
    },
    Path(&'r str),
    StringId(&'r [u8]),
    Data(&'r [u8]),
}

fn field_present(field: &FieldDef, engine: Engine, version: u16, seen: &Record) -> bool {
    field
        .condition
        .map_or(true, |condition| condition.holds(engine, version, seen))
}

pub(crate) fn read_fixed(
    reader: &mut TagReader<'_>,
    def: &'static StructDef,
) -> TagResult<(Record, Vec<Pending>)> {
    let (engine, version) = (reader.engine(), reader.version());
    let mut record = Record::new();
    let mut pending = Vec::new();
    for field in def.fields {
        if !field_present(field, engine, version, &record) {
            continue;
        }
        let value = match field.kind {
            FieldKind::Pad(size) => {
                reader.skip(size)?;
                continue;
            }
            FieldKind::Int8 => Value::Int(reader.read_int(IntWidth::Byte)?),
            FieldKind::Int16 => Value::Int(reader.read_int(IntWidth::Short)?),
            FieldKind::Int32 => Value::Int(reader.read_int(IntWidth::Long)?),
            FieldKind::UInt8 => Value::Int(reader.read_uint(IntWidth::Byte)? as i64),
            FieldKind::UInt16 => Value::Int(reader.read_uint(IntWidth::Short)? as i64),
            FieldKind::UInt32 => Value::Int(reader.read_uint(IntWidth::Long)? as i64),
            FieldKind::Real => Value::Real(reader.read_f32()?),
            FieldKind::Angle => Value::Angle(reader.read_angle()?),
            FieldKind::Point2 => Value::Point2([reader.read_f32()?, reader.read_f32()?]),
            FieldKind::Point3 => Value::Point3([
                reader.read_f32()?,
                reader.read_f32()?,
                reader.read_f32()?,
            ]),
            FieldKind::Euler2 => Value::Euler2([reader.read_angle()?, reader.read_angle()?]),
            FieldKind::Euler3 => Value::Euler3([
                reader.read_angle()?,
                reader.read_angle()?,
                reader.read_angle()?,
            ]),
            FieldKind::RealBounds => Value::Bounds([reader.read_f32()?, reader.read_f32()?]),
            FieldKind::Rgb => Value::Rgb([
                reader.read_f32()?,
                reader.read_f32()?,
                reader.read_f32()?,
            ]),
            FieldKind::Argb => {
                let alpha = reader.read_f32()?;
                let red = reader.read_f32()?;
                let green = reader.read_f32()?;
                let blue = reader.read_f32()?;
                Value::Rgba([red, green, blue, alpha])
            }
            FieldKind::Enum(width, options) => {
                let raw = reader.read_int(width)?;
                if options.name_of(raw).is_none() {
                    tracing::debug!(
                        structure = def.name,
                        field = field.name,
                        raw,
                        "enum value has no option name"
                    );
                }
                Value::Enum(raw)
            }
            FieldKind::Flags(width, bits) => {
                let raw = reader.read_uint(width)?;
                let unknown = bits.unknown_bits(raw);
                if unknown != 0 {
                    tracing::debug!(
                        structure = def.name,
                        field = field.name,
                        unknown,
                        "flags carry unnamed bits"
                    );
                }
                Value::Flags(raw)
            }
            FieldKind::String(width) => Value::Text(reader.read_fixed_string(field.name, width)?),
            FieldKind::StringId => {
                reader.skip(3)?;
                let length = reader.read_u8()?;
                pending.push(Pending::StringId {
                    field: field.name,
                    length,
                });
                Value::Text(String::new())
            }
            FieldKind::Block(nested) => {
                let count = block::read_block_descriptor(reader)?;
                pending.push(Pending::Block {
                    field: field.name,
                    count,
                    def: nested,
                });
                Value::Block(Vec::new())
            }
            FieldKind::Reference(_) => {
                let (reference, length) = reference::read_reference(reader)?;
                pending.push(Pending::Reference {
                    field: field.name,
                    length,
                });
                Value::Reference(reference)
            }
            FieldKind::Data => {
                let size = reader.read_i32()?;
                reader.skip(engine.data_descriptor_size() - 4)?;
                pending.push(Pending::Data {
                    field: field.name,
                    size,
                });
                Value::Data(Vec::new())
            }
        };
        record.insert(field.name, value);
    }
    Ok((record, pending))
}

pub(crate) fn read_deferred(
    reader: &mut TagReader<'_>,
    record: &mut Record,
    pending: Vec<Pending>,
) -> TagResult<()> {
    for item in pending {
        match item {
            Pending::Block { field, count, def } => {
                let elements = block::read_block(reader, field, count, def)?;
                record.insert(field, Value::Block(elements));
            }
            Pending::Reference { field, length } => {
                let path = reference::read_reference_path(reader, length)?;
                if let Some(Value::Reference(reference)) = record.get_mut(field) {
                    reference.path = path;
                }
            }
            Pending::StringId { field, length } => {
                let bytes = reader.read_bytes(usize::from(length))?;
                record.insert(field, Value::Text(String::from_utf8_lossy(bytes).into_owned()));
            }
            Pending::Data { field, size } => {
                let size = usize::try_from(size)
                    .ok()
                    .filter(|size| *size <= reader.remaining())
                    .ok_or_else(|| TagError::DataOverflow {
                        field: field.to_string(),
                        size: i64::from(size),
                        remaining: reader.remaining(),
                    })?;
                let bytes = reader.read_bytes(size)?;
                record.insert(field, Value::Data(bytes.to_vec()));
            }
        }
    }
    Ok(())
}

pub(crate) fn write_fixed<'r>(
    writer: &mut TagWriter,
    def: &'static StructDef,
    record: &'r Record,
) -> TagResult<Vec<Deferred<'r>>> {
    let (engine, version) = (writer.engine(), writer.version());
    let mut deferred = Vec::new();
    // Flag values as written, so gates agree with what a reader will see.
    let mut seen = Record::new();
    for field in def.fields {
        if !field_present(field, engine, version, &seen) {
            continue;
        }
        if let FieldKind::Pad(size) = field.kind {
            writer.write_padding(size);
            continue;
        }
        match record.get(field.name) {
            Some(value) => {
                write_value(writer, def, field, value, &mut deferred)?;
                remember_flags(&mut seen, field, value);
            }
            None => {
                let Some(value) = field.default_value() else {
                    continue;
                };
                tracing::debug!(
                    structure = def.name,
                    field = field.name,
                    "field missing from record, writing default"
                );
                // Defaults are empty, so they never owe deferred bytes.
                let mut owed = Vec::new();
                write_value(writer, def, field, &value, &mut owed)?;
                remember_flags(&mut seen, field, &value);
            }
        }
    }
    Ok(deferred)
}

fn remember_flags(seen: &mut Record, field: &FieldDef, value: &Value) {
    if let (FieldKind::Flags(..), Value::Flags(bits)) = (field.kind, value) {
        seen.insert(field.name, Value::Flags(*bits));
    }
}

pub(crate) fn write_deferred(writer: &mut TagWriter, deferred: Vec<Deferred<'_>>) -> TagResult<()> {
    for item in deferred {
        match item {
            Deferred::Block {
                field,
                elements,
                def,
            } => block::write_block(writer, field, elements, def)?,
            Deferred::Path(path) => reference::write_reference_path(writer, path),
            Deferred::StringId(bytes) | Deferred::Data(bytes) => writer.write_bytes(bytes),
        }
    }
    Ok(())
}

fn qualified(def: &StructDef, field: &FieldDef) -> String {
    format!("{}.{}", def.name, field.name)
}

fn write_value<'r>(
    writer: &mut TagWriter,
    def: &StructDef,
    field: &FieldDef,
    value: &'r Value,
    deferred: &mut Vec<Deferred<'r>>,
) -> TagResult<()> {
    let mismatch =
        || field_type_error(&qualified(def, field), field.kind.label(), value.kind_name());
    match (field.kind, value) {
        (FieldKind::Int8 | FieldKind::Int16 | FieldKind::Int32, Value::Int(raw)) => {
            check_int_range(def, field, *raw)?;
            writer.write_int(int_width(field.kind), *raw);
        }
        (FieldKind::UInt8 | FieldKind::UInt16 | FieldKind::UInt32, Value::Int(raw)) => {
            check_int_range(def, field, *raw)?;
            writer.write_uint(int_width(field.kind), *raw as u64);
        }
        (FieldKind::Real, Value::Real(real)) => writer.write_f32(*real),
        (FieldKind::Angle, Value::Angle(degrees)) => writer.write_angle(*degrees),
        (FieldKind::Point2, Value::Point2(point))
        | (FieldKind::RealBounds, Value::Bounds(point)) => {
            point.iter().for_each(|component| writer.write_f32(*component));
        }
        (FieldKind::Point3, Value::Point3(point)) | (FieldKind::Rgb, Value::Rgb(point)) => {
            point.iter().for_each(|component| writer.write_f32(*component));
        }
        (FieldKind::Euler2, Value::Euler2(angles)) => {
            angles.iter().for_each(|degrees| writer.write_angle(*degrees));
        }
        (FieldKind::Euler3, Value::Euler3(angles)) => {
            angles.iter().for_each(|degrees| writer.write_angle(*degrees));
        }
        (FieldKind::Argb, Value::Rgba([red, green, blue, alpha])) => {
            writer.write_f32(*alpha);
            writer.write_f32(*red);
            writer.write_f32(*green);
            writer.write_f32(*blue);
        }
        (FieldKind::Enum(width, _), Value::Enum(raw)) => {
            let bits = width.bits() - 1;
            let (min, max) = (-(1i64 << bits), (1i64 << bits) - 1);
            if *raw < min || *raw > max {
                return Err(value_range_error(&qualified(def, field), *raw, field.kind.label()));
            }
            writer.write_int(width, *raw);
        }
        (FieldKind::Flags(width, _), Value::Flags(bits)) => {
            if *bits >> width.bits() != 0 {
                return Err(value_range_error(
                    &qualified(def, field),
                    *bits as i64,
                    field.kind.label(),
                ));
            }
            writer.write_uint(width, *bits);
        }
        (FieldKind::String(width), Value::Text(text)) => {
            writer.write_fixed_string(field.name, text, width);
        }
        (FieldKind::StringId, Value::Text(text)) => {
            let kept = truncate_at_char_boundary(text, STRING_ID_MAX_LEN);
            if kept.len() < text.len() {
                writer.warn(TagWarning::Truncated {
                    field: qualified(def, field),
                    limit: STRING_ID_MAX_LEN,
                });
            }
            writer.write_u16(0);
            writer.write_u8(0);
            writer.write_u8(kept.len() as u8);
            if !kept.is_empty() {
                deferred.push(Deferred::StringId(kept.as_bytes()));
            }
        }
        (FieldKind::Block(nested), Value::Block(elements)) => {
            block::write_block_descriptor(writer, field.name, elements.len())?;
            if !elements.is_empty() {
                deferred.push(Deferred::Block {
                    field: field.name,
                    elements,
                    def: nested,
                });
            }
        }
        (FieldKind::Reference(_), Value::Reference(reference)) => {
            let path = reference::write_reference(writer, field.name, reference)?;
            if !path.is_empty() {
                deferred.push(Deferred::Path(path));
            }
        }
        (FieldKind::Data, Value::Data(bytes)) => {
            let size = i32::try_from(bytes.len()).map_err(|_| {
                value_range_error(&qualified(def, field), bytes.len() as i64, "int32")
            })?;
            let descriptor_size = writer.engine().data_descriptor_size();
            writer.write_i32(size);
            writer.write_padding(descriptor_size - 4);
            if !bytes.is_empty() {
                deferred.push(Deferred::Data(bytes));
            }
        }
        _ => return Err(mismatch()),
    }
    Ok(())
}

fn int_width(kind: FieldKind) -> IntWidth {
    match kind {
        FieldKind::Int8 | FieldKind::UInt8 => IntWidth::Byte,
        FieldKind::Int16 | FieldKind::UInt16 => IntWidth::Short,
        _ => IntWidth::Long,
    }
}

fn check_int_range(def: &StructDef, field: &FieldDef, raw: i64) -> TagResult<()> {
    match field.kind.int_range() {
        Some((min, max)) if raw < min || raw > max => Err(value_range_error(
            &qualified(def, field),
            raw,
            field.kind.label(),
        )),
        _ => Ok(()),
    }
}
