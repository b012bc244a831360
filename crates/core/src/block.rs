//! Tag block arrays.
//!
//! A block field stores only a descriptor inline. The elements live in the
//! parent's deferred region: first every element's fixed body back to back,
//! then every element's deferred data in element order. Halo 2 prefixes the
//! element bodies with a `tbfd` header.

use crate::error::{value_range_error, TagError, TagResult, TagWarning};
use crate::schema::StructDef;
use crate::stream::{TagReader, TagWriter};
use crate::value::Record;
use crate::version::{BLOCK_HEADER_SIGNATURE, BLOCK_HEADER_VERSION};
use crate::walk;

/// Reads the inline descriptor and returns the element count.
pub fn read_block_descriptor(reader: &mut TagReader<'_>) -> TagResult<i64> {
    let descriptor_size = reader.engine().block_descriptor_size();
    let count = reader.read_i32()?;
    reader.skip(descriptor_size - 4)?;
    Ok(i64::from(count))
}

/// Writes the inline descriptor: the count followed by zeroed pointers.
pub fn write_block_descriptor(writer: &mut TagWriter, name: &str, count: usize) -> TagResult<()> {
    let descriptor_size = writer.engine().block_descriptor_size();
    let count =
        i32::try_from(count).map_err(|_| value_range_error(name, count as i64, "int32"))?;
    writer.write_i32(count);
    writer.write_padding(descriptor_size - 4);
    Ok(())
}

/// Reads `count` elements of `def` from the deferred region.
///
/// The count is checked against the remaining input before anything is
/// allocated.
pub fn read_block(
    reader: &mut TagReader<'_>,
    name: &str,
    count: i64,
    def: &'static StructDef,
) -> TagResult<Vec<Record>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if count < 0 {
        return Err(overflow(reader, name, count));
    }
    if reader.engine().uses_block_headers() {
        read_block_header(reader, name, def)?;
    }
    let minimal = def.minimal_size(reader.engine(), reader.version()).max(1);
    let count = usize::try_from(count)
        .ok()
        .filter(|count| {
            count
                .checked_mul(minimal)
                .is_some_and(|needed| needed <= reader.remaining())
        })
        .ok_or_else(|| overflow(reader, name, count))?;

    let mut elements = Vec::with_capacity(count);
    let mut pending = Vec::with_capacity(count);
    for _ in 0..count {
        let (record, owed) = walk::read_fixed(reader, def)?;
        elements.push(record);
        pending.push(owed);
    }
    for (record, owed) in elements.iter_mut().zip(pending) {
        walk::read_deferred(reader, record, owed)?;
    }
    Ok(elements)
}

/// Writes `elements` into the deferred region. An empty array writes nothing.
pub fn write_block(
    writer: &mut TagWriter,
    name: &str,
    elements: &[Record],
    def: &'static StructDef,
) -> TagResult<()> {
    if elements.is_empty() {
        return Ok(());
    }
    if writer.engine().uses_block_headers() {
        write_block_header(writer, name, def)?;
    }
    let mut owed = Vec::with_capacity(elements.len());
    for element in elements {
        owed.push(walk::write_fixed(writer, def, element)?);
    }
    for deferred in owed {
        walk::write_deferred(writer, deferred)?;
    }
    Ok(())
}

fn read_block_header(
    reader: &mut TagReader<'_>,
    name: &str,
    def: &'static StructDef,
) -> TagResult<()> {
    let signature = reader.read_group_code()?;
    if signature != BLOCK_HEADER_SIGNATURE {
        return Err(TagError::BlockHeader {
            block: name.to_string(),
            found: signature,
        });
    }
    let version = reader.read_i32()?;
    if version != BLOCK_HEADER_VERSION {
        tracing::debug!(block = name, version, "unexpected block header version");
    }
    let found = reader.read_u32()?;
    let expected = def.nominal_size(reader.engine(), reader.version()) as u32;
    if found != expected {
        reader.warn(TagWarning::BlockSizeMismatch {
            block: name.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

fn write_block_header(
    writer: &mut TagWriter,
    name: &str,
    def: &'static StructDef,
) -> TagResult<()> {
    let size = def.nominal_size(writer.engine(), writer.version());
    let size = i32::try_from(size).map_err(|_| value_range_error(name, size as i64, "int32"))?;
    writer.write_group_code(BLOCK_HEADER_SIGNATURE);
    writer.write_i32(BLOCK_HEADER_VERSION);
    writer.write_i32(size);
    Ok(())
}

#[cold]
#[inline(never)]
fn overflow(reader: &TagReader<'_>, name: &str, count: i64) -> TagError {
    TagError::BlockOverflow {
        block: name.to_string(),
        count,
        remaining: reader.remaining(),
    }
}
