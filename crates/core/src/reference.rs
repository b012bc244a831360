//! Tag references: a 16-byte inline descriptor and a deferred, NUL-terminated
//! path.

use crate::error::{value_range_error, TagResult, TagWarning};
use crate::stream::{TagReader, TagWriter};
use crate::value::TagReference;

/// Reads the inline descriptor. The path is left empty; the returned length
/// is handed to [`read_reference_path`] during the deferred pass.
pub fn read_reference(reader: &mut TagReader<'_>) -> TagResult<(TagReference, u32)> {
    let group = reader.read_group_code()?;
    reader.skip(4)?;
    let length = reader.read_u32()?;
    let salt = reader.read_u32()?;
    let reference = TagReference {
        group,
        path: String::new(),
        salt,
    };
    Ok((reference, length))
}

/// Reads `length` path bytes and the terminator that should follow them.
pub fn read_reference_path(reader: &mut TagReader<'_>, length: u32) -> TagResult<String> {
    if length == 0 {
        return Ok(String::new());
    }
    let bytes = reader.read_bytes(length as usize)?;
    let path = String::from_utf8_lossy(bytes).into_owned();
    if reader.peek_u8() == Some(0) {
        reader.skip(1)?;
    } else {
        let offset = reader.position();
        reader.warn(TagWarning::UnterminatedPath { offset });
    }
    Ok(path)
}

/// Writes the inline descriptor and returns the path owed to the deferred pass.
pub fn write_reference<'r>(
    writer: &mut TagWriter,
    name: &str,
    reference: &'r TagReference,
) -> TagResult<&'r str> {
    let length = u32::try_from(reference.path.len())
        .map_err(|_| value_range_error(name, reference.path.len() as i64, "uint32"))?;
    writer.write_group_code(reference.group);
    writer.write_u32(0);
    writer.write_u32(length);
    writer.write_u32(reference.salt);
    Ok(&reference.path)
}

/// Writes the path and its NUL terminator. An empty path writes nothing.
pub fn write_reference_path(writer: &mut TagWriter, path: &str) {
    if path.is_empty() {
        return;
    }
    writer.write_bytes(path.as_bytes());
    writer.write_u8(0);
}
