//! Whole-tag read and write.

use std::io::{Read, Write};

use crate::block;
use crate::error::{value_range_error, TagError, TagResult, TagWarning};
use crate::header::TagHeader;
use crate::registry;
use crate::schema::TagGroupDef;
use crate::stream::{TagReader, TagWriter};
use crate::value::Tag;
use crate::version::TAG_HEADER_SIZE;

/// A decoded tag and the recoverable conditions met on the way.
#[derive(Debug)]
pub struct ReadOutcome {
    pub group: &'static TagGroupDef,
    pub tag: Tag,
    pub warnings: Vec<TagWarning>,
}

/// Result of a successful write.
#[derive(Debug)]
pub struct WriteReport {
    pub bytes_written: usize,
    /// The header as written: `data_offset`, `data_length` and `checksum`
    /// describe the emitted body, whatever the input tag carried.
    pub header: TagHeader,
    pub warnings: Vec<TagWarning>,
}

pub fn read_tag(mut input: impl Read, group: &'static TagGroupDef) -> TagResult<ReadOutcome> {
    let mut bytes = Vec::new();
    input.read_to_end(&mut bytes)?;
    read_tag_bytes(&bytes, group)
}

/// Decodes a complete tag image against `group`.
pub fn read_tag_bytes(bytes: &[u8], group: &'static TagGroupDef) -> TagResult<ReadOutcome> {
    let mut reader = TagReader::new(bytes, group.engine);
    let header = TagHeader::read(&mut reader)?;
    if header.group != group.code {
        return Err(TagError::GroupMismatch {
            expected: group.code,
            found: header.group,
        });
    }
    let mut reader = reader.with_version(header.version);
    let body_start = reader.position();
    let root = block::read_block(&mut reader, group.root.name, 1, group.root)?
        .pop()
        .unwrap_or_default();

    let trailing = reader.remaining();
    if trailing > 0 {
        reader.warn(TagWarning::TrailingBytes { count: trailing });
    }
    if header.checksum != 0 {
        let actual = crc32fast::hash(reader.consumed_since(body_start));
        if actual != header.checksum {
            reader.warn(TagWarning::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }
    }
    tracing::debug!(
        engine = %group.engine,
        group = %group.code,
        bytes = bytes.len(),
        "tag read"
    );
    Ok(ReadOutcome {
        group,
        tag: Tag { header, root },
        warnings: reader.into_warnings(),
    })
}

/// Decodes a tag whose engine and group are taken from its own header.
pub fn read_tag_auto(bytes: &[u8]) -> TagResult<ReadOutcome> {
    let engine = registry::detect_engine(bytes)?;
    let header = TagHeader::read(&mut TagReader::new(bytes, engine))?;
    let group = registry::lookup(engine, header.group).ok_or(TagError::UnknownGroup {
        engine,
        code: header.group,
    })?;
    read_tag_bytes(bytes, group)
}

pub fn write_tag(
    mut output: impl Write,
    tag: &Tag,
    group: &'static TagGroupDef,
) -> TagResult<WriteReport> {
    let (bytes, report) = write_tag_bytes(tag, group)?;
    output.write_all(&bytes)?;
    Ok(report)
}

/// Encodes `tag` against `group`: body first, then the header with the body's
/// length and CRC-32.
///
/// Those header fields are recomputed, so the input header only round-trips
/// once it carries them; [`WriteReport::header`] is the header that was
/// actually written.
pub fn write_tag_bytes(
    tag: &Tag,
    group: &'static TagGroupDef,
) -> TagResult<(Vec<u8>, WriteReport)> {
    if tag.header.group != group.code {
        return Err(TagError::GroupMismatch {
            expected: group.code,
            found: tag.header.group,
        });
    }
    if tag.header.engine != group.engine {
        return Err(TagError::EngineMismatch {
            expected: group.engine,
            found: tag.header.engine.signature(),
        });
    }

    let mut body = TagWriter::new(group.engine).with_version(tag.header.version);
    block::write_block(
        &mut body,
        group.root.name,
        std::slice::from_ref(&tag.root),
        group.root,
    )?;
    let (body, body_warnings) = body.into_parts();

    let mut header = tag.header.clone();
    header.data_offset = TAG_HEADER_SIZE as u32;
    header.data_length = u32::try_from(body.len())
        .map_err(|_| value_range_error("header.data_length", body.len() as i64, "uint32"))?;
    header.checksum = crc32fast::hash(&body);

    let mut writer = TagWriter::new(group.engine);
    header.write(&mut writer);
    writer.write_bytes(&body);
    let (bytes, mut warnings) = writer.into_parts();
    warnings.extend(body_warnings);
    tracing::debug!(
        engine = %group.engine,
        group = %group.code,
        bytes = bytes.len(),
        "tag written"
    );
    let report = WriteReport {
        bytes_written: bytes.len(),
        header,
        warnings,
    };
    Ok((bytes, report))
}
