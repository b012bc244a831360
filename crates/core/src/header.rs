use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::{TagError, TagResult};
use crate::group::GroupCode;
use crate::schema::TagGroupDef;
use crate::stream::{TagReader, TagWriter};
use crate::version::{DEFAULT_PLUGIN_HANDLE, TAG_HEADER_NAME_SIZE, TAG_HEADER_SIZE};

/// The 64-byte record at offset 0 of every tag file.
///
/// ```text
/// offset size  field
/// 0      2     id
/// 2      1     kind
/// 3      1     kind_flags
/// 4      32    name (zero padded)
/// 36     4     group
/// 40     4     checksum (CRC-32 of the body)
/// 44     4     data_offset (64)
/// 48     4     data_length
/// 52     4     reserved
/// 56     2     version
/// 58     1     destination
/// 59     1     plugin_handle
/// 60     4     engine signature
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagHeader {
    pub id: u16,
    pub kind: u8,
    pub kind_flags: u8,
    pub name: String,
    pub group: GroupCode,
    pub checksum: u32,
    pub data_offset: u32,
    pub data_length: u32,
    pub version: u16,
    pub destination: u8,
    pub plugin_handle: u8,
    pub engine: Engine,
}

impl TagHeader {
    /// Header a fresh tag of `group` is written with.
    pub fn for_group(group: &TagGroupDef) -> Self {
        Self {
            id: 0,
            kind: 0,
            kind_flags: 0,
            name: String::new(),
            group: group.code,
            checksum: 0,
            data_offset: TAG_HEADER_SIZE as u32,
            data_length: 0,
            version: group.version,
            destination: 0,
            plugin_handle: DEFAULT_PLUGIN_HANDLE,
            engine: group.engine,
        }
    }

    /// Parses the header at the reader's position.
    ///
    /// Fails when fewer than 64 bytes remain or when the signature does not
    /// belong to the reader's engine.
    pub fn read(reader: &mut TagReader<'_>) -> TagResult<Self> {
        if reader.remaining() < TAG_HEADER_SIZE {
            return Err(TagError::TooSmall {
                needed: TAG_HEADER_SIZE,
                got: reader.remaining(),
            });
        }
        let id = reader.read_u16()?;
        let kind = reader.read_u8()?;
        let kind_flags = reader.read_u8()?;
        let name = reader.read_fixed_string("header.name", TAG_HEADER_NAME_SIZE)?;
        let group = reader.read_group_code()?;
        let checksum = reader.read_u32()?;
        let data_offset = reader.read_u32()?;
        let data_length = reader.read_u32()?;
        reader.skip(4)?;
        let version = reader.read_u16()?;
        let destination = reader.read_u8()?;
        let plugin_handle = reader.read_u8()?;
        let signature = reader.read_group_code()?;
        let engine = reader.engine();
        if signature != engine.signature() {
            return Err(TagError::EngineMismatch {
                expected: engine,
                found: signature,
            });
        }
        Ok(Self {
            id,
            kind,
            kind_flags,
            name,
            group,
            checksum,
            data_offset,
            data_length,
            version,
            destination,
            plugin_handle,
            engine,
        })
    }

    pub fn write(&self, writer: &mut TagWriter) {
        writer.write_u16(self.id);
        writer.write_u8(self.kind);
        writer.write_u8(self.kind_flags);
        writer.write_fixed_string("header.name", &self.name, TAG_HEADER_NAME_SIZE);
        writer.write_group_code(self.group);
        writer.write_u32(self.checksum);
        writer.write_u32(self.data_offset);
        writer.write_u32(self.data_length);
        writer.write_padding(4);
        writer.write_u16(self.version);
        writer.write_u8(self.destination);
        writer.write_u8(self.plugin_handle);
        let signature = writer.engine().signature();
        writer.write_group_code(signature);
    }
}
