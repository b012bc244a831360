//! Layout constants for tag files.
//!
//! Every fixed width that more than one module depends on lives here, so the
//! reader, the writer and the layout calculator cannot drift apart.

use crate::group::GroupCode;

/// Size of the tag header that starts every tag file.
pub const TAG_HEADER_SIZE: usize = 64;

/// Offset of the body checksum inside the tag header.
pub const TAG_HEADER_CHECKSUM_OFFSET: usize = 40;

/// Width of the name field inside the tag header.
pub const TAG_HEADER_NAME_SIZE: usize = 32;

/// Engine signature written by Halo 1 tools.
pub const HALO1_SIGNATURE: GroupCode = GroupCode::new(*b"blam");

/// Engine signature written by Halo 2 tools.
pub const HALO2_SIGNATURE: GroupCode = GroupCode::new(*b"BLM!");

/// Plugin handle value the tools leave in every header.
pub const DEFAULT_PLUGIN_HANDLE: u8 = 0xFF;

/// Signature of the block header preceding Halo 2 element arrays.
pub const BLOCK_HEADER_SIGNATURE: GroupCode = GroupCode::new(*b"tbfd");

/// Block header version written on every Halo 2 element array.
pub const BLOCK_HEADER_VERSION: i32 = 0;

/// Size of a Halo 2 block header (`signature`, `version`, `element_size`).
pub const BLOCK_HEADER_SIZE: usize = 12;

/// Inline size of a tag reference (`group`, `path pointer`, `name length`, `salt`).
pub const REFERENCE_SIZE: usize = 16;

/// Inline size of a string id.
pub const STRING_ID_SIZE: usize = 4;

/// Longest string id payload the inline length byte can describe.
pub const STRING_ID_MAX_LEN: usize = u8::MAX as usize;

/// Salt value of a reference that does not point at a loaded tag.
pub const NULL_SALT: u32 = u32::MAX;
