use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::group::GroupCode;
use crate::version::{HALO1_SIGNATURE, HALO2_SIGNATURE};

/// Byte order of a tag stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endian {
    Big,
    Little,
}

/// Engine generation a tag file was authored for.
///
/// The generation fixes everything about the container that is not described
/// by the schema: byte order, header signature and descriptor widths.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    Halo1,
    Halo2,
}

impl Engine {
    pub const ALL: [Engine; 2] = [Engine::Halo1, Engine::Halo2];

    pub const fn endian(self) -> Endian {
        match self {
            Engine::Halo1 => Endian::Big,
            Engine::Halo2 => Endian::Little,
        }
    }

    /// Signature stored in the last four bytes of the tag header.
    pub const fn signature(self) -> GroupCode {
        match self {
            Engine::Halo1 => HALO1_SIGNATURE,
            Engine::Halo2 => HALO2_SIGNATURE,
        }
    }

    /// Inline size of a tag block descriptor.
    pub const fn block_descriptor_size(self) -> usize {
        match self {
            // count, address, definition
            Engine::Halo1 => 12,
            // count, address
            Engine::Halo2 => 8,
        }
    }

    /// Inline size of a tag data descriptor.
    pub const fn data_descriptor_size(self) -> usize {
        match self {
            Engine::Halo1 => 20,
            Engine::Halo2 => 8,
        }
    }

    /// Whether element arrays are preceded by a `tbfd` block header.
    pub const fn uses_block_headers(self) -> bool {
        matches!(self, Engine::Halo2)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Engine::Halo1 => "halo1",
            Engine::Halo2 => "halo2",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Engine {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "halo1" | "h1" => Ok(Engine::Halo1),
            "halo2" | "h2" => Ok(Engine::Halo2),
            other => Err(format!("unknown engine '{other}' (expected halo1 or halo2)")),
        }
    }
}
