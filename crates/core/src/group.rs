use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Four-character tag group code such as `scnr` or `bitm`.
///
/// The code is stored on disk as a `u32` in the stream byte order, which is why
/// little-endian tag files show it reversed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupCode([u8; 4]);

impl GroupCode {
    /// Group code of a reference slot that names no group.
    pub const NONE: GroupCode = GroupCode([0xFF; 4]);

    pub const fn new(code: [u8; 4]) -> Self {
        Self(code)
    }

    /// Interprets `value` with the first character in the most significant byte.
    pub const fn from_u32(value: u32) -> Self {
        Self(value.to_be_bytes())
    }

    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl fmt::Display for GroupCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return f.write_str("none");
        }
        for byte in self.0 {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{byte:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for GroupCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupCode({self})")
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseGroupCodeError(String);

impl fmt::Display for ParseGroupCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid group code '{}': expected up to four ASCII characters",
            self.0
        )
    }
}

impl std::error::Error for ParseGroupCodeError {}

impl FromStr for GroupCode {
    type Err = ParseGroupCodeError;

    /// Parses `scnr`, `sky` (space padded to `sky `) or `none`.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input == "none" {
            return Ok(Self::NONE);
        }
        if input.is_empty() || input.len() > 4 || !input.is_ascii() {
            return Err(ParseGroupCodeError(input.to_string()));
        }
        let mut code = [b' '; 4];
        code[..input.len()].copy_from_slice(input.as_bytes());
        Ok(Self(code))
    }
}

impl Serialize for GroupCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GroupCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Group codes of the tag groups the shipped schemas read or reference.
pub mod codes {
    use super::GroupCode;

    pub const ACTOR: GroupCode = GroupCode::new(*b"actr");
    pub const ACTOR_VARIANT: GroupCode = GroupCode::new(*b"actv");
    pub const BITMAP: GroupCode = GroupCode::new(*b"bitm");
    pub const EQUIPMENT: GroupCode = GroupCode::new(*b"eqip");
    pub const LENS_FLARE: GroupCode = GroupCode::new(*b"lens");
    pub const LIGHT_RESPONSE: GroupCode = GroupCode::new(*b"slit");
    pub const LIGHTMAP: GroupCode = GroupCode::new(*b"ltmp");
    pub const SCENARIO: GroupCode = GroupCode::new(*b"scnr");
    pub const SCENERY: GroupCode = GroupCode::new(*b"scen");
    pub const SHADER: GroupCode = GroupCode::new(*b"shad");
    pub const SHADER_ENVIRONMENT: GroupCode = GroupCode::new(*b"senv");
    pub const SHADER_TEMPLATE: GroupCode = GroupCode::new(*b"stem");
    pub const SKY: GroupCode = GroupCode::new(*b"sky ");
    pub const STRUCTURE_BSP: GroupCode = GroupCode::new(*b"sbsp");
    pub const UNIT: GroupCode = GroupCode::new(*b"unit");
    pub const WEAPON: GroupCode = GroupCode::new(*b"weap");
}
