//! Lookup of the shipped schemas.

use crate::engine::{Endian, Engine};
use crate::error::{TagError, TagResult};
use crate::group::GroupCode;
use crate::schema::{halo1, halo2, TagGroupDef};
use crate::version::TAG_HEADER_SIZE;

/// Every shipped tag group, Halo 1 first.
pub fn groups() -> impl Iterator<Item = &'static TagGroupDef> {
    halo1::GROUPS.iter().chain(halo2::GROUPS.iter()).copied()
}

pub fn lookup(engine: Engine, code: GroupCode) -> Option<&'static TagGroupDef> {
    groups().find(|group| group.engine == engine && group.code == code)
}

/// Looks a group up by its four-character code or its name.
pub fn find(engine: Engine, code_or_name: &str) -> Option<&'static TagGroupDef> {
    groups()
        .filter(|group| group.engine == engine)
        .find(|group| group.name == code_or_name || group.code.to_string() == code_or_name)
}

/// Identifies the engine from the signature in the last four header bytes.
pub fn detect_engine(bytes: &[u8]) -> TagResult<Engine> {
    if bytes.len() < TAG_HEADER_SIZE {
        return Err(TagError::TooSmall {
            needed: TAG_HEADER_SIZE,
            got: bytes.len(),
        });
    }
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[TAG_HEADER_SIZE - 4..TAG_HEADER_SIZE]);
    Engine::ALL
        .into_iter()
        .find(|engine| {
            let value = engine.signature().to_u32();
            let on_disk = match engine.endian() {
                Endian::Big => value.to_be_bytes(),
                Endian::Little => value.to_le_bytes(),
            };
            on_disk == raw
        })
        .ok_or(TagError::UnknownEngine(GroupCode::new(raw)))
}
