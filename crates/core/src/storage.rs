//! Tag files on disk.
//!
//! Writes go to `<file>.tmp` first and are renamed into place; the previous
//! contents, if any, are kept as `<file>.bak`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::driver::{self, ReadOutcome, WriteReport};
use crate::error::{TagError, TagResult};
use crate::schema::TagGroupDef;
use crate::value::Tag;

const BACKUP_SUFFIX: &str = ".bak";
const TMP_SUFFIX: &str = ".tmp";

pub fn read_tag_file(path: &Path, group: &'static TagGroupDef) -> TagResult<ReadOutcome> {
    let bytes = fs::read(path)?;
    driver::read_tag_bytes(&bytes, group)
}

/// Reads a tag whose engine and group come from its own header.
pub fn read_tag_file_auto(path: &Path) -> TagResult<ReadOutcome> {
    let bytes = fs::read(path)?;
    driver::read_tag_auto(&bytes)
}

/// Reads `path`, falling back to its `.bak` copy when the primary file is
/// missing a usable tag.
pub fn read_tag_file_with_recovery(
    path: &Path,
    group: &'static TagGroupDef,
) -> TagResult<ReadOutcome> {
    let primary = match read_tag_file(path, group) {
        Ok(outcome) => return Ok(outcome),
        Err(err) => err,
    };
    let backup = backup_path(path);
    match fs::read(&backup) {
        Ok(bytes) => match driver::read_tag_bytes(&bytes, group) {
            Ok(outcome) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %primary,
                    "tag file unreadable, recovered from backup"
                );
                Ok(outcome)
            }
            Err(backup_err) => Err(TagError::RecoveryFailed {
                primary: Box::new(primary),
                backup: Some(Box::new(backup_err)),
            }),
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(TagError::RecoveryFailed {
            primary: Box::new(primary),
            backup: None,
        }),
        Err(err) => Err(TagError::Io(err)),
    }
}

pub fn write_tag_file(
    path: &Path,
    tag: &Tag,
    group: &'static TagGroupDef,
) -> TagResult<WriteReport> {
    let (bytes, report) = driver::write_tag_bytes(tag, group)?;
    atomic_write(path, &bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "tag file written");
    Ok(report)
}

fn atomic_write(path: &Path, bytes: &[u8]) -> TagResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    if path.exists() {
        fs::copy(path, backup_path(path))?;
    }
    let tmp_path = sibling_with_suffix(path, TMP_SUFFIX);
    fs::write(&tmp_path, bytes)?;
    if path.exists() {
        fs::remove_file(path)?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

pub fn backup_path(path: &Path) -> PathBuf {
    sibling_with_suffix(path, BACKUP_SUFFIX)
}

/// Whether `path` is a backup or temporary file left by [`write_tag_file`].
pub fn is_sidecar(path: &Path) -> bool {
    let name = path.as_os_str().to_string_lossy();
    name.ends_with(BACKUP_SUFFIX) || name.ends_with(TMP_SUFFIX)
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut output = path.as_os_str().to_os_string();
    output.push(suffix);
    PathBuf::from(output)
}

#[cfg(test)]
#[path = "tests/storage_tests.rs"]
mod tests;
