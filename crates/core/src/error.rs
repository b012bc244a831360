use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::Engine;
use crate::group::GroupCode;

pub type TagResult<T> = Result<T, TagError>;

/// Fatal failures. A read or write that returns one of these produced no graph
/// and no bytes.
#[derive(Debug, Error, Diagnostic)]
pub enum TagError {
    #[error("tag data too small: need {needed} bytes, got {got}")]
    #[diagnostic(code("tag.too_small"))]
    TooSmall { needed: usize, got: usize },
    #[error(
        "engine signature mismatch: expected {expected} ({}), found {found}",
        expected.signature()
    )]
    #[diagnostic(
        code("tag.engine_mismatch"),
        help("the file was probably authored for the other engine generation")
    )]
    EngineMismatch { expected: Engine, found: GroupCode },
    #[error("unrecognized engine signature {0}")]
    #[diagnostic(code("tag.unknown_engine"))]
    UnknownEngine(GroupCode),
    #[error("tag group mismatch: expected {expected}, found {found}")]
    #[diagnostic(code("tag.group_mismatch"))]
    GroupMismatch { expected: GroupCode, found: GroupCode },
    #[error("no {engine} schema for tag group {code}")]
    #[diagnostic(code("tag.unknown_group"))]
    UnknownGroup { engine: Engine, code: GroupCode },
    #[error("unexpected end of tag data at offset {offset}: need {needed} more bytes")]
    #[diagnostic(code("tag.unexpected_eof"))]
    UnexpectedEof { offset: usize, needed: usize },
    #[error("block '{block}' declares {count} elements but only {remaining} bytes remain")]
    #[diagnostic(code("tag.block_overflow"))]
    BlockOverflow {
        block: String,
        count: i64,
        remaining: usize,
    },
    #[error("data field '{field}' declares {size} bytes but only {remaining} bytes remain")]
    #[diagnostic(code("tag.data_overflow"))]
    DataOverflow {
        field: String,
        size: i64,
        remaining: usize,
    },
    #[error("block '{block}' has a malformed header signature {found}")]
    #[diagnostic(code("tag.block_header"))]
    BlockHeader { block: String, found: GroupCode },
    #[error("field '{field}' expects a {expected} value, found {found}")]
    #[diagnostic(code("tag.field_type"))]
    FieldType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("field '{field}' value {value} does not fit in {kind}")]
    #[diagnostic(code("tag.value_range"))]
    ValueRange {
        field: String,
        value: i64,
        kind: &'static str,
    },
    #[error("donor tag group {found} does not match upgrade target {expected}")]
    #[diagnostic(code("tag.donor_group_mismatch"))]
    DonorGroupMismatch { expected: GroupCode, found: GroupCode },
    #[error("tag file is unreadable ({primary}) and its backup could not be used")]
    #[diagnostic(
        code("tag.recovery_failed"),
        help("the backup is the previous version of the file, kept as <file>.bak")
    )]
    RecoveryFailed {
        primary: Box<TagError>,
        backup: Option<Box<TagError>>,
    },
    #[error("io error: {0}")]
    #[diagnostic(code("tag.io"))]
    Io(#[from] std::io::Error),
    #[error("graph serialization error: {0}")]
    #[diagnostic(code("tag.json"))]
    Json(#[from] serde_json::Error),
    #[error("debug dump error: {0}")]
    #[diagnostic(code("tag.dump"))]
    Dump(String),
}

/// Recoverable conditions collected while reading or writing.
///
/// They travel alongside a successful result; the caller decides whether they
/// matter.
#[derive(Clone, Debug, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TagWarning {
    #[error("{count} bytes remain after the schema walk")]
    TrailingBytes { count: usize },
    #[error("header checksum {expected:#010x} does not match body checksum {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    #[error("block '{block}' header declares element size {found}, schema expects {expected}")]
    BlockSizeMismatch {
        block: String,
        expected: u32,
        found: u32,
    },
    #[error("reference path at offset {offset} is not NUL terminated")]
    UnterminatedPath { offset: usize },
    #[error("field '{field}' truncated to {limit} bytes")]
    Truncated { field: String, limit: usize },
}

#[cold]
#[inline(never)]
pub(crate) fn field_type_error(
    field: &str,
    expected: &'static str,
    found: &'static str,
) -> TagError {
    TagError::FieldType {
        field: field.to_string(),
        expected,
        found,
    }
}

#[cold]
#[inline(never)]
pub(crate) fn value_range_error(field: &str, value: i64, kind: &'static str) -> TagError {
    TagError::ValueRange {
        field: field.to_string(),
        value,
        kind,
    }
}
