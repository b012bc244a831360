//! Reader, writer and upgrader for chunked binary game tags.
//!
//! A tag is a 64-byte header followed by a body laid out by a static schema.
//! [`driver`] turns bytes into a [`Tag`] graph and back, [`upgrade`] moves a
//! graph between engine generations and [`dump`] renders one for humans.

pub mod block;
pub mod config;
pub mod driver;
pub mod dump;
pub mod engine;
pub mod error;
pub mod group;
pub mod header;
pub mod reference;
pub mod registry;
pub mod schema;
pub mod storage;
pub mod stream;
pub mod upgrade;
pub mod value;
pub mod version;
mod walk;

pub use config::{ConfigError, ToolConfig};
pub use driver::{
    read_tag, read_tag_auto, read_tag_bytes, write_tag, write_tag_bytes, ReadOutcome, WriteReport,
};
pub use engine::{Endian, Engine};
pub use error::{TagError, TagResult, TagWarning};
pub use group::GroupCode;
pub use header::TagHeader;
pub use schema::{StructDef, TagGroupDef};
pub use stream::{TagReader, TagWriter};
pub use upgrade::{upgrade, UpgradeOutcome, UpgradePlan, UpgradeReport, UpgradeWarning};
pub use value::{Record, Tag, TagReference, Value};
