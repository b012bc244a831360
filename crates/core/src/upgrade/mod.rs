//! Graph-to-graph upgrades between schema generations.
//!
//! An upgrade never touches bytes. It walks the target schema, pulls each
//! field from the source graph (by name, or through a [`FieldMapping`]),
//! converts it to the target kind and records what it did in an
//! [`UpgradeReport`]. Donor rules then copy fields the source generation never
//! had from a graph already authored for the target.

pub mod plans;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{TagError, TagResult};
use crate::header::TagHeader;
use crate::schema::{FieldDef, FieldKind, StructDef, TagGroupDef};
use crate::value::{Record, Tag, Value};

/// Where a target field takes its value from.
#[derive(Clone, Copy, Debug)]
pub enum FieldSource {
    /// A differently named source field.
    Rename(&'static str),
    /// An enum renumbered through `(source, target)` pairs. Values missing from
    /// the table fall back to name matching.
    Remap {
        from: &'static str,
        table: &'static [(i64, i64)],
    },
    /// A numeric field multiplied by `factor`.
    Scale { from: &'static str, factor: f32 },
}

impl FieldSource {
    fn source_field(&self) -> &'static str {
        match *self {
            FieldSource::Rename(from)
            | FieldSource::Remap { from, .. }
            | FieldSource::Scale { from, .. } => from,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FieldMapping {
    /// Target struct name.
    pub structure: &'static str,
    /// Target field name.
    pub field: &'static str,
    pub source: FieldSource,
}

/// Copies `fields` into each element of the root block `block` from the donor
/// element whose `key` field matches.
#[derive(Clone, Copy, Debug)]
pub struct DonorRule {
    pub block: &'static str,
    pub key: &'static str,
    pub fields: &'static [&'static str],
}

#[derive(Debug)]
pub struct UpgradePlan {
    pub name: &'static str,
    pub source: &'static TagGroupDef,
    pub target: &'static TagGroupDef,
    pub mappings: &'static [FieldMapping],
    pub donors: &'static [DonorRule],
}

impl UpgradePlan {
    fn mapping(&self, structure: &str, field: &str) -> Option<&FieldMapping> {
        self.mappings
            .iter()
            .find(|mapping| mapping.structure == structure && mapping.field == field)
    }

    fn consumes(&self, structure: &str, source_field: &str) -> bool {
        self.mappings
            .iter()
            .any(|mapping| {
                mapping.structure == structure && mapping.source.source_field() == source_field
            })
    }
}

#[derive(Clone, Debug, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpgradeWarning {
    #[error("no donor element in '{block}' matches key {key}")]
    MissingDonorRecord { block: String, key: String },
    #[error("enum value {value} of '{field}' has no counterpart; defaulted")]
    EnumUnmapped { field: String, value: i64 },
    #[error("flag bits {bits:#x} of '{field}' have no counterpart; dropped")]
    FlagUnmapped { field: String, bits: u64 },
    #[error("value {value} of '{field}' clamped to {clamped}")]
    Clamped {
        field: String,
        value: i64,
        clamped: i64,
    },
    #[error("'{field}' cannot convert {found} to {expected}; defaulted")]
    KindMismatch {
        field: String,
        expected: String,
        found: String,
    },
}

/// What an upgrade did, field by field. Paths are `struct.field`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpgradeReport {
    pub plan: String,
    pub copied: BTreeSet<String>,
    pub defaulted: BTreeSet<String>,
    pub dropped: BTreeSet<String>,
    pub donated: BTreeSet<String>,
    pub warnings: Vec<UpgradeWarning>,
}

#[derive(Debug)]
pub struct UpgradeOutcome {
    pub tag: Tag,
    pub report: UpgradeReport,
}

/// Transforms `tag` from the plan's source schema into its target schema.
pub fn upgrade(tag: &Tag, plan: &UpgradePlan, donor: Option<&Tag>) -> TagResult<UpgradeOutcome> {
    if tag.header.group != plan.source.code {
        return Err(TagError::GroupMismatch {
            expected: plan.source.code,
            found: tag.header.group,
        });
    }
    if tag.header.engine != plan.source.engine {
        return Err(TagError::EngineMismatch {
            expected: plan.source.engine,
            found: tag.header.engine.signature(),
        });
    }
    if let Some(donor) = donor {
        if donor.header.group != plan.target.code || donor.header.engine != plan.target.engine {
            return Err(TagError::DonorGroupMismatch {
                expected: plan.target.code,
                found: donor.header.group,
            });
        }
    }

    let mut upgrader = Upgrader {
        plan,
        report: UpgradeReport {
            plan: plan.name.to_string(),
            ..UpgradeReport::default()
        },
    };
    let mut root = upgrader.record(plan.source.root, plan.target.root, &tag.root);
    match donor {
        Some(donor) => {
            for rule in plan.donors {
                upgrader.donate(rule, &mut root, &donor.root);
            }
        }
        None if !plan.donors.is_empty() => {
            tracing::debug!(plan = plan.name, "no donor supplied, donor rules skipped");
        }
        None => {}
    }

    let header = TagHeader {
        id: tag.header.id,
        kind: tag.header.kind,
        kind_flags: tag.header.kind_flags,
        name: tag.header.name.clone(),
        destination: tag.header.destination,
        ..TagHeader::for_group(plan.target)
    };
    let report = upgrader.report;
    tracing::info!(
        plan = plan.name,
        copied = report.copied.len(),
        defaulted = report.defaulted.len(),
        dropped = report.dropped.len(),
        donated = report.donated.len(),
        warnings = report.warnings.len(),
        "tag upgraded"
    );
    Ok(UpgradeOutcome {
        tag: Tag { header, root },
        report,
    })
}

enum Adjust {
    Keep,
    Remap(&'static [(i64, i64)]),
    Scale(f32),
}

struct Upgrader<'p> {
    plan: &'p UpgradePlan,
    report: UpgradeReport,
}

impl Upgrader<'_> {
    fn warn(&mut self, warning: UpgradeWarning) {
        tracing::warn!(plan = self.plan.name, "{warning}");
        self.report.warnings.push(warning);
    }

    fn record(
        &mut self,
        source_def: &StructDef,
        target_def: &StructDef,
        source: &Record,
    ) -> Record {
        let mut out = Record::new();
        for field in target_def.fields {
            if field.is_pad() {
                continue;
            }
            let statically_absent = field
                .condition
                .and_then(|condition| {
                    condition.holds_statically(self.plan.target.engine, self.plan.target.version)
                })
                == Some(false);
            if statically_absent {
                continue;
            }
            let path = format!("{}.{}", target_def.name, field.name);
            let (source_name, adjust) = match self.plan.mapping(target_def.name, field.name) {
                Some(mapping) => match mapping.source {
                    FieldSource::Rename(from) => (from, Adjust::Keep),
                    FieldSource::Remap { from, table } => (from, Adjust::Remap(table)),
                    FieldSource::Scale { from, factor } => (from, Adjust::Scale(factor)),
                },
                None => (field.name, Adjust::Keep),
            };
            let converted = match (source_def.field(source_name), source.get(source_name)) {
                (Some(source_field), Some(value)) => {
                    self.convert(&path, source_field, field, value, adjust)
                }
                _ => None,
            };
            match converted {
                Some(value) => {
                    self.report.copied.insert(path);
                    out.insert(field.name, value);
                }
                None => {
                    if let Some(value) = field.default_value() {
                        tracing::debug!(field = %path, "defaulted during upgrade");
                        out.insert(field.name, value);
                    }
                    self.report.defaulted.insert(path);
                }
            }
        }
        for field in source_def.fields {
            if field.is_pad() || !source.contains(field.name) {
                continue;
            }
            let kept = target_def.field(field.name).is_some()
                || self.plan.consumes(target_def.name, field.name);
            if !kept {
                self.report
                    .dropped
                    .insert(format!("{}.{}", source_def.name, field.name));
            }
        }
        out
    }

    /// Converts `value` to the target kind; `None` means the field is defaulted.
    fn convert(
        &mut self,
        path: &str,
        source: &FieldDef,
        target: &FieldDef,
        value: &Value,
        adjust: Adjust,
    ) -> Option<Value> {
        match (source.kind, target.kind, value) {
            (
                FieldKind::Block(source_def),
                FieldKind::Block(target_def),
                Value::Block(elements),
            ) => {
                let elements = elements
                    .iter()
                    .map(|element| self.record(source_def, target_def, element))
                    .collect();
                Some(Value::Block(elements))
            }
            (FieldKind::Enum(_, source_options), FieldKind::Enum(_, options), Value::Enum(raw)) => {
                let remapped = match adjust {
                    Adjust::Remap(table) => table
                        .iter()
                        .find(|(from, _)| from == raw)
                        .map(|(_, to)| *to),
                    _ => None,
                };
                let by_name = || {
                    source_options
                        .name_of(*raw)
                        .and_then(|name| options.index_of(name))
                };
                let in_range = (0..options.len() as i64).contains(raw).then_some(*raw);
                match remapped.or_else(by_name).or(in_range) {
                    Some(mapped) => Some(Value::Enum(mapped)),
                    None => {
                        self.warn(UpgradeWarning::EnumUnmapped {
                            field: path.to_string(),
                            value: *raw,
                        });
                        None
                    }
                }
            }
            (
                FieldKind::Flags(_, source_bits),
                FieldKind::Flags(width, target_bits),
                Value::Flags(raw),
            ) => {
                let mut mapped = 0u64;
                let mut unmapped = 0u64;
                for bit in 0..64u32 {
                    if raw & (1u64 << bit) == 0 {
                        continue;
                    }
                    let target_bit = source_bits
                        .name_of(bit)
                        .and_then(|name| target_bits.bit_of(name))
                        .filter(|target_bit| *target_bit < width.bits());
                    match target_bit {
                        Some(target_bit) => mapped |= 1u64 << target_bit,
                        None => unmapped |= 1u64 << bit,
                    }
                }
                if unmapped != 0 {
                    self.warn(UpgradeWarning::FlagUnmapped {
                        field: path.to_string(),
                        bits: unmapped,
                    });
                }
                Some(Value::Flags(mapped))
            }
            (_, FieldKind::Rgb, Value::Rgba([red, green, blue, _])) => {
                Some(Value::Rgb([*red, *green, *blue]))
            }
            (_, FieldKind::Argb, Value::Rgb([red, green, blue])) => {
                Some(Value::Rgba([*red, *green, *blue, 1.0]))
            }
            (_, target_kind, Value::Int(_) | Value::Real(_) | Value::Angle(_))
                if is_numeric(target_kind) =>
            {
                self.numeric(path, target_kind, value, adjust)
            }
            (_, target_kind, value) => {
                let expected = target_kind.default_value();
                let compatible = expected
                    .as_ref()
                    .is_some_and(|expected| expected.kind_name() == value.kind_name());
                if compatible {
                    Some(value.clone())
                } else {
                    self.warn(UpgradeWarning::KindMismatch {
                        field: path.to_string(),
                        expected: target_kind.label().to_string(),
                        found: value.kind_name().to_string(),
                    });
                    None
                }
            }
        }
    }

    fn numeric(
        &mut self,
        path: &str,
        kind: FieldKind,
        value: &Value,
        adjust: Adjust,
    ) -> Option<Value> {
        let factor = match adjust {
            Adjust::Scale(factor) => f64::from(factor),
            _ => 1.0,
        };
        let number = match value {
            Value::Int(raw) => *raw as f64,
            Value::Real(real) | Value::Angle(real) => f64::from(*real),
            _ => return None,
        } * factor;
        match kind {
            FieldKind::Real => Some(Value::Real(number as f32)),
            FieldKind::Angle => Some(Value::Angle(number as f32)),
            _ => {
                let (min, max) = kind.int_range()?;
                let rounded = number.round();
                let clamped = (rounded.clamp(min as f64, max as f64)) as i64;
                if rounded < min as f64 || rounded > max as f64 {
                    self.warn(UpgradeWarning::Clamped {
                        field: path.to_string(),
                        value: rounded as i64,
                        clamped,
                    });
                }
                Some(Value::Int(clamped))
            }
        }
    }

    fn donate(&mut self, rule: &DonorRule, root: &mut Record, donor: &Record) {
        let donor_elements = donor.block(rule.block).unwrap_or(&[]);
        let Some(elements) = root.block_mut(rule.block) else {
            return;
        };
        for element in elements.iter_mut() {
            let Some(key) = element.get(rule.key).cloned() else {
                continue;
            };
            let matched = donor_elements.iter().find(|candidate| {
                candidate
                    .get(rule.key)
                    .is_some_and(|other| keys_match(&key, other))
            });
            let Some(source) = matched else {
                self.warn(UpgradeWarning::MissingDonorRecord {
                    block: rule.block.to_string(),
                    key: describe_key(&key),
                });
                continue;
            };
            for field in rule.fields {
                if let Some(value) = source.get(field) {
                    element.insert(*field, value.clone());
                    self.report
                        .donated
                        .insert(format!("{}.{}", rule.block, field));
                }
            }
        }
    }
}

fn is_numeric(kind: FieldKind) -> bool {
    matches!(kind, FieldKind::Real | FieldKind::Angle) || kind.int_range().is_some()
}

fn keys_match(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Reference(left), Value::Reference(right)) => left.same_path(right),
        _ => left == right,
    }
}

fn describe_key(key: &Value) -> String {
    match key {
        Value::Reference(reference) => format!("'{}'", reference.path),
        Value::Text(text) => format!("'{text}'"),
        Value::Int(raw) | Value::Enum(raw) => raw.to_string(),
        other => other.kind_name().to_string(),
    }
}
