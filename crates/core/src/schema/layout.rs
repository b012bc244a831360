use std::fmt;

use crate::engine::Engine;

use super::StructDef;

/// Placement of one field inside a struct's fixed body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldLayout {
    /// Empty for padding.
    pub name: &'static str,
    pub kind: &'static str,
    pub offset: usize,
    pub size: usize,
    /// Present only when a flag condition holds.
    pub gated: bool,
}

/// Fixed-body layout of a struct for one engine and version, with every
/// flag-gated field counted as present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructLayout {
    pub name: &'static str,
    pub engine: Engine,
    pub size: usize,
    pub fields: Vec<FieldLayout>,
}

impl StructLayout {
    pub(super) fn compute(def: &StructDef, engine: Engine, version: u16) -> Self {
        let mut offset = 0;
        let mut fields = Vec::with_capacity(def.fields.len());
        for field in def.fields {
            let statically = field
                .condition
                .map(|condition| condition.holds_statically(engine, version));
            if statically == Some(Some(false)) {
                continue;
            }
            let size = field.kind.inline_size(engine);
            fields.push(FieldLayout {
                name: field.name,
                kind: field.kind.label(),
                offset,
                size,
                gated: statically == Some(None),
            });
            offset += size;
        }
        Self {
            name: def.name,
            engine,
            size: offset,
            fields,
        }
    }

    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .find(|field| !field.name.is_empty() && field.name == name)
            .map(|field| field.offset)
    }
}

impl fmt::Display for StructLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}] {} bytes", self.name, self.engine, self.size)?;
        for field in &self.fields {
            let name = if field.name.is_empty() { "-" } else { field.name };
            let gate = if field.gated { " ?" } else { "" };
            writeln!(
                f,
                "{:#06x} {:>4} {:<10} {}{}",
                field.offset, field.size, field.kind, name, gate
            )?;
        }
        Ok(())
    }
}
