//! Human-readable XML rendering of a decoded tag.
//!
//! The dump walks the schema in field order, so it shows exactly the fields a
//! reader would have visited. Padding is never shown.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::engine::Engine;
use crate::error::{TagError, TagResult};
use crate::schema::{FieldDef, FieldKind, StructDef, TagGroupDef};
use crate::value::{Record, Tag, Value};

#[derive(Clone, Copy, Debug)]
pub struct DumpOptions {
    /// Spaces per nesting level; 0 writes everything on one line.
    pub indent: usize,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

pub fn render(tag: &Tag, group: &TagGroupDef) -> TagResult<String> {
    render_with(tag, group, DumpOptions::default())
}

pub fn render_with(tag: &Tag, group: &TagGroupDef, options: DumpOptions) -> TagResult<String> {
    let mut dump = Dump {
        writer: if options.indent == 0 {
            Writer::new(Vec::new())
        } else {
            Writer::new_with_indent(Vec::new(), b' ', options.indent)
        },
        engine: group.engine,
        version: tag.header.version,
    };
    dump.emit(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let group_code = group.code.to_string();
    let version = tag.header.version.to_string();
    let mut root = BytesStart::new("tag");
    root.push_attribute(("group", group_code.as_str()));
    root.push_attribute(("name", group.name));
    root.push_attribute(("engine", group.engine.label()));
    root.push_attribute(("version", version.as_str()));
    dump.emit(Event::Start(root))?;
    dump.record(group.root, &tag.root)?;
    dump.emit(Event::End(BytesEnd::new("tag")))?;

    String::from_utf8(dump.writer.into_inner()).map_err(|err| TagError::Dump(err.to_string()))
}

struct Dump {
    writer: Writer<Vec<u8>>,
    engine: Engine,
    version: u16,
}

impl Dump {
    fn emit(&mut self, event: Event<'_>) -> TagResult<()> {
        self.writer
            .write_event(event)
            .map_err(|err| TagError::Dump(err.to_string()))
    }

    fn record(&mut self, def: &StructDef, record: &Record) -> TagResult<()> {
        for field in def.fields {
            if field.is_pad() {
                continue;
            }
            let present = field
                .condition
                .map_or(true, |condition| condition.holds(self.engine, self.version, record));
            if !present {
                continue;
            }
            match record.get(field.name) {
                Some(value) => self.field(field, value)?,
                None => {
                    let mut element = BytesStart::new("field");
                    element.push_attribute(("name", field.name));
                    element.push_attribute(("type", field.kind.label()));
                    element.push_attribute(("missing", "true"));
                    self.emit(Event::Empty(element))?;
                }
            }
        }
        Ok(())
    }

    fn field(&mut self, field: &FieldDef, value: &Value) -> TagResult<()> {
        let mut element = BytesStart::new("field");
        element.push_attribute(("name", field.name));
        element.push_attribute(("type", field.kind.label()));

        match (field.kind, value) {
            (FieldKind::Block(def), Value::Block(elements)) => {
                let count = elements.len().to_string();
                element.push_attribute(("count", count.as_str()));
                if elements.is_empty() {
                    return self.emit(Event::Empty(element));
                }
                self.emit(Event::Start(element))?;
                for (index, item) in elements.iter().enumerate() {
                    let index = index.to_string();
                    let mut entry = BytesStart::new("element");
                    entry.push_attribute(("index", index.as_str()));
                    self.emit(Event::Start(entry))?;
                    self.record(def, item)?;
                    self.emit(Event::End(BytesEnd::new("element")))?;
                }
                self.emit(Event::End(BytesEnd::new("field")))
            }
            (FieldKind::Reference(_), Value::Reference(reference)) => {
                let group = reference.group.to_string();
                element.push_attribute(("group", group.as_str()));
                element.push_attribute(("path", reference.path.as_str()));
                self.emit(Event::Empty(element))
            }
            (FieldKind::Data, Value::Data(bytes)) => {
                let length = bytes.len().to_string();
                element.push_attribute(("length", length.as_str()));
                self.emit(Event::Empty(element))
            }
            (kind, value) => {
                let text = describe(kind, value);
                self.emit(Event::Start(element))?;
                self.emit(Event::Text(BytesText::new(&text)))?;
                self.emit(Event::End(BytesEnd::new("field")))
            }
        }
    }
}

fn join(components: &[f32]) -> String {
    components
        .iter()
        .map(|component| component.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Scalar value as shown in the dump; enums and flags use their schema names.
fn describe(kind: FieldKind, value: &Value) -> String {
    match (kind, value) {
        (FieldKind::Enum(_, options), Value::Enum(raw)) => match options.name_of(*raw) {
            Some(name) => name.to_string(),
            None => format!("unknown({raw})"),
        },
        (FieldKind::Flags(_, bits), Value::Flags(raw)) => {
            let mut names: Vec<String> = bits
                .names_of(*raw)
                .into_iter()
                .map(str::to_string)
                .collect();
            let unknown = bits.unknown_bits(*raw);
            if unknown != 0 {
                names.push(format!("{unknown:#x}"));
            }
            names.join(" | ")
        }
        (_, Value::Int(raw)) => raw.to_string(),
        (_, Value::Real(real)) | (_, Value::Angle(real)) => real.to_string(),
        (_, Value::Point2(components))
        | (_, Value::Euler2(components))
        | (_, Value::Bounds(components)) => join(components),
        (_, Value::Point3(components))
        | (_, Value::Euler3(components))
        | (_, Value::Rgb(components)) => join(components),
        (_, Value::Rgba(components)) => join(components),
        (_, Value::Text(text)) => text.clone(),
        (_, other) => other.kind_name().to_string(),
    }
}
