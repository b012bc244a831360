#![allow(dead_code)]

//! Test-only schemas and sample graphs shared by the integration tests.

use tag_engine::group::codes;
use tag_engine::schema::{
    angle, argb, block, data, enum16, euler2, euler3, flags16, int16, int32, int8, pad, point2,
    point3, real, real_bounds, reference, rgb, string32, string_id, uint16, uint32, uint8,
    Condition, Scalar, StructDef, TagGroupDef,
};
use tag_engine::{Engine, GroupCode, Record, Tag, TagReference, Value};

pub const SINK_CODE: GroupCode = GroupCode::new(*b"sink");

/// Bit of `sink.options` that enables `extended_value`.
pub const EXTENDED: u64 = 1 << 1;

pub static LEAF: StructDef = StructDef {
    name: "leaf",
    fields: &[
        int16("id"),
        reference("target", &[codes::BITMAP]),
        string_id("label"),
    ],
};

/// One field of every kind, plus one gate of every flavour.
pub static SINK: StructDef = StructDef {
    name: "sink",
    fields: &[
        int8("tiny"),
        int16("small"),
        int32("large"),
        uint8("byte"),
        uint16("word"),
        uint32("dword"),
        real("scale").default_to(Scalar::Real(1.0)),
        angle("heading"),
        point2("anchor"),
        point3("origin"),
        euler2("tilt"),
        euler3("orientation"),
        real_bounds("range"),
        rgb("tint"),
        argb("glow"),
        enum16("mode", &["off", "on", "auto"]).default_to(Scalar::Int(2)),
        flags16("options", &["visible", "extended", "locked"]),
        int32("extended_value").when(Condition::FlagSet {
            field: "options",
            mask: EXTENDED,
        }),
        int16("basic_value").when(Condition::FlagClear {
            field: "options",
            mask: EXTENDED,
        }),
        string32("label"),
        string_id("interned"),
        block("leaves", &LEAF),
        reference("link", &[codes::BITMAP, codes::SHADER]),
        data("payload"),
        pad(4),
        real("modern").when(Condition::Engine(Engine::Halo2)),
        int16("late").when(Condition::MinVersion(3)),
        pad(2).when(Condition::MinVersion(3)),
    ],
};

pub static SINK_HALO1: TagGroupDef = TagGroupDef {
    code: SINK_CODE,
    name: "sink",
    engine: Engine::Halo1,
    version: 3,
    root: &SINK,
};

pub static SINK_HALO2: TagGroupDef = TagGroupDef {
    code: SINK_CODE,
    name: "sink",
    engine: Engine::Halo2,
    version: 3,
    root: &SINK,
};

pub fn sink_group(engine: Engine) -> &'static TagGroupDef {
    match engine {
        Engine::Halo1 => &SINK_HALO1,
        Engine::Halo2 => &SINK_HALO2,
    }
}

pub fn leaf(id: i64, path: &str, label: &str) -> Record {
    Record::new()
        .with("id", Value::Int(id))
        .with(
            "target",
            Value::Reference(TagReference::new(codes::BITMAP, path)),
        )
        .with("label", Value::Text(label.to_string()))
}

/// A fully populated sink record holding exactly the fields a reader of
/// `engine` at version 3 produces. Angles are zero so bytes survive a round
/// trip unchanged.
pub fn sample_sink(engine: Engine) -> Record {
    let mut record = Record::new()
        .with("tiny", Value::Int(-5))
        .with("small", Value::Int(-300))
        .with("large", Value::Int(70_000))
        .with("byte", Value::Int(200))
        .with("word", Value::Int(60_000))
        .with("dword", Value::Int(4_000_000_000))
        .with("scale", Value::Real(2.5))
        .with("heading", Value::Angle(0.0))
        .with("anchor", Value::Point2([1.0, -1.0]))
        .with("origin", Value::Point3([0.5, 1.5, 2.5]))
        .with("tilt", Value::Euler2([0.0, 0.0]))
        .with("orientation", Value::Euler3([0.0, 0.0, 0.0]))
        .with("range", Value::Bounds([0.25, 8.0]))
        .with("tint", Value::Rgb([1.0, 0.5, 0.0]))
        .with("glow", Value::Rgba([0.1, 0.2, 0.3, 0.75]))
        .with("mode", Value::Enum(1))
        .with("options", Value::Flags(0b101 | EXTENDED))
        .with("extended_value", Value::Int(-42))
        .with("label", Value::Text("sink label".to_string()))
        .with("interned", Value::Text("default_camera".to_string()))
        .with(
            "leaves",
            Value::Block(vec![leaf(1, "levels\\a\\bitmap", "first"), leaf(2, "", "")]),
        )
        .with(
            "link",
            Value::Reference(TagReference::new(codes::SHADER, "shaders\\metal")),
        )
        .with("payload", Value::Data(vec![0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01]))
        .with("late", Value::Int(7));
    if engine == Engine::Halo2 {
        record.insert("modern", Value::Real(-0.5));
    }
    record
}

pub fn sample_sink_tag(engine: Engine) -> Tag {
    let group = sink_group(engine);
    let mut tag = Tag::with_root(group, sample_sink(engine));
    tag.header.name = "sample".to_string();
    tag
}

pub fn approx_eq(left: f32, right: f32) -> bool {
    (left - right).abs() <= 1e-3
}

/// Deterministic xorshift64* byte fill.
pub fn fill_deterministic(buf: &mut [u8], seed: u64) {
    let mut state = seed;
    for byte in buf.iter_mut() {
        state ^= state >> 12;
        state ^= state << 25;
        state ^= state >> 27;
        state = state.wrapping_mul(0x2545_F491_4F6C_DD1D);
        *byte = (state & 0xFF) as u8;
    }
}
