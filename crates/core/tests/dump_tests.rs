use tag_engine::dump::{self, DumpOptions};
use tag_engine::schema::halo1;
use tag_engine::{Engine, Record, Tag, Value};

mod common;
use common::{sample_sink_tag, sink_group};

#[test]
fn dump_names_enums_flags_and_blocks() {
    let tag = sample_sink_tag(Engine::Halo1);
    let xml = dump::render(&tag, sink_group(Engine::Halo1)).expect("render");

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(xml.contains(r#"<tag group="sink" name="sink" engine="halo1" version="3">"#));
    assert!(xml.contains(r#"<field name="mode" type="enum16">on</field>"#));
    assert!(
        xml.contains(r#"<field name="options" type="flags16">visible | extended | locked</field>"#)
    );
    assert!(xml.contains(r#"<field name="leaves" type="block" count="2">"#));
    assert!(xml.contains(r#"<element index="1">"#));
    assert!(
        xml.contains(r#"<field name="link" type="reference" group="shad" path="shaders\metal"/>"#)
    );
    assert!(xml.contains(r#"<field name="payload" type="data" length="6"/>"#));
    assert!(xml.contains(r#"<field name="range" type="bounds">0.25, 8</field>"#));
    assert!(xml.contains(r#"<field name="extended_value" type="int32">-42</field>"#));
    // gated off by the engine and by the flags
    assert!(!xml.contains(r#"name="modern""#));
    assert!(!xml.contains(r#"name="basic_value""#));
    assert!(xml.trim_end().ends_with("</tag>"));
}

#[test]
fn dump_marks_unknown_values_and_missing_fields() {
    let group = &halo1::ACTOR_VARIANT;
    let root = Record::new()
        .with("flags", Value::Flags(0x100 | 0b1))
        .with("movement_type", Value::Enum(7));
    let xml = dump::render(&Tag::with_root(group, root), group).expect("render");

    assert!(
        xml.contains(r#"<field name="flags" type="flags32">can_shoot_while_flying | 0x100</field>"#)
    );
    assert!(xml.contains(r#"<field name="movement_type" type="enum16">unknown(7)</field>"#));
    assert!(xml.contains(r#"<field name="rate_of_fire" type="real" missing="true"/>"#));
    assert!(!xml.contains(r#"name="camouflage_fade_time""#));
}

#[test]
fn zero_indent_renders_on_one_line() {
    let tag = sample_sink_tag(Engine::Halo2);
    let xml = dump::render_with(&tag, sink_group(Engine::Halo2), DumpOptions { indent: 0 })
        .expect("render");
    assert_eq!(xml.lines().count(), 1);
    assert!(xml.contains(r#"name="modern""#));

    let indented = dump::render(&tag, sink_group(Engine::Halo2)).expect("render");
    assert!(indented.lines().count() > 10);
    assert!(indented.contains("\n  <field name=\"tiny\""));
}

#[test]
fn text_is_escaped() {
    let mut tag = sample_sink_tag(Engine::Halo1);
    tag.root.insert("label", Value::Text("a<b & c".to_string()));
    let xml = dump::render(&tag, sink_group(Engine::Halo1)).expect("render");
    assert!(xml.contains("a&lt;b &amp; c"));
}
