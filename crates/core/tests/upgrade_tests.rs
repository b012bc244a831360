use tag_engine::group::codes;
use tag_engine::schema::{
    argb, enum16, flags16, flags8, halo1, halo2, int16, int32, int8, real, rgb, string32,
    string_id, Scalar, StructDef, TagGroupDef,
};
use tag_engine::upgrade::plans::{self, BITMAP_HALO1_TO_HALO2, SCENARIO_HALO1_TO_HALO2};
use tag_engine::upgrade::{FieldMapping, FieldSource};
use tag_engine::{
    read_tag_bytes, upgrade, write_tag_bytes, Engine, GroupCode, Record, Tag, TagError,
    TagReference, UpgradePlan, UpgradeWarning, Value,
};

fn bsp(path: &str) -> Record {
    Record::new().with(
        "structure_bsp",
        Value::Reference(TagReference::new(codes::STRUCTURE_BSP, path)),
    )
}

/// A Halo 1 scenario as a reader would produce it, every field present.
fn halo1_scenario() -> Tag {
    let mut tag = Tag::new(&halo1::SCENARIO);
    tag.header.name = "b30".to_string();
    tag.root.insert("type", Value::Enum(1));
    tag.root.insert("flags", Value::Flags(0b11));
    tag.root.insert(
        "object_names",
        Value::Block(vec![Record::new()
            .with("name", Value::Text("pelican".to_string()))
            .with("object_type", Value::Enum(1))
            .with("object_index", Value::Int(4))]),
    );
    tag.root.insert(
        "scenery",
        Value::Block(vec![Record::new()
            .with("type", Value::Int(2))
            .with("name", Value::Int(3))
            .with("not_placed", Value::Flags(0b1))
            .with("position", Value::Point3([4.0, 5.0, 6.0]))]),
    );
    tag.root.insert(
        "structure_bsps",
        Value::Block(vec![bsp("levels\\b30\\b30"), bsp("levels\\b30\\b30_missing")]),
    );
    let (bytes, _) = write_tag_bytes(&tag, &halo1::SCENARIO).expect("write halo1 scenario");
    read_tag_bytes(&bytes, &halo1::SCENARIO)
        .expect("read halo1 scenario")
        .tag
}

fn donor_scenario() -> Tag {
    let entry = bsp("Levels/B30/B30")
        .with(
            "structure_lightmap",
            Value::Reference(TagReference::new(codes::LIGHTMAP, "levels\\b30\\b30_lightmap")),
        )
        .with("flags", Value::Flags(1))
        .with("default_sky", Value::Int(3));
    let mut tag = Tag::new(&halo2::SCENARIO);
    tag.root.insert("structure_bsps", Value::Block(vec![entry]));
    tag
}

#[test]
fn scenario_upgrade_renames_converts_and_donates() {
    let source = halo1_scenario();
    let donor = donor_scenario();
    let outcome = upgrade(&source, &SCENARIO_HALO1_TO_HALO2, Some(&donor)).expect("upgrade");
    let (tag, report) = (&outcome.tag, &outcome.report);

    assert_eq!(tag.header.engine, Engine::Halo2);
    assert_eq!(tag.header.group, codes::SCENARIO);
    assert_eq!(tag.header.version, 2);
    assert_eq!(tag.header.name, "b30");
    assert_eq!(report.plan, "scenario");

    let names = tag.root.block("object_names").expect("object names");
    assert_eq!(names[0].int("placement_index"), Some(4));
    assert!(!names[0].contains("object_index"));

    let scenery = &tag.root.block("scenery").expect("scenery")[0];
    assert_eq!(scenery.int("palette_index"), Some(2));
    assert_eq!(scenery.int("name_index"), Some(3));
    assert_eq!(scenery.real("scale"), Some(1.0));
    assert_eq!(scenery.get("position"), Some(&Value::Point3([4.0, 5.0, 6.0])));

    let bsps = tag.root.block("structure_bsps").expect("bsps");
    assert_eq!(bsps.len(), 2);
    assert_eq!(
        bsps[0].reference("structure_lightmap").map(|r| r.path.as_str()),
        Some("levels\\b30\\b30_lightmap")
    );
    assert_eq!(bsps[0].flags("flags"), Some(1));
    assert_eq!(bsps[0].int("default_sky"), Some(3));
    assert!(bsps[1]
        .reference("structure_lightmap")
        .expect("defaulted lightmap")
        .is_null());

    assert!(report.copied.contains("object_name.placement_index"));
    assert!(report.copied.contains("scenery_instance.position"));
    assert!(report.defaulted.contains("scenery_instance.scale"));
    assert!(report.defaulted.contains("scenario.cutscene_titles"));
    assert!(report.dropped.contains("scenery_instance.not_placed"));
    assert!(report.dropped.contains("scenario.functions"));
    assert!(!report.dropped.contains("scenery_instance.type"));
    assert!(report.donated.contains("structure_bsps.structure_lightmap"));
    assert!(report.donated.contains("structure_bsps.default_sky"));

    assert_eq!(
        report.warnings,
        vec![
            UpgradeWarning::FlagUnmapped {
                field: "scenario.flags".to_string(),
                bits: 0b10,
            },
            UpgradeWarning::MissingDonorRecord {
                block: "structure_bsps".to_string(),
                key: "'levels\\b30\\b30_missing'".to_string(),
            },
        ]
    );
    assert_eq!(tag.root.flags("flags"), Some(0b01));
}

#[test]
fn upgraded_scenario_writes_as_halo2() {
    let outcome = upgrade(&halo1_scenario(), &SCENARIO_HALO1_TO_HALO2, Some(&donor_scenario()))
        .expect("upgrade");
    let (bytes, _) = write_tag_bytes(&outcome.tag, &halo2::SCENARIO).expect("write halo2");
    let read = read_tag_bytes(&bytes, &halo2::SCENARIO).expect("read halo2");
    assert!(read.warnings.is_empty(), "{:?}", read.warnings);
    let bsps = read.tag.root.block("structure_bsps").expect("bsps");
    assert_eq!(bsps[0].int("default_sky"), Some(3));
    // flags clear on the undonated entry, so its default sky is not stored
    assert!(!bsps[1].contains("default_sky"));
}

#[test]
fn donor_rules_are_skipped_without_a_donor() {
    let outcome = upgrade(&halo1_scenario(), &SCENARIO_HALO1_TO_HALO2, None).expect("upgrade");
    assert!(outcome.report.donated.is_empty());
    assert!(outcome
        .report
        .warnings
        .iter()
        .all(|warning| !matches!(warning, UpgradeWarning::MissingDonorRecord { .. })));
    let bsps = outcome.tag.root.block("structure_bsps").expect("bsps");
    assert_eq!(bsps[0].flags("flags"), Some(0));
}

#[test]
fn mismatched_inputs_are_rejected() {
    let err = upgrade(&Tag::new(&halo2::SCENARIO), &SCENARIO_HALO1_TO_HALO2, None)
        .expect_err("wrong engine");
    assert!(matches!(err, TagError::EngineMismatch { .. }));

    let err = upgrade(&Tag::new(&halo1::BITMAP), &SCENARIO_HALO1_TO_HALO2, None)
        .expect_err("wrong group");
    assert!(matches!(err, TagError::GroupMismatch { .. }));

    let wrong_donor = Tag::new(&halo1::SCENARIO);
    let err = upgrade(&halo1_scenario(), &SCENARIO_HALO1_TO_HALO2, Some(&wrong_donor))
        .expect_err("wrong donor");
    assert!(matches!(err, TagError::DonorGroupMismatch { .. }));
}

#[test]
fn bitmap_upgrade_matches_enums_by_name() {
    let mut tag = Tag::new(&halo1::BITMAP);
    tag.root.insert("usage", Value::Enum(5));
    tag.root.insert("detail_fade_factor", Value::Real(0.3));
    tag.root.insert(
        "bitmaps",
        Value::Block(vec![Record::new()
            .with("width", Value::Int(256))
            .with("format", Value::Enum(14))
            .with("flags", Value::Flags(0b100))
            .with("palette_index", Value::Int(2))]),
    );
    let outcome = upgrade(&tag, &BITMAP_HALO1_TO_HALO2, None).expect("upgrade");
    let root = &outcome.tag.root;
    // vector_map moved from 5 to 6
    assert_eq!(root.get("usage"), Some(&Value::Enum(6)));
    assert_eq!(root.real("fade_factor"), Some(0.3));
    assert!(!root.contains("detail_fade_factor"));
    let data = &root.block("bitmaps").expect("bitmaps")[0];
    assert_eq!(data.int("palette_index"), Some(2));
    assert_eq!(data.int("level_of_detail_bias"), Some(0));
    assert!(outcome.report.defaulted.contains("bitmap.force_format"));
    assert!(outcome.report.warnings.is_empty());
}

#[test]
fn plans_are_found_by_name_and_source() {
    assert!(std::ptr::eq(
        plans::find("bitmap").expect("bitmap plan"),
        &BITMAP_HALO1_TO_HALO2
    ));
    assert!(plans::find("missing").is_none());
    assert_eq!(plans::for_source(Engine::Halo1, codes::SCENARIO).count(), 1);
    assert_eq!(plans::for_source(Engine::Halo2, codes::SCENARIO).count(), 0);
}

static WIDGET_V1: StructDef = StructDef {
    name: "widget",
    fields: &[
        enum16("mode", &["a", "b", "c", "d"]),
        int32("count"),
        real("speed"),
        rgb("tint"),
        string32("title"),
        int16("obsolete"),
        int16("level"),
        flags16("opts", &["x", "y", "z"]),
        real("ratio"),
    ],
};

static WIDGET_V2: StructDef = StructDef {
    name: "widget",
    fields: &[
        enum16("mode", &["d", "c", "b"]),
        enum16("kind", &["zero", "one", "two"]),
        enum16("strict", &["only"]),
        int8("count"),
        int16("speed_scaled"),
        argb("tint"),
        string_id("title"),
        real("label"),
        int16("new_field").default_to(Scalar::Int(5)),
        real("level"),
        flags8("opts", &["z", "x"]),
        int16("ratio"),
    ],
};

static WIDGET_HALO1: TagGroupDef = TagGroupDef {
    code: GroupCode::new(*b"wdgt"),
    name: "widget",
    engine: Engine::Halo1,
    version: 1,
    root: &WIDGET_V1,
};

static WIDGET_HALO2: TagGroupDef = TagGroupDef {
    code: GroupCode::new(*b"wdgt"),
    name: "widget",
    engine: Engine::Halo2,
    version: 1,
    root: &WIDGET_V2,
};

static WIDGET_PLAN: UpgradePlan = UpgradePlan {
    name: "widget",
    source: &WIDGET_HALO1,
    target: &WIDGET_HALO2,
    mappings: &[
        FieldMapping {
            structure: "widget",
            field: "kind",
            source: FieldSource::Remap {
                from: "mode",
                table: &[(1, 2)],
            },
        },
        FieldMapping {
            structure: "widget",
            field: "strict",
            source: FieldSource::Rename("mode"),
        },
        FieldMapping {
            structure: "widget",
            field: "speed_scaled",
            source: FieldSource::Scale {
                from: "speed",
                factor: 100.0,
            },
        },
        FieldMapping {
            structure: "widget",
            field: "label",
            source: FieldSource::Rename("title"),
        },
    ],
    donors: &[],
};

#[test]
fn conversions_cover_every_field_source() {
    let root = Record::new()
        .with("mode", Value::Enum(1))
        .with("count", Value::Int(1000))
        .with("speed", Value::Real(1.5))
        .with("tint", Value::Rgb([0.1, 0.2, 0.3]))
        .with("title", Value::Text("hello".to_string()))
        .with("obsolete", Value::Int(9))
        .with("level", Value::Int(4))
        .with("opts", Value::Flags(0b111))
        .with("ratio", Value::Real(2.6));
    let tag = Tag::with_root(&WIDGET_HALO1, root);

    let outcome = upgrade(&tag, &WIDGET_PLAN, None).expect("upgrade");
    let out = &outcome.tag.root;
    assert_eq!(out.get("mode"), Some(&Value::Enum(2)));
    assert_eq!(out.get("kind"), Some(&Value::Enum(2)));
    assert_eq!(out.get("strict"), Some(&Value::Enum(0)));
    assert_eq!(out.int("count"), Some(127));
    assert_eq!(out.int("speed_scaled"), Some(150));
    assert_eq!(out.get("tint"), Some(&Value::Rgba([0.1, 0.2, 0.3, 1.0])));
    assert_eq!(out.text("title"), Some("hello"));
    assert_eq!(out.real("label"), Some(0.0));
    assert_eq!(out.int("new_field"), Some(5));
    assert_eq!(out.real("level"), Some(4.0));
    assert_eq!(out.flags("opts"), Some(0b11));
    assert_eq!(out.int("ratio"), Some(3));

    let report = &outcome.report;
    assert_eq!(
        report.warnings,
        vec![
            UpgradeWarning::EnumUnmapped {
                field: "widget.strict".to_string(),
                value: 1,
            },
            UpgradeWarning::Clamped {
                field: "widget.count".to_string(),
                value: 1000,
                clamped: 127,
            },
            UpgradeWarning::KindMismatch {
                field: "widget.label".to_string(),
                expected: "real".to_string(),
                found: "text".to_string(),
            },
            UpgradeWarning::FlagUnmapped {
                field: "widget.opts".to_string(),
                bits: 0b10,
            },
        ]
    );
    assert_eq!(
        report.dropped.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["widget.obsolete"]
    );
    assert!(report.defaulted.contains("widget.new_field"));
    assert!(report.defaulted.contains("widget.label"));
    assert!(report.copied.contains("widget.speed_scaled"));

    let json = serde_json::to_value(report).expect("report json");
    assert_eq!(json["plan"], "widget");
    assert_eq!(json["warnings"][1]["kind"], "clamped");

    // the converted graph is valid for the target schema
    write_tag_bytes(&outcome.tag, &WIDGET_HALO2).expect("write upgraded widget");
}
