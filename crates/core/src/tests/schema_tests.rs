use super::*;
use crate::schema::shared::{BITMAP_DATA, PALETTIZED, SEQUENCE};

#[test]
fn descriptor_widths_follow_the_engine() {
    assert_eq!(SEQUENCE.nominal_size(Engine::Halo1, 0), 64);
    assert_eq!(SEQUENCE.nominal_size(Engine::Halo2, 0), 60);
    assert_eq!(FieldKind::Data.inline_size(Engine::Halo1), 20);
    assert_eq!(FieldKind::Data.inline_size(Engine::Halo2), 8);
    assert_eq!(FieldKind::StringId.inline_size(Engine::Halo2), 4);
    assert_eq!(FieldKind::Reference(&[]).inline_size(Engine::Halo1), 16);
}

#[test]
fn flag_gated_fields_count_in_nominal_but_not_minimal_size() {
    assert_eq!(BITMAP_DATA.nominal_size(Engine::Halo1, 7), 44);
    assert_eq!(BITMAP_DATA.minimal_size(Engine::Halo1, 7), 42);
    assert_eq!(BITMAP_DATA.nominal_size(Engine::Halo2, 7), 48);
    assert_eq!(BITMAP_DATA.minimal_size(Engine::Halo2, 7), 46);

    let entry = &halo2::STRUCTURE_BSP_ENTRY;
    assert_eq!(entry.nominal_size(Engine::Halo2, 2), 84);
    assert_eq!(entry.minimal_size(Engine::Halo2, 2), 82);
}

#[test]
fn version_gates_drop_fields_from_older_tags() {
    let root = &halo1::SCENARIO_STRUCT;
    let current = root.nominal_size(Engine::Halo1, 2);
    let older = root.nominal_size(Engine::Halo1, 1);
    assert_eq!(current - older, 4);

    let layout = root.layout(Engine::Halo1, 1);
    assert_eq!(layout.offset_of("global_lighting_scale"), None);
    assert!(root.layout(Engine::Halo1, 2).offset_of("global_lighting_scale").is_some());
}

#[test]
fn layout_offsets_accumulate_in_field_order() {
    let layout = halo2::STRUCTURE_BSP_ENTRY.layout(Engine::Halo2, 2);
    assert_eq!(layout.size, 84);
    assert_eq!(layout.offset_of("structure_bsp"), Some(0x10));
    assert_eq!(layout.offset_of("flags"), Some(0x4c));
    assert_eq!(layout.offset_of("default_sky"), Some(0x50));

    let gated: Vec<_> = layout
        .fields
        .iter()
        .filter(|field| field.gated)
        .map(|field| field.name)
        .collect();
    assert_eq!(gated, vec!["default_sky"]);
}

#[test]
fn conditions_evaluate_against_record_flags() {
    let gate = Condition::FlagSet {
        field: "flags",
        mask: PALETTIZED,
    };
    let clear = Condition::FlagClear {
        field: "flags",
        mask: PALETTIZED,
    };
    let palettized = Record::new().with("flags", Value::Flags(PALETTIZED | 1));
    let plain = Record::new().with("flags", Value::Flags(1));
    let empty = Record::new();

    assert!(gate.holds(Engine::Halo1, 0, &palettized));
    assert!(!gate.holds(Engine::Halo1, 0, &plain));
    assert!(!gate.holds(Engine::Halo1, 0, &empty));
    assert!(clear.holds(Engine::Halo1, 0, &empty));
    assert_eq!(gate.holds_statically(Engine::Halo1, 0), None);

    let halo2_only = Condition::Engine(Engine::Halo2);
    assert_eq!(halo2_only.holds_statically(Engine::Halo1, 0), Some(false));
    assert!(halo2_only.holds(Engine::Halo2, 0, &empty));
    assert_eq!(Condition::MaxVersion(3).holds_statically(Engine::Halo1, 4), Some(false));
}

#[test]
fn enum_and_flag_helpers_resolve_names() {
    let options = EnumOptions(&["one", "two", "three"]);
    assert_eq!(options.name_of(1), Some("two"));
    assert_eq!(options.name_of(-1), None);
    assert_eq!(options.name_of(3), None);
    assert_eq!(options.index_of("three"), Some(2));

    let bits = FlagBits(&["a", "b", "c"]);
    assert_eq!(bits.names_of(0b101), vec!["a", "c"]);
    assert_eq!(bits.bit_of("b"), Some(1));
    assert_eq!(bits.name_of(7), None);
    assert_eq!(bits.unknown_bits(0b1_0000_0011), 0b1_0000_0000);
}

#[test]
fn declared_defaults_take_precedence_over_zero_values() {
    let usage = halo1::BITMAP_STRUCT.field("usage").expect("usage field");
    assert_eq!(usage.default_value(), Some(Value::Enum(1)));

    let scale = halo2::SCENERY_INSTANCE.field("scale").expect("scale field");
    assert_eq!(scale.default_value(), Some(Value::Real(1.0)));

    let sky = shared::SKY_ENTRY.field("sky").expect("sky field");
    match sky.default_value() {
        Some(Value::Reference(reference)) => {
            assert!(reference.is_null());
            assert_eq!(reference.group, GroupCode::new(*b"sky "));
        }
        other => panic!("unexpected default {other:?}"),
    }

    assert!(pad(4).default_value().is_none());
    assert!(halo1::SCRIPT.field("").is_none());
}

#[test]
fn integer_kinds_report_their_ranges() {
    assert_eq!(FieldKind::Int8.int_range(), Some((-128, 127)));
    assert_eq!(FieldKind::UInt16.int_range(), Some((0, 65_535)));
    assert_eq!(FieldKind::Real.int_range(), None);
    assert_eq!(FieldKind::Flags(IntWidth::Short, FlagBits(&[])).label(), "flags16");
}

#[test]
fn every_shipped_group_matches_its_engine_table() {
    for group in halo1::GROUPS {
        assert_eq!(group.engine, Engine::Halo1, "{}", group.name);
    }
    for group in halo2::GROUPS {
        assert_eq!(group.engine, Engine::Halo2, "{}", group.name);
    }
}
