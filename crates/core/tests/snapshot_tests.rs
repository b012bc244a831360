//! Layout snapshots. A change here changes the on-disk format.

use tag_engine::schema::{halo1, halo2};
use tag_engine::Engine;

#[test]
fn halo2_structure_bsp_layout() {
    let layout = halo2::STRUCTURE_BSP_ENTRY.layout(Engine::Halo2, 2);
    insta::assert_snapshot!(layout.to_string(), @r###"
    structure_bsp [halo2] 84 bytes
    0x0000   16 pad        -
    0x0010   16 reference  structure_bsp
    0x0020   16 reference  structure_lightmap
    0x0030    4 pad        -
    0x0034    4 real       unused_radiance_estimated_search_distance
    0x0038    4 pad        -
    0x003c    4 real       unused_luminels_per_world_unit
    0x0040    4 real       unused_output_white_reference
    0x0044    8 pad        -
    0x004c    2 flags16    flags
    0x004e    2 pad        -
    0x0050    2 int16      default_sky ?
    0x0052    2 pad        -
    "###);
}

#[test]
fn halo1_sequence_layout() {
    let layout = halo1::BITMAP_STRUCT
        .field("sequences")
        .map(|field| match field.kind {
            tag_engine::schema::FieldKind::Block(def) => def.layout(Engine::Halo1, 7),
            _ => unreachable!("sequences is a block"),
        })
        .expect("sequences field");
    insta::assert_snapshot!(layout.to_string(), @r###"
    sequence [halo1] 64 bytes
    0x0000   32 string     name
    0x0020    2 int16      first_bitmap_index
    0x0022    2 int16      bitmap_count
    0x0024   16 pad        -
    0x0034   12 block      sprites
    "###);
}

#[test]
fn struct_sizes_per_engine() {
    let sizes = [
        ("halo1 scenario", halo1::SCENARIO_STRUCT.nominal_size(Engine::Halo1, 2)),
        ("halo1 scenario v1", halo1::SCENARIO_STRUCT.nominal_size(Engine::Halo1, 1)),
        ("halo2 structure_bsp", halo2::STRUCTURE_BSP_ENTRY.nominal_size(Engine::Halo2, 2)),
        ("halo2 cutscene_title", halo2::CUTSCENE_TITLE.nominal_size(Engine::Halo2, 2)),
    ];
    let table = sizes
        .iter()
        .map(|(name, size)| format!("{name}: {size}"))
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(table, @r###"
    halo1 scenario: 668
    halo1 scenario v1: 664
    halo2 structure_bsp: 84
    halo2 cutscene_title: 60
    "###);
}
