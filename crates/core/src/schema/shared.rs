//! Structs whose layout both engine generations agree on, with the few
//! differences gated per engine.

use crate::engine::Engine;
use crate::group::codes;

use super::{
    block, enum16, flags16, int16, int32, pad, point2, real, reference, string32, uint8,
    Condition, StructDef,
};

pub static SKY_ENTRY: StructDef = StructDef {
    name: "sky",
    fields: &[reference("sky", &[codes::SKY])],
};

pub static CHILD_SCENARIO: StructDef = StructDef {
    name: "child_scenario",
    fields: &[reference("child_scenario", &[codes::SCENARIO]), pad(16)],
};

pub static PREDICTED_RESOURCE: StructDef = StructDef {
    name: "predicted_resource",
    fields: &[
        enum16("type", &["bitmap", "sound", "render_model_geometry", "cluster_geometry"]),
        int16("resource_index"),
        int32("tag_index"),
    ],
};

pub static PALETTE_ENTRY: StructDef = StructDef {
    name: "scenery_palette_entry",
    fields: &[reference("name", &[codes::SCENERY]), pad(32)],
};

pub static SPRITE: StructDef = StructDef {
    name: "sprite",
    fields: &[
        int16("bitmap_index"),
        pad(2),
        pad(4),
        real("left"),
        real("right"),
        real("top"),
        real("bottom"),
        point2("registration_point"),
    ],
};

pub static SEQUENCE: StructDef = StructDef {
    name: "sequence",
    fields: &[
        string32("name"),
        int16("first_bitmap_index"),
        int16("bitmap_count"),
        pad(16),
        block("sprites", &SPRITE),
    ],
};

/// Bit of `BITMAP_DATA.flags` that marks a palettized image.
pub const PALETTIZED: u64 = 1 << 2;

pub static BITMAP_DATA: StructDef = StructDef {
    name: "bitmap_data",
    fields: &[
        pad(4),
        int16("width"),
        int16("height"),
        int16("depth"),
        enum16("type", &["2d_texture", "3d_texture", "cube_map", "white"]),
        enum16(
            "format",
            &[
                "a8", "y8", "ay8", "a8y8", "unused1", "unused2", "r5g6b5", "unused3",
                "a1r5g5b5", "a4r4g4b4", "x8r8g8b8", "a8r8g8b8", "unused4", "unused5", "dxt1",
                "dxt3", "dxt5", "p8_bump",
            ],
        ),
        flags16(
            "flags",
            &[
                "power_of_two_dimensions",
                "compressed",
                "palettized",
                "swizzled",
                "linear",
                "v16u16",
            ],
        ),
        int16("registration_x"),
        int16("registration_y"),
        int16("mipmap_count"),
        int16("palette_index").when(Condition::FlagSet {
            field: "flags",
            mask: PALETTIZED,
        }),
        int32("pixels_offset"),
        int32("pixels_size"),
        pad(4),
        pad(4),
        pad(4),
        uint8("level_of_detail_bias").when(Condition::Engine(Engine::Halo2)),
        pad(3).when(Condition::Engine(Engine::Halo2)),
    ],
};
