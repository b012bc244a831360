//! Halo 2 tag groups. Little-endian, 8-byte block descriptors, every element
//! array preceded by a `tbfd` block header.

use crate::engine::Engine;
use crate::group::codes;

use super::shared::{
    BITMAP_DATA, CHILD_SCENARIO, PALETTE_ENTRY, PREDICTED_RESOURCE, SEQUENCE, SKY_ENTRY,
};
use super::{
    angle, argb, block, data, enum16, enum32, euler3, flags16, flags32, flags8, int16, int32,
    pad, point3, real, reference, rgb, string32, string_id, uint8, Condition, Scalar, StructDef,
    TagGroupDef,
};

const OBJECT_TYPES: &[&str] = &[
    "biped",
    "vehicle",
    "weapon",
    "equipment",
    "garbage",
    "projectile",
    "scenery",
    "machine",
    "control",
    "light_fixture",
    "sound_scenery",
    "crate",
    "creature",
];

const GAME_TYPES: &[&str] = &[
    "none",
    "ctf",
    "slayer",
    "oddball",
    "king_of_the_hill",
    "race",
    "headhunter",
    "juggernaut",
    "territories",
    "stub",
    "ignored3",
    "ignored4",
    "all_games",
    "all_except_ctf",
    "all_except_race_and_ctf",
];

pub static COMMENT: StructDef = StructDef {
    name: "comment",
    fields: &[
        point3("position"),
        enum32("type", &["generic"]),
        string32("name"),
        data("comment"),
    ],
};

pub static OBJECT_NAME: StructDef = StructDef {
    name: "object_name",
    fields: &[
        string32("name"),
        enum16("object_type", OBJECT_TYPES),
        int16("placement_index"),
    ],
};

pub static SCENERY_INSTANCE: StructDef = StructDef {
    name: "scenery_instance",
    fields: &[
        int16("palette_index"),
        int16("name_index"),
        flags32(
            "placement_flags",
            &[
                "not_automatically",
                "unused0",
                "unused1",
                "unused2",
                "lock_type_to_env_object",
                "lock_transform_to_env_object",
                "never_placed",
                "lock_name_to_env_object",
                "create_at_rest",
            ],
        ),
        point3("position"),
        euler3("rotation"),
        real("scale").default_to(Scalar::Real(1.0)),
        flags16("transform_flags", &["mirrored"]),
        int16("manual_bsp_flags"),
        string_id("variant_name"),
        flags8(
            "active_change_colors",
            &["primary", "secondary", "tertiary", "quaternary"],
        ),
        pad(3),
        rgb("primary_color"),
        rgb("secondary_color"),
        rgb("tertiary_color"),
        rgb("quaternary_color"),
    ],
};

pub static STARTING_PROFILE: StructDef = StructDef {
    name: "player_starting_profile",
    fields: &[
        string32("name"),
        real("starting_health_modifier"),
        real("starting_shield_modifier"),
        reference("primary_weapon", &[codes::WEAPON]),
        int16("primary_rounds_loaded"),
        int16("primary_rounds_total"),
        reference("secondary_weapon", &[codes::WEAPON]),
        int16("secondary_rounds_loaded"),
        int16("secondary_rounds_total"),
        uint8("starting_fragmentation_grenade_count"),
        uint8("starting_plasma_grenade_count"),
        uint8("starting_custom_2_grenade_count"),
        uint8("starting_custom_3_grenade_count"),
    ],
};

pub static STARTING_LOCATION: StructDef = StructDef {
    name: "player_starting_location",
    fields: &[
        point3("position"),
        angle("facing"),
        int16("team_index"),
        int16("bsp_index"),
        enum16("type_0", GAME_TYPES),
        enum16("type_1", GAME_TYPES),
        enum16("type_2", GAME_TYPES),
        enum16("type_3", GAME_TYPES),
        enum16("spawn_type_0", GAME_TYPES),
        enum16("spawn_type_1", GAME_TYPES),
        enum16("spawn_type_2", GAME_TYPES),
        enum16("spawn_type_3", GAME_TYPES),
        string_id("unused_name_0"),
        string_id("unused_name_1"),
        enum16(
            "campaign_player_type",
            &[
                "masterchief",
                "dervish",
                "chief_multiplayer",
                "elite_multiplayer",
            ],
        ),
        pad(6),
    ],
};

pub static TRIGGER_VOLUME: StructDef = StructDef {
    name: "trigger_volume",
    fields: &[
        string_id("name"),
        int16("object_name"),
        pad(2),
        string_id("node_name"),
        pad(24),
        point3("forward"),
        point3("up"),
        point3("position"),
        point3("extents"),
        pad(4),
        int16("kill_trigger_volume"),
        pad(2),
    ],
};

pub static SCRIPT: StructDef = StructDef {
    name: "script",
    fields: &[
        string32("name"),
        enum16(
            "script_type",
            &[
                "startup",
                "dormant",
                "continuous",
                "static",
                "stub",
                "command_script",
            ],
        ),
        enum16(
            "return_type",
            &[
                "unparsed",
                "special_form",
                "function_name",
                "passthrough",
                "void",
                "boolean",
                "real",
                "short",
                "long",
                "string",
            ],
        ),
        int32("root_expression_index"),
    ],
};

/// Bit of `structure_bsp.flags` that turns the default sky on.
pub const DEFAULT_SKY_ENABLED: u64 = 1;

pub static STRUCTURE_BSP_ENTRY: StructDef = StructDef {
    name: "structure_bsp",
    fields: &[
        pad(16),
        reference("structure_bsp", &[codes::STRUCTURE_BSP]),
        reference("structure_lightmap", &[codes::LIGHTMAP]),
        pad(4),
        real("unused_radiance_estimated_search_distance"),
        pad(4),
        real("unused_luminels_per_world_unit"),
        real("unused_output_white_reference"),
        pad(8),
        flags16("flags", &["default_sky_enabled"]),
        pad(2),
        int16("default_sky").when(Condition::FlagSet {
            field: "flags",
            mask: DEFAULT_SKY_ENABLED,
        }),
        pad(2),
    ],
};

pub static BSP_SWITCH_TRIGGER_VOLUME: StructDef = StructDef {
    name: "bsp_switch_trigger_volume",
    fields: &[
        int16("trigger_volume"),
        int16("source"),
        int16("destination"),
        pad(2),
        pad(8),
    ],
};

pub static CUTSCENE_TITLE: StructDef = StructDef {
    name: "cutscene_title",
    fields: &[
        string_id("name"),
        int16("text_bounds_top"),
        int16("text_bounds_left"),
        int16("text_bounds_bottom"),
        int16("text_bounds_right"),
        enum16("justification", &["left", "right", "center", "custom_text_entry"]),
        enum16(
            "font",
            &[
                "terminal_font",
                "body_text_font",
                "title_font",
                "super_large_font",
                "large_body_text_font",
            ],
        ),
        argb("text_color"),
        argb("shadow_color"),
        real("fade_in_time"),
        real("up_time"),
        real("fade_out_time"),
    ],
};

pub static SCENARIO_STRUCT: StructDef = StructDef {
    name: "scenario",
    fields: &[
        reference("do_not_use", &[codes::STRUCTURE_BSP]),
        block("skies", &SKY_ENTRY),
        enum16(
            "type",
            &["solo", "multiplayer", "main_menu", "multiplayer_shared", "single_player_shared"],
        ),
        flags16(
            "flags",
            &[
                "cortana_hack",
                "always_draw_sky",
                "dont_strip_pathfinding",
                "symmetric_multiplayer_map",
                "quick_loading_cinematic_only_scenario",
                "characters_use_previous_mission_weapons",
                "lightmaps_smooth_palettes_with_neighbors",
                "snap_to_white_at_start",
            ],
        ),
        block("child_scenarios", &CHILD_SCENARIO),
        angle("local_north"),
        block("predicted_resources", &PREDICTED_RESOURCE),
        data("editor_scenario_data"),
        block("comments", &COMMENT),
        block("object_names", &OBJECT_NAME),
        block("scenery", &SCENERY_INSTANCE),
        block("scenery_palette", &PALETTE_ENTRY),
        block("player_starting_profile", &STARTING_PROFILE),
        block("player_starting_locations", &STARTING_LOCATION),
        block("trigger_volumes", &TRIGGER_VOLUME),
        data("script_syntax_data"),
        data("script_string_data"),
        block("scripts", &SCRIPT),
        block("structure_bsps", &STRUCTURE_BSP_ENTRY),
        block("bsp_switch_trigger_volumes", &BSP_SWITCH_TRIGGER_VOLUME),
        block("cutscene_titles", &CUTSCENE_TITLE),
        real("global_lighting_scale")
            .when(Condition::MinVersion(2))
            .default_to(Scalar::Real(1.0)),
        string_id("default_camera_fx_name"),
    ],
};

pub static SCENARIO: TagGroupDef = TagGroupDef {
    code: codes::SCENARIO,
    name: "scenario",
    engine: Engine::Halo2,
    version: 2,
    root: &SCENARIO_STRUCT,
};

pub static ANIMATION_PROPERTY: StructDef = StructDef {
    name: "animation_property",
    fields: &[
        enum16(
            "type",
            &[
                "bitmap_scale_uniform",
                "bitmap_scale_x",
                "bitmap_scale_y",
                "bitmap_scale_z",
                "bitmap_translation_x",
                "bitmap_translation_y",
                "bitmap_translation_z",
                "bitmap_rotation_angle",
                "bitmap_rotation_axis_x",
                "bitmap_rotation_axis_y",
                "bitmap_rotation_axis_z",
                "value",
                "color",
                "bitmap_index",
            ],
        ),
        pad(2),
        string_id("input_name"),
        string_id("range_name"),
        real("time_period_in_seconds"),
        data("function"),
    ],
};

pub static PARAMETER: StructDef = StructDef {
    name: "parameter",
    fields: &[
        string_id("name"),
        enum16("type", &["bitmap", "value", "color", "switch"]),
        pad(2),
        reference("bitmap", &[codes::BITMAP]),
        real("const_value"),
        rgb("const_color"),
        block("animation_properties", &ANIMATION_PROPERTY),
    ],
};

pub static SHADER_STRUCT: StructDef = StructDef {
    name: "shader",
    fields: &[
        reference("template", &[codes::SHADER_TEMPLATE]),
        string_id("material_name"),
        block("parameters", &PARAMETER),
        flags16("flags", &["water", "sort_first", "no_active_camo"]),
        enum16(
            "type",
            &["unknown", "opaque_shader", "transparent_shader", "water_shader"],
        ),
        pad(4),
        block("predicted_resources", &PREDICTED_RESOURCE),
        reference("light_response", &[codes::LIGHT_RESPONSE]),
        enum16(
            "shader_lod_bias",
            &["none", "4x_size", "2x_size", "half_size", "quarter_size", "never", "cinematic"],
        ),
        enum16("specular_type", &["none", "default", "dull", "shiny"]),
        enum16(
            "lightmap_type",
            &["diffuse", "default_specular", "dull_specular", "shiny_specular"],
        ),
        pad(2),
        real("lightmap_specular_brightness").default_to(Scalar::Real(1.0)),
        real("lightmap_ambient_bias"),
        pad(8),
        real("added_depth_bias_offset"),
        real("added_depth_bias_slope_scale"),
    ],
};

pub static SHADER: TagGroupDef = TagGroupDef {
    code: codes::SHADER,
    name: "shader",
    engine: Engine::Halo2,
    version: 1,
    root: &SHADER_STRUCT,
};

pub static BITMAP_STRUCT: StructDef = StructDef {
    name: "bitmap",
    fields: &[
        enum16(
            "type",
            &["2d_textures", "3d_textures", "cube_maps", "sprites", "interface_bitmaps"],
        ),
        enum16(
            "format",
            &[
                "compressed_with_color_key_transparency",
                "compressed_with_explicit_alpha",
                "compressed_with_interpolated_alpha",
                "16_bit_color",
                "32_bit_color",
                "monochrome",
                "high_quality_compression",
            ],
        ),
        enum16(
            "usage",
            &[
                "alpha_blend",
                "default",
                "height_map",
                "height_map_blue",
                "detail_map",
                "light_map",
                "vector_map",
                "embm",
            ],
        )
        .default_to(Scalar::Int(1)),
        flags16(
            "flags",
            &[
                "enable_diffusion_dithering",
                "disable_height_map_compression",
                "uniform_sprite_sequences",
                "filthy_sprite_bug_fix",
                "use_sharp_bump_filter",
                "unused",
                "use_clamped_mirrored_bump",
                "invert_detail_fade",
            ],
        ),
        real("fade_factor"),
        real("sharpen_amount"),
        real("bump_height"),
        enum16(
            "sprite_budget_size",
            &["32x32", "64x64", "128x128", "256x256", "512x512", "1024x1024"],
        ),
        int16("sprite_budget_count"),
        int16("color_plate_width"),
        int16("color_plate_height"),
        data("compressed_color_plate_data"),
        data("processed_pixel_data"),
        real("blur_filter_size"),
        real("alpha_bias"),
        int16("mipmap_count"),
        enum16(
            "sprite_usage",
            &["blend_add_subtract_max", "multiply_min", "double_multiply"],
        ),
        int16("sprite_spacing"),
        enum16(
            "force_format",
            &[
                "default",
                "force_g8b8",
                "force_dxt1",
                "force_dxt3",
                "force_dxt5",
                "force_alpha_luminance",
                "force_a4r4g4b4",
            ],
        ),
        block("sequences", &SEQUENCE),
        block("bitmaps", &BITMAP_DATA),
    ],
};

pub static BITMAP: TagGroupDef = TagGroupDef {
    code: codes::BITMAP,
    name: "bitmap",
    engine: Engine::Halo2,
    version: 7,
    root: &BITMAP_STRUCT,
};

pub static GROUPS: [&TagGroupDef; 3] = [&SCENARIO, &SHADER, &BITMAP];
