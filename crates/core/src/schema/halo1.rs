//! Halo 1 tag groups. Big-endian, 12-byte block descriptors, no block headers.

use crate::engine::Engine;
use crate::group::codes;

use super::shared::{
    BITMAP_DATA, CHILD_SCENARIO, PALETTE_ENTRY, PREDICTED_RESOURCE, SEQUENCE, SKY_ENTRY,
};
use super::{
    angle, block, data, enum16, euler3, flags16, flags32, int16, int32, int8, pad, point3, real,
    real_bounds, reference, rgb, string32, Condition, Scalar, StructDef, TagGroupDef,
};

const FUNCTION_TYPES: &[&str] = &[
    "one",
    "zero",
    "cosine",
    "cosine_variable_period",
    "diagonal_wave",
    "diagonal_wave_variable_period",
    "slide",
    "slide_variable_period",
    "noise",
    "jitter",
    "wander",
    "spark",
];

const OBJECT_TYPES: &[&str] = &[
    "biped",
    "vehicle",
    "weapon",
    "equipment",
    "garbage",
    "projectile",
    "scenery",
    "device_machine",
    "device_control",
    "device_light_fixture",
    "placeholder",
    "sound_scenery",
];

const GAME_TYPES: &[&str] = &[
    "none",
    "ctf",
    "slayer",
    "oddball",
    "king_of_the_hill",
    "race",
    "terminator",
    "stub",
    "ignored1",
    "ignored2",
    "ignored3",
    "ignored4",
    "all_games",
    "all_except_ctf",
    "all_except_race_and_ctf",
];

pub static FUNCTION: StructDef = StructDef {
    name: "function",
    fields: &[
        flags32("flags", &["scripted", "invert", "additive", "always_active"]),
        string32("name"),
        real("period").default_to(Scalar::Real(1.0)),
        int16("scale_period_by"),
        enum16("function", FUNCTION_TYPES),
        int16("scale_function_by"),
        enum16("wobble_function", FUNCTION_TYPES),
        real("wobble_period"),
        real("wobble_magnitude"),
        real("square_wave_threshold"),
        int16("step_count"),
        enum16("map_to", &["linear", "early", "very_early", "late", "very_late", "cosine"]),
        int16("sawtooth_count"),
        pad(2),
        int16("scale_result_by"),
        enum16("bounds_mode", &["clip", "clip_and_normalize", "scale_to_fit"]),
        real_bounds("bounds"),
        pad(6),
        int16("turn_off_with"),
        pad(16),
        pad(16),
    ],
};

pub static COMMENT: StructDef = StructDef {
    name: "comment",
    fields: &[point3("position"), pad(16), data("comment")],
};

pub static OBJECT_NAME: StructDef = StructDef {
    name: "object_name",
    fields: &[
        string32("name"),
        enum16("object_type", OBJECT_TYPES),
        int16("object_index"),
    ],
};

pub static SCENERY_INSTANCE: StructDef = StructDef {
    name: "scenery_instance",
    fields: &[
        int16("type"),
        int16("name"),
        flags16("not_placed", &["automatically", "on_easy", "on_normal", "on_hard"]),
        int16("desired_permutation"),
        point3("position"),
        euler3("rotation"),
        pad(8),
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
        int8("starting_fragmentation_grenade_count"),
        int8("starting_plasma_grenade_count"),
        pad(2),
        pad(20),
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
        pad(24),
    ],
};

pub static TRIGGER_VOLUME: StructDef = StructDef {
    name: "trigger_volume",
    fields: &[
        pad(4),
        string32("name"),
        pad(12),
        point3("forward"),
        point3("up"),
        point3("position"),
        point3("extents"),
    ],
};

pub static SCRIPT: StructDef = StructDef {
    name: "script",
    fields: &[
        string32("name"),
        enum16("script_type", &["startup", "dormant", "continuous", "static", "stub"]),
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
        pad(52),
    ],
};

pub static STRUCTURE_BSP_ENTRY: StructDef = StructDef {
    name: "structure_bsp",
    fields: &[pad(16), reference("structure_bsp", &[codes::STRUCTURE_BSP])],
};

pub static SCENARIO_STRUCT: StructDef = StructDef {
    name: "scenario",
    fields: &[
        reference("dont_use", &[codes::STRUCTURE_BSP]),
        reference("wont_use", &[codes::STRUCTURE_BSP]),
        reference("cant_use", &[codes::SKY]),
        block("skies", &SKY_ENTRY),
        enum16("type", &["solo", "multiplayer", "main_menu"]),
        flags16("flags", &["cortana_hack", "use_demo_ui"]),
        block("child_scenarios", &CHILD_SCENARIO),
        angle("local_north"),
        pad(156),
        block("predicted_resources", &PREDICTED_RESOURCE),
        block("functions", &FUNCTION),
        data("editor_scenario_data"),
        block("comments", &COMMENT),
        pad(224),
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
        real("global_lighting_scale")
            .when(Condition::MinVersion(2))
            .default_to(Scalar::Real(1.0)),
        pad(12),
    ],
};

pub static SCENARIO: TagGroupDef = TagGroupDef {
    code: codes::SCENARIO,
    name: "scenario",
    engine: Engine::Halo1,
    version: 2,
    root: &SCENARIO_STRUCT,
};

pub static SHADER_ENVIRONMENT_STRUCT: StructDef = StructDef {
    name: "shader_environment",
    fields: &[
        flags16(
            "radiosity_flags",
            &["simple_parameterization", "ignore_normals", "transparent_lit"],
        ),
        enum16("detail_level", &["high", "medium", "low", "turd"]),
        real("power"),
        rgb("color_of_emitted_light"),
        rgb("tint_color"),
        pad(2),
        enum16(
            "material_type",
            &[
                "dirt", "sand", "stone", "snow", "wood", "metal_hollow", "metal_thin",
                "metal_thick", "rubber", "glass", "force_field", "grunt", "hunter_armor",
                "hunter_skin", "elite", "jackal", "jackal_energy_shield", "engineer_skin",
                "engineer_force_field", "flood_combat_form", "flood_carrier_form",
                "cyborg_armor", "cyborg_energy_shield", "human_armor", "human_skin", "sentinel",
                "monitor", "plastic", "water", "leaves", "elite_energy_shield", "ice",
                "hunter_shield",
            ],
        ),
        pad(4),
        flags16(
            "flags",
            &["alpha_tested", "bump_map_is_specular_mask", "true_atmospheric_fog"],
        ),
        enum16("type", &["normal", "blended", "blended_base_specular"]),
        pad(24),
        real("lens_flare_spacing"),
        reference("lens_flare", &[codes::LENS_FLARE]),
        pad(44),
        flags16("diffuse_flags", &["rescale_detail_maps", "rescale_bump_map"]),
        pad(2),
        pad(24),
        reference("base_map", &[codes::BITMAP]),
        pad(24),
        enum16(
            "detail_map_function",
            &["double_biased_multiply", "multiply", "double_biased_add"],
        ),
        pad(2),
        real("primary_detail_map_scale").default_to(Scalar::Real(1.0)),
        reference("primary_detail_map", &[codes::BITMAP]),
        real("secondary_detail_map_scale").default_to(Scalar::Real(1.0)),
        reference("secondary_detail_map", &[codes::BITMAP]),
        pad(24),
        enum16(
            "micro_detail_map_function",
            &["double_biased_multiply", "multiply", "double_biased_add"],
        ),
        pad(2),
        real("micro_detail_map_scale").default_to(Scalar::Real(1.0)),
        reference("micro_detail_map", &[codes::BITMAP]),
        rgb("material_color"),
        pad(12),
        real("bump_map_scale"),
        reference("bump_map", &[codes::BITMAP]),
        pad(24),
        flags16("self_illumination_flags", &["unfiltered"]),
        pad(2),
        pad(24),
        rgb("primary_on_color"),
        rgb("primary_off_color"),
        enum16("primary_animation_function", FUNCTION_TYPES),
        pad(2),
        real("primary_animation_period"),
        real("primary_animation_phase"),
        pad(24),
        rgb("secondary_on_color"),
        rgb("secondary_off_color"),
        enum16("secondary_animation_function", FUNCTION_TYPES),
        pad(2),
        real("secondary_animation_period"),
        real("secondary_animation_phase"),
        pad(24),
        real("self_illumination_map_scale").default_to(Scalar::Real(1.0)),
        reference("self_illumination_map", &[codes::BITMAP]),
        pad(24),
        flags16(
            "specular_flags",
            &["overbright", "extra_shiny", "lightmap_is_specular"],
        ),
        pad(2),
        pad(16),
        real("brightness"),
        pad(20),
        rgb("perpendicular_color"),
        rgb("parallel_color"),
        pad(16),
        flags16("reflection_flags", &["dynamic_mirror"]),
        enum16(
            "reflection_type",
            &["bumped_cube_map", "flat_cube_map", "bumped_radiosity"],
        ),
        real("lightmap_brightness_scale").default_to(Scalar::Real(1.0)),
        pad(28),
        real("perpendicular_brightness"),
        real("parallel_brightness"),
        pad(16),
        pad(8),
        pad(16),
        reference("reflection_cube_map", &[codes::BITMAP]),
        pad(16),
    ],
};

pub static SHADER_ENVIRONMENT: TagGroupDef = TagGroupDef {
    code: codes::SHADER_ENVIRONMENT,
    name: "shader_environment",
    engine: Engine::Halo1,
    version: 2,
    root: &SHADER_ENVIRONMENT_STRUCT,
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
            ],
        ),
        enum16(
            "usage",
            &["alpha_blend", "default", "height_map", "detail_map", "light_map", "vector_map"],
        )
        .default_to(Scalar::Int(1)),
        flags16(
            "flags",
            &[
                "enable_diffusion_dithering",
                "disable_height_map_compression",
                "uniform_sprite_sequences",
                "filthy_sprite_bug_fix",
            ],
        ),
        real("detail_fade_factor"),
        real("sharpen_amount"),
        real("bump_height"),
        enum16(
            "sprite_budget_size",
            &["32x32", "64x64", "128x128", "256x256", "512x512"],
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
        pad(2),
        block("sequences", &SEQUENCE),
        block("bitmaps", &BITMAP_DATA),
    ],
};

pub static BITMAP: TagGroupDef = TagGroupDef {
    code: codes::BITMAP,
    name: "bitmap",
    engine: Engine::Halo1,
    version: 7,
    root: &BITMAP_STRUCT,
};

/// Bit of `actor_variant.flags` that enables active camouflage.
pub const ACTIVE_CAMOUFLAGE: u64 = 1 << 4;

pub static CHANGE_COLOR: StructDef = StructDef {
    name: "change_color",
    fields: &[rgb("color_lower_bound"), rgb("color_upper_bound"), pad(8)],
};

pub static ACTOR_VARIANT_STRUCT: StructDef = StructDef {
    name: "actor_variant",
    fields: &[
        flags32(
            "flags",
            &[
                "can_shoot_while_flying",
                "interpolate_color_in_hsv",
                "has_unlimited_grenades",
                "moveswitch_stay_with_friends",
                "active_camouflage",
                "super_active_camouflage",
                "cannot_use_ranged_weapons",
                "prefer_passenger_seat",
            ],
        ),
        reference("actor_definition", &[codes::ACTOR]),
        reference("unit", &[codes::UNIT]),
        reference("major_variant", &[codes::ACTOR_VARIANT]),
        pad(24),
        enum16(
            "movement_type",
            &["always_run", "always_crouch", "switch_types"],
        ),
        pad(2),
        real("initial_crouch_chance"),
        real_bounds("crouch_time"),
        real_bounds("run_time"),
        real("camouflage_fade_time").when(Condition::FlagSet {
            field: "flags",
            mask: ACTIVE_CAMOUFLAGE,
        }),
        pad(16),
        reference("weapon", &[codes::WEAPON]),
        real("maximum_firing_distance"),
        real("rate_of_fire"),
        angle("projectile_error"),
        real_bounds("first_burst_delay_time"),
        real("new_target_firing_pattern_time"),
        real("surprise_delay_time"),
        real("surprise_fire_wildly_time"),
        real("death_fire_wildly_chance"),
        real("death_fire_wildly_time"),
        real_bounds("desired_combat_range"),
        point3("custom_stand_gun_offset"),
        point3("custom_crouch_gun_offset"),
        pad(12),
        block("change_colors", &CHANGE_COLOR),
        pad(12),
        int16("equipment_count"),
        enum16(
            "grenade_type",
            &["human_fragmentation", "covenant_plasma"],
        ),
        real("grenade_velocity"),
        pad(16),
    ],
};

pub static ACTOR_VARIANT: TagGroupDef = TagGroupDef {
    code: codes::ACTOR_VARIANT,
    name: "actor_variant",
    engine: Engine::Halo1,
    version: 1,
    root: &ACTOR_VARIANT_STRUCT,
};

pub static GROUPS: [&TagGroupDef; 4] = [&SCENARIO, &SHADER_ENVIRONMENT, &BITMAP, &ACTOR_VARIANT];
