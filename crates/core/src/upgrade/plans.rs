//! Built-in upgrade plans.

use crate::engine::Engine;
use crate::group::GroupCode;
use crate::schema::{halo1, halo2};

use super::{DonorRule, FieldMapping, FieldSource, UpgradePlan};

/// Halo 1 scenario to Halo 2 scenario. Lightmap references, BSP flags and the
/// default sky do not exist in Halo 1 and come from a donor scenario.
pub static SCENARIO_HALO1_TO_HALO2: UpgradePlan = UpgradePlan {
    name: "scenario",
    source: &halo1::SCENARIO,
    target: &halo2::SCENARIO,
    mappings: &[
        FieldMapping {
            structure: "object_name",
            field: "placement_index",
            source: FieldSource::Rename("object_index"),
        },
        FieldMapping {
            structure: "scenery_instance",
            field: "palette_index",
            source: FieldSource::Rename("type"),
        },
        FieldMapping {
            structure: "scenery_instance",
            field: "name_index",
            source: FieldSource::Rename("name"),
        },
    ],
    donors: &[DonorRule {
        block: "structure_bsps",
        key: "structure_bsp",
        fields: &["structure_lightmap", "flags", "default_sky"],
    }],
};

pub static BITMAP_HALO1_TO_HALO2: UpgradePlan = UpgradePlan {
    name: "bitmap",
    source: &halo1::BITMAP,
    target: &halo2::BITMAP,
    mappings: &[FieldMapping {
        structure: "bitmap",
        field: "fade_factor",
        source: FieldSource::Rename("detail_fade_factor"),
    }],
    donors: &[],
};

pub static PLANS: [&UpgradePlan; 2] = [&SCENARIO_HALO1_TO_HALO2, &BITMAP_HALO1_TO_HALO2];

pub fn find(name: &str) -> Option<&'static UpgradePlan> {
    PLANS.iter().copied().find(|plan| plan.name == name)
}

/// Plans whose source is `code` under `engine`.
pub fn for_source(engine: Engine, code: GroupCode) -> impl Iterator<Item = &'static UpgradePlan> {
    PLANS
        .iter()
        .copied()
        .filter(move |plan| plan.source.engine == engine && plan.source.code == code)
}
