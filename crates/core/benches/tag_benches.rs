use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use tag_engine::group::codes;
use tag_engine::schema::{halo1, halo2};
use tag_engine::upgrade::plans::SCENARIO_HALO1_TO_HALO2;
use tag_engine::{
    read_tag_bytes, upgrade, write_tag_bytes, Record, Tag, TagGroupDef, TagReference, Value,
};

fn scenario(group: &TagGroupDef, scenery: usize) -> Tag {
    let instance = |index: usize| {
        let mut record = Record::new()
            .with("position", Value::Point3([index as f32, 0.5, -2.0]))
            .with("rotation", Value::Euler3([0.0, 0.0, 0.0]));
        let (palette, name) = match group.engine {
            tag_engine::Engine::Halo1 => ("type", "name"),
            tag_engine::Engine::Halo2 => ("palette_index", "name_index"),
        };
        record.insert(palette, Value::Int((index % 16) as i64));
        record.insert(name, Value::Int((index % 300) as i64));
        record
    };
    let bsps = (0..4)
        .map(|index| {
            Record::new().with(
                "structure_bsp",
                Value::Reference(TagReference::new(
                    codes::STRUCTURE_BSP,
                    format!("levels\\bench\\bsp_{index}"),
                )),
            )
        })
        .collect();
    let mut tag = Tag::new(group);
    tag.root.insert(
        "scenery",
        Value::Block((0..scenery).map(instance).collect()),
    );
    tag.root.insert("structure_bsps", Value::Block(bsps));
    tag.root
        .insert("script_string_data", Value::Data(vec![0x41; 4096]));
    tag
}

fn bench_write(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_scenario");
    for (label, schema) in [("halo1", &halo1::SCENARIO), ("halo2", &halo2::SCENARIO)] {
        let tag = scenario(schema, 500);
        group.bench_function(label, |b| {
            b.iter(|| write_tag_bytes(black_box(&tag), schema).expect("write"))
        });
    }
    group.finish();
}

fn bench_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_scenario");
    for size in [0usize, 100, 1000] {
        let (bytes, _) =
            write_tag_bytes(&scenario(&halo2::SCENARIO, size), &halo2::SCENARIO).expect("write");
        group.bench_function(format!("scenery_{size}"), |b| {
            b.iter(|| read_tag_bytes(black_box(&bytes), &halo2::SCENARIO).expect("read"))
        });
    }
    group.finish();
}

fn bench_upgrade(c: &mut Criterion) {
    let (bytes, _) =
        write_tag_bytes(&scenario(&halo1::SCENARIO, 500), &halo1::SCENARIO).expect("write");
    let source = read_tag_bytes(&bytes, &halo1::SCENARIO)
        .expect("read")
        .tag;
    let donor = scenario(&halo2::SCENARIO, 0);
    c.bench_function("upgrade_scenario", |b| {
        b.iter_batched(
            || source.clone(),
            |tag| upgrade(&tag, &SCENARIO_HALO1_TO_HALO2, Some(&donor)).expect("upgrade"),
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(tag_benches, bench_write, bench_read, bench_upgrade);
criterion_main!(tag_benches);
