use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rule_engine::{evaluate, FactSet};

fn bench_evaluate(c: &mut Criterion) {
    let legal = FactSet::new("car").with_speed(30).with_license("yes");
    let worst = FactSet::new("motorcycle")
        .with_helmet("no")
        .with_speed(70)
        .with_license("no")
        .with_red_light("yes")
        .with_phone("yes")
        .with_alcohol("yes");

    c.bench_function("evaluate_legal", |b| b.iter(|| evaluate(black_box(&legal))));
    c.bench_function("evaluate_all_rules", |b| b.iter(|| evaluate(black_box(&worst))));
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
