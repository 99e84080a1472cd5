use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ruleform::{Engine, MemoryForm, Recording, RuleList};

const FIELD_RULES: &str = r#"{"op":":filled","msg":"Required"},
    {"op":":minLength","arg":3,"msg":"Too short"},
    {"op":":pattern","arg":"[a-z0-9]+","msg":"Letters and digits only"},
    {"op":":filled","control":"company","rules":[{"op":":maxLength","arg":40,"msg":"Too long"}]}"#;

/// Build a form with `n` text controls that all pass their rules.
fn build_form(n: usize) -> MemoryForm {
    let mut form = MemoryForm::new().text("company", "acme");
    for i in 0..n {
        form = form.text(&format!("f{i}"), "value42").rules(FIELD_RULES);
    }
    form
}

fn bench_validate_form(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_form");
    let engine = Engine::default();

    for &n in &[5, 20, 50] {
        let form = build_form(n);
        group.bench_with_input(BenchmarkId::new("passing", n), &form, |b, form| {
            b.iter(|| engine.validate_form(black_box(form), &mut Recording::new()));
        });
        group.bench_with_input(BenchmarkId::new("report", n), &form, |b, form| {
            b.iter(|| engine.validate_form_report(black_box(form)));
        });
    }

    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("metadata");

    group.bench_function("parse", |b| {
        b.iter(|| RuleList::parse(black_box(FIELD_RULES)));
    });

    let rules = RuleList::parse(FIELD_RULES).unwrap();
    group.bench_function("to_json", |b| {
        b.iter(|| black_box(&rules).to_json());
    });

    group.finish();
}

criterion_group!(benches, bench_validate_form, bench_parse);
criterion_main!(benches);
