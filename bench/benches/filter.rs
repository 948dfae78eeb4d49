use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rescue::{trace, StackInfo, Trace};

fn synthetic(frames: usize) -> String {
    let mut text = String::from("thread 'main' raised:\n");
    text.push_str("   0: rescue::signal::raise\n             at ./src/signal.rs:1:1\n");
    for i in 1..=frames {
        text.push_str(&format!(
            "{:>4}: app::module::frame{}::{{{{closure}}}}\n             at ./src/lib.rs:{}:5\n",
            i, i, i
        ));
    }
    text
}

fn bench_filter(c: &mut Criterion) {
    let text = synthetic(64);
    let raised = StackInfo::raised().level(2);
    let missing = StackInfo::new("", "missing");
    let last = StackInfo::new("app", "frame64");

    c.bench_function("filter_anchor_first", |b| {
        b.iter(|| trace::filter(black_box(text.as_str()).lines(), &raised))
    });
    c.bench_function("filter_anchor_last", |b| {
        b.iter(|| trace::filter(black_box(text.as_str()).lines(), &last))
    });
    c.bench_function("filter_no_anchor", |b| {
        b.iter(|| trace::filter(black_box(text.as_str()).lines(), &missing))
    });
}

fn bench_capture(c: &mut Criterion) {
    c.bench_function("capture", |b| b.iter(Trace::capture));
}

criterion_group!(benches, bench_filter, bench_capture);
criterion_main!(benches);
