use blinksort::algorithms::find;
use blinksort::harness::SortHarness;
use blinksort::{MemoryStrip, PacingConfig, PacingEngine, Renderer};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_unpaced_sorts(c: &mut Criterion) {
    let mut harness = SortHarness::new(1);
    let input = harness.shuffled(1024);
    for name in ["Quick Sort (LR ptrs)", "Merge Sort", "Heap Sort", "Radix Sort (LSD)"] {
        let algo = find(name).unwrap();
        c.bench_function(&format!("unpaced/{name}"), |b| {
            b.iter(|| black_box(harness.sort_unpaced(algo, black_box(&input))))
        });
    }
}

fn bench_frame_drop_render(c: &mut Criterion) {
    let mut harness = SortHarness::new(2);
    let input = harness.shuffled(480);
    let algo = find("Shell Sort").unwrap();
    let config = PacingConfig::unpaced();

    c.bench_function("render/frame_drop_256", |b| {
        b.iter(|| {
            let mut renderer = Renderer::new(MemoryStrip::new(480), &config);
            black_box(harness.sort_rendered(algo, &input, &mut renderer));
            black_box(renderer.stats());
        })
    });
}

fn bench_engine_run(c: &mut Criterion) {
    let config = PacingConfig {
        seed: Some(3),
        ..PacingConfig::unpaced()
    };
    let mut engine = PacingEngine::new(MemoryStrip::new(256), config).unwrap();
    let algo = find("Insertion Sort").unwrap();

    c.bench_function("engine/insertion_256", |b| {
        b.iter(|| black_box(engine.run(algo)))
    });
}

criterion_group!(benches, bench_unpaced_sorts, bench_frame_drop_render, bench_engine_run);
criterion_main!(benches);
