use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kidsheet::catalog::FsAssetCatalog;
use kidsheet::layout::LayoutComposer;
use kidsheet::{Difficulty, Registry, WorksheetRequest, WorksheetTypeId};
use rand::rngs::StdRng;
use rand::SeedableRng;

// Synthesis and composition are the CPU side of every render; the browser
// side is dominated by Chrome and not measured here.
fn bench_synthesize(c: &mut Criterion) {
    let registry = Registry::standard();
    let catalog = FsAssetCatalog::new("/nonexistent/kidsheet-bench-assets");

    for kind in [WorksheetTypeId::CountShapes, WorksheetTypeId::LetterHunt, WorksheetTypeId::Maze] {
        let request = WorksheetRequest::new(kind).with_difficulty(Difficulty::Hard);
        let mut rng = StdRng::seed_from_u64(7);
        c.bench_function(&format!("synthesize_{}", kind.as_str()), |b| {
            b.iter(|| {
                let _ = registry.synthesize(black_box(&request), &catalog, &mut rng).unwrap();
            })
        });
    }
}

fn bench_compose_all(c: &mut Criterion) {
    let registry = Registry::standard();
    let catalog = FsAssetCatalog::new("/nonexistent/kidsheet-bench-assets");
    let composer = LayoutComposer::default();
    let mut rng = StdRng::seed_from_u64(11);
    let specs: Vec<_> = WorksheetTypeId::ALL
        .iter()
        .map(|kind| registry.synthesize(&WorksheetRequest::new(*kind), &catalog, &mut rng).unwrap())
        .collect();

    c.bench_function("compose_every_type", |b| {
        b.iter(|| {
            for spec in &specs {
                let _ = composer.compose(black_box(spec), &spec.theme.palette());
            }
        })
    });
}

criterion_group!(benches, bench_synthesize, bench_compose_all);
criterion_main!(benches);
