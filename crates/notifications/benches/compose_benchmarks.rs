use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pixelift_notifications::{compose, ContextParts, NotificationContext};

fn example_context(with_terms: bool) -> NotificationContext {
    NotificationContext::from_parts(ContextParts {
        resolution: Some("8x".into()),
        image_url: Some("https://cdn.example.com/orig/landscape-2048.jpg".into()),
        download_url: Some("https://dl.example.com/t/9f8a7c6b5d4e".into()),
        expiry_date: Some("Jan 5, 2025 3:00pm".into()),
        terms_conditions_url: with_terms.then(|| "https://example.com/terms".to_string()),
        site_name: Some("Acme Prints".into()),
    })
    .expect("benchmark context is complete")
}

fn bench_compose(c: &mut Criterion) {
    let plain = example_context(false);
    let with_terms = example_context(true);

    let mut group = c.benchmark_group("compose_notification");
    group.bench_function("without_terms", |b| {
        b.iter(|| compose(black_box(&plain)))
    });
    group.bench_function("with_terms", |b| {
        b.iter(|| compose(black_box(&with_terms)))
    });
    group.finish();
}

criterion_group!(benches, bench_compose);
criterion_main!(benches);
