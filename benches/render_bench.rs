//! Benchmarks for the chart pass
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use cyclist_scatter::chart::{CanvasSize, Element, Renderer, Scene};
use cyclist_scatter::config::CanvasConfig;
use cyclist_scatter::dataset::{normalize, RaceRecord, RawRecord};

fn create_raw_records(count: usize) -> Vec<RawRecord> {
    (0..count)
        .map(|i| {
            let seconds = 2200 + (i * 7 % 300) as u32;
            RawRecord {
                time: format!("{:02}:{:02}", seconds / 60, seconds % 60),
                seconds: Some(seconds),
                year: 1994 + (i % 22) as i32,
                name: format!("Rider {}", i),
                nationality: "FRA".to_string(),
                place: i as u32 + 1,
                doping: if i % 3 == 0 {
                    "Alleged blood doping".to_string()
                } else {
                    String::new()
                },
                url: String::new(),
            }
        })
        .collect()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");

    for size in [35, 1000, 10000] {
        let raw = create_raw_records(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("normalize_{}", size), |b| {
            b.iter(|| normalize(black_box(raw.clone())).unwrap())
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let renderer = Renderer::new(CanvasConfig::default());

    for size in [35, 1000] {
        let records: Vec<RaceRecord> = normalize(create_raw_records(size)).unwrap();
        group.throughput(Throughput::Elements(size as u64));

        // Rerender into the same scene, as a resize does
        group.bench_function(format!("rerender_{}", size), |b| {
            let mut scene = Scene::new(Element::new("body"));
            let page = scene.root();
            let canvas = scene.append(page, Element::new("svg").class("canvas"));

            b.iter(|| {
                renderer
                    .render(
                        &mut scene,
                        canvas,
                        page,
                        black_box(&records),
                        CanvasSize::new(1000.0, 600.0),
                    )
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_normalize, bench_render);
criterion_main!(benches);
