//! Performance benchmarks for energy windowing and streaming dispatch

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use num_complex::Complex64;
use rfi_dsp::ml::model::FnModel;
use rfi_dsp::{extract, ClassificationSession, ExtractionConfig, ModelInput, RfiResult, SignalMatrix, StreamConfig};

fn synthetic_matrix(rows: usize) -> SignalMatrix {
    // Tone burst centred on column 700 over a low noise floor
    let data: Vec<Complex64> = (0..rows * 1536)
        .map(|i| {
            let col = i % 1536;
            let amp = if (650..750).contains(&col) { 100.0 } else { 1.0 };
            let phase = i as f64 * 0.01;
            Complex64::new(amp * phase.cos(), amp * phase.sin())
        })
        .collect();
    SignalMatrix::new(data, rows, 1536).unwrap()
}

fn bench_extract(c: &mut Criterion) {
    let matrix = synthetic_matrix(10);
    let config = ExtractionConfig::default();

    c.bench_function("extract_10x1536", |b| {
        b.iter(|| {
            let _ = extract(black_box(&matrix), black_box(&config));
        });
    });
}

fn bench_session(c: &mut Criterion) {
    let model = FnModel(|input: &ModelInput| -> RfiResult<Vec<Vec<f32>>> {
        Ok(vec![vec![0.0, 0.0, 1.0]; input.time_steps()])
    });
    let config = StreamConfig {
        time_window: 4,
        ..Default::default()
    };
    let mut session = ClassificationSession::new(model, config).unwrap();
    let chunk: Vec<f64> = (0..2 * 1000).map(|i| (i % 13) as f64).collect();

    c.bench_function("session_predict_1000_pairs", |b| {
        b.iter(|| {
            let _ = session.predict(black_box(&chunk));
        });
    });
}

criterion_group!(benches, bench_extract, bench_session);
criterion_main!(benches);
