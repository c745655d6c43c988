use criterion::{black_box, criterion_group, criterion_main, Criterion};

use quizdeck_core::metrics::{compute_metrics, derive_badges};
use quizdeck_core::model::{AnswerRecord, Difficulty, Scorecard, Selection};

fn make_scorecard(n: usize) -> Scorecard {
    let mut card = Scorecard::new(n);
    for i in 0..n {
        card.record(AnswerRecord {
            question_index: i,
            selection: if i % 3 == 0 {
                Selection::Skipped
            } else {
                Selection::Answered(i % 4)
            },
            is_correct: i % 2 == 0,
            time_taken_secs: (i as u64 % 30) + 3,
        });
    }
    card
}

fn bench_compute_metrics(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_metrics");

    for n in [5, 50, 500] {
        let card = make_scorecard(n);
        group.bench_function(format!("n={n}"), |b| {
            b.iter(|| compute_metrics(black_box(&card)))
        });
    }

    group.finish();
}

fn bench_derive_badges(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive_badges");
    let card = make_scorecard(20);
    let metrics = compute_metrics(&card);

    group.bench_function("n=20,hard", |b| {
        b.iter(|| derive_badges(black_box(&metrics), black_box(20), black_box(Difficulty::Hard)))
    });

    group.finish();
}

criterion_group!(benches, bench_compute_metrics, bench_derive_badges);
criterion_main!(benches);
