//! Criterion benchmarks for the chain-validation hot path.
//!
//! Run with:
//!     cargo bench --bench validate_chain

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use shiritori_engine::kana::normalize::normalize;
use shiritori_engine::kana::validator::{is_acceptable_word, validate_chain, ValidationOutcome};

const MIDDLE_KANA: &[char] = &[
    'あ', 'い', 'う', 'え', 'お', 'き', 'く', 'け', 'こ', 'さ', 'し', 'す', 'せ', 'そ', 'た',
    'ち', 'つ', 'て', 'と', 'な', 'に', 'ぬ', 'ね', 'の',
];

/// Distinct words that all open and close on か, so any prefix forms a
/// valid chain of the requested length.
fn linked_chain(len: usize) -> Vec<String> {
    let mut words = Vec::with_capacity(len);
    'outer: for &a in MIDDLE_KANA {
        for &b in MIDDLE_KANA {
            if words.len() == len {
                break 'outer;
            }
            words.push(format!("か{}{}か", a, b));
        }
    }
    assert_eq!(words.len(), len, "middle alphabet too small for {}", len);
    words
}

fn bench_validate_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_chain");

    for len in [8usize, 64, 512] {
        let words = linked_chain(len);
        assert_eq!(validate_chain(&words), ValidationOutcome::Valid);
        group.bench_with_input(BenchmarkId::new("valid", len), &words, |b, words| {
            b.iter(|| validate_chain(words));
        });
    }

    // Worst rejection case: the duplicate sits at the very end.
    let mut words = linked_chain(512);
    words.push(words[0].clone());
    group.bench_with_input(
        BenchmarkId::new("late_duplicate", words.len()),
        &words,
        |b, words| {
            b.iter(|| validate_chain(words));
        },
    );

    group.finish();
}

fn bench_word_checks(c: &mut Criterion) {
    let mut group = c.benchmark_group("word_checks");

    let samples = ["さかな", "ミキサー", "でんしゃ", "ふぁてぃ", "ああああ"];
    group.bench_function("is_acceptable_word", |b| {
        b.iter(|| {
            samples
                .iter()
                .filter(|w| is_acceptable_word(w))
                .count()
        });
    });

    group.bench_function("normalize", |b| {
        b.iter(|| {
            samples
                .iter()
                .map(|w| normalize(w).len())
                .sum::<usize>()
        });
    });

    group.finish();
}

criterion_group!(benches, bench_validate_chain, bench_word_checks);
criterion_main!(benches);
