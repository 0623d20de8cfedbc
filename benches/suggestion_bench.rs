//! Performance benchmarks for the suggestion pipeline.
//!
//! Run with: cargo bench
//!
//! These benchmarks cover the CPU-bound steps around a generation call:
//! - Parsing model output into suggestions
//! - Aggregating sentiment over a window of signals
//! - Building the suggestion prompt

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use solace::ai::{parse_suggestions, suggestion_prompt};
use solace::errors::AppResult;
use solace::models::{ChatMessage, Mood, MoodSample, SentimentLabel, TextSample};
use solace::sentiment::{Polarity, Sentiment, SentimentAggregator, SentimentClassifier};

/// Cheap stand-in for the ONNX classifier so only aggregation is measured.
struct LengthClassifier;

impl SentimentClassifier for LengthClassifier {
    fn classify(&self, text: &str) -> AppResult<Sentiment> {
        let polarity = if text.len() % 2 == 0 {
            Polarity::Positive
        } else {
            Polarity::Negative
        };
        Ok(Sentiment::new(polarity, 0.75))
    }
}

fn model_output(lines: usize) -> String {
    let templates = [
        "relaxation|Listen to calming music|15 minutes",
        "Physical | Take a short walk outside | 10 minutes",
        "not a suggestion at all",
        "social|Call a friend|",
        "unknown|Do something|5 minutes",
    ];
    (0..lines)
        .map(|i| templates[i % templates.len()])
        .collect::<Vec<_>>()
        .join("\n")
}

/// Benchmark parsing with various output sizes.
fn bench_parse_suggestions(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_suggestions");

    for lines in [5, 50, 500] {
        let raw = model_output(lines);
        group.throughput(Throughput::Bytes(raw.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(lines), &raw, |b, raw| {
            b.iter(|| black_box(parse_suggestions(black_box(raw))));
        });
    }

    group.finish();
}

/// Benchmark aggregation over the engine's usual signal window.
fn bench_aggregate(c: &mut Criterion) {
    let now = Utc::now();
    let moods: Vec<MoodSample> = (0..5)
        .map(|i| MoodSample::new(Mood::ALL[i % 5], now - Duration::hours(i as i64)))
        .collect();
    let journals: Vec<TextSample> = (0..5)
        .map(|i| TextSample::new(format!("Journal entry number {i} about the day"), now))
        .collect();
    let chats: Vec<ChatMessage> = (0..10)
        .map(|i| ChatMessage::assistant(format!("Reply {i}, take it easy"), now))
        .collect();

    let classifier = LengthClassifier;
    c.bench_function("aggregate_sentiment", |b| {
        b.iter(|| {
            let aggregate = SentimentAggregator::new(&classifier).aggregate(
                black_box(&moods),
                black_box(&journals),
                black_box(&chats),
            );
            black_box(aggregate);
        });
    });
}

/// Benchmark prompt construction with long journal texts.
fn bench_suggestion_prompt(c: &mut Criterion) {
    let now = Utc::now();
    let journals: Vec<TextSample> = (0..5)
        .map(|_| TextSample::new("A long reflective paragraph. ".repeat(40), now))
        .collect();
    let chats: Vec<ChatMessage> = (0..10)
        .map(|_| ChatMessage::assistant("A thoughtful reply. ".repeat(20), now))
        .collect();

    c.bench_function("suggestion_prompt", |b| {
        b.iter(|| {
            black_box(suggestion_prompt(
                SentimentLabel::Neutral,
                black_box(&journals),
                black_box(&chats),
            ))
        });
    });
}

criterion_group!(
    benches,
    bench_parse_suggestions,
    bench_aggregate,
    bench_suggestion_prompt
);
criterion_main!(benches);
