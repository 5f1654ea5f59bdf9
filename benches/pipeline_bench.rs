// ABOUTME: Criterion benchmarks for the nutrition pipeline hot paths
// ABOUTME: Measures aggregation, dish matching, guardrail runs, and item id derivation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Criterion benchmarks for the nutrition pipeline.
//!
//! Covers the synchronous stages that run on every request: item
//! aggregation, archetype matching, the guardrail runner, and legacy item id
//! derivation.

#![allow(clippy::missing_docs_in_private_items, missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nutrilens::adapters::dto::stable_item_id;
use nutrilens::AnalyzedItem;
use nutrilens_intelligence::{compute_from_items, match_dish, GuardrailContext, GuardrailRunner};
use serde_json::json;

const FOOD_CODES: &[&str] = &[
    "rice_cooked",
    "pork_loin_cutlet",
    "cabbage_raw",
    "miso_soup",
    "beef_sukiyaki_style",
    "grilled_salmon",
];

#[allow(clippy::cast_precision_loss)]
fn meal(count: usize) -> Vec<AnalyzedItem> {
    (0..count)
        .map(|index| {
            let code = FOOD_CODES[index % FOOD_CODES.len()];
            AnalyzedItem::from_code(code, 50.0 + (index % 7) as f64 * 20.0)
        })
        .collect()
}

fn bench_aggregation(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for count in [3_usize, 10, 50] {
        let items = meal(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("items", count), &items, |b, items| {
            b.iter(|| compute_from_items(black_box(items), "とんかつ定食"));
        });
    }

    group.finish();
}

fn bench_dish_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_dish");

    for text in ["牛丼", "とんかつ定食 大盛り", "焼き魚定食", "謎の料理"] {
        group.bench_with_input(BenchmarkId::from_parameter(text), text, |b, text| {
            b.iter(|| match_dish(black_box(text)));
        });
    }

    group.finish();
}

fn bench_guardrails(c: &mut Criterion) {
    let Ok(runner) = GuardrailRunner::with_defaults() else {
        return;
    };
    let mut group = c.benchmark_group("guardrails");
    let context = GuardrailContext::for_text("とんかつ定食");

    let consistent = json!({
        "dish": "とんかつ定食",
        "totals": {"kcal": 380, "protein_g": 23.5, "fat_g": 22.7, "carbs_g": 20.3},
        "items": [{"code": "pork_loin_cutlet", "grams": 120}, {"code": "rice_cooked", "grams": 200}]
    });
    let messy = json!({
        "dish": "とんかつ定食",
        "nutrition": {"calories": "0", "protein": "0", "fat": null, "carbs": ""},
        "items": [{"name": "ごはん", "qty_g": "200"}]
    });

    group.bench_function("consistent", |b| {
        b.iter(|| runner.run(black_box(&consistent), &context));
    });
    group.bench_function("sanitize_and_floor", |b| {
        b.iter(|| runner.run(black_box(&messy), &context));
    });

    group.finish();
}

fn bench_item_ids(c: &mut Criterion) {
    let item = json!({"code": "rice_cooked", "name": "ごはん", "grams": 200});
    let Some(object) = item.as_object() else {
        return;
    };

    c.bench_function("stable_item_id", |b| {
        b.iter(|| stable_item_id(black_box(object), 3, "normalized-hash"));
    });
}

criterion_group!(
    benches,
    bench_aggregation,
    bench_dish_matching,
    bench_guardrails,
    bench_item_ids
);
criterion_main!(benches);
