//! Performance benchmarks for the time & attendance engine.
//!
//! This benchmark suite tracks:
//! - Single daily calculation: < 20μs mean
//! - Month aggregation of 31 cards, per regime: < 200μs mean
//! - Time-card save through the HTTP API (daily + month recompute): < 1ms mean
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Days, NaiveDate};
use uuid::Uuid;

use kintai_engine::api::{create_router, AppState};
use kintai_engine::calculation::{aggregate_month, calculate_daily};
use kintai_engine::config::ConfigLoader;
use kintai_engine::engine::Engine;
use kintai_engine::models::{DailyTimeCard, StaffContract, TimeOfDay, WorkType, YearMonth};
use kintai_engine::policy::{OvertimePattern, PolicyVariant};
use kintai_engine::repository::InMemoryRepository;

use axum::{body::Body, http::Request};
use tower::ServiceExt;

fn april_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()
}

/// A premium pattern with every threshold switched on.
fn premium_pattern() -> OvertimePattern {
    let mut pattern = OvertimePattern::new("Premium", PolicyVariant::Premium);
    pattern.shared.daily_overtime_enabled = true;
    pattern.shared.weekly_overtime_enabled = true;
    pattern.shared.monthly_overtime_enabled = true;
    pattern.shared.calculate_midnight_premium = true;
    pattern
}

fn all_patterns() -> Vec<OvertimePattern> {
    let mut variable = OvertimePattern::new("Variable", PolicyVariant::Variable);
    variable.shared.daily_overtime_enabled = true;
    variable.shared.monthly_overtime_enabled = true;
    let mut flextime = OvertimePattern::new("Flextime", PolicyVariant::Flextime);
    flextime.shared.monthly_overtime_enabled = true;
    vec![
        premium_pattern(),
        OvertimePattern::new(
            "Range",
            PolicyVariant::MonthlyRange {
                min_hours: 140,
                max_hours: 160,
            },
        ),
        variable,
        flextime,
    ]
}

/// `count` calculated cards, alternating day and late shifts.
fn calculated_cards(count: u64, pattern: &OvertimePattern) -> Vec<DailyTimeCard> {
    let month_id = Uuid::new_v4();
    let contract_id = Uuid::new_v4();
    (0..count)
        .map(|offset| {
            let date = april_first() + Days::new(offset % 30);
            let (start, end) = if offset % 2 == 0 {
                (TimeOfDay::hm(9, 0).unwrap(), TimeOfDay::hm(18, 30).unwrap())
            } else {
                (TimeOfDay::hm(15, 0).unwrap(), TimeOfDay::hm(0, 30).unwrap().on_next_day())
            };
            let mut card = DailyTimeCard::new(month_id, contract_id, date, WorkType::Work)
                .with_times(start, end)
                .with_breaks(60, 0);
            calculate_daily(&card, pattern, None, 1)
                .unwrap()
                .apply_to(&mut card);
            card
        })
        .collect()
}

/// Benchmark: one daily calculation.
///
/// Target: < 20μs mean
fn bench_daily_card(c: &mut Criterion) {
    let pattern = premium_pattern();
    let card = DailyTimeCard::new(Uuid::new_v4(), Uuid::new_v4(), april_first(), WorkType::Work)
        .with_times(TimeOfDay::hm(13, 0).unwrap(), TimeOfDay::hm(23, 0).unwrap())
        .with_breaks(60, 0);

    c.bench_function("daily_card", |b| {
        b.iter(|| black_box(calculate_daily(black_box(&card), &pattern, None, 1).unwrap()))
    });
}

/// Benchmark: a full month under each regime.
///
/// Target: < 200μs mean
fn bench_month_per_regime(c: &mut Criterion) {
    let month = YearMonth::of(april_first());
    let mut group = c.benchmark_group("month_31_cards");

    for pattern in all_patterns() {
        let cards = calculated_cards(31, &pattern);
        group.bench_with_input(
            BenchmarkId::new("regime", pattern.variant.kind()),
            &cards,
            |b, cards| b.iter(|| black_box(aggregate_month(month, cards, &pattern, 1).unwrap())),
        );
    }

    group.finish();
}

/// Benchmark: month aggregation over growing card counts.
fn bench_scaling(c: &mut Criterion) {
    let month = YearMonth::of(april_first());
    let pattern = premium_pattern();
    let mut group = c.benchmark_group("scaling");

    for count in [1u64, 7, 14, 31] {
        let cards = calculated_cards(count, &pattern);
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("cards", count), &cards, |b, cards| {
            b.iter(|| black_box(aggregate_month(month, cards, &pattern, 1).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark: saving a card through the API, month recompute included.
///
/// Target: < 1ms mean
fn bench_api_save(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let loader = ConfigLoader::load("./config/default").expect("Failed to load config");
    let repo = InMemoryRepository::new();
    loader.seed(&repo).unwrap();

    let pattern = &loader.config().policies.overtime_patterns[0];
    let mut contract = StaffContract::draft("kt", Uuid::new_v4(), "Bench", april_first(), None);
    contract.overtime_pattern_id = Some(pattern.id);
    let contract_id = contract.id;
    repo.insert_staff_contract(contract).unwrap();

    let engine = Engine::new(repo, loader.engine_settings().unwrap());
    let router = create_router(AppState::new(engine));
    let body = serde_json::json!({
        "contract_id": contract_id,
        "work_date": "2023-04-03",
        "work_type": "work",
        "start": { "time": "09:00:00" },
        "end": { "time": "19:00:00" },
        "break_minutes": 60
    })
    .to_string();

    c.bench_function("api_save_time_card", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/timecards")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

criterion_group!(
    benches,
    bench_daily_card,
    bench_month_per_regime,
    bench_scaling,
    bench_api_save,
);
criterion_main!(benches);
