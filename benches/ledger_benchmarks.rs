//! Performance benchmarks for the workforce engine.
//!
//! Covers the hot paths of both engines:
//! - Entitlement proration across hire months
//! - Expiry sweep over many forgotten shifts
//! - Balance listing through the HTTP router
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};

use axum::{body::Body, http::Request};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use tower::ServiceExt;
use uuid::Uuid;

use workforce_engine::api::{AppState, ROLE_HEADER, USER_ID_HEADER, create_router};
use workforce_engine::attendance::AttendanceService;
use workforce_engine::clock::ManualClock;
use workforce_engine::config::{AttendanceConfig, WorkforceConfig};
use workforce_engine::leave::prorate;
use workforce_engine::models::{Employee, Shift};
use workforce_engine::store::{MemoryStore, Store};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 8, 0, 0).unwrap()
}

fn employee(hired_at: Option<NaiveDate>) -> Employee {
    Employee {
        id: Uuid::new_v4(),
        first_name: "Bench".to_string(),
        last_name: "Worker".to_string(),
        hired_at,
    }
}

/// Builds a store holding `count` employees, each with one shift left open
/// at `start()`.
fn store_with_forgotten_shifts(count: usize) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let mut shifts = Vec::with_capacity(count);
    for _ in 0..count {
        let employee = employee(None);
        shifts.push(Shift::open(employee.id, start(), start()));
        store.insert_employee(employee).unwrap();
    }

    {
        let mut tx = store.begin().unwrap();
        for shift in &shifts {
            tx.insert_shift(shift).unwrap();
        }
        tx.commit().unwrap();
    }
    store
}

// =============================================================================
// Proration
// =============================================================================

fn bench_prorate(c: &mut Criterion) {
    let entitlement = Decimal::new(10, 0);
    let hires: Vec<Option<NaiveDate>> = (1..=12)
        .map(|month| NaiveDate::from_ymd_opt(2026, month, 15))
        .collect();

    let mut group = c.benchmark_group("prorate");
    group.throughput(Throughput::Elements(hires.len() as u64));
    group.bench_function("all_hire_months", |b| {
        b.iter(|| {
            for hired in &hires {
                black_box(prorate(black_box(entitlement), *hired, 2026));
            }
        })
    });
    group.finish();
}

// =============================================================================
// Expiry sweep
// =============================================================================

fn bench_sweep_expired(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep_expired");

    for count in [1usize, 10, 100, 1000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        if *count >= 1000 {
            group.sample_size(10);
        }
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_batched(
                || {
                    let clock = Arc::new(ManualClock::new(start() + Duration::hours(20)));
                    AttendanceService::new(
                        store_with_forgotten_shifts(count),
                        clock,
                        AttendanceConfig::default(),
                    )
                },
                |service| {
                    let closed = service.sweep_expired(None).unwrap();
                    assert_eq!(closed, count);
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

// =============================================================================
// HTTP
// =============================================================================

fn bench_list_balances(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let employees: Vec<Employee> = (0..50)
        .map(|i| employee(NaiveDate::from_ymd_opt(2025, (i % 12) + 1, 1)))
        .collect();
    let config = WorkforceConfig {
        employees,
        ..Default::default()
    };
    let clock = Arc::new(ManualClock::new(start()));
    let app = create_router(AppState::with_clock(&config, clock).unwrap());
    let admin = Uuid::new_v4();

    let mut group = c.benchmark_group("http");
    group.throughput(Throughput::Elements(50));
    group.bench_function("list_balances_50_employees", |b| {
        b.to_async(&rt).iter(|| async {
            let request = Request::builder()
                .method("GET")
                .uri("/api/leave/balances?year=2026")
                .header(ROLE_HEADER, "admin")
                .header(USER_ID_HEADER, admin.to_string())
                .body(Body::empty())
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            black_box(response)
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_prorate,
    bench_sweep_expired,
    bench_list_balances
);
criterion_main!(benches);
