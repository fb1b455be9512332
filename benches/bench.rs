// Criterion benchmarks for the intake rules

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pats_peak_intake::core::normalize_results;
use pats_peak_intake::models::{IntakeRequest, LookupRequest};
use pats_peak_intake::wizard::render_results;
use pats_peak_intake::{validate_intake, validate_lookup};
use serde_json::{json, Value};

fn lookup_request() -> LookupRequest {
    LookupRequest {
        first_name: Some("Ada".into()),
        last_name: Some("Lovelace".into()),
        dob: Some("1990-05-01".into()),
        zip: Some("03301-1234".into()),
        phone: Some("+1 (603) 555-0100".into()),
        mistyped: Vec::new(),
    }
}

fn intake_request() -> IntakeRequest {
    IntakeRequest {
        guest_id: Some("G-1001".into()),
        first_name: Some("Ada".into()),
        last_name: Some("Lovelace".into()),
        dob: Some("1990-05-01".into()),
        zip: Some("03301".into()),
        phone: Some("603-555-0100".into()),
        skier_type: Some("II".into()),
        weight_lbs: Some(150.0),
        height_in: Some(66.0),
        shoe_size: Some(9.5),
        email: Some("ada@example.com".into()),
        mistyped: Vec::new(),
    }
}

/// Search response mixing both naming conventions
fn search_response(count: usize) -> Value {
    let results: Vec<Value> = (0..count)
        .map(|i| {
            if i % 2 == 0 {
                json!({
                    "guest_id": i,
                    "first_name": "Ada",
                    "last_name": format!("Guest {}", i),
                    "date_of_birth": "1990-05-01",
                    "postal_code": "03301",
                    "phone": "603-555-0100",
                    "email": format!("guest{}@example.com", i)
                })
            } else {
                json!({
                    "guestId": format!("G-{}", i),
                    "firstName": "Ada",
                    "lastName": format!("Guest <{}>", i),
                    "dateOfBirth": "1990-05-01",
                    "postalCode": "03301-1234"
                })
            }
        })
        .collect();
    json!({ "results": results })
}

fn bench_validate_lookup(c: &mut Criterion) {
    let req = lookup_request();
    let now = Utc::now();

    c.bench_function("validate_lookup", |b| {
        b.iter(|| validate_lookup(black_box(&req), black_box(now)))
    });
}

fn bench_validate_intake(c: &mut Criterion) {
    let valid = intake_request();
    let invalid = IntakeRequest {
        zip: Some("1".into()),
        weight_lbs: Some(12.0),
        email: Some("nope".into()),
        ..intake_request()
    };
    let now = Utc::now();

    c.bench_function("validate_intake_valid", |b| {
        b.iter(|| validate_intake(black_box(&valid), black_box(now)))
    });
    c.bench_function("validate_intake_invalid", |b| {
        b.iter(|| validate_intake(black_box(&invalid), black_box(now)))
    });
}

fn bench_normalize_results(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_results");

    for size in [1, 10, 100].iter() {
        let body = search_response(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &body, |b, body| {
            b.iter(|| normalize_results(black_box(body)))
        });
    }

    group.finish();
}

fn bench_render_results(c: &mut Criterion) {
    let matches = normalize_results(&search_response(25));

    c.bench_function("render_results_25", |b| {
        b.iter(|| render_results(black_box(&matches)))
    });
}

criterion_group!(
    benches,
    bench_validate_lookup,
    bench_validate_intake,
    bench_normalize_results,
    bench_render_results
);
criterion_main!(benches);
