//! Benchmarks for the policy engine
//!
//! Measures performance of:
//! - Blanket and selective scope matching
//! - full_control bypass
//! - Permission parsing at issuance

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use merchant_authz::{Credential, PolicyEngine, Principal, ScopeGrant, ScopeRequirement};

fn credential(permissions: &[String]) -> Credential {
    Credential {
        id: "bench-credential".to_string(),
        user_id: Some(1),
        app_id: String::new(),
        redirect_url: String::new(),
        permissions: permissions.iter().cloned().collect(),
        created: Utc::now(),
    }
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let engine = PolicyEngine::new();
    let principal = Principal::new(1, "bench@example.com");

    for size in [1usize, 16, 256] {
        let permissions: Vec<String> = (0..size)
            .map(|i| format!("invoice_management:{}", i))
            .collect();
        let held = credential(&permissions);
        let required = ScopeRequirement::new(["invoice_management"]);
        let last = (size - 1).to_string();

        group.bench_with_input(BenchmarkId::new("selective", size), &last, |b, resource| {
            b.iter(|| {
                engine.check(
                    black_box(&principal),
                    black_box(&held),
                    &required,
                    Some(resource.as_str()),
                )
            });
        });
    }

    let blanket = credential(&["store_management".to_string(), "wallet_management".to_string()]);
    let required = ScopeRequirement::new(["store_management", "wallet_management"]);
    group.bench_function("blanket", |b| {
        b.iter(|| engine.check(black_box(&principal), black_box(&blanket), &required, None));
    });

    let full = credential(&["full_control".to_string()]);
    group.bench_function("full_control", |b| {
        b.iter(|| engine.check(black_box(&principal), black_box(&full), &required, None));
    });

    group.finish();
}

fn bench_grant_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("grant_parsing");

    for (name, permission) in [("blanket", "product_management"), ("selective", "product_management:1234")] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &permission, |b, &p| {
            b.iter(|| black_box(p).parse::<ScopeGrant>().unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_grant_parsing);
criterion_main!(benches);
