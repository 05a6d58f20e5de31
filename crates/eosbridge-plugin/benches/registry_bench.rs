// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the correlation hot path: token issue/resolve,
// message decoding, and a full login-to-reply cycle against the simulated SDK.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use eosbridge_core::params::ParamValue;
use eosbridge_core::scope::ScopeRequest;
use eosbridge_core::types::{AsyncId, Credentials, OperationKind};
use eosbridge_plugin::{Dispatcher, Registry, Request};
use eosbridge_sdk::{OnlineServices, SdkEvent, SimulatedHandle, SimulatedServices, event_channel};

/// Issue and immediately resolve one token.
fn bench_issue_resolve(c: &mut Criterion) {
    let mut registry = Registry::new();

    c.bench_function("registry issue+resolve", |b| {
        b.iter(|| {
            let token = registry
                .issue(black_box(OperationKind::UnlockAchievement), AsyncId(1.0))
                .expect("issue");
            let op = registry.resolve(token).expect("resolve");
            black_box(op);
        });
    });

    // Resolution with many operations outstanding, as when the SDK stalls.
    let mut crowded = Registry::new();
    for i in 0..1_000 {
        crowded
            .issue(OperationKind::UnlockAchievement, AsyncId(f64::from(i)))
            .expect("issue");
    }
    c.bench_function("registry issue+resolve (1000 pending)", |b| {
        b.iter(|| {
            let token = crowded
                .issue(OperationKind::Logout, AsyncId(1.0))
                .expect("issue");
            black_box(crowded.resolve(token).expect("resolve"));
        });
    });
}

fn bench_parse_request(c: &mut Criterion) {
    let params: Vec<ParamValue> = vec![
        true.into(),
        false.into(),
        true.into(),
        false.into(),
        "localhost:6547".into(),
        "bench-user".into(),
    ];

    c.bench_function("parse log-in-devauthtool", |b| {
        b.iter(|| {
            let request = Request::parse(black_box("log-in-devauthtool"), black_box(&params));
            assert!(request.is_ok());
        });
    });
}

/// Login, tick, dispatch the completion, logout, tick, dispatch.
fn bench_login_cycle(c: &mut Criterion) {
    let (tx, mut rx) = event_channel();
    let handle = SimulatedHandle::new();
    let mut dispatcher = Dispatcher::new(SimulatedServices::new(handle.clone(), tx));

    c.bench_function("login/logout cycle (simulated)", |b| {
        b.iter(|| {
            dispatcher.log_in(Credentials::Portal, ScopeRequest::default(), AsyncId(1.0));
            for _ in 0..2 {
                dispatcher.sdk_mut().tick();
                while let Ok(event) = rx.try_recv() {
                    if let SdkEvent::Completed { token, outcome } = event {
                        black_box(dispatcher.complete(token, outcome));
                    }
                }
            }
            dispatcher.log_out(AsyncId(2.0));
            for _ in 0..2 {
                dispatcher.sdk_mut().tick();
                while let Ok(event) = rx.try_recv() {
                    if let SdkEvent::Completed { token, outcome } = event {
                        black_box(dispatcher.complete(token, outcome));
                    }
                }
            }
            handle.clear_calls();
        });
    });
}

criterion_group!(
    benches,
    bench_issue_resolve,
    bench_parse_request,
    bench_login_cycle,
);
criterion_main!(benches);
