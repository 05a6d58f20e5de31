// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// eosbridge: desktop harness for the online-services extension.
//
// Loads the extension against the simulated SDK, drives a login, identity
// link, achievement unlock and logout through the async client, and prints a
// JSON summary.
//
// Usage: eosbridge [path/to/package.json] [host arguments...]

mod client;
mod host;

use std::path::PathBuf;

use serde::Serialize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use eosbridge_core::error::Result;
use eosbridge_core::scope::ScopeRequest;
use eosbridge_core::types::Profile;
use eosbridge_plugin::HostConsoleLayer;
use eosbridge_sdk::SimulatedPlatform;

use client::EpicGamesClient;
use host::StderrConsole;

#[derive(Debug, Serialize)]
struct Summary {
    available: bool,
    is_epic_launcher: bool,
    logged_in: bool,
    login_type: i32,
    login_status: &'static str,
    epic_account_id: String,
    profile: Profile,
    linked_identity: Option<String>,
    achievement_unlocked: bool,
    logged_out: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(HostConsoleLayer::new(StderrConsole))
        .init();

    tracing::info!("eosbridge starting");

    let mut args = std::env::args().skip(1);
    let package_json = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("package.json"));
    let mut host_args = vec!["eosbridge".to_owned()];
    host_args.extend(args);

    let mut client = EpicGamesClient::new(
        SimulatedPlatform::new(),
        package_json,
        host::data_dir(),
        host_args,
    );

    client.set_scopes(ScopeRequest {
        presence: true,
        ..ScopeRequest::default()
    });

    let available = client.init().await?;
    let mut summary = Summary {
        available,
        is_epic_launcher: client.is_epic_launcher(),
        logged_in: false,
        login_type: -1,
        login_status: client.login_status(),
        epic_account_id: String::new(),
        profile: Profile::default(),
        linked_identity: None,
        achievement_unlocked: false,
        logged_out: false,
    };

    if available {
        summary.logged_in = if client.is_epic_launcher() && !client.launcher_exchange_code().is_empty() {
            let code = client.launcher_exchange_code().to_owned();
            client.log_in_exchange_code(&code).await?
        } else {
            client.log_in_portal().await?
        };
        summary.login_type = client.login_type_number();
        summary.login_status = client.login_status();
        summary.epic_account_id = client.epic_account_id().to_owned();
        summary.profile = client.profile().clone();

        // One more tick lets the identity link complete.
        client.tick();
        summary.linked_identity = client
            .shared_handles()
            .linked_identity
            .map(|user| user.to_string());

        summary.achievement_unlocked = client.unlock_achievement("demo-achievement").await?;
        summary.logged_out = client.log_out().await?;
        client.release();
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
