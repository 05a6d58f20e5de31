// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Test host that records outbound messages, and console capture.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::SubscriberExt;

use eosbridge_core::error::{BridgeError, Result};
use eosbridge_core::params::ParamValue;
use eosbridge_core::types::{AsyncId, ConsoleLevel};

use crate::console::{ConsoleSink, HostConsoleLayer};
use crate::host::{Host, OutboundMessage};

pub const PACKAGE_JSON: &str = r#"{
    "project-details": { "name": "Test Game", "version": "1.0.0.0" },
    "exported-properties": {
        "scirra-epic-games": {
            "product-name": "",
            "product-version": "",
            "product-id": "product",
            "client-id": "client",
            "client-secret": "secret",
            "sandbox-id": "sandbox",
            "deployment-id": "deployment"
        }
    }
}"#;

pub struct RecordingHost {
    pub sent: Vec<OutboundMessage>,
    pub package_json: Option<String>,
    pub app_data: PathBuf,
    pub args: Vec<String>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            sent: Vec::new(),
            package_json: Some(PACKAGE_JSON.to_owned()),
            app_data: std::env::temp_dir(),
            args: vec!["game.exe".to_owned()],
        }
    }

    pub fn without_package_json() -> Self {
        Self {
            package_json: None,
            ..Self::new()
        }
    }

    /// Messages sent since the last call, oldest first.
    pub fn take_sent(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.sent)
    }

    /// The reply addressed to `async_id`, if one was sent.
    pub fn reply_for(&self, async_id: AsyncId) -> Option<&OutboundMessage> {
        self.sent
            .iter()
            .find(|m| m.is_reply() && m.async_id == async_id)
    }

    pub fn is_ok(&self, async_id: AsyncId) -> Option<bool> {
        self.reply_for(async_id)
            .and_then(|m| m.params.get("isOk"))
            .and_then(ParamValue::as_bool)
    }
}

impl Host for RecordingHost {
    fn send_message(&mut self, message: OutboundMessage) {
        self.sent.push(message);
    }

    fn package_json(&self) -> Result<String> {
        self.package_json.clone().ok_or_else(|| {
            BridgeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "package.json",
            ))
        })
    }

    fn app_data_folder(&self) -> PathBuf {
        self.app_data.clone()
    }

    fn command_line(&self) -> Vec<String> {
        self.args.clone()
    }
}

#[derive(Clone, Default)]
struct CapturedConsole(Arc<Mutex<Vec<(ConsoleLevel, String)>>>);

impl ConsoleSink for CapturedConsole {
    fn log(&self, level: ConsoleLevel, line: &str) {
        self.0
            .lock()
            .expect("console lock")
            .push((level, line.to_owned()));
    }
}

/// Run `f` with a console layer installed and return every line it logged.
pub fn capture_console(f: impl FnOnce()) -> Vec<(ConsoleLevel, String)> {
    let sink = CapturedConsole::default();
    let subscriber = tracing_subscriber::registry().with(HostConsoleLayer::new(sink.clone()));
    tracing::subscriber::with_default(subscriber, f);
    let lines = sink.0.lock().expect("console lock").clone();
    lines
}
