// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Desktop stand-in for the host application.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tracing::debug;

use eosbridge_core::error::Result;
use eosbridge_core::types::ConsoleLevel;
use eosbridge_plugin::{ConsoleSink, Host, OutboundMessage};

/// Host that reads package.json from disk and forwards outbound messages
/// to the client over a channel.
pub struct DesktopHost {
    outbox: mpsc::UnboundedSender<OutboundMessage>,
    package_json: PathBuf,
    app_data: PathBuf,
    args: Vec<String>,
}

impl DesktopHost {
    pub fn new(
        outbox: mpsc::UnboundedSender<OutboundMessage>,
        package_json: PathBuf,
        app_data: PathBuf,
        args: Vec<String>,
    ) -> Self {
        Self {
            outbox,
            package_json,
            app_data,
            args,
        }
    }
}

impl Host for DesktopHost {
    fn send_message(&mut self, message: OutboundMessage) {
        if self.outbox.send(message).is_err() {
            debug!("client gone; dropping outbound message");
        }
    }

    fn package_json(&self) -> Result<String> {
        Ok(std::fs::read_to_string(&self.package_json)?)
    }

    fn app_data_folder(&self) -> PathBuf {
        self.app_data.clone()
    }

    fn command_line(&self) -> Vec<String> {
        self.args.clone()
    }
}

/// Application data directory, creating it if needed.
pub fn data_dir() -> PathBuf {
    let base = if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        std::env::temp_dir()
    };
    let dir = base.join("eosbridge");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        debug!(path = %dir.display(), error = %e, "cannot create data dir");
    }
    dir
}

/// Host console on stderr.
pub struct StderrConsole;

impl ConsoleSink for StderrConsole {
    fn log(&self, level: ConsoleLevel, line: &str) {
        match level {
            ConsoleLevel::Normal => eprintln!("{line}"),
            ConsoleLevel::Warning => eprintln!("warning: {line}"),
            ConsoleLevel::Error => eprintln!("error: {line}"),
        }
    }
}
