// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The host application as seen by the extension.

use std::path::PathBuf;

use eosbridge_core::error::Result;
use eosbridge_core::params::NamedParams;
use eosbridge_core::types::AsyncId;

/// Message id carried by replies; the host routes them by `async_id` only.
pub const REPLY_MESSAGE_ID: &str = "";

/// Unsolicited event sent whenever the SDK login status changes.
pub const LOGIN_STATUS_CHANGED: &str = "on-login-status-changed";

/// A message from the extension to the scripting side.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    pub message_id: String,
    pub params: NamedParams,
    pub async_id: AsyncId,
}

impl OutboundMessage {
    /// Reply to the caller waiting on `async_id`.
    pub fn reply(params: NamedParams, async_id: AsyncId) -> Self {
        Self {
            message_id: REPLY_MESSAGE_ID.to_owned(),
            params,
            async_id,
        }
    }

    /// Event nobody asked for.
    pub fn event(message_id: &str, params: NamedParams) -> Self {
        Self {
            message_id: message_id.to_owned(),
            params,
            async_id: AsyncId::NONE,
        }
    }

    pub fn is_reply(&self) -> bool {
        self.message_id == REPLY_MESSAGE_ID
    }
}

/// Services the host application provides to the extension.
pub trait Host {
    fn send_message(&mut self, message: OutboundMessage);

    /// Contents of the exported project's `package.json`.
    fn package_json(&self) -> Result<String>;

    /// Per-user writable folder for the application.
    fn app_data_folder(&self) -> PathBuf;

    /// Process command line, program name first.
    fn command_line(&self) -> Vec<String>;
}
