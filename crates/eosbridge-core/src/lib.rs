// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// eosbridge: core types and error definitions shared across all crates.

pub mod config;
pub mod error;
pub mod params;
pub mod scope;
pub mod types;

pub use config::{LauncherInfo, PlatformOptions, PluginConfig};
pub use error::BridgeError;
pub use params::{NamedParams, ParamValue};
pub use scope::{AuthScopeFlags, ScopeRequest};
pub use types::*;
