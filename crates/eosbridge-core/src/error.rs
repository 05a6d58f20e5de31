// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for eosbridge.

use thiserror::Error;

use crate::types::{CorrelationToken, OperationKind, ResultCode};

/// Top-level error type for all eosbridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    // -- Startup --
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("SDK initialisation failed: {0}")]
    SdkInit(String),

    #[error("extension is unavailable")]
    Unavailable,

    // -- Correlation --
    #[error("no pending operation for {0}")]
    UnknownToken(CorrelationToken),

    #[error("correlation token space exhausted")]
    TokenSpaceExhausted,

    #[error("completion does not match pending {kind} operation ({token})")]
    MismatchedCompletion {
        token: CorrelationToken,
        kind: OperationKind,
    },

    // -- Identity --
    #[error("login rejected: {0}")]
    AuthFailure(ResultCode),

    #[error("no linked identity; achievements unavailable")]
    NotLinked,

    #[error("identity linking failed: {0}")]
    TransientLinkFailure(String),

    #[error("no user is logged in")]
    NotLoggedIn,

    #[error("another {0} is already in progress")]
    Busy(&'static str),

    #[error("native call failed: {0}")]
    Native(ResultCode),

    // -- Message boundary --
    #[error("unknown message: {0}")]
    UnknownMessage(String),

    #[error("bad parameter {index} for {message}: expected {expected}")]
    BadParameter {
        message: String,
        index: usize,
        expected: &'static str,
    },

    // -- Platform --
    #[error("feature not available on this platform")]
    PlatformUnavailable,

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// How far an error travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Leaves the whole extension unavailable.
    Fatal,
    /// Reported to the waiting caller as `isOk: false`.
    Surfaced,
    /// No caller can be identified, or the failure is best-effort: log only.
    LoggedOnly,
}

impl BridgeError {
    pub fn classify(&self) -> Severity {
        match self {
            Self::Configuration(_) | Self::SdkInit(_) | Self::PlatformUnavailable => {
                Severity::Fatal
            }
            Self::UnknownToken(_)
            | Self::TransientLinkFailure(_)
            | Self::UnknownMessage(_)
            | Self::TokenSpaceExhausted => Severity::LoggedOnly,
            Self::Unavailable
            | Self::MismatchedCompletion { .. }
            | Self::AuthFailure(_)
            | Self::NotLinked
            | Self::NotLoggedIn
            | Self::Busy(_)
            | Self::Native(_)
            | Self::BadParameter { .. }
            | Self::Io(_)
            | Self::Serialization(_) => Severity::Surfaced,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BridgeError>;
