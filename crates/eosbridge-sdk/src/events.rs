// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Events delivered by the SDK while it is ticked.

use tokio::sync::mpsc;

use eosbridge_core::types::{
    ContinuanceToken, CorrelationToken, EpicAccountId, LoginStatus, ProductUserId, ResultCode,
    SdkLogMessage,
};

/// Result of a connect (identity exchange) call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A product identity already exists and is now logged in.
    Linked(ProductUserId),
    /// No product identity yet; create one with this token.
    NeedsCreate(ContinuanceToken),
    Failed(ResultCode),
}

/// Payload of a completion callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Login(Result<EpicAccountId, ResultCode>),
    Logout(Result<(), ResultCode>),
    DeletePersistentAuth(Result<(), ResultCode>),
    ConnectLogin(ConnectOutcome),
    CreateUser(Result<ProductUserId, ResultCode>),
    UnlockAchievements(Result<(), ResultCode>),
}

/// Everything the SDK can tell the extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkEvent {
    /// A call issued with `token` has finished.
    Completed {
        token: CorrelationToken,
        outcome: Outcome,
    },
    LoginStatusChanged {
        previous: LoginStatus,
        current: LoginStatus,
    },
    /// The connect session needs refreshing.
    AuthExpiration,
    Log(SdkLogMessage),
}

pub type EventSender = mpsc::UnboundedSender<SdkEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SdkEvent>;

/// Channel the SDK pushes events into and the extension drains on tick.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
