// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// eosbridge plugin: bridges native SDK completion callbacks to the host's
// asynchronous message protocol.
//
// `Extension` is the entry point the host talks to. Underneath it the
// `Dispatcher` ties the operation `Registry` and the `IdentitySession` state
// machine to the SDK services.

pub mod console;
pub mod dispatcher;
pub mod extension;
pub mod host;
pub mod registry;
pub mod request;
pub mod session;

#[cfg(test)]
mod testing;

pub use console::{ConsoleSink, HostConsoleLayer};
pub use dispatcher::{Dispatcher, Reply, Response};
pub use extension::Extension;
pub use host::{Host, LOGIN_STATUS_CHANGED, OutboundMessage};
pub use registry::{PendingOperation, Registry};
pub use request::Request;
pub use session::{IdentitySession, SessionState, SharedHandles};
