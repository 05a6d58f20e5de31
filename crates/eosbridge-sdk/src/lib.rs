// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// eosbridge SDK: the native online-services SDK as seen by the extension.
//
// The SDK is reached through the `OnlineServices` trait. Every asynchronous
// call takes a `CorrelationToken` as its callback context; results come back
// later as `SdkEvent`s on a channel, and only while the SDK is being ticked.

pub mod events;
pub mod simulated;
pub mod stub;
pub mod traits;

pub use events::{ConnectOutcome, EventReceiver, EventSender, Outcome, SdkEvent, event_channel};
pub use simulated::{SdkCall, SimulatedHandle, SimulatedPlatform, SimulatedServices};
pub use stub::{NoServices, StubPlatform};
pub use traits::{LoginRequest, OnlineServices, Platform};
