// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native online-services SDK.

use eosbridge_core::config::PlatformOptions;
use eosbridge_core::error::Result;
use eosbridge_core::scope::AuthScopeFlags;
use eosbridge_core::types::{
    ContinuanceToken, CorrelationToken, Credentials, EpicAccountId, IdToken, ProductUserId,
    UserInfo,
};

use crate::events::EventSender;

/// Options for a native login call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub credentials: Credentials,
    pub scopes: AuthScopeFlags,
}

/// Creates the native platform instance.
pub trait Platform {
    type Services: OnlineServices;

    /// Initialise the SDK and create a platform. Completion and notification
    /// events are pushed into `events` from then on.
    fn create(&mut self, options: &PlatformOptions, events: EventSender) -> Result<Self::Services>;
}

/// The native SDK surface used by the extension.
///
/// Methods that take a `CorrelationToken` are non-blocking: they return at
/// once and report through `SdkEvent::Completed` carrying the same token on
/// some later `tick`. The `copy_*` methods are synchronous reads of data the
/// SDK already holds.
pub trait OnlineServices {
    /// Let the SDK run queued work and invoke pending callbacks.
    fn tick(&mut self);

    fn login(&mut self, request: LoginRequest, token: CorrelationToken);

    fn logout(&mut self, account: &EpicAccountId, token: CorrelationToken);

    /// Forget the cached refresh token so persistent login cannot reuse it.
    fn delete_persistent_auth(&mut self, token: CorrelationToken);

    fn copy_user_info(&self, account: &EpicAccountId) -> Result<UserInfo>;

    fn copy_id_token(&self, account: &EpicAccountId) -> Result<IdToken>;

    /// Exchange an identity token for a product identity.
    fn connect_login(&mut self, id_token: IdToken, token: CorrelationToken);

    fn connect_create_user(&mut self, continuance: ContinuanceToken, token: CorrelationToken);

    fn unlock_achievements(
        &mut self,
        user: &ProductUserId,
        achievement_ids: &[String],
        token: CorrelationToken,
    );

    /// Release the platform and shut the SDK down.
    fn shutdown(&mut self) -> Result<()>;
}
