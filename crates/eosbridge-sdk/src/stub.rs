// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub platform for builds where the native SDK is not linked.
//
// Platform creation always fails with `PlatformUnavailable`, so the
// extension reports itself unavailable and never touches the services.

use eosbridge_core::config::PlatformOptions;
use eosbridge_core::error::{BridgeError, Result};
use eosbridge_core::types::{
    ContinuanceToken, CorrelationToken, EpicAccountId, IdToken, ProductUserId, UserInfo,
};

use crate::events::EventSender;
use crate::traits::{LoginRequest, OnlineServices, Platform};

/// Platform returned when no native SDK is available.
pub struct StubPlatform;

/// Services type of the stub platform. It has no values.
pub enum NoServices {}

impl Platform for StubPlatform {
    type Services = NoServices;

    fn create(&mut self, _options: &PlatformOptions, _events: EventSender) -> Result<NoServices> {
        tracing::warn!("Platform::create called on stub platform");
        Err(BridgeError::PlatformUnavailable)
    }
}

impl OnlineServices for NoServices {
    fn tick(&mut self) {
        match *self {}
    }

    fn login(&mut self, _request: LoginRequest, _token: CorrelationToken) {
        match *self {}
    }

    fn logout(&mut self, _account: &EpicAccountId, _token: CorrelationToken) {
        match *self {}
    }

    fn delete_persistent_auth(&mut self, _token: CorrelationToken) {
        match *self {}
    }

    fn copy_user_info(&self, _account: &EpicAccountId) -> Result<UserInfo> {
        match *self {}
    }

    fn copy_id_token(&self, _account: &EpicAccountId) -> Result<IdToken> {
        match *self {}
    }

    fn connect_login(&mut self, _id_token: IdToken, _token: CorrelationToken) {
        match *self {}
    }

    fn connect_create_user(&mut self, _continuance: ContinuanceToken, _token: CorrelationToken) {
        match *self {}
    }

    fn unlock_achievements(
        &mut self,
        _user: &ProductUserId,
        _achievement_ids: &[String],
        _token: CorrelationToken,
    ) {
        match *self {}
    }

    fn shutdown(&mut self) -> Result<()> {
        match *self {}
    }
}
