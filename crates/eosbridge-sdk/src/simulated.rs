// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Simulated SDK for desktop runs and tests.
//
// Every call is recorded. Asynchronous calls take their result from a
// per-call script (falling back to success) and queue the completion; queued
// events are only delivered on the next `tick`, as the real SDK does.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::debug;

use eosbridge_core::config::PlatformOptions;
use eosbridge_core::error::{BridgeError, Result};
use eosbridge_core::scope::AuthScopeFlags;
use eosbridge_core::types::{
    ContinuanceToken, CorrelationToken, Credentials, EpicAccountId, IdToken, LoginStatus,
    ProductUserId, ResultCode, SdkLogLevel, SdkLogMessage, UserInfo,
};

use crate::events::{ConnectOutcome, EventSender, Outcome, SdkEvent};
use crate::traits::{LoginRequest, OnlineServices, Platform};

/// A call made against the simulated SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SdkCall {
    Login {
        credentials: Credentials,
        scopes: AuthScopeFlags,
        token: CorrelationToken,
    },
    Logout {
        account: EpicAccountId,
        token: CorrelationToken,
    },
    DeletePersistentAuth {
        token: CorrelationToken,
    },
    CopyUserInfo {
        account: EpicAccountId,
    },
    CopyIdToken {
        account: EpicAccountId,
    },
    ConnectLogin {
        id_token: IdToken,
        token: CorrelationToken,
    },
    ConnectCreateUser {
        continuance: ContinuanceToken,
        token: CorrelationToken,
    },
    UnlockAchievements {
        user: ProductUserId,
        achievement_ids: Vec<String>,
        token: CorrelationToken,
    },
    Shutdown,
}

impl SdkCall {
    /// Whether this call reaches the network (everything but the copies).
    pub fn is_async(&self) -> bool {
        !matches!(
            self,
            Self::CopyUserInfo { .. } | Self::CopyIdToken { .. } | Self::Shutdown
        )
    }
}

struct SimState {
    calls: Vec<SdkCall>,
    queued: VecDeque<SdkEvent>,
    login_results: VecDeque<std::result::Result<EpicAccountId, ResultCode>>,
    logout_results: VecDeque<std::result::Result<(), ResultCode>>,
    delete_auth_results: VecDeque<std::result::Result<(), ResultCode>>,
    connect_results: VecDeque<ConnectOutcome>,
    create_user_results: VecDeque<std::result::Result<ProductUserId, ResultCode>>,
    unlock_results: VecDeque<std::result::Result<(), ResultCode>>,
    user_info: Option<UserInfo>,
    id_token_available: bool,
    status: LoginStatus,
    shutdown_result: std::result::Result<(), ResultCode>,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            queued: VecDeque::new(),
            login_results: VecDeque::new(),
            logout_results: VecDeque::new(),
            delete_auth_results: VecDeque::new(),
            connect_results: VecDeque::new(),
            create_user_results: VecDeque::new(),
            unlock_results: VecDeque::new(),
            user_info: Some(UserInfo::default()),
            id_token_available: true,
            status: LoginStatus::NotLoggedIn,
            shutdown_result: Ok(()),
        }
    }
}

impl SimState {
    fn complete(&mut self, token: CorrelationToken, outcome: Outcome) {
        self.queued.push_back(SdkEvent::Completed { token, outcome });
    }

    fn change_status(&mut self, current: LoginStatus) {
        if self.status != current {
            let previous = std::mem::replace(&mut self.status, current);
            self.queued
                .push_back(SdkEvent::LoginStatusChanged { previous, current });
        }
    }
}

/// Shared view of the simulated SDK, used to script results and inspect
/// calls after the services have been handed to the extension.
#[derive(Clone, Default)]
pub struct SimulatedHandle {
    state: Rc<RefCell<SimState>>,
}

impl SimulatedHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls made so far, oldest first.
    pub fn calls(&self) -> Vec<SdkCall> {
        self.state.borrow().calls.clone()
    }

    /// Calls that went to the network.
    pub fn async_calls(&self) -> Vec<SdkCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.is_async())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn script_login(&self, result: std::result::Result<EpicAccountId, ResultCode>) {
        self.state.borrow_mut().login_results.push_back(result);
    }

    pub fn script_logout(&self, result: std::result::Result<(), ResultCode>) {
        self.state.borrow_mut().logout_results.push_back(result);
    }

    pub fn script_delete_persistent_auth(&self, result: std::result::Result<(), ResultCode>) {
        self.state.borrow_mut().delete_auth_results.push_back(result);
    }

    pub fn script_connect(&self, outcome: ConnectOutcome) {
        self.state.borrow_mut().connect_results.push_back(outcome);
    }

    pub fn script_create_user(&self, result: std::result::Result<ProductUserId, ResultCode>) {
        self.state.borrow_mut().create_user_results.push_back(result);
    }

    pub fn script_unlock(&self, result: std::result::Result<(), ResultCode>) {
        self.state.borrow_mut().unlock_results.push_back(result);
    }

    /// `None` makes `copy_user_info` fail.
    pub fn set_user_info(&self, info: Option<UserInfo>) {
        self.state.borrow_mut().user_info = info;
    }

    pub fn set_id_token_available(&self, available: bool) {
        self.state.borrow_mut().id_token_available = available;
    }

    pub fn set_shutdown_result(&self, result: std::result::Result<(), ResultCode>) {
        self.state.borrow_mut().shutdown_result = result;
    }

    /// Queue an arbitrary event for delivery on the next tick.
    pub fn push_event(&self, event: SdkEvent) {
        self.state.borrow_mut().queued.push_back(event);
    }

    /// Events waiting for the next tick.
    pub fn queued_events(&self) -> usize {
        self.state.borrow().queued.len()
    }
}

/// Simulated SDK services.
pub struct SimulatedServices {
    handle: SimulatedHandle,
    events: EventSender,
}

impl SimulatedServices {
    pub fn new(handle: SimulatedHandle, events: EventSender) -> Self {
        Self { handle, events }
    }

    pub fn handle(&self) -> SimulatedHandle {
        self.handle.clone()
    }

    fn record(&self, call: SdkCall) {
        debug!(call = ?call, "simulated SDK call");
        self.handle.state.borrow_mut().calls.push(call);
    }
}

impl OnlineServices for SimulatedServices {
    fn tick(&mut self) {
        // Only what was queued before this tick is delivered now; callbacks
        // issued while handling these events wait for the next tick.
        let ready: Vec<SdkEvent> = self.handle.state.borrow_mut().queued.drain(..).collect();
        for event in ready {
            if self.events.send(event).is_err() {
                debug!("event receiver dropped; discarding simulated events");
                break;
            }
        }
    }

    fn login(&mut self, request: LoginRequest, token: CorrelationToken) {
        self.record(SdkCall::Login {
            credentials: request.credentials,
            scopes: request.scopes,
            token,
        });
        let mut state = self.handle.state.borrow_mut();
        let result = state
            .login_results
            .pop_front()
            .unwrap_or_else(|| Ok(EpicAccountId(format!("sim-account-{}", token.0))));
        if result.is_ok() {
            state.change_status(LoginStatus::LoggedIn);
        }
        state.complete(token, Outcome::Login(result));
    }

    fn logout(&mut self, account: &EpicAccountId, token: CorrelationToken) {
        self.record(SdkCall::Logout {
            account: account.clone(),
            token,
        });
        let mut state = self.handle.state.borrow_mut();
        let result = state.logout_results.pop_front().unwrap_or(Ok(()));
        if result.is_ok() {
            state.change_status(LoginStatus::NotLoggedIn);
        }
        state.complete(token, Outcome::Logout(result));
    }

    fn delete_persistent_auth(&mut self, token: CorrelationToken) {
        self.record(SdkCall::DeletePersistentAuth { token });
        let mut state = self.handle.state.borrow_mut();
        let result = state.delete_auth_results.pop_front().unwrap_or(Ok(()));
        state.complete(token, Outcome::DeletePersistentAuth(result));
    }

    fn copy_user_info(&self, account: &EpicAccountId) -> Result<UserInfo> {
        self.record(SdkCall::CopyUserInfo {
            account: account.clone(),
        });
        self.handle
            .state
            .borrow()
            .user_info
            .clone()
            .ok_or(BridgeError::Native(ResultCode::NotFound))
    }

    fn copy_id_token(&self, account: &EpicAccountId) -> Result<IdToken> {
        self.record(SdkCall::CopyIdToken {
            account: account.clone(),
        });
        if self.handle.state.borrow().id_token_available {
            Ok(IdToken {
                account_id: account.clone(),
                json_web_token: format!("jwt-for-{account}"),
            })
        } else {
            Err(BridgeError::Native(ResultCode::NotFound))
        }
    }

    fn connect_login(&mut self, id_token: IdToken, token: CorrelationToken) {
        self.record(SdkCall::ConnectLogin { id_token, token });
        let mut state = self.handle.state.borrow_mut();
        let outcome = state
            .connect_results
            .pop_front()
            .unwrap_or_else(|| ConnectOutcome::Linked(ProductUserId("sim-product-user".into())));
        state.complete(token, Outcome::ConnectLogin(outcome));
    }

    fn connect_create_user(&mut self, continuance: ContinuanceToken, token: CorrelationToken) {
        self.record(SdkCall::ConnectCreateUser { continuance, token });
        let mut state = self.handle.state.borrow_mut();
        let result = state
            .create_user_results
            .pop_front()
            .unwrap_or_else(|| Ok(ProductUserId("sim-created-user".into())));
        state.complete(token, Outcome::CreateUser(result));
    }

    fn unlock_achievements(
        &mut self,
        user: &ProductUserId,
        achievement_ids: &[String],
        token: CorrelationToken,
    ) {
        self.record(SdkCall::UnlockAchievements {
            user: user.clone(),
            achievement_ids: achievement_ids.to_vec(),
            token,
        });
        let mut state = self.handle.state.borrow_mut();
        let result = state.unlock_results.pop_front().unwrap_or(Ok(()));
        state.complete(token, Outcome::UnlockAchievements(result));
    }

    fn shutdown(&mut self) -> Result<()> {
        self.record(SdkCall::Shutdown);
        self.handle
            .state
            .borrow()
            .shutdown_result
            .map_err(BridgeError::Native)
    }
}

/// Platform that hands out `SimulatedServices` sharing one handle.
#[derive(Default)]
pub struct SimulatedPlatform {
    handle: SimulatedHandle,
    init_failure: Option<String>,
}

impl SimulatedPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// A platform whose initialisation fails with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            handle: SimulatedHandle::default(),
            init_failure: Some(reason.into()),
        }
    }

    pub fn handle(&self) -> SimulatedHandle {
        self.handle.clone()
    }
}

impl Platform for SimulatedPlatform {
    type Services = SimulatedServices;

    fn create(&mut self, options: &PlatformOptions, events: EventSender) -> Result<SimulatedServices> {
        if let Some(reason) = &self.init_failure {
            return Err(BridgeError::SdkInit(reason.clone()));
        }
        self.handle.push_event(SdkEvent::Log(SdkLogMessage {
            category: "LogEOS".into(),
            level: SdkLogLevel::Info,
            message: format!(
                "simulated platform created for product {}",
                options.config.product_id
            ),
        }));
        Ok(SimulatedServices::new(self.handle.clone(), events))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event_channel;

    fn services() -> (SimulatedServices, crate::events::EventReceiver) {
        let (tx, rx) = event_channel();
        (SimulatedServices::new(SimulatedHandle::new(), tx), rx)
    }

    #[test]
    fn completions_wait_for_tick() {
        let (mut sdk, mut rx) = services();
        sdk.delete_persistent_auth(CorrelationToken(1));
        assert!(rx.try_recv().is_err());

        sdk.tick();
        assert_eq!(
            rx.try_recv().expect("event"),
            SdkEvent::Completed {
                token: CorrelationToken(1),
                outcome: Outcome::DeletePersistentAuth(Ok(())),
            }
        );
    }

    #[test]
    fn scripted_results_are_used_in_order() {
        let (mut sdk, mut rx) = services();
        let handle = sdk.handle();
        handle.script_unlock(Err(ResultCode::NotFound));

        let user = ProductUserId("u".into());
        sdk.unlock_achievements(&user, &["a".into()], CorrelationToken(1));
        sdk.unlock_achievements(&user, &["b".into()], CorrelationToken(2));
        sdk.tick();

        let outcomes: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(
            outcomes,
            vec![
                SdkEvent::Completed {
                    token: CorrelationToken(1),
                    outcome: Outcome::UnlockAchievements(Err(ResultCode::NotFound)),
                },
                SdkEvent::Completed {
                    token: CorrelationToken(2),
                    outcome: Outcome::UnlockAchievements(Ok(())),
                },
            ]
        );
        assert_eq!(handle.async_calls().len(), 2);
    }

    #[test]
    fn successful_login_reports_status_change() {
        let (mut sdk, mut rx) = services();
        sdk.login(
            LoginRequest {
                credentials: Credentials::Portal,
                scopes: AuthScopeFlags::NO_FLAGS,
            },
            CorrelationToken(3),
        );
        sdk.tick();
        assert_eq!(
            rx.try_recv().expect("status"),
            SdkEvent::LoginStatusChanged {
                previous: LoginStatus::NotLoggedIn,
                current: LoginStatus::LoggedIn,
            }
        );
        assert!(matches!(
            rx.try_recv().expect("completion"),
            SdkEvent::Completed {
                outcome: Outcome::Login(Ok(_)),
                ..
            }
        ));
    }

    #[test]
    fn copies_fail_when_disabled() {
        let (sdk, _rx) = services();
        let handle = sdk.handle();
        handle.set_user_info(None);
        handle.set_id_token_available(false);
        let account = EpicAccountId("acc".into());
        assert!(sdk.copy_user_info(&account).is_err());
        assert!(sdk.copy_id_token(&account).is_err());
        assert!(handle.async_calls().is_empty());
        assert_eq!(handle.calls().len(), 2);
    }
}
