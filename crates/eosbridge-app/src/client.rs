// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Caller-side client: the scripting view of the extension.
//
// Each request gets a fresh async id and a oneshot channel. The client keeps
// ticking the extension while a request is outstanding; the reply comes back
// through the host outbox and resolves the matching oneshot.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use eosbridge_core::error::{BridgeError, Result};
use eosbridge_core::params::{NamedParams, ParamValue};
use eosbridge_core::scope::ScopeRequest;
use eosbridge_core::types::{AsyncId, LoginStatus, LoginStrategy, Profile};
use eosbridge_plugin::{Extension, LOGIN_STATUS_CHANGED, OutboundMessage, SharedHandles};
use eosbridge_sdk::Platform;

use crate::host::DesktopHost;

/// How often the extension is ticked while a request is waiting.
pub const TICK_INTERVAL: Duration = Duration::from_millis(20);

pub struct EpicGamesClient<P: Platform> {
    extension: Extension<DesktopHost, P>,
    inbox: mpsc::UnboundedReceiver<OutboundMessage>,
    pending: HashMap<u64, oneshot::Sender<NamedParams>>,
    next_async_id: u64,

    is_available: bool,
    is_epic_launcher: bool,
    launcher_exchange_code: String,

    scopes: ScopeRequest,
    login_type: Option<LoginStrategy>,
    login_status: LoginStatus,
    epic_account_id: String,
    profile: Profile,
    last_achievement: String,
}

#[allow(dead_code)]
impl<P: Platform> EpicGamesClient<P> {
    pub fn new(platform: P, package_json: PathBuf, app_data: PathBuf, args: Vec<String>) -> Self {
        let (outbox, inbox) = mpsc::unbounded_channel();
        let host = DesktopHost::new(outbox, package_json, app_data, args);
        Self {
            extension: Extension::new(host, platform),
            inbox,
            pending: HashMap::new(),
            next_async_id: 0,
            is_available: false,
            is_epic_launcher: false,
            launcher_exchange_code: String::new(),
            scopes: ScopeRequest::default(),
            login_type: None,
            login_status: LoginStatus::NotLoggedIn,
            epic_account_id: String::new(),
            profile: Profile::default(),
            last_achievement: String::new(),
        }
    }

    // -- Requests ------------------------------------------------------------

    /// Start the extension and read back availability and launcher details.
    pub async fn init(&mut self) -> Result<bool> {
        let result = self.send_async("init", Vec::new()).await?;
        self.is_available = flag(&result, "isAvailable");
        if self.is_available {
            self.is_epic_launcher = flag(&result, "isEpicLauncher");
            self.launcher_exchange_code = text(&result, "launcherExchangeCode");
        }
        info!(available = self.is_available, "client initialised");
        Ok(self.is_available)
    }

    pub async fn log_in_portal(&mut self) -> Result<bool> {
        self.log_in(LoginStrategy::Portal, "log-in-portal", Vec::new())
            .await
    }

    pub async fn log_in_persistent(&mut self) -> Result<bool> {
        self.log_in(LoginStrategy::Persistent, "log-in-persistent", Vec::new())
            .await
    }

    pub async fn log_in_exchange_code(&mut self, exchange_code: &str) -> Result<bool> {
        self.log_in(
            LoginStrategy::ExchangeCode,
            "log-in-exchange-code",
            vec![exchange_code.into()],
        )
        .await
    }

    pub async fn log_in_dev_auth_tool(&mut self, host: &str, credential_name: &str) -> Result<bool> {
        self.log_in(
            LoginStrategy::DevAuthTool,
            "log-in-devauthtool",
            vec![host.into(), credential_name.into()],
        )
        .await
    }

    async fn log_in(
        &mut self,
        strategy: LoginStrategy,
        message_id: &str,
        extra: Vec<ParamValue>,
    ) -> Result<bool> {
        self.require_available()?;
        self.login_type = Some(strategy);

        let mut params: Vec<ParamValue> = vec![
            self.scopes.basic_profile.into(),
            self.scopes.friends_list.into(),
            self.scopes.presence.into(),
            self.scopes.country.into(),
        ];
        params.extend(extra);

        let result = self.send_async(message_id, params).await?;
        let is_ok = flag(&result, "isOk");
        if is_ok {
            self.epic_account_id = text(&result, "epicAccountIdStr");
            self.profile = Profile {
                display_name: text(&result, "displayName"),
                display_name_sanitized: text(&result, "displayNameSanitized"),
                nickname: text(&result, "nickname"),
                preferred_language: text(&result, "preferredLanguage"),
                country: text(&result, "country"),
            };
            info!(account = %self.epic_account_id, "login complete");
        } else {
            warn!(strategy = ?strategy, "login failed");
        }
        Ok(is_ok)
    }

    pub async fn log_out(&mut self) -> Result<bool> {
        self.require_available()?;
        let result = self.send_async("log-out", Vec::new()).await?;
        let is_ok = flag(&result, "isOk");
        if is_ok {
            self.login_type = None;
            self.epic_account_id.clear();
            self.profile = Profile::default();
        }
        Ok(is_ok)
    }

    pub async fn unlock_achievement(&mut self, achievement_id: &str) -> Result<bool> {
        self.require_available()?;
        let result = self
            .send_async("unlock-achievement", vec![achievement_id.into()])
            .await?;
        self.last_achievement = achievement_id.to_owned();
        Ok(flag(&result, "isOk"))
    }

    /// Send a message and keep ticking until its reply arrives.
    async fn send_async(&mut self, message_id: &str, params: Vec<ParamValue>) -> Result<NamedParams> {
        let id = self.next_async_id;
        self.next_async_id += 1;
        let (tx, mut rx) = oneshot::channel();
        self.pending.insert(id, tx);

        self.extension
            .on_message(message_id, &params, AsyncId(id as f64));
        self.drain_inbox();

        let mut interval = tokio::time::interval(TICK_INTERVAL);
        loop {
            tokio::select! {
                reply = &mut rx => {
                    return reply.map_err(|_| BridgeError::Unavailable);
                }
                _ = interval.tick() => self.tick(),
            }
        }
    }

    fn require_available(&self) -> Result<()> {
        if self.is_available {
            Ok(())
        } else {
            Err(BridgeError::Unavailable)
        }
    }

    // -- Tick ----------------------------------------------------------------

    /// Tick the extension once and process everything it sent.
    pub fn tick(&mut self) {
        self.extension.on_message("platform-tick", &[], AsyncId::NONE);
        self.drain_inbox();
    }

    fn drain_inbox(&mut self) {
        while let Ok(message) = self.inbox.try_recv() {
            if message.is_reply() {
                self.resolve(message);
            } else if message.message_id == LOGIN_STATUS_CHANGED {
                self.on_login_status_changed(&message.params);
            } else {
                debug!(message = %message.message_id, "unhandled event");
            }
        }
    }

    fn resolve(&mut self, message: OutboundMessage) {
        let id = message.async_id.0 as u64;
        match self.pending.remove(&id) {
            Some(tx) => {
                if tx.send(message.params).is_err() {
                    debug!(async_id = id, "caller stopped waiting");
                }
            }
            None => warn!(async_id = id, "reply for unknown request"),
        }
    }

    fn on_login_status_changed(&mut self, params: &NamedParams) {
        let status = params
            .get("loginStatus")
            .and_then(ParamValue::as_number)
            .and_then(LoginStatus::from_number);
        match status {
            Some(status) => {
                self.login_status = status;
                if status == LoginStatus::NotLoggedIn {
                    self.login_type = None;
                }
                info!(status = status.as_str(), "login status changed");
            }
            None => warn!(params = ?params, "unknown login status"),
        }
    }

    // -- State ---------------------------------------------------------------

    pub fn is_available(&self) -> bool {
        self.is_available
    }

    pub fn is_epic_launcher(&self) -> bool {
        self.is_epic_launcher
    }

    pub fn launcher_exchange_code(&self) -> &str {
        &self.launcher_exchange_code
    }

    pub fn scopes(&self) -> ScopeRequest {
        self.scopes
    }

    pub fn set_scopes(&mut self, scopes: ScopeRequest) {
        self.scopes = scopes;
    }

    pub fn login_type(&self) -> Option<LoginStrategy> {
        self.login_type
    }

    /// Login type as scripts compare it: -1 when none.
    pub fn login_type_number(&self) -> i32 {
        self.login_type.map_or(-1, |s| s.login_type())
    }

    pub fn login_status(&self) -> &'static str {
        self.login_status.as_str()
    }

    pub fn epic_account_id(&self) -> &str {
        &self.epic_account_id
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn last_achievement(&self) -> &str {
        &self.last_achievement
    }

    pub fn shared_handles(&self) -> SharedHandles {
        self.extension.shared_handles()
    }

    pub fn release(&mut self) {
        self.extension.release();
        self.is_available = false;
    }
}

fn flag(params: &NamedParams, key: &str) -> bool {
    params
        .get(key)
        .and_then(ParamValue::as_bool)
        .unwrap_or(false)
}

fn text(params: &NamedParams, key: &str) -> String {
    params
        .get(key)
        .and_then(ParamValue::as_str)
        .unwrap_or_default()
        .to_owned()
}
