// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Request submission and completion dispatch.
//
// Requests mint a token, record who to answer and hand the call to the SDK.
// When the SDK reports a completion the token is resolved, the outcome is fed
// through the session state machine, any follow-up calls (identity linking,
// forgetting a persistent credential) are issued, and at most one reply is
// produced for the caller that started the operation.

use tracing::{debug, error, info, instrument, warn};

use eosbridge_core::config::LauncherInfo;
use eosbridge_core::error::{BridgeError, Result};
use eosbridge_core::params::{NamedParams, ParamValue};
use eosbridge_core::scope::ScopeRequest;
use eosbridge_core::types::{
    AsyncId, ContinuanceToken, CorrelationToken, Credentials, EpicAccountId, LoginStrategy,
    OperationKind, ProductUserId, Profile, ResultCode,
};
use eosbridge_sdk::{ConnectOutcome, LoginRequest, OnlineServices, Outcome};

use crate::registry::{PendingOperation, Registry};
use crate::request::Request;
use crate::session::IdentitySession;

/// Structured result delivered to a caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Init {
        is_available: bool,
        /// Only reported when the extension is available.
        launcher: Option<LauncherInfo>,
    },
    LoginSucceeded {
        account_id: EpicAccountId,
        profile: Profile,
    },
    LoginFailed,
    /// Logout and achievement unlock report a bare status.
    Done {
        is_ok: bool,
    },
}

impl Response {
    /// The failure reply for a caller-visible operation. Internal follow-up
    /// operations have no caller and yield `None`.
    pub fn failure(kind: OperationKind) -> Option<Self> {
        match kind {
            OperationKind::LoginPortal
            | OperationKind::LoginPersistent
            | OperationKind::LoginExchangeCode
            | OperationKind::LoginDevTool => Some(Self::LoginFailed),
            OperationKind::Logout | OperationKind::UnlockAchievement => {
                Some(Self::Done { is_ok: false })
            }
            OperationKind::ConnectIdentity
            | OperationKind::CreateIdentity
            | OperationKind::ForgetCredential => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        match self {
            Self::Init { is_available, .. } => *is_available,
            Self::LoginSucceeded { .. } => true,
            Self::LoginFailed => false,
            Self::Done { is_ok } => *is_ok,
        }
    }

    /// Named parameters as the scripting side reads them.
    pub fn to_params(&self) -> NamedParams {
        let mut params = NamedParams::new();
        match self {
            Self::Init {
                is_available,
                launcher,
            } => {
                params.insert("isAvailable".into(), (*is_available).into());
                if let Some(launcher) = launcher {
                    params.insert("isEpicLauncher".into(), launcher.is_epic_launcher.into());
                    params.insert(
                        "launcherExchangeCode".into(),
                        launcher.exchange_code.as_str().into(),
                    );
                }
            }
            Self::LoginSucceeded {
                account_id,
                profile,
            } => {
                params.insert("isOk".into(), true.into());
                params.insert("epicAccountIdStr".into(), account_id.0.as_str().into());
                params.insert("displayName".into(), profile.display_name.as_str().into());
                params.insert(
                    "displayNameSanitized".into(),
                    profile.display_name_sanitized.as_str().into(),
                );
                params.insert("nickname".into(), profile.nickname.as_str().into());
                params.insert(
                    "preferredLanguage".into(),
                    profile.preferred_language.as_str().into(),
                );
                params.insert("country".into(), profile.country.as_str().into());
            }
            Self::LoginFailed => {
                params.insert("isOk".into(), false.into());
            }
            Self::Done { is_ok } => {
                params.insert("isOk".into(), ParamValue::Bool(*is_ok));
            }
        }
        params
    }
}

/// A response addressed to the caller that asked for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub async_id: AsyncId,
    pub response: Response,
}

impl Reply {
    pub fn new(async_id: AsyncId, response: Response) -> Self {
        Self { async_id, response }
    }
}

/// Owns the registry, the session and the SDK services, and keeps the three
/// consistent.
pub struct Dispatcher<S: OnlineServices> {
    registry: Registry,
    session: IdentitySession,
    sdk: S,
}

impl<S: OnlineServices> Dispatcher<S> {
    pub fn new(sdk: S) -> Self {
        Self {
            registry: Registry::new(),
            session: IdentitySession::new(),
            sdk,
        }
    }

    pub fn session(&self) -> &IdentitySession {
        &self.session
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    pub fn sdk_mut(&mut self) -> &mut S {
        &mut self.sdk
    }

    /// Start the operation for `request`. Returns a reply only when the
    /// request is rejected before reaching the SDK; otherwise the reply comes
    /// from `complete`.
    pub fn submit(&mut self, request: Request, reply_to: AsyncId) -> Option<Reply> {
        match request {
            Request::LogIn {
                credentials,
                scopes,
            } => self.log_in(credentials, scopes, reply_to),
            Request::LogOut => self.log_out(reply_to),
            Request::UnlockAchievement { achievement_id } => {
                self.unlock_achievement(achievement_id, reply_to)
            }
            other @ (Request::Init | Request::PlatformTick) => {
                debug!(request = ?other, "not an SDK operation");
                None
            }
        }
    }

    #[instrument(skip(self, credentials), fields(strategy = ?credentials.strategy()))]
    pub fn log_in(
        &mut self,
        credentials: Credentials,
        scopes: ScopeRequest,
        reply_to: AsyncId,
    ) -> Option<Reply> {
        let strategy = credentials.strategy();
        let kind = OperationKind::for_login(strategy);

        if let Err(e) = self.session.begin_login(strategy) {
            warn!(error = %e, "login rejected");
            return Some(Reply::new(reply_to, Response::LoginFailed));
        }
        let token = match self.registry.issue(kind, reply_to) {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "cannot issue login");
                self.session.auth_failed(strategy);
                return Some(Reply::new(reply_to, Response::LoginFailed));
            }
        };

        let flags = scopes.flags();
        info!(token = %token, scopes = flags.bits(), "logging in");
        self.sdk.login(
            LoginRequest {
                credentials,
                scopes: flags,
            },
            token,
        );
        None
    }

    #[instrument(skip(self))]
    pub fn log_out(&mut self, reply_to: AsyncId) -> Option<Reply> {
        let failed = Some(Reply::new(reply_to, Response::Done { is_ok: false }));

        let account = match self.session.begin_logout() {
            Ok(account) => account,
            Err(e) => {
                warn!(error = %e, "logout rejected");
                return failed;
            }
        };
        let token = match self.registry.issue(OperationKind::Logout, reply_to) {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "cannot issue logout");
                self.session.logout_failed();
                return failed;
            }
        };

        info!(token = %token, account = %account, "logging out");
        self.sdk.logout(&account, token);
        None
    }

    #[instrument(skip(self))]
    pub fn unlock_achievement(&mut self, achievement_id: String, reply_to: AsyncId) -> Option<Reply> {
        let failed = Some(Reply::new(reply_to, Response::Done { is_ok: false }));

        let user = match self.session.require_linked() {
            Ok(user) => user.clone(),
            Err(e) => {
                warn!(error = %e, "cannot unlock achievement");
                return failed;
            }
        };
        let token = match self.registry.issue(OperationKind::UnlockAchievement, reply_to) {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "cannot issue achievement unlock");
                return failed;
            }
        };

        debug!(token = %token, user = %user, "unlocking achievement");
        self.sdk
            .unlock_achievements(&user, std::slice::from_ref(&achievement_id), token);
        None
    }

    /// Start identity linking for the current local user. Failures leave the
    /// session unchanged and are only logged.
    pub fn connect_identity(&mut self) {
        if let Err(e) = self.try_connect_identity() {
            warn!(error = %e, "identity linking not started");
        }
    }

    fn try_connect_identity(&mut self) -> Result<()> {
        let account = self
            .session
            .local_user()
            .cloned()
            .ok_or(BridgeError::NotLoggedIn)?;
        let id_token = self
            .sdk
            .copy_id_token(&account)
            .map_err(|e| BridgeError::TransientLinkFailure(format!("copy id token: {e}")))?;
        let token = self.registry.issue_for(
            OperationKind::ConnectIdentity,
            AsyncId::NONE,
            Some(account.clone()),
        )?;

        debug!(token = %token, account = %account, "connecting identity");
        self.sdk.connect_login(id_token, token);
        self.session.link_started();
        Ok(())
    }

    /// The connect session expired: refresh the linked identity if anyone is
    /// still logged in.
    pub fn auth_expired(&mut self) {
        if self.session.local_user().is_some() {
            info!("connect auth expired; relinking identity");
            self.connect_identity();
        } else {
            debug!("connect auth expired with nobody logged in");
        }
    }

    /// Route a completion to its pending operation.
    #[instrument(skip(self, outcome))]
    pub fn complete(&mut self, token: CorrelationToken, outcome: Outcome) -> Option<Reply> {
        let op = match self.registry.resolve(token) {
            Ok(op) => op,
            Err(e) => {
                warn!(error = %e, "dropping completion");
                return None;
            }
        };

        match (op.kind, outcome) {
            (kind, Outcome::Login(result)) => match kind.login_strategy() {
                Some(strategy) => Some(self.login_completed(&op, strategy, result)),
                None => self.mismatched(&op),
            },
            (OperationKind::Logout, Outcome::Logout(result)) => {
                Some(self.logout_completed(&op, result))
            }
            (OperationKind::UnlockAchievement, Outcome::UnlockAchievements(result)) => {
                match result {
                    Ok(()) => info!("achievement unlocked"),
                    Err(code) => warn!(error = %BridgeError::Native(code), "achievement unlock failed"),
                }
                Some(Reply::new(
                    op.reply_to,
                    Response::Done {
                        is_ok: result.is_ok(),
                    },
                ))
            }
            (OperationKind::ConnectIdentity, Outcome::ConnectLogin(outcome)) => {
                match op.account.clone() {
                    Some(account) => {
                        self.connect_completed(account, outcome);
                        None
                    }
                    None => self.mismatched(&op),
                }
            }
            (OperationKind::CreateIdentity, Outcome::CreateUser(result)) => {
                match op.account.clone() {
                    Some(account) => {
                        self.create_identity_completed(account, result);
                        None
                    }
                    None => self.mismatched(&op),
                }
            }
            (OperationKind::ForgetCredential, Outcome::DeletePersistentAuth(result)) => {
                match result {
                    Ok(()) => debug!("persistent credential forgotten"),
                    Err(code) => warn!(error = %BridgeError::Native(code), "failed to forget persistent credential"),
                }
                None
            }
            _ => self.mismatched(&op),
        }
    }

    fn mismatched(&mut self, op: &PendingOperation) -> Option<Reply> {
        let err = BridgeError::MismatchedCompletion {
            token: op.token,
            kind: op.kind,
        };
        error!(error = %err, "completion does not fit its operation");
        match op.kind {
            OperationKind::ConnectIdentity | OperationKind::CreateIdentity => {
                self.session.link_failed();
            }
            OperationKind::Logout => self.session.logout_failed(),
            kind => {
                if let Some(strategy) = kind.login_strategy() {
                    self.session.auth_failed(strategy);
                }
            }
        }
        Response::failure(op.kind).map(|response| Reply::new(op.reply_to, response))
    }

    fn login_completed(
        &mut self,
        op: &PendingOperation,
        strategy: LoginStrategy,
        result: std::result::Result<EpicAccountId, ResultCode>,
    ) -> Reply {
        match result {
            Ok(account) => {
                let profile = match self.sdk.copy_user_info(&account) {
                    Ok(info) => Profile::from(info),
                    Err(e) => {
                        warn!(error = %e, account = %account, "user info unavailable");
                        Profile::default()
                    }
                };
                info!(account = %account, strategy = ?strategy, "login succeeded");
                self.session.auth_succeeded(account.clone(), profile.clone());
                self.connect_identity();
                Reply::new(
                    op.reply_to,
                    Response::LoginSucceeded {
                        account_id: account,
                        profile,
                    },
                )
            }
            Err(code) => {
                warn!(error = %BridgeError::AuthFailure(code), strategy = ?strategy, "login failed");
                if self.session.auth_failed(strategy) {
                    self.forget_credential();
                }
                Reply::new(op.reply_to, Response::LoginFailed)
            }
        }
    }

    fn logout_completed(
        &mut self,
        op: &PendingOperation,
        result: std::result::Result<(), ResultCode>,
    ) -> Reply {
        match result {
            Ok(()) => {
                info!("logged out");
                self.session.logout_succeeded();
                self.forget_credential();
                Reply::new(op.reply_to, Response::Done { is_ok: true })
            }
            Err(code) => {
                warn!(error = %BridgeError::Native(code), "logout failed");
                self.session.logout_failed();
                Reply::new(op.reply_to, Response::Done { is_ok: false })
            }
        }
    }

    fn connect_completed(&mut self, account: EpicAccountId, outcome: ConnectOutcome) {
        match outcome {
            ConnectOutcome::Linked(user) => self.link_established(&account, user),
            ConnectOutcome::NeedsCreate(continuance) => self.create_identity(account, continuance),
            ConnectOutcome::Failed(code) => {
                warn!(error = %BridgeError::Native(code), "identity linking failed");
                self.session.link_failed();
            }
        }
    }

    /// No product identity exists yet for this account: always create one.
    fn create_identity(&mut self, account: EpicAccountId, continuance: ContinuanceToken) {
        if self.session.local_user() != Some(&account) {
            debug!(account = %account, "skipping identity creation: account no longer logged in");
            self.session.link_failed();
            return;
        }
        match self
            .registry
            .issue_for(OperationKind::CreateIdentity, AsyncId::NONE, Some(account))
        {
            Ok(token) => {
                info!(token = %token, "creating product identity");
                self.sdk.connect_create_user(continuance, token);
            }
            Err(e) => {
                error!(error = %e, "cannot issue identity creation");
                self.session.link_failed();
            }
        }
    }

    fn create_identity_completed(
        &mut self,
        account: EpicAccountId,
        result: std::result::Result<ProductUserId, ResultCode>,
    ) {
        match result {
            Ok(user) => self.link_established(&account, user),
            Err(code) => {
                warn!(error = %BridgeError::Native(code), "identity creation failed");
                self.session.link_failed();
            }
        }
    }

    fn link_established(&mut self, account: &EpicAccountId, user: ProductUserId) {
        let shown = user.to_string();
        if self.session.link_succeeded(account, user) {
            info!(account = %account, user = %shown, "identity linked");
        }
    }

    /// Best-effort removal of the cached refresh token.
    fn forget_credential(&mut self) {
        match self
            .registry
            .issue(OperationKind::ForgetCredential, AsyncId::NONE)
        {
            Ok(token) => self.sdk.delete_persistent_auth(token),
            Err(e) => warn!(error = %e, "cannot forget persistent credential"),
        }
    }
}
