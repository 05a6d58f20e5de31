// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the eosbridge extension.
//
// Native SDK handles are modelled as opaque string newtypes. The core never
// looks inside them; it only stores, compares and forwards them.

use serde::{Deserialize, Serialize};

/// Identifier minted for every outstanding native call and carried through
/// the SDK callback as its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CorrelationToken(pub u64);

impl std::fmt::Display for CorrelationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "op#{}", self.0)
    }
}

/// Correlation id attached by the host to an inbound message.
///
/// The host uses `-1` to mean "no response expected".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AsyncId(pub f64);

impl AsyncId {
    /// Sentinel for fire-and-forget messages and unsolicited events.
    pub const NONE: AsyncId = AsyncId(-1.0);

    /// Whether the sender is waiting on a reply for this id.
    pub fn expects_reply(&self) -> bool {
        self.0 != Self::NONE.0
    }
}

impl Default for AsyncId {
    fn default() -> Self {
        Self::NONE
    }
}

impl std::fmt::Display for AsyncId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The four ways a local user can authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoginStrategy {
    /// Interactive account portal overlay.
    Portal,
    /// Cached refresh token from a previous portal login.
    Persistent,
    /// One-time exchange code, usually handed over by the launcher.
    ExchangeCode,
    /// Developer authentication tool running on a local host.
    DevAuthTool,
}

impl LoginStrategy {
    /// Numeric login type reported to scripts (portal 0 … dev tool 3).
    pub fn login_type(&self) -> i32 {
        match self {
            Self::Portal => 0,
            Self::Persistent => 1,
            Self::ExchangeCode => 2,
            Self::DevAuthTool => 3,
        }
    }
}

/// Strategy-specific credentials passed to the native login call.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Portal,
    Persistent,
    ExchangeCode { code: String },
    DevAuthTool { host: String, credential_name: String },
}

impl Credentials {
    pub fn strategy(&self) -> LoginStrategy {
        match self {
            Self::Portal => LoginStrategy::Portal,
            Self::Persistent => LoginStrategy::Persistent,
            Self::ExchangeCode { .. } => LoginStrategy::ExchangeCode,
            Self::DevAuthTool { .. } => LoginStrategy::DevAuthTool,
        }
    }
}

// Exchange codes are single-use secrets; keep them out of logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Portal => f.write_str("Portal"),
            Self::Persistent => f.write_str("Persistent"),
            Self::ExchangeCode { .. } => f.write_str("ExchangeCode { code: <redacted> }"),
            Self::DevAuthTool {
                host,
                credential_name,
            } => f
                .debug_struct("DevAuthTool")
                .field("host", host)
                .field("credential_name", credential_name)
                .finish(),
        }
    }
}

/// What an in-flight native call is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    LoginPortal,
    LoginPersistent,
    LoginExchangeCode,
    LoginDevTool,
    Logout,
    UnlockAchievement,
    ConnectIdentity,
    CreateIdentity,
    ForgetCredential,
}

impl OperationKind {
    pub fn for_login(strategy: LoginStrategy) -> Self {
        match strategy {
            LoginStrategy::Portal => Self::LoginPortal,
            LoginStrategy::Persistent => Self::LoginPersistent,
            LoginStrategy::ExchangeCode => Self::LoginExchangeCode,
            LoginStrategy::DevAuthTool => Self::LoginDevTool,
        }
    }

    /// The login strategy this operation was issued for, if it is a login.
    pub fn login_strategy(&self) -> Option<LoginStrategy> {
        match self {
            Self::LoginPortal => Some(LoginStrategy::Portal),
            Self::LoginPersistent => Some(LoginStrategy::Persistent),
            Self::LoginExchangeCode => Some(LoginStrategy::ExchangeCode),
            Self::LoginDevTool => Some(LoginStrategy::DevAuthTool),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginPortal => "login-portal",
            Self::LoginPersistent => "login-persistent",
            Self::LoginExchangeCode => "login-exchange-code",
            Self::LoginDevTool => "login-dev-tool",
            Self::Logout => "logout",
            Self::UnlockAchievement => "unlock-achievement",
            Self::ConnectIdentity => "connect-identity",
            Self::CreateIdentity => "create-identity",
            Self::ForgetCredential => "forget-credential",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle of the locally authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EpicAccountId(pub String);

impl std::fmt::Display for EpicAccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle of the linked product identity, required for achievements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductUserId(pub String);

impl std::fmt::Display for ProductUserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Continuation token handed back by the connect service when no product
/// identity exists yet for the presented credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuanceToken(pub String);

/// Identity token copied from the auth service for a local account.
#[derive(Clone, PartialEq, Eq)]
pub struct IdToken {
    pub account_id: EpicAccountId,
    pub json_web_token: String,
}

impl std::fmt::Debug for IdToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdToken")
            .field("account_id", &self.account_id)
            .field("json_web_token", &"<redacted>")
            .finish()
    }
}

/// Failure codes reported by the native SDK in completion callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultCode {
    /// No product identity exists for these credentials (connect only).
    InvalidUser,
    InvalidAuth,
    NotFound,
    TimedOut,
    NoConnection,
    Canceled,
    AuthExpired,
    Other(i32),
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidUser => f.write_str("invalid user"),
            Self::InvalidAuth => f.write_str("invalid auth"),
            Self::NotFound => f.write_str("not found"),
            Self::TimedOut => f.write_str("timed out"),
            Self::NoConnection => f.write_str("no connection"),
            Self::Canceled => f.write_str("canceled"),
            Self::AuthExpired => f.write_str("auth expired"),
            Self::Other(code) => write!(f, "result code {code}"),
        }
    }
}

/// Login status as reported by the SDK's status-changed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoginStatus {
    NotLoggedIn,
    UsingLocalProfile,
    LoggedIn,
}

impl LoginStatus {
    /// Numeric value sent to scripts in `on-login-status-changed`.
    pub fn as_number(&self) -> f64 {
        match self {
            Self::NotLoggedIn => 0.0,
            Self::UsingLocalProfile => 1.0,
            Self::LoggedIn => 2.0,
        }
    }

    pub fn from_number(value: f64) -> Option<Self> {
        match value as i64 {
            0 => Some(Self::NotLoggedIn),
            1 => Some(Self::UsingLocalProfile),
            2 => Some(Self::LoggedIn),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotLoggedIn => "not-logged-in",
            Self::UsingLocalProfile => "using-local-profile",
            Self::LoggedIn => "logged-in",
        }
    }
}

/// User details as copied from the SDK. Every field may be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub display_name: Option<String>,
    pub display_name_sanitized: Option<String>,
    pub nickname: Option<String>,
    pub preferred_language: Option<String>,
    pub country: Option<String>,
}

/// Profile of the local user with unset fields normalised to "".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub display_name: String,
    pub display_name_sanitized: String,
    pub nickname: String,
    pub preferred_language: String,
    pub country: String,
}

impl From<UserInfo> for Profile {
    fn from(info: UserInfo) -> Self {
        Self {
            display_name: info.display_name.unwrap_or_default(),
            display_name_sanitized: info.display_name_sanitized.unwrap_or_default(),
            nickname: info.nickname.unwrap_or_default(),
            preferred_language: info.preferred_language.unwrap_or_default(),
            country: info.country.unwrap_or_default(),
        }
    }
}

/// Severity levels understood by the host console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsoleLevel {
    Normal,
    Warning,
    Error,
}

/// Verbosity of a log line emitted by the native SDK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SdkLogLevel {
    Fatal,
    Error,
    Warning,
    Info,
    Verbose,
    VeryVerbose,
}

impl SdkLogLevel {
    /// Numeric level as the SDK reports it, used in the log prefix.
    pub fn as_number(&self) -> i32 {
        match self {
            Self::Fatal => 100,
            Self::Error => 200,
            Self::Warning => 300,
            Self::Info => 400,
            Self::Verbose => 500,
            Self::VeryVerbose => 600,
        }
    }
}

/// A log line from the native SDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkLogMessage {
    pub category: String,
    pub level: SdkLogLevel,
    pub message: String,
}

impl SdkLogMessage {
    /// `[EOS][category/level] message`
    pub fn formatted(&self) -> String {
        format!(
            "[EOS][{}/{}] {}",
            self.category,
            self.level.as_number(),
            self.message
        )
    }
}
