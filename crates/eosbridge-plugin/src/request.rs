// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inbound messages, decoded from positional tagged parameters.

use eosbridge_core::error::{BridgeError, Result};
use eosbridge_core::params::ParamValue;
use eosbridge_core::scope::ScopeRequest;
use eosbridge_core::types::{Credentials, OperationKind};

/// A decoded message from the scripting side.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Init,
    PlatformTick,
    LogIn {
        credentials: Credentials,
        scopes: ScopeRequest,
    },
    LogOut,
    UnlockAchievement {
        achievement_id: String,
    },
}

impl Request {
    pub fn parse(message_id: &str, params: &[ParamValue]) -> Result<Self> {
        let args = Args { message_id, params };
        let request = match message_id {
            "init" => Self::Init,
            "platform-tick" => Self::PlatformTick,
            "log-in-portal" => Self::LogIn {
                credentials: Credentials::Portal,
                scopes: args.scopes()?,
            },
            "log-in-persistent" => Self::LogIn {
                credentials: Credentials::Persistent,
                scopes: args.scopes()?,
            },
            "log-in-exchange-code" => Self::LogIn {
                credentials: Credentials::ExchangeCode {
                    code: args.string(4)?,
                },
                scopes: args.scopes()?,
            },
            "log-in-devauthtool" => Self::LogIn {
                credentials: Credentials::DevAuthTool {
                    host: args.string(4)?,
                    credential_name: args.string(5)?,
                },
                scopes: args.scopes()?,
            },
            "log-out" => Self::LogOut,
            "unlock-achievement" => Self::UnlockAchievement {
                achievement_id: args.string(0)?,
            },
            other => return Err(BridgeError::UnknownMessage(other.to_owned())),
        };
        Ok(request)
    }

    /// Operation this request would start, for requests that start one.
    pub fn operation_kind(&self) -> Option<OperationKind> {
        match self {
            Self::Init | Self::PlatformTick => None,
            Self::LogIn { credentials, .. } => Some(OperationKind::for_login(credentials.strategy())),
            Self::LogOut => Some(OperationKind::Logout),
            Self::UnlockAchievement { .. } => Some(OperationKind::UnlockAchievement),
        }
    }
}

struct Args<'a> {
    message_id: &'a str,
    params: &'a [ParamValue],
}

impl Args<'_> {
    fn bad(&self, index: usize, expected: &'static str) -> BridgeError {
        BridgeError::BadParameter {
            message: self.message_id.to_owned(),
            index,
            expected,
        }
    }

    fn bool(&self, index: usize) -> Result<bool> {
        self.params
            .get(index)
            .and_then(ParamValue::as_bool)
            .ok_or_else(|| self.bad(index, "bool"))
    }

    fn string(&self, index: usize) -> Result<String> {
        self.params
            .get(index)
            .and_then(ParamValue::as_str)
            .map(str::to_owned)
            .ok_or_else(|| self.bad(index, "string"))
    }

    /// Scope booleans in their fixed leading positions.
    fn scopes(&self) -> Result<ScopeRequest> {
        Ok(ScopeRequest {
            basic_profile: self.bool(0)?,
            friends_list: self.bool(1)?,
            presence: self.bool(2)?,
            country: self.bool(3)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scopes(b: bool, f: bool, p: bool, c: bool) -> Vec<ParamValue> {
        vec![b.into(), f.into(), p.into(), c.into()]
    }

    #[test]
    fn parses_portal_login_scopes() {
        let request = Request::parse("log-in-portal", &scopes(true, false, true, false))
            .expect("parse");
        assert_eq!(
            request,
            Request::LogIn {
                credentials: Credentials::Portal,
                scopes: ScopeRequest {
                    basic_profile: true,
                    friends_list: false,
                    presence: true,
                    country: false,
                },
            }
        );
    }

    #[test]
    fn parses_devauthtool_trailing_strings() {
        let mut params = scopes(true, true, true, true);
        params.push("localhost:6547".into());
        params.push("dev-user".into());
        let request = Request::parse("log-in-devauthtool", &params).expect("parse");
        assert_eq!(
            request.operation_kind(),
            Some(OperationKind::LoginDevTool)
        );
        match request {
            Request::LogIn {
                credentials: Credentials::DevAuthTool { host, credential_name },
                ..
            } => {
                assert_eq!(host, "localhost:6547");
                assert_eq!(credential_name, "dev-user");
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn numeric_bools_are_accepted() {
        let params: Vec<ParamValue> =
            vec![1.0.into(), 0.0.into(), 0.0.into(), 1.0.into(), "code".into()];
        let request = Request::parse("log-in-exchange-code", &params).expect("parse");
        assert!(matches!(
            request,
            Request::LogIn {
                credentials: Credentials::ExchangeCode { .. },
                scopes: ScopeRequest { basic_profile: true, country: true, .. },
            }
        ));
    }

    #[test]
    fn missing_parameter_is_reported_by_index() {
        let err = Request::parse("log-in-exchange-code", &scopes(true, false, false, false))
            .expect_err("missing code");
        assert!(matches!(
            err,
            BridgeError::BadParameter { index: 4, expected: "string", .. }
        ));

        let err = Request::parse("unlock-achievement", &[ParamValue::Bool(true)]).expect_err("wrong type");
        assert!(matches!(err, BridgeError::BadParameter { index: 0, .. }));
    }

    #[test]
    fn unknown_message_is_rejected() {
        assert!(matches!(
            Request::parse("open-overlay", &[]),
            Err(BridgeError::UnknownMessage(id)) if id == "open-overlay"
        ));
    }

    #[test]
    fn parameterless_messages() {
        assert_eq!(Request::parse("init", &[]).expect("init"), Request::Init);
        assert_eq!(Request::parse("platform-tick", &[]).expect("tick"), Request::PlatformTick);
        assert_eq!(Request::parse("log-out", &[]).expect("log-out"), Request::LogOut);
        assert_eq!(Request::LogOut.operation_kind(), Some(OperationKind::Logout));
    }
}
