// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The extension as loaded by the host.
//
// Lifecycle: `new` -> `init` (reads config, creates the SDK platform) ->
// messages and ticks -> `release`. If startup fails the extension stays
// loaded but unavailable: `init` reports `isAvailable: false` and every other
// request is answered with `isOk: false`.

use tracing::{debug, error, info, instrument, trace, warn};

use eosbridge_core::config::{LauncherInfo, PlatformOptions, PluginConfig};
use eosbridge_core::error::{BridgeError, Result};
use eosbridge_core::params::{NamedParams, ParamValue};
use eosbridge_core::types::{AsyncId, SdkLogLevel, SdkLogMessage};
use eosbridge_sdk::{EventReceiver, OnlineServices, Platform, SdkEvent, event_channel};

use crate::console::SDK_TARGET;
use crate::dispatcher::{Dispatcher, Reply, Response};
use crate::host::{Host, LOGIN_STATUS_CHANGED, OutboundMessage};
use crate::request::Request;
use crate::session::{IdentitySession, SharedHandles};

struct Live<S: OnlineServices> {
    dispatcher: Dispatcher<S>,
    events: EventReceiver,
    launcher: LauncherInfo,
}

enum Lifecycle<S: OnlineServices> {
    Loaded,
    Available(Live<S>),
    Unavailable,
    Released,
}

pub struct Extension<H: Host, P: Platform> {
    host: H,
    platform: P,
    lifecycle: Lifecycle<P::Services>,
}

impl<H: Host, P: Platform> Extension<H, P> {
    pub fn new(host: H, platform: P) -> Self {
        info!("loaded extension");
        Self {
            host,
            platform,
            lifecycle: Lifecycle::Loaded,
        }
    }

    /// Read configuration and start the SDK. On failure the extension is
    /// left unavailable and the error returned.
    #[instrument(skip(self))]
    pub fn init(&mut self) -> Result<()> {
        match self.start() {
            Ok(live) => {
                info!(
                    is_epic_launcher = live.launcher.is_epic_launcher,
                    "online services available"
                );
                self.lifecycle = Lifecycle::Available(live);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, severity = ?e.classify(), "online services unavailable");
                self.lifecycle = Lifecycle::Unavailable;
                Err(e)
            }
        }
    }

    fn start(&mut self) -> Result<Live<P::Services>> {
        let content = self
            .host
            .package_json()
            .map_err(|e| BridgeError::Configuration(format!("reading package.json: {e}")))?;
        let config = PluginConfig::from_package_json(&content)?;
        let options = PlatformOptions::new(config, &self.host.app_data_folder());
        let launcher = LauncherInfo::from_args(self.host.command_line());

        let (tx, events) = event_channel();
        let services = self.platform.create(&options, tx)?;
        Ok(Live {
            dispatcher: Dispatcher::new(services),
            events,
            launcher,
        })
    }

    pub fn is_available(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Available(_))
    }

    /// Handle a message from the scripting side.
    #[instrument(skip(self, params), fields(params = params.len()))]
    pub fn on_message(&mut self, message_id: &str, params: &[ParamValue], async_id: AsyncId) {
        let request = match Request::parse(message_id, params) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "rejecting message");
                deliver(&mut self.host, Reply::new(async_id, Response::Done { is_ok: false }));
                return;
            }
        };

        match request {
            Request::Init => {
                if matches!(self.lifecycle, Lifecycle::Loaded) {
                    if let Err(e) = self.init() {
                        debug!(error = %e, "reporting unavailable");
                    }
                }
                let response = self.init_response();
                deliver(&mut self.host, Reply::new(async_id, response));
            }
            Request::PlatformTick => self.tick(),
            request => {
                let reply = match &mut self.lifecycle {
                    Lifecycle::Available(live) => live.dispatcher.submit(request, async_id),
                    _ => {
                        debug!(request = ?request, "extension unavailable");
                        request
                            .operation_kind()
                            .and_then(Response::failure)
                            .map(|response| Reply::new(async_id, response))
                    }
                };
                if let Some(reply) = reply {
                    deliver(&mut self.host, reply);
                }
            }
        }
    }

    fn init_response(&self) -> Response {
        match &self.lifecycle {
            Lifecycle::Available(live) => Response::Init {
                is_available: true,
                launcher: Some(live.launcher.clone()),
            },
            _ => Response::Init {
                is_available: false,
                launcher: None,
            },
        }
    }

    /// Let the SDK run and dispatch everything it reported.
    pub fn tick(&mut self) {
        let Lifecycle::Available(live) = &mut self.lifecycle else {
            return;
        };

        live.dispatcher.sdk_mut().tick();
        while let Ok(event) = live.events.try_recv() {
            match event {
                SdkEvent::Completed { token, outcome } => {
                    if let Some(reply) = live.dispatcher.complete(token, outcome) {
                        deliver(&mut self.host, reply);
                    }
                }
                SdkEvent::LoginStatusChanged { previous, current } => {
                    info!(from = previous.as_str(), to = current.as_str(), "login status changed");
                    let mut params = NamedParams::new();
                    params.insert("loginStatus".into(), current.as_number().into());
                    self.host
                        .send_message(OutboundMessage::event(LOGIN_STATUS_CHANGED, params));
                }
                SdkEvent::AuthExpiration => live.dispatcher.auth_expired(),
                SdkEvent::Log(message) => forward_sdk_log(&message),
            }
        }
    }

    /// Shut the SDK down. Further requests are answered as unavailable.
    #[instrument(skip(self))]
    pub fn release(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Released) {
            Lifecycle::Available(mut live) => {
                let registry = live.dispatcher.registry();
                if let Some(oldest) = registry.oldest() {
                    warn!(
                        pending = registry.len(),
                        oldest_token = %oldest.token,
                        oldest_kind = %oldest.kind,
                        waiting_since = %oldest.issued_at,
                        "releasing with operations in flight"
                    );
                }
                match live.dispatcher.sdk_mut().shutdown() {
                    Ok(()) => info!("SDK shut down"),
                    Err(e) => warn!(error = %e, "SDK shutdown failed"),
                }
            }
            Lifecycle::Released => debug!("already released"),
            Lifecycle::Loaded | Lifecycle::Unavailable => debug!("nothing to release"),
        }
    }

    /// Local and linked identity handles, for companion extensions.
    pub fn shared_handles(&self) -> SharedHandles {
        self.session()
            .map(IdentitySession::shared_handles)
            .unwrap_or_default()
    }

    pub fn session(&self) -> Option<&IdentitySession> {
        match &self.lifecycle {
            Lifecycle::Available(live) => Some(live.dispatcher.session()),
            _ => None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

fn deliver<H: Host>(host: &mut H, reply: Reply) {
    if reply.async_id.expects_reply() {
        host.send_message(OutboundMessage::reply(
            reply.response.to_params(),
            reply.async_id,
        ));
    } else {
        trace!(response = ?reply.response, "no reply expected");
    }
}

fn forward_sdk_log(message: &SdkLogMessage) {
    let line = message.formatted();
    match message.level {
        SdkLogLevel::Fatal | SdkLogLevel::Error => error!(target: SDK_TARGET, "{line}"),
        SdkLogLevel::Warning => warn!(target: SDK_TARGET, "{line}"),
        SdkLogLevel::Info => info!(target: SDK_TARGET, "{line}"),
        SdkLogLevel::Verbose => debug!(target: SDK_TARGET, "{line}"),
        SdkLogLevel::VeryVerbose => trace!(target: SDK_TARGET, "{line}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eosbridge_core::types::{ConsoleLevel, LoginStatus, ProductUserId, ResultCode};
    use eosbridge_sdk::{SdkCall, SimulatedHandle, SimulatedPlatform};

    use crate::session::SessionState;
    use crate::testing::{RecordingHost, capture_console};

    type TestExtension = Extension<RecordingHost, SimulatedPlatform>;

    fn started() -> (TestExtension, SimulatedHandle) {
        let platform = SimulatedPlatform::new();
        let handle = platform.handle();
        let mut ext = Extension::new(RecordingHost::new(), platform);
        ext.on_message("init", &[], AsyncId(0.0));
        assert_eq!(
            ext.host().reply_for(AsyncId(0.0)).map(|m| m.params["isAvailable"].clone()),
            Some(ParamValue::Bool(true))
        );
        ext.host_mut().take_sent();
        (ext, handle)
    }

    fn scopes() -> Vec<ParamValue> {
        vec![true.into(), false.into(), false.into(), false.into()]
    }

    fn logged_in() -> (TestExtension, SimulatedHandle) {
        let (mut ext, handle) = started();
        ext.on_message("log-in-portal", &scopes(), AsyncId(1.0));
        ext.tick();
        ext.tick();
        assert_eq!(ext.session().map(IdentitySession::state), Some(SessionState::Ready));
        ext.host_mut().take_sent();
        handle.clear_calls();
        (ext, handle)
    }

    #[test]
    fn init_reports_launcher_details() {
        let mut host = RecordingHost::new();
        host.args = vec![
            "game.exe".into(),
            "-EpicPortal".into(),
            "-AUTH_PASSWORD=launch-code".into(),
        ];
        let mut ext = Extension::new(host, SimulatedPlatform::new());
        ext.init().expect("init");
        ext.on_message("init", &[], AsyncId(3.0));

        let reply = ext.host().reply_for(AsyncId(3.0)).expect("reply");
        assert_eq!(reply.params["isAvailable"], ParamValue::Bool(true));
        assert_eq!(reply.params["isEpicLauncher"], ParamValue::Bool(true));
        assert_eq!(reply.params["launcherExchangeCode"], ParamValue::from("launch-code"));
    }

    #[test]
    fn bad_config_makes_extension_unavailable() {
        let mut ext = Extension::new(RecordingHost::without_package_json(), SimulatedPlatform::new());
        assert!(matches!(ext.init(), Err(BridgeError::Configuration(_))));
        assert!(!ext.is_available());

        ext.on_message("init", &[], AsyncId(1.0));
        let reply = ext.host().reply_for(AsyncId(1.0)).expect("reply");
        assert_eq!(reply.params.len(), 1);
        assert_eq!(reply.params["isAvailable"], ParamValue::Bool(false));

        ext.on_message("log-in-portal", &scopes(), AsyncId(2.0));
        ext.on_message("unlock-achievement", &[ParamValue::from("a")], AsyncId(3.0));
        assert_eq!(ext.host().is_ok(AsyncId(2.0)), Some(false));
        assert_eq!(ext.host().is_ok(AsyncId(3.0)), Some(false));
    }

    #[test]
    fn sdk_init_failure_makes_extension_unavailable() {
        let mut ext = Extension::new(RecordingHost::new(), SimulatedPlatform::failing("no sdk"));
        assert!(matches!(ext.init(), Err(BridgeError::SdkInit(_))));
        ext.on_message("log-out", &[], AsyncId(1.0));
        assert_eq!(ext.host().is_ok(AsyncId(1.0)), Some(false));
    }

    #[test]
    fn login_reply_arrives_on_tick_with_status_event() {
        let (mut ext, _handle) = started();
        ext.on_message("log-in-portal", &scopes(), AsyncId(5.0));
        assert!(ext.host().sent.is_empty());

        ext.tick();
        let sent = ext.host_mut().take_sent();
        // The simulated platform logs on creation; the status change and the
        // login reply follow.
        let status = sent
            .iter()
            .find(|m| m.message_id == LOGIN_STATUS_CHANGED)
            .expect("status event");
        assert_eq!(
            status.params["loginStatus"],
            ParamValue::Number(LoginStatus::LoggedIn.as_number())
        );
        assert_eq!(status.async_id, AsyncId::NONE);

        let reply = sent.iter().find(|m| m.is_reply()).expect("reply");
        assert_eq!(reply.async_id, AsyncId(5.0));
        assert_eq!(reply.params["isOk"], ParamValue::Bool(true));
        assert_eq!(reply.params["epicAccountIdStr"], ParamValue::from("sim-account-1"));
    }

    #[test]
    fn fire_and_forget_gets_no_reply() {
        let (mut ext, handle) = started();
        ext.on_message("unlock-achievement", &[ParamValue::from("a")], AsyncId::NONE);
        ext.on_message("log-out", &[], AsyncId::NONE);
        ext.tick();
        assert!(ext.host().sent.is_empty());
        assert!(handle.async_calls().is_empty());
    }

    #[test]
    fn achievement_unlock_round_trip() {
        let (mut ext, handle) = logged_in();
        ext.on_message("unlock-achievement", &[ParamValue::from("first-win")], AsyncId(8.0));
        assert!(matches!(
            handle.calls().as_slice(),
            [SdkCall::UnlockAchievements { user, .. }] if user == &ProductUserId("sim-product-user".into())
        ));
        ext.tick();
        assert_eq!(ext.host().is_ok(AsyncId(8.0)), Some(true));
    }

    #[test]
    fn shared_handles_follow_the_session() {
        let (mut ext, _handle) = logged_in();
        let handles = ext.shared_handles();
        assert_eq!(handles.local_user.map(|a| a.0), Some("sim-account-1".to_owned()));
        assert_eq!(
            handles.linked_identity,
            Some(ProductUserId("sim-product-user".into()))
        );

        ext.on_message("log-out", &[], AsyncId(9.0));
        ext.tick();
        assert_eq!(ext.host().is_ok(AsyncId(9.0)), Some(true));
        assert_eq!(ext.shared_handles(), SharedHandles::default());
    }

    #[test]
    fn auth_expiration_event_relinks() {
        let (mut ext, handle) = logged_in();
        handle.push_event(SdkEvent::AuthExpiration);
        ext.tick();
        assert!(handle
            .calls()
            .iter()
            .any(|c| matches!(c, SdkCall::ConnectLogin { .. })));
        assert!(ext.host().sent.is_empty());
    }

    #[test]
    fn unknown_message_is_answered_not_fatal() {
        let (mut ext, _handle) = started();
        ext.on_message("open-overlay", &[], AsyncId(4.0));
        assert_eq!(ext.host().is_ok(AsyncId(4.0)), Some(false));
        assert!(ext.is_available());
    }

    #[test]
    fn release_reports_oldest_orphaned_operation() {
        let (mut ext, _handle) = started();
        ext.on_message("log-in-portal", &scopes(), AsyncId(1.0));
        ext.on_message("log-out", &[], AsyncId(2.0));

        let lines = capture_console(|| ext.release());
        let orphaned = lines
            .iter()
            .find(|(_, line)| line.contains("releasing with operations in flight"))
            .expect("orphan warning");
        assert_eq!(orphaned.0, ConsoleLevel::Warning);
        assert!(orphaned.1.contains("pending=1"), "{}", orphaned.1);
        assert!(orphaned.1.contains("oldest_token=op#1"), "{}", orphaned.1);
        assert!(orphaned.1.contains("oldest_kind=login-portal"), "{}", orphaned.1);
        assert!(orphaned.1.contains("waiting_since="), "{}", orphaned.1);
    }

    #[test]
    fn release_shuts_sdk_down_once() {
        let (mut ext, handle) = started();
        handle.set_shutdown_result(Err(ResultCode::Other(3)));
        ext.release();
        ext.release();
        let shutdowns = handle
            .calls()
            .into_iter()
            .filter(|c| *c == SdkCall::Shutdown)
            .count();
        assert_eq!(shutdowns, 1);
        assert!(!ext.is_available());

        ext.on_message("log-out", &[], AsyncId(2.0));
        assert_eq!(ext.host().is_ok(AsyncId(2.0)), Some(false));
    }
}
