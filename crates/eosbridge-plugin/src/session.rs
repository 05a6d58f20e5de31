// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Identity session state machine.
//
//   LoggedOut --login--> Authenticating --ok--> Authenticated --link--> LinkingIdentity --ok--> Ready
//                              |                                              |
//                              +--fail--> LoggedOut                            +--fail--> Authenticated
//
//   Authenticated/LinkingIdentity/Ready --logout--> LoggingOut --ok--> LoggedOut
//                                                             --fail--> (previous)
//
// Identity linking runs alongside the main chain: its results are applied
// whenever they arrive, as long as the local identity is still the one the
// link was started for. This type holds no SDK handles and issues no calls;
// the dispatcher drives it.

use tracing::{debug, info, warn};

use eosbridge_core::error::{BridgeError, Result};
use eosbridge_core::types::{EpicAccountId, LoginStrategy, ProductUserId, Profile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    Authenticating(LoginStrategy),
    /// Local identity known, no linked identity.
    Authenticated,
    LinkingIdentity,
    /// Both identities known; achievements usable.
    Ready,
    LoggingOut,
}

impl SessionState {
    fn is_signed_in(&self) -> bool {
        matches!(self, Self::Authenticated | Self::LinkingIdentity | Self::Ready)
    }
}

/// Handles other extensions may read (companion plugins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedHandles {
    pub local_user: Option<EpicAccountId>,
    pub linked_identity: Option<ProductUserId>,
}

#[derive(Debug)]
pub struct IdentitySession {
    state: SessionState,
    local_user: Option<EpicAccountId>,
    linked_identity: Option<ProductUserId>,
    profile: Profile,
    links_in_flight: u32,
}

impl Default for IdentitySession {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentitySession {
    pub fn new() -> Self {
        Self {
            state: SessionState::LoggedOut,
            local_user: None,
            linked_identity: None,
            profile: Profile::default(),
            links_in_flight: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn local_user(&self) -> Option<&EpicAccountId> {
        self.local_user.as_ref()
    }

    pub fn linked_identity(&self) -> Option<&ProductUserId> {
        self.linked_identity.as_ref()
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn shared_handles(&self) -> SharedHandles {
        SharedHandles {
            local_user: self.local_user.clone(),
            linked_identity: self.linked_identity.clone(),
        }
    }

    // -- Login ---------------------------------------------------------------

    /// Start a login. Rejected while another login or a logout is in flight.
    pub fn begin_login(&mut self, strategy: LoginStrategy) -> Result<()> {
        match self.state {
            SessionState::Authenticating(_) => Err(BridgeError::Busy("login")),
            SessionState::LoggingOut => Err(BridgeError::Busy("logout")),
            _ => {
                self.transition(SessionState::Authenticating(strategy));
                Ok(())
            }
        }
    }

    /// Record the newly authenticated local identity. Any linked identity
    /// belonged to the previous local identity and is dropped.
    pub fn auth_succeeded(&mut self, account: EpicAccountId, profile: Profile) {
        if !matches!(self.state, SessionState::Authenticating(_)) {
            warn!(state = ?self.state, "login completed outside of Authenticating");
        }
        if self.local_user.as_ref() != Some(&account) {
            self.linked_identity = None;
        }
        self.local_user = Some(account);
        self.profile = profile;
        self.transition(SessionState::Authenticated);
        self.settle();
    }

    /// Record a rejected login. Returns true when the cached credential
    /// should be forgotten so the same persistent login is not retried.
    pub fn auth_failed(&mut self, strategy: LoginStrategy) -> bool {
        if self.local_user.is_some() {
            // Re-login while already signed in: keep the existing identity.
            self.transition(SessionState::Authenticated);
            self.settle();
        } else {
            self.transition(SessionState::LoggedOut);
        }
        strategy == LoginStrategy::Persistent
    }

    // -- Identity linking ----------------------------------------------------

    /// A connect call has been issued for the current local identity.
    pub fn link_started(&mut self) {
        self.links_in_flight += 1;
        if self.state.is_signed_in() {
            self.transition(SessionState::LinkingIdentity);
        }
    }

    /// The connect flow started for `account` produced a linked identity.
    /// Returns false if the result was discarded because `account` is no
    /// longer the local user.
    pub fn link_succeeded(&mut self, account: &EpicAccountId, user: ProductUserId) -> bool {
        self.links_in_flight = self.links_in_flight.saturating_sub(1);
        if self.local_user.as_ref() != Some(account) {
            debug!(account = %account, user = %user, "discarding linked identity for stale account");
            self.settle();
            return false;
        }
        if let Some(previous) = self.linked_identity.replace(user) {
            debug!(previous = %previous, "linked identity replaced");
        }
        self.settle();
        true
    }

    /// The connect flow ended without a linked identity.
    pub fn link_failed(&mut self) {
        self.links_in_flight = self.links_in_flight.saturating_sub(1);
        self.settle();
    }

    /// The linked identity required for achievements.
    pub fn require_linked(&self) -> Result<&ProductUserId> {
        self.linked_identity.as_ref().ok_or(BridgeError::NotLinked)
    }

    // -- Logout --------------------------------------------------------------

    /// Start a logout, returning the account to log out.
    pub fn begin_logout(&mut self) -> Result<EpicAccountId> {
        match self.state {
            SessionState::Authenticating(_) => return Err(BridgeError::Busy("login")),
            SessionState::LoggingOut => return Err(BridgeError::Busy("logout")),
            _ => {}
        }
        let account = self.local_user.clone().ok_or(BridgeError::NotLoggedIn)?;
        self.transition(SessionState::LoggingOut);
        Ok(account)
    }

    /// Clear everything learned since login.
    pub fn logout_succeeded(&mut self) {
        self.local_user = None;
        self.linked_identity = None;
        self.profile = Profile::default();
        self.links_in_flight = 0;
        self.transition(SessionState::LoggedOut);
    }

    pub fn logout_failed(&mut self) {
        if self.local_user.is_some() {
            self.transition(self.signed_in_state());
        } else {
            self.transition(SessionState::LoggedOut);
        }
    }

    // -- Internals -----------------------------------------------------------

    fn signed_in_state(&self) -> SessionState {
        if self.linked_identity.is_some() {
            SessionState::Ready
        } else if self.links_in_flight > 0 {
            SessionState::LinkingIdentity
        } else {
            SessionState::Authenticated
        }
    }

    /// Re-derive the signed-in sub-state after a link event. Other states
    /// (a login or logout in flight) are left alone.
    fn settle(&mut self) {
        if self.state.is_signed_in() {
            self.transition(self.signed_in_state());
        }
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            info!(from = ?self.state, to = ?next, "session state changed");
            self.state = next;
        }
    }
}
