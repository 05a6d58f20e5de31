// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Registry of in-flight native calls, keyed by correlation token.
//
// A token is minted for every call handed to the SDK and removed the first
// time its completion arrives, so each completion resolves at most one
// waiting caller. If the SDK never calls back the record stays here; that is
// a leak, not a correctness problem.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use eosbridge_core::error::{BridgeError, Result};
use eosbridge_core::types::{AsyncId, CorrelationToken, EpicAccountId, OperationKind};

/// A native call awaiting its completion callback.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOperation {
    pub token: CorrelationToken,
    pub kind: OperationKind,
    /// Caller to answer when the call completes. `AsyncId::NONE` for
    /// internal follow-up calls nobody is waiting on.
    pub reply_to: AsyncId,
    /// Local account the call acts for, when its result only applies to
    /// that account (identity linking).
    pub account: Option<EpicAccountId>,
    pub issued_at: DateTime<Utc>,
}

pub struct Registry {
    next: u64,
    pending: HashMap<CorrelationToken, PendingOperation>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            next: 1,
            pending: HashMap::new(),
        }
    }

    /// Record a new pending operation and return its token.
    pub fn issue(&mut self, kind: OperationKind, reply_to: AsyncId) -> Result<CorrelationToken> {
        self.issue_for(kind, reply_to, None)
    }

    /// Like `issue`, tagging the operation with the account it acts for.
    #[instrument(skip(self))]
    pub fn issue_for(
        &mut self,
        kind: OperationKind,
        reply_to: AsyncId,
        account: Option<EpicAccountId>,
    ) -> Result<CorrelationToken> {
        let token = CorrelationToken(self.next);
        self.next = self
            .next
            .checked_add(1)
            .ok_or(BridgeError::TokenSpaceExhausted)?;

        let op = PendingOperation {
            token,
            kind,
            reply_to,
            account,
            issued_at: Utc::now(),
        };
        let previous = self.pending.insert(token, op);
        debug_assert!(previous.is_none(), "token {token} issued twice");

        debug!(token = %token, kind = %kind, pending = self.pending.len(), "operation issued");
        Ok(token)
    }

    /// Remove and return the operation for `token`.
    pub fn resolve(&mut self, token: CorrelationToken) -> Result<PendingOperation> {
        let op = self
            .pending
            .remove(&token)
            .ok_or(BridgeError::UnknownToken(token))?;
        debug!(token = %token, kind = %op.kind, "operation resolved");
        Ok(op)
    }

    pub fn contains(&self, token: CorrelationToken) -> bool {
        self.pending.contains_key(&token)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The longest-waiting operation, for spotting orphaned calls.
    pub fn oldest(&self) -> Option<&PendingOperation> {
        self.pending.values().min_by_key(|op| (op.issued_at, op.token))
    }

    #[cfg(test)]
    fn starting_at(next: u64) -> Self {
        Self {
            next,
            pending: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_returns_issued_kind_once() {
        let mut registry = Registry::new();
        let token = registry
            .issue(OperationKind::LoginPortal, AsyncId(3.0))
            .expect("issue");

        let op = registry.resolve(token).expect("resolve");
        assert_eq!(op.kind, OperationKind::LoginPortal);
        assert_eq!(op.reply_to, AsyncId(3.0));
        assert_eq!(op.token, token);

        let err = registry.resolve(token).expect_err("second resolve");
        assert!(matches!(err, BridgeError::UnknownToken(t) if t == token));
    }

    #[test]
    fn tokens_are_unique_while_outstanding() {
        let mut registry = Registry::new();
        let a = registry.issue(OperationKind::Logout, AsyncId(1.0)).expect("a");
        let b = registry.issue(OperationKind::Logout, AsyncId(1.0)).expect("b");
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn tokens_are_not_reused_after_resolution() {
        let mut registry = Registry::new();
        let a = registry.issue(OperationKind::UnlockAchievement, AsyncId(1.0)).expect("a");
        registry.resolve(a).expect("resolve");
        let b = registry.issue(OperationKind::UnlockAchievement, AsyncId(2.0)).expect("b");
        assert_ne!(a, b);
        assert!(registry.resolve(a).is_err());
    }

    #[test]
    fn unknown_token_is_an_error_not_a_panic() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.resolve(CorrelationToken(999)),
            Err(BridgeError::UnknownToken(CorrelationToken(999)))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn completions_resolve_out_of_order() {
        let mut registry = Registry::new();
        let first = registry.issue(OperationKind::LoginPortal, AsyncId(1.0)).expect("first");
        let second = registry.issue(OperationKind::UnlockAchievement, AsyncId(2.0)).expect("second");

        assert_eq!(registry.resolve(second).expect("second").kind, OperationKind::UnlockAchievement);
        assert!(registry.contains(first));
        assert_eq!(registry.resolve(first).expect("first").kind, OperationKind::LoginPortal);
    }

    #[test]
    fn oldest_reports_longest_waiting() {
        let mut registry = Registry::new();
        assert!(registry.oldest().is_none());
        let first = registry.issue(OperationKind::ConnectIdentity, AsyncId::NONE).expect("first");
        registry.issue(OperationKind::Logout, AsyncId(5.0)).expect("second");
        assert_eq!(registry.oldest().map(|op| op.token), Some(first));
    }

    #[test]
    fn exhaustion_is_reported() {
        let mut registry = Registry::starting_at(u64::MAX);
        assert!(matches!(
            registry.issue(OperationKind::Logout, AsyncId(1.0)),
            Err(BridgeError::TokenSpaceExhausted)
        ));
        assert!(registry.is_empty());
    }
}
