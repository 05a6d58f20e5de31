// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Auth scope flags requested at login.

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Native auth scope bit set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AuthScopeFlags(pub u32);

impl AuthScopeFlags {
    pub const NO_FLAGS: Self = Self(0);
    pub const BASIC_PROFILE: Self = Self(0x1);
    pub const FRIENDS_LIST: Self = Self(0x2);
    pub const PRESENCE: Self = Self(0x4);
    pub const COUNTRY: Self = Self(0x20);

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for AuthScopeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AuthScopeFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Permissions a caller asks for when logging in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRequest {
    pub basic_profile: bool,
    pub friends_list: bool,
    pub presence: bool,
    pub country: bool,
}

impl Default for ScopeRequest {
    /// Basic profile only.
    fn default() -> Self {
        Self {
            basic_profile: true,
            friends_list: false,
            presence: false,
            country: false,
        }
    }
}

impl ScopeRequest {
    /// Union of the flags whose booleans are set.
    pub fn flags(&self) -> AuthScopeFlags {
        [
            (self.basic_profile, AuthScopeFlags::BASIC_PROFILE),
            (self.friends_list, AuthScopeFlags::FRIENDS_LIST),
            (self.presence, AuthScopeFlags::PRESENCE),
            (self.country, AuthScopeFlags::COUNTRY),
        ]
        .into_iter()
        .filter(|(wanted, _)| *wanted)
        .fold(AuthScopeFlags::NO_FLAGS, |acc, (_, flag)| acc | flag)
    }
}
