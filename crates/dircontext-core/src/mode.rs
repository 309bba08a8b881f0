// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Timing modes for key lookups.
//!
//! A mode decides whether invoking a context with a key loads the module
//! right away or hands back a deferred computation:
//!
//! | Mode         | Behaviour  |
//! |--------------|------------|
//! | `sync`       | immediate  |
//! | `eager`      | immediate  |
//! | `lazy`       | deferred   |
//! | `lazy-once`  | deferred   |
//! | `async-weak` | deferred   |
//!
//! The three deferred names are synonyms here. Bundlers give them distinct
//! sharing and caching semantics; this crate does not.

use crate::error::{ContextError, Result};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Mode names that produce deferred loads.
pub const DEFERRED_MODES: &[&str] = &["lazy", "lazy-once", "async-weak"];

/// Timing mode selected when a context is made
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TimingMode {
    /// Load immediately
    Eager,
    /// Defer the load until forced
    Lazy,
    /// Defer the load until forced
    LazyOnce,
    /// Load immediately
    #[default]
    Sync,
    /// Defer the load until forced
    AsyncWeak,
    /// Any other name; behaves as immediate
    Unrecognized(String),
}

impl TimingMode {
    /// Mode name as written by callers
    pub fn name(&self) -> &str {
        match self {
            TimingMode::Eager => "eager",
            TimingMode::Lazy => "lazy",
            TimingMode::LazyOnce => "lazy-once",
            TimingMode::Sync => "sync",
            TimingMode::AsyncWeak => "async-weak",
            TimingMode::Unrecognized(name) => name,
        }
    }

    /// Whether lookups return a deferred computation
    pub fn is_deferred(&self) -> bool {
        DEFERRED_MODES.contains(&self.name())
    }

    /// Whether the name is outside the known set
    pub fn is_recognized(&self) -> bool {
        !matches!(self, TimingMode::Unrecognized(_))
    }
}

impl FromStr for TimingMode {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "eager" => TimingMode::Eager,
            "lazy" => TimingMode::Lazy,
            "lazy-once" => TimingMode::LazyOnce,
            "sync" => TimingMode::Sync,
            "async-weak" => TimingMode::AsyncWeak,
            other => TimingMode::Unrecognized(other.to_string()),
        })
    }
}

impl From<&str> for TimingMode {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(mode) => mode,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for TimingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How unrecognized mode names are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModePolicy {
    /// Fall back to immediate loading
    #[default]
    Lenient,
    /// Reject with [`ContextError::UnknownMode`]
    Strict,
}

impl ModePolicy {
    /// Check a mode against this policy
    pub fn check(self, mode: &TimingMode) -> Result<()> {
        if mode.is_recognized() {
            return Ok(());
        }

        match self {
            ModePolicy::Lenient => {
                tracing::warn!("unrecognized timing mode '{}', loading immediately", mode);
                Ok(())
            }
            ModePolicy::Strict => Err(ContextError::UnknownMode(mode.to_string())),
        }
    }
}
