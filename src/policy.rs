//! Freeze policy configuration.
//!
//! The freeze policy decides how far a freshly produced record is locked
//! against direct writes:
//!
//! - **NONE**: nothing is locked; immutability relies on using `set`.
//! - **SHALLOW**: the top-level record is locked, nested records are not.
//! - **DEEP**: the record and everything reachable from it is locked.
//!
//! The library default is `NONE`. A process-wide default can be chosen once
//! at startup with [`FreezePolicy::set_global`]; factories configured with an
//! explicit policy ignore it.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How deeply produced records are locked against direct writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FreezePolicy {
    /// No enforcement (default).
    #[default]
    None,
    /// Lock the top-level record only.
    Shallow,
    /// Lock the record and every reachable nested record.
    Deep,
}

static GLOBAL_POLICY: AtomicU8 = AtomicU8::new(FreezePolicy::None as u8);

impl FreezePolicy {
    /// Reads the process-wide default policy.
    ///
    /// Read live on every call; records built earlier keep whatever state
    /// they were locked into.
    #[must_use]
    pub fn global() -> Self {
        Self::from_u8(GLOBAL_POLICY.load(Ordering::Acquire))
    }

    /// Replaces the process-wide default policy.
    ///
    /// Meant for the composition root, before records are built.
    pub fn set_global(policy: Self) {
        GLOBAL_POLICY.store(policy as u8, Ordering::Release);
        tracing::debug!(policy = %policy, "global freeze policy changed");
    }

    /// Canonical upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Shallow => "SHALLOW",
            Self::Deep => "DEEP",
        }
    }

    /// Returns true unless the policy is `NONE`.
    #[must_use]
    pub const fn locks_top_level(self) -> bool {
        !matches!(self, Self::None)
    }

    /// Returns true only for `DEEP`.
    #[must_use]
    pub const fn is_deep(self) -> bool {
        matches!(self, Self::Deep)
    }

    const fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Shallow,
            2 => Self::Deep,
            _ => Self::None,
        }
    }
}

impl fmt::Display for FreezePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown freeze policy '{0}' (expected NONE, SHALLOW or DEEP)")]
pub struct ParsePolicyError(pub String);

impl FromStr for FreezePolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NONE" => Ok(Self::None),
            "SHALLOW" => Ok(Self::Shallow),
            "DEEP" => Ok(Self::Deep),
            _ => Err(ParsePolicyError(s.to_string())),
        }
    }
}

/// Factory configuration.
///
/// `freeze_policy: None` means "follow the process-wide default".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Fixed policy for this factory, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freeze_policy: Option<FreezePolicy>,
}

impl FactoryConfig {
    /// Config pinned to a fixed policy.
    #[must_use]
    pub const fn with_policy(policy: FreezePolicy) -> Self {
        Self {
            freeze_policy: Some(policy),
        }
    }

    /// The policy in effect right now.
    #[must_use]
    pub fn effective_policy(&self) -> FreezePolicy {
        self.freeze_policy.unwrap_or_else(FreezePolicy::global)
    }
}
