//! Error types shared across the core.
//!
//! Two kinds, matching the distinction the whole crate is built around:
//! malformed inputs are rejected eagerly at the call site (`CoreError`),
//! while a well-formed argument that simply fails to verify is reported
//! through [`VerificationResult`], never as an exceptional failure.

use std::fmt;

/// Eagerly-raised precondition violation: null/empty inputs, group or
/// dimension mismatches, sizes exceeding the commitment key or public
/// key, a hash-length bound violation, or a witness/statement that is
/// inconsistent with the claimed relation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid input: {reason}")]
pub struct CoreError {
    pub reason: String,
}

impl CoreError {
    pub fn new(reason: impl Into<String>) -> Self {
        CoreError {
            reason: reason.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

/// The outcome of a verification call: well-formed inputs that either
/// satisfy every equation the argument makes, or don't. Never raised as
/// an error — callers inspect `is_verified` and, on failure, the ordered
/// list of human-readable reasons.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationResult {
    reasons: Vec<String>,
}

impl VerificationResult {
    pub fn verified() -> Self {
        VerificationResult {
            reasons: Vec::new(),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        VerificationResult {
            reasons: vec![reason.into()],
        }
    }

    pub fn is_verified(&self) -> bool {
        self.reasons.is_empty()
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// Combines two results without short-circuiting: both sides are
    /// always evaluated by the caller, and every failure reason from
    /// both is retained (§7: "the verifier returns the conjunction of
    /// sub-argument results without short-circuiting observable side
    /// effects").
    pub fn and(mut self, other: VerificationResult) -> Self {
        self.reasons.extend(other.reasons);
        self
    }

    /// Folds in a single boolean check, attaching `reason` if it failed.
    pub fn check(mut self, ok: bool, reason: impl Into<String>) -> Self {
        if !ok {
            self.reasons.push(reason.into());
        }
        self
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_verified() {
            write!(f, "verified")
        } else {
            write!(f, "not verified: {}", self.reasons.join("; "))
        }
    }
}
