//! Three-way result for network and parse steps
//!
//! Per-resource work never fails the pipeline: a failed step degrades the
//! record it was building. Only `Fatal` is allowed to stop a phase.

use crate::HarvestError;

/// Result of one network or parse step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The step produced its value
    Ok(T),

    /// The step failed for this item only; the reason is kept for logging
    Degraded(String),

    /// The step hit a failure that invalidates the whole phase
    Fatal(String),
}

impl<T> Outcome<T> {
    pub fn degraded(reason: impl Into<String>) -> Self {
        Self::Degraded(reason.into())
    }

    /// Discards the failure reason
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(value) => Some(value),
            _ => None,
        }
    }

    /// Failure reason, if the step did not succeed
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::Degraded(reason) | Self::Fatal(reason) => Some(reason),
        }
    }

    /// Marks a degraded step as fatal, for steps the whole phase depends on
    pub fn escalate(self, context: &str) -> Self {
        match self {
            Self::Degraded(reason) => Self::Fatal(format!("{}: {}", context, reason)),
            other => other,
        }
    }

    /// Converts into a phase-level result
    ///
    /// `Degraded` becomes `Ok(None)`; only `Fatal` becomes an error.
    pub fn into_result(self) -> Result<Option<T>, HarvestError> {
        match self {
            Self::Ok(value) => Ok(Some(value)),
            Self::Degraded(_) => Ok(None),
            Self::Fatal(reason) => Err(HarvestError::Fatal(reason)),
        }
    }
}
