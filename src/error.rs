//! Error types used by the taskweave engine and combinators.
//!
//! This module defines two error enums:
//!
//! - [`FlowError`]: failures observed while resolving effects, handles and combinators.
//! - [`RuntimeError`]: errors raised by the engine itself (shutdown).
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging/metrics.
//!
//! ## Propagation
//! No combinator catches or retries a [`FlowError`]. A failure raised inside a leaf
//! effect, a forked task or a subscription handler travels unchanged to whoever
//! resolves that task (invoke, join, first).

use std::time::Duration;
use thiserror::Error;

/// # Failures produced while running effects and combinators.
///
/// `FlowError` is `Clone` because a settled [`Handle`](crate::Handle) hands the same
/// outcome to every joiner.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// An internal contract was breached (e.g. First over one handle reported a
    /// non-zero index, or both exclusive subscribe flags were set).
    #[error("invariant violated: {what}")]
    Invariant {
        /// Description of the breached contract.
        what: String,
    },

    /// A leaf effect, forked task or handler failed.
    #[error("task failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// A forked task panicked; the engine caught the panic.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// The task was cancelled (explicitly or by engine shutdown).
    #[error("task cancelled")]
    Canceled,
}

impl FlowError {
    /// Builds an [`FlowError::Invariant`].
    pub fn invariant(what: impl Into<String>) -> Self {
        FlowError::Invariant { what: what.into() }
    }

    /// Builds a [`FlowError::Failed`].
    pub fn fail(error: impl Into<String>) -> Self {
        FlowError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskweave::FlowError;
    ///
    /// assert_eq!(FlowError::Canceled.as_label(), "task_canceled");
    /// assert_eq!(FlowError::invariant("x").as_label(), "invariant_violated");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            FlowError::Invariant { .. } => "invariant_violated",
            FlowError::Failed { .. } => "task_failed",
            FlowError::Panicked { .. } => "task_panicked",
            FlowError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            FlowError::Invariant { what } => format!("invariant: {what}"),
            FlowError::Failed { error } => format!("error: {error}"),
            FlowError::Panicked { info } => format!("panic: {info}"),
            FlowError::Canceled => "cancelled".to_string(),
        }
    }

    /// True for contract breaches, which must never be treated as ordinary task failures.
    pub fn is_invariant(&self) -> bool {
        matches!(self, FlowError::Invariant { .. })
    }
}

/// # Errors produced by the engine runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some tasks were still live.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of the tasks that did not settle in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use taskweave::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck tasks={stuck:?}")
            }
        }
    }
}
