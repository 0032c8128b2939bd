//! Error types for publishers and the step verifier.
//!
//! `FluxError` travels on a publisher's error channel and ends the sequence.
//! `VerificationError` is what a failed `StepVerifier` run reports.

use std::time::Duration;
use thiserror::Error;

/// Result type alias for step verification
pub type Result<T> = std::result::Result<T, VerificationError>;

/// Terminal error signal of a `Flux` or `Mono`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FluxError {
    /// Arithmetic failure, such as a division by zero
    #[error("arithmetic error: {message}")]
    Arithmetic {
        /// What went wrong
        message: String,
    },

    /// An operation was attempted in a state that does not allow it
    #[error("illegal state: {message}")]
    IllegalState {
        /// What went wrong
        message: String,
    },

    /// Any other failure raised by user code
    #[error("{0}")]
    Custom(String),
}

impl FluxError {
    /// Creates an arithmetic error
    pub fn arithmetic(message: impl Into<String>) -> Self {
        Self::Arithmetic {
            message: message.into(),
        }
    }

    /// Creates an illegal state error
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// Integer division that reports a zero divisor as an arithmetic error.
    pub fn divide(dividend: i32, divisor: i32) -> std::result::Result<i32, FluxError> {
        if divisor == 0 {
            return Err(Self::arithmetic("/ by zero"));
        }
        dividend
            .checked_div(divisor)
            .ok_or_else(|| Self::arithmetic("integer overflow"))
    }

    /// Returns true for `FluxError::Arithmetic`
    pub fn is_arithmetic(&self) -> bool {
        matches!(self, Self::Arithmetic { .. })
    }

    /// Returns true for `FluxError::IllegalState`
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, Self::IllegalState { .. })
    }
}

/// Failure of a `StepVerifier` expectation
///
/// `step` is the zero-based index of the step that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    /// A value arrived but differed from the expected one
    #[error("{scenario}step {step}: expected onNext({expected}), actual onNext({actual})")]
    UnexpectedValue {
        /// Scenario prefix, empty when unnamed
        scenario: String,
        /// Index of the failing step
        step: usize,
        /// Expected value, debug-formatted
        expected: String,
        /// Received value, debug-formatted
        actual: String,
    },

    /// A value arrived but the predicate rejected it
    #[error("{scenario}step {step}: predicate failed on value {actual}")]
    PredicateFailed {
        /// Scenario prefix, empty when unnamed
        scenario: String,
        /// Index of the failing step
        step: usize,
        /// Received value, debug-formatted
        actual: String,
    },

    /// The sequence completed while a value or error was expected
    #[error("{scenario}step {step}: expected {expected}, actual onComplete()")]
    UnexpectedCompletion {
        /// Scenario prefix, empty when unnamed
        scenario: String,
        /// Index of the failing step
        step: usize,
        /// Description of the expected signal
        expected: String,
    },

    /// The sequence failed while a value or completion was expected
    #[error("{scenario}step {step}: expected {expected}, actual onError({error})")]
    UnexpectedError {
        /// Scenario prefix, empty when unnamed
        scenario: String,
        /// Index of the failing step
        step: usize,
        /// Description of the expected signal
        expected: String,
        /// The error that was received
        error: FluxError,
    },

    /// A value arrived while a terminal signal was expected
    #[error("{scenario}step {step}: expected {expected}, actual onNext({actual})")]
    UnexpectedNext {
        /// Scenario prefix, empty when unnamed
        scenario: String,
        /// Index of the failing step
        step: usize,
        /// Description of the expected signal
        expected: String,
        /// Received value, debug-formatted
        actual: String,
    },

    /// An error arrived but the error predicate rejected it
    #[error("{scenario}step {step}: error predicate failed on {error}")]
    ErrorMismatch {
        /// Scenario prefix, empty when unnamed
        scenario: String,
        /// Index of the failing step
        step: usize,
        /// The error that was received
        error: FluxError,
    },

    /// A value was expected but no demand was outstanding
    #[error("{scenario}step {step}: expected onNext but no demand is outstanding, call then_request first")]
    MissingDemand {
        /// Scenario prefix, empty when unnamed
        scenario: String,
        /// Index of the failing step
        step: usize,
    },

    /// `expect_subscription` was used anywhere but as the first step
    #[error("{scenario}step {step}: expect_subscription must be the first step")]
    SubscriptionNotFirst {
        /// Scenario prefix, empty when unnamed
        scenario: String,
        /// Index of the failing step
        step: usize,
    },

    /// The verification did not finish in time
    #[error("{scenario}verification timed out after {timeout:?}")]
    Timeout {
        /// Scenario prefix, empty when unnamed
        scenario: String,
        /// The configured bound
        timeout: Duration,
    },

    /// The tokio clock could not be paused for a virtual-time run
    #[error("{scenario}virtual time unavailable: {reason}")]
    VirtualTimeUnavailable {
        /// Scenario prefix, empty when unnamed
        scenario: String,
        /// Why the clock could not be paused
        reason: String,
    },
}
