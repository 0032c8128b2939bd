//! Signals exchanged between a publisher and its consumer

use crate::error::FluxError;
use std::fmt;

/// Outstanding request count of a consumer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Demand {
    /// No limit on how many values may be delivered
    #[default]
    Unbounded,
    /// At most this many values may be delivered
    Bounded(u64),
}

impl Demand {
    /// Demand that allows nothing until more is requested
    pub fn none() -> Self {
        Self::Bounded(0)
    }

    /// Returns true when no value may be delivered
    pub fn is_zero(&self) -> bool {
        matches!(self, Self::Bounded(0))
    }

    /// Adds `n` to the outstanding demand.
    ///
    /// Reaching `u64::MAX` turns the demand unbounded.
    pub fn add(self, n: u64) -> Self {
        match self {
            Self::Unbounded => Self::Unbounded,
            Self::Bounded(current) => match current.checked_add(n) {
                Some(total) if total < u64::MAX => Self::Bounded(total),
                _ => Self::Unbounded,
            },
        }
    }

    /// Accounts for one delivered value. Returns false if there was no demand.
    pub fn take_one(&mut self) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Bounded(0) => false,
            Self::Bounded(n) => {
                *n -= 1;
                true
            }
        }
    }
}

impl fmt::Display for Demand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbounded => f.write_str("unbounded"),
            Self::Bounded(n) => write!(f, "{n}"),
        }
    }
}

/// One event in the life of a subscription
#[derive(Debug, Clone, PartialEq)]
pub enum Signal<T> {
    /// The consumer subscribed
    OnSubscribe,
    /// The consumer asked for more values
    Request(Demand),
    /// A value was delivered
    OnNext(T),
    /// The sequence failed
    OnError(FluxError),
    /// The sequence completed
    OnComplete,
    /// The consumer stopped listening before a terminal signal
    Cancel,
}

impl<T> Signal<T> {
    /// Returns true for `OnError` and `OnComplete`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::OnError(_) | Self::OnComplete)
    }
}

impl<T: fmt::Debug> fmt::Display for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnSubscribe => f.write_str("onSubscribe"),
            Self::Request(demand) => write!(f, "request({demand})"),
            Self::OnNext(value) => write!(f, "onNext({value:?})"),
            Self::OnError(err) => write!(f, "onError({err})"),
            Self::OnComplete => f.write_str("onComplete()"),
            Self::Cancel => f.write_str("cancel()"),
        }
    }
}

/// Writes a signal to the `log` facade under `category`.
pub(crate) fn log_signal<T: fmt::Debug>(category: &str, signal: &Signal<T>) {
    match signal {
        Signal::OnError(_) => log::error!(target: category, "| {signal}"),
        _ => log::info!(target: category, "| {signal}"),
    }
}
