//! Steps of a verification script

use crate::error::FluxError;
use std::fmt;
use std::time::Duration;

pub(crate) type ValuePredicate<T> = Box<dyn FnMut(&T) -> bool + Send>;
pub(crate) type ErrorPredicate = Box<dyn FnOnce(&FluxError) -> bool + Send>;

/// One scripted expectation or action
pub(crate) enum Step<T> {
    Subscription,
    /// `expected` is the debug form of an exact value; `None` for a predicate.
    Next {
        expected: Option<String>,
        predicate: ValuePredicate<T>,
    },
    NextCount(u64),
    ConsumeWhile(ValuePredicate<T>),
    Request(u64),
    Await(Duration),
    Task(Box<dyn FnOnce() + Send>),
    Complete,
    Error(Option<ErrorPredicate>),
    Cancel,
}

impl<T> fmt::Display for Step<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Subscription => f.write_str("expectSubscription"),
            Self::Next {
                expected: Some(value),
                ..
            } => write!(f, "expectNext({value})"),
            Self::Next { expected: None, .. } => f.write_str("expectNextMatches"),
            Self::NextCount(n) => write!(f, "expectNextCount({n})"),
            Self::ConsumeWhile(_) => f.write_str("thenConsumeWhile"),
            Self::Request(n) => write!(f, "thenRequest({n})"),
            Self::Await(duration) => write!(f, "thenAwait({duration:?})"),
            Self::Task(_) => f.write_str("then"),
            Self::Complete => f.write_str("expectComplete"),
            Self::Error(_) => f.write_str("expectError"),
            Self::Cancel => f.write_str("thenCancel"),
        }
    }
}
