//! Configuration for verifier runs

use crate::publisher::Demand;
use std::time::Duration;

/// Settings for a `StepVerifier` run
///
/// ```rust
/// use reactor_sugars::StepVerifierOptions;
/// use std::time::Duration;
///
/// let options = StepVerifierOptions::new()
///     .initial_request(0)
///     .scenario_name("one by one")
///     .timeout(Duration::from_secs(5));
/// assert_eq!(options.scenario_prefix(), "[one by one] ");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepVerifierOptions {
    initial_request: Demand,
    scenario_name: Option<String>,
    timeout: Option<Duration>,
}

impl StepVerifierOptions {
    /// Unbounded initial demand, no name, no timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Demand granted when the subscription starts.
    pub fn initial_request(mut self, n: u64) -> Self {
        self.initial_request = Demand::none().add(n);
        self
    }

    /// Starts with unbounded demand (the default).
    pub fn unbounded_request(mut self) -> Self {
        self.initial_request = Demand::Unbounded;
        self
    }

    /// Name prefixed to every failure message.
    pub fn scenario_name(mut self, name: impl Into<String>) -> Self {
        self.scenario_name = Some(name.into());
        self
    }

    /// Upper bound for the whole verification.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the configured initial demand.
    pub fn initial_demand(&self) -> Demand {
        self.initial_request
    }

    /// Returns the configured timeout, if any.
    pub fn timeout_limit(&self) -> Option<Duration> {
        self.timeout
    }

    /// `"[name] "`, or an empty string when unnamed.
    pub fn scenario_prefix(&self) -> String {
        self.scenario_name
            .as_deref()
            .map(|name| format!("[{name}] "))
            .unwrap_or_default()
    }
}
