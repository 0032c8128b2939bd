//! Scripted, in-order verification of a publisher's signals.

use super::options::StepVerifierOptions;
use super::step::Step;
use crate::error::{FluxError, Result, VerificationError};
use crate::publisher::{Demand, Flux, Mono, Signal};
use futures::StreamExt;
use std::fmt;
use std::panic;
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::time::Instant;

enum Source<T> {
    Ready(Flux<T>),
    /// Built only after the clock is paused.
    VirtualTime(Box<dyn FnOnce() -> Flux<T> + Send>),
}

/// Builder of expectations over a [`Flux`], checked in order by `verify`
///
/// Nothing is subscribed until one of the `verify*` methods is awaited.
/// Terminal expectations (`expect_complete`, `expect_error*`, `then_cancel`)
/// return a [`LastStep`], which only offers verification.
///
/// ```rust
/// use reactor_sugars::{Flux, StepVerifier};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// StepVerifier::create(Flux::just(["foo", "bar"]))
///     .expect_next("foo")
///     .expect_next("bar")
///     .verify_complete()
///     .await
///     .unwrap();
/// # }
/// ```
pub struct StepVerifier<T> {
    source: Source<T>,
    steps: Vec<Step<T>>,
    options: StepVerifierOptions,
}

/// A `StepVerifier` whose script ended with a terminal expectation
pub struct LastStep<T> {
    verifier: StepVerifier<T>,
}

impl<T> StepVerifier<T>
where
    T: fmt::Debug + Send + 'static,
{
    /// Verifies `flux` with unbounded initial demand.
    pub fn create(flux: Flux<T>) -> Self {
        Self::create_with_options(flux, StepVerifierOptions::default())
    }

    /// Verifies `flux` with the given options.
    pub fn create_with_options(flux: Flux<T>, options: StepVerifierOptions) -> Self {
        Self {
            source: Source::Ready(flux),
            steps: Vec::new(),
            options,
        }
    }

    /// Verifies a `Mono` as a flux of zero or one value.
    pub fn from_mono(mono: Mono<T>) -> Self {
        Self::create(mono.into_flux())
    }

    /// Verifies the flux built by `supplier` on virtual time.
    ///
    /// At verification the tokio clock is paused, `supplier` is called, and
    /// `then_await` advances the clock instead of sleeping. The clock is
    /// resumed when verification ends. Requires a current-thread runtime
    /// whose clock is not already paused; otherwise verification fails with
    /// [`VerificationError::VirtualTimeUnavailable`].
    pub fn with_virtual_time<F>(supplier: F) -> Self
    where
        F: FnOnce() -> Flux<T> + Send + 'static,
    {
        Self::with_virtual_time_and_options(supplier, StepVerifierOptions::default())
    }

    /// [`StepVerifier::with_virtual_time`] with the given options.
    pub fn with_virtual_time_and_options<F>(supplier: F, options: StepVerifierOptions) -> Self
    where
        F: FnOnce() -> Flux<T> + Send + 'static,
    {
        Self {
            source: Source::VirtualTime(Box::new(supplier)),
            steps: Vec::new(),
            options,
        }
    }

    fn push(mut self, step: Step<T>) -> Self {
        self.steps.push(step);
        self
    }

    fn finish(self, step: Step<T>) -> LastStep<T> {
        LastStep {
            verifier: self.push(step),
        }
    }

    /// Expects the subscription itself; only valid as the first step.
    pub fn expect_subscription(self) -> Self {
        self.push(Step::Subscription)
    }

    /// Expects the next value to equal `value`.
    pub fn expect_next(self, value: T) -> Self
    where
        T: PartialEq,
    {
        let expected = format!("{value:?}");
        self.push(Step::Next {
            expected: Some(expected),
            predicate: Box::new(move |actual| *actual == value),
        })
    }

    /// Expects the next values to equal `values`, in order.
    pub fn expect_next_seq<I>(self, values: I) -> Self
    where
        T: PartialEq,
        I: IntoIterator<Item = T>,
    {
        values
            .into_iter()
            .fold(self, |verifier, value| verifier.expect_next(value))
    }

    /// Expects the next value to satisfy `predicate`.
    pub fn expect_next_matches<P>(self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool + Send + 'static,
    {
        self.push(Step::Next {
            expected: None,
            predicate: Box::new(predicate),
        })
    }

    /// Expects `n` more values, whatever they are.
    pub fn expect_next_count(self, n: u64) -> Self {
        self.push(Step::NextCount(n))
    }

    /// Consumes values while `predicate` holds and demand remains.
    ///
    /// The first value that fails the predicate is left for the next step.
    pub fn then_consume_while<P>(self, predicate: P) -> Self
    where
        P: FnMut(&T) -> bool + Send + 'static,
    {
        self.push(Step::ConsumeWhile(Box::new(predicate)))
    }

    /// Requests `n` more values.
    pub fn then_request(self, n: u64) -> Self {
        self.push(Step::Request(n))
    }

    /// Lets `duration` pass: advances the clock on virtual time, sleeps otherwise.
    pub fn then_await(self, duration: Duration) -> Self {
        self.push(Step::Await(duration))
    }

    /// Runs `task` at this point of the script.
    pub fn then<F>(self, task: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.push(Step::Task(Box::new(task)))
    }

    /// Expects the sequence to complete.
    pub fn expect_complete(self) -> LastStep<T> {
        self.finish(Step::Complete)
    }

    /// Expects the sequence to fail with any error.
    pub fn expect_error(self) -> LastStep<T> {
        self.finish(Step::Error(None))
    }

    /// Expects the sequence to fail with an error satisfying `predicate`.
    pub fn expect_error_matches<P>(self, predicate: P) -> LastStep<T>
    where
        P: FnOnce(&FluxError) -> bool + Send + 'static,
    {
        self.finish(Step::Error(Some(Box::new(predicate))))
    }

    /// Expects the sequence to fail with an error rendering as `message`.
    pub fn expect_error_message(self, message: impl Into<String>) -> LastStep<T> {
        let message = message.into();
        self.expect_error_matches(move |err| err.to_string() == message)
    }

    /// Cancels the subscription; nothing after it is checked.
    pub fn then_cancel(self) -> LastStep<T> {
        self.finish(Step::Cancel)
    }

    /// Shorthand for `expect_complete().verify()`.
    pub async fn verify_complete(self) -> Result<Duration> {
        self.expect_complete().verify().await
    }

    /// Shorthand for `expect_error().verify()`.
    pub async fn verify_error(self) -> Result<Duration> {
        self.expect_error().verify().await
    }

    async fn run(self) -> Result<Duration> {
        let StepVerifier {
            source,
            steps,
            options,
        } = self;

        let (flux, clock) = match source {
            Source::Ready(flux) => (flux, None),
            Source::VirtualTime(supplier) => {
                let clock = VirtualClock::pause().map_err(|reason| {
                    VerificationError::VirtualTimeUnavailable {
                        scenario: options.scenario_prefix(),
                        reason,
                    }
                })?;
                (supplier(), Some(clock))
            }
        };

        let started = Instant::now();
        let mut session = Session {
            flux,
            held: None,
            demand: options.initial_demand(),
            scenario: options.scenario_prefix(),
            virtual_time: clock.is_some(),
        };
        session.subscribe();

        for (index, step) in steps.into_iter().enumerate() {
            log::debug!("{}step {index}: {step}", session.scenario);
            session.apply(index, step).await?;
        }

        let elapsed = started.elapsed();
        drop(clock);
        Ok(elapsed)
    }
}

impl<T> LastStep<T>
where
    T: fmt::Debug + Send + 'static,
{
    /// Subscribes and checks every step in order.
    ///
    /// Returns the elapsed time, virtual when verifying on virtual time.
    pub async fn verify(self) -> Result<Duration> {
        let verifier = self.verifier;
        match verifier.options.timeout_limit() {
            Some(limit) => {
                let scenario = verifier.options.scenario_prefix();
                tokio::time::timeout(limit, verifier.run())
                    .await
                    .map_err(|_| VerificationError::Timeout {
                        scenario,
                        timeout: limit,
                    })?
            }
            None => verifier.run().await,
        }
    }

    /// Like [`LastStep::verify`], failing if it takes longer than `timeout`.
    pub async fn verify_timeout(mut self, timeout: Duration) -> Result<Duration> {
        self.verifier.options = self.verifier.options.timeout(timeout);
        self.verify().await
    }
}

/// Pauses tokio's clock for as long as it lives.
struct VirtualClock;

impl VirtualClock {
    /// Fails on a multi-thread runtime, or when the clock is already paused
    /// (a `start_paused` runtime or another virtual-time run in progress).
    fn pause() -> std::result::Result<Self, String> {
        let handle = Handle::try_current().map_err(|err| err.to_string())?;
        if handle.runtime_flavor() != RuntimeFlavor::CurrentThread {
            return Err("requires a current-thread tokio runtime".to_string());
        }
        panic::catch_unwind(tokio::time::pause).map_err(|cause| {
            cause
                .downcast_ref::<String>()
                .cloned()
                .or_else(|| cause.downcast_ref::<&str>().map(|s| s.to_string()))
                .unwrap_or_else(|| "the tokio clock cannot be paused".to_string())
        })?;
        Ok(Self)
    }
}

impl Drop for VirtualClock {
    fn drop(&mut self) {
        tokio::time::resume();
    }
}

/// State of one verification run
struct Session<T> {
    flux: Flux<T>,
    /// A signal already pulled but not yet matched by a step.
    held: Option<Option<std::result::Result<T, FluxError>>>,
    demand: Demand,
    scenario: String,
    virtual_time: bool,
}

impl<T> Session<T>
where
    T: fmt::Debug + Send + 'static,
{
    fn subscribe(&mut self) {
        self.flux.activate();
        log::debug!("{}{}", self.scenario, Signal::<T>::OnSubscribe);
        log::debug!("{}{}", self.scenario, Signal::<T>::Request(self.demand));
    }

    fn can_receive_value(&self) -> bool {
        self.held.is_some() || !self.demand.is_zero()
    }

    async fn receive(&mut self) -> Option<std::result::Result<T, FluxError>> {
        if let Some(signal) = self.held.take() {
            return signal;
        }
        let signal = self.flux.next().await;
        if matches!(signal, Some(Ok(_))) {
            self.demand.take_one();
        }
        signal
    }

    async fn next_value(&mut self, step: usize, expected: &str) -> Result<T> {
        if !self.can_receive_value() {
            return Err(VerificationError::MissingDemand {
                scenario: self.scenario.clone(),
                step,
            });
        }
        match self.receive().await {
            Some(Ok(value)) => Ok(value),
            Some(Err(error)) => Err(VerificationError::UnexpectedError {
                scenario: self.scenario.clone(),
                step,
                expected: expected.to_string(),
                error,
            }),
            None => Err(VerificationError::UnexpectedCompletion {
                scenario: self.scenario.clone(),
                step,
                expected: expected.to_string(),
            }),
        }
    }

    /// Pulls a terminal signal; values are unexpected here.
    async fn terminal(&mut self, step: usize, expected: &str) -> Result<Option<FluxError>> {
        match self.receive().await {
            None => Ok(None),
            Some(Err(error)) => Ok(Some(error)),
            Some(Ok(value)) => Err(VerificationError::UnexpectedNext {
                scenario: self.scenario.clone(),
                step,
                expected: expected.to_string(),
                actual: format!("{value:?}"),
            }),
        }
    }

    async fn apply(&mut self, step: usize, action: Step<T>) -> Result<()> {
        match action {
            Step::Subscription => {
                if step != 0 {
                    return Err(VerificationError::SubscriptionNotFirst {
                        scenario: self.scenario.clone(),
                        step,
                    });
                }
            }
            Step::Next {
                expected,
                mut predicate,
            } => {
                let description = match &expected {
                    Some(value) => format!("onNext({value})"),
                    None => "onNext matching the predicate".to_string(),
                };
                let value = self.next_value(step, &description).await?;
                if !predicate(&value) {
                    let actual = format!("{value:?}");
                    let scenario = self.scenario.clone();
                    return Err(match expected {
                        Some(expected) => VerificationError::UnexpectedValue {
                            scenario,
                            step,
                            expected,
                            actual,
                        },
                        None => VerificationError::PredicateFailed {
                            scenario,
                            step,
                            actual,
                        },
                    });
                }
            }
            Step::NextCount(n) => {
                for received in 1..=n {
                    self.next_value(step, &format!("onNext #{received} of {n}"))
                        .await?;
                }
            }
            Step::ConsumeWhile(mut predicate) => {
                while self.can_receive_value() {
                    match self.receive().await {
                        Some(Ok(value)) if predicate(&value) => {}
                        other => {
                            self.held = Some(other);
                            break;
                        }
                    }
                }
            }
            Step::Request(n) => {
                self.demand = self.demand.add(n);
                log::debug!("{}{}", self.scenario, Signal::<T>::Request(Demand::Bounded(n)));
            }
            Step::Await(duration) => {
                if self.virtual_time {
                    tokio::time::advance(duration).await;
                } else {
                    tokio::time::sleep(duration).await;
                }
            }
            Step::Task(task) => task(),
            Step::Complete => {
                if let Some(error) = self.terminal(step, "onComplete()").await? {
                    return Err(VerificationError::UnexpectedError {
                        scenario: self.scenario.clone(),
                        step,
                        expected: "onComplete()".to_string(),
                        error,
                    });
                }
            }
            Step::Error(predicate) => match self.terminal(step, "onError()").await? {
                None => {
                    return Err(VerificationError::UnexpectedCompletion {
                        scenario: self.scenario.clone(),
                        step,
                        expected: "onError()".to_string(),
                    })
                }
                Some(error) => {
                    if let Some(predicate) = predicate {
                        if !predicate(&error) {
                            return Err(VerificationError::ErrorMismatch {
                                scenario: self.scenario.clone(),
                                step,
                                error,
                            });
                        }
                    }
                }
            },
            Step::Cancel => {
                log::debug!("{}{}", self.scenario, Signal::<T>::Cancel);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn reports_the_first_mismatching_value() {
        let err = StepVerifier::create(Flux::just([1, 2, 3]))
            .expect_next(1)
            .expect_next(3)
            .then_cancel()
            .verify()
            .await
            .unwrap_err();

        assert_eq!(
            err,
            VerificationError::UnexpectedValue {
                scenario: String::new(),
                step: 1,
                expected: "3".to_string(),
                actual: "2".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn value_without_demand_is_reported() {
        let options = StepVerifierOptions::new().initial_request(1).scenario_name("bounded");
        let err = StepVerifier::create_with_options(Flux::just([1, 2]), options)
            .expect_next(1)
            .expect_next(2)
            .then_cancel()
            .verify()
            .await
            .unwrap_err();

        assert_eq!(
            err,
            VerificationError::MissingDemand {
                scenario: "[bounded] ".to_string(),
                step: 1,
            }
        );
    }

    #[tokio::test]
    async fn subscription_must_come_first() {
        let err = StepVerifier::create(Flux::just([1]))
            .expect_next(1)
            .expect_subscription()
            .expect_complete()
            .verify()
            .await
            .unwrap_err();

        assert!(matches!(err, VerificationError::SubscriptionNotFirst { step: 1, .. }));
    }

    #[tokio::test]
    async fn consume_while_leaves_the_first_mismatch() {
        StepVerifier::create(Flux::just(1..=5))
            .then_consume_while(|n| *n < 4)
            .expect_next(4)
            .expect_next(5)
            .verify_complete()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn never_times_out() {
        let err = StepVerifier::create(Flux::<i32>::never())
            .expect_complete()
            .verify_timeout(Duration::from_millis(20))
            .await
            .unwrap_err();

        assert!(matches!(err, VerificationError::Timeout { .. }));
    }
}
