//! `Flux`: an ordered sequence of zero or more values that ends with
//! completion or a single error.

use super::mono::Mono;
use super::signal::{log_signal, Demand, Signal};
use super::subscription::Subscription;
use crate::error::FluxError;
use futures::future::{self, Either};
use futures::ready;
use futures::stream::{self, BoxStream, FusedStream, PollNext, Stream, StreamExt, TryStreamExt};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{self as tokio_time, Instant};

type Upstream<T> = BoxStream<'static, Result<T, FluxError>>;
type Assembly<T> = Box<dyn FnOnce() -> Upstream<T> + Send>;

enum State<T> {
    /// Operator chain not yet built; nothing runs until activation.
    Deferred(Assembly<T>),
    Active(Upstream<T>),
    Terminated,
}

/// A push-style sequence of values carried over a `futures::Stream`
///
/// Items are `Result<T, FluxError>`. An `Err` item is terminal: the flux
/// yields `None` afterwards and drops its upstream. Operators are assembled
/// lazily, so timers and sources start only once the flux is activated,
/// either explicitly with [`Flux::activate`] or by the first poll.
///
/// Demand is the consumer's pull: a value is produced only when the flux is
/// polled, so taking `n` items never pulls more than `n` from upstream.
pub struct Flux<T> {
    state: State<T>,
}

impl<T> Flux<T> {
    /// Builds the operator chain and starts upstream sources without pulling
    /// a value. Calling it again has no effect.
    pub fn activate(&mut self) {
        self.state = match std::mem::replace(&mut self.state, State::Terminated) {
            State::Deferred(assemble) => State::Active(assemble()),
            other => other,
        };
    }

    fn upstream(mut self) -> Self {
        self.activate();
        self
    }
}

impl<T: Send + 'static> Flux<T> {
    fn assemble<F>(assembly: F) -> Self
    where
        F: FnOnce() -> Upstream<T> + Send + 'static,
    {
        Self {
            state: State::Deferred(Box::new(assembly)),
        }
    }

    fn active(upstream: Upstream<T>) -> Self {
        Self {
            state: State::Active(upstream),
        }
    }

    /// Emits the given values in order, then completes.
    pub fn just<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::active(stream::iter(values.into_iter().map(Ok)).boxed())
    }

    /// Emits every item of an iterable in order, then completes.
    pub fn from_iterable<I>(iterable: I) -> Self
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: Send + 'static,
    {
        Self::just(iterable)
    }

    /// Completes without emitting anything.
    pub fn empty() -> Self {
        Self::active(stream::empty().boxed())
    }

    /// Fails immediately with `err`.
    pub fn error(err: FluxError) -> Self {
        Self::active(stream::once(future::ready(Err(err))).boxed())
    }

    /// Never emits and never terminates.
    pub fn never() -> Self {
        Self::active(stream::pending().boxed())
    }

    /// Wraps an infallible stream.
    pub fn from_stream<S>(source: S) -> Self
    where
        S: Stream<Item = T> + Send + 'static,
    {
        Self::active(source.map(Ok).boxed())
    }

    /// Wraps a stream that already carries `FluxError`s.
    pub fn from_result_stream<S>(source: S) -> Self
    where
        S: Stream<Item = Result<T, FluxError>> + Send + 'static,
    {
        Self::active(source.boxed())
    }

    /// Calls `supplier` only when the flux is activated.
    pub fn defer<F>(supplier: F) -> Self
    where
        F: FnOnce() -> Flux<T> + Send + 'static,
    {
        Self::assemble(move || StreamExt::boxed(supplier().upstream()))
    }

    /// Transforms every value.
    pub fn map<U, F>(self, mut f: F) -> Flux<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> U + Send + 'static,
    {
        Flux::assemble(move || StreamExt::map(self.upstream(), move |item| item.map(&mut f)).boxed())
    }

    /// Transforms every value; an `Err` from `f` ends the sequence with that error.
    pub fn try_map<U, F>(self, mut f: F) -> Flux<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> Result<U, FluxError> + Send + 'static,
    {
        Flux::assemble(move || {
            StreamExt::map(self.upstream(), move |item| item.and_then(&mut f)).boxed()
        })
    }

    /// Keeps only the values matching `predicate`.
    pub fn filter<P>(self, mut predicate: P) -> Self
    where
        P: FnMut(&T) -> bool + Send + 'static,
    {
        Flux::assemble(move || {
            StreamExt::filter(self.upstream(), move |item| {
                future::ready(match item {
                    Ok(value) => predicate(value),
                    Err(_) => true,
                })
            })
            .boxed()
        })
    }

    /// Maps every value to a `Mono` and flattens the results in source order.
    ///
    /// Empty monos contribute nothing; a failed mono ends the sequence.
    pub fn flat_map<U, F>(self, mut f: F) -> Flux<U>
    where
        U: Send + 'static,
        F: FnMut(T) -> Mono<U> + Send + 'static,
    {
        Flux::assemble(move || {
            StreamExt::then(self.upstream(), move |item| match item {
                Ok(value) => Either::Left(f(value)),
                Err(err) => Either::Right(future::ready(Err::<Option<U>, _>(err))),
            })
            .filter_map(|resolved| future::ready(resolved.transpose()))
            .boxed()
        })
    }

    /// Emits at most `n` values, then completes and drops the upstream.
    pub fn take(self, n: usize) -> Self {
        Flux::assemble(move || StreamExt::take(self.upstream(), n).boxed())
    }

    /// Interleaves both sequences as their values become ready.
    ///
    /// When both sides are ready at once, `self` goes first, so two
    /// synchronous sources come out one after the other. Completes after
    /// both complete; an error from either side ends the merge.
    pub fn merge_with(self, other: Flux<T>) -> Self {
        fn prefer_left(_: &mut ()) -> PollNext {
            PollNext::Left
        }

        Flux::assemble(move || {
            stream::select_with_strategy(self.upstream(), other.upstream(), prefer_left).boxed()
        })
    }

    /// Emits all of `self`, then all of `other`.
    ///
    /// `other` is activated only after `self` completes.
    pub fn concat_with(self, other: Flux<T>) -> Self {
        Flux::assemble(move || StreamExt::chain(self.upstream(), other).boxed())
    }

    /// Runs `f` on every value as it passes through.
    pub fn do_on_next<F>(self, mut f: F) -> Self
    where
        F: FnMut(&T) + Send + 'static,
    {
        Flux::assemble(move || {
            StreamExt::inspect(self.upstream(), move |item| {
                if let Ok(value) = item {
                    f(value)
                }
            })
            .boxed()
        })
    }

    /// Logs every signal through the `log` facade with `category` as target.
    pub fn log(self, category: impl Into<String>) -> Self
    where
        T: fmt::Debug,
    {
        let category = category.into();
        Flux::assemble(move || {
            log_signal::<T>(&category, &Signal::OnSubscribe);
            log_signal::<T>(&category, &Signal::Request(Demand::Unbounded));
            Logged {
                upstream: self.upstream(),
                category,
                done: false,
            }
            .boxed()
        })
    }

    /// Counts the values; fails if the sequence fails.
    pub fn count(self) -> Mono<u64> {
        Mono::from_result_future(async move {
            let mut upstream = self;
            let mut count = 0u64;
            while let Some(item) = StreamExt::next(&mut upstream).await {
                item?;
                count += 1;
            }
            Ok::<_, FluxError>(Some(count))
        })
    }

    /// Collects every value into a `Vec`; fails if the sequence fails.
    pub fn collect_list(self) -> Mono<Vec<T>> {
        Mono::from_result_future(async move { self.try_collect::<Vec<T>>().await.map(Some) })
    }

    /// Drives the flux on a tokio task, handing each value to `on_next`.
    ///
    /// Errors are logged. Must be called within a tokio runtime.
    pub fn subscribe<F>(self, on_next: F) -> Subscription
    where
        F: FnMut(T) + Send + 'static,
    {
        self.subscribe_with(on_next, super::log_dropped_error, || {})
    }

    /// Drives the flux on a tokio task with a callback per signal kind.
    pub fn subscribe_with<N, E, C>(self, mut on_next: N, on_error: E, on_complete: C) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnOnce(FluxError) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        Subscription::spawn(async move {
            let mut upstream = self;
            while let Some(item) = StreamExt::next(&mut upstream).await {
                match item {
                    Ok(value) => on_next(value),
                    Err(err) => return on_error(err),
                }
            }
            on_complete();
        })
    }
}

impl Flux<u64> {
    /// Emits `0, 1, 2, ...` every `period`, the first value one period after
    /// activation. Never completes on its own; bound it with [`Flux::take`].
    ///
    /// Uses tokio's clock, so a paused runtime makes it run on virtual time.
    /// A period too large for the clock to represent never ticks.
    pub fn interval(period: Duration) -> Self {
        if period.is_zero() {
            return Self::error(FluxError::illegal_state("interval period must be non-zero"));
        }

        Self::assemble(move || {
            // a first tick past the clock's range never arrives
            let Some(start) = Instant::now().checked_add(period) else {
                return stream::pending().boxed();
            };
            let ticks = tokio_time::interval_at(start, period);
            stream::unfold((ticks, 0u64), |(mut ticks, n)| async move {
                ticks.tick().await;
                Some((Ok(n), (ticks, n.wrapping_add(1))))
            })
            .boxed()
        })
    }
}

impl<T> Stream for Flux<T> {
    type Item = Result<T, FluxError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        this.activate();
        let State::Active(upstream) = &mut this.state else {
            return Poll::Ready(None);
        };
        let item = ready!(upstream.poll_next_unpin(cx));
        if !matches!(item, Some(Ok(_))) {
            this.state = State::Terminated;
        }
        Poll::Ready(item)
    }
}

impl<T> FusedStream for Flux<T> {
    fn is_terminated(&self) -> bool {
        matches!(self.state, State::Terminated)
    }
}

impl<T> fmt::Debug for Flux<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Deferred(_) => "deferred",
            State::Active(_) => "active",
            State::Terminated => "terminated",
        };
        f.debug_struct("Flux").field("state", &state).finish()
    }
}

/// Upstream wrapper behind [`Flux::log`]
struct Logged<T> {
    upstream: Flux<T>,
    category: String,
    done: bool,
}

impl<T: fmt::Debug> Stream for Logged<T> {
    type Item = Result<T, FluxError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }
        let item = ready!(self.upstream.poll_next_unpin(cx));
        let signal = match &item {
            Some(Ok(value)) => Signal::OnNext(value),
            Some(Err(err)) => Signal::OnError(err.clone()),
            None => Signal::OnComplete,
        };
        log_signal(&self.category, &signal);
        self.done = signal.is_terminal();
        Poll::Ready(item)
    }
}

impl<T> Drop for Logged<T> {
    fn drop(&mut self) {
        if !self.done {
            log_signal::<()>(&self.category, &Signal::Cancel);
        }
    }
}
