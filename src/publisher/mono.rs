//! `Mono`: at most one value, or an error.

use super::flux::Flux;
use super::signal::{log_signal, Demand, Signal};
use super::subscription::Subscription;
use crate::error::FluxError;
use futures::future::{self, BoxFuture, FutureExt};
use futures::ready;
use futures::stream;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A future resolving to zero or one value
///
/// Resolves to `Ok(Some(value))`, `Ok(None)` when empty, or `Err` on
/// failure. Like any future it does nothing until polled.
pub struct Mono<T> {
    inner: BoxFuture<'static, Result<Option<T>, FluxError>>,
}

impl<T: Send + 'static> Mono<T> {
    /// Resolves to `value`.
    pub fn just(value: T) -> Self {
        Self::from_result_future(future::ready(Ok(Some(value))))
    }

    /// Completes without a value.
    pub fn empty() -> Self {
        Self::from_result_future(future::ready(Ok(None)))
    }

    /// Never resolves.
    pub fn never() -> Self {
        Self::from_result_future(future::pending())
    }

    /// Fails with `err`.
    pub fn error(err: FluxError) -> Self {
        Self::from_result_future(future::ready(Err(err)))
    }

    /// Resolves to the output of `source`.
    pub fn from_future<F>(source: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self::from_result_future(source.map(|value| Ok::<_, FluxError>(Some(value))))
    }

    /// Wraps a future that already speaks the `Mono` result shape.
    pub fn from_result_future<F>(source: F) -> Self
    where
        F: Future<Output = Result<Option<T>, FluxError>> + Send + 'static,
    {
        Self {
            inner: source.boxed(),
        }
    }

    /// Transforms the value, if any.
    pub fn map<U, F>(self, f: F) -> Mono<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Mono::from_result_future(self.inner.map(|resolved| resolved.map(|value| value.map(f))))
    }

    /// Chains another mono computed from the value; empty stays empty.
    pub fn flat_map<U, F>(self, f: F) -> Mono<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Mono<U> + Send + 'static,
    {
        Mono::from_result_future(async move {
            match self.inner.await? {
                Some(value) => f(value).await,
                None => Ok(None),
            }
        })
    }

    /// Logs every signal through the `log` facade with `category` as target.
    pub fn log(self, category: impl Into<String>) -> Self
    where
        T: fmt::Debug,
    {
        Self::from_result_future(Logged {
            inner: self.inner,
            category: category.into(),
            subscribed: false,
            done: false,
        })
    }

    /// Views this mono as a flux of zero or one value.
    pub fn into_flux(self) -> Flux<T> {
        Flux::from_result_stream(
            futures::StreamExt::filter_map(stream::once(self.inner), |resolved| {
                future::ready(resolved.transpose())
            }),
        )
    }

    /// Resolves the mono on a tokio task, handing the value to `on_next`.
    ///
    /// Errors are logged. Must be called within a tokio runtime.
    pub fn subscribe<F>(self, on_next: F) -> Subscription
    where
        F: FnOnce(T) + Send + 'static,
    {
        self.subscribe_with(on_next, super::log_dropped_error, || {})
    }

    /// Resolves the mono on a tokio task with a callback per signal kind.
    pub fn subscribe_with<N, E, C>(self, on_next: N, on_error: E, on_complete: C) -> Subscription
    where
        N: FnOnce(T) + Send + 'static,
        E: FnOnce(FluxError) + Send + 'static,
        C: FnOnce() + Send + 'static,
    {
        Subscription::spawn(async move {
            match self.inner.await {
                Ok(Some(value)) => {
                    on_next(value);
                    on_complete();
                }
                Ok(None) => on_complete(),
                Err(err) => on_error(err),
            }
        })
    }
}

impl<T> Future for Mono<T> {
    type Output = Result<Option<T>, FluxError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl<T> fmt::Debug for Mono<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mono").finish_non_exhaustive()
    }
}

/// Future wrapper behind [`Mono::log`]
struct Logged<T> {
    inner: BoxFuture<'static, Result<Option<T>, FluxError>>,
    category: String,
    subscribed: bool,
    done: bool,
}

impl<T: fmt::Debug> Future for Logged<T> {
    type Output = Result<Option<T>, FluxError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if !self.subscribed {
            self.subscribed = true;
            log_signal::<T>(&self.category, &Signal::OnSubscribe);
            log_signal::<T>(&self.category, &Signal::Request(Demand::Unbounded));
        }
        let resolved = ready!(self.inner.poll_unpin(cx));
        match &resolved {
            Ok(Some(value)) => {
                log_signal(&self.category, &Signal::OnNext(value));
                log_signal::<T>(&self.category, &Signal::OnComplete);
            }
            Ok(None) => log_signal::<T>(&self.category, &Signal::OnComplete),
            Err(err) => log_signal::<T>(&self.category, &Signal::OnError(err.clone())),
        }
        self.done = true;
        Poll::Ready(resolved)
    }
}

impl<T> Drop for Logged<T> {
    fn drop(&mut self) {
        if self.subscribed && !self.done {
            log_signal::<()>(&self.category, &Signal::Cancel);
        }
    }
}
