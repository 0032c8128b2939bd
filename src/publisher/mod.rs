//! Publishers layered over the `futures` stream and future traits
//!
//! - `Flux<T>`: zero or more values, implements `futures::Stream`
//! - `Mono<T>`: zero or one value, implements `std::future::Future`
//!
//! Both carry `FluxError` on their error channel and drive on tokio when
//! subscribed.

pub mod flux;
pub mod mono;
pub mod signal;
pub mod subscription;

pub use flux::Flux;
pub use mono::Mono;
pub use signal::{Demand, Signal};
pub use subscription::Subscription;

use crate::error::FluxError;

/// Error callback used by `subscribe` when none is given.
pub(crate) fn log_dropped_error(err: FluxError) {
    log::error!("operator called default onError: {err}");
}
