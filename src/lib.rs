//! # Reactor Sugars
//!
//! Reactive-flavoured publishers over the `futures`/`tokio` stream stack.
//!
//! The crate is organized into a few small modules:
//!
//! - `domain` - the `User` fixture type and the `has_name` predicate factory
//! - `publisher` - `Flux` (zero or more values) and `Mono` (at most one value),
//!   thin wrappers over `futures::Stream` and `futures::Future`
//! - `verifier` - `StepVerifier`, a step-by-step expectation harness with
//!   bounded demand and virtual time (enabled by the `verifier` feature)
//! - `error` - `FluxError` for the publishers' error channel and
//!   `VerificationError` for failed expectations
//!
//! ## Example
//!
//! ```rust
//! use reactor_sugars::{has_name, Flux, StepVerifier, User};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let users = Flux::just([User::new("Robby"), User::new("Davy")]);
//!
//! StepVerifier::create(users)
//!     .expect_next_matches(has_name("Robby"))
//!     .expect_next_matches(has_name("Davy"))
//!     .verify_complete()
//!     .await
//!     .unwrap();
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod domain;
pub mod error;
pub mod publisher;

#[cfg(feature = "verifier")]
pub mod verifier;

pub use domain::{has_name, User, UserPredicates};
pub use error::{FluxError, VerificationError};
pub use publisher::{Demand, Flux, Mono, Signal, Subscription};

#[cfg(feature = "verifier")]
pub use verifier::{LastStep, StepVerifier, StepVerifierOptions};
