//! Step-by-step verification of publishers
//!
//! `StepVerifier` subscribes to a `Flux` (or a `Mono` viewed as one), then
//! checks each scripted expectation against the signals in order. Demand is
//! explicit: with a bounded initial request, values are pulled only after
//! `then_request`. `StepVerifier::with_virtual_time` runs the script on
//! tokio's paused clock so interval-based publishers finish instantly.

pub mod options;
mod step;
pub mod step_verifier;

pub use options::StepVerifierOptions;
pub use step_verifier::{LastStep, StepVerifier};
