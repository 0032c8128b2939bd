//! Fixture types used by the publisher demos

/// A value type holding a single name.
pub mod user;
/// Name-equality predicates over `User`.
pub mod predicates;

pub use predicates::{has_name, UserPredicates};
pub use user::User;
