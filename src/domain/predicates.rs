//! Predicates over users

use super::user::User;

/// Namespace for predicates over [`User`].
///
/// It has no values; use the associated functions.
pub enum UserPredicates {}

impl UserPredicates {
    /// Builds a predicate that is true iff the user's name equals `name`.
    ///
    /// The comparison is exact and case-sensitive.
    pub fn has_name(name: impl Into<String>) -> impl Fn(&User) -> bool + Clone + Send + Sync + 'static {
        let name = name.into();
        move |user: &User| user.name() == name
    }
}

/// Shorthand for [`UserPredicates::has_name`].
pub fn has_name(name: impl Into<String>) -> impl Fn(&User) -> bool + Clone + Send + Sync + 'static {
    UserPredicates::has_name(name)
}
