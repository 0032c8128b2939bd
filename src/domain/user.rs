//! The `User` name holder

use std::fmt;

/// An immutable holder for a user's name.
///
/// Two users are equal when their names are equal. The textual
/// representation is the name itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct User {
    name: String,
}

impl User {
    /// Creates a user with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Returns the name this user was created with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a new user whose name is upper-cased.
    pub fn to_upper_case(&self) -> Self {
        Self::new(self.name.to_uppercase())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for User {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for User {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_name() {
        assert_eq!(User::new("Davy").to_string(), "Davy");
    }

    #[test]
    fn equality_follows_the_name() {
        assert_eq!(User::from("Riet"), User::new(String::from("Riet")));
        assert_ne!(User::new("Riet"), User::new("riet"));
    }

    #[test]
    fn upper_case_keeps_the_original() {
        let user = User::new("Anita");
        assert_eq!(user.to_upper_case().name(), "ANITA");
        assert_eq!(user.name(), "Anita");
    }
}
