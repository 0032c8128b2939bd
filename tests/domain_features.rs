//! Tests for the `User` fixture and its name predicates

mod domain_tests {
    use proptest::prelude::*;
    use reactor_sugars::{has_name, User, UserPredicates};

    #[test]
    fn test_domain_user_display_is_name() {
        assert_eq!(User::new("Davy").to_string(), "Davy");
        assert_eq!(format!("{}", User::from("Riet")), "Riet");
    }

    #[test]
    fn test_domain_has_name_is_case_sensitive() {
        let robby = UserPredicates::has_name("Robby");
        assert!(robby(&User::new("Robby")));
        assert!(!robby(&User::new("robby")));
    }

    #[test]
    fn test_domain_predicate_filters_iterators() {
        let users = vec![User::new("Robby"), User::new("Davy"), User::new("Robby")];
        let robbies = users.iter().filter(|user| has_name("Robby")(*user)).count();
        assert_eq!(robbies, 2);
    }

    proptest! {
        #[test]
        fn test_domain_name_round_trips(name in ".*") {
            let user = User::new(name.clone());
            prop_assert_eq!(user.name(), name.as_str());
        }

        #[test]
        fn test_domain_has_name_matches_exact_equality(
            target in "[a-zA-Z]{0,6}",
            actual in "[a-zA-Z]{0,6}",
        ) {
            let matches = has_name(target.clone())(&User::new(actual.clone()));
            prop_assert_eq!(matches, target == actual);
        }

        #[test]
        fn test_domain_display_equals_name(name in "\\PC*") {
            prop_assert_eq!(User::new(name.clone()).to_string(), name);
        }
    }
}

#[cfg(feature = "serde")]
mod domain_serde_tests {
    use reactor_sugars::User;

    #[test]
    fn test_domain_user_serializes_as_its_name() {
        let json = serde_json::to_string(&User::new("Anita")).unwrap();
        assert_eq!(json, r#""Anita""#);

        let user: User = serde_json::from_str(r#""Riet""#).unwrap();
        assert_eq!(user.name(), "Riet");
    }
}
