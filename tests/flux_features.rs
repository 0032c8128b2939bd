//! Tests for building, transforming and combining `Flux` sequences

#[cfg(feature = "verifier")]
mod flux_tests {
    use pretty_assertions::assert_eq;
    use reactor_sugars::{has_name, Flux, FluxError, Mono, StepVerifier, User};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn male_users() -> Flux<User> {
        Flux::just([User::new("Robby"), User::new("Davy")])
    }

    fn female_users() -> Flux<User> {
        Flux::just([User::new("Anita"), User::new("Riet")])
    }

    fn async_to_upper_case(user: User) -> Mono<User> {
        Mono::from_future(async move { user.to_upper_case() })
    }

    fn strings_with_second_delays(name: &str, seconds: u64) -> Flux<String> {
        let name = name.to_string();
        Flux::interval(Duration::from_secs(seconds)).map(move |tick| format!("{name}{tick}"))
    }

    // 2s, 4s, 6s
    fn produce_strings_each_2_seconds() -> Flux<String> {
        strings_with_second_delays("flux_each_2_seconds_", 2).take(3)
    }

    // 3s, 6s, 9s after activation
    fn produce_strings_each_3_seconds() -> Flux<String> {
        strings_with_second_delays("flux_each_3_seconds_", 3).take(3)
    }

    #[tokio::test]
    async fn test_flux_subscribe_prints_values() {
        init_logger();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        Flux::just(["Robby", "Davy"])
            .subscribe(move |name| {
                println!("{name}");
                sink.lock().unwrap().push(name);
            })
            .join()
            .await;

        assert_eq!(*seen.lock().unwrap(), vec!["Robby", "Davy"]);
    }

    #[tokio::test]
    async fn test_flux_empty_completes() {
        StepVerifier::create(Flux::<String>::empty())
            .verify_complete()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_flux_from_data_values() {
        StepVerifier::create(Flux::just(["foo", "bar"]))
            .expect_next("foo")
            .expect_next("bar")
            .expect_complete()
            .verify()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_flux_from_iterable() {
        let flux = Flux::from_iterable(vec!["Hello".to_string(), "world".to_string()]);
        StepVerifier::create(flux)
            .expect_next("Hello".to_string())
            .expect_next("world".to_string())
            .expect_complete()
            .verify()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_flux_division_by_zero_errors() {
        let divide_100_by_number = Flux::just([2, 4, 0]).try_map(|number| FluxError::divide(100, number));
        StepVerifier::create(divide_100_by_number)
            .expect_next(50)
            .expect_next(25)
            .expect_error_matches(FluxError::is_arithmetic)
            .verify()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_flux_error_stops_later_values() {
        let flux = Flux::just([1, 0, 5]).try_map(|number| FluxError::divide(10, number));
        StepVerifier::create(flux)
            .expect_next(10)
            .expect_error_message("arithmetic error: / by zero")
            .verify()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_flux_verify_users() {
        StepVerifier::create(male_users())
            .expect_next_matches(has_name("Robby"))
            .expect_next_matches(has_name("Davy"))
            .expect_complete()
            .verify()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_flux_upper_case_user_names() {
        let upper_cased = male_users().map(|user| User::new(user.name().to_uppercase()));
        StepVerifier::create(upper_cased)
            .expect_next_matches(has_name("ROBBY"))
            .expect_next_matches(has_name("DAVY"))
            .expect_complete()
            .verify()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_flux_upper_case_async() {
        let upper_cased = male_users().flat_map(async_to_upper_case);
        StepVerifier::create(upper_cased)
            .expect_next_matches(has_name("ROBBY"))
            .expect_next_matches(has_name("DAVY"))
            .expect_complete()
            .verify()
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_flux_predicate_mismatch_is_reported() {
        let err = StepVerifier::create(male_users())
            .expect_next_matches(has_name("robby"))
            .then_cancel()
            .verify()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("predicate failed"));
    }

    #[tokio::test]
    async fn test_flux_interval_count_real_time() {
        let started = std::time::Instant::now();
        StepVerifier::create(Flux::interval(Duration::from_millis(50)).take(2))
            .expect_next_count(2)
            .expect_complete()
            .verify()
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_flux_merge_user_names() {
        let merged = male_users()
            .merge_with(female_users())
            .map(|user| user.name().to_string());
        StepVerifier::create(merged)
            .expect_next_seq(["Robby", "Davy", "Anita", "Riet"].map(String::from))
            .verify_complete()
            .await
            .unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_flux_merge_timed_fluxes_as_is() {
        init_logger();
        let started = tokio::time::Instant::now();
        let merged = produce_strings_each_2_seconds()
            .merge_with(produce_strings_each_3_seconds())
            .log("merge")
            .collect_list()
            .await
            .unwrap()
            .unwrap();

        for value in &merged {
            println!("{value}");
        }
        assert_eq!(
            merged,
            vec![
                "flux_each_2_seconds_0",
                "flux_each_3_seconds_0",
                "flux_each_2_seconds_1",
                "flux_each_2_seconds_2",
                "flux_each_3_seconds_1",
                "flux_each_3_seconds_2",
            ]
        );
        assert_eq!(started.elapsed(), Duration::from_secs(9));
    }

    #[tokio::test(start_paused = true)]
    async fn test_flux_concat_timed_fluxes_preserves_order() {
        let started = tokio::time::Instant::now();
        let concatenated = produce_strings_each_2_seconds()
            .concat_with(produce_strings_each_3_seconds())
            .collect_list()
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            concatenated,
            vec![
                "flux_each_2_seconds_0",
                "flux_each_2_seconds_1",
                "flux_each_2_seconds_2",
                "flux_each_3_seconds_0",
                "flux_each_3_seconds_1",
                "flux_each_3_seconds_2",
            ]
        );
        // the 3s flux starts only once the 2s flux is done
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn test_flux_filter_and_count() {
        let everyone = male_users().merge_with(female_users());
        let count = everyone
            .filter(|user| user.name().len() == 4)
            .count()
            .await;
        assert_eq!(count, Ok(Some(2)));
    }

    #[tokio::test]
    async fn test_flux_interop_with_tokio_stream() {
        use tokio_stream::StreamExt as _;

        let flux = Flux::from_stream(tokio_stream::iter(vec![1, 2, 3])).map(|n| n * 2);
        let doubled: Vec<i32> = flux.filter_map(Result::ok).collect().await;
        assert_eq!(doubled, vec![2, 4, 6]);
    }

    #[tokio::test]
    async fn test_flux_defer_supplies_on_activation() {
        let supplied = Arc::new(AtomicUsize::new(0));
        let calls = supplied.clone();
        let mut flux = Flux::defer(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            male_users()
        });
        assert_eq!(supplied.load(Ordering::SeqCst), 0);

        flux.activate();
        flux.activate();
        assert_eq!(supplied.load(Ordering::SeqCst), 1);

        StepVerifier::create(flux)
            .expect_next_matches(has_name("Robby"))
            .expect_next_matches(has_name("Davy"))
            .verify_complete()
            .await
            .unwrap();
        assert_eq!(supplied.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_flux_error_verifies_as_error() {
        StepVerifier::create(Flux::<User>::error(FluxError::illegal_state("no users")))
            .verify_error()
            .await
            .unwrap();

        let err = StepVerifier::create(male_users())
            .expect_next_count(2)
            .verify_error()
            .await
            .unwrap_err();
        assert!(err.to_string().ends_with("expected onError(), actual onComplete()"));
    }
}
