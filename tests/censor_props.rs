//! Property-based tests for redaction.
//!
//! Whatever the secret values look like, censored fields end up holding the
//! placeholder, the rest of the request is untouched, and censoring again
//! changes nothing.

use proptest::prelude::*;
use serde_json::json;

use httpvcr::cassette::{Body, CapturedRequest};
use httpvcr::censor::DEFAULT_CENSOR_TEXT;
use httpvcr::{Censors, MatchRules};

fn censors() -> Censors {
    Censors::new()
        .censor_headers_by_keys(["authorization"])
        .censor_query_parameters_by_keys(["api_key"])
        .censor_body_elements_by_keys(["password"])
}

fn request(secret: &str, page: u32, user: &str) -> CapturedRequest {
    CapturedRequest {
        method: "POST".into(),
        uri: format!("https://api.example.com/login?api_key={secret}&page={page}"),
        headers: vec![
            ("authorization".into(), format!("Bearer {secret}").into()),
            ("accept".into(), "application/json".into()),
        ],
        body: Body::Text(
            json!({"user": user, "profile": {"password": secret, "age": page}}).to_string(),
        ),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: censored fields hold the placeholder and other fields survive
    #[test]
    fn censored_fields_hold_placeholder(
        secret in "[a-zA-Z0-9]{1,24}",
        page in 0u32..1000,
        user in "[a-z]{1,12}",
    ) {
        let mut captured = request(&secret, page, &user);
        censors().apply_to_request(&mut captured);

        prop_assert_eq!(captured.headers[0].1.as_str(), Some(DEFAULT_CENSOR_TEXT));
        prop_assert_eq!(captured.headers[1].1.as_str(), Some("application/json"));
        prop_assert_eq!(
            captured.uri,
            format!("https://api.example.com/login?api_key=******&page={page}")
        );

        let body = captured.body.as_json().unwrap();
        prop_assert_eq!(&body["profile"]["password"], &json!(DEFAULT_CENSOR_TEXT));
        prop_assert_eq!(&body["profile"]["age"], &json!(page));
        prop_assert_eq!(&body["user"], &json!(user));
    }

    /// Property: applying the same censors twice equals applying them once
    #[test]
    fn censoring_is_idempotent(
        secret in "[a-zA-Z0-9]{1,24}",
        page in 0u32..1000,
        user in "[a-z]{1,12}",
    ) {
        let mut once = request(&secret, page, &user);
        censors().apply_to_request(&mut once);
        let mut twice = once.clone();
        censors().apply_to_request(&mut twice);
        prop_assert_eq!(once, twice);
    }

    /// Property: requests differing only in censored values match after censoring
    #[test]
    fn censored_requests_match_regardless_of_secret(
        first in "[a-zA-Z0-9]{1,24}",
        second in "[a-zA-Z0-9]{1,24}",
        page in 0u32..1000,
    ) {
        let mut stored = request(&first, page, "ana");
        let mut received = request(&second, page, "ana");
        censors().apply_to_request(&mut stored);
        censors().apply_to_request(&mut received);

        let rules = MatchRules::new().by_method().by_full_url().by_body(Vec::<String>::new());
        prop_assert!(rules.matches(&received, &stored));
    }
}
