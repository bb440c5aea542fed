#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use bearer_relay::{_preludet::*, error::RefreshError, http::ApiRequest, store::CredentialStore};

#[tokio::test]
async fn transient_refresh_failure_preserves_session_and_recovers() {
	let server = MockServer::start_async().await;
	let (relay, store) =
		build_seeded_test_relay(test_descriptor(&server.base_url()), test_pair("a-1", "r-1")).await;

	// Restore-on-start picked up the persisted pair.
	assert!(relay.is_authenticated());

	let _rejected = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/report").header("authorization", "Bearer a-1");
			then.status(401);
		})
		.await;
	let outage = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(503)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Maintenance window\"}");
		})
		.await;
	let err = relay
		.send(ApiRequest::get("/v1/report"))
		.await
		.expect_err("A refresh outage should fail the request.");

	assert!(matches!(
		err,
		Error::Refresh(RefreshError::Server { status: 503, ref message }) if message == "Maintenance window"
	));
	// Transient failures leave the session recoverable: flag intact, pair untouched.
	assert!(relay.is_authenticated());
	assert_eq!(
		store.fetch().await.expect("Store fetch should succeed."),
		Some(test_pair("a-1", "r-1")),
	);

	outage.assert_async().await;
	outage.delete_async().await;

	// The outage clears; the next expiry leads a brand-new round and succeeds.
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh").body("{\"refresh_token\":\"r-1\"}");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"a-2\",\"refresh_token\":\"r-2\"}");
		})
		.await;
	let replayed = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/report").header("authorization", "Bearer a-2");
			then.status(200).body("{}");
		})
		.await;
	let response = relay
		.send(ApiRequest::get("/v1/report"))
		.await
		.expect("The request should succeed once the endpoint recovers.");

	assert_eq!(response.status, StatusCode::OK);
	assert_eq!(
		store.fetch().await.expect("Store fetch should succeed."),
		Some(test_pair("a-2", "r-2")),
	);
	assert_eq!(relay.refresh_metrics.rounds(), 2);
	assert_eq!(relay.refresh_metrics.failures(), 1);
	assert_eq!(relay.refresh_metrics.successes(), 1);

	refresh.assert_async().await;
	replayed.assert_async().await;
}

#[tokio::test]
async fn rejected_refresh_invalidates_session_for_every_caller() {
	let server = MockServer::start_async().await;
	let (relay, store) =
		build_seeded_test_relay(test_descriptor(&server.base_url()), test_pair("a-1", "r-1")).await;

	assert!(relay.is_authenticated());

	let _rejected = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/items");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh");
			then.status(401)
				.header("content-type", "application/json")
				.body("{\"detail\":\"Refresh token expired\"}")
				.delay(Duration::from_millis(100));
		})
		.await;
	let (first, second) = tokio::join!(
		relay.send(ApiRequest::get("/v1/items")),
		relay.send(ApiRequest::get("/v1/items")),
	);

	for outcome in [first, second] {
		let err = outcome.expect_err("Both callers should observe the rejected rotation.");

		assert!(matches!(
			err,
			Error::Refresh(RefreshError::InvalidRefreshToken { ref reason })
				if reason == "Refresh token expired"
		));
	}

	assert!(!relay.is_authenticated());
	assert_eq!(store.fetch().await.expect("Store fetch should succeed."), None);

	refresh.assert_calls_async(1).await;
}

#[tokio::test]
async fn sequential_expiries_rotate_the_pair_each_time() {
	let server = MockServer::start_async().await;
	let (relay, store) =
		build_seeded_test_relay(test_descriptor(&server.base_url()), test_pair("a-1", "r-1")).await;

	for (stale, rotated) in [(("a-1", "r-1"), ("a-2", "r-2")), (("a-2", "r-2"), ("a-3", "r-3"))] {
		let rejected = server
			.mock_async(|when, then| {
				when.method(GET)
					.path("/v1/profile")
					.header("authorization", format!("Bearer {}", stale.0));
				then.status(401);
			})
			.await;
		let refresh = server
			.mock_async(|when, then| {
				when.method(POST)
					.path("/auth/refresh")
					.body(format!("{{\"refresh_token\":\"{}\"}}", stale.1));
				then.status(200).header("content-type", "application/json").body(format!(
					"{{\"access_token\":\"{}\",\"refresh_token\":\"{}\"}}",
					rotated.0, rotated.1,
				));
			})
			.await;
		let replayed = server
			.mock_async(|when, then| {
				when.method(GET)
					.path("/v1/profile")
					.header("authorization", format!("Bearer {}", rotated.0));
				then.status(200).body("{}");
			})
			.await;
		let response = relay
			.send(ApiRequest::get("/v1/profile"))
			.await
			.expect("Each expiry should rotate and replay successfully.");

		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(
			store.fetch().await.expect("Store fetch should succeed."),
			Some(test_pair(rotated.0, rotated.1)),
		);

		rejected.assert_async().await;
		refresh.assert_async().await;
		replayed.assert_async().await;

		rejected.delete_async().await;
		refresh.delete_async().await;
		replayed.delete_async().await;
	}

	assert_eq!(relay.refresh_metrics.rounds(), 2);
	assert_eq!(relay.refresh_metrics.successes(), 2);
}
