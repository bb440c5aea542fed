//! Demonstrates three concurrent 401 discoveries collapsing into a single refresh round.

// std
use std::{sync::Arc, time::Duration};
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use bearer_relay::{
	auth::CredentialPair,
	http::{ApiRequest, ReqwestTransport},
	relay::Relay,
	reqwest::Client,
	service::ServiceDescriptor,
	store::{CredentialStore, MemoryStore},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let expired = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/reports").header("authorization", "Bearer stale-access");
			then.status(401);
		})
		.await;
	let refresh = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/refresh").body("{\"refresh_token\":\"live-refresh\"}");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"fresh-access\",\"refresh_token\":\"next-refresh\"}")
				.delay(Duration::from_millis(200));
		})
		.await;
	let fresh = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/reports").header("authorization", "Bearer fresh-access");
			then.status(200).header("content-type", "application/json").body("[\"q1\",\"q2\"]");
		})
		.await;
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());

	store.save(CredentialPair::new("stale-access", "live-refresh")?).await?;

	let descriptor = ServiceDescriptor::builder(Url::parse(&server.base_url())?).build()?;
	let transport = Arc::new(ReqwestTransport::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	));
	let relay = Relay::with_transport(store, descriptor, transport).await?;
	let (first, second, third) = tokio::join!(
		relay.send(ApiRequest::get("/v1/reports")),
		relay.send(ApiRequest::get("/v1/reports")),
		relay.send(ApiRequest::get("/v1/reports")),
	);

	for response in [first?, second?, third?] {
		println!("Report fetch returned {}.", response.status);
	}

	refresh.assert_calls_async(1).await;
	fresh.assert_calls_async(3).await;

	println!("Stale dispatches observed: {}.", expired.calls_async().await);

	let metrics = &relay.refresh_metrics;

	println!(
		"Refresh rounds: {} network call(s) served {} caller(s), {} coalesced.",
		metrics.rounds(),
		metrics.attempts(),
		metrics.coalesced(),
	);

	Ok(())
}
