//! Demonstrates logging in against a mock service, issuing an authenticated request, and
//! restoring the session from the persisted pair.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use bearer_relay::{
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
	let login_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/auth/login");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"demo-access\",\"refresh_token\":\"demo-refresh\"}");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/profile").header("authorization", "Bearer demo-access");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"name\":\"Demo User\"}");
		})
		.await;
	let store: Arc<dyn CredentialStore> = Arc::new(MemoryStore::default());
	let descriptor = ServiceDescriptor::builder(Url::parse(&server.base_url())?).build()?;
	let transport = Arc::new(ReqwestTransport::with_client(
		Client::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()?,
	));
	let relay = Relay::with_transport(store.clone(), descriptor.clone(), transport.clone()).await?;

	relay.login("demo", "demo-password").await?;

	println!("Session authenticated: {}.", relay.is_authenticated());

	let response = relay.send(ApiRequest::get("/v1/profile")).await?;

	println!("Profile response: {}.", response.text());

	login_mock.assert_async().await;
	profile_mock.assert_async().await;

	// A second relay sharing the store restores the session without another login.
	let restored = Relay::with_transport(store, descriptor, transport).await?;

	println!("Restored session authenticated: {}.", restored.is_authenticated());

	Ok(())
}
