// std
use std::sync::Arc;
// crates.io
use http::{HeaderMap, Method, StatusCode, header::AUTHORIZATION};
use parking_lot::Mutex;
use url::Url;
// self
use bearer_relay::{
	auth::CredentialPair,
	error::{Error, RefreshError},
	http::{ApiRequest, ApiResponse, HttpTransport, TransportFuture, TransportRequest},
	relay::Relay,
	service::ServiceDescriptor,
	store::{CredentialStore, MemoryStore, StoreError, StoreFuture},
};

/// Transport stub that records every dispatched request and answers by path.
struct RecordingTransport {
	api_status: StatusCode,
	requests: Mutex<Vec<TransportRequest>>,
}
impl RecordingTransport {
	fn new(api_status: StatusCode) -> Arc<Self> {
		Arc::new(Self { api_status, requests: Mutex::new(Vec::new()) })
	}

	fn recorded(&self) -> Vec<TransportRequest> {
		self.requests.lock().clone()
	}
}
impl HttpTransport for RecordingTransport {
	fn execute(&self, request: TransportRequest) -> TransportFuture<'_> {
		Box::pin(async move {
			let (status, body) = match request.url.path() {
				"/auth/login" => (
					StatusCode::OK,
					b"{\"access_token\":\"a-1\",\"refresh_token\":\"r-1\"}".to_vec(),
				),
				_ => (self.api_status, Vec::new()),
			};

			self.requests.lock().push(request);

			Ok(ApiResponse { status, headers: HeaderMap::new(), body })
		})
	}
}

/// Store stub whose every operation fails, mimicking a locked platform keychain.
struct FailingStore;
impl CredentialStore for FailingStore {
	fn save(&self, _: CredentialPair) -> StoreFuture<'_, ()> {
		Box::pin(async { Err(StoreError::Unavailable { message: "Keychain locked".into() }) })
	}

	fn fetch(&self) -> StoreFuture<'_, Option<CredentialPair>> {
		Box::pin(async { Err(StoreError::Unavailable { message: "Keychain locked".into() }) })
	}

	fn clear(&self) -> StoreFuture<'_, ()> {
		Box::pin(async { Err(StoreError::Unavailable { message: "Keychain locked".into() }) })
	}
}

fn descriptor() -> ServiceDescriptor {
	ServiceDescriptor::builder(
		Url::parse("https://svc.example.com").expect("Hardcoded URL should parse."),
	)
	.build()
	.expect("Default descriptor should validate.")
}

fn pair(access: &str, refresh: &str) -> CredentialPair {
	CredentialPair::new(access, refresh).expect("Test credentials should be non-empty.")
}

async fn build_relay(transport: Arc<RecordingTransport>) -> (Relay, Arc<MemoryStore>) {
	let backend = Arc::new(MemoryStore::default());
	let store: Arc<dyn CredentialStore> = backend.clone();
	let relay = Relay::with_transport(store, descriptor(), transport)
		.await
		.expect("Relay construction should succeed.");

	(relay, backend)
}

#[tokio::test]
async fn login_requests_never_carry_a_bearer() {
	let transport = RecordingTransport::new(StatusCode::OK);
	let (relay, store) = build_relay(transport.clone()).await;

	// Even with a stored pair, traffic to the login endpoint stays bare.
	store.save(pair("a-0", "r-0")).await.expect("Seeding the store should succeed.");

	relay.login("alice", "p@ss word").await.expect("Login should succeed.");

	let response = relay
		.send(ApiRequest::post("/auth/login"))
		.await
		.expect("Login-path requests should dispatch.");

	assert_eq!(response.status, StatusCode::OK);

	let recorded = transport.recorded();

	assert_eq!(recorded.len(), 2);

	for request in &recorded {
		assert_eq!(request.method, Method::POST);
		assert_eq!(request.url.path(), "/auth/login");
		assert!(!request.headers.contains_key(AUTHORIZATION));
	}
	assert_eq!(
		recorded[0].body.as_deref(),
		Some(
			"grant_type=password&username=alice&password=p%40ss+word&scope=&client_id=&client_secret="
				.as_bytes(),
		),
	);
}

#[tokio::test]
async fn missing_credentials_surface_without_touching_refresh_endpoint() {
	let transport = RecordingTransport::new(StatusCode::UNAUTHORIZED);
	let (relay, _) = build_relay(transport.clone()).await;
	let err = relay
		.send(ApiRequest::get("/v1/profile"))
		.await
		.expect_err("A 401 without any stored pair cannot recover.");

	assert!(matches!(err, Error::Refresh(RefreshError::MissingCredentials)));
	assert!(!relay.is_authenticated());

	let recorded = transport.recorded();

	// One bare dispatch; the refresh endpoint is never consulted.
	assert_eq!(recorded.len(), 1);
	assert_eq!(recorded[0].url.path(), "/v1/profile");
	assert!(!recorded[0].headers.contains_key(AUTHORIZATION));
}

#[tokio::test]
async fn unreadable_store_fails_relay_construction() {
	let transport = RecordingTransport::new(StatusCode::OK);
	let err = Relay::with_transport(Arc::new(FailingStore), descriptor(), transport)
		.await
		.expect_err("An unreadable store should fail construction.");

	assert!(matches!(
		err,
		Error::Storage(StoreError::Unavailable { ref message }) if message == "Keychain locked"
	));
}
