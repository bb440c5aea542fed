//! Rust's drop-in bearer-session relay - attach credentials to every call, collapse concurrent
//! 401s into one refresh round, and keep session state honest in one crate built for production.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod exchange;
pub mod http;
pub mod obs;
pub mod relay;
pub mod service;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::CredentialPair,
		http::ReqwestTransport,
		relay::Relay,
		service::ServiceDescriptor,
		store::{CredentialStore, MemoryStore},
	};

	/// Builds a reqwest transport that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_transport() -> ReqwestTransport {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestTransport::with_client(client)
	}

	/// Descriptor pointed at a mock server base URL, with the crate's default endpoint paths.
	pub fn test_descriptor(base_url: &str) -> ServiceDescriptor {
		let base_url = Url::parse(base_url).expect("Failed to parse test base URL.");

		ServiceDescriptor::builder(base_url).build().expect("Failed to build test descriptor.")
	}

	/// Credential pair fixture.
	pub fn test_pair(access: &str, refresh: &str) -> CredentialPair {
		CredentialPair::new(access, refresh).expect("Failed to build test credential pair.")
	}

	/// Constructs a [`Relay`] backed by an in-memory store and the insecure reqwest transport
	/// used across integration tests.
	pub async fn build_test_relay(descriptor: ServiceDescriptor) -> (Relay, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let relay = Relay::with_transport(store, descriptor, Arc::new(test_reqwest_transport()))
			.await
			.expect("Failed to build test relay.");

		(relay, store_backend)
	}

	/// Like [`build_test_relay`], but persists `pair` before construction so restore-on-start
	/// leaves the relay authenticated.
	pub async fn build_seeded_test_relay(
		descriptor: ServiceDescriptor,
		pair: CredentialPair,
	) -> (Relay, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());

		store_backend.save(pair).await.expect("Failed to seed the test store.");

		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let relay = Relay::with_transport(store, descriptor, Arc::new(test_reqwest_transport()))
			.await
			.expect("Failed to build test relay.");

		(relay, store_backend)
	}
}

mod _prelude {
	pub use std::{
		borrow::Cow,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use async_lock::OnceCell;
	pub use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {bearer_relay as _, color_eyre as _, httpmock as _};
