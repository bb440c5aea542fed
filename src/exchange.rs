//! Wire formats shared by the login and refresh exchanges.
//!
//! Both endpoints answer with the same token-grant shape; only the request sides differ. Login
//! submits a password grant as a URL-encoded form, refresh submits the refresh credential as a
//! small JSON document. The [`CredentialRefresher`] is the stateless client for the latter: one
//! network call per invocation, no internal retry, with failures classified into the
//! terminal/transient taxonomy of [`RefreshError`].

// crates.io
use http::header::CONTENT_TYPE;
// self
use crate::{
	_prelude::*,
	auth::{CredentialError, CredentialPair, TokenSecret},
	error::{ConfigError, RefreshError},
	http::{ApiResponse, HttpTransport, TransportRequest},
	service::ServiceDescriptor,
};

const BODY_EXCERPT_LIMIT: usize = 256;

/// Token grant issued by the login and refresh endpoints.
#[derive(Deserialize)]
struct TokenGrant {
	access_token: String,
	refresh_token: String,
}

/// Error body shape used by the service for rejections.
#[derive(Deserialize)]
struct ServiceErrorBody {
	detail: Option<String>,
}

/// Decoding failure with the offending JSON path attached.
pub(crate) struct MalformedGrant {
	pub path: String,
	pub message: String,
}

/// Stateless wire client for the refresh endpoint.
#[derive(Clone)]
pub struct CredentialRefresher {
	transport: Arc<dyn HttpTransport>,
	endpoint: Url,
}
impl CredentialRefresher {
	/// Builds a refresher bound to the descriptor's refresh endpoint.
	pub fn new(
		transport: Arc<dyn HttpTransport>,
		descriptor: &ServiceDescriptor,
	) -> Result<Self, ConfigError> {
		Ok(Self { transport, endpoint: descriptor.refresh_endpoint()? })
	}

	/// Exchanges the refresh credential for a rotated pair.
	///
	/// Exactly one network call; rotation, persistence, and fan-out belong to the caller.
	pub async fn refresh(&self, refresh: &TokenSecret) -> Result<CredentialPair, RefreshError> {
		let body =
			serde_json::json!({ "refresh_token": refresh.expose() }).to_string().into_bytes();
		let mut headers = HeaderMap::new();

		headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

		let request = TransportRequest {
			url: self.endpoint.clone(),
			method: Method::POST,
			headers,
			body: Some(body),
		};
		let response = self
			.transport
			.execute(request)
			.await
			.map_err(|e| RefreshError::Network { message: e.to_string() })?;

		if !response.is_success() {
			return Err(refresh_failure(&response));
		}

		parse_token_grant(&response.body)
			.map_err(|e| RefreshError::MalformedResponse { path: e.path, message: e.message })
	}
}
impl Debug for CredentialRefresher {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialRefresher")
			.field("endpoint", &self.endpoint.as_str())
			.finish_non_exhaustive()
	}
}

/// Password-grant form body submitted to the login endpoint.
///
/// The trailing empty fields are part of the service's expected layout.
pub(crate) fn password_grant_body(username: &str, password: &str) -> String {
	url::form_urlencoded::Serializer::new(String::new())
		.append_pair("grant_type", "password")
		.append_pair("username", username)
		.append_pair("password", password)
		.append_pair("scope", "")
		.append_pair("client_id", "")
		.append_pair("client_secret", "")
		.finish()
}

/// Decodes a 2xx token-grant body into a validated pair.
pub(crate) fn parse_token_grant(body: &[u8]) -> Result<CredentialPair, MalformedGrant> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);
	let grant: TokenGrant =
		serde_path_to_error::deserialize(&mut deserializer).map_err(|e| MalformedGrant {
			path: e.path().to_string(),
			message: e.inner().to_string(),
		})?;

	CredentialPair::new(grant.access_token, grant.refresh_token).map_err(|e| MalformedGrant {
		path: match e {
			CredentialError::EmptyAccess => "access_token".into(),
			CredentialError::EmptyRefresh => "refresh_token".into(),
		},
		message: e.to_string(),
	})
}

/// Human-readable reason extracted from a rejection response.
pub(crate) fn rejection_reason(response: &ApiResponse) -> String {
	if let Ok(ServiceErrorBody { detail: Some(detail) }) = serde_json::from_slice(&response.body) {
		return detail;
	}

	let excerpt = body_excerpt(&response.body);

	if excerpt.is_empty() {
		response.status.canonical_reason().unwrap_or("no response body").into()
	} else {
		excerpt
	}
}

fn refresh_failure(response: &ApiResponse) -> RefreshError {
	let status = response.status.as_u16();

	match status {
		// The service answers credential rejections with 401/403, and some deployments report
		// malformed or expired refresh bodies as 400. All three mean the credential is dead.
		400 | 401 | 403 => RefreshError::InvalidRefreshToken { reason: rejection_reason(response) },
		_ => RefreshError::Server { status, message: rejection_reason(response) },
	}
}

fn body_excerpt(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);
	let trimmed = text.trim();
	let mut chars = trimmed.chars();
	let excerpt: String = chars.by_ref().take(BODY_EXCERPT_LIMIT).collect();

	if chars.next().is_some() { format!("{excerpt}...") } else { excerpt }
}
