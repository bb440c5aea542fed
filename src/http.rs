//! Transport primitives for relay request dispatch.
//!
//! The module exposes [`HttpTransport`] as the relay's only dependency on an HTTP stack,
//! together with the request/response value types that cross it. [`ApiRequest`] is what callers
//! hand to the pipeline (service-relative path, no credentials); [`TransportRequest`] is the
//! fully resolved form the pipeline hands to the transport, bearer attached. Responses come back
//! raw: the pipeline interprets only the 401 status, everything else belongs to the caller.

// std
use std::ops::Deref;
// crates.io
use http::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// Boxed future returned by [`HttpTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<ApiResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of dispatching relay requests.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared behind
/// `Arc<dyn HttpTransport>` across relay clones and detached refresh rounds. One call to
/// [`execute`](Self::execute) performs exactly one HTTP exchange; the relay owns every retry
/// decision, so implementations must not retry or follow authentication challenges themselves.
pub trait HttpTransport
where
	Self: 'static + Send + Sync,
{
	/// Dispatches a single HTTP exchange and resolves with the raw response.
	fn execute(&self, request: TransportRequest) -> TransportFuture<'_>;
}

/// Fully resolved request handed to the transport layer.
#[derive(Clone, Debug)]
pub struct TransportRequest {
	/// Absolute URL of the exchange.
	pub url: Url,
	/// HTTP method.
	pub method: Method,
	/// Complete header set, including any bearer attachment.
	pub headers: HeaderMap,
	/// Raw body bytes, if the request carries one.
	pub body: Option<Vec<u8>>,
}

/// Caller-facing request addressed by a service-relative path.
#[derive(Clone, Debug)]
pub struct ApiRequest {
	/// HTTP method.
	pub method: Method,
	/// Service-relative path, e.g. `/projects`.
	pub path: String,
	/// Additional headers; the pipeline adds the bearer on top of these.
	pub headers: HeaderMap,
	/// Raw body bytes, if the request carries one.
	pub body: Option<Vec<u8>>,
}
impl ApiRequest {
	/// Creates a request for an arbitrary method.
	pub fn new(method: Method, path: impl Into<String>) -> Self {
		Self { method, path: path.into(), headers: HeaderMap::new(), body: None }
	}

	/// Creates a GET request.
	pub fn get(path: impl Into<String>) -> Self {
		Self::new(Method::GET, path)
	}

	/// Creates a POST request.
	pub fn post(path: impl Into<String>) -> Self {
		Self::new(Method::POST, path)
	}

	/// Creates a PUT request.
	pub fn put(path: impl Into<String>) -> Self {
		Self::new(Method::PUT, path)
	}

	/// Creates a PATCH request.
	pub fn patch(path: impl Into<String>) -> Self {
		Self::new(Method::PATCH, path)
	}

	/// Creates a DELETE request.
	pub fn delete(path: impl Into<String>) -> Self {
		Self::new(Method::DELETE, path)
	}

	/// Adds a header to the request.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Serializes `payload` as the JSON body and sets the content type.
	pub fn with_json<T>(self, payload: &T) -> Result<Self>
	where
		T: ?Sized + Serialize,
	{
		let body = serde_json::to_vec(payload)
			.map_err(|e| ConfigError::InvalidJsonBody { source: e })?;

		Ok(self.with_body(HeaderValue::from_static("application/json"), body))
	}

	/// Sets a raw body with an explicit content type.
	pub fn with_body(mut self, content_type: HeaderValue, body: Vec<u8>) -> Self {
		self.headers.insert(CONTENT_TYPE, content_type);
		self.body = Some(body);

		self
	}
}

/// Raw response surfaced by the pipeline.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: StatusCode,
	/// Response headers.
	pub headers: HeaderMap,
	/// Raw body bytes.
	pub body: Vec<u8>,
}
impl ApiResponse {
	/// True for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Body rendered as lossy UTF-8 text.
	pub fn text(&self) -> Cow<'_, str> {
		String::from_utf8_lossy(&self.body)
	}

	/// Decodes the body as JSON, reporting the failing path on error.
	pub fn json<T>(&self) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut deserializer = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut deserializer).map_err(|e| Error::ResponseDecode {
			path: e.path().to_string(),
			message: e.inner().to_string(),
		})
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The bundled transport applies the descriptor's baseline timeout when built via
/// [`from_descriptor`](Self::from_descriptor); a client supplied through
/// [`with_client`](Self::with_client) is used as-is.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client configured with the descriptor's baseline timeout.
	pub fn from_descriptor(
		descriptor: &crate::service::ServiceDescriptor,
	) -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().timeout(descriptor.request_timeout).build()?;

		Ok(Self(client))
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl HttpTransport for ReqwestTransport {
	fn execute(&self, request: TransportRequest) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client.request(request.method, request.url).headers(request.headers);

			if let Some(body) = request.body {
				builder = builder.body(body);
			}

			let response = builder.send().await.map_err(TransportError::from)?;
			let status = response.status();
			let headers = response.headers().to_owned();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(ApiResponse { status, headers, body })
		})
	}
}
