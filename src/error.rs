//! Relay-level error types shared across the pipeline, exchanges, and stores.

// self
use crate::_prelude::*;

/// Relay-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical relay error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Refresh-round failure surfaced through the pipeline.
	#[error(transparent)]
	Refresh(#[from] RefreshError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Login endpoint rejected the submitted credentials.
	#[error("Login was rejected with status {status}: {reason}.")]
	LoginRejected {
		/// HTTP status code returned by the login endpoint.
		status: u16,
		/// Service-supplied reason string.
		reason: String,
	},
	/// Service returned a body that could not be decoded.
	#[error("Response could not be decoded at `{path}`: {message}.")]
	ResponseDecode {
		/// JSON path of the failing field.
		path: String,
		/// Underlying decoding failure.
		message: String,
	},
	/// The replayed request was rejected again after a successful refresh.
	#[error("Authorization expired and the replayed request was rejected again.")]
	AuthExpiredAfterRetry,
}

/// Configuration and validation failures raised by the relay.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// Endpoint path cannot be resolved against the base URL.
	#[error("Endpoint path cannot be resolved against the base URL.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized as JSON.
	#[error("Request body could not be serialized as JSON.")]
	InvalidJsonBody {
		/// Underlying serialization failure.
		#[source]
		source: serde_json::Error,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Refresh-round failures, fanned out verbatim to every waiter of the round.
///
/// Clonable so a single outcome can be observed by the leader and all followers. Only
/// [`is_terminal`](Self::is_terminal) variants mean the refresh credential itself is dead.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RefreshError {
	/// Refresh endpoint rejected the refresh credential; the session is over.
	#[error("Service rejected the refresh credential: {reason}.")]
	InvalidRefreshToken {
		/// Service-supplied reason string.
		reason: String,
	},
	/// No credential pair was available when the round ran.
	#[error("No credential pair is available to refresh.")]
	MissingCredentials,
	/// Connection-level failure or timeout while calling the refresh endpoint.
	#[error("Network error occurred while refreshing credentials: {message}.")]
	Network {
		/// Transport-supplied message summarizing the failure.
		message: String,
	},
	/// Refresh endpoint answered with an unexpected status.
	#[error("Refresh endpoint returned status {status}: {message}.")]
	Server {
		/// HTTP status code.
		status: u16,
		/// Service-supplied message summarizing the failure.
		message: String,
	},
	/// Refresh endpoint answered 2xx with a body that does not hold a credential pair.
	#[error("Refresh endpoint returned malformed JSON at `{path}`: {message}.")]
	MalformedResponse {
		/// JSON path of the failing field.
		path: String,
		/// Underlying decoding failure.
		message: String,
	},
	/// Storage-layer failure inside the round.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// The round was torn down before it could resolve.
	#[error("Refresh round was interrupted before resolving.")]
	Interrupted,
}
impl RefreshError {
	/// True when the failure means the refresh credential is dead and the session cannot
	/// continue without a fresh login.
	pub fn is_terminal(&self) -> bool {
		matches!(self, Self::InvalidRefreshToken { .. } | Self::MissingCredentials)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The request exceeded the transport's timeout.
	#[error("Request timed out while awaiting the service response.")]
	Timeout,
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the service.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}
