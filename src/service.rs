//! Remote service description consumed by the relay.
//!
//! The descriptor pins down where the service lives and which of its endpoints carry special
//! meaning for the credential lifecycle: the login endpoint (bearer-exempt) and the refresh
//! endpoint (spent by refresh rounds).

// self
use crate::{_prelude::*, error::ConfigError};

/// Baseline request timeout applied by the bundled transport.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const DEFAULT_LOGIN_PATH: &str = "/auth/login";
const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ServiceDescriptorError {
	/// Base URL must use HTTPS.
	#[error("The base URL must use HTTPS: {url}.")]
	InsecureBaseUrl {
		/// Base URL that failed validation.
		url: String,
	},
	/// Endpoint paths are service-absolute.
	#[error("The {endpoint} path must begin with `/`: {path}.")]
	RelativeEndpointPath {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Path value that failed validation.
		path: String,
	},
	/// A zero timeout would fail every request.
	#[error("Request timeout must be greater than zero.")]
	ZeroTimeout,
}

/// Immutable description of the remote service consumed by the relay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
	/// Scheme + authority that every endpoint path is resolved against.
	pub base_url: Url,
	/// Service-absolute path of the login endpoint, exempt from bearer attachment.
	pub login_path: String,
	/// Service-absolute path of the refresh endpoint spent by refresh rounds.
	pub refresh_path: String,
	/// Baseline timeout applied by the bundled transport.
	pub request_timeout: Duration,
}
impl ServiceDescriptor {
	/// Creates a new builder for the provided base URL.
	pub fn builder(base_url: Url) -> ServiceDescriptorBuilder {
		ServiceDescriptorBuilder::new(base_url)
	}

	/// Resolves a service-relative path against the base URL.
	///
	/// Paths beginning with `/` replace any path carried by the base URL.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		self.base_url.join(path).map_err(|e| ConfigError::InvalidEndpoint { source: e })
	}

	/// Resolved login endpoint.
	pub fn login_endpoint(&self) -> Result<Url, ConfigError> {
		self.endpoint(&self.login_path)
	}

	/// Resolved refresh endpoint.
	pub fn refresh_endpoint(&self) -> Result<Url, ConfigError> {
		self.endpoint(&self.refresh_path)
	}

	/// Whether the resolved URL targets the login endpoint.
	///
	/// Requests matching this check are dispatched bare: no bearer attachment, no refresh
	/// handling. The comparison ignores a trailing slash and any query string.
	pub fn is_login_endpoint(&self, url: &Url) -> bool {
		normalized_path(url.path()) == normalized_path(&self.login_path)
	}

	fn validate(&self) -> Result<(), ServiceDescriptorError> {
		if self.base_url.scheme() != "https" {
			return Err(ServiceDescriptorError::InsecureBaseUrl { url: self.base_url.to_string() });
		}

		validate_path("login", &self.login_path)?;
		validate_path("refresh", &self.refresh_path)?;

		if self.request_timeout.is_zero() {
			return Err(ServiceDescriptorError::ZeroTimeout);
		}

		Ok(())
	}
}

/// Builder for [`ServiceDescriptor`] values.
#[derive(Debug)]
pub struct ServiceDescriptorBuilder {
	/// Scheme + authority for the service being described.
	pub base_url: Url,
	/// Login endpoint path; defaults to `/auth/login`.
	pub login_path: String,
	/// Refresh endpoint path; defaults to `/auth/refresh`.
	pub refresh_path: String,
	/// Baseline transport timeout; defaults to 15 seconds.
	pub request_timeout: Duration,
}
impl ServiceDescriptorBuilder {
	/// Creates a new builder seeded with the default endpoint paths and timeout.
	pub fn new(base_url: Url) -> Self {
		Self {
			base_url,
			login_path: DEFAULT_LOGIN_PATH.into(),
			refresh_path: DEFAULT_REFRESH_PATH.into(),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Overrides the login endpoint path.
	pub fn login_path(mut self, path: impl Into<String>) -> Self {
		self.login_path = path.into();

		self
	}

	/// Overrides the refresh endpoint path.
	pub fn refresh_path(mut self, path: impl Into<String>) -> Self {
		self.refresh_path = path.into();

		self
	}

	/// Overrides the baseline transport timeout.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ServiceDescriptor, ServiceDescriptorError> {
		let descriptor = ServiceDescriptor {
			base_url: self.base_url,
			login_path: self.login_path,
			refresh_path: self.refresh_path,
			request_timeout: self.request_timeout,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

fn validate_path(name: &'static str, path: &str) -> Result<(), ServiceDescriptorError> {
	if !path.starts_with('/') {
		Err(ServiceDescriptorError::RelativeEndpointPath { endpoint: name, path: path.into() })
	} else {
		Ok(())
	}
}

fn normalized_path(path: &str) -> &str {
	path.trim_end_matches('/')
}
