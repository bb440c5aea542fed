//! Credential pair model and the redacting secret wrapper.

// self
use crate::_prelude::*;

/// Redacted credential wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner credential value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Errors produced while constructing a [`CredentialPair`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum CredentialError {
	/// Issued when the access component is empty or whitespace.
	#[error("Access credential cannot be empty.")]
	EmptyAccess,
	/// Issued when the refresh component is empty or whitespace.
	#[error("Refresh credential cannot be empty.")]
	EmptyRefresh,
}

/// Complete access + refresh credential pair; the unit of storage and rotation.
///
/// A pair is always whole. Constructing one with an empty component fails, so a persisted or
/// published pair never carries half a session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
	/// Short-lived bearer credential attached to outbound requests.
	pub access: TokenSecret,
	/// Longer-lived credential spent at the refresh endpoint; rotates on use.
	pub refresh: TokenSecret,
}
impl CredentialPair {
	/// Builds a validated pair from raw credential values.
	pub fn new(
		access: impl Into<String>,
		refresh: impl Into<String>,
	) -> Result<Self, CredentialError> {
		let access = access.into();
		let refresh = refresh.into();

		if access.trim().is_empty() {
			return Err(CredentialError::EmptyAccess);
		}
		if refresh.trim().is_empty() {
			return Err(CredentialError::EmptyRefresh);
		}

		Ok(Self { access: TokenSecret::new(access), refresh: TokenSecret::new(refresh) })
	}
}
impl Debug for CredentialPair {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialPair")
			.field("access", &"<redacted>")
			.field("refresh", &"<redacted>")
			.finish()
	}
}
