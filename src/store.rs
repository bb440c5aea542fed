//! Storage contracts and built-in credential store implementations.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{_prelude::*, auth::CredentialPair};

/// Persistence contract future type for credential stores.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Durable holder for the session's credential pair.
///
/// The pair is the unit of storage: [`save`](Self::save) replaces both components together, so a
/// concurrent reader observes the old pair, the new pair, or nothing. Never a mix.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Atomically persists or replaces the credential pair.
	fn save(&self, pair: CredentialPair) -> StoreFuture<'_, ()>;

	/// Loads the persisted pair, if one exists.
	fn fetch(&self) -> StoreFuture<'_, Option<CredentialPair>>;

	/// Removes the persisted pair. A no-op success when the store is already empty.
	fn clear(&self) -> StoreFuture<'_, ()>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures (e.g., serde) surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage medium.
	#[error("Storage backend unavailable: {message}.")]
	Unavailable {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_relay_error_with_source() {
		let store_error = StoreError::Unavailable { message: "disk unreachable".into() };
		let relay_error: Error = store_error.clone().into();

		assert!(matches!(relay_error, Error::Storage(_)));
		assert!(relay_error.to_string().contains("disk unreachable"));

		let source = StdError::source(&relay_error)
			.expect("Relay error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
