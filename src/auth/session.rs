//! Shared session flag and the idempotent invalidator.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// self
use crate::{
	_prelude::*,
	obs,
	store::{CredentialStore, StoreError},
};

/// Process-wide authenticated/unauthenticated flag shared across relay clones.
///
/// Navigation layers read [`is_authenticated`](Self::is_authenticated) to decide what to render;
/// the relay flips the flag on login, successful refresh, terminal refresh failure, and logout.
#[derive(Clone, Debug, Default)]
pub struct SessionState(Arc<AtomicBool>);
impl SessionState {
	/// Creates a flag that starts unauthenticated.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a flag seeded from a restored credential snapshot.
	pub fn restored(authenticated: bool) -> Self {
		Self(Arc::new(AtomicBool::new(authenticated)))
	}

	/// True while a complete credential pair backs the session.
	pub fn is_authenticated(&self) -> bool {
		self.0.load(Ordering::Acquire)
	}

	/// Marks the session authenticated; returns whether the flag changed.
	pub(crate) fn authenticate(&self) -> bool {
		!self.0.swap(true, Ordering::AcqRel)
	}

	/// Marks the session unauthenticated; returns whether the flag changed.
	pub(crate) fn deauthenticate(&self) -> bool {
		self.0.swap(false, Ordering::AcqRel)
	}
}

/// Idempotent teardown of the persisted pair plus the session flag.
///
/// The flag flips before storage is touched, so navigation reacts to the sign-out even when the
/// clear itself fails; the storage error still reaches the caller.
#[derive(Clone)]
pub struct SessionInvalidator {
	store: Arc<dyn CredentialStore>,
	session: SessionState,
}
impl SessionInvalidator {
	/// Builds an invalidator around the store and session handle it will tear down.
	pub fn new(store: Arc<dyn CredentialStore>, session: SessionState) -> Self {
		Self { store, session }
	}

	/// Drops the session to unauthenticated and clears the persisted pair.
	///
	/// Safe to call when already signed out.
	pub async fn invalidate(&self) -> Result<(), StoreError> {
		if self.session.deauthenticate() {
			obs::record_session_invalidated();
		}

		self.store.clear().await
	}
}
impl Debug for SessionInvalidator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionInvalidator").field("session", &self.session).finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::CredentialPair, store::MemoryStore};

	#[test]
	fn session_transitions_report_changes() {
		let session = SessionState::new();

		assert!(!session.is_authenticated());
		assert!(session.authenticate());
		assert!(!session.authenticate());
		assert!(session.is_authenticated());
		assert!(session.deauthenticate());
		assert!(!session.deauthenticate());
		assert!(!session.is_authenticated());
	}

	#[test]
	fn restored_session_reflects_snapshot() {
		assert!(SessionState::restored(true).is_authenticated());
		assert!(!SessionState::restored(false).is_authenticated());
	}

	#[tokio::test]
	async fn invalidate_clears_store_and_flag() {
		let store = Arc::new(MemoryStore::default());
		let session = SessionState::restored(true);
		let pair = CredentialPair::new("a-1", "r-1")
			.expect("Pair fixture should be valid for invalidation test.");

		store.save(pair).await.expect("Seeding the store should succeed.");

		let invalidator = SessionInvalidator::new(store.clone(), session.clone());

		invalidator.invalidate().await.expect("Invalidation should succeed.");

		assert!(!session.is_authenticated());
		assert!(store.fetch().await.expect("Store fetch should succeed.").is_none());

		// Running it again is a no-op success.
		invalidator.invalidate().await.expect("Repeated invalidation should succeed.");

		assert!(!session.is_authenticated());
	}
}
