//! High-level relay assembly and its flow orchestrators.

pub mod refresh;

mod login;
mod send;

pub use refresh::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{SessionInvalidator, SessionState},
	exchange::CredentialRefresher,
	http::HttpTransport,
	relay::refresh::RefreshCoordinator,
	service::ServiceDescriptor,
	store::CredentialStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Issues authenticated requests against one remote service and manages the credential pair
/// behind them.
///
/// The relay owns the transport, credential store, service descriptor, and session handle so the
/// individual flows (send, login, logout, refresh rounds) can focus on their own logic. Clones
/// share all of that state, the refresh coordinator included, so the single-flight guarantee
/// spans every clone in the process.
#[derive(Clone)]
pub struct Relay {
	/// Transport used for every outbound service request.
	pub transport: Arc<dyn HttpTransport>,
	/// Credential store that persists the session pair.
	pub store: Arc<dyn CredentialStore>,
	/// Service descriptor that defines the base URL and lifecycle endpoints.
	pub descriptor: ServiceDescriptor,
	/// Session flag readable by navigation layers.
	pub session: SessionState,
	/// Shared counters describing refresh-round behavior.
	pub refresh_metrics: Arc<RefreshMetrics>,
	invalidator: SessionInvalidator,
	coordinator: Arc<RefreshCoordinator>,
}
impl Relay {
	/// Creates a relay that reuses the caller-provided transport.
	///
	/// Session state is restored from the store: the relay starts authenticated iff a complete
	/// pair is already persisted. A store that cannot be read fails construction.
	pub async fn with_transport(
		store: Arc<dyn CredentialStore>,
		descriptor: ServiceDescriptor,
		transport: Arc<dyn HttpTransport>,
	) -> Result<Self> {
		let restored = store.fetch().await?;
		let session = SessionState::restored(restored.is_some());
		let invalidator = SessionInvalidator::new(store.clone(), session.clone());
		let refresher = CredentialRefresher::new(transport.clone(), &descriptor)?;
		let refresh_metrics = Arc::new(RefreshMetrics::default());
		let coordinator = Arc::new(RefreshCoordinator::new(
			store.clone(),
			refresher,
			invalidator.clone(),
			session.clone(),
			refresh_metrics.clone(),
		));

		Ok(Self {
			transport,
			store,
			descriptor,
			session,
			refresh_metrics,
			invalidator,
			coordinator,
		})
	}

	/// True while the session holds credentials.
	pub fn is_authenticated(&self) -> bool {
		self.session.is_authenticated()
	}
}
#[cfg(feature = "reqwest")]
impl Relay {
	/// Creates a relay with the crate's bundled reqwest transport.
	///
	/// The transport applies the descriptor's baseline timeout, so callers do not need to pass
	/// HTTP handles explicitly. Use [`Relay::with_transport`] to supply a custom stack.
	pub async fn new(
		store: Arc<dyn CredentialStore>,
		descriptor: ServiceDescriptor,
	) -> Result<Self> {
		let transport = Arc::new(ReqwestTransport::from_descriptor(&descriptor)?);

		Self::with_transport(store, descriptor, transport).await
	}
}
impl Debug for Relay {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Relay")
			.field("descriptor", &self.descriptor)
			.field("session", &self.session)
			.field("refresh_metrics", &self.refresh_metrics)
			.finish()
	}
}
