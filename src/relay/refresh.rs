//! Single-flight refresh rounds shared by every concurrent expiry discovery.
//!
//! The pipeline calls [`RefreshCoordinator::fresh_credentials`] after a request comes back 401.
//! The first caller in becomes the leader of a new round; callers arriving while that round is
//! live join it as followers and perform no network work of their own. The round body runs on a
//! detached task, so a caller that gives up (timeout, dropped future) never cancels the rotation
//! for everyone else. Its outcome is published exactly once through a [`OnceCell`] and observed
//! by every waiter as a clone.

mod metrics;

pub use metrics::RefreshMetrics;

// self
use crate::{
	_prelude::*,
	auth::{CredentialPair, SessionInvalidator, SessionState, TokenSecret},
	error::RefreshError,
	exchange::CredentialRefresher,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::CredentialStore,
};

const KIND: FlowKind = FlowKind::Refresh;

/// Outcome shared verbatim by the leader and every follower of a round.
pub(crate) type RoundOutcome = Result<CredentialPair, RefreshError>;

/// One refresh attempt awaited by a leader and any number of followers.
#[derive(Default)]
struct RefreshRound {
	outcome: OnceCell<RoundOutcome>,
}

/// Collapses concurrent expiry discoveries into at most one refresh call per round.
pub(crate) struct RefreshCoordinator {
	store: Arc<dyn CredentialStore>,
	refresher: CredentialRefresher,
	invalidator: SessionInvalidator,
	session: SessionState,
	metrics: Arc<RefreshMetrics>,
	round: Mutex<Option<Arc<RefreshRound>>>,
}
impl RefreshCoordinator {
	pub(crate) fn new(
		store: Arc<dyn CredentialStore>,
		refresher: CredentialRefresher,
		invalidator: SessionInvalidator,
		session: SessionState,
		metrics: Arc<RefreshMetrics>,
	) -> Self {
		Self { store, refresher, invalidator, session, metrics, round: Mutex::new(None) }
	}

	/// Returns credentials expected to survive a replay after `stale` was rejected.
	///
	/// `stale` is the access credential the failed request carried, [`None`] when it went out
	/// bare. Cancelling this future abandons the wait only; the round it joined keeps running.
	pub(crate) async fn fresh_credentials(
		self: &Arc<Self>,
		stale: Option<&TokenSecret>,
	) -> RoundOutcome {
		self.metrics.record_attempt();

		let (round, is_leader) = self.join_or_lead();

		if is_leader {
			self.spawn_round(round.clone(), stale.cloned());
		} else {
			self.metrics.record_coalesced();
		}

		round.outcome.wait().await.clone()
	}

	fn join_or_lead(&self) -> (Arc<RefreshRound>, bool) {
		let mut slot = self.round.lock();

		match slot.as_ref() {
			Some(live) => (live.clone(), false),
			None => {
				let round = Arc::new(RefreshRound::default());

				*slot = Some(round.clone());

				(round, true)
			},
		}
	}

	/// Runs the round body on a detached task whose lifetime is independent of any caller.
	fn spawn_round(self: &Arc<Self>, round: Arc<RefreshRound>, stale: Option<TokenSecret>) {
		let coordinator = self.clone();

		tokio::spawn(async move {
			let span = FlowSpan::new(KIND, "refresh_round");

			obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

			// Created before the body runs so an unwinding task still publishes an outcome
			// instead of stranding its waiters.
			let completion = RoundCompletion::new(coordinator.clone(), round);
			let outcome = span.instrument(coordinator.run_round(stale.as_ref())).await;

			completion.resolve(outcome);
		});
	}

	async fn run_round(&self, stale: Option<&TokenSecret>) -> RoundOutcome {
		let Some(current) = self.store.fetch().await? else {
			// Nothing to rotate; the session cannot recover without a new login.
			let _ = self.invalidator.invalidate().await;

			return Err(RefreshError::MissingCredentials);
		};

		// A store that no longer holds the caller's credential means an earlier round rotated
		// past it already; hand out the stored pair without spending the refresh credential.
		if stale.map(TokenSecret::expose) != Some(current.access.expose()) {
			return Ok(current);
		}

		self.metrics.record_round();

		match self.refresher.refresh(&current.refresh).await {
			Ok(rotated) => {
				// Persisted before publication so a waiter re-reading the store observes the
				// rotated pair, never the spent one.
				self.store.save(rotated.clone()).await?;
				self.session.authenticate();

				Ok(rotated)
			},
			Err(e) => {
				if e.is_terminal() {
					let _ = self.invalidator.invalidate().await;
				}

				Err(e)
			},
		}
	}

	fn clear_round(&self, round: &Arc<RefreshRound>) {
		let mut slot = self.round.lock();

		if slot.as_ref().is_some_and(|live| Arc::ptr_eq(live, round)) {
			*slot = None;
		}
	}
}
impl Debug for RefreshCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RefreshCoordinator").field("metrics", &self.metrics).finish()
	}
}

/// Publishes a round outcome exactly once, even when the round task is torn down early.
struct RoundCompletion {
	coordinator: Arc<RefreshCoordinator>,
	round: Arc<RefreshRound>,
	resolved: bool,
}
impl RoundCompletion {
	fn new(coordinator: Arc<RefreshCoordinator>, round: Arc<RefreshRound>) -> Self {
		Self { coordinator, round, resolved: false }
	}

	fn resolve(mut self, outcome: RoundOutcome) {
		self.publish(outcome);
	}

	fn publish(&mut self, outcome: RoundOutcome) {
		self.resolved = true;

		match &outcome {
			Ok(_) => {
				self.coordinator.metrics.record_success();

				obs::record_flow_outcome(KIND, FlowOutcome::Success);
			},
			Err(_) => {
				self.coordinator.metrics.record_failure();

				obs::record_flow_outcome(KIND, FlowOutcome::Failure);
			},
		}

		// The slot empties before the broadcast so a caller arriving afterwards leads a fresh
		// round instead of joining a resolved one.
		self.coordinator.clear_round(&self.round);

		let _ = self.round.outcome.set_blocking(outcome);
	}
}
impl Drop for RoundCompletion {
	fn drop(&mut self) {
		if !self.resolved {
			self.publish(Err(RefreshError::Interrupted));
		}
	}
}
