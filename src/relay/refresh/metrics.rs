// std
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing refresh-round behavior.
///
/// All counters use relaxed ordering; they are observability data, not synchronization.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
	attempts: AtomicU64,
	coalesced: AtomicU64,
	rounds: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
}
impl RefreshMetrics {
	/// Total number of callers that asked for fresh credentials.
	pub fn attempts(&self) -> u64 {
		self.attempts.load(Ordering::Relaxed)
	}

	/// Callers that joined a live round instead of leading their own.
	pub fn coalesced(&self) -> u64 {
		self.coalesced.load(Ordering::Relaxed)
	}

	/// Rounds that reached the refresh endpoint and spent the refresh credential.
	pub fn rounds(&self) -> u64 {
		self.rounds.load(Ordering::Relaxed)
	}

	/// Rounds resolved with a credential pair, store short-circuits included.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Rounds resolved with an error.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	pub(crate) fn record_attempt(&self) {
		self.attempts.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_coalesced(&self) {
		self.coalesced.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_round(&self) {
		self.rounds.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self) {
		self.success.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn counters_accumulate_independently() {
		let metrics = RefreshMetrics::default();

		metrics.record_attempt();
		metrics.record_attempt();
		metrics.record_attempt();
		metrics.record_coalesced();
		metrics.record_coalesced();
		metrics.record_round();
		metrics.record_success();

		assert_eq!(metrics.attempts(), 3);
		assert_eq!(metrics.coalesced(), 2);
		assert_eq!(metrics.rounds(), 1);
		assert_eq!(metrics.successes(), 1);
		assert_eq!(metrics.failures(), 0);
	}
}
