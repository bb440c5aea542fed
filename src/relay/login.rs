//! Login and logout flows.

// crates.io
use http::header::CONTENT_TYPE;
// self
use crate::{
	_prelude::*,
	exchange,
	http::TransportRequest,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	relay::Relay,
};

impl Relay {
	/// Authenticates with the password grant and persists the issued pair.
	///
	/// The exchange bypasses the pipeline entirely: no bearer is attached and a 401 from the
	/// endpoint is a rejection surfaced as [`Error::LoginRejected`], never a refresh trigger.
	/// On success the pair is stored first, then the session flag flips.
	pub async fn login(&self, username: &str, password: &str) -> Result<()> {
		const KIND: FlowKind = FlowKind::Login;

		let span = FlowSpan::new(KIND, "login");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.exchange_password_grant(username, password)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn exchange_password_grant(&self, username: &str, password: &str) -> Result<()> {
		let url = self.descriptor.login_endpoint()?;
		let body = exchange::password_grant_body(username, password).into_bytes();
		let mut headers = HeaderMap::new();

		headers
			.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-www-form-urlencoded"));

		let request = TransportRequest { url, method: Method::POST, headers, body: Some(body) };
		let response = self.transport.execute(request).await?;

		if !response.is_success() {
			return Err(Error::LoginRejected {
				status: response.status.as_u16(),
				reason: exchange::rejection_reason(&response),
			});
		}

		let pair = exchange::parse_token_grant(&response.body)
			.map_err(|e| Error::ResponseDecode { path: e.path, message: e.message })?;

		self.store.save(pair).await?;
		self.session.authenticate();

		Ok(())
	}

	/// Signs out locally: drops the session flag, then clears the persisted pair.
	///
	/// Idempotent; signing out of an unauthenticated relay is a no-op success.
	pub async fn logout(&self) -> Result<()> {
		const KIND: FlowKind = FlowKind::Logout;

		let span = FlowSpan::new(KIND, "logout");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.invalidator.invalidate()).await.map_err(Error::from);

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
