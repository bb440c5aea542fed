//! The authenticated request pipeline.

// crates.io
use http::header::AUTHORIZATION;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	error::ConfigError,
	http::{ApiRequest, ApiResponse, TransportRequest},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	relay::Relay,
};

/// Replay budget applied after a completed refresh round.
const MAX_REPLAYS: u8 = 1;

impl Relay {
	/// Sends a request through the authenticated pipeline.
	///
	/// The stored access credential is attached as a bearer when one exists. A 401 response
	/// triggers one shared refresh round (see [`crate::relay::refresh`]) followed by exactly one
	/// replay carrying the rotated credential; a second 401 surfaces
	/// [`Error::AuthExpiredAfterRetry`] without another refresh. Every other status is returned
	/// unchanged for the caller to interpret. Requests that resolve to the login endpoint are
	/// dispatched bare and never trigger refresh handling.
	///
	/// Must run inside a Tokio runtime; refresh rounds execute as detached tasks.
	pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "send");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span.instrument(self.send_with_refresh(request)).await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	async fn send_with_refresh(&self, request: ApiRequest) -> Result<ApiResponse> {
		let url = self.descriptor.endpoint(&request.path)?;

		// Login traffic is exempt: a 401 here means rejected credentials, not an expired
		// session, and must reach the caller untouched.
		if self.descriptor.is_login_endpoint(&url) {
			return self.dispatch(&request, &url, None).await;
		}

		let mut bearer = self.store.fetch().await?.map(|pair| pair.access);
		let mut replays = 0_u8;

		loop {
			let response = self.dispatch(&request, &url, bearer.as_ref()).await?;

			if response.status != StatusCode::UNAUTHORIZED {
				return Ok(response);
			}
			if replays >= MAX_REPLAYS {
				return Err(Error::AuthExpiredAfterRetry);
			}

			bearer = Some(self.coordinator.fresh_credentials(bearer.as_ref()).await?.access);
			replays += 1;
		}
	}

	async fn dispatch(
		&self,
		request: &ApiRequest,
		url: &Url,
		bearer: Option<&TokenSecret>,
	) -> Result<ApiResponse> {
		let mut headers = request.headers.clone();

		if let Some(secret) = bearer {
			headers.insert(AUTHORIZATION, bearer_header(secret)?);
		}

		let transport_request = TransportRequest {
			url: url.clone(),
			method: request.method.clone(),
			headers,
			body: request.body.clone(),
		};

		Ok(self.transport.execute(transport_request).await?)
	}
}

fn bearer_header(secret: &TokenSecret) -> Result<HeaderValue> {
	let mut value = HeaderValue::from_str(&format!("Bearer {}", secret.expose()))
		.map_err(|e| ConfigError::from(http::Error::from(e)))?;

	value.set_sensitive(true);

	Ok(value)
}
