//! Credential models and session-state primitives.

pub mod credential;
pub mod session;

pub use credential::*;
pub use session::*;
