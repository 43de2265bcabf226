//! Authentication module
//!
//! Supports: Basic, static header injection, login-flow session cookie,
//! caller-supplied closures
//!
//! The `Authenticator` mutates each outgoing request before it is sent.
//! Login-flow auth performs its login request once and replays the
//! outcome, cookie or failure, for the lifetime of the authenticator.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{AuthConfig, AuthFn, CustomAuth, OK_LOGIN_CODES};

#[cfg(test)]
mod tests;
