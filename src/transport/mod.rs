//! Transport module
//!
//! Adapters that send one HTTP exchange and return a uniform
//! [`Response`] record.
//!
//! # Features
//!
//! - **Two scheduling models**: [`AsyncAdapter`] on tokio, [`BlockingAdapter`] on threads
//! - **Session state**: headers and cookies attached to every request
//! - **Rate Limiting**: optional token bucket limiter using governor
//! - **Authentication**: strategies from the auth module run before each send

mod adapter;
mod blocking;
mod client;
mod rate_limit;
mod types;

pub use adapter::{Adapter, AsyncTransport, BlockingTransport, SessionState};
pub use blocking::BlockingAdapter;
pub use client::AsyncAdapter;
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use types::{AdapterConfig, AdapterConfigBuilder, OutgoingRequest, Response, TransportInfo};

pub(crate) use types::{parse_header, transport_error};
