// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Syndicate
//!
//! A thin client for REST APIs that wrap their payloads in a
//! `{"success": bool, "data": ..., "meta": {...}}` envelope.
//!
//! ## Features
//!
//! - **URL Building**: base uri + urn + path segments, optional trailing slash
//! - **Two Transports**: cooperative (tokio) and blocking adapters on reqwest
//! - **Pluggable Serializers**: JSON with ISO-8601 datetime coercion by default
//! - **Auth Strategies**: Basic, header injection, login-then-cookie
//! - **Envelope Unwrapping**: injectable data/meta getters, typed records
//! - **Lazy Pagination**: FIFO pager state machine that follows `meta.next`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use syndicate::{AuthConfig, PagerOptions, Service};
//!
//! #[tokio::main]
//! async fn main() -> syndicate::Result<()> {
//!     let service = Service::builder()
//!         .uri("https://api.example.com")
//!         .urn("/api/v1")
//!         .auth(AuthConfig::header("X-API-Key", "secret"))
//!         .build()?;
//!
//!     let account = service.get(&["account"]).await?;
//!
//!     let invoices = service.get_pager(&["invoices"], PagerOptions::new().page_size(100))?;
//!     while let Some(invoice) = invoices.next().await? {
//!         println!("{invoice}");
//!     }
//!
//!     service.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! caller ─► Service::get/post/... ─► build_url ─► Transport::request
//!                                                      │
//!            Record ◄── Envelope::ingress_filter ◄── Response
//!
//! Service::get_pager ─► Pager ─► (fetch page ─► Record ─► Page)*
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Decoded body values
pub mod value;

/// Common HTTP types
pub mod types;

/// Body serializers
pub mod serialize;

/// HTTP transport adapters
pub mod transport;

/// Authentication strategies
pub mod auth;

/// Response envelope unwrapping
pub mod envelope;

/// Services
pub mod service;

/// Lazy pagination
pub mod pager;

/// YAML service configuration
pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result, ResultExt};
pub use types::*;
pub use value::{Map, Value};

pub use auth::AuthConfig;
pub use config::{load_config, ServiceConfig};
pub use envelope::{Envelope, Metadata, Record};
pub use pager::{BlockingPager, Pager, PagerOptions};
pub use serialize::{JsonSerializer, Serializer, SerializerRegistry};
pub use service::{BlockingService, RequestConfig, Service, ServiceBuilder};
pub use transport::{Adapter, AdapterConfig, AsyncTransport, BlockingTransport, Response};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
