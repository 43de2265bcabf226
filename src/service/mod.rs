//! Service module
//!
//! A [`Service`] (cooperative) or [`BlockingService`] owns a base address,
//! an adapter and an envelope format, and turns calls like
//! `service.get(&["users", "42"])` into requests whose responses come back
//! unwrapped as [`Record`](crate::envelope::Record)s.
//!
//! # Example
//!
//! ```no_run
//! use syndicate::{PagerOptions, Service};
//!
//! # async fn run() -> syndicate::Result<()> {
//! let service = Service::builder()
//!     .uri("https://api.example.com")
//!     .urn("/api/v1")
//!     .build()?;
//!
//! let user = service.get(&["users", "42"]).await?;
//! let pager = service.get_pager(&["users"], PagerOptions::new().page_size(50))?;
//! while let Some(user) = pager.next().await? {
//!     println!("{user}");
//! }
//! # Ok(())
//! # }
//! ```

mod blocking;
mod client;
mod types;
mod url;

pub use blocking::BlockingService;
pub use client::Service;
pub use types::{RequestConfig, ServiceBuilder};
pub use url::build_url;
