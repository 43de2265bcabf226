//! Pager module
//!
//! Lazy, page-at-a-time iteration over list endpoints.
//!
//! # Overview
//!
//! A pager requests the first page with the original path and query, then
//! follows the `next` cursor from each page's metadata until the remote
//! stops sending one.
//!
//! - [`Pager`]: cooperative state machine. Consumers may request items
//!   faster than pages arrive; their requests queue in FIFO order up to
//!   `max_overflow`, and one fetch runs at a time with read-ahead while
//!   consumers are waiting.
//! - [`BlockingPager`]: an `Iterator` that fetches on the calling thread.

mod blocking;
mod state;
mod types;

pub use blocking::BlockingPager;
pub use state::{NextItem, Pager};
pub use types::{
    BlockingPageFetcher, Page, PageFetcher, PageRequest, PagerOptions, PagerPhase,
    DEFAULT_MAX_OVERFLOW, PAGE_SIZE_PARAM,
};
