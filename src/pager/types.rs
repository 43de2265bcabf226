//! Pager types

use crate::envelope::{Envelope, Metadata, Record};
use crate::error::{Error, Result};
use crate::types::{Query, QueryValue};
use crate::value::Value;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Default bound on queued consumer requests
pub const DEFAULT_MAX_OVERFLOW: usize = 1000;

/// Query parameter carrying the page size on the first request
pub const PAGE_SIZE_PARAM: &str = "page_size";

/// Fetches one page on the cooperative runtime
pub type PageFetcher = Arc<dyn Fn(PageRequest) -> BoxFuture<'static, Result<Page>> + Send + Sync>;

/// Fetches one page on the calling thread
pub type BlockingPageFetcher = Arc<dyn Fn(PageRequest) -> Result<Page> + Send + Sync>;

/// Where to fetch a page from
///
/// The first page uses the original path and query; later pages use the
/// cursor from the previous page as a urn override with no path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub path: Vec<String>,
    pub urn: Option<String>,
    pub query: Query,
}

impl PageRequest {
    pub fn new<I, S>(path: I, query: Query) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            urn: None,
            query,
        }
    }

    /// Request for the page a cursor points at
    pub fn cursor(next: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            urn: Some(next.into()),
            query: Query::new(),
        }
    }

    pub fn is_cursor(&self) -> bool {
        self.urn.is_some()
    }
}

/// One page of items and the cursor to the next
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    /// `None` means this is the last page
    pub next: Option<String>,
    pub meta: Metadata,
}

impl Page {
    pub fn new(items: Vec<Value>, next: Option<String>) -> Self {
        Self {
            items,
            next,
            meta: Metadata::default(),
        }
    }

    /// Build a page from an unwrapped list response
    ///
    /// A null record is an empty last page. Objects and scalars are not
    /// pages.
    pub fn from_record(record: Record, envelope: &Envelope) -> Result<Self> {
        match record {
            Record::Sequence(sequence) => {
                let (items, meta) = sequence.into_parts();
                let next = envelope.next_page(&meta);
                Ok(Self { items, next, meta })
            }
            Record::Null => Ok(Self::default()),
            other => Err(Error::UnexpectedShape {
                expected: "sequence",
                found: other.kind(),
            }),
        }
    }
}

/// Options for a pager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerOptions {
    /// Sent as `page_size` on the first request
    pub page_size: Option<u32>,
    /// Maximum number of consumer requests queued ahead of the data
    pub max_overflow: usize,
}

impl Default for PagerOptions {
    fn default() -> Self {
        Self {
            page_size: None,
            max_overflow: DEFAULT_MAX_OVERFLOW,
        }
    }
}

impl PagerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    #[must_use]
    pub fn max_overflow(mut self, limit: usize) -> Self {
        self.max_overflow = limit;
        self
    }

    /// Add the page size to the first page's query
    pub(crate) fn apply(&self, first: &mut PageRequest) {
        if let Some(size) = self.page_size {
            first
                .query
                .insert(PAGE_SIZE_PARAM, QueryValue::Single(size.to_string()));
        }
    }
}

/// Observable state of a pager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerPhase {
    /// No page buffered and none in flight
    Empty,
    /// A page fetch is in flight
    Fetching,
    /// Items are buffered and can be handed out without waiting
    HasData,
    /// The last page was consumed
    Exhausted,
}
