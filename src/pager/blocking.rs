//! Blocking pager
//!
//! Fetch a page, drain it, fetch the next. Each fetch parks the calling
//! thread.

use super::types::{BlockingPageFetcher, PageRequest, PagerOptions, PagerPhase};
use crate::envelope::Metadata;
use crate::error::Result;
use crate::value::Value;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Lazily fetched sequence of items for blocking transports
pub struct BlockingPager {
    fetcher: BlockingPageFetcher,
    first: PageRequest,
    buffer: VecDeque<Value>,
    next_page: Option<String>,
    first_meta: Option<Metadata>,
    loaded: bool,
    stop: bool,
    mark: usize,
}

impl BlockingPager {
    pub fn new(fetcher: BlockingPageFetcher, mut first: PageRequest, options: PagerOptions) -> Self {
        options.apply(&mut first);
        Self {
            fetcher,
            first,
            buffer: VecDeque::new(),
            next_page: None,
            first_meta: None,
            loaded: false,
            stop: false,
            mark: 0,
        }
    }

    fn fetch(&mut self) -> Result<()> {
        let request = match &self.next_page {
            Some(cursor) => PageRequest::cursor(cursor.clone()),
            None => self.first.clone(),
        };
        debug!(
            "Fetching page: path={:?} urn={:?}",
            request.path, request.urn
        );

        let page = (self.fetcher)(request).inspect_err(|e| warn!("Page fetch failed: {}", e))?;
        self.next_page = page.next;
        self.stop = self.next_page.is_none();
        self.buffer.extend(page.items);
        if !self.loaded {
            self.first_meta = Some(page.meta);
            self.loaded = true;
        }
        Ok(())
    }

    /// The `total_count` reported by the first page's metadata
    ///
    /// Loads the first page if nothing has been fetched yet.
    pub fn total_count(&mut self) -> Result<Option<u64>> {
        if !self.loaded {
            self.fetch()?;
        }
        Ok(self.first_meta.as_ref().and_then(Metadata::total_count))
    }

    pub fn phase(&self) -> PagerPhase {
        if !self.buffer.is_empty() {
            PagerPhase::HasData
        } else if self.stop {
            PagerPhase::Exhausted
        } else {
            PagerPhase::Empty
        }
    }

    /// Number of items handed out so far
    pub fn mark(&self) -> usize {
        self.mark
    }

    /// Cursor of the page that will be fetched next
    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }
}

impl Iterator for BlockingPager {
    type Item = Result<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                self.mark += 1;
                return Some(Ok(item));
            }
            if self.stop {
                return None;
            }
            if let Err(e) = self.fetch() {
                return Some(Err(e));
            }
        }
    }
}

impl std::fmt::Debug for BlockingPager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingPager")
            .field("phase", &self.phase())
            .field("mark", &self.mark)
            .field("buffered", &self.buffer.len())
            .field("next_page", &self.next_page)
            .finish_non_exhaustive()
    }
}
