//! Adapter traits
//!
//! `Adapter` is the capability set every transport shares (headers,
//! cookies, shutdown). `AsyncTransport` and `BlockingTransport` add the
//! request operation for the cooperative and blocking scheduling models.

use super::types::{parse_header, OutgoingRequest, Response};
use crate::error::{Error, Result};
use crate::pager::{
    BlockingPageFetcher, BlockingPager, PageFetcher, PageRequest, Pager, PagerOptions,
};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

/// Header and cookie state attached to every request from one adapter
#[derive(Debug, Default)]
pub struct SessionState {
    headers: RwLock<HeaderMap>,
    cookies: RwLock<BTreeMap<String, String>>,
    closed: AtomicBool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_header(&self, name: &str, value: &str) -> Result<()> {
        let (name, value) = parse_header(name, value)?;
        self.headers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
        Ok(())
    }

    fn get_header(&self, name: &str) -> Result<String> {
        let headers = self.headers.read().unwrap_or_else(PoisonError::into_inner);
        let value = headers.get(name).ok_or_else(|| Error::MissingHeader {
            name: name.to_string(),
        })?;
        value
            .to_str()
            .map(str::to_string)
            .map_err(|e| Error::invalid_header(name, e))
    }

    fn set_cookie(&self, name: &str, value: &str) {
        self.cookies
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), value.to_string());
    }

    fn get_cookie(&self, name: &str) -> Result<String> {
        self.cookies
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| Error::MissingCookie {
                name: name.to_string(),
            })
    }

    /// Merge session headers and cookies into a request
    ///
    /// Headers already on the request win over session headers.
    pub fn prepare(&self, request: &mut OutgoingRequest) -> Result<()> {
        {
            let headers = self.headers.read().unwrap_or_else(PoisonError::into_inner);
            for (name, value) in headers.iter() {
                if !request.headers.contains_key(name) {
                    request.headers.insert(name.clone(), value.clone());
                }
            }
        }

        let cookies = self.cookies.read().unwrap_or_else(PoisonError::into_inner);
        if !cookies.is_empty() {
            let rendered = cookies
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join("; ");
            request.add_cookies(&rendered)?;
        }
        Ok(())
    }

    fn close(&self) -> bool {
        !self.closed.swap(true, Ordering::SeqCst)
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Capability set shared by all transport adapters
pub trait Adapter: Send + Sync {
    /// Session state owned by this adapter
    fn session(&self) -> &SessionState;

    /// Set a header that will be included in every request
    fn set_header(&self, name: &str, value: &str) -> Result<()> {
        self.session().set_header(name, value)
    }

    /// Examine a header that would be included in every request
    fn get_header(&self, name: &str) -> Result<String> {
        self.session().get_header(name)
    }

    /// Set a session cookie
    fn set_cookie(&self, name: &str, value: &str) {
        self.session().set_cookie(name, value);
    }

    /// Examine a session cookie
    fn get_cookie(&self, name: &str) -> Result<String> {
        self.session().get_cookie(name)
    }

    /// Shut the adapter down; later requests fail with `Error::Closed`.
    /// Returns `true` on the first call only.
    fn close(&self) -> bool {
        self.session().close()
    }

    fn is_closed(&self) -> bool {
        self.session().is_closed()
    }
}

/// Transport built on the cooperative event loop
///
/// `request` suspends only at its own await points.
#[async_trait]
pub trait AsyncTransport: Adapter {
    /// Send one request and return the uniform response record
    ///
    /// Transport failures are reported in `Response::error`; `Err` is
    /// reserved for failures before sending (closed adapter,
    /// authentication, body encoding).
    async fn request(&self, request: OutgoingRequest) -> Result<Response>;

    /// Create a pager that reads pages through `fetcher`
    fn get_pager(&self, fetcher: PageFetcher, first: PageRequest, options: PagerOptions) -> Pager {
        Pager::new(fetcher, first, options)
    }
}

/// Transport built on blocking I/O
///
/// `request` suspends the calling thread until the response arrives.
pub trait BlockingTransport: Adapter {
    /// Send one request and return the uniform response record
    fn request(&self, request: OutgoingRequest) -> Result<Response>;

    /// Create a pager that reads pages through `fetcher`
    fn get_pager(
        &self,
        fetcher: BlockingPageFetcher,
        first: PageRequest,
        options: PagerOptions,
    ) -> BlockingPager {
        BlockingPager::new(fetcher, first, options)
    }
}
