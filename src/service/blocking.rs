//! Blocking service

use super::types::{RequestConfig, ServiceBuilder, ServiceCore};
use crate::envelope::Record;
use crate::error::{Error, Result};
use crate::pager::{BlockingPageFetcher, BlockingPager, Page, PageRequest, PagerOptions};
use crate::transport::{Adapter, BlockingAdapter, BlockingTransport};
use crate::types::{Method, Query};
use crate::value::Value;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

struct ServiceInner {
    core: ServiceCore,
    adapter: RwLock<Option<Arc<dyn BlockingTransport>>>,
}

/// A connection to one REST service using blocking I/O
///
/// Every call parks the calling thread until the response arrives.
#[derive(Clone)]
pub struct BlockingService {
    inner: Arc<ServiceInner>,
}

impl BlockingService {
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    fn from_parts(core: ServiceCore, adapter: Arc<dyn BlockingTransport>) -> Result<Self> {
        core.announce(&*adapter)?;
        Ok(Self {
            inner: Arc::new(ServiceInner {
                core,
                adapter: RwLock::new(Some(adapter)),
            }),
        })
    }

    pub fn uri(&self) -> &str {
        &self.inner.core.uri
    }

    pub fn urn(&self) -> &str {
        &self.inner.core.urn
    }

    pub fn url(&self, path: &[&str]) -> String {
        self.inner.core.url(path, None)
    }

    pub fn adapter(&self) -> Result<Arc<dyn BlockingTransport>> {
        self.inner
            .adapter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::Closed)
    }

    pub fn is_closed(&self) -> bool {
        self.adapter().is_err()
    }

    /// Send a request and unwrap the response envelope
    pub fn request(&self, method: Method, path: &[&str], config: RequestConfig) -> Result<Record> {
        let adapter = self.adapter()?;
        let request = self.inner.core.outgoing(method, path, config)?;
        debug!("Service request: {} {}", method, request.url);
        let response = adapter.request(request)?;
        self.inner.core.ingress(response)
    }

    pub fn get(&self, path: &[&str]) -> Result<Record> {
        self.request(Method::GET, path, RequestConfig::new())
    }

    pub fn get_with_config(&self, path: &[&str], config: RequestConfig) -> Result<Record> {
        self.request(Method::GET, path, config)
    }

    pub fn post(&self, path: &[&str], body: impl Into<Value>) -> Result<Record> {
        self.request(Method::POST, path, RequestConfig::new().body(body))
    }

    pub fn post_with_config(&self, path: &[&str], config: RequestConfig) -> Result<Record> {
        self.request(Method::POST, path, config)
    }

    pub fn put(&self, path: &[&str], body: impl Into<Value>) -> Result<Record> {
        self.request(Method::PUT, path, RequestConfig::new().body(body))
    }

    pub fn put_with_config(&self, path: &[&str], config: RequestConfig) -> Result<Record> {
        self.request(Method::PUT, path, config)
    }

    pub fn patch(&self, path: &[&str], body: impl Into<Value>) -> Result<Record> {
        self.request(Method::PATCH, path, RequestConfig::new().body(body))
    }

    pub fn patch_with_config(&self, path: &[&str], config: RequestConfig) -> Result<Record> {
        self.request(Method::PATCH, path, config)
    }

    pub fn delete(&self, path: &[&str]) -> Result<Record> {
        self.request(Method::DELETE, path, RequestConfig::new())
    }

    pub fn delete_with_config(&self, path: &[&str], config: RequestConfig) -> Result<Record> {
        self.request(Method::DELETE, path, config)
    }

    /// Lazily page through a list endpoint
    pub fn get_pager(&self, path: &[&str], options: PagerOptions) -> Result<BlockingPager> {
        self.get_pager_with_query(path, Query::new(), options)
    }

    /// Lazily page through a list endpoint; `query` goes on the first page only
    pub fn get_pager_with_query(
        &self,
        path: &[&str],
        query: Query,
        options: PagerOptions,
    ) -> Result<BlockingPager> {
        let adapter = self.adapter()?;
        let service = self.clone();
        let fetcher: BlockingPageFetcher =
            Arc::new(move |page: PageRequest| service.fetch_page(page));
        let first = PageRequest::new(path.iter().copied(), query);
        Ok(adapter.get_pager(fetcher, first, options))
    }

    fn fetch_page(&self, page: PageRequest) -> Result<Page> {
        let path: Vec<&str> = page.path.iter().map(String::as_str).collect();
        let mut config = RequestConfig::new().query(page.query);
        config.urn = page.urn;
        let record = self.request(Method::GET, &path, config)?;
        Page::from_record(record, &self.inner.core.envelope)
    }

    /// Release the adapter; later calls fail with `Error::Closed`
    pub fn close(&self) -> bool {
        let adapter = self
            .inner
            .adapter
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match adapter {
            Some(adapter) => {
                adapter.close();
                debug!("Service closed: {}", self.inner.core.uri);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for BlockingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingService")
            .field("uri", &self.inner.core.uri)
            .field("urn", &self.inner.core.urn)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl ServiceBuilder {
    /// Build a service on the default blocking adapter
    pub fn build_blocking(self) -> Result<BlockingService> {
        let serializer = self.resolve_serializer()?;
        let (config, auth) = self.adapter_parts();
        let adapter = BlockingAdapter::with_auth(config, serializer, auth)?;
        self.build_blocking_with_adapter(Arc::new(adapter))
    }

    /// Build a blocking service on a caller-supplied adapter
    pub fn build_blocking_with_adapter(
        self,
        adapter: Arc<dyn BlockingTransport>,
    ) -> Result<BlockingService> {
        BlockingService::from_parts(self.into_core()?, adapter)
    }
}
