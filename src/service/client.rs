//! Cooperative service

use super::types::{RequestConfig, ServiceBuilder, ServiceCore};
use crate::envelope::Record;
use crate::error::{Error, Result};
use crate::pager::{Page, PageFetcher, PageRequest, Pager, PagerOptions};
use crate::transport::{Adapter, AsyncAdapter, AsyncTransport};
use crate::types::{Method, Query};
use crate::value::Value;
use futures::FutureExt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

struct ServiceInner {
    core: ServiceCore,
    adapter: RwLock<Option<Arc<dyn AsyncTransport>>>,
}

/// A connection to one REST service on the cooperative runtime
///
/// Cloning is cheap; clones share the adapter and its session state.
#[derive(Clone)]
pub struct Service {
    inner: Arc<ServiceInner>,
}

impl Service {
    /// Start building a service
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    fn from_parts(core: ServiceCore, adapter: Arc<dyn AsyncTransport>) -> Result<Self> {
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

    /// The URL a call with this path would go to
    pub fn url(&self, path: &[&str]) -> String {
        self.inner.core.url(path, None)
    }

    /// The adapter, or `Error::Closed` after `close`
    pub fn adapter(&self) -> Result<Arc<dyn AsyncTransport>> {
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
    pub async fn request(
        &self,
        method: Method,
        path: &[&str],
        config: RequestConfig,
    ) -> Result<Record> {
        let adapter = self.adapter()?;
        let request = self.inner.core.outgoing(method, path, config)?;
        debug!("Service request: {} {}", method, request.url);
        let response = adapter.request(request).await?;
        self.inner.core.ingress(response)
    }

    pub async fn get(&self, path: &[&str]) -> Result<Record> {
        self.request(Method::GET, path, RequestConfig::new()).await
    }

    pub async fn get_with_config(&self, path: &[&str], config: RequestConfig) -> Result<Record> {
        self.request(Method::GET, path, config).await
    }

    pub async fn post(&self, path: &[&str], body: impl Into<Value>) -> Result<Record> {
        self.request(Method::POST, path, RequestConfig::new().body(body))
            .await
    }

    pub async fn post_with_config(&self, path: &[&str], config: RequestConfig) -> Result<Record> {
        self.request(Method::POST, path, config).await
    }

    pub async fn put(&self, path: &[&str], body: impl Into<Value>) -> Result<Record> {
        self.request(Method::PUT, path, RequestConfig::new().body(body))
            .await
    }

    pub async fn put_with_config(&self, path: &[&str], config: RequestConfig) -> Result<Record> {
        self.request(Method::PUT, path, config).await
    }

    pub async fn patch(&self, path: &[&str], body: impl Into<Value>) -> Result<Record> {
        self.request(Method::PATCH, path, RequestConfig::new().body(body))
            .await
    }

    pub async fn patch_with_config(&self, path: &[&str], config: RequestConfig) -> Result<Record> {
        self.request(Method::PATCH, path, config).await
    }

    pub async fn delete(&self, path: &[&str]) -> Result<Record> {
        self.request(Method::DELETE, path, RequestConfig::new())
            .await
    }

    pub async fn delete_with_config(&self, path: &[&str], config: RequestConfig) -> Result<Record> {
        self.request(Method::DELETE, path, config).await
    }

    /// Lazily page through a list endpoint
    pub fn get_pager(&self, path: &[&str], options: PagerOptions) -> Result<Pager> {
        self.get_pager_with_query(path, Query::new(), options)
    }

    /// Lazily page through a list endpoint; `query` goes on the first page only
    pub fn get_pager_with_query(
        &self,
        path: &[&str],
        query: Query,
        options: PagerOptions,
    ) -> Result<Pager> {
        let adapter = self.adapter()?;
        let service = self.clone();
        let fetcher: PageFetcher = Arc::new(move |page: PageRequest| {
            let service = service.clone();
            async move { service.fetch_page(page).await }.boxed()
        });
        let first = PageRequest::new(path.iter().copied(), query);
        Ok(adapter.get_pager(fetcher, first, options))
    }

    async fn fetch_page(&self, page: PageRequest) -> Result<Page> {
        let path: Vec<&str> = page.path.iter().map(String::as_str).collect();
        let mut config = RequestConfig::new().query(page.query);
        config.urn = page.urn;
        let record = self.request(Method::GET, &path, config).await?;
        Page::from_record(record, &self.inner.core.envelope)
    }

    /// Release the adapter; later calls fail with `Error::Closed`
    ///
    /// Returns `true` on the first call only.
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

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("uri", &self.inner.core.uri)
            .field("urn", &self.inner.core.urn)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl ServiceBuilder {
    /// Build a service on the default cooperative adapter
    pub fn build(self) -> Result<Service> {
        let serializer = self.resolve_serializer()?;
        let (config, auth) = self.adapter_parts();
        let adapter = AsyncAdapter::with_auth(config, serializer, auth)?;
        self.build_with_adapter(Arc::new(adapter))
    }

    /// Build a service on a caller-supplied adapter
    pub fn build_with_adapter(self, adapter: Arc<dyn AsyncTransport>) -> Result<Service> {
        Service::from_parts(self.into_core()?, adapter)
    }
}
