//! Ingress filter and getters

use super::types::{Metadata, Record};
use crate::error::{Error, Result};
use crate::transport::Response;
use crate::value::Value;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Extracts the payload from a response
pub type DataGetter = Arc<dyn Fn(&Response) -> Result<Option<Value>> + Send + Sync>;

/// Extracts the metadata object from a response
pub type MetaGetter = Arc<dyn Fn(&Response) -> Result<Option<Value>> + Send + Sync>;

/// Reads the next page cursor from a page's metadata
pub type NextPageGetter = Arc<dyn Fn(&Metadata) -> Option<String> + Send + Sync>;

/// Returns `content.data` when `content.success` is `true`
///
/// A missing or null body yields `None`. Any other body is surfaced whole
/// as `Error::Response`.
pub fn default_data_getter(response: &Response) -> Result<Option<Value>> {
    let content = match &response.content {
        None | Some(Value::Null) => return Ok(None),
        Some(content) => content,
    };
    if content.get("success").and_then(Value::as_bool) == Some(true) {
        Ok(content.get("data").cloned())
    } else {
        Err(Error::response(content.clone()))
    }
}

/// Returns `content.meta`, or `None` for a missing body
pub fn default_meta_getter(response: &Response) -> Result<Option<Value>> {
    Ok(response
        .content
        .as_ref()
        .and_then(|content| content.get("meta"))
        .cloned())
}

/// Reads a string `meta.next`
pub fn default_next_page_getter(meta: &Metadata) -> Option<String> {
    meta.next().map(str::to_string)
}

/// The set of getters that define one API's envelope format
#[derive(Clone)]
pub struct Envelope {
    data_getter: DataGetter,
    meta_getter: MetaGetter,
    next_page_getter: NextPageGetter,
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            data_getter: Arc::new(default_data_getter),
            meta_getter: Arc::new(default_meta_getter),
            next_page_getter: Arc::new(default_next_page_getter),
        }
    }
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_data_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Response) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.data_getter = Arc::new(getter);
        self
    }

    #[must_use]
    pub fn with_meta_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Response) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        self.meta_getter = Arc::new(getter);
        self
    }

    #[must_use]
    pub fn with_next_page_getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&Metadata) -> Option<String> + Send + Sync + 'static,
    {
        self.next_page_getter = Arc::new(getter);
        self
    }

    /// Turn a raw response into a record
    ///
    /// Fails with the transport error if the response carries one, or with
    /// whatever the data or meta getter returns.
    pub fn ingress_filter(&self, mut response: Response) -> Result<Record> {
        if let Some(error) = response.error.take() {
            return Err(error);
        }

        let data = (self.data_getter)(&response)?;
        let meta = match (self.meta_getter)(&response)? {
            Some(Value::Object(entries)) => Metadata::new(entries),
            None | Some(Value::Null) => Metadata::default(),
            Some(other) => {
                warn!("Ignoring non-object metadata of type {}", other.kind());
                Metadata::default()
            }
        };
        Ok(Record::from_data(data, meta))
    }

    /// Cursor for the page after the one described by `meta`
    pub fn next_page(&self, meta: &Metadata) -> Option<String> {
        (self.next_page_getter)(meta)
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope").finish_non_exhaustive()
    }
}
