//! Envelope module
//!
//! Unwraps `{"success": bool, "data": ..., "meta": {...}}` response bodies
//! into [`Record`]s.
//!
//! # Overview
//!
//! The ingress filter runs on every [`Response`](crate::transport::Response):
//! transport errors are raised, `data` is extracted by the data getter and
//! wrapped according to its shape, and `meta` entries are attached to the
//! record as [`Metadata`]. The getters are plain closures held by an
//! [`Envelope`], so APIs with a different wire format only need to swap
//! them.

mod filter;
mod types;

pub use filter::{
    default_data_getter, default_meta_getter, default_next_page_getter, DataGetter, Envelope,
    MetaGetter, NextPageGetter,
};
pub use types::{Metadata, ObjectRecord, Record, SequenceRecord};
