//! Catalog persistence: the document schema, the writer and the lazy
//! reader.
//!
//! The on-disk form is a graph of linked JSON documents, one per entity,
//! laid out under a root directory at paths derived from identifiers.
//! Writing is deterministic and idempotent; reading is lazy, cached per
//! reader, and retries transient fetch failures with bounded backoff.

pub mod documents;
pub mod fetch;
pub mod read;
pub mod write;

pub use fetch::{Fetcher, FileFetcher, RetryPolicy};
pub use read::{CatalogReader, ItemIter};
pub use write::{CatalogWriter, WriteOptions};
