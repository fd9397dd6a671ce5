//! Builders for catalog entities and their link graph.
//!
//! Build order follows the containment tree bottom-up: items first
//! ([`ItemBuilder`]), then collections ([`CollectionBuilder`]), then the
//! link graph over the assembled catalog ([`LinkResolver`]). Builder errors
//! abort the single build unit immediately and carry enough context to
//! locate the offending tile or dataset; they are never retried.
//!
//! Item builds for independent tiles share no state, so callers may run
//! them in parallel; collection extents are commutative-associative
//! reductions and can merge partial results in any order.

mod collection;
mod item;
mod links;

pub use collection::CollectionBuilder;
pub use item::ItemBuilder;
pub use links::{CrossRef, DuplicateWarning, LinkResolver, Resolution};
