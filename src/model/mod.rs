//! Core data model for terracat catalogs.
//!
//! The model mirrors the persisted document graph: a [`Catalog`] root owns
//! [`Collection`]s, each collection owns [`Item`]s, and each item owns its
//! [`AssetRef`]s. Links between entities are derived data held in a
//! [`LinkGraph`].
//!
//! # Design Principles
//!
//! 1. **Type Safety**: newtype identifiers prevent mixing collection and
//!    item ids; extensions and roles are closed enums, not free strings.
//!
//! 2. **Permissive Construction**: model types can represent invalid data
//!    (unordered bboxes, open rings) so that validation can report issues
//!    instead of panicking while a tree is assembled or loaded.

mod asset;
mod bbox;
mod entity;
mod extent;
mod geometry;
mod ids;
mod link;
mod temporal;

// Re-export core types for convenient access
pub use asset::{AssetRef, AssetRole, MediaType};
pub use bbox::{Bbox, BBOX_TOLERANCE};
pub use entity::{
    Catalog, Collection, EoBand, Extension, Item, LabelMeta, LabelType, License, Provider,
    ProviderRole,
};
pub use extent::Extent;
pub use geometry::{Geometry, GeometryFault, Ring};
pub use ids::{CatalogId, CollectionId, ItemId};
pub use link::{EntityRef, Link, LinkGraph, LinkRel};
pub use temporal::{TemporalInterval, TemporalValue};
