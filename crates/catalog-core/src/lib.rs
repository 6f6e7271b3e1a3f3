//! # Catalog Core
//!
//! Core traits, types, and errors for the paginated catalog resolver.
//!
//! This crate provides the vocabulary shared by the resolver and its
//! collaborators, so the pagination logic can run unchanged against
//! in-memory stores and real persistence backends.
//!
//! ## Key Traits
//!
//! - [`ParticipantIdentity`]: The identity a catalog is requested for
//! - [`DefinitionSource`]: Contract definitions visible to a participant
//! - [`AssetIndex`]: Count and ranged query of assets by selector
//! - [`PolicyStore`]: Policy lookup by id
//!
//! ## Key Types
//!
//! - [`ContractDefinition`]: Selector + access policy + contract policy
//! - [`AssetSelector`]: Opaque selection predicate, interpreted by the store
//! - [`Range`]: Half-open global page window
//! - [`Dataset`]: An asset offered under a narrowed policy via a distribution

pub mod asset;
pub mod dataset;
pub mod definition;
pub mod error;
pub mod identity;
pub mod policy;
pub mod range;
pub mod traits;

// Re-export main types
pub use asset::*;
pub use dataset::*;
pub use definition::*;
pub use error::*;
pub use identity::*;
pub use policy::*;
pub use range::*;
pub use traits::*;
