//! # Catalog Resolver
//!
//! Resolves a page of the catalog a participant may see, across every
//! contract definition visible to it.
//!
//! The catalog is the concatenation of each definition's matching assets, in
//! the order the definition source returns the definitions. A request names
//! a half-open window `[from, to)` over that concatenation. The resolver
//! counts definitions one after another, fetches only the slice of each that
//! overlaps the window, and stops as soon as the window is full.
//!
//! ## Example
//!
//! ```rust,ignore
//! use catalog_resolver::{DatasetResolver, ResolverConfig};
//! use futures::TryStreamExt;
//!
//! let resolver = DatasetResolver::new(definitions, assets, policies)
//!     .with_config(ResolverConfig::from_env());
//!
//! let page: Vec<_> = resolver
//!     .query(&participant, Range::new(20, 50), distribution)
//!     .try_collect()
//!     .await?;
//! ```
//!
//! ## Components
//!
//! - [`WindowedFetcher`]: count and ranged fetch for one definition
//! - [`WindowAccumulator`]: global cursor and budget across definitions
//! - [`DatasetAssembler`]: policy lookup, narrowing and offer construction
//! - [`DatasetResolver`]: the public entry point

pub mod accumulator;
pub mod assembler;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod resolver;

pub use accumulator::{CatalogEntry, EntryStream, WindowAccumulator};
pub use assembler::DatasetAssembler;
pub use config::{MissingPolicyBehavior, ResolverConfig};
pub use error::ResolveError;
pub use fetcher::{FetchOutcome, LocalWindow, WindowedFetcher};
pub use resolver::{DatasetResolver, DatasetStream};
