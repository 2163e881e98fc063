//! Pavilion catalog - extension reconciliation and caching core
//!
//! This crate owns the authoritative mapping from extension id to cached
//! [`Extension`] entity and reconciles two independently-changing sources of
//! truth: the host's currently-loaded plugin set and the remote registry's
//! search and detail responses. Partial failures degrade to "entity not
//! available" instead of aborting batch operations, and dependent views are
//! notified through a single broadcast channel once per mutating operation.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use pavilion_catalog::{Catalog, PluginHost};
//! use pavilion_registry::RegistryClient;
//! use pavilion_types::SearchParams;
//!
//! # async fn example(host: Arc<dyn PluginHost>) -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(RegistryClient::new()?);
//! let catalog = Catalog::new(registry, host);
//!
//! let mut changes = catalog.subscribe();
//! catalog.find(Some(&SearchParams::new().with_query("lint"))).await?;
//! changes.recv().await?;
//!
//! for id in catalog.search_result_ids() {
//!     if let Some(extension) = catalog.get_extension(&id) {
//!         println!("{}: {:?}", extension.id(), extension.display_name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod extension;
pub mod host;
pub mod readme;
pub mod service;

pub use error::{CatalogError, Result};
pub use extension::Extension;
pub use host::PluginHost;
pub use readme::{ReadmeCompiler, compile_readme};
pub use service::Catalog;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Set up a catalog against the environment-configured registry endpoint.
pub fn init_default(
    host: std::sync::Arc<dyn PluginHost>,
) -> pavilion_registry::Result<Catalog> {
    let registry = std::sync::Arc::new(pavilion_registry::RegistryClient::new()?);
    Ok(Catalog::new(registry, host))
}
