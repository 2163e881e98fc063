//! Stateless HTTP accessor for the pavilion extension registry.
//!
//! [`RegistryClient`] resolves the registry base address once (from
//! `PAVILION_REGISTRY_URL` or the default public endpoint) and exposes the
//! three operations the catalog core needs: search, per-extension detail
//! lookup, and raw text retrieval for readme bodies. Transport failures carry
//! the HTTP status code so callers can distinguish a 404 from a hard failure.

pub mod client;
pub mod error;

pub use client::{
    DEFAULT_REGISTRY_URL, EXTENSIONS_DIR_ENV, REGISTRY_URL_ENV, Registry, RegistryClient,
};
pub use error::{RegistryError, Result};
