use thiserror::Error;

use pavilion_registry::RegistryError;

#[derive(Error, Debug)]
pub enum CatalogError {
    /// The one user-visible failure: `resolve` was asked for an id the
    /// registry does not know and the host does not report as installed.
    #[error("failed to resolve extension '{0}'")]
    Resolve(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
