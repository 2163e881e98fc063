use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("request to '{url}' failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("registry returned HTTP {status} for '{url}'")]
    Status { status: u16, url: String },

    #[error("invalid extension id '{0}': expected 'publisher.name'")]
    InvalidId(String),

    #[error("invalid registry url '{0}'")]
    InvalidUrl(String),

    #[error("could not determine a data directory for the current user")]
    NoDataDir,
}

impl RegistryError {
    /// HTTP status of the failed response, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            RegistryError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// A 404 is an expected outcome for detail and readme lookups: the
    /// extension was removed or never published under that id.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_distinguished_from_other_statuses() {
        let not_found = RegistryError::Status {
            status: 404,
            url: "https://registry.test/api/acme/foo".to_string(),
        };
        assert!(not_found.is_not_found());
        assert_eq!(not_found.status(), Some(404));

        let server_error = RegistryError::Status {
            status: 500,
            url: "https://registry.test/api/-/search".to_string(),
        };
        assert!(!server_error.is_not_found());
        assert_eq!(server_error.status(), Some(500));

        assert!(RegistryError::InvalidId("foo".to_string()).status().is_none());
    }
}
