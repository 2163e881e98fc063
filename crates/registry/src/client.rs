use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use pavilion_types::{RawExtension, SearchParams, SearchResult};

use crate::error::{RegistryError, Result};

/// Environment override for the registry base address.
pub const REGISTRY_URL_ENV: &str = "PAVILION_REGISTRY_URL";

/// Environment override for the installed-extension storage location.
pub const EXTENSIONS_DIR_ENV: &str = "PAVILION_EXTENSIONS_DIR";

/// Default public registry endpoint.
pub const DEFAULT_REGISTRY_URL: &str = "https://marketplace.pavilion.dev";

const USER_AGENT: &str = concat!("pavilion-registry/", env!("CARGO_PKG_VERSION"));

/// Registry operations the catalog core depends on. Implemented by
/// [`RegistryClient`] for the real HTTP registry; tests substitute in-memory
/// implementations.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Search the registry. Omitted params are not sent.
    async fn search(&self, params: Option<&SearchParams>) -> Result<SearchResult>;

    /// Fetch the full detail record for one `publisher.name` id. A 404 is an
    /// expected outcome, surfaced as a [`RegistryError::Status`].
    async fn get_extension(&self, id: &str) -> Result<RawExtension>;

    /// Raw GET, used for readme bodies.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// HTTP client for the extension registry. The base address is resolved once
/// at construction and cached for the client's lifetime.
pub struct RegistryClient {
    http: reqwest::Client,
    api_base: String,
}

impl RegistryClient {
    /// Create a client against `PAVILION_REGISTRY_URL`, falling back to the
    /// default public endpoint.
    pub fn new() -> Result<Self> {
        let base =
            std::env::var(REGISTRY_URL_ENV).unwrap_or_else(|_| DEFAULT_REGISTRY_URL.to_string());
        Self::with_base_url(&base)
    }

    /// Create a client against an explicit base address.
    pub fn with_base_url(base: &str) -> Result<Self> {
        let base = base.trim_end_matches('/');
        Url::parse(base).map_err(|_| RegistryError::InvalidUrl(base.to_string()))?;

        Ok(Self {
            http: default_http_client(),
            api_base: format!("{base}/api"),
        })
    }

    /// Root of the registry's API, e.g. `https://marketplace.pavilion.dev/api`.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Storage location for installed extensions, used by the installer
    /// component: `PAVILION_EXTENSIONS_DIR` or the platform data dir.
    pub fn extensions_dir() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(EXTENSIONS_DIR_ENV) {
            if !dir.is_empty() {
                return Ok(PathBuf::from(dir));
            }
        }

        let project_dirs = directories::ProjectDirs::from("dev", "pavilion", "pavilion")
            .ok_or(RegistryError::NoDataDir)?;
        Ok(project_dirs.data_local_dir().join("extensions"))
    }

    fn detail_url(&self, id: &str) -> Result<String> {
        let (publisher, name) = id
            .split_once('.')
            .filter(|(publisher, name)| !publisher.is_empty() && !name.is_empty())
            .ok_or_else(|| RegistryError::InvalidId(id.to_string()))?;
        Ok(format!("{}/{}/{}", self.api_base, publisher, name))
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = self.execute(url, request).await?;
        response.json().await.map_err(|e| RegistryError::Transport {
            url: url.to_string(),
            source: e,
        })
    }

    async fn execute(
        &self,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        debug!("GET {url}");
        let response = request
            .send()
            .await
            .map_err(|e| RegistryError::Transport {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Registry for RegistryClient {
    async fn search(&self, params: Option<&SearchParams>) -> Result<SearchResult> {
        let url = format!("{}/-/search", self.api_base);
        let request = self.http.get(&url).query(&search_query(params));
        self.execute_json(&url, request).await
    }

    async fn get_extension(&self, id: &str) -> Result<RawExtension> {
        let url = self.detail_url(id)?;
        let request = self.http.get(&url);
        self.execute_json(&url, request).await
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.execute(url, self.http.get(url)).await?;
        response.text().await.map_err(|e| RegistryError::Transport {
            url: url.to_string(),
            source: e,
        })
    }
}

fn default_http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to create HTTP client")
}

fn search_query(params: Option<&SearchParams>) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    if let Some(params) = params {
        if let Some(query) = &params.query {
            pairs.push(("query", query.clone()));
        }
        if let Some(category) = &params.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(size) = params.size {
            pairs.push(("size", size.to_string()));
        }
        if let Some(offset) = params.offset {
            pairs.push(("offset", offset.to_string()));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized_and_suffixed_with_api() {
        let client = RegistryClient::with_base_url("https://registry.test/").unwrap();
        assert_eq!(client.api_base(), "https://registry.test/api");

        let client = RegistryClient::with_base_url("https://registry.test").unwrap();
        assert_eq!(client.api_base(), "https://registry.test/api");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            RegistryClient::with_base_url("not a url"),
            Err(RegistryError::InvalidUrl(_))
        ));
    }

    #[test]
    fn detail_url_splits_on_first_separator_only() {
        let client = RegistryClient::with_base_url("https://registry.test").unwrap();
        assert_eq!(
            client.detail_url("acme.foo").unwrap(),
            "https://registry.test/api/acme/foo"
        );
        // only the first '.' separates publisher from name
        assert_eq!(
            client.detail_url("acme.foo.bar").unwrap(),
            "https://registry.test/api/acme/foo.bar"
        );
    }

    #[test]
    fn ids_without_both_segments_are_rejected() {
        let client = RegistryClient::with_base_url("https://registry.test").unwrap();
        assert!(matches!(
            client.detail_url("acme"),
            Err(RegistryError::InvalidId(_))
        ));
        assert!(matches!(
            client.detail_url("acme."),
            Err(RegistryError::InvalidId(_))
        ));
        assert!(matches!(
            client.detail_url(".foo"),
            Err(RegistryError::InvalidId(_))
        ));
    }

    #[test]
    fn search_query_sends_only_present_params() {
        assert!(search_query(None).is_empty());

        let params = SearchParams::new().with_query("lint").with_offset(40);
        let pairs = search_query(Some(&params));
        assert_eq!(
            pairs,
            vec![
                ("query", "lint".to_string()),
                ("offset", "40".to_string())
            ]
        );
    }

    #[test]
    fn extensions_dir_ends_with_extensions() {
        match RegistryClient::extensions_dir() {
            Ok(dir) => assert_eq!(dir.file_name().unwrap(), "extensions"),
            // acceptable on systems where platform directories cannot be determined
            Err(RegistryError::NoDataDir) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
