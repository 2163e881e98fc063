//! Shared data models for the pavilion extension marketplace.
//!
//! Wire types mirror the registry's JSON surface (camelCase keys); host-side
//! types describe the packages the plugin runtime currently has loaded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One extension record as returned by the registry's search or detail
/// endpoints. Every metadata field is independently optional: a search
/// summary carries fewer fields than a detail lookup, and consumers merge
/// whatever is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExtension {
    pub publisher: String,
    pub name: String,
    pub display_name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub average_rating: Option<f64>,
    pub download_count: Option<u64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub categories: Option<Vec<String>>,
    #[serde(default)]
    pub files: ExtensionFiles,
}

impl RawExtension {
    pub fn new(publisher: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            publisher: publisher.into(),
            name: name.into(),
            display_name: None,
            version: None,
            description: None,
            average_rating: None,
            download_count: None,
            timestamp: None,
            categories: None,
            files: ExtensionFiles::default(),
        }
    }

    /// Stable cache key for this record: lowercase `publisher.name`.
    pub fn id(&self) -> String {
        format!(
            "{}.{}",
            self.publisher.to_lowercase(),
            self.name.to_lowercase()
        )
    }
}

/// Resource URLs attached to an extension record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionFiles {
    pub readme: Option<String>,
    pub icon: Option<String>,
    pub license: Option<String>,
    pub download: Option<String>,
}

/// Query parameters for a registry search. Omitted fields are not sent.
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub query: Option<String>,
    pub category: Option<String>,
    pub size: Option<u64>,
    pub offset: Option<u64>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Response body of a registry search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub offset: Option<u64>,
    pub total_size: Option<u64>,
    #[serde(default)]
    pub extensions: Vec<RawExtension>,
}

/// A package the host runtime currently has loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub id: String,
    pub engine: PluginEngine,
}

impl PluginDescriptor {
    pub fn new(id: impl Into<String>, kind: EngineKind) -> Self {
        Self {
            id: id.into(),
            engine: PluginEngine {
                kind,
                version: None,
            },
        }
    }
}

/// Engine declaration of a loaded package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginEngine {
    pub kind: EngineKind,
    pub version: Option<String>,
}

/// Which ecosystem a package belongs to. Only [`EngineKind::Pavilion`]
/// packages participate in marketplace reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Pavilion,
    Builtin,
    #[serde(other)]
    Other,
}
