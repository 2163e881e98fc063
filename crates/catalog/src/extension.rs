use chrono::{DateTime, Utc};

use pavilion_types::RawExtension;

/// Cached, merge-accumulated record for one extension id.
///
/// Created lazily with only the id populated, then overlaid with whatever
/// metadata snapshots arrive from search results or detail lookups. Entities
/// are never deleted; an extension that disappears from the registry stays
/// cached for the process lifetime.
#[derive(Debug, Clone, Default)]
pub struct Extension {
    id: String,
    installed: bool,
    pub display_name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub average_rating: Option<f64>,
    pub download_count: Option<u64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub categories: Option<Vec<String>>,
    pub readme_url: Option<String>,
    pub icon_url: Option<String>,
    pub license_url: Option<String>,
    pub readme_html: Option<String>,
}

impl Extension {
    pub(crate) fn new(id: &str) -> Self {
        Self {
            id: id.to_lowercase(),
            ..Self::default()
        }
    }

    /// Stable lowercase `publisher.name` key, immutable once assigned.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the id appears in the host's latest loaded-plugin snapshot.
    /// Owned by the reconciliation pass; never touched by a metadata merge.
    pub fn installed(&self) -> bool {
        self.installed
    }

    pub(crate) fn set_installed(&mut self, installed: bool) {
        self.installed = installed;
    }

    /// Overlay every present field of `data` onto this entity. Fields the
    /// record omits keep their previously known values.
    pub fn apply(&mut self, data: &RawExtension) {
        overlay(&mut self.display_name, &data.display_name);
        overlay(&mut self.version, &data.version);
        overlay(&mut self.description, &data.description);
        overlay(&mut self.average_rating, &data.average_rating);
        overlay(&mut self.download_count, &data.download_count);
        overlay(&mut self.timestamp, &data.timestamp);
        overlay(&mut self.categories, &data.categories);
        overlay(&mut self.readme_url, &data.files.readme);
        overlay(&mut self.icon_url, &data.files.icon);
        overlay(&mut self.license_url, &data.files.license);
    }
}

fn overlay<T: Clone>(field: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        *field = value.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entity_carries_only_the_id() {
        let extension = Extension::new("Acme.Foo");
        assert_eq!(extension.id(), "acme.foo");
        assert!(!extension.installed());
        assert!(extension.display_name.is_none());
        assert!(extension.readme_url.is_none());
    }

    #[test]
    fn merge_overlays_present_fields() {
        let mut extension = Extension::new("acme.foo");

        let mut data = RawExtension::new("acme", "foo");
        data.display_name = Some("Foo".to_string());
        data.version = Some("1.0.0".to_string());
        data.files.readme = Some("https://registry.test/readme".to_string());
        extension.apply(&data);

        assert_eq!(extension.display_name.as_deref(), Some("Foo"));
        assert_eq!(extension.version.as_deref(), Some("1.0.0"));
        assert_eq!(
            extension.readme_url.as_deref(),
            Some("https://registry.test/readme")
        );
    }

    #[test]
    fn merge_never_clears_a_field_on_absence() {
        let mut extension = Extension::new("acme.foo");

        let mut detail = RawExtension::new("acme", "foo");
        detail.display_name = Some("Foo".to_string());
        detail.description = Some("does things".to_string());
        extension.apply(&detail);

        // a later summary omits the description but bumps the version
        let mut summary = RawExtension::new("acme", "foo");
        summary.version = Some("2.0.0".to_string());
        extension.apply(&summary);

        assert_eq!(extension.description.as_deref(), Some("does things"));
        assert_eq!(extension.display_name.as_deref(), Some("Foo"));
        assert_eq!(extension.version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn merge_overwrites_with_newer_values() {
        let mut extension = Extension::new("acme.foo");

        let mut data = RawExtension::new("acme", "foo");
        data.download_count = Some(10);
        extension.apply(&data);

        data.download_count = Some(25);
        extension.apply(&data);
        assert_eq!(extension.download_count, Some(25));
    }

    #[test]
    fn merge_leaves_installed_flag_alone() {
        let mut extension = Extension::new("acme.foo");
        extension.set_installed(true);

        let mut data = RawExtension::new("acme", "foo");
        data.display_name = Some("Foo".to_string());
        extension.apply(&data);

        assert!(extension.installed());
    }
}
