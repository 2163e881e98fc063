use async_trait::async_trait;

use pavilion_types::PluginDescriptor;

/// The host runtime's view of currently-loaded packages.
///
/// The catalog never installs or unloads anything itself; it only mirrors
/// whatever snapshot the host reports. Implementations should also emit a
/// unit message on their change stream (see [`crate::Catalog::watch_host`])
/// whenever the snapshot changes.
#[async_trait]
pub trait PluginHost: Send + Sync {
    /// Snapshot of the packages the host currently has loaded, across all
    /// ecosystems. Callers filter by engine kind.
    async fn plugins(&self) -> Vec<PluginDescriptor>;
}
