use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

use pavilion_registry::Registry;
use pavilion_types::{EngineKind, SearchParams};

use crate::error::{CatalogError, Result};
use crate::extension::Extension;
use crate::host::PluginHost;
use crate::readme::{self, ReadmeCompiler};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// Single source of truth for all known extensions plus the two derived id
/// sets views render from. Mutated only while holding the write lock; guards
/// are never held across an await.
#[derive(Default)]
struct CatalogState {
    extensions: HashMap<String, Extension>,
    installed: HashSet<String>,
    search_result: HashSet<String>,
}

impl CatalogState {
    fn ensure_extension(&mut self, id: &str) -> &mut Extension {
        self.extensions
            .entry(id.to_string())
            .or_insert_with(|| Extension::new(id))
    }
}

struct Inner {
    registry: Arc<dyn Registry>,
    host: Arc<dyn PluginHost>,
    state: RwLock<CatalogState>,
    changes: broadcast::Sender<()>,
    compile_readme: ReadmeCompiler,
}

/// The extension reconciliation and caching core.
///
/// Owns the entity cache and reconciles it against the host's loaded-plugin
/// snapshot and the registry's responses. Cheap to clone; all clones share
/// the same state and change channel, which lets fire-and-forget refreshes
/// outlive the operation that spawned them.
#[derive(Clone)]
pub struct Catalog {
    inner: Arc<Inner>,
}

impl Catalog {
    pub fn new(registry: Arc<dyn Registry>, host: Arc<dyn PluginHost>) -> Self {
        Self::with_readme_compiler(registry, host, Arc::new(readme::compile_readme))
    }

    /// Construct with a custom markdown-to-safe-HTML boundary function.
    pub fn with_readme_compiler(
        registry: Arc<dyn Registry>,
        host: Arc<dyn PluginHost>,
        compile_readme: ReadmeCompiler,
    ) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                registry,
                host,
                state: RwLock::new(CatalogState::default()),
                changes,
                compile_readme,
            }),
        }
    }

    /// Subscribe to change notifications. Every mutating operation sends
    /// exactly one unit message after its state has settled.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.inner.changes.subscribe()
    }

    /// Pure lookup into the entity cache; returns a snapshot of the entity.
    pub fn get_extension(&self, id: &str) -> Option<Extension> {
        self.read_state().extensions.get(&id.to_lowercase()).cloned()
    }

    /// Ids the host's latest snapshot reports as loaded.
    pub fn installed_ids(&self) -> Vec<String> {
        self.read_state().installed.iter().cloned().collect()
    }

    /// Ids matching the most recent search, replaced wholesale per search.
    pub fn search_result_ids(&self) -> Vec<String> {
        self.read_state().search_result.iter().cloned().collect()
    }

    /// Issue a search and replace the search-result set with exactly the ids
    /// the registry returned. Entities from earlier searches stay cached even
    /// when they drop out of the set. Search failures propagate to the
    /// caller; concurrent calls are not cancelled, so the last one to resolve
    /// owns the final result set.
    #[instrument(skip(self))]
    pub async fn find(&self, params: Option<&SearchParams>) -> Result<()> {
        let result = self.inner.registry.search(params).await?;
        debug!("search returned {} extensions", result.extensions.len());
        {
            let mut state = self.write_state();
            let mut search_result = HashSet::with_capacity(result.extensions.len());
            for data in &result.extensions {
                let id = data.id();
                state.ensure_extension(&id).apply(data);
                search_result.insert(id);
            }
            state.search_result = search_result;
        }
        self.notify();
        Ok(())
    }

    /// Reconcile the installed set against the host's current plugin
    /// snapshot.
    ///
    /// The installed set is replaced synchronously from the snapshot;
    /// membership is decided solely here, never by a refresh landing later.
    /// Detail refreshes for every id entering or leaving the set are spawned
    /// fire-and-forget; their merges update cached metadata but emit no
    /// notification of their own.
    #[instrument(skip(self))]
    pub async fn update(&self) {
        let plugins = self.inner.host.plugins().await;
        let refreshing = {
            let mut state = self.write_state();
            let mut installed = HashSet::new();
            let mut refreshing = Vec::new();
            for plugin in &plugins {
                if plugin.engine.kind != EngineKind::Pavilion {
                    continue;
                }
                let id = plugin.id.to_lowercase();
                state.installed.remove(&id);
                state.ensure_extension(&id).set_installed(true);
                installed.insert(id.clone());
                refreshing.push(id);
            }
            // whatever is left was installed before and no longer is; its
            // refresh lets the entity pick up the registry's latest view
            let dropped: Vec<String> = state.installed.iter().cloned().collect();
            for id in dropped {
                if let Some(extension) = state.extensions.get_mut(&id) {
                    extension.set_installed(false);
                }
                refreshing.push(id);
            }
            state.installed = installed;
            refreshing
        };

        for id in refreshing {
            let catalog = self.clone();
            tokio::spawn(async move {
                catalog.refresh(&id).await;
            });
        }
        self.notify();
    }

    /// Refresh one entity's full detail record and, if it carries a readme
    /// URL, fetch and compile the readme into it. Fails only when the detail
    /// refresh yields no entity; readme failures degrade to an absent readme.
    #[instrument(skip(self))]
    pub async fn resolve(&self, id: &str) -> Result<Extension> {
        let id = id.to_lowercase();
        let mut extension = self
            .refresh(&id)
            .await
            .ok_or_else(|| CatalogError::Resolve(id.clone()))?;

        if let Some(readme_url) = extension.readme_url.clone() {
            match self.inner.registry.fetch_text(&readme_url).await {
                Ok(markdown) => {
                    let readme_html = (self.inner.compile_readme)(&markdown);
                    let mut state = self.write_state();
                    let entry = state.ensure_extension(&id);
                    entry.readme_html = Some(readme_html);
                    extension = entry.clone();
                }
                // a missing readme is not an error, the extension simply has none
                Err(error) if error.is_not_found() => {}
                Err(error) => warn!(%id, %error, "failed to fetch readme"),
            }
        }

        self.notify();
        Ok(extension)
    }

    /// Drive `update` once immediately and then on every host change event,
    /// until the host's event stream closes.
    pub fn watch_host(&self, mut events: mpsc::UnboundedReceiver<()>) -> JoinHandle<()> {
        let catalog = self.clone();
        tokio::spawn(async move {
            catalog.update().await;
            while events.recv().await.is_some() {
                catalog.update().await;
            }
            debug!("plugin host event stream closed");
        })
    }

    /// Refresh one entity from the registry's detail endpoint.
    ///
    /// On a 404 the registry's absence is treated as non-authoritative while
    /// the host still reports the extension loaded: the cached entity is
    /// returned unchanged. Other transport failures are logged and degrade to
    /// absence; nothing propagates past this boundary.
    async fn refresh(&self, id: &str) -> Option<Extension> {
        match self.inner.registry.get_extension(id).await {
            Ok(data) => {
                let mut state = self.write_state();
                let extension = state.ensure_extension(id);
                extension.apply(&data);
                Some(extension.clone())
            }
            Err(error) if error.is_not_found() => self
                .read_state()
                .extensions
                .get(id)
                .filter(|extension| extension.installed())
                .cloned(),
            Err(error) => {
                warn!(%id, %error, "failed to refresh extension");
                None
            }
        }
    }

    fn notify(&self) {
        // nobody listening is fine
        let _ = self.inner.changes.send(());
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CatalogState> {
        self.inner.state.read().unwrap()
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CatalogState> {
        self.inner.state.write().unwrap()
    }
}
