//! Registry file watcher for live instance updates.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::load_registry;
use crate::discovery::registry::StaticRegistry;

/// Reloads a registry file into a [`StaticRegistry`] whenever it changes.
pub struct RegistryWatcher {
    path: PathBuf,
    registry: Arc<StaticRegistry>,
}

impl RegistryWatcher {
    pub fn new(path: &Path, registry: Arc<StaticRegistry>) -> Self {
        Self {
            path: path.to_path_buf(),
            registry,
        }
    }

    /// Reload the file now. Invalid files leave the current set in place.
    pub fn reload(&self) {
        reload(&self.path, &self.registry);
    }

    /// Start watching the file in a background thread.
    ///
    /// Watching stops when the returned watcher is dropped.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let registry = self.registry.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Registry file change detected, reloading...");
                        reload(&path, &registry);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Registry watcher started");
        Ok(watcher)
    }
}

fn reload(path: &Path, registry: &StaticRegistry) {
    match load_registry(path) {
        Ok(config) => registry.replace(&config.instances),
        Err(e) => {
            tracing::error!("Failed to reload registry: {}. Keeping current instances.", e);
        }
    }
}
