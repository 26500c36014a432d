//! Lazily loaded, shared config handle.
//!
//! Readers go through an [`ArcSwapOption`] and never block. Filling the cache
//! is serialized by a mutex so concurrent first calls load the file once.

use super::loader::{ConfigLoader, ConfigPaths};
use super::types::Config;
use crate::error::ConfigResult;
use arc_swap::ArcSwapOption;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Owns the cached global config.
///
/// Pass a provider explicitly to whatever needs the config; there is no
/// process-global instance.
#[derive(Debug)]
pub struct ConfigProvider {
    loader: ConfigLoader,
    cached: ArcSwapOption<Config>,
    fill: Mutex<()>,
}

impl ConfigProvider {
    pub fn new(paths: ConfigPaths) -> Self {
        Self {
            loader: ConfigLoader::new(paths),
            cached: ArcSwapOption::empty(),
            fill: Mutex::new(()),
        }
    }

    /// Provider using environment-derived search paths.
    pub fn discover() -> Self {
        Self::new(ConfigPaths::discover())
    }

    /// Provider pre-populated with an already loaded config.
    pub fn with_config(config: Config) -> Self {
        let provider = Self::new(ConfigPaths::with_dirs(Vec::new()));
        provider.cached.store(Some(Arc::new(config)));
        provider
    }

    /// Return the cached config, loading it on first use.
    ///
    /// An explicit path always reloads and replaces the cached handle.
    pub fn ensure_loaded(&self, explicit: Option<&Path>) -> ConfigResult<Arc<Config>> {
        if explicit.is_none()
            && let Some(config) = self.cached.load_full()
        {
            debug!(source = %config.source().display(), "Returning cached config");
            return Ok(config);
        }

        // A poisoned lock only means another loader panicked; the cache itself
        // is still consistent.
        let _guard = self.fill.lock().unwrap_or_else(|e| e.into_inner());

        if explicit.is_none()
            && let Some(config) = self.cached.load_full()
        {
            return Ok(config);
        }

        let config = Arc::new(self.loader.load(explicit)?);
        info!(source = %config.source().display(), "Loaded config");
        self.cached.store(Some(Arc::clone(&config)));
        Ok(config)
    }

    /// The cached config, if one has been loaded.
    pub fn cached(&self) -> Option<Arc<Config>> {
        self.cached.load_full()
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.loader.paths
    }
}
