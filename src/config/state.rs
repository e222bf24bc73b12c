// Application state module
// Owns the template store and cached config values shared by all connections

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::types::Config;
use crate::routing::RouteTable;
use crate::templates::{FsReader, TemplateStore};

/// Application state
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,

    /// Template registry, alive as long as the server
    pub templates: Arc<TemplateStore<FsReader>>,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            routes: RouteTable::standard(&config.resources.static_prefix),
            templates: Arc::new(TemplateStore::new(FsReader::new(&config.resources.root))),
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
        }
    }
}
