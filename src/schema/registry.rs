// Versioned schema registry
//
// Loaded schemas are immutable, so they are shared as `Arc<HedSchema>` and looked up by version
// string. Validation against a registered schema can run from any number of threads at once.

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::{collections::BTreeMap, path::Path, sync::Arc};

use super::{load_schema, HedSchema};
use crate::error::HedError;

/// Global singleton schema registry
pub static SCHEMAS: Lazy<SchemaRegistry> = Lazy::new(SchemaRegistry::create);

/// Thread-safe registry of loaded schemas, keyed by version.
pub struct SchemaRegistry(Arc<RwLock<BTreeMap<String, Arc<HedSchema>>>>);

impl Clone for SchemaRegistry {
    fn clone(&self) -> Self {
        SchemaRegistry(self.0.clone())
    }
}

impl SchemaRegistry {
    pub fn create() -> Self {
        SchemaRegistry(Arc::new(RwLock::new(BTreeMap::new())))
    }

    /// Register a schema under its own version. An existing schema with that version is
    /// replaced and a log message emitted.
    pub fn register(&self, schema: HedSchema) -> Arc<HedSchema> {
        let schema = Arc::new(schema);
        let mut writer = self.0.write();
        if writer
            .insert(schema.version().to_string(), schema.clone())
            .is_some()
        {
            tracing::info!(
                "[SchemaRegistry::register] Overwriting existing schema: {}",
                schema.version()
            );
        }
        schema
    }

    /// Returns a cheap Arc clone if the version is registered.
    pub fn get(&self, version: &str) -> Option<Arc<HedSchema>> {
        self.0.read().get(version).cloned()
    }

    pub fn versions(&self) -> Vec<String> {
        self.0.read().keys().cloned().collect()
    }

    pub fn remove(&self, version: &str) -> Option<Arc<HedSchema>> {
        self.0.write().remove(version)
    }

    /// Load a schema file and register it.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<Arc<HedSchema>, HedError> {
        let schema = load_schema(path)?;
        Ok(self.register(schema))
    }
}
