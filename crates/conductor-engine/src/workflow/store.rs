//! Workflow catalog.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{info, warn};

use super::definition::WorkflowDefinition;
use crate::error::WorkflowError;

/// Named workflow definitions available to `run_named`.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Insert or replace the definition under its name.
    async fn save(&self, definition: WorkflowDefinition) -> Result<(), WorkflowError>;

    async fn load(&self, name: &str) -> Result<Option<WorkflowDefinition>, WorkflowError>;

    /// Names of all stored definitions, sorted.
    async fn list(&self) -> Result<Vec<String>, WorkflowError>;

    /// Returns whether a definition was removed.
    async fn delete(&self, name: &str) -> Result<bool, WorkflowError>;
}

#[derive(Default)]
pub struct MemoryWorkflowStore {
    definitions: RwLock<BTreeMap<String, WorkflowDefinition>>,
}

impl MemoryWorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for MemoryWorkflowStore {
    async fn save(&self, definition: WorkflowDefinition) -> Result<(), WorkflowError> {
        self.definitions
            .write()
            .insert(definition.name.clone(), definition);
        Ok(())
    }

    async fn load(&self, name: &str) -> Result<Option<WorkflowDefinition>, WorkflowError> {
        Ok(self.definitions.read().get(name).cloned())
    }

    async fn list(&self) -> Result<Vec<String>, WorkflowError> {
        Ok(self.definitions.read().keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, WorkflowError> {
        Ok(self.definitions.write().remove(name).is_some())
    }
}

/// Save every `*.yaml`, `*.yml` and `*.json` definition found in `dir`.
///
/// Files that fail to parse are skipped with a warning. Returns the number
/// of definitions loaded.
pub async fn load_dir(store: &dyn WorkflowStore, dir: &Path) -> Result<usize, WorkflowError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| WorkflowError::Store(format!("{}: {}", dir.display(), e)))?;

    let mut paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext, "yaml" | "yml" | "json"))
        })
        .collect();
    paths.sort();

    let mut loaded = 0;
    for path in paths {
        match WorkflowDefinition::from_path(&path) {
            Ok(definition) => {
                info!("Loaded workflow {} from {}", definition.name, path.display());
                store.save(definition).await?;
                loaded += 1;
            }
            Err(e) => warn!("Skipping workflow file {}: {}", path.display(), e),
        }
    }
    Ok(loaded)
}
