use super::{EntryPoint, RestoreOptions, RunMode};
use crate::restore_graph::domain::GlobalProperties;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// GraphRequest - Internal request DTO for one restore graph run
#[derive(Debug, Clone)]
pub struct GraphRequest {
    /// Project or solution file to start from
    pub entry_path: PathBuf,
    /// Global properties for every evaluation
    pub global_properties: GlobalProperties,
    /// Raw options, kept for logging
    pub raw_options: BTreeMap<String, String>,
    pub options: RestoreOptions,
    pub mode: RunMode,
    /// Bound for both fan-outs
    pub max_parallelism: usize,
}

impl GraphRequest {
    pub fn new(
        entry_path: PathBuf,
        global_properties: GlobalProperties,
        raw_options: BTreeMap<String, String>,
        mode: RunMode,
    ) -> Self {
        let options = RestoreOptions::from_options(&raw_options);
        Self {
            entry_path,
            global_properties,
            raw_options,
            options,
            mode,
            max_parallelism: default_max_parallelism(),
        }
    }

    pub fn with_max_parallelism(mut self, max_parallelism: usize) -> Self {
        self.max_parallelism = max_parallelism.max(1);
        self
    }

    pub fn entry_point(&self) -> EntryPoint {
        EntryPoint::from_path(self.entry_path.clone(), self.global_properties.clone())
    }
}

/// Logical CPU count, at least 1
pub fn default_max_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
