use crate::ports::outbound::ConfigurationSource;
use crate::restore_graph::domain::{ProjectView, Settings, SettingsRequest};
use crate::shared::msbuild_string;
use crate::shared::paths;
use crate::shared::Result;
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// SettingsLoadingContext caches ambient settings for one resolution run.
///
/// Every distinct (solution directory, root directory, config file) triple is
/// loaded from the configuration source once. The cache is dropped with the
/// context at the end of the run.
pub struct SettingsLoadingContext<'a, C: ConfigurationSource + ?Sized> {
    source: &'a C,
    cache: DashMap<SettingsRequest, Arc<Settings>>,
}

impl<'a, C: ConfigurationSource + ?Sized> SettingsLoadingContext<'a, C> {
    pub fn new(source: &'a C) -> Self {
        Self {
            source,
            cache: DashMap::new(),
        }
    }

    /// Where configuration for this project is discovered
    ///
    /// `RestoreConfigFile` and `RestoreRootConfigDirectory` are resolved
    /// against the project directory; the root defaults to that directory.
    pub fn request_for(project: &dyn ProjectView) -> SettingsRequest {
        let directory = project.directory();
        let resolve = |name: &str| paths::resolve_optional(directory, project.get_property(name)).map(PathBuf::from);

        SettingsRequest {
            solution_directory: resolve("RestoreSolutionDirectory"),
            root_directory: resolve("RestoreRootConfigDirectory").unwrap_or_else(|| directory.to_path_buf()),
            config_file: msbuild_string::non_blank(project.get_property("RestoreConfigFile"))
                .map(|value| PathBuf::from(paths::resolve_path(directory, value))),
        }
    }

    /// Settings that apply to `project`
    ///
    /// # Errors
    /// Returns an error if the configuration source fails
    pub fn settings_for(&self, project: &dyn ProjectView) -> Result<Arc<Settings>> {
        self.get(&Self::request_for(project))
    }

    pub fn get(&self, request: &SettingsRequest) -> Result<Arc<Settings>> {
        if let Some(cached) = self.cache.get(request) {
            return Ok(Arc::clone(&cached));
        }

        let settings = Arc::new(self.source.load(request)?);
        let entry = self
            .cache
            .entry(request.clone())
            .or_insert_with(|| Arc::clone(&settings));
        Ok(Arc::clone(&entry))
    }

    #[cfg(test)]
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}
