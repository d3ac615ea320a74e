use msbuild_restore_graph::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Mock ConfigurationSource for testing
///
/// Returns the same settings for every request and counts the loads.
pub struct MockConfigurationSource {
    pub settings: Settings,
    pub should_fail: bool,
    loads: AtomicUsize,
}

impl MockConfigurationSource {
    pub fn new() -> Self {
        Self::with_settings(Settings {
            config_file_paths: vec!["/home/user/.nuget/NuGet/NuGet.Config".to_string()],
            sources: vec![PackageSourceSetting::new(
                "nuget.org",
                "https://api.nuget.org/v3/index.json",
            )],
            fallback_folders: Vec::new(),
            global_packages_folder: Some("/home/user/.nuget/packages".to_string()),
            repository_path: None,
        })
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            should_fail: false,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl ConfigurationSource for MockConfigurationSource {
    fn load(&self, _request: &SettingsRequest) -> Result<Settings> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.should_fail {
            anyhow::bail!("Mock configuration failure");
        }
        Ok(self.settings.clone())
    }
}
