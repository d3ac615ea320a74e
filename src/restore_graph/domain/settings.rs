use std::path::PathBuf;

/// A package source declared in configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSourceSetting {
    pub name: String,
    pub source: String,
    pub enabled: bool,
}

impl PackageSourceSetting {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            enabled: true,
        }
    }
}

/// Ambient NuGet configuration that applies to one project.
///
/// Values are already resolved to absolute paths by the configuration source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Config files that contributed, most specific first
    pub config_file_paths: Vec<String>,
    pub sources: Vec<PackageSourceSetting>,
    pub fallback_folders: Vec<String>,
    pub global_packages_folder: Option<String>,
    pub repository_path: Option<String>,
}

impl Settings {
    pub fn enabled_sources(&self) -> Vec<String> {
        self.sources
            .iter()
            .filter(|source| source.enabled)
            .map(|source| source.source.clone())
            .collect()
    }
}

/// Where to look for configuration for one project.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SettingsRequest {
    /// `RestoreSolutionDirectory`, when restoring from a solution
    pub solution_directory: Option<PathBuf>,
    /// `RestoreRootConfigDirectory`, else the project directory
    pub root_directory: PathBuf,
    /// `RestoreConfigFile`, which replaces discovery entirely
    pub config_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enabled_sources_skips_disabled() {
        let mut disabled = PackageSourceSetting::new("local", "/feeds/local");
        disabled.enabled = false;
        let settings = Settings {
            sources: vec![
                PackageSourceSetting::new("nuget.org", "https://api.nuget.org/v3/index.json"),
                disabled,
            ],
            ..Default::default()
        };
        assert_eq!(
            settings.enabled_sources(),
            vec!["https://api.nuget.org/v3/index.json".to_string()]
        );
    }
}
