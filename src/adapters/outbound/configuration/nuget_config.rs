use crate::ports::outbound::ConfigurationSource;
use crate::restore_graph::domain::{PackageSourceSetting, Settings, SettingsRequest};
use crate::shared::paths;
use crate::shared::security;
use crate::shared::Result;
use anyhow::Context;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File names probed in each directory, in probe order
const CONFIG_FILE_NAMES: [&str; 3] = ["NuGet.Config", "nuget.config", "NuGet.config"];

const NUGET_ORG_NAME: &str = "nuget.org";
const NUGET_ORG_SOURCE: &str = "https://api.nuget.org/v3/index.json";
const NUGET_PACKAGES_ENV: &str = "NUGET_PACKAGES";

/// The sections of one `NuGet.Config` file this source understands.
#[derive(Debug, Default)]
struct ConfigFileSections {
    path: String,
    sources: Vec<(String, String)>,
    clears_sources: bool,
    disabled_sources: Vec<(String, bool)>,
    fallback_folders: Vec<String>,
    clears_fallback_folders: bool,
    config: Vec<(String, String)>,
}

/// NuGetConfigSource adapter for discovering and merging `NuGet.Config` files
///
/// Files are read from the root directory upward, then from the solution
/// directory, then from the user configuration. The closest file wins for
/// each key, and `<clear />` hides everything less specific. An explicit
/// config file replaces discovery entirely.
pub struct NuGetConfigSource {
    user_config_directory: Option<PathBuf>,
    home_directory: Option<PathBuf>,
    global_packages_override: Option<String>,
}

impl Default for NuGetConfigSource {
    fn default() -> Self {
        Self::new()
    }
}

impl NuGetConfigSource {
    /// A source reading the current user's configuration and `NUGET_PACKAGES`
    pub fn new() -> Self {
        let user_config_directory = if cfg!(windows) {
            dirs::config_dir().map(|dir| dir.join("NuGet"))
        } else {
            dirs::home_dir().map(|dir| dir.join(".nuget").join("NuGet"))
        };
        Self {
            user_config_directory,
            home_directory: dirs::home_dir(),
            global_packages_override: std::env::var(NUGET_PACKAGES_ENV)
                .ok()
                .filter(|value| !value.trim().is_empty()),
        }
    }

    /// A source with no user configuration and no environment overrides
    pub fn isolated(home_directory: Option<PathBuf>) -> Self {
        Self {
            user_config_directory: None,
            home_directory,
            global_packages_override: None,
        }
    }

    pub fn with_user_config_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.user_config_directory = Some(directory.into());
        self
    }

    pub fn with_global_packages_override(mut self, folder: impl Into<String>) -> Self {
        self.global_packages_override = Some(folder.into());
        self
    }

    /// Config files that apply to a request, most specific first
    fn discover(&self, request: &SettingsRequest) -> Vec<PathBuf> {
        if let Some(config_file) = &request.config_file {
            return vec![config_file.clone()];
        }

        let mut files = Vec::new();
        let mut seen = HashSet::new();
        let mut push = |path: PathBuf| {
            if seen.insert(paths::normalize(&path)) {
                files.push(path);
            }
        };

        for directory in request.root_directory.ancestors() {
            if let Some(file) = Self::config_file_in(directory) {
                push(file);
            }
        }
        if let Some(solution_directory) = &request.solution_directory {
            for directory in [solution_directory.clone(), solution_directory.join(".nuget")] {
                if let Some(file) = Self::config_file_in(&directory) {
                    push(file);
                }
            }
        }
        if let Some(directory) = &self.user_config_directory {
            if let Some(file) = Self::config_file_in(directory) {
                push(file);
            }
        }

        files
    }

    fn config_file_in(directory: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| directory.join(name))
            .find(|candidate| candidate.is_file())
    }

    fn read_file(path: &Path) -> Result<ConfigFileSections> {
        let content = security::read_validated(path, "NuGet configuration file")?;
        Self::parse(&content, path).with_context(|| {
            format!(
                "Failed to parse NuGet configuration file {}\n\n💡 Hint: Please verify that the file is well-formed XML with a <configuration> root",
                path.display()
            )
        })
    }

    fn parse(content: &str, path: &Path) -> Result<ConfigFileSections> {
        let document = roxmltree::Document::parse(content)?;
        let root = document.root_element();
        if !root.tag_name().name().eq_ignore_ascii_case("configuration") {
            anyhow::bail!("the root element is <{}>", root.tag_name().name());
        }

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        let mut sections = ConfigFileSections {
            path: path.to_string_lossy().into_owned(),
            ..Default::default()
        };

        for section in root.children().filter(|n| n.is_element()) {
            let entries = section.children().filter(|n| n.is_element());
            match section.tag_name().name() {
                "packageSources" => {
                    for entry in entries {
                        match entry.tag_name().name() {
                            "clear" => {
                                sections.sources.clear();
                                sections.clears_sources = true;
                            }
                            "add" => {
                                if let (Some(key), Some(value)) = (entry.attribute("key"), entry.attribute("value")) {
                                    let source = if paths::is_uri(value) {
                                        value.to_string()
                                    } else {
                                        paths::resolve_path(base, value)
                                    };
                                    sections.sources.push((key.to_string(), source));
                                }
                            }
                            _ => {}
                        }
                    }
                }
                "disabledPackageSources" => {
                    for entry in entries.filter(|e| e.has_tag_name("add")) {
                        if let (Some(key), Some(value)) = (entry.attribute("key"), entry.attribute("value")) {
                            sections
                                .disabled_sources
                                .push((key.to_string(), value.trim().eq_ignore_ascii_case("true")));
                        }
                    }
                }
                "fallbackPackageFolders" => {
                    for entry in entries {
                        match entry.tag_name().name() {
                            "clear" => {
                                sections.fallback_folders.clear();
                                sections.clears_fallback_folders = true;
                            }
                            "add" => {
                                if let Some(value) = entry.attribute("value") {
                                    sections.fallback_folders.push(paths::resolve_path(base, value));
                                }
                            }
                            _ => {}
                        }
                    }
                }
                "config" => {
                    for entry in entries.filter(|e| e.has_tag_name("add")) {
                        if let (Some(key), Some(value)) = (entry.attribute("key"), entry.attribute("value")) {
                            let value = match key {
                                "globalPackagesFolder" | "repositoryPath" => paths::resolve_path(base, value),
                                _ => value.to_string(),
                            };
                            sections.config.push((key.to_string(), value));
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(sections)
    }

    /// Merges parsed files, most specific first
    fn merge(&self, files: Vec<ConfigFileSections>) -> Settings {
        let mut settings = Settings::default();
        let mut source_names: HashSet<String> = HashSet::new();
        let mut disabled: Vec<(String, bool)> = Vec::new();
        let mut sources_cleared = false;
        let mut fallback_cleared = false;
        let mut any_sources = false;

        for file in files {
            settings.config_file_paths.push(file.path);

            if !sources_cleared {
                for (name, source) in file.sources {
                    any_sources = true;
                    if source_names.insert(name.to_lowercase()) {
                        settings.sources.push(PackageSourceSetting::new(name, source));
                    }
                }
                sources_cleared = file.clears_sources;
                any_sources |= file.clears_sources;
            }

            for (name, is_disabled) in file.disabled_sources {
                if !disabled.iter().any(|(seen, _)| seen.eq_ignore_ascii_case(&name)) {
                    disabled.push((name, is_disabled));
                }
            }

            if !fallback_cleared {
                for folder in file.fallback_folders {
                    if !settings.fallback_folders.contains(&folder) {
                        settings.fallback_folders.push(folder);
                    }
                }
                fallback_cleared = file.clears_fallback_folders;
            }

            for (key, value) in file.config {
                match key.as_str() {
                    "globalPackagesFolder" if settings.global_packages_folder.is_none() => {
                        settings.global_packages_folder = Some(value);
                    }
                    "repositoryPath" if settings.repository_path.is_none() => {
                        settings.repository_path = Some(value);
                    }
                    _ => {}
                }
            }
        }

        if !any_sources {
            settings
                .sources
                .push(PackageSourceSetting::new(NUGET_ORG_NAME, NUGET_ORG_SOURCE));
        }

        for source in settings.sources.iter_mut() {
            source.enabled = !disabled
                .iter()
                .any(|(name, is_disabled)| *is_disabled && name.eq_ignore_ascii_case(&source.name));
        }

        if let Some(folder) = &self.global_packages_override {
            settings.global_packages_folder = Some(folder.clone());
        }
        if settings.global_packages_folder.is_none() {
            settings.global_packages_folder = self
                .home_directory
                .as_ref()
                .map(|home| home.join(".nuget").join("packages").to_string_lossy().into_owned());
        }

        settings
    }
}

impl ConfigurationSource for NuGetConfigSource {
    fn load(&self, request: &SettingsRequest) -> Result<Settings> {
        let files = self.discover(request);
        debug!(
            root = %request.root_directory.display(),
            files = files.len(),
            "Loading NuGet configuration"
        );

        let parsed = files
            .iter()
            .map(|path| Self::read_file(path))
            .collect::<Result<Vec<_>>>()?;

        Ok(self.merge(parsed))
    }
}
