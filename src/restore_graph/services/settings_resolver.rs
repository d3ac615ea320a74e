use crate::restore_graph::domain::{ProjectView, Settings};
use crate::shared::msbuild_string;
use crate::shared::paths::{self, PathComparison};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// List keyword that empties a source or fallback folder list
pub const CLEAR_KEYWORD: &str = "Clear";

/// Configuration that applies to one project after every override was applied
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub sources: Vec<String>,
    pub fallback_folders: Vec<String>,
    pub packages_path: Option<String>,
    pub repository_path: Option<String>,
    pub config_file_paths: Vec<String>,
}

/// SettingsResolver service for the per-project settings override chain
///
/// Each setting is taken from the first of these that yields a value:
/// 1. a global property of the invoking build
/// 2. the project property of the same name
/// 3. ambient NuGet configuration
///
/// Relative paths resolve against the project directory.
pub struct SettingsResolver;

impl SettingsResolver {
    /// Resolves every setting for one project
    ///
    /// # Arguments
    /// * `view` - The outer project view
    /// * `inner_nodes` - Views of every resolved target framework
    /// * `settings` - Ambient configuration for the project
    pub fn resolve(
        view: &dyn ProjectView,
        inner_nodes: &[Arc<dyn ProjectView>],
        settings: &Settings,
    ) -> EffectiveSettings {
        EffectiveSettings {
            sources: Self::sources(view, inner_nodes, settings),
            fallback_folders: Self::fallback_folders(view, inner_nodes, settings),
            packages_path: Self::packages_path(view, settings),
            repository_path: Self::repository_path(view, settings),
            config_file_paths: settings.config_file_paths.clone(),
        }
    }

    /// `RestorePackagesPath` global property, then project property, then the global packages folder
    pub fn packages_path(view: &dyn ProjectView, settings: &Settings) -> Option<String> {
        let directory = view.directory();
        paths::resolve_optional(directory, view.get_global_property("RestorePackagesPath"))
            .or_else(|| paths::resolve_optional(directory, view.get_property("RestorePackagesPath")))
            .or_else(|| settings.global_packages_folder.clone())
    }

    /// `RestoreRepositoryPath` global property, then project property, then
    /// `repositoryPath` from configuration, then `packages` next to the
    /// solution (or the project when there is no solution)
    pub fn repository_path(view: &dyn ProjectView, settings: &Settings) -> Option<String> {
        let directory = view.directory();
        paths::resolve_optional(directory, view.get_global_property("RestoreRepositoryPath"))
            .or_else(|| paths::resolve_optional(directory, view.get_property("RestoreRepositoryPath")))
            .or_else(|| settings.repository_path.clone())
            .or_else(|| {
                let solution_directory = match view.get_property("SolutionPath") {
                    Some(solution) if !solution.eq_ignore_ascii_case("*Undefined*") => {
                        let solution = paths::resolve_path(directory, solution);
                        Path::new(&solution)
                            .parent()
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|| directory.to_path_buf())
                    }
                    _ => directory.to_path_buf(),
                };
                Some(paths::resolve_path(&solution_directory, "packages"))
            })
    }

    /// Package sources with additional per-framework sources appended
    pub fn sources(
        view: &dyn ProjectView,
        inner_nodes: &[Arc<dyn ProjectView>],
        settings: &Settings,
    ) -> Vec<String> {
        let directory = view.directory();
        let startup_directory = view.get_global_property("OriginalMSBuildStartupDirectory");

        let primary = Self::first_list(
            view.split_global_property("RestoreSources"),
            view.split_property("RestoreSources"),
            |source| Self::global_absolute_path(startup_directory, directory, &Self::fix_source_path(source)),
            |source| paths::resolve_path(directory, &Self::fix_source_path(source)),
        )
        .unwrap_or_else(|| settings.enabled_sources());

        let additional: Vec<String> = Self::additional_values(inner_nodes, "RestoreAdditionalProjectSources")
            .into_iter()
            .map(|source| paths::resolve_path(directory, &Self::fix_source_path(&source)))
            .collect();

        Self::append_distinct(primary, additional)
    }

    /// Fallback folders with additional per-framework folders appended, minus excludes
    pub fn fallback_folders(
        view: &dyn ProjectView,
        inner_nodes: &[Arc<dyn ProjectView>],
        settings: &Settings,
    ) -> Vec<String> {
        let directory = view.directory();
        let startup_directory = view.get_property("MSBuildStartupDirectory");

        let primary = Self::first_list(
            view.split_global_property("RestoreFallbackFolders"),
            view.split_property("RestoreFallbackFolders"),
            |folder| Self::global_absolute_path(startup_directory, directory, folder),
            |folder| paths::resolve_path(directory, folder),
        )
        .unwrap_or_else(|| settings.fallback_folders.clone());

        let comparison = PathComparison::for_current_os();
        let excludes: HashSet<String> =
            Self::additional_values(inner_nodes, "RestoreAdditionalProjectFallbackFoldersExcludes")
                .into_iter()
                .map(|folder| comparison.key(&paths::resolve_path(directory, &folder)))
                .collect();

        let additional: Vec<String> = Self::additional_values(inner_nodes, "RestoreAdditionalProjectFallbackFolders")
            .into_iter()
            .map(|folder| paths::resolve_path(directory, &folder))
            .filter(|folder| !excludes.contains(&comparison.key(folder)))
            .collect();

        Self::append_distinct(primary, additional)
    }

    /// True when the list holds the `Clear` keyword, ignoring case
    pub fn contains_clear_keyword(values: &[String]) -> bool {
        values.iter().any(|value| value.eq_ignore_ascii_case(CLEAR_KEYWORD))
    }

    /// Repairs `http:/host` into `http://host`, which MSBuild produces by collapsing slashes
    pub fn fix_source_path(source: &str) -> String {
        if source.contains("//") {
            return source.to_string();
        }
        let file_slashes = if cfg!(windows) { "//" } else { "///" };
        let mut result = source.to_string();
        for (prefix, slashes) in [("http:", "//"), ("https:", "//"), ("file:", file_slashes)] {
            result = Self::fix_prefix(&result, prefix, slashes);
        }
        result
    }

    fn fix_prefix(source: &str, prefix: &str, slashes: &str) -> String {
        let with_slash = format!("{}/", prefix);
        let starts_with_slash = source.len() >= prefix.len() + 2
            && source
                .get(..with_slash.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(&with_slash));
        if starts_with_slash {
            format!("{}{}{}", &source[..prefix.len()], slashes, &source[prefix.len() + 1..])
        } else {
            source.to_string()
        }
    }

    /// Global overrides win over project values; `Clear` in either empties the list
    fn first_list<G, P>(
        global_values: Option<Vec<String>>,
        project_values: Option<Vec<String>>,
        resolve_global: G,
        resolve_project: P,
    ) -> Option<Vec<String>>
    where
        G: Fn(&str) -> String,
        P: Fn(&str) -> String,
    {
        if let Some(values) = global_values {
            if Self::contains_clear_keyword(&values) {
                return Some(Vec::new());
            }
            return Some(values.iter().map(|v| resolve_global(v)).collect());
        }
        if let Some(values) = project_values {
            if Self::contains_clear_keyword(&values) {
                return Some(Vec::new());
            }
            return Some(values.iter().map(|v| resolve_project(v)).collect());
        }
        None
    }

    /// Global property paths resolve against the directory the build started in
    fn global_absolute_path(startup_directory: Option<&str>, project_directory: &Path, value: &str) -> String {
        match msbuild_string::non_blank(startup_directory) {
            Some(startup) => paths::resolve_path(Path::new(startup), value),
            None => paths::resolve_path(project_directory, value),
        }
    }

    /// Values of a per-framework list property across every inner node
    ///
    /// A `Clear` entry drops everything collected before it and is never
    /// returned itself.
    fn additional_values(inner_nodes: &[Arc<dyn ProjectView>], property: &str) -> Vec<String> {
        let mut values = Vec::new();
        for value in inner_nodes
            .iter()
            .flat_map(|node| msbuild_string::split(node.get_property(property)))
        {
            if value.eq_ignore_ascii_case(CLEAR_KEYWORD) {
                values.clear();
            } else {
                values.push(value);
            }
        }
        values
    }

    fn append_distinct(primary: Vec<String>, additional: Vec<String>) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        primary
            .into_iter()
            .chain(additional)
            .filter(|value| seen.insert(value.to_lowercase()))
            .collect()
    }
}
