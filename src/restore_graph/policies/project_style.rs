use crate::restore_graph::domain::ProjectStyle;
use crate::shared::msbuild_string;
use std::path::Path;

/// Outcome of the project style rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectStyleResult {
    pub style: ProjectStyle,
    /// Set when the style is PackagesConfig
    pub packages_config_path: Option<String>,
}

impl ProjectStyleResult {
    /// Styles that never reach the graph
    pub fn is_restorable(&self) -> bool {
        !matches!(self.style, ProjectStyle::Unknown | ProjectStyle::ProjectJson)
    }
}

/// ProjectStylePolicy decides how a project declares its dependencies
///
/// Priority order:
/// 1. explicit `RestoreProjectStyle` property
/// 2. PackageReference items in any target framework
/// 3. a project.json path (`_CurrentProjectJsonPath`)
/// 4. `packages.<ProjectName>.config` or `packages.config` next to the project
/// 5. Unknown
pub struct ProjectStylePolicy;

impl ProjectStylePolicy {
    /// Parses the explicit `RestoreProjectStyle` property, ignoring unrecognised values
    pub fn explicit_style(restore_project_style: Option<&str>) -> Option<ProjectStyle> {
        msbuild_string::non_blank(restore_project_style).and_then(ProjectStyle::parse)
    }

    /// Applies the priority rule
    ///
    /// # Arguments
    /// * `explicit_style` - Parsed `RestoreProjectStyle`, if any
    /// * `has_package_reference_items` - Whether any framework declares package references
    /// * `project_json_path` - Value of `_CurrentProjectJsonPath`
    /// * `project_directory` - Directory holding the project file
    /// * `project_name` - `MSBuildProjectName`, used for `packages.<name>.config`
    ///
    /// # Returns
    /// The style plus the packages.config path for PackagesConfig projects
    pub fn determine(
        explicit_style: Option<ProjectStyle>,
        has_package_reference_items: bool,
        project_json_path: Option<&str>,
        project_directory: &Path,
        project_name: &str,
    ) -> ProjectStyleResult {
        let packages_config = Self::find_packages_config(project_directory, project_name);

        let style = if let Some(style) = explicit_style {
            style
        } else if has_package_reference_items {
            ProjectStyle::PackageReference
        } else if msbuild_string::non_blank(project_json_path).is_some() {
            ProjectStyle::ProjectJson
        } else if packages_config.is_some() {
            ProjectStyle::PackagesConfig
        } else {
            ProjectStyle::Unknown
        };

        let packages_config_path = if style == ProjectStyle::PackagesConfig {
            Some(packages_config.unwrap_or_else(|| {
                project_directory
                    .join("packages.config")
                    .to_string_lossy()
                    .into_owned()
            }))
        } else {
            None
        };

        ProjectStyleResult {
            style,
            packages_config_path,
        }
    }

    /// The project-specific `packages.<name>.config` wins over `packages.config`
    fn find_packages_config(project_directory: &Path, project_name: &str) -> Option<String> {
        let mut candidates = Vec::with_capacity(2);
        if !project_name.is_empty() {
            candidates.push(project_directory.join(format!("packages.{}.config", project_name)));
        }
        candidates.push(project_directory.join("packages.config"));

        candidates
            .into_iter()
            .find(|candidate| candidate.is_file())
            .map(|path| path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_style_wins() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("packages.config"), "<packages />").unwrap();

        let result = ProjectStylePolicy::determine(
            Some(ProjectStyle::DotnetToolReference),
            true,
            None,
            temp_dir.path(),
            "App",
        );

        assert_eq!(result.style, ProjectStyle::DotnetToolReference);
        assert_eq!(result.packages_config_path, None);
    }

    #[test]
    fn test_package_reference_items_infer_style() {
        let temp_dir = TempDir::new().unwrap();
        let result = ProjectStylePolicy::determine(None, true, Some("/x/project.json"), temp_dir.path(), "App");
        assert_eq!(result.style, ProjectStyle::PackageReference);
    }

    #[test]
    fn test_project_json_is_not_restorable() {
        let temp_dir = TempDir::new().unwrap();
        let result = ProjectStylePolicy::determine(None, false, Some("/x/project.json"), temp_dir.path(), "App");
        assert_eq!(result.style, ProjectStyle::ProjectJson);
        assert!(!result.is_restorable());
    }

    #[test]
    fn test_project_specific_packages_config_preferred() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("packages.config"), "<packages />").unwrap();
        fs::write(temp_dir.path().join("packages.Legacy.config"), "<packages />").unwrap();

        let result = ProjectStylePolicy::determine(None, false, None, temp_dir.path(), "Legacy");

        assert_eq!(result.style, ProjectStyle::PackagesConfig);
        assert!(result
            .packages_config_path
            .unwrap()
            .ends_with("packages.Legacy.config"));
    }

    #[test]
    fn test_plain_packages_config() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("packages.config"), "<packages />").unwrap();

        let result = ProjectStylePolicy::determine(None, false, None, temp_dir.path(), "Legacy");

        assert_eq!(result.style, ProjectStyle::PackagesConfig);
        assert!(result.packages_config_path.unwrap().ends_with("packages.config"));
    }

    #[test]
    fn test_nothing_found_is_unknown() {
        let temp_dir = TempDir::new().unwrap();
        let result = ProjectStylePolicy::determine(None, false, None, temp_dir.path(), "App");
        assert_eq!(result.style, ProjectStyle::Unknown);
        assert!(!result.is_restorable());
    }

    #[test]
    fn test_explicit_style_parsing() {
        assert_eq!(
            ProjectStylePolicy::explicit_style(Some("PackageReference")),
            Some(ProjectStyle::PackageReference)
        );
        assert_eq!(ProjectStylePolicy::explicit_style(Some(" ")), None);
        assert_eq!(ProjectStylePolicy::explicit_style(None), None);
    }
}
