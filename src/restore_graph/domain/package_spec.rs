use super::dependency::{
    CentralPackageVersion, DownloadDependency, FrameworkDependency, LibraryDependency,
    ProjectRestoreReference,
};
use super::framework::NuGetFramework;
use super::version::NuGetVersion;
use crate::shared::msbuild_string;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a project declares its package dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectStyle {
    Unknown,
    ProjectJson,
    PackageReference,
    DotnetCliTool,
    Standalone,
    PackagesConfig,
    DotnetToolReference,
}

impl ProjectStyle {
    /// Parses a `RestoreProjectStyle` value, ignoring case; `None` when unrecognised
    pub fn parse(value: &str) -> Option<Self> {
        const ALL: [ProjectStyle; 7] = [
            ProjectStyle::Unknown,
            ProjectStyle::ProjectJson,
            ProjectStyle::PackageReference,
            ProjectStyle::DotnetCliTool,
            ProjectStyle::Standalone,
            ProjectStyle::PackagesConfig,
            ProjectStyle::DotnetToolReference,
        ];
        let value = value.trim();
        ALL.into_iter()
            .find(|style| style.to_string().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for ProjectStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProjectStyle::Unknown => "Unknown",
            ProjectStyle::ProjectJson => "ProjectJson",
            ProjectStyle::PackageReference => "PackageReference",
            ProjectStyle::DotnetCliTool => "DotnetCliTool",
            ProjectStyle::Standalone => "Standalone",
            ProjectStyle::PackagesConfig => "PackagesConfig",
            ProjectStyle::DotnetToolReference => "DotnetToolReference",
        };
        f.write_str(name)
    }
}

/// One target framework's full dependency surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetFrameworkInformation {
    pub framework_name: NuGetFramework,
    #[serde(default)]
    pub target_alias: String,
    /// Fallback frameworks from `AssetTargetFallback` or `PackageTargetFallback`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<NuGetFramework>,
    #[serde(default)]
    pub asset_target_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_identifier_graph_path: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<LibraryDependency>,
    #[serde(default)]
    pub download_dependencies: Vec<DownloadDependency>,
    #[serde(default)]
    pub framework_references: Vec<FrameworkDependency>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub central_package_versions: BTreeMap<String, CentralPackageVersion>,
}

impl TargetFrameworkInformation {
    pub fn new(framework_name: NuGetFramework, target_alias: impl Into<String>) -> Self {
        Self {
            framework_name,
            target_alias: target_alias.into(),
            imports: Vec::new(),
            asset_target_fallback: false,
            runtime_identifier_graph_path: None,
            dependencies: Vec::new(),
            download_dependencies: Vec::new(),
            framework_references: Vec::new(),
            central_package_versions: BTreeMap::new(),
        }
    }
}

/// Per-framework project references recorded in restore metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRestoreMetadataFrameworkInfo {
    pub framework_name: NuGetFramework,
    #[serde(default)]
    pub target_alias: String,
    #[serde(default)]
    pub project_references: Vec<ProjectRestoreReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningProperties {
    pub all_warnings_as_errors: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings_as_errors: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub no_warn: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings_not_as_errors: Vec<String>,
}

impl WarningProperties {
    /// Builds warning properties from `TreatWarningsAsErrors`, `WarningsAsErrors`,
    /// `NoWarn` and `WarningsNotAsErrors`
    pub fn from_properties(
        treat_warnings_as_errors: Option<&str>,
        warnings_as_errors: Option<&str>,
        no_warn: Option<&str>,
        warnings_not_as_errors: Option<&str>,
    ) -> Self {
        Self {
            all_warnings_as_errors: msbuild_string::is_true(treat_warnings_as_errors),
            warnings_as_errors: msbuild_string::nuget_log_codes(warnings_as_errors),
            no_warn: msbuild_string::nuget_log_codes(no_warn),
            warnings_not_as_errors: msbuild_string::nuget_log_codes(warnings_not_as_errors),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreLockProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_packages_with_lock_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nuget_lock_file_path: Option<String>,
    #[serde(default)]
    pub restore_locked_mode: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreAuditProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_audit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audit_mode: Option<String>,
}

/// Settings only PackageReference-like projects carry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardRestoreSettings {
    pub cross_targeting: bool,
    #[serde(default)]
    pub fallback_folders: Vec<String>,
    pub skip_content_file_write: bool,
    pub validate_runtime_assets: bool,
    pub central_package_versions_enabled: bool,
    pub central_package_floating_versions_enabled: bool,
    pub central_package_version_override_disabled: bool,
    pub central_package_transitive_pinning_enabled: bool,
    #[serde(default)]
    pub restore_audit_properties: RestoreAuditProperties,
}

/// The reduced legacy shape for packages.config projects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackagesConfigSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages_config_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RestoreMetadataLayout {
    Standard(StandardRestoreSettings),
    PackagesConfig(PackagesConfigSettings),
}

/// Restore-relevant settings of one project.
///
/// `project_unique_name` and `project_path` are the identity keys used to link
/// projects together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRestoreMetadata {
    pub project_unique_name: String,
    pub project_name: String,
    pub project_path: String,
    pub project_style: ProjectStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages_path: Option<String>,
    #[serde(default)]
    pub config_file_paths: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub original_target_frameworks: Vec<String>,
    #[serde(default)]
    pub target_frameworks: Vec<ProjectRestoreMetadataFrameworkInfo>,
    #[serde(default)]
    pub project_wide_warning_properties: WarningProperties,
    #[serde(default)]
    pub restore_lock_properties: RestoreLockProperties,
    pub layout: RestoreMetadataLayout,
}

impl ProjectRestoreMetadata {
    /// Empty metadata of the given layout, identity fields blank
    pub fn new(project_style: ProjectStyle, layout: RestoreMetadataLayout) -> Self {
        Self {
            project_unique_name: String::new(),
            project_name: String::new(),
            project_path: String::new(),
            project_style,
            output_path: None,
            cache_file_path: None,
            packages_path: None,
            config_file_paths: Vec::new(),
            sources: Vec::new(),
            original_target_frameworks: Vec::new(),
            target_frameworks: Vec::new(),
            project_wide_warning_properties: WarningProperties::default(),
            restore_lock_properties: RestoreLockProperties::default(),
            layout,
        }
    }

    pub fn standard(&self) -> Option<&StandardRestoreSettings> {
        match &self.layout {
            RestoreMetadataLayout::Standard(settings) => Some(settings),
            RestoreMetadataLayout::PackagesConfig(_) => None,
        }
    }

    pub fn packages_config(&self) -> Option<&PackagesConfigSettings> {
        match &self.layout {
            RestoreMetadataLayout::PackagesConfig(settings) => Some(settings),
            RestoreMetadataLayout::Standard(_) => None,
        }
    }

    pub fn cross_targeting(&self) -> bool {
        self.standard().is_some_and(|s| s.cross_targeting)
    }

    pub fn central_package_versions_enabled(&self) -> bool {
        self.standard()
            .is_some_and(|s| s.central_package_versions_enabled)
    }

    /// All project references across every framework
    pub fn project_references(&self) -> impl Iterator<Item = &ProjectRestoreReference> {
        self.target_frameworks
            .iter()
            .flat_map(|framework| framework.project_references.iter())
    }
}

/// Declared runtime identifiers and compatibility profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeGraph {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runtimes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supports: Vec<String>,
}

/// The normalized per-project restore input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageSpec {
    pub name: String,
    pub version: NuGetVersion,
    pub file_path: String,
    pub restore_metadata: ProjectRestoreMetadata,
    #[serde(default)]
    pub target_frameworks: Vec<TargetFrameworkInformation>,
    #[serde(default)]
    pub runtime_graph: RuntimeGraph,
}

impl PackageSpec {
    pub fn unique_name(&self) -> &str {
        &self.restore_metadata.project_unique_name
    }
}
