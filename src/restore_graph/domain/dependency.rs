use super::include_flags::{FrameworkDependencyFlags, LibraryIncludeFlags};
use super::version::VersionRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What kind of library a dependency may resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LibraryDependencyTarget {
    Package,
    Project,
    ExternalProject,
}

/// A package or project dependency of one target framework.
///
/// `version_range` is `None` only for centrally managed package references
/// that have not been merged with the central version table yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryDependency {
    pub name: String,
    #[serde(default, rename = "version", skip_serializing_if = "Option::is_none")]
    pub version_range: Option<VersionRange>,
    pub target: LibraryDependencyTarget,
    pub include_type: LibraryIncludeFlags,
    pub suppress_parent: LibraryIncludeFlags,
    #[serde(default)]
    pub auto_referenced: bool,
    #[serde(default)]
    pub generate_path_property: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aliases: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub no_warn: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_override: Option<VersionRange>,
    #[serde(default)]
    pub version_centrally_managed: bool,
}

impl LibraryDependency {
    /// A package dependency with default asset flags
    pub fn package(name: impl Into<String>, version_range: Option<VersionRange>) -> Self {
        Self {
            name: name.into(),
            version_range,
            target: LibraryDependencyTarget::Package,
            include_type: LibraryIncludeFlags::ALL,
            suppress_parent: LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT,
            auto_referenced: false,
            generate_path_property: false,
            aliases: None,
            no_warn: Vec::new(),
            version_override: None,
            version_centrally_managed: false,
        }
    }

    /// Fills in missing versions from the central package version table.
    ///
    /// Auto-referenced dependencies and dependencies that already carry a
    /// version are left alone. A `VersionOverride` wins over the central
    /// entry. Central entries are matched by name, ignoring case.
    pub fn apply_central_version_information(
        dependencies: &mut [LibraryDependency],
        central_versions: &BTreeMap<String, CentralPackageVersion>,
    ) {
        for dependency in dependencies
            .iter_mut()
            .filter(|d| !d.auto_referenced && d.version_range.is_none())
        {
            if let Some(version_override) = &dependency.version_override {
                dependency.version_range = Some(version_override.clone());
                continue;
            }

            let central = central_versions.get(&dependency.name).or_else(|| {
                central_versions
                    .values()
                    .find(|c| c.name.eq_ignore_ascii_case(&dependency.name))
            });
            if let Some(central) = central {
                dependency.version_range = Some(central.version_range.clone());
            }
            dependency.version_centrally_managed = true;
        }
    }
}

/// A shared framework reference such as `Microsoft.AspNetCore.App`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkDependency {
    pub name: String,
    pub private_assets: FrameworkDependencyFlags,
}

/// A package downloaded without being referenced; always an exact version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadDependency {
    pub name: String,
    #[serde(rename = "version")]
    pub version_range: VersionRange,
}

/// One entry of the central package version table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CentralPackageVersion {
    pub name: String,
    #[serde(rename = "version")]
    pub version_range: VersionRange,
}

/// A project-to-project edge recorded in restore metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRestoreReference {
    pub project_unique_name: String,
    pub project_path: String,
    pub include_assets: LibraryIncludeFlags,
    pub exclude_assets: LibraryIncludeFlags,
    pub private_assets: LibraryIncludeFlags,
}

impl ProjectRestoreReference {
    /// The reference as a dependency on an external project
    pub fn to_library_dependency(&self) -> LibraryDependency {
        LibraryDependency {
            name: self.project_unique_name.clone(),
            version_range: None,
            target: LibraryDependencyTarget::ExternalProject,
            include_type: self.include_assets & !self.exclude_assets,
            suppress_parent: self.private_assets,
            auto_referenced: false,
            generate_path_property: false,
            aliases: None,
            no_warn: Vec::new(),
            version_override: None,
            version_centrally_managed: false,
        }
    }
}
