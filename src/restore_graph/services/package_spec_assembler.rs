use super::reference_extractor::ReferenceExtractor;
use super::settings_resolver::SettingsResolver;
use super::target_framework_resolver::{FrameworkViews, TargetFrameworkResolver};
use crate::restore_graph::domain::{
    LibraryDependency, NuGetFramework, PackageSpec, PackagesConfigSettings, ProjectNode,
    ProjectRestoreMetadata, ProjectRestoreMetadataFrameworkInfo, ProjectStyle, ProjectView,
    RestoreAuditProperties, RestoreLockProperties, RestoreMetadataLayout, RuntimeGraph, Settings,
    StandardRestoreSettings, TargetFrameworkInformation, WarningProperties,
};
use crate::restore_graph::policies::{
    CentralPackageManagementPolicy, CentralPackageManagementSettings, ProjectStylePolicy,
};
use crate::shared::error::RestoreGraphError;
use crate::shared::msbuild_string;
use crate::shared::paths;
use crate::shared::Result;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Why a project produced no package spec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No style could be determined
    UnknownStyle,
    /// Legacy project.json projects are not part of the graph
    ProjectJson,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnknownStyle => write!(f, "project style could not be determined"),
            SkipReason::ProjectJson => write!(f, "project.json projects are not restored from the graph"),
        }
    }
}

/// Result of assembling one project
#[derive(Debug, Clone)]
pub enum Assembled {
    Spec(Box<PackageSpec>),
    Skipped(SkipReason),
}

impl Assembled {
    pub fn into_spec(self) -> Option<PackageSpec> {
        match self {
            Assembled::Spec(spec) => Some(*spec),
            Assembled::Skipped(_) => None,
        }
    }
}

/// PackageSpecAssembler service for building one project's PackageSpec
///
/// Pure with respect to its inputs apart from the packages.config lookup in
/// the project directory, so it can run on any worker thread.
pub struct PackageSpecAssembler;

impl PackageSpecAssembler {
    /// Assembles the PackageSpec of one project
    ///
    /// # Arguments
    /// * `node` - The project's outer view and its inner views
    /// * `settings` - Ambient configuration for the project
    ///
    /// # Returns
    /// The package spec, or the reason the project is not part of the graph
    ///
    /// # Errors
    /// Returns a configuration error for malformed project data
    pub fn assemble(node: &ProjectNode, settings: &Settings) -> Result<Assembled> {
        let outer = node.outer();
        let project = outer.as_ref();

        let explicit_style = ProjectStylePolicy::explicit_style(project.get_property("RestoreProjectStyle"));
        let cpm = CentralPackageManagementPolicy::settings(project, explicit_style);

        let frameworks = TargetFrameworkResolver::resolve(outer, node.inner_nodes());
        let target_framework_infos = Self::target_framework_infos(&frameworks, cpm.enabled)?;

        let style_result = ProjectStylePolicy::determine(
            explicit_style,
            target_framework_infos.iter().any(|tfi| !tfi.dependencies.is_empty()),
            project.get_property("_CurrentProjectJsonPath"),
            project.directory(),
            project.get_property("MSBuildProjectName").unwrap_or_default(),
        );
        match style_result.style {
            ProjectStyle::Unknown => return Ok(Assembled::Skipped(SkipReason::UnknownStyle)),
            ProjectStyle::ProjectJson => return Ok(Assembled::Skipped(SkipReason::ProjectJson)),
            _ => {}
        }
        let style = style_result.style;

        let views: Vec<Arc<dyn ProjectView>> = frameworks.views().cloned().collect();
        let effective = SettingsResolver::resolve(project, &views, settings);

        let layout = if style == ProjectStyle::PackagesConfig {
            RestoreMetadataLayout::PackagesConfig(PackagesConfigSettings {
                packages_config_path: style_result.packages_config_path.clone(),
                repository_path: effective.repository_path.clone(),
            })
        } else {
            RestoreMetadataLayout::Standard(Self::standard_settings(
                project,
                style,
                frameworks.len(),
                cpm,
                effective.fallback_folders.clone(),
            ))
        };

        let full_path = project.full_path_string();
        let project_name = ReferenceExtractor::project_name(project);
        let output_path = ReferenceExtractor::restore_output_path(project);

        let mut metadata = ProjectRestoreMetadata::new(style, layout);
        metadata.cache_file_path = output_path
            .as_deref()
            .map(|output| Self::cache_file_path(output, &full_path));
        metadata.config_file_paths = effective.config_file_paths;
        metadata.output_path = output_path;
        metadata.original_target_frameworks = target_framework_infos
            .iter()
            .map(|tfi| {
                if tfi.target_alias.is_empty() {
                    tfi.framework_name.short_folder_name()
                } else {
                    tfi.target_alias.clone()
                }
            })
            .collect();
        metadata.packages_path = effective.packages_path;
        metadata.project_name = project_name.clone();
        metadata.project_path = full_path.clone();
        metadata.project_unique_name = full_path.clone();
        metadata.project_wide_warning_properties = WarningProperties::from_properties(
            project.get_property("TreatWarningsAsErrors"),
            project.get_property("WarningsAsErrors"),
            project.get_property("NoWarn"),
            project.get_property("WarningsNotAsErrors"),
        );
        metadata.restore_lock_properties = RestoreLockProperties {
            restore_packages_with_lock_file: project.get_property("RestorePackagesWithLockFile").map(str::to_string),
            nuget_lock_file_path: project.get_property("NuGetLockFilePath").map(str::to_string),
            restore_locked_mode: project.is_property_true("RestoreLockedMode"),
        };
        metadata.sources = effective.sources;
        metadata.target_frameworks = target_framework_infos
            .iter()
            .map(|tfi| ProjectRestoreMetadataFrameworkInfo {
                framework_name: tfi.framework_name.clone(),
                target_alias: tfi.target_alias.clone(),
                project_references: frameworks
                    .get(&tfi.target_alias)
                    .map(|view| ReferenceExtractor::project_restore_references(view.as_ref()))
                    .unwrap_or_default(),
            })
            .collect();

        let spec = PackageSpec {
            name: project_name,
            version: ReferenceExtractor::project_version(project)?,
            file_path: full_path,
            restore_metadata: metadata,
            target_frameworks: target_framework_infos,
            runtime_graph: Self::runtime_graph(project, &frameworks),
        };

        Ok(Assembled::Spec(Box::new(spec)))
    }

    /// Builds one TargetFrameworkInformation per resolved framework
    ///
    /// # Errors
    /// Returns a configuration error for malformed dependency data or when
    /// both `PackageTargetFallback` and `AssetTargetFallback` are set
    pub fn target_framework_infos(
        frameworks: &FrameworkViews,
        central_package_management_enabled: bool,
    ) -> Result<Vec<TargetFrameworkInformation>> {
        let mut infos = Vec::with_capacity(frameworks.len());

        for (alias, view) in frameworks.iter() {
            let view = view.as_ref();
            let mut info = TargetFrameworkInformation::new(Self::framework(view, alias), alias);
            info.runtime_identifier_graph_path = view.get_property("RuntimeIdentifierGraphPath").map(str::to_string);

            let package_target_fallback = Self::frameworks_of(view.get_property("PackageTargetFallback"));
            let asset_target_fallback = Self::frameworks_of(view.get_property("AssetTargetFallback"));
            if !package_target_fallback.is_empty() && !asset_target_fallback.is_empty() {
                return Err(RestoreGraphError::configuration(
                    view.full_path(),
                    "PackageTargetFallback and AssetTargetFallback cannot be used together",
                    "Remove PackageTargetFallback and keep AssetTargetFallback",
                )
                .into());
            }
            if !asset_target_fallback.is_empty() {
                info.imports = asset_target_fallback;
                info.asset_target_fallback = true;
            } else {
                info.imports = package_target_fallback;
            }

            info.dependencies = ReferenceExtractor::packages(view, central_package_management_enabled)?;
            info.download_dependencies = ReferenceExtractor::package_downloads(view)?;
            info.framework_references = ReferenceExtractor::framework_references(view);

            if central_package_management_enabled {
                info.central_package_versions = ReferenceExtractor::central_versions(view)?;
                LibraryDependency::apply_central_version_information(
                    &mut info.dependencies,
                    &info.central_package_versions,
                );
            }

            infos.push(info);
        }

        Ok(infos)
    }

    /// `<output>/<project file name>.nuget.cache`
    pub fn cache_file_path(output_path: &str, project_path: &str) -> String {
        Path::new(output_path)
            .join(format!("{}.nuget.cache", paths::file_name(project_path)))
            .to_string_lossy()
            .into_owned()
    }

    /// The framework from `TargetFrameworkMoniker`, else the alias as a folder name
    fn framework(view: &dyn ProjectView, alias: &str) -> NuGetFramework {
        match msbuild_string::non_blank(view.get_property("TargetFrameworkMoniker")) {
            Some(moniker) => NuGetFramework::from_monikers(moniker, view.get_property("TargetPlatformMoniker")),
            None if !alias.is_empty() => NuGetFramework::parse_folder_name(alias),
            None => NuGetFramework::unsupported(),
        }
    }

    fn frameworks_of(value: Option<&str>) -> Vec<NuGetFramework> {
        msbuild_string::split(value)
            .iter()
            .map(|name| NuGetFramework::parse(name))
            .collect()
    }

    fn standard_settings(
        project: &dyn ProjectView,
        style: ProjectStyle,
        framework_count: usize,
        cpm: CentralPackageManagementSettings,
        fallback_folders: Vec<String>,
    ) -> StandardRestoreSettings {
        let multi_targeting_style = matches!(style, ProjectStyle::PackageReference | ProjectStyle::DotnetToolReference);
        // A plural TargetFrameworks with a single entry still counts as cross-targeting
        let cross_targeting = multi_targeting_style
            && (framework_count > 1 || msbuild_string::non_blank(project.get_property("TargetFrameworks")).is_some());

        StandardRestoreSettings {
            cross_targeting,
            fallback_folders,
            skip_content_file_write: project.get_property("TargetFramework").is_none()
                && project.get_property("TargetFrameworks").is_none(),
            validate_runtime_assets: project.is_property_true("ValidateRuntimeIdentifierCompatibility"),
            central_package_versions_enabled: cpm.enabled && style == ProjectStyle::PackageReference,
            central_package_floating_versions_enabled: cpm.floating_versions_enabled,
            central_package_version_override_disabled: cpm.version_override_disabled,
            central_package_transitive_pinning_enabled: cpm.transitive_pinning_enabled,
            restore_audit_properties: RestoreAuditProperties {
                enable_audit: project.get_property("NuGetAudit").map(str::to_string),
                audit_level: project.get_property("NuGetAuditLevel").map(str::to_string),
                audit_mode: project.get_property("NuGetAuditMode").map(str::to_string),
            },
        }
    }

    /// Runtime identifiers and supports profiles of the outer view and every framework view
    fn runtime_graph(project: &dyn ProjectView, frameworks: &FrameworkViews) -> RuntimeGraph {
        let mut all_views: Vec<&dyn ProjectView> = vec![project];
        for view in frameworks.views() {
            all_views.push(view.as_ref());
        }

        let mut runtimes = Vec::new();
        let mut supports = Vec::new();
        let mut seen_runtimes = HashSet::new();
        let mut seen_supports = HashSet::new();

        for view in all_views {
            let identifiers = msbuild_string::split(view.get_property("RuntimeIdentifiers"))
                .into_iter()
                .chain(msbuild_string::split(view.get_property("RuntimeIdentifier")));
            for rid in identifiers {
                if seen_runtimes.insert(rid.clone()) {
                    runtimes.push(rid);
                }
            }
            for profile in msbuild_string::split(view.get_property("RuntimeSupports")) {
                if seen_supports.insert(profile.clone()) {
                    supports.push(profile);
                }
            }
        }

        RuntimeGraph { runtimes, supports }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restore_graph::domain::{ItemView, ProjectSnapshot, VersionRange};
    use std::fs;
    use tempfile::TempDir;

    fn sdk_project(path: &str) -> ProjectSnapshot {
        ProjectSnapshot::new(path)
            .with_property("MSBuildProjectName", crate::shared::paths::file_stem(path))
            .with_property("MSBuildProjectExtensionsPath", "obj/")
            .with_property("SolutionPath", "*Undefined*")
    }

    fn assemble(node: ProjectNode) -> PackageSpec {
        PackageSpecAssembler::assemble(&node, &Settings::default())
            .unwrap()
            .into_spec()
            .expect("spec")
    }

    fn node(view: ProjectSnapshot) -> ProjectNode {
        ProjectNode::new(Arc::new(view))
    }

    #[test]
    fn test_single_framework_package_reference_project() {
        let view = sdk_project("/repo/A/A.csproj")
            .with_property("TargetFramework", "net6.0")
            .with_property("TargetFrameworkMoniker", ".NETCoreApp,Version=v6.0")
            .with_item("PackageReference", ItemView::new("Foo").with_metadata("Version", "1.2.3"));

        let spec = assemble(node(view));

        assert_eq!(spec.name, "A");
        assert_eq!(spec.version.to_string(), "1.0.0");
        assert_eq!(spec.restore_metadata.project_style, ProjectStyle::PackageReference);
        assert_eq!(spec.restore_metadata.project_unique_name, "/repo/A/A.csproj");
        assert!(!spec.restore_metadata.cross_targeting());
        assert_eq!(spec.restore_metadata.output_path.as_deref(), Some("/repo/A/obj"));
        assert_eq!(
            spec.restore_metadata.cache_file_path.as_deref(),
            Some("/repo/A/obj/A.csproj.nuget.cache")
        );
        assert_eq!(spec.restore_metadata.original_target_frameworks, vec!["net6.0"]);
        assert_eq!(spec.target_frameworks.len(), 1);
        let tfi = &spec.target_frameworks[0];
        assert_eq!(tfi.framework_name.short_folder_name(), "net6.0");
        assert_eq!(tfi.dependencies[0].name, "Foo");
        assert_eq!(tfi.dependencies[0].version_range.as_ref().unwrap().to_string(), "[1.2.3, )");
    }

    #[test]
    fn test_cross_targeting_asymmetry() {
        let plural = sdk_project("/repo/A/A.csproj")
            .with_property("TargetFrameworks", "net6.0")
            .with_item("PackageReference", ItemView::new("Foo").with_metadata("Version", "1.0.0"));
        assert!(assemble(node(plural)).restore_metadata.cross_targeting());

        let singular = sdk_project("/repo/A/A.csproj")
            .with_property("TargetFramework", "net6.0")
            .with_item("PackageReference", ItemView::new("Foo").with_metadata("Version", "1.0.0"));
        assert!(!assemble(node(singular)).restore_metadata.cross_targeting());
    }

    #[test]
    fn test_multi_targeting_uses_inner_views() {
        let outer = sdk_project("/repo/Lib/Lib.csproj")
            .with_property("TargetFrameworks", "net472;netstandard2.0")
            .with_property("RestoreProjectStyle", "PackageReference");
        let net472 = sdk_project("/repo/Lib/Lib.csproj")
            .with_property("TargetFramework", "net472")
            .with_property("RuntimeIdentifiers", "win-x64;win-x86")
            .with_item("PackageReference", ItemView::new("Legacy").with_metadata("Version", "1.0.0"))
            .with_item(
                "ProjectReference",
                ItemView::new("../Core/Core.csproj").with_metadata("FullPath", "/repo/Core/Core.csproj"),
            );

        let node = ProjectNode::new(Arc::new(outer)).with_inner("net472", Arc::new(net472));
        let spec = assemble(node);

        assert!(spec.restore_metadata.cross_targeting());
        assert_eq!(spec.target_frameworks.len(), 2);
        assert_eq!(spec.target_frameworks[0].dependencies.len(), 1);
        assert!(spec.target_frameworks[1].dependencies.is_empty());
        assert_eq!(spec.restore_metadata.target_frameworks[0].project_references.len(), 1);
        assert!(spec.restore_metadata.target_frameworks[1].project_references.is_empty());
        assert_eq!(spec.runtime_graph.runtimes, vec!["win-x64", "win-x86"]);
    }

    #[test]
    fn test_central_versions_are_merged() {
        let view = sdk_project("/repo/A/A.csproj")
            .with_property("TargetFramework", "net6.0")
            .with_property("_CentralPackageVersionsEnabled", "true")
            .with_item("PackageReference", ItemView::new("foo"))
            .with_item("PackageVersion", ItemView::new("Foo").with_metadata("Version", "2.0.0"));

        let spec = assemble(node(view));

        assert!(spec.restore_metadata.central_package_versions_enabled());
        let dependency = &spec.target_frameworks[0].dependencies[0];
        assert_eq!(dependency.version_range, Some(VersionRange::parse("2.0.0").unwrap()));
        assert!(dependency.version_centrally_managed);
        assert_eq!(spec.target_frameworks[0].central_package_versions.len(), 1);
    }

    #[test]
    fn test_packages_config_project_gets_reduced_metadata() {
        let temp_dir = TempDir::new().unwrap();
        let project_path = temp_dir.path().join("B.csproj");
        fs::write(temp_dir.path().join("packages.config"), "<packages />").unwrap();

        let view = sdk_project(&project_path.to_string_lossy())
            .with_property("TargetFrameworkMoniker", ".NETFramework,Version=v4.7.2");
        let spec = assemble(node(view));

        assert_eq!(spec.restore_metadata.project_style, ProjectStyle::PackagesConfig);
        let legacy = spec.restore_metadata.packages_config().expect("packages.config layout");
        assert!(legacy.packages_config_path.as_deref().unwrap().ends_with("packages.config"));
        assert!(legacy.repository_path.as_deref().unwrap().ends_with("packages"));
        assert_eq!(spec.restore_metadata.original_target_frameworks, vec!["net472"]);
    }

    #[test]
    fn test_unknown_style_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let view = sdk_project(&temp_dir.path().join("C.csproj").to_string_lossy());
        let result = PackageSpecAssembler::assemble(&node(view), &Settings::default()).unwrap();
        assert!(matches!(result, Assembled::Skipped(SkipReason::UnknownStyle)));
    }

    #[test]
    fn test_fallback_conflict_is_configuration_error() {
        let view = sdk_project("/repo/A/A.csproj")
            .with_property("TargetFramework", "netcoreapp3.1")
            .with_property("PackageTargetFallback", "dnxcore50")
            .with_property("AssetTargetFallback", "net461");
        let err = PackageSpecAssembler::assemble(&node(view), &Settings::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RestoreGraphError>(),
            Some(RestoreGraphError::Configuration { .. })
        ));
    }

    #[test]
    fn test_asset_target_fallback_recorded() {
        let view = sdk_project("/repo/A/A.csproj")
            .with_property("TargetFramework", "net6.0")
            .with_property("AssetTargetFallback", "net461;net472")
            .with_item("PackageReference", ItemView::new("Foo").with_metadata("Version", "1.0.0"));
        let spec = assemble(node(view));
        let tfi = &spec.target_frameworks[0];
        assert!(tfi.asset_target_fallback);
        assert_eq!(tfi.imports.len(), 2);
    }

    #[test]
    fn test_cache_file_path() {
        assert_eq!(
            PackageSpecAssembler::cache_file_path("/repo/A/obj", "/repo/A/A.csproj"),
            "/repo/A/obj/A.csproj.nuget.cache"
        );
    }
}
