use super::item_deduplicator::ItemDeduplicator;
use crate::restore_graph::domain::{
    CentralPackageVersion, DownloadDependency, FrameworkDependency, FrameworkDependencyFlags,
    LibraryDependency, LibraryIncludeFlags, NuGetVersion, ProjectRestoreReference, ProjectView,
    VersionRange,
};
use crate::shared::error::RestoreGraphError;
use crate::shared::msbuild_string;
use crate::shared::paths;
use crate::shared::Result;
use std::collections::BTreeMap;

/// ReferenceExtractor service for reading typed dependency records out of a project view
///
/// Every item list is deduplicated by identity before extraction. Values that
/// cannot be parsed are reported as configuration errors against the project
/// they came from.
pub struct ReferenceExtractor;

impl ReferenceExtractor {
    /// Extracts `PackageReference` items
    ///
    /// # Arguments
    /// * `view` - The project view of one target framework
    /// * `central_package_management_enabled` - Whether versions come from a central table
    ///
    /// # Returns
    /// One dependency per distinct package. A blank version yields `(, )`, or
    /// no range at all when central package management is enabled.
    ///
    /// # Errors
    /// Returns a configuration error for an unparseable `Version` or `VersionOverride`
    pub fn packages(
        view: &dyn ProjectView,
        central_package_management_enabled: bool,
    ) -> Result<Vec<LibraryDependency>> {
        let items = ItemDeduplicator::distinct(view.get_items("PackageReference"));
        let mut dependencies = Vec::with_capacity(items.len());

        for item in items {
            let id = item.identity();
            let version_range = match msbuild_string::non_blank(item.get_metadata("Version")) {
                Some(version) => Some(Self::parse_range(view, id, version)?),
                None if central_package_management_enabled => None,
                None => Some(VersionRange::all()),
            };
            let version_override = msbuild_string::non_blank(item.get_metadata("VersionOverride"))
                .map(|value| Self::parse_range(view, id, value))
                .transpose()?;

            let include = LibraryIncludeFlags::parse_or(item.get_metadata("IncludeAssets"), LibraryIncludeFlags::ALL);
            let exclude = LibraryIncludeFlags::parse_or(item.get_metadata("ExcludeAssets"), LibraryIncludeFlags::NONE);

            let mut dependency = LibraryDependency::package(id, version_range);
            dependency.auto_referenced = msbuild_string::is_true(item.get_metadata("IsImplicitlyDefined"));
            dependency.generate_path_property = msbuild_string::is_true(item.get_metadata("GeneratePathProperty"));
            dependency.aliases = item.get_metadata("Aliases").map(str::to_string);
            dependency.include_type = include & !exclude;
            dependency.suppress_parent = LibraryIncludeFlags::parse_or(
                item.get_metadata("PrivateAssets"),
                LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT,
            );
            dependency.no_warn = msbuild_string::nuget_log_codes(item.get_metadata("NoWarn"));
            dependency.version_override = version_override;

            dependencies.push(dependency);
        }

        Ok(dependencies)
    }

    /// Extracts `ProjectReference` items as restore metadata edges
    ///
    /// Items with `ReferenceOutputAssembly` set to anything but true are
    /// dropped before deduplication. The `FullPath` metadata is both the
    /// project path and the unique name of the referenced project.
    pub fn project_restore_references(view: &dyn ProjectView) -> Vec<ProjectRestoreReference> {
        let items = ItemDeduplicator::distinct_iter(
            view.get_items("ProjectReference")
                .iter()
                .filter(|item| msbuild_string::is_true_or(item.get_metadata("ReferenceOutputAssembly"), true)),
        );

        items
            .into_iter()
            .map(|item| {
                let full_path = item
                    .get_metadata("FullPath")
                    .map(str::to_string)
                    .unwrap_or_else(|| paths::resolve_path(view.directory(), item.identity()));
                ProjectRestoreReference {
                    project_unique_name: full_path.clone(),
                    project_path: full_path,
                    include_assets: LibraryIncludeFlags::parse_or(item.get_metadata("IncludeAssets"), LibraryIncludeFlags::ALL),
                    exclude_assets: LibraryIncludeFlags::parse_or(item.get_metadata("ExcludeAssets"), LibraryIncludeFlags::NONE),
                    private_assets: LibraryIncludeFlags::parse_or(
                        item.get_metadata("PrivateAssets"),
                        LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT,
                    ),
                }
            })
            .collect()
    }

    /// Extracts `ProjectReference` items as external project dependencies
    pub fn project_references(view: &dyn ProjectView) -> Vec<LibraryDependency> {
        Self::project_restore_references(view)
            .iter()
            .map(ProjectRestoreReference::to_library_dependency)
            .collect()
    }

    /// Extracts `FrameworkReference` items
    pub fn framework_references(view: &dyn ProjectView) -> Vec<FrameworkDependency> {
        ItemDeduplicator::distinct(view.get_items("FrameworkReference"))
            .into_iter()
            .map(|item| FrameworkDependency {
                name: item.identity().to_string(),
                private_assets: FrameworkDependencyFlags::from_names(msbuild_string::split(
                    item.get_metadata("PrivateAssets"),
                )),
            })
            .collect()
    }

    /// Extracts `PackageDownload` items
    ///
    /// A `Version` may list several `;` separated ranges; each one yields its
    /// own download dependency.
    ///
    /// # Errors
    /// Returns a configuration error when `Version` is missing or any range is
    /// not an exact version
    pub fn package_downloads(view: &dyn ProjectView) -> Result<Vec<DownloadDependency>> {
        let mut downloads = Vec::new();

        for item in ItemDeduplicator::distinct(view.get_items("PackageDownload")) {
            let id = item.identity();
            let versions = match item.get_metadata("Version").filter(|v| !v.is_empty()) {
                Some(versions) => versions,
                None => {
                    return Err(RestoreGraphError::configuration(
                        view.full_path(),
                        format!("the PackageDownload item '{}' has no version", id),
                        "Add a Version metadata such as Version=\"[1.0.0]\"",
                    )
                    .into());
                }
            };

            for version in msbuild_string::split(Some(versions)) {
                let range = Self::parse_range(view, id, &version)?;
                let is_exact = range.has_lower_and_upper_bounds() && range.min_version() == range.max_version();
                if !is_exact {
                    return Err(RestoreGraphError::configuration(
                        view.full_path(),
                        format!(
                            "only exact versions are allowed for package downloads; '{}' uses '{}'",
                            id, version
                        ),
                        "Pin the download to one version, for example Version=\"[1.0.0]\"",
                    )
                    .into());
                }
                downloads.push(DownloadDependency {
                    name: id.to_string(),
                    version_range: range,
                });
            }
        }

        Ok(downloads)
    }

    /// Extracts the central package version table from `PackageVersion` items
    ///
    /// A blank version yields `(, )`.
    pub fn central_versions(view: &dyn ProjectView) -> Result<BTreeMap<String, CentralPackageVersion>> {
        let mut versions = BTreeMap::new();

        for item in ItemDeduplicator::distinct(view.get_items("PackageVersion")) {
            let id = item.identity();
            let version_range = match msbuild_string::non_blank(item.get_metadata("Version")) {
                Some(version) => Self::parse_range(view, id, version)?,
                None => VersionRange::all(),
            };
            versions.insert(
                id.to_string(),
                CentralPackageVersion {
                    name: id.to_string(),
                    version_range,
                },
            );
        }

        Ok(versions)
    }

    /// `PackageId`, else `AssemblyName`, else `MSBuildProjectName`
    pub fn project_name(view: &dyn ProjectView) -> String {
        msbuild_string::non_blank(view.get_property("PackageId"))
            .or_else(|| msbuild_string::non_blank(view.get_property("AssemblyName")))
            .map(str::to_string)
            .or_else(|| view.get_property("MSBuildProjectName").map(str::to_string))
            .unwrap_or_else(|| paths::file_stem(&view.full_path_string()))
    }

    /// `PackageVersion`, else `Version`, else 1.0.0
    ///
    /// # Errors
    /// Returns a configuration error when the declared version is invalid
    pub fn project_version(view: &dyn ProjectView) -> Result<NuGetVersion> {
        match view.get_property("PackageVersion").or_else(|| view.get_property("Version")) {
            None => Ok(NuGetVersion::default_project_version()),
            Some(version) => NuGetVersion::parse(version).map_err(|e| {
                RestoreGraphError::configuration(
                    view.full_path(),
                    e.to_string(),
                    "Set PackageVersion or Version to a valid version such as 1.0.0",
                )
                .into()
            }),
        }
    }

    /// `RestoreOutputPath`, else `MSBuildProjectExtensionsPath`, resolved against the project directory
    pub fn restore_output_path(view: &dyn ProjectView) -> Option<String> {
        view.get_property("RestoreOutputPath")
            .or_else(|| view.get_property("MSBuildProjectExtensionsPath"))
            .map(|path| paths::resolve_path(view.directory(), path))
    }

    fn parse_range(view: &dyn ProjectView, id: &str, value: &str) -> Result<VersionRange> {
        VersionRange::parse(value).map_err(|e| {
            RestoreGraphError::configuration(
                view.full_path(),
                format!("{} (package '{}')", e, id),
                "Use a version such as 1.0.0 or a range such as [1.0.0,2.0.0)",
            )
            .into()
        })
    }
}
