pub mod dependency;
pub mod dependency_graph_spec;
pub mod framework;
pub mod global_properties;
pub mod include_flags;
pub mod item;
pub mod package_spec;
pub mod project_node;
pub mod project_view;
pub mod settings;
pub mod version;

pub use dependency::{
    CentralPackageVersion, DownloadDependency, FrameworkDependency, LibraryDependency,
    LibraryDependencyTarget, ProjectRestoreReference,
};
pub use dependency_graph_spec::{dgspec_file_name, DependencyGraphSpec, DGSPEC_FORMAT_VERSION};
pub use framework::NuGetFramework;
pub use global_properties::GlobalProperties;
pub use include_flags::{FrameworkDependencyFlags, LibraryIncludeFlags};
pub use item::ItemView;
pub use package_spec::{
    PackageSpec, PackagesConfigSettings, ProjectRestoreMetadata,
    ProjectRestoreMetadataFrameworkInfo, ProjectStyle, RestoreAuditProperties,
    RestoreLockProperties, RestoreMetadataLayout, RuntimeGraph, StandardRestoreSettings,
    TargetFrameworkInformation, WarningProperties,
};
pub use project_node::ProjectNode;
pub use project_view::{ProjectSnapshot, ProjectView};
pub use settings::{PackageSourceSetting, Settings, SettingsRequest};
pub use version::{NuGetVersion, VersionParseError, VersionRange};
