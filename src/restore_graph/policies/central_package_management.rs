use crate::restore_graph::domain::{ProjectStyle, ProjectView};
use crate::shared::msbuild_string;

/// Central package management switches of one project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CentralPackageManagementSettings {
    pub enabled: bool,
    pub version_override_disabled: bool,
    pub transitive_pinning_enabled: bool,
    pub floating_versions_enabled: bool,
}

/// CentralPackageManagementPolicy reads the CPM switches of a project
///
/// CPM only applies to projects without an explicit style or with an
/// explicit PackageReference style. Any other explicit style turns every
/// switch off.
pub struct CentralPackageManagementPolicy;

impl CentralPackageManagementPolicy {
    /// Reads the switches from the outer project view
    ///
    /// # Arguments
    /// * `view` - The outer project view
    /// * `explicit_style` - The parsed `RestoreProjectStyle` property, if any
    ///
    /// # Returns
    /// The CPM settings; all `false` when CPM does not apply to the style
    pub fn settings(
        view: &dyn ProjectView,
        explicit_style: Option<ProjectStyle>,
    ) -> CentralPackageManagementSettings {
        if !matches!(explicit_style, None | Some(ProjectStyle::PackageReference)) {
            return CentralPackageManagementSettings::default();
        }

        CentralPackageManagementSettings {
            enabled: view.is_property_true("_CentralPackageVersionsEnabled"),
            version_override_disabled: msbuild_string::is_false(
                view.get_property("CentralPackageVersionOverrideEnabled"),
            ),
            transitive_pinning_enabled: view.is_property_true("CentralPackageTransitivePinningEnabled"),
            floating_versions_enabled: view.is_property_true("CentralPackageFloatingVersionsEnabled"),
        }
    }
}
