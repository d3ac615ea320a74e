mod central_package_management;
mod project_style;

pub use central_package_management::{CentralPackageManagementPolicy, CentralPackageManagementSettings};
pub use project_style::{ProjectStylePolicy, ProjectStyleResult};
