/// Outbound adapters - Infrastructure implementations of outbound ports
pub mod configuration;
pub mod filesystem;
pub mod msbuild;
pub mod restore;
