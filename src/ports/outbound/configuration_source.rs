use crate::restore_graph::domain::{Settings, SettingsRequest};
use crate::shared::Result;

/// ConfigurationSource port for ambient NuGet settings
///
/// Implementations discover configuration files starting from the request's
/// root directory and return already-resolved values.
pub trait ConfigurationSource: Send + Sync {
    /// Loads the settings that apply to one request
    ///
    /// # Errors
    /// Returns an error if a discovered configuration file is malformed
    fn load(&self, request: &SettingsRequest) -> Result<Settings>;
}
