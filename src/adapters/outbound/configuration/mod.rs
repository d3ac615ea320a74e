/// Configuration adapters for ambient NuGet settings
mod nuget_config;

pub use nuget_config::NuGetConfigSource;
