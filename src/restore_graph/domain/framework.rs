//! Target framework identities.
//!
//! Parses both short folder names (`net472`, `netstandard2.0`,
//! `net6.0-windows`) and full monikers (`.NETCoreApp,Version=v6.0`).
//! Anything unrecognised becomes [`NuGetFramework::unsupported`].

use serde::{Deserialize, Serialize};
use std::fmt;

pub const NET_FRAMEWORK: &str = ".NETFramework";
pub const NET_CORE_APP: &str = ".NETCoreApp";
pub const NET_STANDARD: &str = ".NETStandard";
pub const NATIVE: &str = "native";
pub const UNSUPPORTED: &str = "Unsupported";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct NuGetFramework {
    identifier: String,
    version: [u32; 4],
    profile: Option<String>,
    platform: Option<String>,
    platform_version: Option<String>,
}

impl NuGetFramework {
    pub fn new(identifier: &str, version: [u32; 4]) -> Self {
        Self {
            identifier: identifier.to_string(),
            version,
            profile: None,
            platform: None,
            platform_version: None,
        }
    }

    pub fn unsupported() -> Self {
        Self::new(UNSUPPORTED, [0; 4])
    }

    pub fn is_unsupported(&self) -> bool {
        self.identifier == UNSUPPORTED
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn version(&self) -> [u32; 4] {
        self.version
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    /// Parses a short folder name or a full moniker.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.contains(',') {
            Self::parse_moniker(value)
        } else {
            Self::parse_folder_name(value)
        }
    }

    /// Parses `.NETFramework,Version=v4.7.2[,Profile=Client]`.
    pub fn parse_moniker(value: &str) -> Self {
        let mut parts = value.split(',').map(str::trim);
        let identifier = match parts.next() {
            Some(identifier) => identifier,
            None => return Self::unsupported(),
        };
        let identifier = match canonical_identifier(identifier) {
            Some(identifier) => identifier,
            None => return Self::unsupported(),
        };

        let mut framework = Self::new(identifier, [0; 4]);
        for part in parts {
            let Some((key, val)) = part.split_once('=') else {
                continue;
            };
            if key.trim().eq_ignore_ascii_case("version") {
                match parse_dotted(val.trim().trim_start_matches(['v', 'V'])) {
                    Some(version) => framework.version = version,
                    None => return Self::unsupported(),
                }
            } else if key.trim().eq_ignore_ascii_case("profile") {
                // folder names carry the profile lowercased
                framework.profile = Some(val.trim().to_ascii_lowercase());
            }
        }
        framework
    }

    /// Parses `net472`, `netcoreapp3.1`, `netstandard2.0`, `net6.0-windows10.0.19041`.
    pub fn parse_folder_name(value: &str) -> Self {
        let lower = value.trim().to_ascii_lowercase();
        let (main, suffix) = match lower.split_once('-') {
            Some((main, suffix)) => (main, Some(suffix)),
            None => (lower.as_str(), None),
        };

        let (identifier, digits) = if let Some(rest) = main.strip_prefix("netstandard") {
            (NET_STANDARD, rest)
        } else if let Some(rest) = main.strip_prefix("netcoreapp") {
            (NET_CORE_APP, rest)
        } else if let Some(rest) = main.strip_prefix("net") {
            if rest.contains('.') {
                (NET_CORE_APP, rest)
            } else {
                (NET_FRAMEWORK, rest)
            }
        } else if main == NATIVE {
            return Self::new(NATIVE, [0; 4]);
        } else {
            return Self::unsupported();
        };

        let version = if digits.contains('.') {
            parse_dotted(digits)
        } else {
            parse_compact(digits)
        };
        let Some(version) = version else {
            return Self::unsupported();
        };

        let mut framework = Self::new(identifier, version);
        if let Some(suffix) = suffix {
            if identifier == NET_CORE_APP && version[0] >= 5 {
                let split = suffix
                    .find(|c: char| c.is_ascii_digit())
                    .unwrap_or(suffix.len());
                framework.platform = Some(suffix[..split].to_string());
                if split < suffix.len() {
                    framework.platform_version = Some(suffix[split..].to_string());
                }
            } else {
                framework.profile = Some(suffix.to_string());
            }
        }
        framework
    }

    /// Combines a target framework moniker with an optional platform moniker
    /// such as `Windows,Version=7.0`.
    pub fn from_monikers(target_framework_moniker: &str, target_platform_moniker: Option<&str>) -> Self {
        let mut framework = Self::parse_moniker(target_framework_moniker);
        if framework.identifier == NET_CORE_APP && framework.version[0] >= 5 {
            if let Some(platform) = target_platform_moniker.filter(|p| !p.trim().is_empty()) {
                let mut parts = platform.split(',').map(str::trim);
                if let Some(name) = parts.next() {
                    framework.platform = Some(name.to_ascii_lowercase());
                }
                for part in parts {
                    if let Some((key, val)) = part.split_once('=') {
                        if key.trim().eq_ignore_ascii_case("version") {
                            let val = val.trim().trim_start_matches(['v', 'V']);
                            if !val.is_empty() {
                                framework.platform_version = Some(val.to_string());
                            }
                        }
                    }
                }
            }
        }
        framework
    }

    /// Short folder name, e.g. `net472` or `net6.0-windows`.
    pub fn short_folder_name(&self) -> String {
        let [major, minor, build, revision] = self.version;
        match self.identifier.as_str() {
            NET_FRAMEWORK => {
                let mut name = format!("net{}{}", major, minor);
                if build > 0 || revision > 0 {
                    name.push_str(&build.to_string());
                }
                if revision > 0 {
                    name.push_str(&revision.to_string());
                }
                if let Some(profile) = &self.profile {
                    name.push('-');
                    name.push_str(profile);
                }
                name
            }
            NET_CORE_APP if major >= 5 => {
                let mut name = format!("net{}.{}", major, minor);
                if let Some(platform) = &self.platform {
                    name.push('-');
                    name.push_str(platform);
                    if let Some(version) = &self.platform_version {
                        name.push_str(version);
                    }
                }
                name
            }
            NET_CORE_APP => format!("netcoreapp{}.{}", major, minor),
            NET_STANDARD => format!("netstandard{}.{}", major, minor),
            NATIVE => NATIVE.to_string(),
            _ => "unsupported".to_string(),
        }
    }

    /// Full moniker, e.g. `.NETFramework,Version=v4.7.2`.
    pub fn dotnet_framework_name(&self) -> String {
        if self.is_unsupported() || self.identifier == NATIVE {
            return self.identifier.clone();
        }
        let [major, minor, build, revision] = self.version;
        let mut version = format!("{}.{}", major, minor);
        if build > 0 || revision > 0 {
            version.push_str(&format!(".{}", build));
        }
        if revision > 0 {
            version.push_str(&format!(".{}", revision));
        }
        let mut name = format!("{},Version=v{}", self.identifier, version);
        if let Some(profile) = &self.profile {
            name.push_str(&format!(",Profile={}", profile));
        }
        name
    }
}

impl fmt::Display for NuGetFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short_folder_name())
    }
}

impl From<String> for NuGetFramework {
    fn from(value: String) -> Self {
        NuGetFramework::parse(&value)
    }
}

impl From<NuGetFramework> for String {
    fn from(framework: NuGetFramework) -> Self {
        framework.short_folder_name()
    }
}

fn canonical_identifier(identifier: &str) -> Option<&'static str> {
    [NET_FRAMEWORK, NET_CORE_APP, NET_STANDARD, NATIVE]
        .into_iter()
        .find(|known| known.eq_ignore_ascii_case(identifier))
}

fn parse_dotted(value: &str) -> Option<[u32; 4]> {
    let parts: Vec<&str> = value.split('.').collect();
    if parts.is_empty() || parts.len() > 4 {
        return None;
    }
    let mut version = [0u32; 4];
    for (slot, part) in version.iter_mut().zip(parts) {
        *slot = part.parse().ok()?;
    }
    Some(version)
}

/// `472` -> 4.7.2; each digit is one component.
fn parse_compact(value: &str) -> Option<[u32; 4]> {
    if value.is_empty() || value.len() > 4 || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let mut version = [0u32; 4];
    for (slot, digit) in version.iter_mut().zip(value.chars()) {
        *slot = digit.to_digit(10)?;
    }
    Some(version)
}
