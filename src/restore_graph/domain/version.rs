//! NuGet versions and version ranges.
//!
//! Only what restore-graph generation needs: parsing the forms MSBuild
//! projects use (`1.2.3`, `[1.0]`, `[1.0,2.0)`, `1.*`), normalized display,
//! and bound inspection for the exact-version rule on package downloads.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{input}' is not a valid {kind} string")]
pub struct VersionParseError {
    pub input: String,
    pub kind: &'static str,
}

impl VersionParseError {
    fn version(input: &str) -> Self {
        Self {
            input: input.to_string(),
            kind: "version",
        }
    }

    fn range(input: &str) -> Self {
        Self {
            input: input.to_string(),
            kind: "version range",
        }
    }
}

/// A semantic version with NuGet's optional fourth (revision) component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NuGetVersion {
    major: u64,
    minor: u64,
    patch: u64,
    revision: u64,
    release_labels: Vec<String>,
    metadata: Option<String>,
}

impl NuGetVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            revision: 0,
            release_labels: Vec::new(),
            metadata: None,
        }
    }

    /// The version used for projects that declare none
    pub fn default_project_version() -> Self {
        Self::new(1, 0, 0)
    }

    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        input.parse()
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }
}

impl FromStr for NuGetVersion {
    type Err = VersionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let (rest, metadata) = match trimmed.split_once('+') {
            Some((rest, metadata)) if !metadata.is_empty() => (rest, Some(metadata.to_string())),
            Some(_) => return Err(VersionParseError::version(input)),
            None => (trimmed, None),
        };
        let (core, labels) = match rest.split_once('-') {
            Some((core, labels)) => (core, Some(labels)),
            None => (rest, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.is_empty() || parts.len() > 4 {
            return Err(VersionParseError::version(input));
        }
        let mut numbers = [0u64; 4];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(VersionParseError::version(input));
            }
            *slot = part
                .parse()
                .map_err(|_| VersionParseError::version(input))?;
        }

        let release_labels = match labels {
            Some(labels) => {
                let labels: Vec<String> = labels.split('.').map(str::to_string).collect();
                let valid = labels.iter().all(|label| {
                    !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
                });
                if !valid {
                    return Err(VersionParseError::version(input));
                }
                labels
            }
            None => Vec::new(),
        };

        Ok(Self {
            major: numbers[0],
            minor: numbers[1],
            patch: numbers[2],
            revision: numbers[3],
            release_labels,
            metadata,
        })
    }
}

impl fmt::Display for NuGetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.revision > 0 {
            write!(f, ".{}", self.revision)?;
        }
        if !self.release_labels.is_empty() {
            write!(f, "-{}", self.release_labels.join("."))?;
        }
        if let Some(metadata) = &self.metadata {
            write!(f, "+{}", metadata)?;
        }
        Ok(())
    }
}

impl TryFrom<String> for NuGetVersion {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NuGetVersion> for String {
    fn from(version: NuGetVersion) -> Self {
        version.to_string()
    }
}

fn compare_labels(a: &[String], b: &[String]) -> Ordering {
    // A stable release sorts above any prerelease of the same version
    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    for (left, right) in a.iter().zip(b) {
        let ordering = match (left.parse::<u64>(), right.parse::<u64>()) {
            (Ok(l), Ok(r)) => l.cmp(&r),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => left.to_ascii_lowercase().cmp(&right.to_ascii_lowercase()),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    a.len().cmp(&b.len())
}

impl Ord for NuGetVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch, self.revision)
            .cmp(&(other.major, other.minor, other.patch, other.revision))
            .then_with(|| compare_labels(&self.release_labels, &other.release_labels))
    }
}

impl PartialOrd for NuGetVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Build metadata does not take part in equality.
impl PartialEq for NuGetVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for NuGetVersion {}

/// A range of versions with optional, inclusive or exclusive bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRange {
    min: Option<NuGetVersion>,
    include_min: bool,
    max: Option<NuGetVersion>,
    include_max: bool,
    float: Option<String>,
}

impl VersionRange {
    /// `(, )`: any version
    pub fn all() -> Self {
        Self {
            min: None,
            include_min: false,
            max: None,
            include_max: false,
            float: None,
        }
    }

    /// `[version, )`
    pub fn at_least(version: NuGetVersion) -> Self {
        Self {
            min: Some(version),
            include_min: true,
            ..Self::all()
        }
    }

    /// `[version, version]`
    pub fn exact(version: NuGetVersion) -> Self {
        Self {
            min: Some(version.clone()),
            include_min: true,
            max: Some(version),
            include_max: true,
            float: None,
        }
    }

    pub fn parse(input: &str) -> Result<Self, VersionParseError> {
        input.parse()
    }

    pub fn min_version(&self) -> Option<&NuGetVersion> {
        self.min.as_ref()
    }

    pub fn max_version(&self) -> Option<&NuGetVersion> {
        self.max.as_ref()
    }

    pub fn has_lower_and_upper_bounds(&self) -> bool {
        self.min.is_some() && self.max.is_some()
    }

    /// True for a pinned version such as `[1.0.0]`
    pub fn is_exact(&self) -> bool {
        self.include_min
            && self.include_max
            && self.float.is_none()
            && matches!((&self.min, &self.max), (Some(min), Some(max)) if min == max)
    }

    pub fn is_floating(&self) -> bool {
        self.float.is_some()
    }

    pub fn satisfies(&self, version: &NuGetVersion) -> bool {
        let above_min = match &self.min {
            Some(min) if self.include_min => version >= min,
            Some(min) => version > min,
            None => true,
        };
        let below_max = match &self.max {
            Some(max) if self.include_max => version <= max,
            Some(max) => version < max,
            None => true,
        };
        above_min && below_max
    }

    fn floating(pattern: &str, original: &str) -> Result<Self, VersionParseError> {
        let base = if pattern == "*" {
            NuGetVersion::new(0, 0, 0)
        } else {
            pattern
                .replace('*', "0")
                .parse()
                .map_err(|_| VersionParseError::range(original))?
        };
        Ok(Self {
            min: Some(base),
            include_min: true,
            max: None,
            include_max: false,
            float: Some(pattern.to_string()),
        })
    }
}

impl FromStr for VersionRange {
    type Err = VersionParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let value = input.trim();
        if value.is_empty() {
            return Err(VersionParseError::range(input));
        }

        let first = value.chars().next().unwrap_or_default();
        if first != '[' && first != '(' {
            if value.contains('*') {
                return Self::floating(value, input);
            }
            let version = value
                .parse()
                .map_err(|_| VersionParseError::range(input))?;
            return Ok(Self::at_least(version));
        }

        let include_min = first == '[';
        let include_max = match value.chars().last() {
            Some(']') => true,
            Some(')') => false,
            _ => return Err(VersionParseError::range(input)),
        };
        if value.len() < 2 {
            return Err(VersionParseError::range(input));
        }
        let inner = &value[1..value.len() - 1];

        let parse_bound = |part: &str| -> Result<Option<NuGetVersion>, VersionParseError> {
            let part = part.trim();
            if part.is_empty() {
                Ok(None)
            } else {
                part.parse()
                    .map(Some)
                    .map_err(|_| VersionParseError::range(input))
            }
        };

        let parts: Vec<&str> = inner.split(',').collect();
        match parts.as_slice() {
            [single] => {
                if !(include_min && include_max) {
                    return Err(VersionParseError::range(input));
                }
                let version = parse_bound(single)?.ok_or_else(|| VersionParseError::range(input))?;
                Ok(Self::exact(version))
            }
            [left, right] => {
                if left.contains('*') {
                    if !right.trim().is_empty() {
                        return Err(VersionParseError::range(input));
                    }
                    return Self::floating(left.trim(), input);
                }
                let min = parse_bound(left)?;
                let max = parse_bound(right)?;
                if let (Some(min), Some(max)) = (&min, &max) {
                    let valid = min < max || (min == max && include_min && include_max);
                    if !valid {
                        return Err(VersionParseError::range(input));
                    }
                }
                Ok(Self {
                    include_min: include_min && min.is_some(),
                    include_max: include_max && max.is_some(),
                    min,
                    max,
                    float: None,
                })
            }
            _ => Err(VersionParseError::range(input)),
        }
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pattern) = &self.float {
            return write!(f, "[{}, )", pattern);
        }
        let open = if self.include_min { '[' } else { '(' };
        let close = if self.include_max { ']' } else { ')' };
        let min = self.min.as_ref().map(ToString::to_string).unwrap_or_default();
        let max = self.max.as_ref().map(ToString::to_string).unwrap_or_default();
        write!(f, "{}{}, {}{}", open, min, max, close)
    }
}

impl TryFrom<String> for VersionRange {
    type Error = VersionParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VersionRange> for String {
    fn from(range: VersionRange) -> Self {
        range.to_string()
    }
}
