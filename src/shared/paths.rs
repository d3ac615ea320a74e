//! Path resolution and OS-aware path comparison.

use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};

/// How project paths and unique names are compared.
///
/// Restore identity keys are plain strings, so two spellings of the same file
/// on a case-insensitive file system must compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathComparison {
    Ordinal,
    IgnoreCase,
}

impl PathComparison {
    /// Case-insensitive on Windows and macOS, ordinal elsewhere.
    pub fn for_current_os() -> Self {
        if cfg!(any(windows, target_os = "macos")) {
            PathComparison::IgnoreCase
        } else {
            PathComparison::Ordinal
        }
    }

    /// Normalized key for hashing under this comparison.
    pub fn key(self, value: &str) -> String {
        match self {
            PathComparison::Ordinal => value.to_string(),
            PathComparison::IgnoreCase => value.to_lowercase(),
        }
    }

    pub fn eq(self, a: &str, b: &str) -> bool {
        match self {
            PathComparison::Ordinal => a == b,
            PathComparison::IgnoreCase => a.to_lowercase() == b.to_lowercase(),
        }
    }

    pub fn cmp(self, a: &str, b: &str) -> Ordering {
        match self {
            PathComparison::Ordinal => a.cmp(b),
            PathComparison::IgnoreCase => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
        }
    }
}

/// True for values that carry a URI scheme such as `https://` or `file:///`.
pub fn is_uri(value: &str) -> bool {
    match value.find("://") {
        Some(index) => {
            index > 1
                && value[..index]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
        }
        None => false,
    }
}

/// Resolves `value` against `base` the way MSBuild resolves relative paths.
///
/// URIs are returned untouched, absolute paths are normalized, and relative
/// paths are joined onto `base` and normalized lexically. Backslashes are
/// treated as separators on non-Windows hosts.
pub fn resolve_path(base: &Path, value: &str) -> String {
    let value = value.trim();
    if is_uri(value) {
        return value.to_string();
    }

    let value = to_native_separators(value);
    let candidate = Path::new(&value);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    };

    normalize(&joined).to_string_lossy().into_owned()
}

/// Like [`resolve_path`], returning `None` for absent or blank values.
pub fn resolve_optional(base: &Path, value: Option<&str>) -> Option<String> {
    crate::shared::msbuild_string::non_blank(value).map(|v| resolve_path(base, v))
}

/// Lexically removes `.` and `..` components without touching the file system.
pub fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() {
                    result.push("..");
                }
            }
            other => result.push(other.as_os_str()),
        }
    }
    result
}

/// Converts `\` to `/` on hosts where `\` is not a separator.
pub fn to_native_separators(value: &str) -> String {
    if cfg!(windows) {
        value.to_string()
    } else {
        value.replace('\\', "/")
    }
}

/// The final component of a path string, or the whole string if it has none.
pub fn file_name(value: &str) -> String {
    Path::new(&to_native_separators(value))
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| value.to_string())
}

/// The file name without its extension.
pub fn file_stem(value: &str) -> String {
    Path::new(&to_native_separators(value))
        .file_stem()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| value.to_string())
}

/// Case-insensitive extension check, with or without the leading dot.
pub fn has_extension(path: &Path, extension: &str) -> bool {
    let wanted = extension.trim_start_matches('.');
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}
