use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

/// Asset groups a dependency contributes to the consuming project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct LibraryIncludeFlags(u8);

impl LibraryIncludeFlags {
    pub const NONE: Self = Self(0);
    pub const RUNTIME: Self = Self(1);
    pub const COMPILE: Self = Self(1 << 1);
    pub const BUILD: Self = Self(1 << 2);
    pub const NATIVE: Self = Self(1 << 3);
    pub const CONTENT_FILES: Self = Self(1 << 4);
    pub const ANALYZERS: Self = Self(1 << 5);
    pub const BUILD_TRANSITIVE: Self = Self(1 << 6);
    pub const ALL: Self = Self(0b0111_1111);

    /// Assets that are private to a project unless `PrivateAssets` says otherwise
    pub const DEFAULT_SUPPRESS_PARENT: Self =
        Self(Self::BUILD.0 | Self::CONTENT_FILES.0 | Self::ANALYZERS.0);

    const NAMED: [(&'static str, Self); 7] = [
        ("Runtime", Self::RUNTIME),
        ("Compile", Self::COMPILE),
        ("Build", Self::BUILD),
        ("Native", Self::NATIVE),
        ("ContentFiles", Self::CONTENT_FILES),
        ("Analyzers", Self::ANALYZERS),
        ("BuildTransitive", Self::BUILD_TRANSITIVE),
    ];

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Parses flag names such as `runtime`, `all` or `none`; unknown names are ignored.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = Self::NONE;
        for name in names {
            let name = name.as_ref().trim();
            if name.eq_ignore_ascii_case("all") {
                flags = flags | Self::ALL;
            } else if let Some((_, flag)) = Self::NAMED
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(name))
            {
                flags = flags | *flag;
            }
        }
        flags
    }

    /// Parses a `;` delimited flag list, falling back to `default` when it is blank.
    pub fn parse_or(value: Option<&str>, default: Self) -> Self {
        let names = crate::shared::msbuild_string::split(value);
        if names.is_empty() {
            default
        } else {
            Self::from_names(names)
        }
    }
}

impl BitOr for LibraryIncludeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for LibraryIncludeFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl Not for LibraryIncludeFlags {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0 & Self::ALL.0)
    }
}

impl fmt::Display for LibraryIncludeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::NONE {
            return f.write_str("None");
        }
        if *self == Self::ALL {
            return f.write_str("All");
        }
        let names: Vec<&str> = Self::NAMED
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect();
        f.write_str(&names.join(", "))
    }
}

impl From<String> for LibraryIncludeFlags {
    fn from(value: String) -> Self {
        Self::from_names(value.split([',', ';']))
    }
}

impl From<LibraryIncludeFlags> for String {
    fn from(flags: LibraryIncludeFlags) -> Self {
        flags.to_string()
    }
}

/// Private-asset setting of a framework reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FrameworkDependencyFlags {
    #[default]
    None,
    All,
}

impl FrameworkDependencyFlags {
    /// `all` anywhere in the list makes the reference fully private
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if names
            .into_iter()
            .any(|name| name.as_ref().trim().eq_ignore_ascii_case("all"))
        {
            FrameworkDependencyFlags::All
        } else {
            FrameworkDependencyFlags::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        let flags = LibraryIncludeFlags::from_names(["runtime", "Compile", "bogus"]);
        assert_eq!(flags, LibraryIncludeFlags::RUNTIME | LibraryIncludeFlags::COMPILE);
        assert_eq!(LibraryIncludeFlags::from_names(["none"]), LibraryIncludeFlags::NONE);
        assert_eq!(LibraryIncludeFlags::from_names(["All"]), LibraryIncludeFlags::ALL);
    }

    #[test]
    fn test_parse_or_defaults_when_blank() {
        assert_eq!(
            LibraryIncludeFlags::parse_or(Some("  "), LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT),
            LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT
        );
        assert_eq!(
            LibraryIncludeFlags::parse_or(None, LibraryIncludeFlags::ALL),
            LibraryIncludeFlags::ALL
        );
        assert_eq!(
            LibraryIncludeFlags::parse_or(Some("build;analyzers"), LibraryIncludeFlags::ALL),
            LibraryIncludeFlags::BUILD | LibraryIncludeFlags::ANALYZERS
        );
    }

    #[test]
    fn test_include_minus_exclude() {
        let include = LibraryIncludeFlags::ALL;
        let exclude = LibraryIncludeFlags::from_names(["compile", "build"]);
        let effective = include & !exclude;
        assert!(!effective.contains(LibraryIncludeFlags::COMPILE));
        assert!(effective.contains(LibraryIncludeFlags::RUNTIME));
        assert!(effective.contains(LibraryIncludeFlags::BUILD_TRANSITIVE));
    }

    #[test]
    fn test_display_and_round_trip() {
        assert_eq!(LibraryIncludeFlags::ALL.to_string(), "All");
        assert_eq!(LibraryIncludeFlags::NONE.to_string(), "None");
        let flags = LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT;
        assert_eq!(flags.to_string(), "Build, ContentFiles, Analyzers");
        assert_eq!(LibraryIncludeFlags::from(flags.to_string()), flags);
    }

    #[test]
    fn test_framework_dependency_flags() {
        assert_eq!(FrameworkDependencyFlags::from_names(["none", "ALL"]), FrameworkDependencyFlags::All);
        assert_eq!(FrameworkDependencyFlags::from_names(Vec::<String>::new()), FrameworkDependencyFlags::None);
    }
}
