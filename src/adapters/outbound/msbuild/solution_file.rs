use crate::ports::outbound::{SolutionProject, SolutionReader};
use crate::shared::paths;
use crate::shared::security;
use crate::shared::Result;
use anyhow::Context;
use regex::Regex;
use std::path::Path;

const SOLUTION_HEADER: &str = "Microsoft Visual Studio Solution File";

/// Project type GUIDs that never name an MSBuild project
const NON_MSBUILD_TYPE_GUIDS: [&str; 2] = [
    // solution folder
    "2150E333-8FDC-42A3-9474-1A3956D46DE8",
    // web site
    "E24C65DC-7377-472B-9ABA-BC803B73C61A",
];

/// SolutionFileReader adapter for `.sln` and `.slnx` solutions
pub struct SolutionFileReader {
    project_line: Regex,
}

impl SolutionFileReader {
    /// # Errors
    /// Returns an error if the project line pattern fails to compile
    pub fn new() -> Result<Self> {
        let project_line =
            Regex::new(r#"(?m)^Project\("\{([^}]+)\}"\)\s*=\s*"([^"]+)"\s*,\s*"([^"]+)"\s*,\s*"\{([^}]+)\}""#)?;
        Ok(Self { project_line })
    }

    fn parse_sln(&self, content: &str, solution_dir: &Path) -> Result<Vec<SolutionProject>> {
        if !content.contains(SOLUTION_HEADER) {
            anyhow::bail!("missing the '{}' header", SOLUTION_HEADER);
        }

        let projects = self
            .project_line
            .captures_iter(content)
            .map(|captures| {
                let type_guid = &captures[1];
                let relative_path = &captures[3];
                let is_msbuild_type = !NON_MSBUILD_TYPE_GUIDS
                    .iter()
                    .any(|guid| guid.eq_ignore_ascii_case(type_guid));
                SolutionProject {
                    name: captures[2].to_string(),
                    path: paths::resolve_path(solution_dir, relative_path).into(),
                    is_msbuild_project: is_msbuild_type && Self::has_project_extension(relative_path),
                }
            })
            .collect();

        Ok(projects)
    }

    fn parse_slnx(content: &str, solution_dir: &Path) -> Result<Vec<SolutionProject>> {
        let document = roxmltree::Document::parse(content)?;
        if document.root_element().tag_name().name() != "Solution" {
            anyhow::bail!("the root element is not <Solution>");
        }

        let projects = document
            .descendants()
            .filter(|node| node.has_tag_name("Project"))
            .filter_map(|node| node.attribute("Path"))
            .map(|relative_path| SolutionProject {
                name: paths::file_stem(relative_path),
                path: paths::resolve_path(solution_dir, relative_path).into(),
                is_msbuild_project: Self::has_project_extension(relative_path),
            })
            .collect();

        Ok(projects)
    }

    fn has_project_extension(relative_path: &str) -> bool {
        Path::new(&paths::to_native_separators(relative_path))
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.to_ascii_lowercase().ends_with("proj"))
    }
}

impl SolutionReader for SolutionFileReader {
    fn read_projects(&self, solution_path: &Path) -> Result<Vec<SolutionProject>> {
        let content = security::read_validated(solution_path, "solution file")?;
        let solution_dir = solution_path.parent().unwrap_or_else(|| Path::new(""));

        let projects = if paths::has_extension(solution_path, "slnx") {
            Self::parse_slnx(&content, solution_dir)
        } else {
            self.parse_sln(&content, solution_dir)
        };
        projects.with_context(|| format!("Failed to parse solution file {}", solution_path.display()))
    }
}
