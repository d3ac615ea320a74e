//! Static evaluation of MSBuild project files.
//!
//! Evaluation runs in two passes like MSBuild: every property of every
//! imported file first, then every item. Targets are never executed.

use super::condition;
use crate::restore_graph::domain::{GlobalProperties, ItemView, ProjectSnapshot, ProjectView};
use crate::shared::msbuild_string;
use crate::shared::paths;
use crate::shared::security;
use crate::shared::Result;
use anyhow::Context;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

const DIRECTORY_BUILD_PROPS: &str = "Directory.Build.props";
const DIRECTORY_PACKAGES_PROPS: &str = "Directory.Packages.props";
const UNDEFINED: &str = "*Undefined*";
const MAX_IMPORT_DEPTH: usize = 16;

/// Attributes of an item element that are not metadata
const ITEM_ATTRIBUTES: [&str; 6] = ["Include", "Exclude", "Update", "Remove", "Condition", "KeepMetadata"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    Properties,
    Items,
}

/// A project file evaluated without a build engine.
#[derive(Debug, Clone)]
pub struct StaticProject {
    pub snapshot: ProjectSnapshot,
    /// The root element carries an `Sdk` attribute
    pub is_sdk_style: bool,
}

/// Evaluates one project file with the given global properties
///
/// # Arguments
/// * `project_path` - Full path of the project file
/// * `global_properties` - Global properties; they cannot be overridden
/// * `startup_directory` - Directory the tool was started from
///
/// # Errors
/// Returns an error if the project or an import cannot be read or parsed,
/// or if a condition cannot be evaluated
pub fn evaluate_project(
    project_path: &Path,
    global_properties: &GlobalProperties,
    startup_directory: &Path,
) -> Result<StaticProject> {
    let content = security::read_validated(project_path, "project file")?;
    let document = roxmltree::Document::parse(&content)
        .with_context(|| format!("Failed to parse project file {}", project_path.display()))?;
    let is_sdk_style = document.root_element().attribute("Sdk").is_some();

    let mut evaluation = Evaluation::new(project_path, global_properties, startup_directory);

    let mut files = Vec::new();
    if !msbuild_string::is_false(evaluation.snapshot.get_property("ImportDirectoryBuildProps")) {
        files.extend(find_file_above(evaluation.snapshot.directory(), DIRECTORY_BUILD_PROPS));
    }
    if !msbuild_string::is_false(evaluation.snapshot.get_property("ImportDirectoryPackagesProps")) {
        files.extend(find_file_above(evaluation.snapshot.directory(), DIRECTORY_PACKAGES_PROPS));
    }
    files.push(project_path.to_path_buf());

    for pass in [Pass::Properties, Pass::Items] {
        let mut visited = HashSet::new();
        for file in &files {
            evaluation.evaluate_file(file, pass, 0, &mut visited)?;
        }
        if pass == Pass::Properties {
            evaluation.apply_property_defaults(is_sdk_style);
        }
    }

    evaluation.apply_item_defaults();

    Ok(StaticProject {
        snapshot: evaluation.snapshot,
        is_sdk_style,
    })
}

/// Nearest `file_name` in `directory` or one of its ancestors
pub fn find_file_above(directory: &Path, file_name: &str) -> Option<PathBuf> {
    directory
        .ancestors()
        .map(|dir| dir.join(file_name))
        .find(|candidate| candidate.is_file())
}

/// Expands `$(Name)` references; unknown names expand to the empty string
pub fn expand_properties(value: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'(') {
            chars.next();
            let name: String = chars.by_ref().take_while(|&ch| ch != ')').collect();
            if let Some(expanded) = lookup(name.trim()) {
                result.push_str(&expanded);
            }
        } else {
            result.push(c);
        }
    }

    result
}

struct Evaluation<'g> {
    snapshot: ProjectSnapshot,
    global_properties: &'g GlobalProperties,
}

impl<'g> Evaluation<'g> {
    fn new(project_path: &Path, global_properties: &'g GlobalProperties, startup_directory: &Path) -> Self {
        let mut snapshot = ProjectSnapshot::new(project_path).with_global_properties(global_properties.clone());

        let directory = snapshot.directory().to_string_lossy().into_owned();
        let full_path = project_path.to_string_lossy().into_owned();
        let file_name = paths::file_name(&full_path);
        let name = paths::file_stem(&full_path);
        let extension = project_path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        snapshot.set_property("MSBuildProjectFullPath", full_path);
        snapshot.set_property("MSBuildProjectDirectory", directory);
        snapshot.set_property("MSBuildProjectFile", file_name);
        snapshot.set_property("MSBuildProjectName", name);
        snapshot.set_property("MSBuildProjectExtension", extension);
        snapshot.set_property("MSBuildStartupDirectory", startup_directory.to_string_lossy());
        snapshot.set_property("SolutionPath", UNDEFINED);
        snapshot.set_property("SolutionDir", UNDEFINED);

        for (name, value) in global_properties.iter() {
            snapshot.set_property(name, value);
        }

        Self {
            snapshot,
            global_properties,
        }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        self.snapshot.get_property(name).map(str::to_string)
    }

    fn expand(&self, value: &str) -> String {
        expand_properties(value, &|name| self.lookup(name))
    }

    /// Sets a property unless a global property of the same name exists
    fn set_property(&mut self, name: &str, value: String) {
        if !self.global_properties.contains(name) {
            self.snapshot.set_property(name, value);
        }
    }

    fn condition_holds(&self, node: roxmltree::Node<'_, '_>, file: &Path) -> Result<bool> {
        let Some(condition) = node.attribute("Condition") else {
            return Ok(true);
        };
        let base = file.parent().unwrap_or_else(|| Path::new(""));
        let exists = |path: &str| Path::new(&paths::resolve_path(base, path)).exists();
        condition::evaluate(condition, &|raw| self.expand(raw), &exists).map_err(|message| {
            anyhow::anyhow!(
                "{}: invalid condition on <{}>: {}",
                file.display(),
                node.tag_name().name(),
                message
            )
        })
    }

    fn evaluate_file(&mut self, file: &Path, pass: Pass, depth: usize, visited: &mut HashSet<PathBuf>) -> Result<()> {
        if depth > MAX_IMPORT_DEPTH || !visited.insert(file.to_path_buf()) {
            return Ok(());
        }

        let content = security::read_validated(file, "project file")?;
        let document = roxmltree::Document::parse(&content)
            .with_context(|| format!("Failed to parse {}", file.display()))?;

        self.set_property(
            "MSBuildThisFileDirectory",
            format!("{}{}", file.parent().unwrap_or_else(|| Path::new("")).display(), std::path::MAIN_SEPARATOR),
        );
        self.evaluate_children(document.root_element(), file, pass, depth, visited)
    }

    fn evaluate_children(
        &mut self,
        parent: roxmltree::Node<'_, '_>,
        file: &Path,
        pass: Pass,
        depth: usize,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        for element in parent.children().filter(|n| n.is_element()) {
            match element.tag_name().name() {
                "PropertyGroup" if pass == Pass::Properties => {
                    if self.condition_holds(element, file)? {
                        self.evaluate_property_group(element, file)?;
                    }
                }
                "ItemGroup" if pass == Pass::Items => {
                    if self.condition_holds(element, file)? {
                        self.evaluate_item_group(element, file)?;
                    }
                }
                "Import" => {
                    if self.condition_holds(element, file)? {
                        self.evaluate_import(element, file, pass, depth, visited)?;
                    }
                }
                "Choose" => self.evaluate_choose(element, file, pass, depth, visited)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn evaluate_choose(
        &mut self,
        choose: roxmltree::Node<'_, '_>,
        file: &Path,
        pass: Pass,
        depth: usize,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        for branch in choose.children().filter(|n| n.is_element()) {
            let taken = match branch.tag_name().name() {
                "When" => self.condition_holds(branch, file)?,
                "Otherwise" => true,
                _ => false,
            };
            if taken {
                return self.evaluate_children(branch, file, pass, depth, visited);
            }
        }
        Ok(())
    }

    fn evaluate_import(
        &mut self,
        import: roxmltree::Node<'_, '_>,
        file: &Path,
        pass: Pass,
        depth: usize,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<()> {
        // SDK imports need a real build engine; missing imports are ignored
        if import.attribute("Sdk").is_some() {
            return Ok(());
        }
        let Some(project) = import.attribute("Project") else {
            return Ok(());
        };
        let base = file.parent().unwrap_or_else(|| Path::new(""));
        let target = PathBuf::from(paths::resolve_path(base, &self.expand(project)));
        if !target.is_file() {
            debug!(import = %target.display(), "Skipping missing import");
            return Ok(());
        }

        self.evaluate_file(&target, pass, depth + 1, visited)?;
        // Restore the importing file's directory for the remaining elements
        self.set_property(
            "MSBuildThisFileDirectory",
            format!("{}{}", base.display(), std::path::MAIN_SEPARATOR),
        );
        Ok(())
    }

    fn evaluate_property_group(&mut self, group: roxmltree::Node<'_, '_>, file: &Path) -> Result<()> {
        for property in group.children().filter(|n| n.is_element()) {
            if !self.condition_holds(property, file)? {
                continue;
            }
            let value = self.expand(property.text().unwrap_or("").trim());
            self.set_property(property.tag_name().name(), value);
        }
        Ok(())
    }

    fn evaluate_item_group(&mut self, group: roxmltree::Node<'_, '_>, file: &Path) -> Result<()> {
        for element in group.children().filter(|n| n.is_element()) {
            if !self.condition_holds(element, file)? {
                continue;
            }
            let item_type = element.tag_name().name().to_string();
            let metadata = self.item_metadata(element, file)?;

            if let Some(include) = element.attribute("Include") {
                let excludes: HashSet<String> = msbuild_string::split(Some(&self.expand(element.attribute("Exclude").unwrap_or(""))))
                    .into_iter()
                    .map(|identity| identity.to_lowercase())
                    .collect();
                for identity in msbuild_string::split(Some(&self.expand(include))) {
                    if excludes.contains(&identity.to_lowercase()) {
                        continue;
                    }
                    let mut item = ItemView::new(identity);
                    for (name, value) in &metadata {
                        item.set_metadata(name.clone(), value.clone());
                    }
                    self.snapshot.add_item(&item_type, item);
                }
            } else if let Some(update) = element.attribute("Update") {
                let targets = Self::identity_set(&self.expand(update));
                for item in self.snapshot.items_mut(&item_type).iter_mut() {
                    if targets.contains(&item.identity().to_lowercase()) {
                        for (name, value) in &metadata {
                            item.set_metadata(name.clone(), value.clone());
                        }
                    }
                }
            } else if let Some(remove) = element.attribute("Remove") {
                let targets = Self::identity_set(&self.expand(remove));
                self.snapshot
                    .items_mut(&item_type)
                    .retain(|item| !targets.contains(&item.identity().to_lowercase()));
            }
        }
        Ok(())
    }

    /// Metadata from attributes and child elements, values expanded
    fn item_metadata(&self, element: roxmltree::Node<'_, '_>, file: &Path) -> Result<Vec<(String, String)>> {
        let mut metadata: Vec<(String, String)> = element
            .attributes()
            .filter(|attribute| !ITEM_ATTRIBUTES.contains(&attribute.name()))
            .map(|attribute| (attribute.name().to_string(), self.expand(attribute.value())))
            .collect();

        for child in element.children().filter(|n| n.is_element()) {
            if self.condition_holds(child, file)? {
                metadata.push((
                    child.tag_name().name().to_string(),
                    self.expand(child.text().unwrap_or("").trim()),
                ));
            }
        }
        Ok(metadata)
    }

    fn identity_set(value: &str) -> HashSet<String> {
        msbuild_string::split(Some(value))
            .into_iter()
            .map(|identity| identity.to_lowercase())
            .collect()
    }

    /// Defaults the SDK and the NuGet targets would otherwise provide
    fn apply_property_defaults(&mut self, is_sdk_style: bool) {
        let directory = self.snapshot.directory().to_path_buf();

        if self.snapshot.get_property("MSBuildProjectExtensionsPath").is_none() {
            let base = self
                .lookup("BaseIntermediateOutputPath")
                .unwrap_or_else(|| "obj".to_string());
            let extensions_path = paths::resolve_path(&directory, &base);
            self.set_property("MSBuildProjectExtensionsPath", extensions_path);
        }

        if self.snapshot.get_property("AssemblyName").is_none() {
            let name = self.lookup("MSBuildProjectName").unwrap_or_default();
            self.set_property("AssemblyName", name);
        }

        if is_sdk_style {
            self.set_property("UsingMicrosoftNETSdk", "true".to_string());
            if self.snapshot.get_property("RestoreProjectStyle").is_none() {
                self.set_property("RestoreProjectStyle", "PackageReference".to_string());
            }
        }

        if msbuild_string::is_true(self.snapshot.get_property("ManagePackageVersionsCentrally")) {
            self.set_property("_CentralPackageVersionsEnabled", "true".to_string());
        }
    }

    /// Project references carry their full path as `FullPath` metadata
    fn apply_item_defaults(&mut self) {
        let directory = self.snapshot.directory().to_path_buf();
        for item in self.snapshot.items_mut("ProjectReference").iter_mut() {
            if item.get_metadata("FullPath").is_none() {
                let full_path = paths::resolve_path(&directory, item.identity());
                item.set_metadata("FullPath", full_path);
            }
        }
    }
}
