use super::global_properties::GlobalProperties;
use super::item::ItemView;
use crate::shared::msbuild_string;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Read-only view over one evaluated project.
///
/// A view is either a whole project (the outer node) or one
/// target-framework-specific instance of a multi-targeting project (an inner
/// node). Property, global property and item type names are case-insensitive.
///
/// Views are produced by a [`ProjectEvaluator`](crate::ports::outbound::ProjectEvaluator)
/// and live for one resolution run.
pub trait ProjectView: Send + Sync + fmt::Debug {
    /// Full path of the project file
    fn full_path(&self) -> &Path;

    /// Directory containing the project file
    fn directory(&self) -> &Path;

    /// Evaluated value of a property, `None` when undefined
    fn get_property(&self, name: &str) -> Option<&str>;

    /// Value of a global property the project was evaluated with
    fn get_global_property(&self, name: &str) -> Option<&str>;

    /// Items of the given type, in declaration order
    fn get_items(&self, item_type: &str) -> &[ItemView];

    fn is_property_true(&self, name: &str) -> bool {
        msbuild_string::is_true(self.get_property(name))
    }

    /// Splits a `;` delimited property, `None` when it has no entries
    fn split_property(&self, name: &str) -> Option<Vec<String>> {
        msbuild_string::split_or_none(self.get_property(name))
    }

    /// Splits a `;` delimited global property, `None` when it has no entries
    fn split_global_property(&self, name: &str) -> Option<Vec<String>> {
        msbuild_string::split_or_none(self.get_global_property(name))
    }

    /// Full path as an owned string, the form used for restore identity keys
    fn full_path_string(&self) -> String {
        self.full_path().to_string_lossy().into_owned()
    }
}

/// In-memory [`ProjectView`] built from evaluated values.
///
/// Used by the bundled XML evaluator and by tests.
#[derive(Debug, Clone)]
pub struct ProjectSnapshot {
    full_path: PathBuf,
    directory: PathBuf,
    properties: HashMap<String, String>,
    global_properties: GlobalProperties,
    items: HashMap<String, Vec<ItemView>>,
}

impl ProjectSnapshot {
    pub fn new(full_path: impl Into<PathBuf>) -> Self {
        let full_path = full_path.into();
        let directory = full_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            full_path,
            directory,
            properties: HashMap::new(),
            global_properties: GlobalProperties::new(),
            items: HashMap::new(),
        }
    }

    pub fn with_property(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_property(name, value);
        self
    }

    pub fn with_global_property(mut self, name: &str, value: impl Into<String>) -> Self {
        self.global_properties.insert(name, value.into());
        self
    }

    pub fn with_global_properties(mut self, global_properties: GlobalProperties) -> Self {
        self.global_properties = global_properties;
        self
    }

    pub fn with_item(mut self, item_type: &str, item: ItemView) -> Self {
        self.add_item(item_type, item);
        self
    }

    pub fn set_property(&mut self, name: &str, value: impl Into<String>) {
        self.properties
            .insert(name.to_ascii_lowercase(), value.into());
    }

    pub fn add_item(&mut self, item_type: &str, item: ItemView) {
        self.items
            .entry(item_type.to_ascii_lowercase())
            .or_default()
            .push(item);
    }

    /// Mutable access to the items of one type, for `Update` and `Remove` handling
    pub fn items_mut(&mut self, item_type: &str) -> &mut Vec<ItemView> {
        self.items
            .entry(item_type.to_ascii_lowercase())
            .or_default()
    }

    pub fn global_properties(&self) -> &GlobalProperties {
        &self.global_properties
    }

    /// All evaluated properties, keyed by lower-cased name
    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }
}

impl ProjectView for ProjectSnapshot {
    fn full_path(&self) -> &Path {
        &self.full_path
    }

    fn directory(&self) -> &Path {
        &self.directory
    }

    fn get_property(&self, name: &str) -> Option<&str> {
        self.properties
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn get_global_property(&self, name: &str) -> Option<&str> {
        self.global_properties.get(name)
    }

    fn get_items(&self, item_type: &str) -> &[ItemView] {
        self.items
            .get(&item_type.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
