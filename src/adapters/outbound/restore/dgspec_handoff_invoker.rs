use crate::application::dto::RestoreOptions;
use crate::ports::outbound::{GraphFileWriter, RestoreInvoker};
use crate::restore_graph::domain::{dgspec_file_name, DependencyGraphSpec, PackageSpec, ProjectStyle};
use crate::shared::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// DgSpecHandoffInvoker adapter for handing restore roots to a downstream restore
///
/// Writes one `<name>.nuget.dgspec.json` per restore root, holding the root
/// and every project it references, into the root's restore output path (or
/// into a fixed directory when one is configured).
///
/// # Type Parameters
/// * `W` - GraphFileWriter implementation
pub struct DgSpecHandoffInvoker<W> {
    writer: W,
    restore_packages_config: bool,
    output_directory: Option<PathBuf>,
}

impl<W: GraphFileWriter> DgSpecHandoffInvoker<W> {
    /// # Arguments
    /// * `writer` - Writes each per-root graph
    /// * `restore_packages_config` - Whether packages.config projects are restorable
    pub fn new(writer: W, restore_packages_config: bool) -> Self {
        Self {
            writer,
            restore_packages_config,
            output_directory: None,
        }
    }

    /// Writes every per-root graph into `directory`
    pub fn with_output_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.output_directory = Some(directory.into());
        self
    }

    fn destination(&self, spec: &PackageSpec) -> PathBuf {
        let directory = self
            .output_directory
            .clone()
            .or_else(|| spec.restore_metadata.output_path.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| {
                Path::new(&spec.restore_metadata.project_path)
                    .parent()
                    .map(|dir| dir.join("obj"))
                    .unwrap_or_else(|| PathBuf::from("obj"))
            });
        directory.join(dgspec_file_name(&spec.name))
    }

    fn hand_off(&self, graph: &DependencyGraphSpec, root: &str) -> Result<PathBuf> {
        let closure = graph.with_project_closure(root)?;
        let spec = graph
            .get_project_spec(root)
            .ok_or_else(|| anyhow::anyhow!("Restore root {} has no package spec", root))?;
        let destination = self.destination(spec);
        self.writer.write_graph(&closure, &destination)?;
        Ok(destination)
    }
}

#[async_trait]
impl<W: GraphFileWriter> RestoreInvoker for DgSpecHandoffInvoker<W> {
    fn supports_restore(&self, spec: &PackageSpec) -> bool {
        match spec.restore_metadata.project_style {
            ProjectStyle::PackageReference | ProjectStyle::DotnetToolReference | ProjectStyle::ProjectJson => true,
            ProjectStyle::PackagesConfig => self.restore_packages_config,
            _ => false,
        }
    }

    async fn restore(&self, graph: &DependencyGraphSpec, options: &RestoreOptions) -> Result<bool> {
        let mut success = true;

        for root in graph.restore() {
            match self.hand_off(graph, root) {
                Ok(destination) => {
                    if !options.hide_warnings_and_errors {
                        info!(project = root, path = %destination.display(), "Wrote restore graph");
                    }
                }
                Err(e) => {
                    error!(project = root, error = %format!("{:#}", e), "Failed to hand off restore graph");
                    success = false;
                }
            }
        }

        Ok(success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::filesystem::FileSystemWriter;
    use crate::restore_graph::domain::{
        PackagesConfigSettings, ProjectRestoreMetadata, ProjectRestoreReference, ProjectRestoreMetadataFrameworkInfo,
        NuGetFramework, NuGetVersion, LibraryIncludeFlags, RestoreMetadataLayout, StandardRestoreSettings,
    };
    use crate::shared::paths::PathComparison;
    use tempfile::TempDir;

    fn spec(path: &str, style: ProjectStyle, references: &[&str]) -> PackageSpec {
        let layout = match style {
            ProjectStyle::PackagesConfig => RestoreMetadataLayout::PackagesConfig(PackagesConfigSettings::default()),
            _ => RestoreMetadataLayout::Standard(StandardRestoreSettings::default()),
        };
        let mut metadata = ProjectRestoreMetadata::new(style, layout);
        metadata.project_unique_name = path.to_string();
        metadata.project_path = path.to_string();
        metadata.target_frameworks = vec![ProjectRestoreMetadataFrameworkInfo {
            framework_name: NuGetFramework::parse("net6.0"),
            target_alias: "net6.0".to_string(),
            project_references: references
                .iter()
                .map(|r| ProjectRestoreReference {
                    project_unique_name: r.to_string(),
                    project_path: r.to_string(),
                    include_assets: LibraryIncludeFlags::ALL,
                    exclude_assets: LibraryIncludeFlags::NONE,
                    private_assets: LibraryIncludeFlags::DEFAULT_SUPPRESS_PARENT,
                })
                .collect(),
        }];
        PackageSpec {
            name: crate::shared::paths::file_stem(path),
            version: NuGetVersion::default_project_version(),
            file_path: path.to_string(),
            restore_metadata: metadata,
            target_frameworks: Vec::new(),
            runtime_graph: Default::default(),
        }
    }

    #[test]
    fn test_supported_styles() {
        let invoker = DgSpecHandoffInvoker::new(FileSystemWriter::new(), false);
        assert!(invoker.supports_restore(&spec("/r/A.csproj", ProjectStyle::PackageReference, &[])));
        assert!(invoker.supports_restore(&spec("/r/T.csproj", ProjectStyle::DotnetToolReference, &[])));
        assert!(!invoker.supports_restore(&spec("/r/B.csproj", ProjectStyle::PackagesConfig, &[])));
        assert!(!invoker.supports_restore(&spec("/r/U.csproj", ProjectStyle::Unknown, &[])));

        let with_packages_config = DgSpecHandoffInvoker::new(FileSystemWriter::new(), true);
        assert!(with_packages_config.supports_restore(&spec("/r/B.csproj", ProjectStyle::PackagesConfig, &[])));
    }

    #[tokio::test]
    async fn test_writes_one_closure_per_root() {
        let temp_dir = TempDir::new().unwrap();
        let mut graph = DependencyGraphSpec::with_comparison(PathComparison::Ordinal);
        graph
            .add_project(spec("/r/App.csproj", ProjectStyle::PackageReference, &["/r/Lib.csproj"]))
            .unwrap();
        graph
            .add_project(spec("/r/Lib.csproj", ProjectStyle::PackageReference, &[]))
            .unwrap();
        graph
            .add_project(spec("/r/Other.csproj", ProjectStyle::PackageReference, &[]))
            .unwrap();
        graph.add_restore("/r/App.csproj").unwrap();
        graph.mark_read_only();

        let invoker =
            DgSpecHandoffInvoker::new(FileSystemWriter::new(), false).with_output_directory(temp_dir.path());
        let success = invoker.restore(&graph, &RestoreOptions::default()).await.unwrap();

        assert!(success);
        let written = DependencyGraphSpec::load(&temp_dir.path().join("App.nuget.dgspec.json")).unwrap();
        assert_eq!(written.restore(), vec!["/r/App.csproj"]);
        assert_eq!(written.projects().len(), 2);
        assert!(!temp_dir.path().join("Other.nuget.dgspec.json").exists());
    }
}
