use async_trait::async_trait;
use msbuild_restore_graph::prelude::*;
use std::sync::Mutex;

/// Mock RestoreInvoker for testing
///
/// Records the restore roots of every graph it receives.
pub struct MockRestoreInvoker {
    pub supported_styles: Vec<ProjectStyle>,
    pub result: bool,
    pub should_fail: bool,
    restored: Mutex<Vec<Vec<String>>>,
}

impl MockRestoreInvoker {
    pub fn new() -> Self {
        Self {
            supported_styles: vec![
                ProjectStyle::PackageReference,
                ProjectStyle::PackagesConfig,
                ProjectStyle::DotnetToolReference,
            ],
            result: true,
            should_fail: false,
            restored: Mutex::new(Vec::new()),
        }
    }

    pub fn with_supported_styles(mut self, styles: &[ProjectStyle]) -> Self {
        self.supported_styles = styles.to_vec();
        self
    }

    pub fn with_result(mut self, result: bool) -> Self {
        self.result = result;
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Restore roots of each graph passed to `restore`
    pub fn restored_roots(&self) -> Vec<Vec<String>> {
        self.restored.lock().unwrap().clone()
    }
}

#[async_trait]
impl RestoreInvoker for MockRestoreInvoker {
    fn supports_restore(&self, spec: &PackageSpec) -> bool {
        self.supported_styles
            .contains(&spec.restore_metadata.project_style)
    }

    async fn restore(&self, graph: &DependencyGraphSpec, _options: &RestoreOptions) -> Result<bool> {
        self.restored
            .lock()
            .unwrap()
            .push(graph.restore().iter().map(|name| name.to_string()).collect());
        if self.should_fail {
            anyhow::bail!("Mock restore failure");
        }
        Ok(self.result)
    }
}
