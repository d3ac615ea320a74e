use async_trait::async_trait;
use msbuild_restore_graph::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const TARGET_FRAMEWORK: &str = "TargetFramework";

struct MockProject {
    outer: ProjectSnapshot,
    inner: BTreeMap<String, ProjectSnapshot>,
    references: Vec<PathBuf>,
    supports_restore: bool,
}

/// Mock ProjectEvaluator for testing
///
/// Projects are looked up by case-insensitive path. A project registered with
/// inner snapshots behaves like a cross-targeting project: its outer instance
/// references one inner instance per framework, and each inner instance
/// carries the project references.
pub struct MockProjectEvaluator {
    projects: HashMap<String, MockProject>,
    failing_evaluations: HashSet<String>,
    failing_builds: HashSet<String>,
    begin_calls: AtomicUsize,
    end_calls: AtomicUsize,
    evaluated: Mutex<Vec<String>>,
    built: Mutex<Vec<String>>,
}

impl MockProjectEvaluator {
    pub fn new() -> Self {
        Self {
            projects: HashMap::new(),
            failing_evaluations: HashSet::new(),
            failing_builds: HashSet::new(),
            begin_calls: AtomicUsize::new(0),
            end_calls: AtomicUsize::new(0),
            evaluated: Mutex::new(Vec::new()),
            built: Mutex::new(Vec::new()),
        }
    }

    /// Registers a single-instance project referencing `references`
    pub fn with_project(self, snapshot: ProjectSnapshot, references: &[&str]) -> Self {
        self.with_cross_targeting_project(snapshot, Vec::new(), references)
    }

    /// Registers a project with one inner snapshot per framework alias
    pub fn with_cross_targeting_project(
        mut self,
        outer: ProjectSnapshot,
        inner: Vec<(&str, ProjectSnapshot)>,
        references: &[&str],
    ) -> Self {
        let key = Self::key(outer.full_path());
        self.projects.insert(
            key,
            MockProject {
                outer,
                inner: inner
                    .into_iter()
                    .map(|(alias, snapshot)| (alias.to_string(), snapshot))
                    .collect(),
                references: references.iter().map(PathBuf::from).collect(),
                supports_restore: true,
            },
        );
        self
    }

    /// Marks the last registered project at `path` as not restorable
    pub fn without_restore_support(mut self, path: &str) -> Self {
        if let Some(project) = self.projects.get_mut(&Self::key(Path::new(path))) {
            project.supports_restore = false;
        }
        self
    }

    pub fn with_failing_evaluation(mut self, path: &str) -> Self {
        self.failing_evaluations.insert(Self::key(Path::new(path)));
        self
    }

    pub fn with_failing_build(mut self, path: &str) -> Self {
        self.failing_builds.insert(Self::key(Path::new(path)));
        self
    }

    pub fn begin_calls(&self) -> usize {
        self.begin_calls.load(Ordering::SeqCst)
    }

    pub fn end_calls(&self) -> usize {
        self.end_calls.load(Ordering::SeqCst)
    }

    /// Paths passed to `evaluate`, in call order
    pub fn evaluated(&self) -> Vec<String> {
        self.evaluated.lock().unwrap().clone()
    }

    /// Paths passed to `build`, in completion order
    pub fn built(&self) -> Vec<String> {
        self.built.lock().unwrap().clone()
    }

    fn key(path: &Path) -> String {
        path.to_string_lossy().to_lowercase()
    }

    fn requests(paths: &[PathBuf], global_properties: &GlobalProperties) -> Vec<ProjectReferenceRequest> {
        let mut forwarded = global_properties.clone();
        forwarded.remove(TARGET_FRAMEWORK);
        paths
            .iter()
            .map(|path| ProjectReferenceRequest::new(path.clone(), forwarded.clone()))
            .collect()
    }
}

#[async_trait]
impl ProjectEvaluator for MockProjectEvaluator {
    async fn evaluate(
        &self,
        project_path: &Path,
        global_properties: &GlobalProperties,
    ) -> std::result::Result<EvaluatedProject, EvaluationFailure> {
        let key = Self::key(project_path);
        self.evaluated
            .lock()
            .unwrap()
            .push(project_path.to_string_lossy().into_owned());

        if self.failing_evaluations.contains(&key) {
            return Err(EvaluationFailure::new(
                project_path,
                vec!["MSB4025: The project file could not be loaded.".to_string()],
            ));
        }
        let project = self.projects.get(&key).ok_or_else(|| {
            EvaluationFailure::new(project_path, vec!["MSB1009: Project file does not exist.".to_string()])
        })?;

        let target_framework = global_properties.get(TARGET_FRAMEWORK).map(str::to_string);
        let (snapshot, references) = match target_framework {
            Some(alias) => match project.inner.get(&alias) {
                Some(inner) => (inner.clone(), Self::requests(&project.references, global_properties)),
                None => (project.outer.clone(), Self::requests(&project.references, global_properties)),
            },
            None if !project.inner.is_empty() => {
                let inner_requests = project
                    .inner
                    .keys()
                    .map(|alias| {
                        ProjectReferenceRequest::new(
                            project.outer.full_path(),
                            global_properties.clone().with(TARGET_FRAMEWORK, alias.clone()),
                        )
                    })
                    .collect();
                (project.outer.clone(), inner_requests)
            }
            None => (project.outer.clone(), Self::requests(&project.references, global_properties)),
        };

        Ok(EvaluatedProject {
            view: Arc::new(snapshot.with_global_properties(global_properties.clone())),
            supports_restore: project.supports_restore,
            references,
        })
    }

    fn begin_build(&self) {
        self.begin_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn end_build(&self) {
        self.end_calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn build(
        &self,
        project: &EvaluatedProject,
        _targets: &[&str],
    ) -> std::result::Result<Arc<dyn ProjectView>, EvaluationFailure> {
        let path = project.view.full_path_string();
        self.built.lock().unwrap().push(path.clone());
        if self.failing_builds.contains(&Self::key(project.view.full_path())) {
            return Err(EvaluationFailure::new(
                path,
                vec!["error NU1105: Unable to read project information".to_string()],
            ));
        }
        Ok(Arc::clone(&project.view))
    }
}
