use crate::application::dto::EntryPoint;
use crate::ports::outbound::{EvaluatedProject, ProjectEvaluator, SolutionReader};
use crate::restore_graph::domain::{GlobalProperties, ProjectNode, ProjectView};
use crate::shared::error::{EvaluationFailure, LoadError, RestoreGraphError};
use crate::shared::Result;
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Targets run against every restorable project to collect its item lists
pub const METADATA_TARGETS: [&str; 4] = [
    "CollectPackageReferences",
    "CollectPackageDownloads",
    "CollectFrameworkReferences",
    "CollectCentralPackageVersions",
];

const TARGET_FRAMEWORK: &str = "TargetFramework";

/// Keeps a build session open; `end_build` runs on every exit path.
struct BuildSession<'a, E: ProjectEvaluator> {
    evaluator: &'a E,
}

impl<'a, E: ProjectEvaluator> BuildSession<'a, E> {
    fn begin(evaluator: &'a E) -> Self {
        evaluator.begin_build();
        Self { evaluator }
    }
}

impl<E: ProjectEvaluator> Drop for BuildSession<'_, E> {
    fn drop(&mut self) {
        self.evaluator.end_build();
    }
}

/// ProjectGraphLoader - Discovers and evaluates the project reference graph
///
/// Graph construction is sequential. The metadata-collection builds that
/// follow run concurrently, bounded by `max_parallelism`, and are all joined
/// before the loader returns.
///
/// # Type Parameters
/// * `E` - ProjectEvaluator implementation
/// * `S` - SolutionReader implementation
pub struct ProjectGraphLoader<E, S> {
    evaluator: E,
    solution_reader: S,
    max_parallelism: usize,
}

impl<E, S> ProjectGraphLoader<E, S>
where
    E: ProjectEvaluator,
    S: SolutionReader,
{
    pub fn new(evaluator: E, solution_reader: S, max_parallelism: usize) -> Self {
        Self {
            evaluator,
            solution_reader,
            max_parallelism: max_parallelism.max(1),
        }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Expands solution entry points into the MSBuild projects they contain
    ///
    /// # Errors
    /// Returns `LoadError::EntryPoints` when a solution cannot be read
    pub fn expand_entry_points(&self, entry_points: &[EntryPoint]) -> Result<Vec<(PathBuf, GlobalProperties)>> {
        let mut expanded = Vec::new();

        for entry_point in entry_points {
            match entry_point {
                EntryPoint::Project {
                    path,
                    global_properties,
                } => expanded.push((path.clone(), global_properties.clone())),
                EntryPoint::Solution {
                    path,
                    global_properties,
                } => {
                    let projects = self.solution_reader.read_projects(path).map_err(|e| {
                        RestoreGraphError::from(LoadError::EntryPoints {
                            path: path.clone(),
                            details: format!("{:#}", e),
                        })
                    })?;

                    let (known, unknown): (Vec<_>, Vec<_>) =
                        projects.into_iter().partition(|project| project.is_msbuild_project);

                    if !unknown.is_empty() {
                        let names: Vec<&str> = unknown.iter().map(|p| p.name.as_str()).collect();
                        info!(
                            count = unknown.len(),
                            projects = %names.join(","),
                            "Skipping {} project(s) in the solution that are not known to MSBuild",
                            unknown.len()
                        );
                    }

                    expanded.extend(
                        known
                            .into_iter()
                            .map(|project| (project.path, global_properties.clone())),
                    );
                }
            }
        }

        Ok(expanded)
    }

    /// Loads the full graph reachable from the entry points
    ///
    /// # Arguments
    /// * `entry_points` - Projects and solutions to start from
    /// * `cancellation` - Checked before each phase
    ///
    /// # Returns
    /// One ProjectNode per distinct project path, in discovery order
    ///
    /// # Errors
    /// Returns `LoadError` if an entry point cannot be resolved or if any
    /// project failed to evaluate or build. No partial result is returned.
    pub async fn load(&self, entry_points: &[EntryPoint], cancellation: &CancellationToken) -> Result<Vec<ProjectNode>> {
        if cancellation.is_cancelled() {
            return Err(RestoreGraphError::Cancelled.into());
        }
        let roots = self.expand_entry_points(entry_points)?;
        self.load_roots(roots, cancellation).await
    }

    /// Loads the graph reachable from already expanded root projects
    ///
    /// # Errors
    /// Returns `LoadError::Evaluation` if any project failed to evaluate or build
    pub async fn load_roots(
        &self,
        roots: Vec<(PathBuf, GlobalProperties)>,
        cancellation: &CancellationToken,
    ) -> Result<Vec<ProjectNode>> {
        if cancellation.is_cancelled() {
            return Err(RestoreGraphError::Cancelled.into());
        }

        let started = Instant::now();
        let failures: DashMap<String, EvaluationFailure> = DashMap::new();

        let evaluated = self.evaluate_graph(roots, &failures).await;
        let node_count = evaluated.len() + failures.len();

        if cancellation.is_cancelled() {
            return Err(RestoreGraphError::Cancelled.into());
        }

        let restorable: Vec<&EvaluatedProject> = evaluated.iter().filter(|p| Self::is_restorable(p)).collect();
        let build_count = restorable.len();

        let built = {
            let _session = BuildSession::begin(&self.evaluator);
            self.collect_metadata(&restorable, &failures).await
        };
        let failed_build_count = build_count - built.len();

        info!(
            nodes = node_count,
            elapsed_ms = started.elapsed().as_millis() as u64,
            builds = build_count,
            failed_builds = failed_build_count,
            "Evaluated {} project node(s) in {} ms ({} builds, {} failures)",
            node_count,
            started.elapsed().as_millis(),
            build_count,
            failed_build_count
        );

        if !failures.is_empty() {
            let mut failures: Vec<EvaluationFailure> = failures.into_iter().map(|(_, f)| f).collect();
            failures.sort_by(|a, b| a.project_path.cmp(&b.project_path));
            for failure in &failures {
                error!(
                    project = %failure.project_path.display(),
                    diagnostics = %failure.diagnostics.join("; "),
                    "Project failed to evaluate"
                );
            }
            return Err(RestoreGraphError::from(LoadError::Evaluation { failures }).into());
        }

        Ok(Self::group_nodes(built))
    }

    /// A node gets a metadata-collection pass only when it supports restore
    /// and does not set an explicitly blank TargetFramework
    fn is_restorable(project: &EvaluatedProject) -> bool {
        let blank_framework = project
            .view
            .get_global_property(TARGET_FRAMEWORK)
            .is_some_and(|value| value.trim().is_empty());
        project.supports_restore && !blank_framework
    }

    async fn evaluate_graph(
        &self,
        roots: Vec<(PathBuf, GlobalProperties)>,
        failures: &DashMap<String, EvaluationFailure>,
    ) -> Vec<EvaluatedProject> {
        let mut queue: VecDeque<(PathBuf, GlobalProperties)> = roots.into_iter().collect();
        let mut visited: HashSet<String> = HashSet::new();
        let mut evaluated = Vec::new();

        while let Some((path, global_properties)) = queue.pop_front() {
            if !visited.insert(Self::instance_key(&path, &global_properties)) {
                continue;
            }

            debug!(project = %path.display(), "Evaluating project");
            match self.evaluator.evaluate(&path, &global_properties).await {
                Ok(project) => {
                    for reference in &project.references {
                        queue.push_back((reference.project_path.clone(), reference.global_properties.clone()));
                    }
                    evaluated.push(project);
                }
                Err(failure) => {
                    failures
                        .entry(Self::instance_key(&path, &global_properties))
                        .or_insert(failure);
                }
            }
        }

        evaluated
    }

    /// Runs the metadata targets for every restorable project
    ///
    /// Successful views come back in input order; failures go to `failures`.
    async fn collect_metadata(
        &self,
        restorable: &[&EvaluatedProject],
        failures: &DashMap<String, EvaluationFailure>,
    ) -> Vec<(Option<String>, Arc<dyn ProjectView>)> {
        let mut results: Vec<(usize, Option<String>, Arc<dyn ProjectView>)> = stream::iter(restorable.iter().enumerate())
            .map(|(index, project)| async move {
                let outcome = self.evaluator.build(project, &METADATA_TARGETS).await;
                (index, project, outcome)
            })
            .buffer_unordered(self.max_parallelism)
            .filter_map(|(index, project, outcome)| async move {
                match outcome {
                    Ok(view) => {
                        let target_framework = project.view.get_global_property(TARGET_FRAMEWORK).map(str::to_string);
                        Some((index, target_framework, view))
                    }
                    Err(failure) => {
                        failures.insert(project.view.full_path_string(), failure);
                        None
                    }
                }
            })
            .collect()
            .await;

        results.sort_by_key(|(index, _, _)| *index);
        results
            .into_iter()
            .map(|(_, target_framework, view)| (target_framework, view))
            .collect()
    }

    /// Groups built views by case-insensitive project path
    ///
    /// Views without a TargetFramework global property are outer views; the
    /// rest become inner views keyed by that value. A project with only inner
    /// views uses the first of them as its outer view.
    fn group_nodes(built: Vec<(Option<String>, Arc<dyn ProjectView>)>) -> Vec<ProjectNode> {
        let mut nodes: Vec<ProjectNode> = Vec::new();
        let mut has_outer: Vec<bool> = Vec::new();
        let mut index_by_path: HashMap<String, usize> = HashMap::new();

        for (target_framework, view) in built {
            let key = view.full_path_string().to_lowercase();
            match (index_by_path.get(&key).copied(), target_framework) {
                (None, None) => {
                    index_by_path.insert(key, nodes.len());
                    nodes.push(ProjectNode::new(view));
                    has_outer.push(true);
                }
                (None, Some(framework)) => {
                    index_by_path.insert(key, nodes.len());
                    nodes.push(ProjectNode::new(Arc::clone(&view)).with_inner(framework, view));
                    has_outer.push(false);
                }
                (Some(index), None) => {
                    if !has_outer[index] {
                        nodes[index].replace_outer(view);
                        has_outer[index] = true;
                    }
                }
                (Some(index), Some(framework)) => nodes[index].add_inner(framework, view),
            }
        }

        nodes
    }

    fn instance_key(path: &std::path::Path, global_properties: &GlobalProperties) -> String {
        let properties: Vec<String> = global_properties
            .iter()
            .map(|(name, value)| format!("{}={}", name.to_lowercase(), value))
            .collect();
        format!("{}|{}", path.to_string_lossy().to_lowercase(), properties.join(";"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::{ProjectReferenceRequest, SolutionProject};
    use crate::restore_graph::domain::ProjectSnapshot;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeEvaluator {
        projects: HashMap<String, (ProjectSnapshot, bool, Vec<ProjectReferenceRequest>)>,
        failing_builds: HashSet<String>,
        begin_calls: AtomicUsize,
        end_calls: AtomicUsize,
        built: Mutex<Vec<String>>,
    }

    impl FakeEvaluator {
        fn with_project(mut self, snapshot: ProjectSnapshot, references: &[&str]) -> Self {
            let references = references
                .iter()
                .map(|r| ProjectReferenceRequest::new(*r, GlobalProperties::new()))
                .collect();
            self.projects
                .insert(snapshot.full_path_string(), (snapshot, true, references));
            self
        }
    }

    #[async_trait]
    impl ProjectEvaluator for FakeEvaluator {
        async fn evaluate(
            &self,
            project_path: &Path,
            global_properties: &GlobalProperties,
        ) -> std::result::Result<EvaluatedProject, EvaluationFailure> {
            let key = project_path.to_string_lossy().into_owned();
            let (snapshot, supports_restore, references) = self
                .projects
                .get(&key)
                .ok_or_else(|| EvaluationFailure::new(project_path, vec!["not found".to_string()]))?;
            Ok(EvaluatedProject {
                view: Arc::new(snapshot.clone().with_global_properties(global_properties.clone())),
                supports_restore: *supports_restore,
                references: references.clone(),
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
            if self.failing_builds.contains(&path) {
                return Err(EvaluationFailure::new(path, vec!["target failed".to_string()]));
            }
            Ok(Arc::clone(&project.view))
        }
    }

    struct NoSolutions;

    impl SolutionReader for NoSolutions {
        fn read_projects(&self, solution_path: &Path) -> Result<Vec<SolutionProject>> {
            anyhow::bail!("cannot read {}", solution_path.display())
        }
    }

    fn entry(path: &str) -> EntryPoint {
        EntryPoint::from_path(path, GlobalProperties::new())
    }

    #[tokio::test]
    async fn test_load_follows_references_once() {
        let evaluator = FakeEvaluator::default()
            .with_project(ProjectSnapshot::new("/r/A/A.csproj"), &["/r/B/B.csproj", "/r/C/C.csproj"])
            .with_project(ProjectSnapshot::new("/r/B/B.csproj"), &["/r/C/C.csproj"])
            .with_project(ProjectSnapshot::new("/r/C/C.csproj"), &[]);
        let loader = ProjectGraphLoader::new(evaluator, NoSolutions, 4);

        let nodes = loader
            .load(&[entry("/r/A/A.csproj")], &CancellationToken::new())
            .await
            .unwrap();

        let paths: Vec<&Path> = nodes.iter().map(|n| n.full_path()).collect();
        assert_eq!(
            paths,
            vec![Path::new("/r/A/A.csproj"), Path::new("/r/B/B.csproj"), Path::new("/r/C/C.csproj")]
        );
        assert_eq!(loader.evaluator().begin_calls.load(Ordering::SeqCst), 1);
        assert_eq!(loader.evaluator().end_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_build_fails_whole_load() {
        let mut evaluator = FakeEvaluator::default()
            .with_project(ProjectSnapshot::new("/r/A/A.csproj"), &["/r/B/B.csproj"])
            .with_project(ProjectSnapshot::new("/r/B/B.csproj"), &[]);
        evaluator.failing_builds.insert("/r/B/B.csproj".to_string());
        let loader = ProjectGraphLoader::new(evaluator, NoSolutions, 2);

        let error = loader
            .load(&[entry("/r/A/A.csproj")], &CancellationToken::new())
            .await
            .unwrap_err();

        match error.downcast_ref::<RestoreGraphError>() {
            Some(RestoreGraphError::Load(LoadError::Evaluation { failures })) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].project_path, PathBuf::from("/r/B/B.csproj"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(loader.evaluator().end_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_reference_is_evaluation_failure() {
        let evaluator =
            FakeEvaluator::default().with_project(ProjectSnapshot::new("/r/A/A.csproj"), &["/r/Gone/Gone.csproj"]);
        let loader = ProjectGraphLoader::new(evaluator, NoSolutions, 2);

        let error = loader
            .load(&[entry("/r/A/A.csproj")], &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(error.to_string().contains("Gone.csproj"));
    }

    #[tokio::test]
    async fn test_unreadable_solution_is_entry_point_error() {
        let loader = ProjectGraphLoader::new(FakeEvaluator::default(), NoSolutions, 2);
        let error = loader
            .load(&[entry("/r/All.sln")], &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RestoreGraphError>(),
            Some(RestoreGraphError::Load(LoadError::EntryPoints { .. }))
        ));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let loader = ProjectGraphLoader::new(FakeEvaluator::default(), NoSolutions, 2);
        let token = CancellationToken::new();
        token.cancel();
        let error = loader.load(&[entry("/r/A/A.csproj")], &token).await.unwrap_err();
        assert!(matches!(
            error.downcast_ref::<RestoreGraphError>(),
            Some(RestoreGraphError::Cancelled)
        ));
    }

    #[test]
    fn test_group_nodes_merges_inner_views() {
        let outer: Arc<dyn ProjectView> = Arc::new(ProjectSnapshot::new("/r/Lib/Lib.csproj"));
        let net6: Arc<dyn ProjectView> = Arc::new(
            ProjectSnapshot::new("/r/lib/lib.csproj").with_global_property(TARGET_FRAMEWORK, "net6.0"),
        );
        let net8: Arc<dyn ProjectView> = Arc::new(
            ProjectSnapshot::new("/r/Lib/Lib.csproj").with_global_property(TARGET_FRAMEWORK, "net8.0"),
        );

        let nodes = ProjectGraphLoader::<FakeEvaluator, NoSolutions>::group_nodes(vec![
            (Some("net6.0".to_string()), Arc::clone(&net6)),
            (None, Arc::clone(&outer)),
            (Some("net8.0".to_string()), Arc::clone(&net8)),
        ]);

        assert_eq!(nodes.len(), 1);
        assert!(Arc::ptr_eq(nodes[0].outer(), &outer));
        assert_eq!(nodes[0].inner_nodes().len(), 2);
    }

    #[test]
    fn test_group_nodes_first_inner_serves_as_outer() {
        let net6: Arc<dyn ProjectView> = Arc::new(
            ProjectSnapshot::new("/r/Lib/Lib.csproj").with_global_property(TARGET_FRAMEWORK, "net6.0"),
        );
        let nodes = ProjectGraphLoader::<FakeEvaluator, NoSolutions>::group_nodes(vec![(
            Some("net6.0".to_string()),
            Arc::clone(&net6),
        )]);
        assert!(Arc::ptr_eq(nodes[0].outer(), &net6));
    }

    #[test]
    fn test_blank_target_framework_is_not_restorable() {
        let project = EvaluatedProject {
            view: Arc::new(ProjectSnapshot::new("/r/A/A.csproj").with_global_property(TARGET_FRAMEWORK, " ")),
            supports_restore: true,
            references: Vec::new(),
        };
        assert!(!ProjectGraphLoader::<FakeEvaluator, NoSolutions>::is_restorable(&project));
    }
}
