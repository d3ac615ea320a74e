use std::collections::BTreeMap;
use std::path::PathBuf;

/// Option key naming the graph file written in generate-graph mode
pub const RESTORE_GRAPH_OUTPUT_PATH: &str = "RestoreGraphOutputPath";

/// The option bag passed from the calling build.
///
/// Keys are compared case-insensitively and a flag is set only when its value
/// is `true` (any casing).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreOptions {
    pub interactive: bool,
    pub recursive: bool,
    /// `NoCache` or `NoHttpCache`
    pub no_cache: bool,
    pub ignore_failed_sources: bool,
    pub disable_parallel: bool,
    pub force: bool,
    pub force_evaluate: bool,
    pub hide_warnings_and_errors: bool,
    pub restore_packages_config: bool,
    pub cleanup_assets_for_unsupported_projects: bool,
    pub restore_graph_output_path: Option<PathBuf>,
}

impl RestoreOptions {
    /// Parses raw key/value options
    pub fn from_options(options: &BTreeMap<String, String>) -> Self {
        let lookup = |name: &str| -> Option<&str> {
            options
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        };
        let is_true = |name: &str| lookup(name).is_some_and(|value| value.eq_ignore_ascii_case("true"));

        Self {
            interactive: is_true("Interactive"),
            recursive: is_true("Recursive"),
            no_cache: is_true("NoCache") || is_true("NoHttpCache"),
            ignore_failed_sources: is_true("IgnoreFailedSources"),
            disable_parallel: is_true("DisableParallel"),
            force: is_true("Force"),
            force_evaluate: is_true("ForceEvaluate"),
            hide_warnings_and_errors: is_true("HideWarningsAndErrors"),
            restore_packages_config: is_true("RestorePackagesConfig"),
            cleanup_assets_for_unsupported_projects: is_true("CleanupAssetsForUnsupportedProjects"),
            restore_graph_output_path: lookup(RESTORE_GRAPH_OUTPUT_PATH)
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_only_true_values_set_flags() {
        let parsed = RestoreOptions::from_options(&options(&[
            ("interactive", "TRUE"),
            ("Recursive", "false"),
            ("Force", "yes"),
            ("DisableParallel", "True"),
        ]));
        assert!(parsed.interactive);
        assert!(!parsed.recursive);
        assert!(!parsed.force);
        assert!(parsed.disable_parallel);
    }

    #[test]
    fn test_no_http_cache_sets_no_cache() {
        let parsed = RestoreOptions::from_options(&options(&[("NoHttpCache", "true")]));
        assert!(parsed.no_cache);
    }

    #[test]
    fn test_restore_graph_output_path() {
        let parsed = RestoreOptions::from_options(&options(&[("restoregraphoutputpath", "/tmp/out.json")]));
        assert_eq!(parsed.restore_graph_output_path, Some(PathBuf::from("/tmp/out.json")));

        let parsed = RestoreOptions::from_options(&options(&[]));
        assert!(parsed.restore_graph_output_path.is_none());
    }
}
