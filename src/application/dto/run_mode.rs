/// What to do with the finished graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Hand the graph to the restore invoker
    #[default]
    Restore,
    /// Write the graph to `RestoreGraphOutputPath`
    GenerateGraph,
}

impl std::str::FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "restore" => Ok(RunMode::Restore),
            "generate-graph" | "generategraph" | "graph" => Ok(RunMode::GenerateGraph),
            _ => Err(format!(
                "Invalid mode: {}. Please specify 'restore' or 'generate-graph'",
                s
            )),
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Restore => write!(f, "restore"),
            RunMode::GenerateGraph => write!(f, "generate-graph"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_run_mode_from_str() {
        assert_eq!(RunMode::from_str("Restore").unwrap(), RunMode::Restore);
        assert_eq!(RunMode::from_str("GENERATE-GRAPH").unwrap(), RunMode::GenerateGraph);
    }

    #[test]
    fn test_run_mode_from_str_invalid() {
        let error = RunMode::from_str("build").unwrap_err();
        assert!(error.contains("Invalid mode"));
        assert!(error.contains("generate-graph"));
    }

    #[test]
    fn test_run_mode_display_round_trips() {
        for mode in [RunMode::Restore, RunMode::GenerateGraph] {
            assert_eq!(RunMode::from_str(&mode.to_string()).unwrap(), mode);
        }
    }
}
