use clap::Parser;
use msbuild_restore_graph::application::dto::RunMode;
use std::path::PathBuf;

/// How log lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line on stdout
    #[default]
    Json,
    /// Human-readable lines on stderr
    Text,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" | "plain" => Ok(LogFormat::Text),
            _ => Err(format!(
                "Invalid log format: {}. Please specify 'json' or 'text'",
                s
            )),
        }
    }
}

/// Parses a `Key=Value` pair; the value may be empty
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("Invalid pair: {}. Expected Key=Value", s)),
    }
}

/// Build a static-graph restore spec for MSBuild projects
#[derive(Parser, Debug)]
#[command(name = "restore-graph")]
#[command(version)]
#[command(about = "Build a NuGet dependency graph spec from an MSBuild project or solution", long_about = None)]
pub struct Args {
    /// Project or solution (.sln, .slnx) file to start from
    #[arg(value_name = "ENTRY")]
    pub entry: PathBuf,

    /// Run mode: restore or generate-graph
    #[arg(short, long)]
    pub mode: Option<RunMode>,

    /// Global property passed to every evaluation.
    /// Can be specified multiple times: -p Configuration=Release -p Platform=x64
    #[arg(short = 'p', long = "property", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub properties: Vec<(String, String)>,

    /// Restore option, e.g. -o RestoreGraphOutputPath=obj/graph.json
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub options: Vec<(String, String)>,

    /// Read {"globalProperties": {..}, "options": {..}} as JSON from stdin
    #[arg(long)]
    pub options_from_stdin: bool,

    /// Path to config file (default: auto-discover restore-graph.config.yml next to ENTRY)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log format: json or text
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// Upper bound for concurrent project builds and spec assembly
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub max_parallelism: Option<u16>,

    /// Log debug output
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Parses the process arguments, leaving exit handling to the caller
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }
}
