mod cli;
mod config;
mod logging;

use clap::error::ErrorKind;
use cli::{Args, LogFormat};
use config::ConfigFile;
use msbuild_restore_graph::adapters::outbound::configuration::NuGetConfigSource;
use msbuild_restore_graph::adapters::outbound::filesystem::FileSystemWriter;
use msbuild_restore_graph::adapters::outbound::msbuild::{SolutionFileReader, XmlProjectEvaluator};
use msbuild_restore_graph::adapters::outbound::restore::DgSpecHandoffInvoker;
use msbuild_restore_graph::application::dto::{default_max_parallelism, GraphRequest};
use msbuild_restore_graph::application::use_cases::{GenerateDependencyGraphUseCase, RestoreUseCase};
use msbuild_restore_graph::restore_graph::domain::GlobalProperties;
use msbuild_restore_graph::shared::error::{ExitCode, RestoreGraphError};
use msbuild_restore_graph::shared::{paths, Result};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    let args = match Args::try_parse_args() {
        Ok(args) => args,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::Success,
                _ => ExitCode::Failure,
            };
            let _ = e.print();
            process::exit(code.as_i32());
        }
    };

    let exit_code = match run(args).await {
        Ok(success) => ExitCode::from_success(success),
        Err(e) => {
            error!(error = %format!("{:#}", e), "{}", e);
            ExitCode::Failure
        }
    };

    process::exit(exit_code.as_i32());
}

async fn run(args: Args) -> Result<bool> {
    // Loaded before logging is set up: the config may choose the log format
    let config = load_config(&args);
    let log_format = args
        .log_format
        .or_else(|| config.as_ref().ok().and_then(|c| c.as_ref()).and_then(ConfigFile::log_format))
        .unwrap_or(LogFormat::Json);
    logging::init_logging(log_format, args.debug);

    let config = config?.unwrap_or_default();
    config::warn_unknown_fields(&config);

    let entry_path = resolve_entry_path(&args.entry)?;

    let stdin_options = if args.options_from_stdin {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| anyhow::anyhow!("Failed to read options from stdin: {}", e))?;
        config::parse_stdin_options(&content)?
    } else {
        config::StdinOptions::default()
    };

    // CLI > stdin > config file > defaults
    let global_properties: GlobalProperties = config
        .global_properties()
        .into_iter()
        .chain(stdin_options.global_properties)
        .chain(args.properties.iter().cloned())
        .collect();
    let options = merge_options(config.options(), stdin_options.options, &args.options);
    let mode = args.mode.or_else(|| config.run_mode()).unwrap_or_default();
    let max_parallelism = args
        .max_parallelism
        .map(usize::from)
        .or(config.max_parallelism)
        .unwrap_or_else(default_max_parallelism);

    let request = GraphRequest::new(entry_path, global_properties, options, mode).with_max_parallelism(max_parallelism);
    debug!(
        entry = %request.entry_path.display(),
        mode = %request.mode,
        max_parallelism = request.max_parallelism,
        options = ?request.raw_options,
        "Starting restore graph run"
    );

    // Create adapters (Dependency Injection)
    let evaluator = XmlProjectEvaluator::new();
    let solution_reader = SolutionFileReader::new()?;
    let configuration_source = NuGetConfigSource::new();
    let restore_invoker = DgSpecHandoffInvoker::new(FileSystemWriter::new(), request.options.restore_packages_config);
    let graph_writer = FileSystemWriter::new();

    // Create use case with injected dependencies
    let generator =
        GenerateDependencyGraphUseCase::new(evaluator, solution_reader, configuration_source, request.max_parallelism);
    let use_case = RestoreUseCase::new(generator, restore_invoker, graph_writer);

    let cancellation = CancellationToken::new();
    let signal_token = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_token.cancel();
        }
    });

    use_case.execute(&request, &cancellation).await
}

/// The explicit `--config` file, or one discovered next to the entry file
fn load_config(args: &Args) -> Result<Option<ConfigFile>> {
    match &args.config {
        Some(path) => config::load_config_from_path(path).map(Some),
        None => match args.entry.parent() {
            Some(dir) => config::discover_config(dir),
            None => Ok(None),
        },
    }
}

/// Option keys compare case-insensitively; the last layer wins
fn merge_options(
    config_options: BTreeMap<String, String>,
    stdin_options: BTreeMap<String, String>,
    cli_options: &[(String, String)],
) -> BTreeMap<String, String> {
    let mut merged: BTreeMap<String, String> = BTreeMap::new();
    let layers = config_options
        .into_iter()
        .chain(stdin_options)
        .chain(cli_options.iter().cloned());
    for (key, value) in layers {
        merged.retain(|existing, _| !existing.eq_ignore_ascii_case(&key));
        merged.insert(key, value);
    }
    merged
}

/// Makes the entry path absolute and checks that it names a file
fn resolve_entry_path(entry: &Path) -> Result<PathBuf> {
    let current_dir = std::env::current_dir().map_err(|e| RestoreGraphError::InvalidEntryPoint {
        path: entry.to_path_buf(),
        reason: format!("Failed to read the current directory: {}", e),
    })?;
    let absolute = paths::normalize(&current_dir.join(entry));

    if !absolute.exists() {
        return Err(RestoreGraphError::InvalidEntryPoint {
            path: absolute,
            reason: "File does not exist".to_string(),
        }
        .into());
    }
    if !absolute.is_file() {
        return Err(RestoreGraphError::InvalidEntryPoint {
            path: absolute,
            reason: "Not a file".to_string(),
        }
        .into());
    }

    Ok(absolute)
}
