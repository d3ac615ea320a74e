/// End-to-end tests for config file loading, option merging and stdin options.
///
/// These tests exercise the full flow from config file on disk through CLI invocation
/// to the written graph, using `assert_cmd` and `tempfile` for isolated test environments.
use assert_cmd::cargo::cargo_bin_cmd;
use msbuild_restore_graph::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

/// Create an SDK project whose package depends on the Configuration property.
fn write_project(dir: &Path) -> PathBuf {
    let project = dir.join("App.csproj");
    fs::write(
        &project,
        r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net6.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Always" Version="1.0.0" />
  </ItemGroup>
  <ItemGroup Condition="'$(Configuration)' == 'Release'">
    <PackageReference Include="ReleaseOnly" Version="2.0.0" />
  </ItemGroup>
</Project>
"#,
    )
    .unwrap();
    project
}

fn write_config(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn restore_graph(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("restore-graph");
    cmd.env("HOME", home)
        .env_remove("NUGET_PACKAGES")
        .env_remove("RUST_LOG");
    cmd
}

fn package_names(output: &Path, project: &Path) -> Vec<String> {
    let graph = DependencyGraphSpec::load(output).unwrap();
    let spec = graph
        .get_project_spec(&project.to_string_lossy())
        .unwrap();
    spec.target_frameworks[0]
        .dependencies
        .iter()
        .map(|dependency| dependency.name.clone())
        .collect()
}

// ============================================================================
// Config discovery
// ============================================================================

#[test]
fn test_config_discovered_next_to_entry() {
    let temp_dir = TempDir::new().unwrap();
    let project = write_project(temp_dir.path());
    let output = temp_dir.path().join("graph.json");
    write_config(
        temp_dir.path(),
        "restore-graph.config.yml",
        &format!(
            r#"
mode: generate-graph
global_properties:
  Configuration: Release
options:
  RestoreGraphOutputPath: {}
"#,
            output.display()
        ),
    );

    restore_graph(temp_dir.path()).arg(&project).assert().code(0);

    assert_eq!(package_names(&output, &project), vec!["Always", "ReleaseOnly"]);
}

#[test]
fn test_explicit_config_path() {
    let temp_dir = TempDir::new().unwrap();
    let project = write_project(temp_dir.path());
    let output = temp_dir.path().join("graph.json");
    let config = write_config(
        temp_dir.path(),
        "custom.yml",
        &format!(
            "mode: generate-graph\noptions:\n  RestoreGraphOutputPath: {}\n",
            output.display()
        ),
    );

    restore_graph(temp_dir.path())
        .arg(&project)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(0);

    assert_eq!(package_names(&output, &project), vec!["Always"]);
}

#[test]
fn test_missing_explicit_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let project = write_project(temp_dir.path());

    restore_graph(temp_dir.path())
        .arg(&project)
        .args(["--config", "/nonexistent/restore-graph.config.yml", "--log-format", "text"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_invalid_config_fails() {
    let temp_dir = TempDir::new().unwrap();
    let project = write_project(temp_dir.path());
    write_config(
        temp_dir.path(),
        "restore-graph.config.yml",
        "mode: publish\nlog_format: text\n",
    );

    restore_graph(temp_dir.path())
        .arg(&project)
        .args(["--log-format", "text"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid mode"));
}

#[test]
fn test_unknown_config_field_warns() {
    let temp_dir = TempDir::new().unwrap();
    let project = write_project(temp_dir.path());
    let output = temp_dir.path().join("graph.json");
    write_config(
        temp_dir.path(),
        "restore-graph.config.yml",
        &format!(
            "mode: generate-graph\nlog_format: text\nverbosity: high\noptions:\n  RestoreGraphOutputPath: {}\n",
            output.display()
        ),
    );

    restore_graph(temp_dir.path())
        .arg(&project)
        .assert()
        .code(0)
        .stderr(predicate::str::contains("Unknown config field 'verbosity'"));
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_cli_overrides_config() {
    let temp_dir = TempDir::new().unwrap();
    let project = write_project(temp_dir.path());
    let config_output = temp_dir.path().join("from-config.json");
    let cli_output = temp_dir.path().join("from-cli.json");
    write_config(
        temp_dir.path(),
        "restore-graph.config.yml",
        &format!(
            r#"
mode: restore
global_properties:
  Configuration: Release
options:
  RestoreGraphOutputPath: {}
"#,
            config_output.display()
        ),
    );

    restore_graph(temp_dir.path())
        .arg(&project)
        .args(["--mode", "generate-graph", "-p", "Configuration=Debug"])
        .arg("-o")
        .arg(format!("restoregraphoutputpath={}", cli_output.display()))
        .assert()
        .code(0);

    assert!(!config_output.exists());
    assert_eq!(package_names(&cli_output, &project), vec!["Always"]);
}

#[test]
fn test_options_from_stdin() {
    let temp_dir = TempDir::new().unwrap();
    let project = write_project(temp_dir.path());
    let output = temp_dir.path().join("graph.json");
    let stdin = format!(
        r#"{{"globalProperties": {{"Configuration": "Release"}}, "options": {{"RestoreGraphOutputPath": "{}"}}}}"#,
        output.display()
    );

    restore_graph(temp_dir.path())
        .arg(&project)
        .args(["--mode", "generate-graph", "--options-from-stdin"])
        .write_stdin(stdin)
        .assert()
        .code(0);

    assert_eq!(package_names(&output, &project), vec!["Always", "ReleaseOnly"]);
}

#[test]
fn test_invalid_stdin_options_fail() {
    let temp_dir = TempDir::new().unwrap();
    let project = write_project(temp_dir.path());

    restore_graph(temp_dir.path())
        .arg(&project)
        .args(["--mode", "generate-graph", "--options-from-stdin", "--log-format", "text"])
        .write_stdin("{not json")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse options from stdin"));
}
