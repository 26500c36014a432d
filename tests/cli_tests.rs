//! Integration tests for the CLI command functions.

use sift_recipes::cli::check::{CheckArgs, run_check};
use sift_recipes::cli::show::{ConfigArgs, run_config, run_deps};
use sift_recipes::config::{ConfigPaths, ConfigProvider, ConfigValue};
use sift_recipes::error::{ErrorCode, RecipeError};
use sift_recipes::format::OutputFormat;
use std::fs;
use tempfile::TempDir;

fn config_yaml() -> &'static str {
    r#"
instance_id: sift-cli
state_manager: redis
task_manager: celery
log_file: /tmp/sift-cli/sift.log
lock_file: /tmp/sift-cli/sift.lock
output_dir: /tmp/sift-cli/output
tmp_dir: /tmp/sift-cli/tmp
sleep_time: 5
single_run: false
mount_dir_prefix: /mnt/sift-cli
shared_filesystem: true
debug_tasks: false
docker_enabled: true
disabled_jobs: [VolatilityJob]
redis_host: localhost
dependencies:
  - job: PlasoJob
    programs: [log2timeline.py, pinfo.py]
    docker_image: sift/plaso:latest
"#
}

fn provider_with_config() -> (TempDir, ConfigProvider) {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".siftrc"), config_yaml()).unwrap();
    let provider = ConfigProvider::new(ConfigPaths::with_dirs(vec![temp.path().to_path_buf()]));
    (temp, provider)
}

fn check_args(recipe: Option<std::path::PathBuf>, format: OutputFormat) -> CheckArgs {
    CheckArgs {
        recipe,
        format,
        require_globals: false,
    }
}

#[test]
fn test_check_default_recipe_as_json() {
    let (_temp, provider) = provider_with_config();
    let output = run_check(&provider, &check_args(None, OutputFormat::Json)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["globals"]["debugTasks"], serde_json::json!(false));
    assert_eq!(value.as_object().unwrap().len(), 1);
}

#[test]
fn test_check_recipe_file_as_yaml() {
    let (temp, provider) = provider_with_config();
    let recipe = temp.path().join("triage.yaml");
    fs::write(&recipe, "globals: {jobsDenylist: [HadoopJob]}\nplaso: {task: PlasoTask}\n").unwrap();

    let output = run_check(&provider, &check_args(Some(recipe), OutputFormat::Yaml)).unwrap();
    assert!(output.contains("HadoopJob"));
    assert!(output.contains("task: PlasoTask"));
}

#[test]
fn test_check_reports_typed_error() {
    let (temp, provider) = provider_with_config();
    let recipe = temp.path().join("bad.yaml");
    fs::write(&recipe, "globals: {bogusKey: 1}\n").unwrap();

    let err = run_check(&provider, &check_args(Some(recipe), OutputFormat::Yaml)).unwrap_err();
    let recipe_err = err.downcast_ref::<RecipeError>().expect("recipe error");
    assert_eq!(recipe_err.code(), ErrorCode::UnknownGlobalsKey);
}

#[test]
fn test_check_require_globals() {
    let (temp, provider) = provider_with_config();
    let recipe = temp.path().join("noglobals.yaml");
    fs::write(&recipe, "plaso: {task: PlasoTask}\n").unwrap();

    let args = CheckArgs {
        recipe: Some(recipe),
        format: OutputFormat::Yaml,
        require_globals: true,
    };
    let err = run_check(&provider, &args).unwrap_err();
    let recipe_err = err.downcast_ref::<RecipeError>().expect("recipe error");
    assert_eq!(recipe_err.code(), ErrorCode::MissingGlobals);
}

#[test]
fn test_config_command_shows_source_and_fields() {
    let (temp, provider) = provider_with_config();
    let output = run_config(&provider, &ConfigArgs { format: OutputFormat::Yaml }).unwrap();
    assert!(output.starts_with("# source: "));
    assert!(output.contains(&temp.path().join(".siftrc").display().to_string()));
    assert!(output.contains("instance_id: sift-cli"));

    let config = provider.cached().unwrap();
    assert_eq!(
        config.get("REDIS_HOST"),
        Some(ConfigValue::Str("localhost".to_string()))
    );
    assert_eq!(config.get("docker_enabled").and_then(|v| v.as_bool()), Some(true));
}

#[test]
fn test_config_command_json_is_parseable() {
    let (_temp, provider) = provider_with_config();
    let output = run_config(&provider, &ConfigArgs { format: OutputFormat::Json }).unwrap();

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["instance_id"], serde_json::json!("sift-cli"));
    assert_eq!(value["disabled_jobs"], serde_json::json!(["VolatilityJob"]));
}

#[test]
fn test_deps_command() {
    let (_temp, provider) = provider_with_config();
    let output = run_deps(&provider).unwrap();
    assert!(output.contains("plasojob:"));
    assert!(output.contains("sift/plaso:latest"));
}

#[test]
fn test_config_command_without_config() {
    let temp = TempDir::new().unwrap();
    let provider = ConfigProvider::new(ConfigPaths::with_dirs(vec![temp.path().to_path_buf()]));
    let err = run_config(&provider, &ConfigArgs { format: OutputFormat::Json }).unwrap_err();
    assert!(err.to_string().contains("no config file found"));
}
