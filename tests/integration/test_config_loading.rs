use lap::core::config::{ConfigLoader, LapConfig};
use lap::core::input::{EntityCategory, InputHandler, InputLoader};
use lap::core::pipeline::PipelineRegistry;
use lap::core::storage::TempStorage;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_lap_env() {
    for v in &[
        "LAP_INPUT_DIR",
        "LAP_USE_SAMPLE_DATA",
        "LAP_SAMPLES_DIR",
        "LAP_TEMP_DATABASE",
        "LAP_PIPELINES_DIR",
    ] {
        env::remove_var(v);
    }
}

/// Test integration of config loading with environment variables
#[test]
#[serial]
fn test_config_loading_integration() {
    clear_lap_env();
    let temp_dir = TempDir::new().unwrap();
    let workspace_path = temp_dir.path();

    let config_content = r#"
[input]
directory = "extracts/2013"

[samples]
directory = "fixtures"

[storage]
temp_database = "state/temp.db"

[pipelines]
directory = "descriptors"
"#;
    fs::write(workspace_path.join("lap.toml"), config_content).unwrap();

    let config = ConfigLoader::load_from_workspace(workspace_path).unwrap();
    assert_eq!(config.input.directory, workspace_path.join("extracts/2013"));
    assert_eq!(config.samples.directory, workspace_path.join("fixtures"));
    assert_eq!(config.pipelines.directory, workspace_path.join("descriptors"));
    assert_eq!(
        PathBuf::from(&config.storage.temp_database),
        workspace_path.join("state/temp.db")
    );

    env::set_var("LAP_TEMP_DATABASE", ":memory:");
    env::set_var("LAP_PIPELINES_DIR", "/srv/pipelines");
    let config = ConfigLoader::load_from_workspace(workspace_path).unwrap();
    assert_eq!(config.storage.temp_database, ":memory:");
    assert_eq!(config.pipelines.directory, PathBuf::from("/srv/pipelines"));

    clear_lap_env();
}

#[test]
#[serial]
fn test_sample_flag_switches_handler_sources() {
    clear_lap_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("lap.toml"),
        "[input]\nuse_sample_data = true\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    let store = config.open_store().unwrap();
    let loader = InputLoader::from_config(&config, store);
    let path = loader
        .handler(EntityCategory::Grade)
        .unwrap()
        .get_file()
        .unwrap();
    assert!(path.starts_with(&config.samples.directory));
    assert!(path.is_file());
}

#[test]
#[serial]
fn test_file_database_is_created_on_load() {
    clear_lap_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("lap.toml"),
        "[input]\nuse_sample_data = true\n\n[storage]\ntemp_database = \"temp.db\"\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    for _ in 0..2 {
        let store = config.open_store().unwrap();
        let loader = InputLoader::from_config(&config, store.clone());
        let report = loader
            .handler(EntityCategory::Course)
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(store.count("COURSE").unwrap(), report.rows);
    }
    assert!(temp_dir.path().join("temp.db").is_file());
}

#[test]
#[serial]
fn test_registry_from_configured_directory() {
    clear_lap_env();
    let temp_dir = TempDir::new().unwrap();
    let pipelines = temp_dir.path().join("pipelines");
    fs::create_dir_all(&pipelines).unwrap();
    fs::write(
        pipelines.join("engagement.yml"),
        "type: engagement\nname: Engagement\ninputs:\n  - name: ACTIVITY.EVENT\n    required: true\n",
    )
    .unwrap();

    let config = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap();
    let registry = PipelineRegistry::from_config(&config).unwrap();
    assert_eq!(registry.types(), vec!["engagement"]);
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    clear_lap_env();
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("lap.toml"),
        "[storage]\ntemp_database = \"\"\n",
    )
    .unwrap();

    let err = ConfigLoader::load_from_workspace(temp_dir.path()).unwrap_err();
    assert_eq!(err.code, "CONFIG-003");
    assert!(err.message.contains("storage.temp_database"));
}

#[test]
fn test_defaults_match_documentation() {
    let config = LapConfig::default();
    assert_eq!(config.storage.temp_database, ":memory:");
    let docs = ConfigLoader::env_var_documentation();
    for name in ["LAP_INPUT_DIR", "LAP_TEMP_DATABASE", "LAP_PIPELINES_DIR"] {
        assert!(docs.iter().any(|doc| doc.starts_with(name)), "{name}");
    }
}
