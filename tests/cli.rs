use boxjoint::cli::{collect_params, read_params_file, run, Cli};
use boxjoint::Settings;
use clap::Parser;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

#[test]
fn params_are_layered() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("params.toml");
    fs::write(&file, "thickness = 4.0\nkerf = 0.25\n").unwrap();

    let mut settings = Settings::new();
    settings.set_default("thickness", json!(3.0));
    settings.set_default("labels", json!(false));

    let params = collect_params(&settings, Some(&file), &["kerf=0.1".to_string()]).unwrap();
    assert_eq!(params["thickness"], 4.0);
    assert_eq!(params["kerf"], 0.1);
    assert_eq!(params["labels"], false);
}

#[test]
fn params_file_must_be_a_table() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("params.json");
    fs::write(&file, "[1, 2]").unwrap();
    assert!(read_params_file(&file).is_err());

    fs::write(&file, r#"{"inner_w": 150}"#).unwrap();
    assert_eq!(read_params_file(&file).unwrap()["inner_w"], 150);
}

#[test]
fn run_writes_document_and_panel_files() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.toml");
    fs::write(&settings, "default_template = \"window_front\"\n").unwrap();
    let out = dir.path().join("cut").join("box.svg");
    let (settings_arg, out_arg) = (settings.display().to_string(), out.display().to_string());

    let cli = Cli::try_parse_from([
        "boxjoint",
        "--settings",
        settings_arg.as_str(),
        "--set",
        "per_panel=true",
        "--out",
        out_arg.as_str(),
    ])
    .unwrap();
    assert!(run(&cli).unwrap());

    let document = fs::read_to_string(&out).unwrap();
    assert!(document.contains(r#""template":"window_front""#));
    assert!(dir.path().join("cut").join("FRONT.svg").exists());
}

#[test]
fn run_reports_design_rule_errors() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.json");
    fs::write(&settings, "{}").unwrap();
    let out = dir.path().join("rack.svg");
    let (settings_arg, out_arg) = (settings.display().to_string(), out.display().to_string());

    let cli = Cli::try_parse_from([
        "boxjoint",
        "--settings",
        settings_arg.as_str(),
        "--template",
        "divider_rack",
        "--set",
        "divider_count=1",
        "--out",
        out_arg.as_str(),
    ])
    .unwrap();
    assert!(!run(&cli).unwrap());
    assert!(out.exists());
}

#[test]
fn missing_template_is_an_error() {
    let dir = TempDir::new().unwrap();
    let settings = dir.path().join("settings.toml");
    fs::write(&settings, "").unwrap();
    let settings_arg = settings.display().to_string();
    let cli = Cli::try_parse_from(["boxjoint", "--settings", settings_arg.as_str()])
        .unwrap();
    assert!(run(&cli).is_err());
}
