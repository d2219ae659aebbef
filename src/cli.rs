//! Command line front end.
//!
//! Parameters are layered: settings defaults, then the `--params` file,
//! then each `--set key=value` in order.

use anyhow::{bail, Context};
use boxjoint_core::{Severity, Warnings};
use boxjoint_settings::{default_path, Settings};
use boxjoint_templates::{generate_by_id, GenerationOutput, ParamMap, Template};
use clap::Parser;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Parser)]
#[command(name = "boxjoint", version, long_version = crate::LONG_VERSION)]
#[command(about = "Generate finger-jointed boxes and mechanisms as laser-cut SVG")]
pub struct Cli {
    /// Template id, e.g. tray_open_front. Falls back to the settings default.
    #[arg(long, short = 't')]
    pub template: Option<String>,

    /// Parameter file (.json or .toml).
    #[arg(long, short = 'p')]
    pub params: Option<PathBuf>,

    /// Override one parameter; the value is read as JSON, else as a string.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Output document. Defaults to `<template>.svg` in the settings
    /// output directory or the current directory.
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,

    /// Settings file instead of the platform default.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// List templates and exit.
    #[arg(long)]
    pub list_templates: bool,
}

/// Splits `key=value`, reading the value as JSON when it parses.
pub fn parse_assignment(s: &str) -> anyhow::Result<(String, Value)> {
    let Some((key, raw)) = s.split_once('=') else {
        bail!("expected KEY=VALUE, got '{s}'");
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("empty key in '{s}'");
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Reads a flat parameter object from a `.json` or `.toml` file.
pub fn read_params_file(path: &Path) -> anyhow::Result<ParamMap> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: Value = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?,
        Some("toml") => {
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?
        }
        _ => bail!("{} must be a .json or .toml file", path.display()),
    };
    match value {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must contain a table of parameters", path.display()),
    }
}

fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    if let Some(path) = path {
        return Settings::load_from_file(path)
            .with_context(|| format!("loading settings {}", path.display()));
    }
    match default_path() {
        Ok(path) => Ok(Settings::load_or_default(&path)?),
        Err(err) => {
            debug!("Using built-in settings: {}", err);
            Ok(Settings::default())
        }
    }
}

/// Settings defaults overlaid with the parameter file and `--set` values.
pub fn collect_params(
    settings: &Settings,
    params_file: Option<&Path>,
    assignments: &[String],
) -> anyhow::Result<ParamMap> {
    let mut overrides = match params_file {
        Some(path) => read_params_file(path)?,
        None => ParamMap::new(),
    };
    for assignment in assignments {
        let (key, value) = parse_assignment(assignment)?;
        overrides.insert(key, value);
    }
    Ok(settings.merged(&overrides))
}

/// Where the main document goes.
pub fn output_path(out: Option<&Path>, settings: &Settings, template: &str) -> PathBuf {
    match out {
        Some(path) => path.to_path_buf(),
        None => settings
            .output_dir
            .clone()
            .unwrap_or_default()
            .join(format!("{template}.svg")),
    }
}

/// Writes the document and its auxiliary files next to it.
pub fn write_output(output: &GenerationOutput, path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty());
    if let Some(dir) = dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    fs::write(path, &output.document).with_context(|| format!("writing {}", path.display()))?;

    let mut written = vec![path.to_path_buf()];
    for (name, doc) in &output.auxiliary_files {
        let aux = dir.map_or_else(|| PathBuf::from(name), |d| d.join(name));
        fs::write(&aux, doc).with_context(|| format!("writing {}", aux.display()))?;
        written.push(aux);
    }
    Ok(written)
}

/// Logs every finding at a level matching its severity.
pub fn report(warnings: &Warnings) {
    for w in warnings.iter() {
        match w.severity {
            Severity::Error | Severity::Warn => warn!("{}", w),
            Severity::Info => info!("{}", w),
        }
    }
}

fn list_templates() {
    for template in Template::ALL {
        println!("{:<30} {}", template.id(), template.description());
    }
}

/// Runs one invocation. Returns `true` when the document has no
/// error-severity findings.
pub fn run(cli: &Cli) -> anyhow::Result<bool> {
    if cli.list_templates {
        list_templates();
        return Ok(true);
    }

    let settings = load_settings(cli.settings.as_deref())?;
    let Some(template) = settings.template(cli.template.as_deref()) else {
        bail!("no template given; pass --template or set default_template in settings");
    };
    let params = collect_params(&settings, cli.params.as_deref(), &cli.set)?;
    debug!("Generating {} with {} parameters", template, params.len());

    let output = generate_by_id(&template, &params)?;
    let path = output_path(cli.out.as_deref(), &settings, &template);
    let written = write_output(&output, &path)?;
    for file in &written {
        info!("Wrote {}", file.display());
    }

    report(&output.warnings);
    if output.has_errors() {
        warn!(
            "{} design-rule error(s); check the findings before cutting",
            output.warnings.errors().count()
        );
    }
    Ok(!output.has_errors())
}
