mod output;

use anyhow::{Context, Result};
use apiblueprint_config::{Config, OutputFormat};
use apiblueprint_engine::{CrossReference, io, process_blueprint};
use relative_path::RelativePath;
use std::path::{Path, PathBuf};
use std::{env, process};

struct Invocation {
    blueprint_path: PathBuf,
    format: OutputFormat,
}

fn main() -> Result<()> {
    let invocation = match parse_args() {
        Ok(invocation) => invocation,
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!("Usage: apiblueprint-cli [blueprint.md] [--json]");
            eprintln!(
                "Or set a default blueprint in {}",
                Config::config_path().display()
            );
            process::exit(1);
        }
    };

    let rendered = build(&invocation)?;
    print!("{rendered}");
    Ok(())
}

fn parse_args() -> Result<Invocation, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut blueprint_path = None;
    let mut json_flag = false;

    for arg in &args {
        match arg.as_str() {
            "--json" => json_flag = true,
            "--text" => json_flag = false,
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option '{flag}'"));
            }
            path if blueprint_path.is_none() => blueprint_path = Some(PathBuf::from(path)),
            extra => return Err(format!("unexpected argument '{extra}'")),
        }
    }

    // Fall back to the config file when no blueprint was given on the
    // command line
    let config = Config::load().map_err(|e| format!("failed to load config file: {e}"))?;
    let blueprint_path = match blueprint_path {
        Some(path) => path,
        None => config
            .as_ref()
            .map(|c| c.blueprint_path.clone())
            .ok_or_else(|| "no blueprint path provided and no config file found".to_string())?,
    };
    let format = if json_flag {
        OutputFormat::Json
    } else {
        config.map(|c| c.format).unwrap_or_default()
    };

    Ok(Invocation {
        blueprint_path,
        format,
    })
}

fn build(invocation: &Invocation) -> Result<String> {
    let (root, entry) = split_blueprint_path(&invocation.blueprint_path)?;
    let document = entry
        .file_stem()
        .unwrap_or("api")
        .to_string();

    let source = io::read_blueprint(root, entry).with_context(|| {
        format!(
            "failed to read blueprint {}",
            invocation.blueprint_path.display()
        )
    })?;

    let mut references = CrossReference::new();
    let tree = process_blueprint(&source.text, &document, &mut references).with_context(|| {
        format!(
            "failed to transform blueprint {}",
            invocation.blueprint_path.display()
        )
    })?;

    match invocation.format {
        OutputFormat::Text => Ok(output::render_text(&tree)),
        OutputFormat::Json => output::render_json(&tree, &references),
    }
}

/// Splits a blueprint file path into the source root (its directory) and the
/// root-relative entry file, which anchors include resolution.
fn split_blueprint_path(path: &Path) -> Result<(&Path, &RelativePath)> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("not a blueprint file path: {}", path.display()))?;
    let root = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok((root, RelativePath::new(file_name)))
}
