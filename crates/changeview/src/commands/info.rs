//! Info command: package and effective configuration.

use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use changeview_core::config::{self, Config, RenderConfig};

/// Arguments for the `info` subcommand.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    log_level: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    changelog_path: Option<&'a str>,
    render: &'a RenderConfig,
}

impl<'a> ConfigInfo<'a> {
    fn from_config(config: &'a Config, cwd: &camino::Utf8Path) -> Self {
        Self {
            config_file: config::find_project_config(cwd).map(|p| p.to_string()),
            log_level: config.log_level.as_str(),
            log_dir: config.log_dir.as_ref().map(|p| p.as_str()),
            changelog_path: config.changelog_path.as_ref().map(|p| p.as_str()),
            render: &config.render,
        }
    }
}

#[derive(Serialize)]
struct FullInfo<'a> {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo<'a>,
}

/// Print package information and the effective configuration.
#[instrument(name = "cmd_info", skip_all, fields(json_output = global_json))]
pub fn cmd_info(
    _args: InfoArgs,
    global_json: bool,
    config: &Config,
    cwd: &camino::Utf8Path,
) -> anyhow::Result<()> {
    debug!("executing info command");
    let info = FullInfo {
        package: PackageInfo::new(),
        config: ConfigInfo::from_config(config, cwd),
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let package = &info.package;
    println!("{} {}", package.name.bold(), package.version.green());
    if !package.description.is_empty() {
        println!("{}", package.description);
    }
    if !package.license.is_empty() {
        println!("{}: {}", "License".dimmed(), package.license);
    }
    if !package.repository.is_empty() {
        println!("{}: {}", "Repository".dimmed(), package.repository.cyan());
    }

    let cfg = &info.config;
    println!();
    println!("{}", "Configuration".bold().underline());
    match &cfg.config_file {
        Some(path) => println!("{}: {}", "Config file".dimmed(), path.cyan()),
        None => println!("{}: {}", "Config file".dimmed(), "none loaded".yellow()),
    }
    println!("{}: {}", "Log level".dimmed(), cfg.log_level);
    if let Some(dir) = cfg.log_dir {
        println!("{}: {}", "Log directory".dimmed(), dir);
    }
    match cfg.changelog_path {
        Some(path) => println!("{}: {}", "Changelog".dimmed(), path.cyan()),
        None => println!("{}: {}", "Changelog".dimmed(), "not set".yellow()),
    }

    let render = cfg.render;
    println!();
    println!("{}", "Rendering".bold().underline());
    println!("{}: {}", "Default view".dimmed(), render.default_view.cyan());
    println!("{}: h{}", "First heading level".dimmed(), render.heading_level_start);
    println!("{}: {}", "Heading anchors".dimmed(), render.header_anchors);
    println!(
        "{}: {}",
        "Excluded categories".dimmed(),
        render.excluded_categories.join(", ")
    );
    println!(
        "{}: {}",
        "Duplicate versions".dimmed(),
        render.duplicate_versions.as_str()
    );
    println!("{}: {}", "Prereleases".dimmed(), render.include_prereleases);

    Ok(())
}
