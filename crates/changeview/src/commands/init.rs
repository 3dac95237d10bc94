//! Init command: write a default configuration file.

use std::io::IsTerminal;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use changeview_core::config::{self, Config};
use clap::Args;
use inquire::Confirm;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

/// Arguments for the `init` subcommand.
#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Write to the user config directory instead of the current directory
    #[arg(long)]
    pub user: bool,

    /// Overwrite an existing file without asking
    #[arg(short, long)]
    pub force: bool,

    /// Dataset path to record as `changelog_path`
    #[arg(long, value_name = "FILE")]
    pub changelog: Option<Utf8PathBuf>,
}

#[derive(Serialize)]
struct InitOutput<'a> {
    path: &'a str,
    written: bool,
}

fn target_path(args: &InitArgs, cwd: &Utf8Path) -> anyhow::Result<Utf8PathBuf> {
    if args.user {
        let dir = config::user_config_dir().context("no user config directory on this platform")?;
        Ok(dir.join("config.yaml"))
    } else {
        Ok(cwd.join(".changeview.yaml"))
    }
}

fn default_yaml(changelog: Option<&Utf8Path>) -> anyhow::Result<String> {
    let config = Config {
        changelog_path: changelog.map(Utf8Path::to_path_buf),
        ..Config::default()
    };
    serde_saphyr::to_string(&config).context("failed to serialize default configuration")
}

/// Write a default configuration file.
#[instrument(name = "cmd_init", skip_all, fields(json_output = global_json))]
pub fn cmd_init(args: InitArgs, global_json: bool, cwd: &Utf8Path) -> anyhow::Result<()> {
    let path = target_path(&args, cwd)?;
    debug!(%path, user = args.user, "executing init command");

    let written = if path.exists() && !args.force && !confirm_overwrite(&path)? {
        false
    } else {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {parent}"))?;
        }
        std::fs::write(&path, default_yaml(args.changelog.as_deref())?)
            .with_context(|| format!("failed to write {path}"))?;
        true
    };

    if global_json {
        let output = InitOutput {
            path: path.as_str(),
            written,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if written {
        println!("{} Wrote {}", "✓".green(), path.cyan());
    } else {
        println!("{} Kept existing {}", "○".yellow(), path.cyan());
    }
    Ok(())
}

/// Ask before replacing a file. Without a terminal, refuse.
fn confirm_overwrite(path: &Utf8Path) -> anyhow::Result<bool> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("{path} already exists; pass --force to overwrite it");
    }
    Confirm::new(&format!("{path} exists. Overwrite?"))
        .with_default(false)
        .prompt()
        .context("overwrite confirmation cancelled")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_yaml_loads_back() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("config.yaml")).unwrap();
        std::fs::write(&path, default_yaml(Some(Utf8Path::new("changes.json"))).unwrap()).unwrap();

        let loaded = config::ConfigLoader::new()
            .with_user_config(false)
            .with_file(&path)
            .load()
            .unwrap();
        assert_eq!(
            loaded.changelog_path.as_ref().map(|p| p.as_str()),
            Some("changes.json")
        );
        assert_eq!(loaded.render, Config::default().render);
    }

    #[test]
    fn project_target_is_dotfile_in_cwd() {
        let path = target_path(&InitArgs::default(), Utf8Path::new("/work")).unwrap();
        assert_eq!(path.as_str(), "/work/.changeview.yaml");
    }

    #[test]
    fn writes_then_refuses_without_force() {
        let tmp = tempfile::TempDir::new().unwrap();
        let cwd = Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap();

        cmd_init(InitArgs::default(), true, &cwd).unwrap();
        assert!(cwd.join(".changeview.yaml").exists());

        // Test stdin is not a terminal, so the second run cannot prompt.
        if !std::io::stdin().is_terminal() {
            assert!(cmd_init(InitArgs::default(), true, &cwd).is_err());
        }
        let forced = InitArgs {
            force: true,
            ..InitArgs::default()
        };
        assert!(cmd_init(forced, true, &cwd).is_ok());
    }
}
