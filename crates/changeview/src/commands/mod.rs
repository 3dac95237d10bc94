//! Command implementations

pub mod compare;

pub mod info;

pub mod init;

pub mod render;

pub mod versions;

use std::io::Write;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use changeview_core::{Config, ReleaseData};
use clap::Args;
use tracing::{debug, instrument};

/// Output format for rendered views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// HTML with heading ids and anchors.
    #[default]
    Html,
    /// The markdown the renderers produce, before conversion.
    Markdown,
}

impl OutputFormat {
    /// Lowercase name, as accepted on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }
}

/// Dataset selection shared by every command that reads one.
#[derive(Args, Debug, Default, Clone)]
pub struct InputArgs {
    /// Changelog dataset (overrides `changelog_path` from config)
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<Utf8PathBuf>,
}

impl InputArgs {
    /// Load the dataset named on the command line or in the configuration.
    #[instrument(name = "load_dataset", skip_all)]
    pub fn load(&self, config: &Config) -> anyhow::Result<ReleaseData> {
        let path = config.changelog_path(self.input.as_deref())?;
        let releases = ReleaseData::from_path(&path)
            .with_context(|| format!("failed to load changelog dataset {path}"))?;
        debug!(
            %path,
            families = releases.releases().len(),
            versions = releases.version_count(),
            "dataset loaded"
        );
        Ok(releases)
    }
}

/// Write rendered output to `path`, or to stdout when no path is given.
pub fn emit(content: &str, path: Option<&Utf8Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("failed to write {path}"))?;
            debug!(%path, bytes = content.len(), "output written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(content.as_bytes())
                .context("failed to write to stdout")?;
            if !content.ends_with('\n') {
                writeln!(stdout).context("failed to write to stdout")?;
            }
        }
    }
    Ok(())
}
