//! Compare command: aggregate the notes of a range of versions.

use std::io::IsTerminal;

use anyhow::Context;
use camino::Utf8PathBuf;
use changeview_core::{CmarkConverter, CompareSession, Config, Selection};
use clap::Args;
use inquire::Select;
use serde::Serialize;
use tracing::{debug, instrument};

use super::{InputArgs, OutputFormat, emit};

/// Arguments for the `compare` subcommand.
#[derive(Args, Debug, Default)]
pub struct CompareArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Last version of the range
    #[arg(long, value_name = "VERSION")]
    pub end: Option<String>,

    /// First version of the range; defaults to the first version listed
    #[arg(long, value_name = "VERSION", requires = "end")]
    pub start: Option<String>,

    /// Pick the range from a menu
    #[arg(short = 'I', long, conflicts_with_all = ["end", "start"])]
    pub interactive: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Write to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,
}

#[derive(Serialize)]
struct CompareOutput<'a> {
    selection: Selection,
    #[serde(skip_serializing_if = "Option::is_none")]
    start: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    end: Option<&'a str>,
    total_notes: usize,
    format: &'static str,
    content: &'a str,
}

/// Aggregate and print the notes of the selected range.
#[instrument(name = "cmd_compare", skip_all, fields(json_output = global_json))]
pub fn cmd_compare(args: CompareArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    let releases = args.input.load(config)?;
    let mut session = CompareSession::new(&releases, &config.render);

    if args.interactive {
        prompt_range(&mut session)?;
    } else {
        if let Some(end) = &args.end {
            session
                .select_end_version(end)
                .with_context(|| format!("cannot end the range at {end}"))?;
        }
        if let Some(start) = &args.start {
            session
                .select_start_version(start)
                .with_context(|| format!("cannot start the range at {start}"))?;
        }
    }
    debug!(selection = ?session.selection(), "executing compare command");

    let content = match args.format {
        OutputFormat::Html => session.render_html(&CmarkConverter),
        OutputFormat::Markdown => session.render_markdown(),
    };

    if !global_json {
        return emit(&content, args.output.as_deref());
    }

    let selection = session.selection();
    let (start, end) = selection.range().map_or((None, None), |(start, end)| {
        (version_at(&session, start), version_at(&session, end))
    });
    let output = CompareOutput {
        selection,
        start,
        end,
        total_notes: session.digest().map_or(0, |digest| digest.total_notes()),
        format: args.format.as_str(),
        content: &content,
    };
    emit(&serde_json::to_string_pretty(&output)?, args.output.as_deref())
}

fn version_at(session: &CompareSession, index: usize) -> Option<&str> {
    session.catalogue().get_index(index).map(|(version, _)| version)
}

/// Ask for the end version, then optionally the start version.
fn prompt_range(session: &mut CompareSession) -> anyhow::Result<()> {
    if !std::io::stdin().is_terminal() {
        anyhow::bail!("--interactive needs a terminal; pass --end and --start instead");
    }
    if session.catalogue().is_empty() {
        anyhow::bail!("the dataset has no versions to compare");
    }

    let ends: Vec<String> = session.end_choices().map(str::to_string).collect();
    let end = Select::new("Compare up to version:", ends)
        .prompt()
        .context("version selection cancelled")?;
    session.select_end_version(&end)?;

    let starts: Vec<String> = session.start_choices().map(str::to_string).collect();
    if starts.is_empty() {
        return Ok(());
    }
    let start = Select::new("Starting from version (Esc for the first):", starts)
        .prompt_skippable()
        .context("version selection cancelled")?;
    if let Some(start) = start {
        session.select_start_version(&start)?;
    }
    Ok(())
}
