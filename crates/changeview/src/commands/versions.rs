//! Versions command: list what the compare view can select.

use changeview_core::compare::Catalogue;
use changeview_core::Config;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use super::InputArgs;

/// Arguments for the `versions` subcommand.
#[derive(Args, Debug, Default)]
pub struct VersionsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Serialize, PartialEq)]
struct VersionRow<'a> {
    index: usize,
    version: &'a str,
    family: &'a str,
    created_at: f64,
    notes: usize,
}

fn rows(catalogue: &Catalogue) -> Vec<VersionRow<'_>> {
    catalogue
        .iter()
        .enumerate()
        .map(|(index, (version, entry))| VersionRow {
            index,
            version,
            family: &entry.family,
            created_at: entry.notes.created_at,
            notes: entry.notes.note_count(),
        })
        .collect()
}

/// Print the compare catalogue, one version per line.
#[instrument(name = "cmd_versions", skip_all, fields(json_output = global_json))]
pub fn cmd_versions(args: VersionsArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    let releases = args.input.load(config)?;
    let catalogue = Catalogue::build(&releases, &config.render);
    let rows = rows(&catalogue);
    debug!(versions = rows.len(), "executing versions command");

    if global_json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("{}", "No versions found".yellow());
        return Ok(());
    }

    let width = rows.iter().map(|r| r.version.len()).max().unwrap_or(0);
    for row in &rows {
        println!(
            "{:>3}  {:<width$}  {}  {}",
            row.index.dimmed(),
            row.version.bold(),
            row.family.cyan(),
            format!("({} notes)", row.notes).dimmed(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use changeview_core::{ReleaseData, RenderConfig};

    #[test]
    fn rows_follow_catalogue_order() {
        let data: ReleaseData = r#"[
            {"v2": [{"2.0": {"Categories": {"Fixes": ["a", "b"]}, "CreatedAt": 3}}]},
            {"v1": [{"1.0": {"CreatedAt": 1}}]}
        ]"#
        .parse()
        .unwrap();
        let catalogue = Catalogue::build(&data, &RenderConfig::default());
        let rows = rows(&catalogue);

        assert_eq!(
            rows,
            [
                VersionRow {
                    index: 0,
                    version: "2.0",
                    family: "v2",
                    created_at: 3.0,
                    notes: 2,
                },
                VersionRow {
                    index: 1,
                    version: "1.0",
                    family: "v1",
                    created_at: 1.0,
                    notes: 0,
                },
            ]
        );
    }
}
