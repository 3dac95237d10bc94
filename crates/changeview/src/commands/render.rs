//! Render command: one view of the whole dataset.

use camino::Utf8PathBuf;
use changeview_core::{Config, Render, Renderer, ViewMode, render_view};
use clap::Args;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::{InputArgs, OutputFormat, emit};

/// Arguments for the `render` subcommand.
#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// View token: minor-release, chronological or compare-versions
    #[arg(long, value_name = "TOKEN", conflicts_with = "hash")]
    pub view: Option<String>,

    /// Location fragment to route on, e.g. '#chronological_241'
    #[arg(long, value_name = "FRAGMENT")]
    pub hash: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,

    /// Write to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<Utf8PathBuf>,
}

/// The view to render and, for fragments, the heading to land on.
#[derive(Debug, PartialEq, Eq)]
struct Route {
    view: ViewMode,
    anchor: Option<String>,
}

impl Route {
    fn from_args(args: &RenderArgs, default: ViewMode) -> Self {
        if let Some(hash) = &args.hash {
            let (view, heading) = ViewMode::from_location_hash(hash);
            return Self {
                view,
                anchor: heading.map(|h| view.anchor_id(h)),
            };
        }
        let view = args
            .view
            .as_deref()
            .map_or(default, |token| ViewMode::from_token_or(token, default));
        Self { view, anchor: None }
    }
}

#[derive(Serialize)]
struct RenderOutput<'a> {
    view: ViewMode,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    anchor: Option<&'a str>,
    content: &'a str,
}

/// Render one view of the configured dataset.
#[instrument(name = "cmd_render", skip_all, fields(json_output = global_json))]
pub fn cmd_render(args: RenderArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    let releases = args.input.load(config)?;
    let route = Route::from_args(&args, config.render.default_view);
    debug!(view = route.view.token(), anchor = ?route.anchor, "executing render command");

    let content = match args.format {
        OutputFormat::Html => render_view(route.view.token(), &releases, &config.render),
        OutputFormat::Markdown => {
            Renderer::for_view(route.view, &config.render).render_releases(&releases)
        }
    };

    if let Some(anchor) = &route.anchor
        && args.format == OutputFormat::Html
        && !content.contains(&format!(r#"id="{anchor}""#))
    {
        warn!(%anchor, "fragment does not match any rendered heading");
    }

    if global_json {
        let output = RenderOutput {
            view: route.view,
            format: args.format.as_str(),
            anchor: route.anchor.as_deref(),
            content: &content,
        };
        emit(&serde_json::to_string_pretty(&output)?, args.output.as_deref())
    } else {
        emit(&content, args.output.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(view: Option<&str>, hash: Option<&str>) -> RenderArgs {
        RenderArgs {
            view: view.map(str::to_string),
            hash: hash.map(str::to_string),
            ..RenderArgs::default()
        }
    }

    #[test]
    fn route_defaults_to_configured_view() {
        let route = Route::from_args(&args(None, None), ViewMode::Chronological);
        assert_eq!(route.view, ViewMode::Chronological);
        assert!(route.anchor.is_none());
    }

    #[test]
    fn route_follows_view_token() {
        let route = Route::from_args(&args(Some("compareversions"), None), ViewMode::MinorRelease);
        assert_eq!(route.view, ViewMode::CompareVersions);
    }

    #[test]
    fn unknown_token_uses_configured_default() {
        let route = Route::from_args(&args(Some("stale"), None), ViewMode::Chronological);
        assert_eq!(route.view, ViewMode::Chronological);
    }

    #[test]
    fn route_from_fragment_keeps_anchor() {
        let route = Route::from_args(&args(None, Some("#chronological_241")), ViewMode::MinorRelease);
        assert_eq!(
            route,
            Route {
                view: ViewMode::Chronological,
                anchor: Some("chronological_241".to_string()),
            }
        );
    }
}
