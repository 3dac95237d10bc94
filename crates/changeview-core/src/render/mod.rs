//! Markdown renderers for the three views.
//!
//! Every view implements [`Render`]. [`Renderer`] is the closed set of
//! views behind that one interface, picked by [`ViewMode`]:
//!
//! ```
//! use changeview_core::{ReleaseData, RenderConfig, ViewMode};
//! use changeview_core::render::{Render, Renderer};
//!
//! let data: ReleaseData = r#"[{"v1": [
//!     {"1.0": {"Categories": {"Fixes": ["a"]}, "CreatedAt": 100}},
//!     {"1.1": {"Categories": {"Fixes": ["b"]}, "CreatedAt": 200}}
//! ]}]"#.parse()?;
//!
//! let renderer = Renderer::for_view(ViewMode::Chronological, &RenderConfig::default());
//! let markdown = renderer.render_releases(&data);
//! assert!(markdown.find("1.1").unwrap() < markdown.find("1.0").unwrap());
//! # Ok::<(), changeview_core::ModelError>(())
//! ```

mod chronological;
mod minor_release;

pub use chronological::ChronologicalRenderer;
pub use minor_release::MinorReleaseRenderer;

use tracing::{debug, instrument};

use crate::compare::VersionComparer;
use crate::config::RenderConfig;
use crate::html::{CmarkConverter, HtmlConverter, HtmlOptions};
use crate::model::{ChangelogNotes, ReleaseData, VersionData};
use crate::view::ViewMode;

/// What every view can render.
pub trait Render {
    /// The view this renderer produces.
    fn view(&self) -> ViewMode;

    /// Render the notes of a single version.
    fn render_notes(&self, notes: &ChangelogNotes) -> String;

    /// Render one release family.
    fn render_versions(&self, versions: &VersionData) -> String;

    /// Render the whole dataset.
    fn render_releases(&self, releases: &ReleaseData) -> String;

    /// Render the whole dataset and pass it through the HTML boundary.
    fn render_html(
        &self,
        releases: &ReleaseData,
        converter: &dyn HtmlConverter,
        config: &RenderConfig,
    ) -> String {
        let markdown = self.render_releases(releases);
        converter.to_html(&markdown, &HtmlOptions::for_view(self.view(), config))
    }
}

/// One renderer per [`ViewMode`].
#[derive(Debug, Clone)]
pub enum Renderer {
    /// See [`MinorReleaseRenderer`].
    MinorRelease(MinorReleaseRenderer),
    /// See [`ChronologicalRenderer`].
    Chronological(ChronologicalRenderer),
    /// See [`VersionComparer`].
    CompareVersions(VersionComparer),
}

impl Renderer {
    /// The renderer for `view`.
    pub fn for_view(view: ViewMode, config: &RenderConfig) -> Self {
        match view {
            ViewMode::MinorRelease => Self::MinorRelease(MinorReleaseRenderer),
            ViewMode::Chronological => Self::Chronological(ChronologicalRenderer),
            ViewMode::CompareVersions => Self::CompareVersions(VersionComparer::new(config)),
        }
    }

    fn inner(&self) -> &dyn Render {
        match self {
            Self::MinorRelease(r) => r,
            Self::Chronological(r) => r,
            Self::CompareVersions(r) => r,
        }
    }
}

impl Render for Renderer {
    fn view(&self) -> ViewMode {
        self.inner().view()
    }

    fn render_notes(&self, notes: &ChangelogNotes) -> String {
        self.inner().render_notes(notes)
    }

    fn render_versions(&self, versions: &VersionData) -> String {
        self.inner().render_versions(versions)
    }

    fn render_releases(&self, releases: &ReleaseData) -> String {
        self.inner().render_releases(releases)
    }
}

/// Render the view named by `token` as HTML.
///
/// Unknown tokens fall back to the configured default view so stale links
/// still show something. For the compare view this is the unselected
/// summary; range selection goes through [`crate::compare::CompareSession`].
#[instrument(skip(releases, config), fields(families = releases.releases().len()))]
pub fn render_view(token: &str, releases: &ReleaseData, config: &RenderConfig) -> String {
    let view = ViewMode::from_token_or(token, config.default_view);
    let html = Renderer::for_view(view, config).render_html(releases, &CmarkConverter, config);
    debug!(view = view.token(), bytes = html.len(), "view rendered");
    html
}
