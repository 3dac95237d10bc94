//! The compare-versions view.
//!
//! A [`CompareSession`] holds a [`Catalogue`] of every version and a
//! [`Selection`] over it. The user first picks an end version, then
//! optionally a start version strictly before it; the notes of the inclusive
//! range are grouped into a [`RangeDigest`].
//!
//! ```
//! use changeview_core::{CompareSession, ReleaseData, RenderConfig};
//!
//! let data: ReleaseData = r#"[{"v1": [
//!     {"1.0": {"Categories": {"Fixes": ["a"]}, "CreatedAt": 1}},
//!     {"1.1": {"Categories": {"Fixes": ["b"]}, "CreatedAt": 2}}
//! ]}]"#.parse()?;
//!
//! let mut session = CompareSession::new(&data, &RenderConfig::default());
//! session.select_end(1)?;
//! session.select_start(0)?;
//! assert!(session.render_markdown().contains("Fixes (2)"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod aggregate;
mod catalogue;

pub use aggregate::RangeDigest;
pub use catalogue::{Catalogue, CatalogueEntry};

use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::RenderConfig;
use crate::error::SelectionError;
use crate::html::{HtmlConverter, HtmlOptions};
use crate::markdown::{collapsible, unordered_list_item};
use crate::model::{ChangelogNotes, ReleaseData, VersionData};
use crate::render::Render;
use crate::view::ViewMode;

/// Renders the compare view's single-version summary.
#[derive(Debug, Clone, Default)]
pub struct VersionComparer {
    config: RenderConfig,
}

impl VersionComparer {
    /// A comparer using `config`'s denylist and prerelease filter.
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Settings the comparer was built with.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }
}

impl Render for VersionComparer {
    fn view(&self) -> ViewMode {
        ViewMode::CompareVersions
    }

    /// Categories in ascending name order, each collapsed under its count.
    fn render_notes(&self, notes: &ChangelogNotes) -> String {
        let mut categories: Vec<_> = notes
            .categories
            .iter()
            .filter(|(name, _)| !self.config.is_excluded(name))
            .collect();
        categories.sort_by(|(a, _), (b, _)| a.cmp(b));

        let mut output = String::new();
        for (name, items) in categories {
            let body: String = items.iter().map(|item| unordered_list_item(item)).collect();
            output.push_str(&collapsible(&format!("{name} ({})", items.len()), &body));
        }
        output
    }

    fn render_versions(&self, versions: &VersionData) -> String {
        versions
            .iter()
            .find(|(version, _)| self.config.admits_version(version))
            .map(|(_, notes)| self.render_notes(notes))
            .unwrap_or_default()
    }

    fn render_releases(&self, releases: &ReleaseData) -> String {
        Catalogue::build(releases, &self.config)
            .first()
            .map(|(_, entry)| self.render_notes(&entry.notes))
            .unwrap_or_default()
    }
}

/// Where a compare session stands.
///
/// Indices point into the session's [`Catalogue`]. A session only moves
/// between states through its `select_*` methods, so a `RangeSelected` always
/// has `start < end < len`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum Selection {
    /// Nothing chosen yet.
    #[default]
    Unselected,
    /// An end version is chosen; the start defaults to the first version.
    EndSelected {
        /// Index of the last version in the range.
        end: usize,
    },
    /// Both ends chosen.
    RangeSelected {
        /// Index of the first version in the range.
        start: usize,
        /// Index of the last version in the range.
        end: usize,
    },
}

impl Selection {
    /// Selected end index.
    pub const fn end(self) -> Option<usize> {
        match self {
            Self::Unselected => None,
            Self::EndSelected { end } | Self::RangeSelected { end, .. } => Some(end),
        }
    }

    /// Explicitly selected start index.
    pub const fn start(self) -> Option<usize> {
        match self {
            Self::RangeSelected { start, .. } => Some(start),
            _ => None,
        }
    }

    /// Inclusive `(start, end)` range this state aggregates.
    pub const fn range(self) -> Option<(usize, usize)> {
        match self {
            Self::Unselected => None,
            Self::EndSelected { end } => Some((0, end)),
            Self::RangeSelected { start, end } => Some((start, end)),
        }
    }

    fn with_end(self, end: usize) -> Self {
        match self {
            Self::RangeSelected { start, .. } if start < end => Self::RangeSelected { start, end },
            _ => Self::EndSelected { end },
        }
    }

    fn with_start(self, start: usize) -> Result<Self, SelectionError> {
        match self.end() {
            None => Err(SelectionError::NoEndSelected),
            Some(end) if start < end => Ok(Self::RangeSelected { start, end }),
            Some(end) => Err(SelectionError::StartNotBeforeEnd { start, end }),
        }
    }
}

/// Interactive state of the compare view.
#[derive(Debug, Clone)]
pub struct CompareSession {
    comparer: VersionComparer,
    catalogue: Catalogue,
    selection: Selection,
}

impl CompareSession {
    /// Start an unselected session over `releases`.
    pub fn new(releases: &ReleaseData, config: &RenderConfig) -> Self {
        Self {
            catalogue: Catalogue::build(releases, config),
            comparer: VersionComparer::new(config),
            selection: Selection::Unselected,
        }
    }

    /// The versions this session selects from.
    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// Current state.
    pub const fn selection(&self) -> Selection {
        self.selection
    }

    /// Versions that may be picked as the end of the range.
    pub fn end_choices(&self) -> impl Iterator<Item = &str> {
        self.catalogue.versions()
    }

    /// Versions that may be picked as the start: everything before the
    /// selected end. Empty until an end is chosen.
    pub fn start_choices(&self) -> impl Iterator<Item = &str> {
        self.catalogue
            .versions()
            .take(self.selection.end().unwrap_or(0))
    }

    /// Choose the end of the range.
    ///
    /// A previously chosen start survives if it is still before the new end;
    /// otherwise the session drops back to [`Selection::EndSelected`].
    pub fn select_end(&mut self, index: usize) -> Result<Selection, SelectionError> {
        self.check_index(index)?;
        self.selection = self.selection.with_end(index);
        debug!(selection = ?self.selection, "end selected");
        Ok(self.selection)
    }

    /// Choose the start of the range. Requires an end strictly after it.
    pub fn select_start(&mut self, index: usize) -> Result<Selection, SelectionError> {
        self.check_index(index)?;
        match self.selection.with_start(index) {
            Ok(selection) => {
                self.selection = selection;
                debug!(selection = ?self.selection, "start selected");
                Ok(selection)
            }
            Err(err) => {
                debug!(%err, selection = ?self.selection, "start rejected");
                Err(err)
            }
        }
    }

    /// [`select_end`](Self::select_end) by version identifier.
    pub fn select_end_version(&mut self, version: &str) -> Result<Selection, SelectionError> {
        let index = self.index_of(version)?;
        self.select_end(index)
    }

    /// [`select_start`](Self::select_start) by version identifier.
    pub fn select_start_version(&mut self, version: &str) -> Result<Selection, SelectionError> {
        let index = self.index_of(version)?;
        self.select_start(index)
    }

    /// The grouped notes of the current range, if an end is selected.
    pub fn digest(&self) -> Option<RangeDigest> {
        self.selection.range().map(|(start, end)| {
            RangeDigest::collect(self.catalogue.range(start, end), self.comparer.config())
        })
    }

    /// Markdown for the current state.
    ///
    /// Unselected sessions show the first version's summary; otherwise the
    /// selected range is aggregated.
    #[instrument(skip(self), fields(selection = ?self.selection))]
    pub fn render_markdown(&self) -> String {
        match self.digest() {
            Some(digest) => digest.to_markdown(),
            None => self
                .catalogue
                .first()
                .map(|(_, entry)| self.comparer.render_notes(&entry.notes))
                .unwrap_or_default(),
        }
    }

    /// [`render_markdown`](Self::render_markdown) through `converter`.
    pub fn render_html(&self, converter: &dyn HtmlConverter) -> String {
        let options = HtmlOptions::for_view(ViewMode::CompareVersions, self.comparer.config());
        converter.to_html(&self.render_markdown(), &options)
    }

    fn check_index(&self, index: usize) -> Result<(), SelectionError> {
        let len = self.catalogue.len();
        if index < len {
            Ok(())
        } else {
            debug!(index, len, "selection out of range");
            Err(SelectionError::OutOfRange { index, len })
        }
    }

    fn index_of(&self, version: &str) -> Result<usize, SelectionError> {
        self.catalogue
            .index_of(version)
            .ok_or_else(|| SelectionError::UnknownVersion(version.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::CmarkConverter;
    use serde_json::json;

    fn data() -> ReleaseData {
        ReleaseData::from_value(&json!([
            {"v1": [
                {"1.0": {"Categories": {"Fixes": ["a"]}, "CreatedAt": 1}},
                {"1.1": {"Categories": {"Fixes": ["b"], "Features": ["f"]}, "CreatedAt": 2}},
                {"1.2": {"Categories": {"Dependency Bumps": ["dep"], "Fixes": ["c"]}, "CreatedAt": 3}}
            ]}
        ]))
        .unwrap()
    }

    fn session() -> CompareSession {
        CompareSession::new(&data(), &RenderConfig::default())
    }

    #[test]
    fn starts_unselected_with_no_start_choices() {
        let session = session();
        assert_eq!(session.selection(), Selection::Unselected);
        assert_eq!(session.end_choices().count(), 3);
        assert_eq!(session.start_choices().count(), 0);
        assert!(session.digest().is_none());
    }

    #[test]
    fn unselected_shows_first_version_sorted() {
        let data = ReleaseData::from_value(&json!([
            {"v1": [{"1.0": {"Categories": {"Zeta": ["z"], "Alpha": ["a", "b"]}, "CreatedAt": 1}}]}
        ]))
        .unwrap();
        let markdown = CompareSession::new(&data, &RenderConfig::default()).render_markdown();
        let alpha = markdown.find("Alpha (2)").unwrap();
        let zeta = markdown.find("Zeta (1)").unwrap();
        assert!(alpha < zeta, "{markdown}");
    }

    #[test]
    fn range_aggregates_inclusive_versions() {
        let mut session = session();
        session.select_end(1).unwrap();
        assert_eq!(session.select_start(0).unwrap(), Selection::RangeSelected { start: 0, end: 1 });

        let markdown = session.render_markdown();
        assert!(markdown.contains("Fixes (2)"), "{markdown}");
        assert!(markdown.contains("#### Added in 1.0\n- a\n"), "{markdown}");
        assert!(markdown.contains("#### Added in 1.1\n- b\n"), "{markdown}");
        assert!(markdown.contains("Features (1)"), "{markdown}");
        assert!(!markdown.contains("1.2"), "{markdown}");
    }

    #[test]
    fn end_only_aggregates_from_first_version() {
        let mut session = session();
        session.select_end(2).unwrap();
        assert_eq!(session.selection().range(), Some((0, 2)));
        let digest = session.digest().unwrap();
        assert_eq!(digest.category_total("Fixes"), 3);
        assert!(!session.render_markdown().contains("Dependency Bumps"));
    }

    #[test]
    fn start_choices_are_versions_before_end() {
        let mut session = session();
        session.select_end(2).unwrap();
        let starts: Vec<_> = session.start_choices().collect();
        assert_eq!(starts, ["1.0", "1.1"]);
    }

    #[test]
    fn start_requires_end() {
        let mut session = session();
        assert_eq!(session.select_start(0), Err(SelectionError::NoEndSelected));
        assert_eq!(session.selection(), Selection::Unselected);
    }

    #[test]
    fn rejected_selections_leave_state_unchanged() {
        let mut session = session();
        session.select_end(1).unwrap();
        let before = session.selection();

        assert_eq!(
            session.select_end(3),
            Err(SelectionError::OutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            session.select_start(1),
            Err(SelectionError::StartNotBeforeEnd { start: 1, end: 1 })
        );
        assert_eq!(
            session.select_start(7),
            Err(SelectionError::OutOfRange { index: 7, len: 3 })
        );
        assert_eq!(session.selection(), before);
    }

    #[test]
    fn moving_end_keeps_start_only_while_before_it() {
        let mut session = session();
        session.select_end(2).unwrap();
        session.select_start(1).unwrap();

        assert_eq!(
            session.select_end(2).unwrap(),
            Selection::RangeSelected { start: 1, end: 2 }
        );
        assert_eq!(session.select_end(1).unwrap(), Selection::EndSelected { end: 1 });
    }

    #[test]
    fn selects_by_version_identifier() {
        let mut session = session();
        session.select_end_version("1.2").unwrap();
        session.select_start_version("1.1").unwrap();
        assert_eq!(session.selection(), Selection::RangeSelected { start: 1, end: 2 });
        assert_eq!(
            session.select_end_version("9.9"),
            Err(SelectionError::UnknownVersion("9.9".to_string()))
        );
    }

    #[test]
    fn rendering_is_idempotent() {
        let mut session = session();
        session.select_end(2).unwrap();
        session.select_start(0).unwrap();
        assert_eq!(session.render_markdown(), session.render_markdown());
        assert_eq!(
            session.render_html(&CmarkConverter),
            session.render_html(&CmarkConverter)
        );
    }

    #[test]
    fn html_uses_compare_prefix() {
        let mut session = session();
        session.select_end(1).unwrap();
        let html = session.render_html(&CmarkConverter);
        assert!(html.contains(r#"id="compareversions_addedin10""#), "{html}");
        assert!(html.contains("<li>a</li>"), "{html}");
    }

    #[test]
    fn empty_dataset_renders_nothing() {
        let mut session = CompareSession::new(&ReleaseData::default(), &RenderConfig::default());
        assert_eq!(session.render_markdown(), "");
        assert_eq!(
            session.select_end(0),
            Err(SelectionError::OutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn comparer_render_versions_uses_first_admitted() {
        let config = RenderConfig {
            include_prereleases: false,
            ..RenderConfig::default()
        };
        let versions = VersionData::from_value(&json!([
            {"2.0-rc1": {"Categories": {"Fixes": ["rc"]}, "CreatedAt": 2}},
            {"1.9": {"Categories": {"Fixes": ["stable"]}, "CreatedAt": 1}}
        ]))
        .unwrap();
        let markdown = VersionComparer::new(&config).render_versions(&versions);
        assert!(markdown.contains("stable"), "{markdown}");
        assert!(!markdown.contains("- rc"), "{markdown}");
    }
}
