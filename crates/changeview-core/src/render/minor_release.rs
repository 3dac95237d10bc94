//! Grouped-by-release view: families, then versions, then categories,
//! all in dataset order.

use crate::markdown::{h2, h3, h5, unordered_list_item};
use crate::model::{ChangelogNotes, ReleaseData, VersionData};
use crate::view::ViewMode;

use super::Render;

/// Renders the dataset as nested sections without reordering anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinorReleaseRenderer;

impl Render for MinorReleaseRenderer {
    fn view(&self) -> ViewMode {
        ViewMode::MinorRelease
    }

    fn render_notes(&self, notes: &ChangelogNotes) -> String {
        let mut output = String::new();
        for (category, items) in &notes.categories {
            output.push_str(&h5(category));
            for item in items {
                output.push_str(&unordered_list_item(item));
            }
        }
        output
    }

    fn render_versions(&self, versions: &VersionData) -> String {
        let mut output = String::new();
        for (version, notes) in versions.iter() {
            output.push_str(&h3(&notes.heading(version)));
            output.push_str(&self.render_notes(notes));
        }
        output
    }

    fn render_releases(&self, releases: &ReleaseData) -> String {
        let mut output = String::new();
        for (family, versions) in releases.releases() {
            output.push_str(&h2(family));
            output.push_str(&self.render_versions(versions));
        }
        output
    }
}
