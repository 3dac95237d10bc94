//! Flat view of every version, newest first.

use crate::markdown::{h3, h4, unordered_list_item};
use crate::model::{ChangelogNotes, ReleaseData, VersionData};
use crate::view::ViewMode;

use super::Render;

/// Renders versions from all families interleaved by creation time.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChronologicalRenderer;

impl ChronologicalRenderer {
    /// Sort newest first and render each version as its own section.
    ///
    /// The sort is stable: versions created at the same time keep the order
    /// they were passed in.
    fn render_timeline(&self, mut timeline: Vec<(&str, &ChangelogNotes)>) -> String {
        timeline.sort_by(|(_, a), (_, b)| b.created_at.total_cmp(&a.created_at));

        let mut output = String::new();
        for (version, notes) in timeline {
            output.push_str(&h3(&notes.heading(version)));
            output.push_str(&self.render_notes(notes));
        }
        output
    }
}

impl Render for ChronologicalRenderer {
    fn view(&self) -> ViewMode {
        ViewMode::Chronological
    }

    fn render_notes(&self, notes: &ChangelogNotes) -> String {
        let mut output = String::new();
        for (category, items) in &notes.categories {
            output.push_str(&h4(category));
            for item in items {
                output.push_str(&unordered_list_item(item));
            }
        }
        output
    }

    fn render_versions(&self, versions: &VersionData) -> String {
        self.render_timeline(versions.iter().collect())
    }

    fn render_releases(&self, releases: &ReleaseData) -> String {
        self.render_timeline(
            releases
                .iter_versions()
                .map(|(_, version, notes)| (version, notes))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headings(output: &str) -> Vec<&str> {
        output
            .lines()
            .filter_map(|line| line.strip_prefix("### "))
            .collect()
    }

    #[test]
    fn newest_version_comes_first() {
        let data = ReleaseData::from_value(&json!([
            {"v1": [
                {"1.0": {"Categories": {"Fixes": ["a"]}, "CreatedAt": 100}},
                {"1.1": {"Categories": {"Fixes": ["b"]}, "CreatedAt": 200}}
            ]}
        ]))
        .unwrap();

        let output = ChronologicalRenderer.render_releases(&data);
        assert_eq!(
            output,
            "\n### 1.1\n\n#### Fixes\n- b\n\n### 1.0\n\n#### Fixes\n- a\n"
        );
    }

    #[test]
    fn families_interleave_by_time() {
        let data = ReleaseData::from_value(&json!([
            {"v2": [{"2.0": {"CreatedAt": 300}}, {"2.1": {"CreatedAt": 500}}]},
            {"v1": [{"1.9": {"CreatedAt": 400}}, {"1.8": {"CreatedAt": 100}}]}
        ]))
        .unwrap();

        let output = ChronologicalRenderer.render_releases(&data);
        assert_eq!(headings(&output), ["2.1", "1.9", "2.0", "1.8"]);
    }

    #[test]
    fn equal_timestamps_keep_flattening_order() {
        let data = ReleaseData::from_value(&json!([
            {"v2": [{"2.0": {"CreatedAt": 7}}, {"2.1": {"CreatedAt": 7}}]},
            {"v1": [{"1.0": {"CreatedAt": 7}}, {"1.1": {"CreatedAt": 9}}]}
        ]))
        .unwrap();

        let output = ChronologicalRenderer.render_releases(&data);
        assert_eq!(headings(&output), ["1.1", "2.0", "2.1", "1.0"]);
    }

    #[test]
    fn output_is_non_increasing_in_time() {
        let data = ReleaseData::from_value(&json!([
            {"a": [{"a1": {"CreatedAt": 3}}, {"a2": {"CreatedAt": 11}}, {"a3": {"CreatedAt": 2}}]},
            {"b": [{"b1": {"CreatedAt": 8}}, {"b2": {"CreatedAt": 3}}]},
            {"c": [{"c1": {"CreatedAt": 1}}]}
        ]))
        .unwrap();

        let created: std::collections::HashMap<_, _> = data
            .iter_versions()
            .map(|(_, version, notes)| (version, notes.created_at))
            .collect();
        let output = ChronologicalRenderer.render_releases(&data);
        let order = headings(&output);
        assert_eq!(order.len(), 6);
        for pair in order.windows(2) {
            assert!(created[pair[0]] >= created[pair[1]], "{pair:?}");
        }
    }

    #[test]
    fn header_suffix_and_category_order_are_kept() {
        let data = ReleaseData::from_value(&json!([
            {"v1": [{"1.0-rc1": {
                "Categories": {"Zeta": ["z"], "Alpha": ["a"]},
                "HeaderSuffix": " (Pre-release)",
                "CreatedAt": 1
            }}]}
        ]))
        .unwrap();

        let output = ChronologicalRenderer.render_releases(&data);
        assert_eq!(
            output,
            "\n### 1.0-rc1 (Pre-release)\n\n#### Zeta\n- z\n\n#### Alpha\n- a\n"
        );
    }

    #[test]
    fn single_family_is_sorted_too() {
        let versions: VersionData = [
            ("1.0".to_string(), ChangelogNotes::new(1.0)),
            ("1.1".to_string(), ChangelogNotes::new(2.0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            ChronologicalRenderer.render_versions(&versions),
            "\n### 1.1\n\n### 1.0\n"
        );
    }
}
