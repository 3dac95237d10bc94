//! Notes of a version range, grouped by category and then by version.

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::RenderConfig;
use crate::markdown::{collapsible, h4, unordered_list_item};
use crate::model::ChangelogNotes;

/// Notes collected across a range of versions.
///
/// Categories appear in the order they are first met while walking the
/// range, each version's categories in their own order. Within a category,
/// versions appear in range order. No alphabetical sorting happens here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeDigest {
    categories: IndexMap<String, IndexMap<String, Vec<String>>>,
}

impl RangeDigest {
    /// Group every note of `range`, skipping excluded categories.
    pub fn collect<'a, I>(range: I, config: &RenderConfig) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a ChangelogNotes)>,
    {
        let mut categories: IndexMap<String, IndexMap<String, Vec<String>>> = IndexMap::new();
        for (version, notes) in range {
            for (category, items) in &notes.categories {
                if items.is_empty() || config.is_excluded(category) {
                    continue;
                }
                categories
                    .entry(category.clone())
                    .or_default()
                    .entry(version.to_string())
                    .or_default()
                    .extend(items.iter().cloned());
            }
        }
        Self { categories }
    }

    /// `(category, version -> notes)` in discovery order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &IndexMap<String, Vec<String>>)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Notes recorded under `category` across all versions.
    pub fn category_total(&self, category: &str) -> usize {
        self.categories
            .get(category)
            .map_or(0, |versions| versions.values().map(Vec::len).sum())
    }

    /// Notes recorded across all categories.
    pub fn total_notes(&self) -> usize {
        self.categories
            .values()
            .flat_map(IndexMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Whether the range contributed no notes.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// One collapsible block per category, titled with its note count,
    /// holding an "Added in" section per contributing version.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();
        for (category, versions) in &self.categories {
            let mut body = String::new();
            let mut count = 0;
            for (version, notes) in versions {
                body.push_str(&h4(&format!("Added in {version}")));
                for note in notes {
                    body.push_str(&unordered_list_item(note));
                    count += 1;
                }
            }
            output.push_str(&collapsible(&format!("{category} ({count})"), &body));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(categories: &[(&str, &[&str])]) -> ChangelogNotes {
        categories
            .iter()
            .fold(ChangelogNotes::new(0.0), |notes, (name, items)| {
                notes.with_category(*name, items.iter().copied())
            })
    }

    #[test]
    fn groups_by_category_then_version() {
        let v10 = notes(&[("Fixes", &["a"])]);
        let v11 = notes(&[("Fixes", &["b"])]);
        let digest = RangeDigest::collect([("1.0", &v10), ("1.1", &v11)], &RenderConfig::default());

        let (category, versions) = digest.categories().next().unwrap();
        assert_eq!(category, "Fixes");
        let per_version: Vec<_> = versions.iter().map(|(v, n)| (v.as_str(), n.len())).collect();
        assert_eq!(per_version, [("1.0", 1), ("1.1", 1)]);
        assert_eq!(digest.category_total("Fixes"), 2);

        assert_eq!(
            digest.to_markdown(),
            "\n<details><summary>\nFixes (2)</summary>\n\n\
             \n#### Added in 1.0\n- a\n\
             \n#### Added in 1.1\n- b\n\
             \n</details>\n"
        );
    }

    #[test]
    fn category_order_follows_discovery_not_alphabet() {
        let first = notes(&[("Zeta", &["z"]), ("Beta", &["b"])]);
        let second = notes(&[("Alpha", &["a"]), ("Zeta", &["z2"])]);
        let digest = RangeDigest::collect([("1", &first), ("2", &second)], &RenderConfig::default());

        let order: Vec<_> = digest.categories().map(|(c, _)| c).collect();
        assert_eq!(order, ["Zeta", "Beta", "Alpha"]);
        assert_eq!(digest.category_total("Zeta"), 2);
    }

    #[test]
    fn excluded_categories_never_appear() {
        let v = notes(&[
            ("Dependency Bumps", &["bump"]),
            ("Pre-release", &["rc"]),
            ("Fixes", &["a"]),
        ]);
        let digest = RangeDigest::collect([("1.0", &v)], &RenderConfig::default());
        let markdown = digest.to_markdown();

        assert!(!markdown.contains("Dependency Bumps"));
        assert!(!markdown.contains("Pre-release"));
        assert_eq!(digest.total_notes(), 1);
    }

    #[test]
    fn custom_denylist_is_honoured() {
        let config = RenderConfig {
            excluded_categories: vec!["Fixes".to_string()],
            ..RenderConfig::default()
        };
        let v = notes(&[("Fixes", &["a"]), ("Dependency Bumps", &["bump"])]);
        let digest = RangeDigest::collect([("1.0", &v)], &config);
        let order: Vec<_> = digest.categories().map(|(c, _)| c).collect();
        assert_eq!(order, ["Dependency Bumps"]);
    }

    #[test]
    fn total_matches_sum_of_included_notes() {
        let a = notes(&[("Fixes", &["1", "2"]), ("Features", &["3"])]);
        let b = notes(&[("Features", &["4", "5"]), ("Dependency Bumps", &["x", "y"])]);
        let c = notes(&[("Docs", &["6"])]);
        let config = RenderConfig::default();
        let digest = RangeDigest::collect([("a", &a), ("b", &b), ("c", &c)], &config);

        let expected: usize = [&a, &b, &c]
            .iter()
            .flat_map(|n| n.categories.iter())
            .filter(|(category, _)| !config.is_excluded(category))
            .map(|(_, items)| items.len())
            .sum();
        assert_eq!(digest.total_notes(), expected);
        assert_eq!(expected, 6);
    }

    #[test]
    fn empty_categories_are_not_recorded() {
        let v = notes(&[("Fixes", &[])]);
        let digest = RangeDigest::collect([("1.0", &v)], &RenderConfig::default());
        assert!(digest.is_empty());
        assert_eq!(digest.to_markdown(), "");
    }
}
