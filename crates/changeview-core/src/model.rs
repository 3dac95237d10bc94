//! The changelog data model.
//!
//! A dataset is a list of single-key records, each mapping a release family
//! to another list of single-key records, each mapping a version to its
//! notes:
//!
//! ```json
//! [
//!   {"v1": [
//!     {"1.0": {"Categories": {"Fixes": ["a"]}, "CreatedAt": 100}},
//!     {"1.1": {"Categories": {"Fixes": ["b"]}, "CreatedAt": 200}}
//!   ]}
//! ]
//! ```
//!
//! Records are lists rather than JSON objects so that order survives any
//! JSON implementation, including ones that reorder numeric-looking keys.
//! Both levels land in [`IndexMap`]s that keep input order.

use std::str::FromStr;

use camino::Utf8Path;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error::{ModelError, ModelResult};

/// Every release family of one dataset, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseData {
    releases: IndexMap<String, VersionData>,
}

impl ReleaseData {
    /// Build the model from an already-parsed dataset.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInputShape`] when the dataset or a family
    /// payload is not a list of single-key records, and [`ModelError::Parse`]
    /// when a notes payload has mistyped fields.
    #[instrument(skip_all)]
    pub fn from_value(input: &Value) -> ModelResult<Self> {
        let mut releases = IndexMap::new();
        for (family, payload) in single_key_records(input, "release data")? {
            let versions = VersionData::from_family(family, payload)?;
            if releases.insert(family.clone(), versions).is_some() {
                warn!(family = %family, "duplicate release family overwrites earlier entry");
            }
        }
        let data = Self { releases };
        debug!(
            families = data.releases.len(),
            versions = data.version_count(),
            "release data built"
        );
        Ok(data)
    }

    /// Read and build the model from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Read`] if the file cannot be read, otherwise the
    /// same errors as [`ReleaseData::from_value`].
    pub fn from_path(path: &Utf8Path) -> ModelResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ModelError::Read {
            path: path.to_string(),
            source,
        })?;
        content.parse()
    }

    /// Release families keyed by name, in input order.
    pub const fn releases(&self) -> &IndexMap<String, VersionData> {
        &self.releases
    }

    /// Look up one release family.
    pub fn family(&self, name: &str) -> Option<&VersionData> {
        self.releases.get(name)
    }

    /// Every version across every family as `(family, version, notes)`,
    /// families first, then versions within each family.
    pub fn iter_versions(&self) -> impl Iterator<Item = (&str, &str, &ChangelogNotes)> {
        self.releases.iter().flat_map(|(family, versions)| {
            versions
                .iter()
                .map(move |(version, notes)| (family.as_str(), version, notes))
        })
    }

    /// Total number of versions across all families.
    pub fn version_count(&self) -> usize {
        self.releases.values().map(VersionData::len).sum()
    }

    /// Whether the dataset has no release families.
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

impl FromStr for ReleaseData {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s)?;
        Self::from_value(&value)
    }
}

/// The versions of one release family, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VersionData {
    versions: IndexMap<String, ChangelogNotes>,
}

impl VersionData {
    /// Build one family from its list of version records.
    ///
    /// # Errors
    ///
    /// Same as [`ReleaseData::from_value`].
    pub fn from_value(input: &Value) -> ModelResult<Self> {
        Self::from_family("release family", input)
    }

    fn from_family(family: &str, input: &Value) -> ModelResult<Self> {
        let mut versions = IndexMap::new();
        let context = format!("release family `{family}`");
        for (version, payload) in single_key_records(input, &context)? {
            if !payload.is_object() {
                return Err(ModelError::shape(
                    format!("version `{version}` of `{family}`"),
                    "an object of changelog notes",
                ));
            }
            let notes = ChangelogNotes::deserialize(payload)?;
            if versions.insert(version.clone(), notes).is_some() {
                warn!(family, version = %version, "duplicate version overwrites earlier entry");
            }
        }
        Ok(Self { versions })
    }

    /// Notes for one version.
    pub fn get(&self, version: &str) -> Option<&ChangelogNotes> {
        self.versions.get(version)
    }

    /// `(version, notes)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChangelogNotes)> {
        self.versions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of versions in the family.
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Whether the family has no versions.
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl FromIterator<(String, ChangelogNotes)> for VersionData {
    fn from_iter<I: IntoIterator<Item = (String, ChangelogNotes)>>(iter: I) -> Self {
        Self {
            versions: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<(String, VersionData)> for ReleaseData {
    fn from_iter<I: IntoIterator<Item = (String, VersionData)>>(iter: I) -> Self {
        Self {
            releases: iter.into_iter().collect(),
        }
    }
}

/// The notes published with a single version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangelogNotes {
    /// Category name to notes, in input order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: IndexMap<String, Vec<String>>,
    /// Free-form text carried along with the version. No view renders it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_notes: Option<String>,
    /// Appended verbatim to the version heading, e.g. a prerelease marker.
    #[serde(default, deserialize_with = "null_as_default")]
    pub header_suffix: String,
    /// Creation time, only used for chronological ordering.
    pub created_at: f64,
}

impl ChangelogNotes {
    /// Empty notes created at `created_at`.
    pub fn new(created_at: f64) -> Self {
        Self {
            created_at,
            ..Self::default()
        }
    }

    /// Builder-style helper appending a whole category.
    pub fn with_category<I, S>(mut self, name: impl Into<String>, notes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories
            .entry(name.into())
            .or_default()
            .extend(notes.into_iter().map(Into::into));
        self
    }

    /// Set the header suffix.
    pub fn with_header_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.header_suffix = suffix.into();
        self
    }

    /// Append every note of `other` to the matching category, creating
    /// categories that do not exist yet. Existing notes keep their position.
    pub fn add(&mut self, other: &Self) {
        for (category, notes) in &other.categories {
            self.categories
                .entry(category.clone())
                .or_default()
                .extend(notes.iter().cloned());
        }
    }

    /// The version heading: identifier followed by the header suffix.
    pub fn heading(&self, version: &str) -> String {
        format!("{version}{}", self.header_suffix)
    }

    /// Number of categories.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Number of notes across all categories.
    pub fn note_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Unpack a list of single-key objects into `(key, value)` pairs.
fn single_key_records<'a>(
    input: &'a Value,
    context: &str,
) -> ModelResult<Vec<(&'a String, &'a Value)>> {
    let records = input
        .as_array()
        .ok_or_else(|| ModelError::shape(context, "a list of single-key records"))?;

    records
        .iter()
        .enumerate()
        .map(|(position, record)| {
            let object = record
                .as_object()
                .filter(|object| object.len() == 1)
                .ok_or_else(|| {
                    ModelError::shape(
                        format!("{context}, record {position}"),
                        "an object with exactly one key",
                    )
                })?;
            object.iter().next().ok_or_else(|| {
                ModelError::shape(format!("{context}, record {position}"), "a non-empty object")
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!([
            {"v1": [
                {"1.0": {"Categories": {"Fixes": ["a"]}, "CreatedAt": 100}},
                {"1.1": {"Categories": {"Fixes": ["b"]}, "CreatedAt": 200}}
            ]}
        ])
    }

    #[test]
    fn builds_nested_model_in_input_order() {
        let data = ReleaseData::from_value(&sample()).unwrap();
        let family = data.family("v1").unwrap();
        let versions: Vec<_> = family.iter().map(|(v, _)| v).collect();
        assert_eq!(versions, ["1.0", "1.1"]);
        assert_eq!(family.get("1.1").unwrap().created_at, 200.0);
        assert_eq!(data.version_count(), 2);
    }

    #[test]
    fn numeric_looking_keys_keep_input_order() {
        let input = json!([
            {"21": [{"21.3": {"CreatedAt": 3}}, {"21.10": {"CreatedAt": 10}}]},
            {"3": [{"3.0": {"CreatedAt": 1}}]},
            {"100": [{"100.0": {"CreatedAt": 2}}]}
        ]);
        let data = ReleaseData::from_value(&input).unwrap();
        let families: Vec<_> = data.releases().keys().map(String::as_str).collect();
        assert_eq!(families, ["21", "3", "100"]);
        let flat: Vec<_> = data.iter_versions().map(|(_, v, _)| v).collect();
        assert_eq!(flat, ["21.3", "21.10", "3.0", "100.0"]);
    }

    #[test]
    fn category_order_follows_document_order() {
        let data: ReleaseData = r#"[{"v1": [{"1.0": {
            "Categories": {"Zeta": ["z"], "Alpha": ["a"], "Mid": ["m"]},
            "CreatedAt": 1
        }}]}]"#
            .parse()
            .unwrap();
        let notes = data.family("v1").unwrap().get("1.0").unwrap();
        let categories: Vec<_> = notes.categories.keys().map(String::as_str).collect();
        assert_eq!(categories, ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn optional_fields_default() {
        let input = json!([{"v1": [{"1.0": {"CreatedAt": 5}}]}]);
        let data = ReleaseData::from_value(&input).unwrap();
        let notes = data.family("v1").unwrap().get("1.0").unwrap();
        assert!(notes.categories.is_empty());
        assert!(notes.extra_notes.is_none());
        assert_eq!(notes.header_suffix, "");
        assert_eq!(notes.heading("1.0"), "1.0");
    }

    #[test]
    fn null_optional_fields_default() {
        let input = json!([{"v1": [{"1.0": {
            "Categories": null,
            "HeaderSuffix": null,
            "ExtraNotes": "kept",
            "CreatedAt": 5
        }}]}]);
        let data = ReleaseData::from_value(&input).unwrap();
        let notes = data.family("v1").unwrap().get("1.0").unwrap();
        assert!(notes.categories.is_empty());
        assert_eq!(notes.header_suffix, "");
        assert_eq!(notes.extra_notes.as_deref(), Some("kept"));
    }

    #[test]
    fn header_suffix_is_appended_to_heading() {
        let notes = ChangelogNotes::new(1.0).with_header_suffix(" (Pre-release)");
        assert_eq!(notes.heading("1.2.0-beta1"), "1.2.0-beta1 (Pre-release)");
    }

    #[test]
    fn non_array_top_level_is_invalid_shape() {
        let err = ReleaseData::from_value(&json!({"v1": []})).unwrap_err();
        assert!(matches!(err, ModelError::InvalidInputShape { .. }));
    }

    #[test]
    fn non_array_family_is_invalid_shape() {
        let err = ReleaseData::from_value(&json!([{"v1": {"1.0": {}}}])).unwrap_err();
        assert!(matches!(err, ModelError::InvalidInputShape { .. }));
        assert!(err.to_string().contains("release family `v1`"));
    }

    #[test]
    fn multi_key_record_is_invalid_shape() {
        let err = ReleaseData::from_value(&json!([{"v1": [], "v2": []}])).unwrap_err();
        assert!(matches!(err, ModelError::InvalidInputShape { .. }));
    }

    #[test]
    fn non_object_notes_are_invalid_shape() {
        let err = ReleaseData::from_value(&json!([{"v1": [{"1.0": 7}]}])).unwrap_err();
        assert!(matches!(err, ModelError::InvalidInputShape { .. }));
    }

    #[test]
    fn mistyped_notes_field_is_parse_error() {
        let input = json!([{"v1": [{"1.0": {"Categories": {"Fixes": "a"}, "CreatedAt": 1}}]}]);
        let err = ReleaseData::from_value(&input).unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = ReleaseData::from_path(Utf8Path::new("/nonexistent/changelog.json")).unwrap_err();
        assert!(matches!(err, ModelError::Read { .. }));
    }

    #[test]
    fn duplicate_version_in_family_keeps_first_position() {
        let input = json!([{"v1": [
            {"1.0": {"CreatedAt": 1}},
            {"1.1": {"CreatedAt": 2}},
            {"1.0": {"CreatedAt": 3}}
        ]}]);
        let data = ReleaseData::from_value(&input).unwrap();
        let family = data.family("v1").unwrap();
        let versions: Vec<_> = family.iter().map(|(v, n)| (v, n.created_at)).collect();
        assert_eq!(versions, [("1.0", 3.0), ("1.1", 2.0)]);
    }

    #[test]
    fn add_merges_disjoint_categories_in_call_order() {
        let mut notes = ChangelogNotes::new(1.0).with_category("Fixes", ["a", "b"]);
        let other = ChangelogNotes::new(2.0).with_category("Features", ["c"]);
        notes.add(&other);

        assert_eq!(notes.category_count(), 2);
        assert_eq!(notes.categories["Fixes"], ["a", "b"]);
        assert_eq!(notes.categories["Features"], ["c"]);
        let order: Vec<_> = notes.categories.keys().map(String::as_str).collect();
        assert_eq!(order, ["Fixes", "Features"]);
    }

    #[test]
    fn add_appends_to_existing_category() {
        let mut notes = ChangelogNotes::new(1.0).with_category("Fixes", ["a"]);
        notes.add(&ChangelogNotes::new(2.0).with_category("Fixes", ["b", "c"]));
        assert_eq!(notes.categories["Fixes"], ["a", "b", "c"]);
        assert_eq!(notes.note_count(), 3);
        assert_eq!(notes.created_at, 1.0);
    }
}
