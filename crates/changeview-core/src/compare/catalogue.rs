//! The flat, ordered list of versions the compare view selects from.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::{DuplicatePolicy, RenderConfig};
use crate::model::{ChangelogNotes, ReleaseData};

/// One selectable version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogueEntry {
    /// Family the version was first found in.
    pub family: String,
    /// The version's notes.
    pub notes: ChangelogNotes,
}

/// Every version of a dataset in construction order, family grouping dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogue {
    entries: IndexMap<String, CatalogueEntry>,
}

impl Catalogue {
    /// Flatten `releases` into a catalogue.
    ///
    /// A version seen in an earlier family keeps its position. Its notes are
    /// replaced or extended according to [`RenderConfig::duplicate_versions`].
    #[instrument(skip_all)]
    pub fn build(releases: &ReleaseData, config: &RenderConfig) -> Self {
        let mut entries: IndexMap<String, CatalogueEntry> = IndexMap::new();
        let mut skipped = 0usize;

        for (family, version, notes) in releases.iter_versions() {
            if !config.admits_version(version) {
                skipped += 1;
                continue;
            }
            match (entries.get_mut(version), config.duplicate_versions) {
                (Some(existing), DuplicatePolicy::Merge) => existing.notes.add(notes),
                (Some(existing), DuplicatePolicy::Overwrite) => existing.notes = notes.clone(),
                (None, _) => {
                    entries.insert(
                        version.to_string(),
                        CatalogueEntry {
                            family: family.to_string(),
                            notes: notes.clone(),
                        },
                    );
                }
            }
        }

        debug!(versions = entries.len(), skipped, "catalogue built");
        Self { entries }
    }

    /// Number of versions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no versions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry at `index`.
    pub fn get_index(&self, index: usize) -> Option<(&str, &CatalogueEntry)> {
        self.entries.get_index(index).map(|(k, v)| (k.as_str(), v))
    }

    /// The entry for `version`.
    pub fn get(&self, version: &str) -> Option<&CatalogueEntry> {
        self.entries.get(version)
    }

    /// Position of `version`.
    pub fn index_of(&self, version: &str) -> Option<usize> {
        self.entries.get_index_of(version)
    }

    /// The first entry, shown when nothing is selected.
    pub fn first(&self) -> Option<(&str, &CatalogueEntry)> {
        self.get_index(0)
    }

    /// `(version, entry)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogueEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Version identifiers in order.
    pub fn versions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(version, notes)` for the inclusive range `start..=end`.
    ///
    /// Indices past the end are cut off; an empty iterator results if
    /// `start > end`.
    pub fn range(&self, start: usize, end: usize) -> impl Iterator<Item = (&str, &ChangelogNotes)> {
        self.entries
            .iter()
            .skip(start)
            .take((end + 1).saturating_sub(start))
            .map(|(k, v)| (k.as_str(), &v.notes))
    }
}
