//! View modes and routing tokens.
//!
//! A view token selects one of the three presentations. Tokens double as
//! location fragments (`#chronological_241`): the part before the first
//! [`HASH_SEPARATOR`] names the view, the rest names a heading inside it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Separates the view prefix from the heading slug in anchors and fragments.
pub const HASH_SEPARATOR: char = '_';

/// One of the three changelog presentations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    /// Grouped by release family, dataset order.
    #[default]
    #[serde(alias = "minorrelease")]
    MinorRelease,
    /// Every version, newest first.
    Chronological,
    /// Notes aggregated across a selected range of versions.
    #[serde(alias = "compareversions")]
    CompareVersions,
}

impl ViewMode {
    /// All view modes, in menu order.
    pub const ALL: &[Self] = &[Self::MinorRelease, Self::Chronological, Self::CompareVersions];

    /// Canonical routing token.
    pub const fn token(self) -> &'static str {
        match self {
            Self::MinorRelease => "minor-release",
            Self::Chronological => "chronological",
            Self::CompareVersions => "compare-versions",
        }
    }

    /// Prefix of every heading id rendered in this view.
    pub const fn header_id_prefix(self) -> &'static str {
        match self {
            Self::MinorRelease => "minorrelease",
            Self::Chronological => "chronological",
            Self::CompareVersions => "compareversions",
        }
    }

    /// Parse a token, accepting the canonical and the prefix spelling.
    pub fn parse_token(token: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|mode| token == mode.token() || token == mode.header_id_prefix())
    }

    /// Parse a token, falling back to `default` for anything unrecognised.
    pub fn from_token_or(token: &str, default: Self) -> Self {
        Self::parse_token(token).unwrap_or_else(|| {
            debug!(token, fallback = default.token(), "unknown view token");
            default
        })
    }

    /// Parse a token, falling back to [`ViewMode::MinorRelease`].
    pub fn from_token(token: &str) -> Self {
        Self::from_token_or(token, Self::default())
    }

    /// Route a location fragment such as `#chronological_241`.
    ///
    /// Returns the view and, if present, the heading id that follows the
    /// separator.
    pub fn from_location_hash(hash: &str) -> (Self, Option<&str>) {
        let hash = hash.strip_prefix('#').unwrap_or(hash);
        match hash.split_once(HASH_SEPARATOR) {
            Some((token, heading)) if !heading.is_empty() => {
                (Self::from_token(token), Some(heading))
            }
            Some((token, _)) => (Self::from_token(token), None),
            None => (Self::from_token(hash), None),
        }
    }

    /// The anchor id of a heading in this view: `<prefix>_<heading_id>`.
    pub fn anchor_id(self, heading_id: &str) -> String {
        format!("{}{HASH_SEPARATOR}{heading_id}", self.header_id_prefix())
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
