//! Core library for changeview.
//!
//! Turns a structured changelog dataset into markdown and HTML in one of three
//! views: grouped by release family, as a single timeline, or as a comparison
//! that aggregates the notes of a range of versions.
//!
//! # Modules
//!
//! - [`compare`] - Version catalogue, range selection and aggregation
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`html`] - Markdown to HTML conversion and heading anchors
//! - [`markdown`] - Markdown fragment builders
//! - [`model`] - The release family / version / notes data model
//! - [`render`] - Renderers for each view
//! - [`view`] - View modes and routing tokens
//!
//! # Quick Start
//!
//! ```no_run
//! use changeview_core::{ConfigLoader, ReleaseData, render_view};
//!
//! let config = ConfigLoader::new()
//!     .with_user_config(true)
//!     .load()
//!     .expect("Failed to load configuration");
//!
//! let path = config.changelog_path(None).expect("no dataset configured");
//! let releases = ReleaseData::from_path(&path).expect("invalid dataset");
//! println!("{}", render_view("chronological", &releases, &config.render));
//! ```
#![deny(unsafe_code)]

pub mod compare;

pub mod config;

pub mod error;

pub mod html;

pub mod markdown;

pub mod model;

pub mod render;

pub mod view;

pub use compare::{CompareSession, Selection};

pub use config::{Config, ConfigLoader, DuplicatePolicy, LogLevel, RenderConfig};

pub use error::{ConfigError, ConfigResult, ModelError, ModelResult, SelectionError};

pub use html::{CmarkConverter, HtmlConverter, HtmlOptions};

pub use model::{ChangelogNotes, ReleaseData, VersionData};

pub use render::{Render, Renderer, render_view};

pub use view::ViewMode;
