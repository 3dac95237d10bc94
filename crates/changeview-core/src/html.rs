//! Markdown to HTML conversion and heading anchors.
//!
//! The renderers only produce markdown. [`HtmlConverter`] is the boundary to
//! whatever turns that into HTML; [`CmarkConverter`] is the stock
//! implementation on `pulldown-cmark`. It gives every heading an id of the
//! form `<view prefix>_<slug>`, shifts heading levels so that markdown
//! level 1 lands on [`HtmlOptions::heading_level_start`], and then lets
//! [`add_heading_anchors`] attach a deep-link anchor to each heading.

use std::collections::HashMap;
use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html};
use regex::{Captures, Regex};

use crate::config::RenderConfig;
use crate::view::{HASH_SEPARATOR, ViewMode};

/// Per-render settings for the HTML boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlOptions {
    /// View whose prefix heading ids carry.
    pub view: ViewMode,
    /// HTML level of a level-1 markdown heading.
    pub heading_level_start: u8,
    /// Whether to run [`add_heading_anchors`] over the output.
    pub header_anchors: bool,
}

impl HtmlOptions {
    /// Options for `view` taken from the render configuration.
    pub const fn for_view(view: ViewMode, config: &RenderConfig) -> Self {
        Self {
            view,
            heading_level_start: config.heading_level_start,
            header_anchors: config.header_anchors,
        }
    }
}

/// Converts rendered markdown to HTML.
///
/// Implementations must be pure: the same markdown and options always give
/// the same HTML.
pub trait HtmlConverter {
    /// Convert `markdown` to HTML.
    fn to_html(&self, markdown: &str, options: &HtmlOptions) -> String;
}

/// [`HtmlConverter`] backed by `pulldown-cmark`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmarkConverter;

impl HtmlConverter for CmarkConverter {
    fn to_html(&self, markdown: &str, options: &HtmlOptions) -> String {
        let mut events: Vec<Event<'_>> = Parser::new_ext(markdown, Options::empty()).collect();
        let mut ids = HeadingIds::new(options.view);
        let mut open = None;

        for index in 0..events.len() {
            if let Event::Start(Tag::Heading { level, .. }) = events[index] {
                let shifted = shift_level(level, options.heading_level_start);
                let id = ids.next(&heading_text(&events[index + 1..]));
                events[index] = Event::Start(Tag::Heading {
                    level: shifted,
                    id: Some(CowStr::from(id)),
                    classes: Vec::new(),
                    attrs: Vec::new(),
                });
                open = Some(shifted);
            } else if let Event::End(TagEnd::Heading(_)) = events[index]
                && let Some(shifted) = open.take()
            {
                events[index] = Event::End(TagEnd::Heading(shifted));
            }
        }

        let mut output = String::with_capacity(markdown.len() * 2);
        html::push_html(&mut output, events.into_iter());

        if options.header_anchors {
            add_heading_anchors(&output)
        } else {
            output
        }
    }
}

fn shift_level(level: HeadingLevel, start: u8) -> HeadingLevel {
    let target = (level as usize + usize::from(start)).saturating_sub(1).clamp(1, 6);
    HeadingLevel::try_from(target).unwrap_or(HeadingLevel::H6)
}

/// Plain text of a heading, read from the events that follow its start tag.
fn heading_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::End(TagEnd::Heading(_)) => break,
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            _ => {}
        }
    }
    text
}

/// Hands out heading ids, numbering repeats `-1`, `-2`, ...
struct HeadingIds {
    prefix: &'static str,
    seen: HashMap<String, usize>,
}

impl HeadingIds {
    fn new(view: ViewMode) -> Self {
        Self {
            prefix: view.header_id_prefix(),
            seen: HashMap::new(),
        }
    }

    fn next(&mut self, text: &str) -> String {
        let base = slug(&format!("{}{HASH_SEPARATOR}{text}", self.prefix));
        match self.seen.get_mut(&base) {
            Some(count) => {
                let id = format!("{base}-{count}");
                *count += 1;
                id
            }
            None => {
                self.seen.insert(base.clone(), 1);
                base
            }
        }
    }
}

/// Keep word characters only, lowercased: `"1.2.0 (Pre-release)"` becomes `"120prerelease"`.
pub fn slug(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

const ANCHOR_ICON: &str = r#"<span class="octicon octicon-link"></span>"#;

static HEADING_WITH_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<h([1-5]) id="([^"]+)">.*?)(</h([1-6])>)"#).expect("heading pattern is valid")
});

/// Insert a self-link anchor before the closing tag of every `<h1>`-`<h5>`
/// that carries an `id`.
///
/// The anchor targets the heading's own id, so a location fragment of
/// `#<id>` scrolls to it. Level-6 headings are left untouched.
pub fn add_heading_anchors(html: &str) -> String {
    HEADING_WITH_ID
        .replace_all(html, |caps: &Captures<'_>| {
            if caps[2] != caps[5] {
                return caps[0].to_string();
            }
            let id = &caps[3];
            format!(
                r##"{}<a id="user-content-{id}" class="anchor" href="#{id}" aria-hidden="true">{ANCHOR_ICON}</a>{}"##,
                &caps[1], &caps[4]
            )
        })
        .into_owned()
}
