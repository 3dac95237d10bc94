//! Markdown fragment builders.
//!
//! Every builder returns a self-contained fragment. Headings and collapsible
//! blocks carry their own surrounding newlines and list items end in a
//! newline, so a document is assembled by plain concatenation.

/// Level-1 heading.
pub fn h1(text: &str) -> String {
    heading(1, text)
}

/// Level-2 heading.
pub fn h2(text: &str) -> String {
    heading(2, text)
}

/// Level-3 heading.
pub fn h3(text: &str) -> String {
    heading(3, text)
}

/// Level-4 heading.
pub fn h4(text: &str) -> String {
    heading(4, text)
}

/// Level-5 heading.
pub fn h5(text: &str) -> String {
    heading(5, text)
}

/// Level-6 heading.
pub fn h6(text: &str) -> String {
    heading(6, text)
}

fn heading(level: usize, text: &str) -> String {
    format!("\n{} {text}\n", "#".repeat(level))
}

/// `**text**`
pub fn bold(text: &str) -> String {
    format!("**{text}**")
}

/// `*text*`
pub fn italic(text: &str) -> String {
    format!("*{text}*")
}

/// Ordered list item. CommonMark renumbers, so every item uses `1.`.
pub fn ordered_list_item(text: &str) -> String {
    format!("1. {text}\n")
}

/// Unordered list item.
pub fn unordered_list_item(text: &str) -> String {
    format!("- {text}\n")
}

/// Inline link.
pub fn link(title: &str, url: &str) -> String {
    format!("[{title}]({url})")
}

/// A `<details>` disclosure block with `title` as its summary.
///
/// The body is separated from the raw HTML by blank lines so it is still
/// parsed as markdown.
pub fn collapsible(title: &str, content: &str) -> String {
    format!("\n<details><summary>\n{title}</summary>\n\n{content}\n</details>\n")
}
