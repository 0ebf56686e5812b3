//! Markdown scanning: inline links and script mentions.

use serde::{Deserialize, Serialize};

/// An inline `[label](target)` link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkdownLink {
    /// Text between the brackets.
    pub label: String,
    /// Raw target between the parentheses.
    pub target: String,
    /// One-based line number.
    pub line: usize,
}

impl MarkdownLink {
    /// `true` for web, mail and same-page anchor targets.
    pub fn is_external(&self) -> bool {
        let target = self.target.as_str();
        target.starts_with("http://")
            || target.starts_with("https://")
            || target.starts_with("mailto:")
            || target.starts_with('#')
    }

    /// Target with any `#fragment` removed.
    pub fn path(&self) -> &str {
        match self.target.split_once('#') {
            Some((path, _)) => path,
            None => &self.target,
        }
    }
}

/// Extracts inline links, including images, line by line.
///
/// A trailing `"title"` after the target is dropped.
pub fn parse_links(markdown: &str) -> Vec<MarkdownLink> {
    let mut links = Vec::new();
    for (index, line) in markdown.lines().enumerate() {
        let mut rest = line;
        while let Some(open) = rest.find('[') {
            let after_open = &rest[open + 1..];
            let Some(close) = after_open.find("](") else {
                break;
            };
            let label = &after_open[..close];
            let after_paren = &after_open[close + 2..];
            let Some(end) = after_paren.find(')') else {
                break;
            };
            let raw = after_paren[..end].trim();
            let target = raw.split_whitespace().next().unwrap_or("");
            let target = target.trim_start_matches('<').trim_end_matches('>');
            // nested brackets: restart from the innermost opening bracket
            if let Some(inner) = label.rfind('[') {
                rest = &after_open[inner..];
                continue;
            }
            if !target.is_empty() {
                links.push(MarkdownLink {
                    label: label.trim().to_string(),
                    target: target.to_string(),
                    line: index + 1,
                });
            }
            rest = &after_paren[end + 1..];
        }
    }
    links
}

/// File names ending in `.py` mentioned anywhere in the text, deduplicated in order.
pub fn script_mentions(markdown: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let is_name_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.');
    for token in markdown.split(|c: char| !is_name_char(c)) {
        let token = token.trim_end_matches('.');
        if token.len() > 3 && token.ends_with(".py") && !names.iter().any(|n| n == token) {
            names.push(token.to_string());
        }
    }
    names
}
