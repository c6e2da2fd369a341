//! Default paragraph formatter.

use std::sync::LazyLock;

use regex::Regex;

use crate::collaborators::MarkupTransform;

static BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n[ \t]*\n\s*").expect("BLANK_LINE: hardcoded regex is valid")
});

static BLOCK_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^<(?:p|div|blockquote|ul|ol|li|dl|h[1-6]|table|pre|hr|form|fieldset|address|section|article|aside|header|footer|nav|figure|iframe|object)\b",
    )
    .expect("BLOCK_START: hardcoded regex is valid")
});

/// Wraps each blank-line separated run that does not already start with a
/// block-level tag in `<p>…</p>`.
///
/// Used when paragraph wrapping is enabled and the host system does not
/// supply its own formatter.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlankLineParagraphs;

impl MarkupTransform for BlankLineParagraphs {
    fn transform(&self, markup: &str) -> String {
        let normalized = markup.replace("\r\n", "\n");
        if normalized.trim().is_empty() {
            return markup.to_string();
        }
        BLANK_LINE
            .split(normalized.trim())
            .map(str::trim)
            .filter(|run| !run.is_empty())
            .map(|run| {
                if BLOCK_START.is_match(run) {
                    run.to_string()
                } else {
                    format!("<p>{run}</p>")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
