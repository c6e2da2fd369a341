//! House structure for blockquotes.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::collaborators::MarkupTransform;

static BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)(<blockquote(?:\s(?:[^>"']|"[^"]*"|'[^']*')*)?>)(.*?)</blockquote\s*>"#)
        .expect("BLOCKQUOTE: hardcoded regex is valid")
});

static DIV_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)</?div(?:\s(?:[^>"']|"[^"]*"|'[^']*')*)?/?>"#)
        .expect("DIV_TAG: hardcoded regex is valid")
});

static FIRST_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+class\s*=\s*(?:"first"|'first')"#)
        .expect("FIRST_CLASS: hardcoded regex is valid")
});

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<br\s*/?>").expect("LINE_BREAK: hardcoded regex is valid")
});

/// A `class` attribute among a tag's attributes.
static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\sclass\s*=").expect("CLASS_ATTR: hardcoded regex is valid")
});

static PARAGRAPH_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<p(\s(?:[^>"']|"[^"]*"|'[^']*')*)?>"#)
        .expect("PARAGRAPH_OPEN: hardcoded regex is valid")
});

/// Rewrites every `<blockquote>` region to
/// `<blockquote><div><p class="first">…</p>…</div></blockquote>`.
///
/// Inner `<div>` wrappers, `class="first"` markers and line breaks are
/// removed first, so running the stage again produces the same output.
/// Each blockquote is handled on its own; nested blockquotes are not
/// supported.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockquoteNormalizer;

impl BlockquoteNormalizer {
    fn normalize_interior(interior: &str) -> String {
        let cleaned = FIRST_CLASS.replace_all(interior, "");
        let cleaned = DIV_TAG.replace_all(&cleaned, "");
        let cleaned = LINE_BREAK.replace_all(&cleaned, "");

        let Some(caps) = PARAGRAPH_OPEN.captures(&cleaned) else {
            return cleaned.into_owned();
        };
        let attrs = caps.get(1).map_or("", |m| m.as_str());
        if CLASS_ATTR.is_match(attrs) {
            // An author-supplied class wins over the marker.
            return cleaned.into_owned();
        }
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        format!(
            "{}<p class=\"first\"{attrs}>{}",
            &cleaned[..whole.start],
            &cleaned[whole.end..]
        )
    }
}

impl MarkupTransform for BlockquoteNormalizer {
    fn transform(&self, markup: &str) -> String {
        BLOCKQUOTE
            .replace_all(markup, |caps: &Captures<'_>| {
                format!(
                    "{}<div>{}</div></blockquote>",
                    &caps[1],
                    Self::normalize_interior(&caps[2])
                )
            })
            .into_owned()
    }
}
