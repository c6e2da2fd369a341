//! Fixed literal-string substitutions applied before storage.

use crate::collaborators::MarkupTransform;

/// XHTML-compliant void tags, and the empty paragraphs editors leave behind.
const COMPLIANCE_RULES: &[(&str, &str)] = &[
    ("<br>", "<br />"),
    ("<br/>", "<br />"),
    ("<BR>", "<br />"),
    ("<hr>", "<hr />"),
    ("<hr/>", "<hr />"),
    ("<HR>", "<hr />"),
    ("<p>&nbsp;</p>", ""),
    ("<p></p>", ""),
];

/// Stage that performs exact substring replacements.
///
/// Rules are applied in order; each rule operates on the output of the
/// previous one. [`LiteralSubstitutions::default`] carries the compliance
/// rules: self-closed `<br />` and `<hr />`, no empty paragraphs.
///
/// # Example
///
/// ```
/// use richtext_pipeline::{LiteralSubstitutions, MarkupTransform};
///
/// let s = LiteralSubstitutions::new(vec![("(c)", "&copy;")]);
/// assert_eq!(s.transform("<p>(c) 2024</p>"), "<p>&copy; 2024</p>");
/// ```
#[derive(Clone, Debug)]
pub struct LiteralSubstitutions {
    rules: Vec<(String, String)>,
}

impl LiteralSubstitutions {
    /// Create a new `LiteralSubstitutions` from `(needle, replacement)` pairs.
    pub fn new(rules: Vec<(&str, &str)>) -> Self {
        Self {
            rules: rules
                .into_iter()
                .filter(|(needle, _)| !needle.is_empty())
                .map(|(needle, replacement)| (needle.to_string(), replacement.to_string()))
                .collect(),
        }
    }

    /// Append one more rule after the existing ones.
    pub fn push(&mut self, needle: &str, replacement: &str) {
        if !needle.is_empty() {
            self.rules.push((needle.to_string(), replacement.to_string()));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for LiteralSubstitutions {
    fn default() -> Self {
        Self::new(COMPLIANCE_RULES.to_vec())
    }
}

impl MarkupTransform for LiteralSubstitutions {
    fn transform(&self, markup: &str) -> String {
        self.rules
            .iter()
            .fold(markup.to_string(), |acc, (needle, replacement)| {
                acc.replace(needle, replacement)
            })
    }
}
