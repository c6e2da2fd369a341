//! Tag allow-list filter.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::collaborators::MarkupTransform;

/// A start or end tag: `<` or `</`, a name, then `>`, `/>`, or whitespace,
/// attributes and `>`. Quoted attribute values may contain `>`.
static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"</?([A-Za-z][A-Za-z0-9:-]*)(?:\s(?:[^>"']|"[^"]*"|'[^']*')*)?/?>"#)
        .expect("TAG: hardcoded regex is valid")
});

/// Set of lower-case tag names that survive [`AllowList`] filtering.
///
/// An empty set means "no filtering".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AllowedElementSet {
    names: HashSet<String>,
}

impl AllowedElementSet {
    /// Create an empty set, which allows every tag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag name. Names are stored lower-cased.
    pub fn insert(&mut self, name: &str) {
        let name = name.trim().to_ascii_lowercase();
        if !name.is_empty() {
            self.names.insert(name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

impl<S: AsRef<str>> FromIterator<S> for AllowedElementSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name.as_ref());
        }
        set
    }
}

/// Stage that removes every tag whose name is not in an [`AllowedElementSet`],
/// keeping the text between the tags.
///
/// # Example
///
/// ```
/// use richtext_pipeline::{AllowList, AllowedElementSet, MarkupTransform};
///
/// let filter = AllowList::new(AllowedElementSet::from_iter(["p", "a"]));
/// let result = filter.transform(r#"<p><font color="red">Hi</font></p>"#);
/// assert_eq!(result, "<p>Hi</p>");
/// ```
pub struct AllowList {
    allowed: AllowedElementSet,
}

impl AllowList {
    /// Filter keeping only the tags in `allowed`.
    pub fn new(allowed: AllowedElementSet) -> Self {
        Self { allowed }
    }

    pub fn allowed(&self) -> &AllowedElementSet {
        &self.allowed
    }
}

impl MarkupTransform for AllowList {
    fn transform(&self, markup: &str) -> String {
        if self.allowed.is_empty() {
            return markup.to_string();
        }
        TAG.replace_all(markup, |caps: &Captures<'_>| {
            if self.allowed.contains(&caps[1]) {
                caps[0].to_string()
            } else {
                String::new()
            }
        })
        .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(names: &[&str]) -> AllowList {
        AllowList::new(names.iter().copied().collect())
    }

    #[test]
    fn strips_disallowed_tags_keeps_text() {
        let result = filter(&["p"]).transform(r#"<p>Hello <span class="x">there</span></p>"#);
        assert_eq!(result, "<p>Hello there</p>");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let result = filter(&["P", "em"]).transform("<P>a <EM>b</EM> <FONT>c</FONT></P>");
        assert_eq!(result, "<P>a <EM>b</EM> c</P>");
    }

    #[test]
    fn self_closing_and_attribute_bearing_tags() {
        let result = filter(&["p"]).transform(r#"<p>a<br/>b<br />c<img src="x.gif" alt="y"></p>"#);
        assert_eq!(result, "<p>abc</p>");
    }

    #[test]
    fn quoted_gt_inside_attribute_does_not_leak() {
        let result = filter(&["p"]).transform(r#"<p><span title="a > b">t</span></p>"#);
        assert_eq!(result, "<p>t</p>");
    }

    #[test]
    fn empty_set_is_a_no_op() {
        let html = "<script>x</script><p>y</p>";
        assert_eq!(filter(&[]).transform(html), html);
    }

    #[test]
    fn non_tag_text_is_left_alone() {
        let html = "<p>1 < 2 and 3 <> 4 <!-- note --></p>";
        assert_eq!(filter(&["p"]).transform(html), html);
    }

    #[test]
    fn set_membership() {
        let set: AllowedElementSet = ["  Strong ", "", "a"].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains("STRONG"));
        assert!(!set.contains("b"));
    }
}
