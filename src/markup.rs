//! Small helpers for picking apart and patching tag markup without a full
//! parse.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

/// An anchor start tag. Quoted attribute values may contain `>`.
pub(crate) static ANCHOR_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<a\s(?:[^>"']|"[^"]*"|'[^']*')*>"#)
        .expect("ANCHOR_OPEN: hardcoded regex is valid")
});

/// The `href` attribute inside a start tag. Group 1 is a double-quoted value,
/// group 2 a single-quoted one.
static HREF_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\shref\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("HREF_ATTR: hardcoded regex is valid")
});

static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\sclass\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("CLASS_ATTR: hardcoded regex is valid")
});

/// Location of an attribute value inside a tag.
pub(crate) struct AttrValue<'a> {
    pub value: &'a str,
    pub start: usize,
    pub end: usize,
}

fn attr_value<'a>(re: &Regex, tag: &'a str) -> Option<AttrValue<'a>> {
    let caps = re.captures(tag)?;
    let m = caps.get(1).or_else(|| caps.get(2))?;
    Some(AttrValue {
        value: m.as_str(),
        start: m.start(),
        end: m.end(),
    })
}

/// Find the `href` value of a start tag.
pub(crate) fn href(tag: &str) -> Option<AttrValue<'_>> {
    attr_value(&HREF_ATTR, tag)
}

/// Replace the byte range `value` of `tag` with `replacement`.
pub(crate) fn splice(tag: &str, value: &AttrValue<'_>, replacement: &str) -> String {
    let mut out = String::with_capacity(tag.len() + replacement.len());
    out.push_str(&tag[..value.start]);
    out.push_str(replacement);
    out.push_str(&tag[value.end..]);
    out
}

/// Byte offset at which new attributes can be inserted into a start tag.
fn insertion_point(tag: &str) -> usize {
    let trimmed = tag.trim_end_matches('>');
    let trimmed = trimmed.trim_end_matches('/');
    trimmed.trim_end().len()
}

/// Add `name="value"` to a start tag unless the attribute is already present.
pub(crate) fn add_attr<'a>(tag: &'a str, name: &str, value: &str) -> Cow<'a, str> {
    let lowered = tag.to_ascii_lowercase();
    let needle = format!("{}=", name.to_ascii_lowercase());
    if lowered.contains(&format!(" {needle}")) || lowered.contains(&format!(" {name} =")) {
        return Cow::Borrowed(tag);
    }
    let at = insertion_point(tag);
    Cow::Owned(format!(
        "{} {name}=\"{}\"{}",
        &tag[..at],
        escape_attr(value),
        &tag[at..]
    ))
}

/// Add a CSS class token to a start tag. Existing tokens are left alone, so
/// calling this twice has no further effect.
pub(crate) fn add_class<'a>(tag: &'a str, class: &str) -> Cow<'a, str> {
    match attr_value(&CLASS_ATTR, tag) {
        Some(existing) => {
            if existing.value.split_whitespace().any(|c| c == class) {
                return Cow::Borrowed(tag);
            }
            let joined = if existing.value.trim().is_empty() {
                class.to_string()
            } else {
                format!("{} {class}", existing.value.trim_end())
            };
            Cow::Owned(splice(tag, &existing, &joined))
        }
        None => add_attr(tag, "class", class),
    }
}

/// Host part of an absolute or protocol-relative URL, lower-cased.
pub(crate) fn host_of(url: &str) -> Option<String> {
    let rest = url
        .strip_prefix("//")
        .or_else(|| {
            let (scheme, rest) = url.split_once("://")?;
            scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                .then_some(rest)
        })?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let host = authority.rsplit('@').next()?.split(':').next()?;
    if host.is_empty() {
        None
    } else {
        Some(host.to_ascii_lowercase())
    }
}

/// Whether `host` is `domain` or one of its subdomains.
pub(crate) fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Text content of a markup fragment: tags dropped, character references
/// decoded.
pub(crate) fn decode_text(markup: &str) -> String {
    if !markup.contains(['&', '<']) {
        return markup.to_string();
    }
    let fragment = Html::parse_fragment(markup);
    fragment.root_element().text().collect()
}

/// Escape a value for use inside a quoted attribute.
pub(crate) fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape character data.
pub(crate) fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
