//! First-letter capitalization.

use crate::collaborators::MarkupTransform;

/// Upper-cases the first alphanumeric character of the text content.
///
/// Characters inside tags, quoted attribute values included, are skipped, as
/// are character references such as `&nbsp;`. Only the first qualifying
/// character is considered: content that starts with a digit ("11am
/// meeting") is left as it is.
///
/// ```
/// use richtext_pipeline::{MarkupTransform, SentenceCase};
///
/// assert_eq!(SentenceCase.transform("<p>hello</p>"), "<p>Hello</p>");
/// assert_eq!(SentenceCase.transform("<p>11am meeting</p>"), "<p>11am meeting</p>");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct SentenceCase;

/// Length in bytes of a character reference starting at `rest`, if any.
fn reference_len(rest: &str) -> Option<usize> {
    let body = rest.strip_prefix('&')?;
    let end = body.find(';')?;
    let name = &body[..end];
    let valid = if let Some(num) = name.strip_prefix('#') {
        match num.strip_prefix(['x', 'X']) {
            Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
            None => !num.is_empty() && num.chars().all(|c| c.is_ascii_digit()),
        }
    } else {
        !name.is_empty() && name.len() <= 32 && name.chars().all(|c| c.is_ascii_alphanumeric())
    };
    valid.then_some(end + 2)
}

/// Where the scanner is relative to markup.
#[derive(Clone, Copy)]
enum Scan {
    Text,
    /// Inside a tag. `after_eq` is set right after an `=`, where a quote
    /// opens an attribute value.
    Tag { after_eq: bool },
    /// Inside a quoted attribute value; `>` here does not end the tag.
    Quoted(char),
}

impl MarkupTransform for SentenceCase {
    fn transform(&self, markup: &str) -> String {
        let mut state = Scan::Text;
        let mut skip_until = 0;

        for (i, c) in markup.char_indices() {
            if i < skip_until {
                continue;
            }
            match state {
                Scan::Tag { after_eq } => {
                    state = match c {
                        '>' => Scan::Text,
                        '"' | '\'' if after_eq => Scan::Quoted(c),
                        '=' => Scan::Tag { after_eq: true },
                        c if c.is_whitespace() => Scan::Tag { after_eq },
                        _ => Scan::Tag { after_eq: false },
                    };
                    continue;
                }
                Scan::Quoted(quote) => {
                    if c == quote {
                        state = Scan::Tag { after_eq: false };
                    }
                    continue;
                }
                Scan::Text => {}
            }
            match c {
                '<' => state = Scan::Tag { after_eq: false },
                '&' => {
                    if let Some(len) = reference_len(&markup[i..]) {
                        skip_until = i + len;
                    }
                }
                c if c.is_alphanumeric() => {
                    if !c.is_lowercase() {
                        return markup.to_string();
                    }
                    let mut out = String::with_capacity(markup.len() + 2);
                    out.push_str(&markup[..i]);
                    out.extend(c.to_uppercase());
                    out.push_str(&markup[i + c.len_utf8()..]);
                    return out;
                }
                _ => {}
            }
        }
        markup.to_string()
    }
}
