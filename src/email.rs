//! Replaces `mailto:` links with links to the site contact form.
//!
//! Authors' addresses are stored as `mailto:` anchors, often with the target
//! written as numeric character references (`&#0109;&#0097;…`) to slow down
//! address harvesters. At display time every such anchor is pointed at the
//! contact form instead, so no address reaches the page as a raw link.

use std::sync::LazyLock;

use base64::Engine;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, percent_encode};
use regex::Regex;

use crate::collaborators::{ContactFormUrlBuilder, check_email};
use crate::context::RenderContext;
use crate::error::{Result, RichTextError};
use crate::markup::{self, ANCHOR_OPEN, decode_text, escape_attr};

/// End tag of an anchor.
static ANCHOR_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</a\s*>").expect("ANCHOR_CLOSE: hardcoded regex is valid")
});

/// Start of another anchor tag inside an anchor's content.
static ANCHOR_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<a[\s/>]").expect("ANCHOR_START: hardcoded regex is valid")
});

/// A target written entirely as numeric character references.
static ENCODED_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:&#(?:[0-9]+|[xX][0-9a-fA-F]+);)+$")
        .expect("ENCODED_TARGET: hardcoded regex is valid")
});

const MAILTO: &str = "mailto:";

/// Query-string encoding: RFC 3986 unreserved characters stay literal.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub const DEFAULT_CONTACT_PATH: &str = "/contact-us/email.htm";

fn has_mailto_prefix(s: &str) -> bool {
    s.get(..MAILTO.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(MAILTO))
}

/// Byte offsets of one anchor element: start tag `start..open_end`, inner
/// markup `open_end..inner_end`, end tag `inner_end..end`.
struct AnchorSpan {
    start: usize,
    open_end: usize,
    inner_end: usize,
    end: usize,
}

/// Every closed anchor element in `markup`, in document order.
///
/// Self-closed start tags (`<a name="top" />`) have no content and are
/// passed over. A start tag whose content runs into another `<a` before any
/// `</a>` is unclosed; it is dropped and scanning resumes right after it.
fn anchor_spans(markup: &str) -> Vec<AnchorSpan> {
    let mut spans = Vec::new();
    let mut pos = 0;
    while let Some(open) = ANCHOR_OPEN.find_at(markup, pos) {
        pos = open.end();
        if open.as_str().trim_end_matches('>').trim_end().ends_with('/') {
            continue;
        }
        let rest = &markup[open.end()..];
        let Some(close) = ANCHOR_CLOSE.find(rest) else {
            continue;
        };
        if ANCHOR_START
            .find(rest)
            .is_some_and(|next| next.start() < close.start())
        {
            continue;
        }
        spans.push(AnchorSpan {
            start: open.start(),
            open_end: open.end(),
            inner_end: open.end() + close.start(),
            end: open.end() + close.end(),
        });
        pos = open.end() + close.end();
    }
    spans
}

/// One `mailto:` anchor found in a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailLinkMatch<'a> {
    /// The full anchor, start tag to end tag.
    pub anchor: &'a str,
    /// The `href` value as written, possibly entity encoded.
    pub raw_target: &'a str,
    /// Inner markup of the anchor, byte for byte.
    pub inner: &'a str,
    href_start: usize,
    href_end: usize,
}

impl<'a> EmailLinkMatch<'a> {
    fn from_span(markup: &'a str, span: &AnchorSpan) -> Option<Self> {
        let href = markup::href(&markup[span.start..span.open_end])?;
        let raw = href.value.trim();
        if !has_mailto_prefix(raw) && !ENCODED_TARGET.is_match(raw) {
            return None;
        }

        let link = Self {
            anchor: &markup[span.start..span.end],
            raw_target: href.value,
            inner: &markup[span.open_end..span.inner_end],
            href_start: href.start,
            href_end: href.end,
        };
        // Encoded targets must still decode to a mailto: link.
        link.address().map(|_| link)
    }

    /// The decoded address, without the `mailto:` scheme or any query.
    pub fn address(&self) -> Option<String> {
        let raw = self.raw_target.trim();
        let decoded = if raw.contains('&') {
            decode_text(raw)
        } else {
            raw.to_string()
        };
        if !has_mailto_prefix(&decoded) {
            return None;
        }
        let target = decoded[MAILTO.len()..].split('?').next().unwrap_or_default();
        let address = percent_decode_str(target)
            .decode_utf8()
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| target.to_string());
        let address = address.trim();
        (!address.is_empty()).then(|| address.to_string())
    }

    /// The name shown on the contact form.
    ///
    /// If the visible text is just the address, a name is derived from the
    /// address instead so it is not echoed back verbatim.
    pub fn display_name(&self, address: &str) -> String {
        let text = decode_text(self.inner);
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let shows_address = text.eq_ignore_ascii_case(address)
            || (has_mailto_prefix(&text) && text[MAILTO.len()..].eq_ignore_ascii_case(address));
        if text.is_empty() || shows_address {
            derive_display_name(address)
        } else {
            text
        }
    }

    /// The anchor with its `href` value replaced. Everything else is kept as is.
    pub fn with_href(&self, href: &str) -> String {
        let mut out = String::with_capacity(self.anchor.len() + href.len());
        out.push_str(&self.anchor[..self.href_start]);
        out.push_str(href);
        out.push_str(&self.anchor[self.href_end..]);
        out
    }
}

/// `jane.doe@example.org` becomes `Jane Doe`.
pub fn derive_display_name(address: &str) -> String {
    let local = address.split('@').next().unwrap_or(address);
    local
        .replace('.', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Every `mailto:` anchor in `markup`, in document order.
pub fn find_email_links(markup: &str) -> Vec<EmailLinkMatch<'_>> {
    anchor_spans(markup)
        .iter()
        .filter_map(|span| EmailLinkMatch::from_span(markup, span))
        .collect()
}

/// Display-time stage that points `mailto:` anchors at the contact form.
pub struct EmailResolver {
    builder: Box<dyn ContactFormUrlBuilder>,
}

impl EmailResolver {
    /// Resolver building contact form URLs with `builder`.
    pub fn new(builder: impl ContactFormUrlBuilder + 'static) -> Self {
        Self::from_boxed(Box::new(builder))
    }

    /// Like [`new`](Self::new), for a builder that is already boxed.
    pub fn from_boxed(builder: Box<dyn ContactFormUrlBuilder>) -> Self {
        Self { builder }
    }

    fn rewrite(&self, link: &EmailLinkMatch<'_>, ctx: &RenderContext) -> Option<String> {
        let address = link.address()?;
        let name = link.display_name(&address);
        match self.builder.build_url(&address, &name, &ctx.request_origin()) {
            Ok(url) => Some(link.with_href(&escape_attr(&url))),
            Err(e) => {
                tracing::warn!("Leaving mailto link unchanged: {e}");
                None
            }
        }
    }

    /// Point every `mailto:` anchor in `markup` at the contact form. Anchors
    /// that cannot be rewritten are kept byte for byte.
    pub fn resolve(&self, markup: &str, ctx: &RenderContext) -> String {
        let mut out = String::with_capacity(markup.len());
        let mut copied = 0;
        for span in anchor_spans(markup) {
            let Some(rewritten) = EmailLinkMatch::from_span(markup, &span)
                .and_then(|link| self.rewrite(&link, ctx))
            else {
                continue;
            };
            out.push_str(&markup[copied..span.start]);
            out.push_str(&rewritten);
            copied = span.end;
        }
        out.push_str(&markup[copied..]);
        out
    }
}

/// The site contact form at a fixed path on the request host.
///
/// The address travels base64 encoded (URL-safe, unpadded) in `e`; the
/// display name is percent-encoded in `n`.
///
/// ```
/// use richtext_pipeline::{ContactForm, ContactFormUrlBuilder};
///
/// let form = ContactForm::default();
/// let url = form
///     .build_url("jane.doe@example.org", "Jane Doe", "https://www.example.org")
///     .unwrap();
/// assert_eq!(
///     url,
///     "https://www.example.org/contact-us/email.htm?e=amFuZS5kb2VAZXhhbXBsZS5vcmc&n=Jane%20Doe"
/// );
/// assert_eq!(ContactForm::decode_address("amFuZS5kb2VAZXhhbXBsZS5vcmc").as_deref(), Some("jane.doe@example.org"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactForm {
    path: String,
}

impl ContactForm {
    /// Contact form at `path`, which must be root-relative and carry no query.
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if !path.starts_with('/') || path.starts_with("//") || path.contains(['?', '#']) {
            return Err(RichTextError::Config(format!(
                "contact form path must be a root-relative path without query: {path}"
            )));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Recover the address from the form's `e` parameter.
    pub fn decode_address(encoded: &str) -> Option<String> {
        let bytes = BASE64_URL_SAFE_NO_PAD.decode(encoded).ok()?;
        String::from_utf8(bytes).ok()
    }
}

impl Default for ContactForm {
    fn default() -> Self {
        Self {
            path: DEFAULT_CONTACT_PATH.to_string(),
        }
    }
}

impl ContactFormUrlBuilder for ContactForm {
    fn build_url(&self, email: &str, display_name: &str, request_origin: &str) -> Result<String> {
        check_email(email)?;
        if request_origin.is_empty() || request_origin.ends_with("://") {
            return Err(RichTextError::ContactForm(
                "no request host to build the contact form URL on".to_string(),
            ));
        }
        Ok(format!(
            "{}{}?e={}&n={}",
            request_origin.trim_end_matches('/'),
            self.path,
            BASE64_URL_SAFE_NO_PAD.encode(email),
            percent_encode(display_name.as_bytes(), QUERY_ENCODE_SET)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recording;

    impl ContactFormUrlBuilder for Recording {
        fn build_url(&self, email: &str, name: &str, origin: &str) -> Result<String> {
            check_email(email)?;
            Ok(format!("{origin}/contact?to={email}&name={name}"))
        }
    }

    fn ctx() -> RenderContext {
        RenderContext::new("www.example.org")
    }

    #[test]
    fn finds_plain_and_encoded_targets() {
        let html = concat!(
            r#"<p><a href="mailto:jane.doe@example.org">jane.doe@example.org</a> or "#,
            r#"<a class="m" href="&#0109;&#0097;&#0105;&#0108;&#0116;&#0111;&#0058;&#0105;&#0110;&#0102;&#0111;&#0064;&#0101;&#0120;&#0097;&#0109;&#0112;&#0108;&#0101;&#0046;&#0111;&#0114;&#0103;">Info desk</a> or "#,
            r#"<a href="/about/">About</a></p>"#,
        );
        let links = find_email_links(html);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].address().as_deref(), Some("jane.doe@example.org"));
        assert_eq!(links[0].inner, "jane.doe@example.org");
        assert_eq!(links[1].address().as_deref(), Some("info@example.org"));
        assert_eq!(links[1].inner, "Info desk");
    }

    #[test]
    fn display_name_derivation() {
        assert_eq!(derive_display_name("jane.doe@example.org"), "Jane Doe");
        assert_eq!(derive_display_name("JOHN.SMITH@example.org"), "John Smith");
        assert_eq!(derive_display_name("info@example.org"), "Info");
        assert_eq!(derive_display_name("a..b@example.org"), "A B");
    }

    #[test]
    fn rewrites_only_the_href_value() {
        let html = r#"<a title="Mail" href="mailto:jane.doe@example.org?subject=Hi" class="x"><strong>jane.doe</strong>&#64;example.org</a>"#;
        let out = EmailResolver::new(Recording).resolve(html, &ctx());
        assert_eq!(
            out,
            r#"<a title="Mail" href="http://www.example.org/contact?to=jane.doe@example.org&amp;name=Jane Doe" class="x"><strong>jane.doe</strong>&#64;example.org</a>"#
        );
    }

    #[test]
    fn visible_name_is_passed_through() {
        let html = r#"<a href='MAILTO:press@example.org'>Press  office</a>"#;
        let out = EmailResolver::new(Recording).resolve(html, &ctx());
        assert_eq!(
            out,
            "<a href='http://www.example.org/contact?to=press@example.org&amp;name=Press office'>Press  office</a>"
        );
    }

    #[test]
    fn encoded_target_matching_visible_address() {
        let html = r#"<a href="&#x6d;&#x61;&#x69;&#x6c;&#x74;&#x6f;&#x3a;&#x69;&#x6e;&#x66;&#x6f;&#x40;&#x65;&#x78;&#x61;&#x6d;&#x70;&#x6c;&#x65;&#x2e;&#x6f;&#x72;&#x67;">&#105;nfo@example.org</a>"#;
        let out = EmailResolver::new(Recording).resolve(html, &ctx());
        assert_eq!(
            out,
            r#"<a href="http://www.example.org/contact?to=info@example.org&amp;name=Info">&#105;nfo@example.org</a>"#
        );
    }

    #[test]
    fn non_matching_anchors_untouched() {
        let html = concat!(
            r#"<a href="http://example.org">Site</a>"#,
            r#"<a href="&#0104;&#0116;&#0116;&#0112;&#0058;//x.org">Encoded http</a>"#,
            r#"<a href="prefix mailto:a@b.org">Odd</a>"#,
            r#"<a name="top">Top</a>"#,
            r#"<abbr title="mailto:a@b.org">abbr</abbr>"#,
        );
        assert_eq!(EmailResolver::new(Recording).resolve(html, &ctx()), html);
    }

    #[test]
    fn invalid_addresses_fall_back_to_original() {
        let html = r#"<a href="mailto:not-an-address">Write</a><a href="mailto:">Empty</a>"#;
        assert_eq!(EmailResolver::new(ContactForm::default()).resolve(html, &ctx()), html);
    }

    #[test]
    fn missing_host_falls_back_to_original() {
        let html = r#"<a href="mailto:info@example.org">Mail</a>"#;
        let no_host = RenderContext::default();
        assert_eq!(EmailResolver::new(ContactForm::default()).resolve(html, &no_host), html);
    }

    #[test]
    fn rewritten_output_is_stable() {
        let resolver = EmailResolver::new(ContactForm::default());
        let once = resolver.resolve(r#"<a href="mailto:jane.doe@example.org">jane.doe@example.org</a>"#, &ctx());
        assert_eq!(
            once,
            r#"<a href="http://www.example.org/contact-us/email.htm?e=amFuZS5kb2VAZXhhbXBsZS5vcmc&amp;n=Jane%20Doe">jane.doe@example.org</a>"#
        );
        assert_eq!(resolver.resolve(&once, &ctx()), once);
    }

    #[test]
    fn self_closed_anchor_does_not_hide_later_mailto() {
        let html = r#"<p><a name="top" /></p><p><a href="mailto:jane.doe@example.org">jane.doe@example.org</a></p>"#;
        assert_eq!(find_email_links(html).len(), 1);
        let out = EmailResolver::new(ContactForm::default()).resolve(html, &ctx());
        assert_eq!(
            out,
            r#"<p><a name="top" /></p><p><a href="http://www.example.org/contact-us/email.htm?e=amFuZS5kb2VAZXhhbXBsZS5vcmc&amp;n=Jane%20Doe">jane.doe@example.org</a></p>"#
        );
    }

    #[test]
    fn unclosed_anchor_does_not_hide_later_mailto() {
        let html = r#"<p><a href="/x">broken<p><a href="mailto:info@example.org">info@example.org</a></p>"#;
        let links = find_email_links(html);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].inner, "info@example.org");
        let out = EmailResolver::new(ContactForm::default()).resolve(html, &ctx());
        assert_eq!(
            out,
            r#"<p><a href="/x">broken<p><a href="http://www.example.org/contact-us/email.htm?e=aW5mb0BleGFtcGxlLm9yZw&amp;n=Info">info@example.org</a></p>"#
        );
    }

    #[test]
    fn unterminated_mailto_is_left_alone() {
        let html = r#"<p><a href="mailto:info@example.org">info@example.org</p>"#;
        assert!(find_email_links(html).is_empty());
        assert_eq!(EmailResolver::new(ContactForm::default()).resolve(html, &ctx()), html);
    }

    #[test]
    fn contact_form_path_validation() {
        assert!(ContactForm::new("/contact/").is_ok());
        assert!(ContactForm::new("contact").is_err());
        assert!(ContactForm::new("//evil.org/contact").is_err());
        assert!(ContactForm::new("/contact?x=1").is_err());
    }

    #[test]
    fn display_name_is_percent_encoded() {
        let url = ContactForm::default()
            .build_url("a@example.org", "Zoë & Co", "https://example.org/")
            .unwrap();
        assert_eq!(url, "https://example.org/contact-us/email.htm?e=YUBleGFtcGxlLm9yZw&n=Zo%C3%AB%20%26%20Co");
    }
}
