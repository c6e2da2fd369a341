use regex::Captures;

use super::LinkRule;
use crate::context::RenderContext;
use crate::markup::{self, ANCHOR_OPEN};

/// Attribute telling the in-page editor that an absolute link is intended.
pub const EDITOR_MARKER_ATTR: &str = "data-unpublished-check";

/// On a secure channel, turns root-relative links that leave the channel into
/// absolute `http://` links on the request host, so visitors drop back to
/// plain HTTP outside the secure area.
///
/// Links at or below the channel prefix stay relative. Protocol-relative
/// (`//host/…`) links are never touched.
#[derive(Clone, Copy, Debug, Default)]
pub struct SecureChannelRule;

fn within_channel(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    let Some(head) = path.get(..prefix.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(prefix) {
        return false;
    }
    matches!(path[prefix.len()..].chars().next(), None | Some('/' | '?' | '#'))
}

impl SecureChannelRule {
    fn rewrite_tag(tag: &str, ctx: &RenderContext) -> Option<String> {
        let href = markup::href(tag)?;
        let path = href.value;
        if !path.starts_with('/') || path.starts_with("//") {
            return None;
        }
        if within_channel(path, ctx.normalized_channel_prefix()) {
            return None;
        }
        let absolute = format!("http://{}{path}", ctx.request_host);
        let rewritten = markup::splice(tag, &href, &absolute);
        if ctx.can_edit {
            Some(markup::add_attr(&rewritten, EDITOR_MARKER_ATTR, "off").into_owned())
        } else {
            Some(rewritten)
        }
    }
}

impl LinkRule for SecureChannelRule {
    fn name(&self) -> &'static str {
        "secure-channel"
    }

    fn applies(&self, ctx: &RenderContext) -> bool {
        ctx.secure_channel && !ctx.request_host.is_empty()
    }

    fn rewrite(&self, markup: &str, ctx: &RenderContext) -> String {
        ANCHOR_OPEN
            .replace_all(markup, |caps: &Captures<'_>| {
                Self::rewrite_tag(&caps[0], ctx).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secure_ctx() -> RenderContext {
        RenderContext::new("www.example.org")
            .https()
            .secure_channel("/secure-section")
    }

    #[test]
    fn links_outside_the_channel_become_absolute_http() {
        let html = r#"<a href="/other-section/page.htm">Other</a>"#;
        assert_eq!(
            SecureChannelRule.rewrite(html, &secure_ctx()),
            r#"<a href="http://www.example.org/other-section/page.htm">Other</a>"#
        );
    }

    #[test]
    fn links_inside_the_channel_stay_relative() {
        let html = concat!(
            r#"<a href="/secure-section/page.htm">In</a>"#,
            r#"<a href="/secure-section">Root</a>"#,
            r#"<a href="/Secure-Section?x=1">Query</a>"#,
        );
        assert_eq!(SecureChannelRule.rewrite(html, &secure_ctx()), html);
    }

    #[test]
    fn sibling_path_sharing_a_prefix_is_outside() {
        let html = r#"<a href="/secure-section-old/a.htm">Old</a>"#;
        assert_eq!(
            SecureChannelRule.rewrite(html, &secure_ctx()),
            r#"<a href="http://www.example.org/secure-section-old/a.htm">Old</a>"#
        );
    }

    #[test]
    fn absolute_and_protocol_relative_links_untouched() {
        let html = concat!(
            r#"<a href="https://elsewhere.org/x">A</a>"#,
            r#"<a href="//cdn.example.org/file.pdf">B</a>"#,
            r#"<a href="page.htm">C</a>"#,
            r##"<a href="#top">D</a>"##,
        );
        assert_eq!(SecureChannelRule.rewrite(html, &secure_ctx()), html);
    }

    #[test]
    fn editors_get_the_marker_attribute() {
        let ctx = secure_ctx().can_edit(true);
        let html = r#"<a class="x" href="/news/">News</a>"#;
        let once = SecureChannelRule.rewrite(html, &ctx);
        assert_eq!(
            once,
            r#"<a class="x" href="http://www.example.org/news/" data-unpublished-check="off">News</a>"#
        );
        assert_eq!(SecureChannelRule.rewrite(&once, &ctx), once);
    }

    #[test]
    fn only_applies_on_secure_channels() {
        assert!(SecureChannelRule.applies(&secure_ctx()));
        assert!(!SecureChannelRule.applies(&RenderContext::new("www.example.org")));
        assert!(!SecureChannelRule.applies(&RenderContext::default().secure_channel("/s")));
    }

    #[test]
    fn root_channel_keeps_everything_relative() {
        let ctx = RenderContext::new("h").secure_channel("/");
        let html = r#"<a href="/anything">x</a>"#;
        assert_eq!(SecureChannelRule.rewrite(html, &ctx), html);
    }
}
