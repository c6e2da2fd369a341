use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{LinkRule, SecureChannelRule};
use crate::collaborators::{GuidResolver, TargetKind};
use crate::context::RenderContext;
use crate::markup::escape_attr;

/// An `href` whose whole value is `GUID.htm`. Groups: opening quote run, GUID,
/// closing quote.
static GUID_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)(\shref\s*=\s*["'])([0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})\.htm(["'])"#,
    )
    .expect("GUID_HREF: hardcoded regex is valid")
});

/// In unpublished preview, links to draft items are stored as `GUID.htm`.
/// This rule resolves the GUID and points the link at the page's or
/// section's canonical URL. Anything the resolver cannot place is left as it
/// was.
///
/// Resolved URLs are root-relative, so on a secure channel they go through
/// [`SecureChannelRule`] again before the rule returns.
pub struct UnpublishedTargetRule {
    resolver: Box<dyn GuidResolver>,
}

impl UnpublishedTargetRule {
    /// Rule resolving GUIDs through `resolver`.
    pub fn new(resolver: impl GuidResolver + 'static) -> Self {
        Self::from_boxed(Box::new(resolver))
    }

    /// Like [`new`](Self::new), for a resolver that is already boxed.
    pub fn from_boxed(resolver: Box<dyn GuidResolver>) -> Self {
        Self { resolver }
    }

    fn canonical_url(&self, guid: &str) -> Option<String> {
        match self.resolver.resolve(guid) {
            Ok(Some(target)) => match target.kind {
                TargetKind::Page | TargetKind::Section if !target.url.is_empty() => Some(target.url),
                _ => {
                    tracing::debug!("GUID {guid} resolved to a non-page target, leaving link");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to resolve GUID {guid}: {e}");
                None
            }
        }
    }
}

impl LinkRule for UnpublishedTargetRule {
    fn name(&self) -> &'static str {
        "unpublished-target"
    }

    fn applies(&self, ctx: &RenderContext) -> bool {
        ctx.unpublished_preview
    }

    fn rewrite(&self, markup: &str, ctx: &RenderContext) -> String {
        let mut resolved = 0usize;
        let out = GUID_HREF
            .replace_all(markup, |caps: &Captures<'_>| {
                let (open, close) = (&caps[1], &caps[3]);
                // A mismatched quote pair means the match spans something else.
                if !open.ends_with(close) {
                    return caps[0].to_string();
                }
                match self.canonical_url(&caps[2]) {
                    Some(url) => {
                        resolved += 1;
                        format!("{open}{}{close}", escape_attr(&url))
                    }
                    None => caps[0].to_string(),
                }
            })
            .into_owned();
        if resolved > 0 && SecureChannelRule.applies(ctx) {
            SecureChannelRule.rewrite(&out, ctx)
        } else {
            out
        }
    }
}
