use regex::Captures;

use super::LinkRule;
use crate::context::RenderContext;
use crate::markup::{self, ANCHOR_OPEN};

/// `(class, hosts)` pairs. A host also matches its subdomains.
const SOCIAL_HOSTS: &[(&str, &[&str])] = &[
    ("twitter", &["twitter.com", "x.com", "t.co"]),
    ("facebook", &["facebook.com", "fb.com", "fb.me"]),
    ("youtube", &["youtube.com", "youtu.be"]),
    ("flickr", &["flickr.com", "flic.kr"]),
];

/// Adds a CSS class naming the social network to anchors pointing at it, so
/// the stylesheet can show the network's icon.
#[derive(Clone, Copy, Debug, Default)]
pub struct SocialHostRule;

/// Class for a link target, if it is on a known social network.
pub(crate) fn social_class(href: &str) -> Option<&'static str> {
    let host = markup::host_of(href.trim())?;
    SOCIAL_HOSTS
        .iter()
        .find(|(_, hosts)| hosts.iter().any(|domain| markup::host_matches(&host, domain)))
        .map(|(class, _)| *class)
}

impl LinkRule for SocialHostRule {
    fn name(&self) -> &'static str {
        "social-host"
    }

    fn rewrite(&self, markup: &str, _ctx: &RenderContext) -> String {
        ANCHOR_OPEN
            .replace_all(markup, |caps: &Captures<'_>| {
                let tag = &caps[0];
                match markup::href(tag).and_then(|href| social_class(href.value)) {
                    Some(class) => markup::add_class(tag, class).into_owned(),
                    None => tag.to_string(),
                }
            })
            .into_owned()
    }
}
