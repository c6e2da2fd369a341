use regex::Captures;

use super::LinkRule;
use crate::context::RenderContext;
use crate::markup::{self, ANCHOR_OPEN};

/// Class the site stylesheet uses for "add to calendar" links.
pub const CALENDAR_CLASS: &str = "hcal";

/// Adds the `hcal` class to anchors that download an iCalendar file or use
/// the `webcal:` scheme.
#[derive(Clone, Copy, Debug, Default)]
pub struct CalendarRule;

fn is_calendar_link(href: &str) -> bool {
    let lowered = href.trim().to_ascii_lowercase();
    if lowered.starts_with("webcal:") {
        return true;
    }
    let path = lowered.split(['?', '#']).next().unwrap_or_default();
    path.ends_with(".ics") || path.ends_with(".vcs")
}

impl LinkRule for CalendarRule {
    fn name(&self) -> &'static str {
        "calendar"
    }

    fn rewrite(&self, markup: &str, _ctx: &RenderContext) -> String {
        ANCHOR_OPEN
            .replace_all(markup, |caps: &Captures<'_>| {
                let tag = &caps[0];
                match markup::href(tag) {
                    Some(href) if is_calendar_link(href.value) => {
                        markup::add_class(tag, CALENDAR_CLASS).into_owned()
                    }
                    _ => tag.to_string(),
                }
            })
            .into_owned()
    }
}
