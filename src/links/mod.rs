//! Display-time link rewriting.
//!
//! A [`LinkRewriter`] is a fixed, ordered table of [`LinkRule`]s. Every rule
//! is an independent pattern-match-and-replace over the whole document that
//! only touches anchors with its own signature, so rules never fight over the
//! same link and re-running the table changes nothing.

mod calendar;
mod delegate;
mod secure;
mod social;
mod unpublished;

pub use calendar::CalendarRule;
pub use delegate::DelegateRule;
pub use secure::SecureChannelRule;
pub use social::SocialHostRule;
pub use unpublished::UnpublishedTargetRule;

use crate::context::RenderContext;

/// One rewrite rule in the link table.
pub trait LinkRule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether the rule runs at all for this request.
    fn applies(&self, _ctx: &RenderContext) -> bool {
        true
    }

    /// Rewrite every link the rule recognizes.
    fn rewrite(&self, markup: &str, ctx: &RenderContext) -> String;
}

/// Runs [`LinkRule`]s in insertion order.
#[derive(Default)]
pub struct LinkRewriter {
    rules: Vec<Box<dyn LinkRule>>,
}

impl LinkRewriter {
    /// Create an empty rule table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule to the end of the table.
    pub fn add(&mut self, rule: impl LinkRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    /// Run every rule that applies to `ctx`, in order.
    pub fn rewrite(&self, markup: &str, ctx: &RenderContext) -> String {
        self.rules.iter().fold(markup.to_string(), |acc, rule| {
            if !rule.applies(ctx) {
                return acc;
            }
            let next = rule.rewrite(&acc, ctx);
            if next != acc {
                tracing::debug!("Link rule {} rewrote markup", rule.name());
            }
            next
        })
    }

    /// Rule names in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Returns `true` if no rules have been added.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
