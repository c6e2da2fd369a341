//! Save-time markup stages and the chain that runs them.
//!
//! Each stage implements [`MarkupTransform`] and is composed into a
//! [`StageChain`] that runs them sequentially.
//!
//! Built-in stages:
//!
//! - [`AllowList`] -- strips tags whose names are not allowed.
//! - [`BlockquoteNormalizer`] -- enforces the house blockquote structure.
//! - [`BlankLineParagraphs`] -- wraps loose text runs in paragraphs.
//! - [`LiteralSubstitutions`] -- fixed string replacements.
//! - [`SentenceCase`] -- capitalizes the first letter of the text.
//! - [`ScraperTidy`] -- re-serializes a fragment as XHTML.

mod allow_list;
mod blockquote;
mod paragraph;
mod sentence_case;
mod substitution;
mod tidy;

pub use allow_list::{AllowList, AllowedElementSet};
pub use blockquote::BlockquoteNormalizer;
pub use paragraph::BlankLineParagraphs;
pub use sentence_case::SentenceCase;
pub use substitution::LiteralSubstitutions;
pub use tidy::ScraperTidy;

use crate::collaborators::MarkupTransform;

/// An ordered chain of named [`MarkupTransform`] stages applied sequentially.
///
/// Each stage receives the output of the previous one. An empty chain is a
/// no-op.
pub struct StageChain {
    stages: Vec<(&'static str, Box<dyn MarkupTransform>)>,
}

impl StageChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage to the end of the chain.
    pub fn add(&mut self, name: &'static str, stage: impl MarkupTransform + 'static) {
        self.stages.push((name, Box::new(stage)));
    }

    /// Append an already boxed stage, e.g. a collaborator supplied to the builder.
    pub fn add_boxed(&mut self, name: &'static str, stage: Box<dyn MarkupTransform>) {
        self.stages.push((name, stage));
    }

    /// Run every stage on the given markup, returning the final result.
    pub fn run(&self, markup: &str) -> String {
        self.stages.iter().fold(markup.to_string(), |acc, (name, stage)| {
            let next = stage.transform(&acc);
            if next != acc {
                tracing::debug!("Stage {name} rewrote markup ({} -> {} bytes)", acc.len(), next.len());
            }
            next
        })
    }

    /// Names of the stages in execution order.
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|(name, _)| *name).collect()
    }

    /// Returns `true` if no stages have been added.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Default for StageChain {
    fn default() -> Self {
        Self::new()
    }
}
