use super::LinkRule;
use crate::collaborators::MarkupTransform;
use crate::context::RenderContext;

/// Link rule backed by a host-supplied [`MarkupTransform`]: the library/proxy
/// link rewriter and the attachment size annotator.
pub struct DelegateRule {
    name: &'static str,
    inner: Box<dyn MarkupTransform>,
}

impl DelegateRule {
    /// Rule named `name` that hands the document to `inner`.
    pub fn new(name: &'static str, inner: impl MarkupTransform + 'static) -> Self {
        Self::from_boxed(name, Box::new(inner))
    }

    /// Like [`new`](Self::new), for a transform that is already boxed.
    pub fn from_boxed(name: &'static str, inner: Box<dyn MarkupTransform>) -> Self {
        Self { name, inner }
    }
}

impl LinkRule for DelegateRule {
    fn name(&self) -> &'static str {
        self.name
    }

    fn rewrite(&self, markup: &str, _ctx: &RenderContext) -> String {
        self.inner.transform(markup)
    }
}
