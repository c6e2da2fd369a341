//! Builder for configuring a [`RichTextPipeline`].

use crate::collaborators::{
    AcceptAll, ContactFormUrlBuilder, GuidResolver, Identity, MarkupTransform, MediaEmbedder,
    NoGuidResolver, NoMediaEmbedder, SaveValidator,
};
use crate::email::{ContactForm, EmailResolver};
use crate::error::{Result, RichTextError};
use crate::links::{
    CalendarRule, DelegateRule, LinkRewriter, SecureChannelRule, SocialHostRule,
    UnpublishedTargetRule,
};
use crate::media::MediaStage;
use crate::pipeline::RichTextPipeline;
use crate::stage::{
    AllowList, AllowedElementSet, BlankLineParagraphs, BlockquoteNormalizer,
    LiteralSubstitutions, SentenceCase, StageChain,
};

/// Builder for configuring a [`RichTextPipeline`], one per rich-text control.
///
/// Provides a fluent API for the allowed elements, paragraph wrapping,
/// literal substitutions, embed size, and every external collaborator. The
/// order in which stages and link rules run is fixed by [`build`](Self::build)
/// and cannot be changed here.
///
/// # Example
///
/// ```
/// use richtext_pipeline::{ContactForm, PipelineBuilder, KnownHostEmbedder, ScraperTidy};
///
/// let pipeline = PipelineBuilder::new()
///     .allowed_elements(["p", "a", "strong", "em", "blockquote", "div", "br"])
///     .wrap_in_paragraphs(true)
///     .tidy(ScraperTidy)
///     .media_embedder(KnownHostEmbedder)
///     .embed_size(480, 270)
///     .contact_form(ContactForm::new("/contact/").unwrap())
///     .build()
///     .unwrap();
/// # let _ = pipeline;
/// ```
pub struct PipelineBuilder {
    allowed: AllowedElementSet,
    wrap_in_paragraphs: bool,
    paragraph_formatter: Box<dyn MarkupTransform>,
    tidy: Box<dyn MarkupTransform>,
    substitutions: LiteralSubstitutions,
    validator: Box<dyn SaveValidator>,
    guid_resolver: Box<dyn GuidResolver>,
    library_rewriter: Box<dyn MarkupTransform>,
    attachment_annotator: Box<dyn MarkupTransform>,
    media_embedder: Box<dyn MediaEmbedder>,
    embed_width: u32,
    embed_height: u32,
    contact_form: Box<dyn ContactFormUrlBuilder>,
}

impl PipelineBuilder {
    /// Create a new builder with sensible defaults.
    ///
    /// Defaults: no allow-list filtering, no paragraph wrapping, no tidy,
    /// compliance substitutions, 425x344 embeds, the default contact form,
    /// and no-op collaborators everywhere else.
    pub fn new() -> Self {
        Self {
            allowed: AllowedElementSet::new(),
            wrap_in_paragraphs: false,
            paragraph_formatter: Box::new(BlankLineParagraphs),
            tidy: Box::new(Identity),
            substitutions: LiteralSubstitutions::default(),
            validator: Box::new(AcceptAll),
            guid_resolver: Box::new(NoGuidResolver),
            library_rewriter: Box::new(Identity),
            attachment_annotator: Box::new(Identity),
            media_embedder: Box::new(NoMediaEmbedder),
            embed_width: 425,
            embed_height: 344,
            contact_form: Box::new(ContactForm::default()),
        }
    }

    /// Tag names kept by the allow-list filter. An empty list disables filtering.
    pub fn allowed_elements<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed = names.into_iter().collect();
        self
    }

    /// Wrap loose text runs in paragraphs before storage.
    pub fn wrap_in_paragraphs(mut self, wrap: bool) -> Self {
        self.wrap_in_paragraphs = wrap;
        self
    }

    /// Replace the default [`BlankLineParagraphs`] formatter.
    pub fn paragraph_formatter(mut self, formatter: impl MarkupTransform + 'static) -> Self {
        self.paragraph_formatter = Box::new(formatter);
        self
    }

    /// XHTML cleanup run first on submitted markup.
    pub fn tidy(mut self, tidy: impl MarkupTransform + 'static) -> Self {
        self.tidy = Box::new(tidy);
        self
    }

    /// Replace the literal substitutions, given as `(needle, replacement)` pairs.
    pub fn substitutions(mut self, rules: Vec<(&str, &str)>) -> Self {
        self.substitutions = LiteralSubstitutions::new(rules);
        self
    }

    /// Append one literal substitution after the configured ones.
    pub fn add_substitution(mut self, needle: &str, replacement: &str) -> Self {
        self.substitutions.push(needle, replacement);
        self
    }

    /// Validator deciding whether a normalized save may be persisted.
    pub fn save_validator(mut self, validator: impl SaveValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    /// Content lookup used for `GUID.htm` links in unpublished preview.
    pub fn guid_resolver(mut self, resolver: impl GuidResolver + 'static) -> Self {
        self.guid_resolver = Box::new(resolver);
        self
    }

    /// Rewriter for links to the library proxy.
    pub fn library_rewriter(mut self, rewriter: impl MarkupTransform + 'static) -> Self {
        self.library_rewriter = Box::new(rewriter);
        self
    }

    /// Annotator that appends file type and size after attachment links.
    pub fn attachment_annotator(mut self, annotator: impl MarkupTransform + 'static) -> Self {
        self.attachment_annotator = Box::new(annotator);
        self
    }

    /// Embedder that turns video and photo-set links into frames.
    pub fn media_embedder(mut self, embedder: impl MediaEmbedder + 'static) -> Self {
        self.media_embedder = Box::new(embedder);
        self
    }

    /// Frame size passed to the media embedder.
    pub fn embed_size(mut self, width: u32, height: u32) -> Self {
        self.embed_width = width;
        self.embed_height = height;
        self
    }

    /// Builder for the contact form URLs that replace `mailto:` links.
    pub fn contact_form(mut self, builder: impl ContactFormUrlBuilder + 'static) -> Self {
        self.contact_form = Box::new(builder);
        self
    }

    /// Validate the configuration and assemble the pipeline.
    ///
    /// Save-time stages run as tidy, paragraphs (if enabled), blockquotes,
    /// allow-list, substitutions, sentence case. Link rules run as secure
    /// channel, unpublished targets, library, calendar, social hosts,
    /// attachments.
    pub fn build(self) -> Result<RichTextPipeline> {
        if self.embed_width == 0 || self.embed_height == 0 {
            return Err(RichTextError::Config(format!(
                "embed size must be non-zero, got {}x{}",
                self.embed_width, self.embed_height
            )));
        }

        let mut save_stages = StageChain::new();
        save_stages.add_boxed("tidy", self.tidy);
        if self.wrap_in_paragraphs {
            save_stages.add_boxed("paragraphs", self.paragraph_formatter);
        }
        save_stages.add("blockquotes", BlockquoteNormalizer);
        if self.allowed.is_empty() {
            tracing::debug!("No allowed elements configured, tag filtering disabled");
        }
        save_stages.add("allow-list", AllowList::new(self.allowed));
        save_stages.add("substitutions", self.substitutions);
        save_stages.add("sentence-case", SentenceCase);

        let mut links = LinkRewriter::new();
        links.add(SecureChannelRule);
        links.add(UnpublishedTargetRule::from_boxed(self.guid_resolver));
        links.add(DelegateRule::from_boxed("library", self.library_rewriter));
        links.add(CalendarRule);
        links.add(SocialHostRule);
        links.add(DelegateRule::from_boxed("attachments", self.attachment_annotator));

        Ok(RichTextPipeline::new(
            save_stages,
            self.validator,
            links,
            MediaStage::new(self.media_embedder, self.embed_width, self.embed_height),
            EmailResolver::from_boxed(self.contact_form),
        ))
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stage_order() {
        let pipeline = PipelineBuilder::new().build().unwrap();
        assert_eq!(
            pipeline.save_stage_names(),
            vec!["tidy", "blockquotes", "allow-list", "substitutions", "sentence-case"]
        );
        assert_eq!(
            pipeline.link_rule_names(),
            vec![
                "secure-channel",
                "unpublished-target",
                "library",
                "calendar",
                "social-host",
                "attachments"
            ]
        );
    }

    #[test]
    fn paragraph_stage_only_when_wrapping() {
        let pipeline = PipelineBuilder::new().wrap_in_paragraphs(true).build().unwrap();
        assert_eq!(pipeline.save_stage_names()[1], "paragraphs");
    }

    #[test]
    fn zero_embed_size_is_rejected() {
        let err = PipelineBuilder::new().embed_size(0, 300).build().err().unwrap();
        assert!(matches!(err, RichTextError::Config(_)));
    }

    #[test]
    fn substitutions_can_be_replaced_and_extended() {
        let pipeline = PipelineBuilder::new()
            .substitutions(vec![])
            .add_substitution("(c)", "&copy;")
            .build()
            .unwrap();
        let outcome = pipeline.normalize_for_storage("<p>(c) us<br></p>");
        assert_eq!(outcome.markup, "<p>&copy; Us<br></p>");
    }
}
