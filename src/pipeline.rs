//! The two entry points: save-time normalization and display-time rendering.

use crate::collaborators::SaveValidator;
use crate::context::RenderContext;
use crate::email::EmailResolver;
use crate::links::LinkRewriter;
use crate::media::MediaStage;
use crate::stage::StageChain;

/// Result of [`RichTextPipeline::normalize_for_storage`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveOutcome {
    /// The normalized markup, whether or not the save was accepted.
    pub markup: String,
    /// `false` when the save validator rejected the surrounding form.
    pub accepted: bool,
    /// The validator's reason, if it rejected the save.
    pub rejection: Option<String>,
}

/// The rich-text content pipeline of one editing control.
///
/// Built with [`PipelineBuilder`](crate::PipelineBuilder). Holds only
/// immutable configuration, so one instance can serve concurrent requests.
///
/// # Example
///
/// ```
/// use richtext_pipeline::{PipelineBuilder, RenderContext};
///
/// let pipeline = PipelineBuilder::new()
///     .allowed_elements(["p", "a"])
///     .build()
///     .unwrap();
///
/// let saved = pipeline.normalize_for_storage("<p><font>hello</font></p>");
/// assert!(saved.accepted);
/// assert_eq!(saved.markup, "<p>Hello</p>");
///
/// let ctx = RenderContext::new("www.example.org");
/// let shown = pipeline.render_for_presentation(r#"<a href="https://twitter.com/x">Us</a>"#, &ctx);
/// assert_eq!(shown, r#"<a href="https://twitter.com/x" class="twitter">Us</a>"#);
/// ```
pub struct RichTextPipeline {
    save_stages: StageChain,
    validator: Box<dyn SaveValidator>,
    links: LinkRewriter,
    media: MediaStage,
    email: EmailResolver,
}

impl RichTextPipeline {
    pub(crate) fn new(
        save_stages: StageChain,
        validator: Box<dyn SaveValidator>,
        links: LinkRewriter,
        media: MediaStage,
        email: EmailResolver,
    ) -> Self {
        Self {
            save_stages,
            validator,
            links,
            media,
            email,
        }
    }

    /// Clean up author-submitted markup before it is persisted.
    ///
    /// The caller must not persist the markup when `accepted` is `false`.
    pub fn normalize_for_storage(&self, markup: &str) -> SaveOutcome {
        let markup = self.save_stages.run(markup);
        match self.validator.validate(&markup) {
            Ok(()) => SaveOutcome {
                markup,
                accepted: true,
                rejection: None,
            },
            Err(reason) => {
                tracing::info!("Save rejected by validator: {reason}");
                SaveOutcome {
                    markup,
                    accepted: false,
                    rejection: Some(reason),
                }
            }
        }
    }

    /// Prepare stored markup for a page response.
    ///
    /// Link rules run first, then media embedding, then email resolution.
    /// The stored markup is never modified; running this on its own output
    /// with the same context changes nothing.
    pub fn render_for_presentation(&self, markup: &str, ctx: &RenderContext) -> String {
        let linked = self.links.rewrite(markup, ctx);
        let embedded = self.media.embed(&linked);
        self.email.resolve(&embedded, ctx)
    }

    /// Save-time stage names in execution order.
    pub fn save_stage_names(&self) -> Vec<&'static str> {
        self.save_stages.names()
    }

    /// Link rule names in execution order.
    pub fn link_rule_names(&self) -> Vec<&'static str> {
        self.links.names()
    }
}

#[cfg(test)]
mod tests {
    use crate::PipelineBuilder;
    use crate::context::RenderContext;

    struct RejectEmpty;

    impl crate::SaveValidator for RejectEmpty {
        fn validate(&self, markup: &str) -> Result<(), String> {
            if markup.trim().is_empty() {
                Err("content is required".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn validator_rejection_is_reported() {
        let pipeline = PipelineBuilder::new()
            .allowed_elements(["p"])
            .save_validator(RejectEmpty)
            .build()
            .unwrap();
        let outcome = pipeline.normalize_for_storage("<font> </font>");
        assert!(!outcome.accepted);
        assert_eq!(outcome.markup, " ");
        assert_eq!(outcome.rejection.as_deref(), Some("content is required"));

        let outcome = pipeline.normalize_for_storage("<p>ok</p>");
        assert!(outcome.accepted);
        assert_eq!(outcome.rejection, None);
    }

    #[test]
    fn display_order_embeds_before_email_resolution() {
        let pipeline = PipelineBuilder::new()
            .media_embedder(crate::KnownHostEmbedder)
            .embed_size(400, 300)
            .build()
            .unwrap();
        let ctx = RenderContext::new("www.example.org");
        let html = r#"<p><a href="https://youtu.be/dQw4w9WgXcQ">clip</a></p><p><a href="mailto:info@example.org">info@example.org</a></p>"#;
        let out = pipeline.render_for_presentation(html, &ctx);
        assert!(out.starts_with(r#"<div class="embed video"><iframe width="400" height="300""#));
        assert!(out.ends_with(r#"<p><a href="http://www.example.org/contact-us/email.htm?e=aW5mb0BleGFtcGxlLm9yZw&amp;n=Info">info@example.org</a></p>"#));
    }

    #[test]
    fn display_does_not_touch_save_stages() {
        let pipeline = PipelineBuilder::new().allowed_elements(["p"]).build().unwrap();
        let ctx = RenderContext::new("www.example.org");
        let html = "<div>lower case stays</div>";
        assert_eq!(pipeline.render_for_presentation(html, &ctx), html);
    }
}
