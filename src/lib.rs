//! # richtext_pipeline
//!
//! The content pipeline behind a CMS "rich HTML" editing control: the
//! ordered text-level rewrites applied to author markup before it is stored
//! and again before it is shown to visitors.
//!
//! ## Overview
//!
//! A [`RichTextPipeline`] has two entry points:
//!
//! - [`normalize_for_storage`](RichTextPipeline::normalize_for_storage) runs
//!   tidy, paragraph and blockquote normalization, the tag allow-list, literal
//!   substitutions and sentence-case correction, then asks the
//!   [`SaveValidator`] whether the save may go ahead.
//! - [`render_for_presentation`](RichTextPipeline::render_for_presentation)
//!   runs the link rule table, media embedding and `mailto:` resolution
//!   against a per-request [`RenderContext`].
//!
//! Every stage is a pure function of its input and never panics on
//! malformed markup; anything it cannot confidently rewrite is left as it
//! was. Systems the pipeline depends on (GUID lookup, contact form URLs,
//! attachment annotation, ...) are plugged in through the traits in
//! [`collaborators`].
//!
//! ## Quick start
//!
//! ```rust
//! use richtext_pipeline::{PipelineBuilder, RenderContext};
//!
//! let pipeline = PipelineBuilder::new()
//!     .allowed_elements(["p", "a", "strong", "em", "blockquote", "div"])
//!     .build()
//!     .unwrap();
//!
//! let saved = pipeline.normalize_for_storage(
//!     r#"<p><span>write to <a href="mailto:jane.doe@example.org">jane.doe@example.org</a></span></p>"#,
//! );
//! assert!(saved.accepted);
//!
//! let ctx = RenderContext::new("www.example.org");
//! let html = pipeline.render_for_presentation(&saved.markup, &ctx);
//! assert!(html.starts_with(r#"<p>Write to <a href="http://www.example.org/contact-us/email.htm?e="#));
//! ```
//!
//! ## Feature flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `image-info` | **yes** | Enables [`ImageInfo`] and its XML form (`quick-xml`, `uuid`). |

pub mod collaborators;
pub mod config;
pub mod context;
pub mod email;
pub mod error;
#[cfg(feature = "image-info")]
pub mod image_info;
pub mod links;
mod markup;
pub mod media;
pub mod pipeline;
pub mod stage;

pub use collaborators::{
    AcceptAll, ContactFormUrlBuilder, GuidResolver, Identity, MarkupTransform, MediaEmbedder,
    NoGuidResolver, NoMediaEmbedder, ResolvedTarget, SaveValidator, TargetKind,
};
pub use config::PipelineBuilder;
pub use context::RenderContext;
pub use email::{ContactForm, EmailLinkMatch, EmailResolver, derive_display_name, find_email_links};
pub use error::{Result, RichTextError};
#[cfg(feature = "image-info")]
pub use image_info::ImageInfo;
pub use links::{
    CalendarRule, DelegateRule, LinkRewriter, LinkRule, SecureChannelRule, SocialHostRule,
    UnpublishedTargetRule,
};
pub use media::{KnownHostEmbedder, MediaStage};
pub use pipeline::{RichTextPipeline, SaveOutcome};
pub use stage::{
    AllowList, AllowedElementSet, BlankLineParagraphs, BlockquoteNormalizer,
    LiteralSubstitutions, ScraperTidy, SentenceCase, StageChain,
};
