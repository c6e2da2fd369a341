//! Error types for the `richtext_pipeline` crate.

/// All errors that can occur while configuring the pipeline or calling one of
/// its collaborators.
///
/// None of these ever escape a transformation call: stages log them and leave
/// the affected markup unchanged.
#[derive(Debug, thiserror::Error)]
pub enum RichTextError {
    /// The GUID resolver failed to look up a content item.
    #[error("GUID resolution failed: {0}")]
    Resolver(Box<dyn std::error::Error + Send + Sync>),

    /// The contact-form URL builder could not produce a URL.
    #[error("Contact form URL error: {0}")]
    ContactForm(String),

    /// A decoded `mailto:` target is not a usable email address.
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Image metadata could not be built or parsed.
    #[error("Image info error: {0}")]
    ImageInfo(String),

    /// The builder configuration is invalid.
    #[error("Config error: {0}")]
    Config(String),
}

/// A type alias for `Result<T, RichTextError>`.
pub type Result<T> = std::result::Result<T, RichTextError>;
