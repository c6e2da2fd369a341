//! The per-request environment consumed by the display-time pipeline.

/// Read-only snapshot of the request environment needed to decide how links
/// are rewritten.
///
/// One value is built per display request and passed to
/// [`RichTextPipeline::render_for_presentation`](crate::RichTextPipeline::render_for_presentation).
///
/// # Example
///
/// ```
/// use richtext_pipeline::RenderContext;
///
/// let ctx = RenderContext::new("www.example.org")
///     .https()
///     .secure_channel("/secure-section")
///     .can_edit(true);
/// assert_eq!(ctx.request_origin(), "https://www.example.org");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderContext {
    /// URL path prefix of the channel the page belongs to, e.g. `/secure-section`.
    pub channel_prefix: String,
    /// Whether the current channel requires HTTPS.
    pub secure_channel: bool,
    /// Whether draft content is being previewed.
    pub unpublished_preview: bool,
    /// `http` or `https`.
    pub request_scheme: String,
    /// Host of the current request, without scheme.
    pub request_host: String,
    /// Whether the viewer holds edit/modify rights on the page.
    pub can_edit: bool,
}

impl RenderContext {
    /// Context for a plain HTTP request to `host` on a published, insecure channel.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            request_scheme: "http".to_string(),
            request_host: host.into(),
            ..Self::default()
        }
    }

    /// Mark the request as served over HTTPS.
    pub fn https(mut self) -> Self {
        self.request_scheme = "https".to_string();
        self
    }

    /// Set the channel URL prefix without changing the security requirement.
    pub fn channel(mut self, prefix: impl Into<String>) -> Self {
        self.channel_prefix = prefix.into();
        self
    }

    /// Mark the current channel as secure with the given URL prefix.
    pub fn secure_channel(mut self, prefix: impl Into<String>) -> Self {
        self.channel_prefix = prefix.into();
        self.secure_channel = true;
        self
    }

    /// Switch the render into unpublished preview mode.
    pub fn unpublished_preview(mut self, preview: bool) -> Self {
        self.unpublished_preview = preview;
        self
    }

    /// Mark the viewer as holding edit rights on the page.
    pub fn can_edit(mut self, can_edit: bool) -> Self {
        self.can_edit = can_edit;
        self
    }

    /// `scheme://host` of the current request.
    pub fn request_origin(&self) -> String {
        let scheme = if self.request_scheme.is_empty() {
            "http"
        } else {
            self.request_scheme.as_str()
        };
        format!("{scheme}://{}", self.request_host)
    }

    /// The channel prefix without trailing slashes. Empty for the site root.
    pub(crate) fn normalized_channel_prefix(&self) -> &str {
        self.channel_prefix.trim_end_matches('/')
    }
}
