//! Traits for the external systems the pipeline delegates to.
//!
//! Every collaborator has a no-op default so a pipeline can be built with
//! only the pieces a deployment actually has. All implementations must be
//! `Send + Sync` because one built pipeline serves many request threads.

use crate::error::{RichTextError, Result};

/// A pure `markup -> markup` transformation supplied by the host system.
///
/// Used for the paragraph formatter, the XHTML tidy step, the library/proxy
/// link rewriter, and the attachment annotator. Any
/// `Fn(&str) -> String + Send + Sync` closure implements it.
///
/// ```
/// use richtext_pipeline::MarkupTransform;
///
/// let upper = |s: &str| s.to_uppercase();
/// assert_eq!(upper.transform("<p>a</p>"), "<P>A</P>");
/// ```
pub trait MarkupTransform: Send + Sync {
    fn transform(&self, markup: &str) -> String;
}

impl<F> MarkupTransform for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn transform(&self, markup: &str) -> String {
        self(markup)
    }
}

/// Returns its input unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl MarkupTransform for Identity {
    fn transform(&self, markup: &str) -> String {
        markup.to_string()
    }
}

/// What a content GUID points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetKind {
    Page,
    Section,
    /// Resources, galleries and anything else that has no canonical page URL.
    Other,
}

/// A content item found by [`GuidResolver::resolve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub kind: TargetKind,
    pub url: String,
}

impl ResolvedTarget {
    /// A page with canonical URL `url`.
    pub fn page(url: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Page,
            url: url.into(),
        }
    }

    /// A section (channel) with canonical URL `url`.
    pub fn section(url: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Section,
            url: url.into(),
        }
    }
}

/// Looks up a content item by its identifier in the content repository.
pub trait GuidResolver: Send + Sync {
    /// Resolve `guid` (without braces or extension).
    ///
    /// `Ok(None)` means the item does not exist or is not visible.
    fn resolve(&self, guid: &str) -> Result<Option<ResolvedTarget>>;
}

/// Resolver that never finds anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoGuidResolver;

impl GuidResolver for NoGuidResolver {
    fn resolve(&self, _guid: &str) -> Result<Option<ResolvedTarget>> {
        Ok(None)
    }
}

/// Recognizes links to known video or photo-set hosts and replaces them with
/// embed markup of the requested size.
pub trait MediaEmbedder: Send + Sync {
    fn embed(&self, markup: &str, width: u32, height: u32) -> String;
}

/// Embedder that recognizes nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMediaEmbedder;

impl MediaEmbedder for NoMediaEmbedder {
    fn embed(&self, markup: &str, _width: u32, _height: u32) -> String {
        markup.to_string()
    }
}

/// Builds the URL of the site contact form that replaces a `mailto:` link.
pub trait ContactFormUrlBuilder: Send + Sync {
    /// `request_origin` is `scheme://host` of the current request.
    fn build_url(&self, email: &str, display_name: &str, request_origin: &str) -> Result<String>;
}

/// Decides whether the form surrounding the control may be saved.
pub trait SaveValidator: Send + Sync {
    /// Return `Err` with a human-readable reason to reject the save.
    fn validate(&self, markup: &str) -> std::result::Result<(), String>;
}

/// Validator that accepts everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl SaveValidator for AcceptAll {
    fn validate(&self, _markup: &str) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Loose `local@domain.tld` shape check used before handing an address to a
/// contact-form builder.
pub(crate) fn check_email(email: &str) -> Result<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
                && !domain.contains('@')
                && !email.contains(['<', '>', '"', '\''])
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(RichTextError::InvalidEmail(email.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_transforms() {
        let t = |s: &str| s.replace("a", "b");
        assert_eq!(t.transform("aaa"), "bbb");
    }

    #[test]
    fn identity_returns_input() {
        assert_eq!(Identity.transform("<p>x</p>"), "<p>x</p>");
    }

    #[test]
    fn no_resolver_finds_nothing() {
        assert_eq!(
            NoGuidResolver
                .resolve("6F9619FF-8B86-D011-B42D-00C04FC964FF")
                .unwrap(),
            None
        );
    }

    #[test]
    fn email_shape_check() {
        assert!(check_email("jane.doe@example.org").is_ok());
        assert!(check_email("info@example.co.uk").is_ok());
        assert!(check_email("nobody").is_err());
        assert!(check_email("@example.org").is_err());
        assert!(check_email("a@b").is_err());
        assert!(check_email("a b@example.org").is_err());
        assert!(check_email("a@b@example.org").is_err());
        assert!(check_email("x\"@example.org").is_err());
    }
}
