//! Video and photo-set embedding.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::collaborators::MediaEmbedder;

/// A YouTube watch or short link, optionally alone in a paragraph.
/// Groups: `<p>` wrapper, video id, `</p>` wrapper.
static YOUTUBE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)(<p>\s*)?<a\s(?:[^>]*?\s)?href\s*=\s*"(?:https?:)?//(?:www\.|m\.)?(?:youtube\.com/watch\?(?:[^"]*?&(?:amp;)?)?v=|youtu\.be/)([A-Za-z0-9_-]{6,})[^"]*"[^>]*>.*?</a\s*>(\s*</p>)?"#,
    )
    .expect("YOUTUBE_LINK: hardcoded regex is valid")
});

/// A Flickr photo set (album) link, optionally alone in a paragraph.
/// Groups: `<p>` wrapper, owner, set id, `</p>` wrapper.
static FLICKR_SET_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)(<p>\s*)?<a\s(?:[^>]*?\s)?href\s*=\s*"(?:https?:)?//(?:www\.)?flickr\.com/photos/([A-Za-z0-9@_-]+)/(?:sets|albums)/([0-9]+)/?"[^>]*>.*?</a\s*>(\s*</p>)?"#,
    )
    .expect("FLICKR_SET_LINK: hardcoded regex is valid")
});

/// Display-time stage that hands the document to a [`MediaEmbedder`] with the
/// configured frame size.
pub struct MediaStage {
    embedder: Box<dyn MediaEmbedder>,
    width: u32,
    height: u32,
}

impl MediaStage {
    /// Stage embedding with `embedder` at `width` x `height`.
    pub fn new(embedder: Box<dyn MediaEmbedder>, width: u32, height: u32) -> Self {
        Self {
            embedder,
            width,
            height,
        }
    }

    /// Configured frame size as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Replace recognized media links in `markup` with embeds.
    pub fn embed(&self, markup: &str) -> String {
        self.embedder.embed(markup, self.width, self.height)
    }
}

/// Embeds YouTube videos and Flickr photo sets.
///
/// A recognized anchor is replaced by an `<iframe>`. If the anchor is the
/// only thing in its paragraph, the paragraph goes too, since an iframe is
/// not allowed inside `<p>` in XHTML.
///
/// ```
/// use richtext_pipeline::{KnownHostEmbedder, MediaEmbedder};
///
/// let html = r#"<p><a href="https://www.youtube.com/watch?v=dQw4w9WgXcQ">Watch</a></p>"#;
/// let out = KnownHostEmbedder.embed(html, 480, 270);
/// assert!(out.starts_with(r#"<div class="embed video"><iframe width="480" height="270""#));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct KnownHostEmbedder;

/// Rebuild the match with the anchor swapped for `frame`. A lone half of a
/// paragraph wrapper is kept in place.
fn replace_link(caps: &Captures<'_>, open: usize, close: usize, frame: String) -> String {
    match (caps.get(open), caps.get(close)) {
        (Some(_), Some(_)) | (None, None) => frame,
        (Some(p), None) => format!("{}{frame}", p.as_str()),
        (None, Some(p)) => format!("{frame}{}", p.as_str()),
    }
}

impl MediaEmbedder for KnownHostEmbedder {
    fn embed(&self, markup: &str, width: u32, height: u32) -> String {
        let with_videos = YOUTUBE_LINK.replace_all(markup, |caps: &Captures<'_>| {
            let frame = format!(
                r#"<div class="embed video"><iframe width="{width}" height="{height}" src="https://www.youtube.com/embed/{}" frameborder="0" allowfullscreen="allowfullscreen"></iframe></div>"#,
                &caps[2]
            );
            replace_link(caps, 1, 3, frame)
        });
        FLICKR_SET_LINK
            .replace_all(&with_videos, |caps: &Captures<'_>| {
                let frame = format!(
                    r#"<div class="embed photoset"><iframe width="{width}" height="{height}" src="https://www.flickr.com/photos/{}/sets/{}/show/" frameborder="0" allowfullscreen="allowfullscreen"></iframe></div>"#,
                    &caps[2], &caps[3]
                );
                replace_link(caps, 1, 4, frame)
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::NoMediaEmbedder;

    const FRAME: &str = r#"<div class="embed video"><iframe width="400" height="300" src="https://www.youtube.com/embed/dQw4w9WgXcQ" frameborder="0" allowfullscreen="allowfullscreen"></iframe></div>"#;

    #[test]
    fn youtube_link_in_its_own_paragraph() {
        let html = r#"<p>Intro</p><p><a href="https://www.youtube.com/watch?v=dQw4w9WgXcQ" class="youtube">Our video</a></p>"#;
        assert_eq!(
            KnownHostEmbedder.embed(html, 400, 300),
            format!("<p>Intro</p>{FRAME}")
        );
    }

    #[test]
    fn youtube_link_inside_text_keeps_the_paragraph() {
        let html = r#"<p>See <a href="http://youtu.be/dQw4w9WgXcQ">this</a></p>"#;
        assert_eq!(
            KnownHostEmbedder.embed(html, 400, 300),
            format!("<p>See {FRAME}</p>")
        );
    }

    #[test]
    fn youtube_id_after_other_parameters() {
        let html = r#"<a href="https://m.youtube.com/watch?feature=share&amp;v=dQw4w9WgXcQ&amp;t=10">v</a>"#;
        assert_eq!(KnownHostEmbedder.embed(html, 400, 300), FRAME);
    }

    #[test]
    fn flickr_sets_are_embedded() {
        let html = r#"<p><a href="https://www.flickr.com/photos/12345@N00/sets/72157600000000000/">Open day photos</a></p>"#;
        assert_eq!(
            KnownHostEmbedder.embed(html, 500, 375),
            r#"<div class="embed photoset"><iframe width="500" height="375" src="https://www.flickr.com/photos/12345@N00/sets/72157600000000000/show/" frameborder="0" allowfullscreen="allowfullscreen"></iframe></div>"#
        );
    }

    #[test]
    fn unknown_links_and_embeds_are_untouched() {
        let html = concat!(
            r#"<a href="http://example.org">Site</a>"#,
            r#"<a href="https://www.youtube.com/user/example">Channel</a>"#,
            r#"<a href="https://www.flickr.com/photos/example/">Stream</a>"#,
        );
        assert_eq!(KnownHostEmbedder.embed(html, 400, 300), html);
        assert_eq!(KnownHostEmbedder.embed(FRAME, 400, 300), FRAME);
    }

    #[test]
    fn stage_passes_configured_size() {
        let stage = MediaStage::new(Box::new(KnownHostEmbedder), 400, 300);
        assert_eq!(stage.size(), (400, 300));
        assert_eq!(stage.embed(r#"<a href="https://youtu.be/dQw4w9WgXcQ">x</a>"#), FRAME);

        let noop = MediaStage::new(Box::new(NoMediaEmbedder), 1, 1);
        assert_eq!(noop.embed("<a href=\"https://youtu.be/dQw4w9WgXcQ\">x</a>"), "<a href=\"https://youtu.be/dQw4w9WgXcQ\">x</a>");
    }
}
