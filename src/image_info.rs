//! Metadata for inline images picked by a sibling image placeholder.
//!
//! The image placeholder submits its values as plain form fields. At save
//! time they are collected into an [`ImageInfo`] and stored as a one-element
//! XML fragment; at display time the fragment is parsed back.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use uuid::Uuid;

use crate::error::{Result, RichTextError};

const ELEMENT: &[u8] = b"image";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub url: String,
    pub rollover_url: Option<String>,
    /// Stable identifier derived from `url`.
    pub guid: String,
}

/// Name-based UUID of an image URL, upper-case and hyphenated.
pub fn guid_for_url(url: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_bytes())
        .to_string()
        .to_uppercase()
}

fn parse_dimension(name: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .trim_end_matches("px")
        .parse()
        .map_err(|_| RichTextError::ImageInfo(format!("{name} is not a number: {value:?}")))
}

impl ImageInfo {
    /// Image at `url` with its guid derived from the URL.
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        let url = url.into();
        Self {
            width,
            height,
            guid: guid_for_url(&url),
            url,
            rollover_url: None,
        }
    }

    /// Set the rollover image. A blank URL clears it.
    pub fn with_rollover(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.rollover_url = (!url.trim().is_empty()).then_some(url);
        self
    }

    /// Collect the fields `{prefix}src`, `{prefix}width`, `{prefix}height` and
    /// the optional `{prefix}rollover` from submitted form values.
    ///
    /// Returns `Ok(None)` when no image was chosen (empty or missing `src`).
    pub fn from_form<'a, I>(fields: I, prefix: &str) -> Result<Option<Self>>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let (mut src, mut width, mut height, mut rollover) = (None, None, None, None);
        for (key, value) in fields {
            let Some(field) = key.strip_prefix(prefix) else {
                continue;
            };
            match field {
                "src" => src = Some(value.trim()),
                "width" => width = Some(value),
                "height" => height = Some(value),
                "rollover" => rollover = Some(value.trim()),
                _ => {}
            }
        }
        let Some(src) = src.filter(|s| !s.is_empty()) else {
            return Ok(None);
        };
        let width = parse_dimension("width", width.unwrap_or("0"))?;
        let height = parse_dimension("height", height.unwrap_or("0"))?;
        let mut info = Self::new(src, width, height);
        if let Some(rollover) = rollover {
            info = info.with_rollover(rollover);
        }
        Ok(Some(info))
    }

    /// Serialize as a single self-closed `<image />` element.
    pub fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"<image src="{}" width="{}" height="{}" guid="{}""#,
            escape(self.url.as_str()),
            self.width,
            self.height,
            escape(self.guid.as_str())
        );
        if let Some(rollover) = &self.rollover_url {
            xml.push_str(&format!(r#" rollover="{}""#, escape(rollover.as_str())));
        }
        xml.push_str(" />");
        xml
    }

    /// Parse the fragment written by [`to_xml`](Self::to_xml).
    ///
    /// A missing `guid` is recomputed from the URL.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == ELEMENT => {
                    return Self::from_element(&e);
                }
                Ok(Event::Eof) => {
                    return Err(RichTextError::ImageInfo("no <image> element".to_string()));
                }
                Ok(_) => {}
                Err(e) => return Err(RichTextError::ImageInfo(e.to_string())),
            }
        }
    }

    fn from_element(e: &BytesStart<'_>) -> Result<Self> {
        let (mut src, mut width, mut height, mut rollover, mut guid) =
            (None, None, None, None, None);
        for attr in e.attributes() {
            let attr = attr.map_err(|e| RichTextError::ImageInfo(e.to_string()))?;
            let value = attr
                .unescape_value()
                .map_err(|e| RichTextError::ImageInfo(e.to_string()))?
                .into_owned();
            match attr.key.as_ref() {
                b"src" => src = Some(value),
                b"width" => width = Some(value),
                b"height" => height = Some(value),
                b"rollover" => rollover = Some(value),
                b"guid" => guid = Some(value),
                _ => {}
            }
        }
        let url = src
            .filter(|s| !s.is_empty())
            .ok_or_else(|| RichTextError::ImageInfo("image has no src".to_string()))?;
        let mut info = Self::new(
            url,
            parse_dimension("width", width.as_deref().unwrap_or("0"))?,
            parse_dimension("height", height.as_deref().unwrap_or("0"))?,
        );
        if let Some(rollover) = rollover {
            info = info.with_rollover(rollover);
        }
        if let Some(guid) = guid.filter(|g| !g.is_empty()) {
            info.guid = guid;
        }
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guid_is_stable_per_url() {
        let a = guid_for_url("/images/logo.png");
        assert_eq!(a, guid_for_url("/images/logo.png"));
        assert_ne!(a, guid_for_url("/images/other.png"));
        assert_eq!(a.len(), 36);
        assert_eq!(a, a.to_uppercase());
    }

    #[test]
    fn from_form_collects_prefixed_fields() {
        let fields = [
            ("hero_src", " /images/hero.jpg "),
            ("hero_width", "640"),
            ("hero_height", "480px"),
            ("hero_rollover", "/images/hero-over.jpg"),
            ("thumb_src", "/images/thumb.jpg"),
        ];
        let info = ImageInfo::from_form(fields, "hero_").unwrap().unwrap();
        assert_eq!(info.url, "/images/hero.jpg");
        assert_eq!((info.width, info.height), (640, 480));
        assert_eq!(info.rollover_url.as_deref(), Some("/images/hero-over.jpg"));
        assert_eq!(info.guid, guid_for_url("/images/hero.jpg"));
    }

    #[test]
    fn from_form_without_image_is_none() {
        assert_eq!(ImageInfo::from_form([("hero_src", "")], "hero_").unwrap(), None);
        assert_eq!(ImageInfo::from_form(Vec::<(&str, &str)>::new(), "hero_").unwrap(), None);
    }

    #[test]
    fn from_form_rejects_bad_numbers() {
        let fields = [("src", "/a.png"), ("width", "wide")];
        assert!(ImageInfo::from_form(fields, "").is_err());
    }

    #[test]
    fn xml_preserves_escaped_values() {
        let info = ImageInfo::new("/img.php?a=1&b=\"2\"", 10, 20).with_rollover("/over.png");
        let xml = info.to_xml();
        assert!(xml.contains("&amp;b=&quot;2&quot;"));
        assert_eq!(ImageInfo::from_xml(&xml).unwrap(), info);
    }

    #[test]
    fn from_xml_recomputes_missing_guid() {
        let info = ImageInfo::from_xml(r#"<image src="/a.png" width="1" height="2"/>"#).unwrap();
        assert_eq!(info.guid, guid_for_url("/a.png"));
        assert_eq!(info.rollover_url, None);
    }

    #[test]
    fn from_xml_errors() {
        assert!(ImageInfo::from_xml("<other/>").is_err());
        assert!(ImageInfo::from_xml(r#"<image width="1"/>"#).is_err());
        assert!(ImageInfo::from_xml(r#"<image src="/a.png" width="x"/>"#).is_err());
    }
}
