//! XHTML tidy built on an HTML5 parse tree.

use scraper::{Html, node::Node};

use crate::collaborators::MarkupTransform;
use crate::markup::{escape_attr, escape_text};

/// HTML5 void elements, written self-closed.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose text content is written verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Tidy step that parses the fragment with an HTML5 parser and writes it back
/// as XHTML: every element closed, void elements self-closed, attribute values
/// double-quoted, stray `<` and `&` escaped.
///
/// The parser repairs mis-nested and unclosed tags the way a browser would,
/// so the stored markup is what authors saw in the editor.
///
/// # Example
///
/// ```
/// use richtext_pipeline::{MarkupTransform, ScraperTidy};
///
/// let tidy = ScraperTidy;
/// assert_eq!(tidy.transform("<p>a<br>b"), "<p>a<br />b</p>");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ScraperTidy;

fn serialize_node(node: ego_tree::NodeRef<'_, Node>, raw_text: bool, out: &mut String) {
    match node.value() {
        Node::Document | Node::Fragment => {
            for child in node.children() {
                serialize_node(child, false, out);
            }
        }
        Node::Element(el) => {
            let tag = el.name();
            out.push('<');
            out.push_str(tag);
            for (k, v) in el.attrs() {
                out.push(' ');
                out.push_str(k);
                out.push_str("=\"");
                out.push_str(&escape_attr(v));
                out.push('"');
            }

            if VOID_ELEMENTS.contains(&tag) {
                out.push_str(" />");
                return;
            }
            out.push('>');

            let raw = RAW_TEXT_ELEMENTS.contains(&tag);
            for child in node.children() {
                serialize_node(child, raw, out);
            }

            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        Node::Text(text) => {
            if raw_text {
                out.push_str(text.as_ref());
            } else {
                out.push_str(&escape_text(text.as_ref()));
            }
        }
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(comment.as_ref());
            out.push_str("-->");
        }
        _ => {}
    }
}

impl MarkupTransform for ScraperTidy {
    fn transform(&self, markup: &str) -> String {
        if markup.trim().is_empty() {
            return markup.to_string();
        }
        let fragment = Html::parse_fragment(markup);
        let mut out = String::with_capacity(markup.len() + markup.len() / 8);
        // parse_fragment hangs the content under a synthetic <html> element.
        for child in fragment.root_element().children() {
            serialize_node(child, false, &mut out);
        }
        out
    }
}
