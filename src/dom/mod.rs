//! Page markup tree: html5ever parsing into an arena, selector matching and
//! serialization back to markup.

mod arena;
mod element_ref;
mod serialize;
mod tree_sink;
mod xhtml;

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute, ChildrenIter};
pub use element_ref::{CssLocalName, CssNamespace, CssString, ElementRef, PageSelectors};
pub use serialize::{serialize, serialize_node};
pub use tree_sink::{ArenaSink, NodeHandle};
pub use xhtml::{XHTML_NAMESPACE, expand_self_closing, is_xhtml};

/// Parse page markup into an arena DOM.
///
/// Parsing never fails: malformed markup is repaired the way a browser would.
pub fn parse_html(html: &str) -> ArenaDom {
    let sink = ArenaSink::new();
    parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}

/// Parse an XHTML page, honoring self-closing tags on non-void elements.
pub fn parse_xhtml(markup: &str) -> ArenaDom {
    parse_html(&expand_self_closing(markup))
}

/// Trimmed text of the document's first `<title>` element, if non-empty.
pub fn document_title(dom: &ArenaDom) -> Option<String> {
    let title = dom.find_by_tag("title")?;
    let text = dom.inner_text(title);
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_title() {
        let dom = parse_html("<html><head><title>\n  Chapter   One\n</title></head></html>");
        assert_eq!(document_title(&dom).as_deref(), Some("Chapter One"));

        let dom = parse_html("<html><head><title> </title></head></html>");
        assert_eq!(document_title(&dom), None);
    }

    #[test]
    fn test_empty_xhtml_title_keeps_body() {
        let dom = parse_xhtml("<html><head><title/></head><body><p>Chapter text</p></body></html>");
        assert_eq!(document_title(&dom), None);
        let p = dom.find_by_tag("p").unwrap();
        assert_eq!(dom.inner_text(p), "Chapter text");
    }

    #[test]
    fn test_self_closing_elements_do_not_wrap_siblings() {
        let dom = parse_xhtml(
            r#"<html><head><script src="a.js"/></head><body><div id="a"/><p>one</p><a id="x"/><p>two</p></body></html>"#,
        );
        let body = dom.find_by_tag("body").unwrap();
        let children: Vec<_> = dom
            .children(body)
            .filter_map(|c| dom.element_name(c).map(|n| n.as_ref().to_string()))
            .collect();
        assert_eq!(children, vec!["div", "p", "a", "p"]);
        for tag in ["div", "a", "script"] {
            let id = dom.find_by_tag(tag).unwrap();
            assert_eq!(dom.children(id).count(), 0, "{tag} should be empty");
        }
    }
}
