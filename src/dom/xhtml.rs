//! XHTML syntax the HTML tree builder does not understand.
//!
//! Package pages are XML, where `<div/>` is an empty element. The HTML5
//! tree builder ignores the slash on non-void elements and reads an open
//! tag, so `<title/>` swallows the rest of the document as title text.
//! Such tags are rewritten as explicit start and end tags before parsing.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::serialize::VOID_ELEMENTS;

/// Namespace of XHTML documents.
pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// A self-closing start tag: name, then attributes (quoted values may hold
/// `>` or `/`), then `/>`.
static SELF_CLOSING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([A-Za-z][A-Za-z0-9:._-]*)((?:\s(?:"[^"]*"|'[^']*'|[^'">])*?)?)\s*/>"#)
        .expect("self-closing tag pattern")
});

/// Whether the markup is an XML document: it opens with an XML declaration
/// or declares the XHTML namespace.
pub fn is_xhtml(markup: &str) -> bool {
    let start = markup.trim_start_matches('\u{feff}').trim_start();
    start.starts_with("<?xml") || markup.contains(XHTML_NAMESPACE)
}

/// Rewrite `<tag .../>` as `<tag ...></tag>` for every non-void element.
///
/// Void elements (`<br/>`, `<img .../>`) are left as they are.
pub fn expand_self_closing(markup: &str) -> Cow<'_, str> {
    SELF_CLOSING_RE.replace_all(markup, |caps: &Captures<'_>| {
        let name = &caps[1];
        if VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str()) {
            return caps[0].to_string();
        }
        let attrs = caps.get(2).map_or("", |m| m.as_str()).trim_end();
        format!("<{name}{attrs}></{name}>")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_xhtml() {
        assert!(is_xhtml("<?xml version=\"1.0\"?><html/>"));
        assert!(is_xhtml("\u{feff}\n<?xml version=\"1.0\"?>"));
        assert!(is_xhtml(r#"<html xmlns="http://www.w3.org/1999/xhtml"><body/></html>"#));
        assert!(!is_xhtml("<!DOCTYPE html><html><body></body></html>"));
    }

    #[test]
    fn test_expands_non_void_tags() {
        assert_eq!(expand_self_closing("<title/>"), "<title></title>");
        assert_eq!(
            expand_self_closing(r#"<div id="a"/><a id='x' />"#),
            r#"<div id="a"></div><a id='x'></a>"#
        );
        assert_eq!(
            expand_self_closing("<script\n  src=\"a.js\"\n/>"),
            "<script\n  src=\"a.js\"></script>"
        );
    }

    #[test]
    fn test_void_and_ordinary_tags_untouched() {
        let markup = r#"<p>a<br/>b<img src="x/y.png" alt="a/>b"/></p><hr />"#;
        assert_eq!(expand_self_closing(markup), markup);
        assert!(matches!(
            expand_self_closing("<p class=\"a\">plain</p>"),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn test_quoted_slash_gt_in_attribute() {
        assert_eq!(
            expand_self_closing(r#"<span title="x/>y"/>z"#),
            r#"<span title="x/>y"></span>z"#
        );
    }
}
