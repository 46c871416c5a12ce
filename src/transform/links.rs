//! Removal of `<link>` tags from raw page markup.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// A whole `<link ...>` tag: any case, any attribute order or quoting, and
/// free to span lines. Quoted attribute values may contain `>`. The name must
/// end at whitespace, `/` or `>`, so custom elements like `<link-card>` stay.
static LINK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<link(?:[\s/](?:"[^"]*"|'[^']*'|[^'">])*)?>"#).expect("link tag pattern")
});

/// Strip every `<link>` tag from `markup`.
///
/// Stylesheet links are the target, but all links go: the note service has
/// no use for them. Text after a tag on the same line is kept.
pub fn strip_link_tags(markup: &str) -> Cow<'_, str> {
    LINK_TAG_RE.replace_all(markup, "")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_strip_stylesheet_link() {
        let html = r#"<head><link rel="stylesheet" type="text/css" href="style.css"/><title>T</title></head>"#;
        assert_eq!(strip_link_tags(html), "<head><title>T</title></head>");
    }

    #[test]
    fn test_strip_multiline_and_uppercase() {
        let html = "<head>\n<LINK\n  href=\"a.css\"\n  rel=\"stylesheet\">after\n</head>";
        assert_eq!(strip_link_tags(html), "<head>\nafter\n</head>");
    }

    #[test]
    fn test_quoted_gt_and_single_quotes() {
        let html = r#"<link title='a > b' href="x.css">kept"#;
        assert_eq!(strip_link_tags(html), "kept");
    }

    #[test]
    fn test_similar_tags_untouched() {
        let html = "<linkage>x</linkage><a href=\"#\">link</a>";
        assert_eq!(strip_link_tags(html), html);
        assert!(matches!(strip_link_tags(html), Cow::Borrowed(_)));
    }

    #[test]
    fn test_custom_elements_untouched() {
        let html = r#"<link-card href="a">card</link-card><link href="b.css"><link>"#;
        assert_eq!(
            strip_link_tags(html),
            r#"<link-card href="a">card</link-card>"#
        );
    }

    proptest! {
        #[test]
        fn no_link_tag_survives(
            before in "[a-z <>/]{0,20}",
            attrs in proptest::collection::vec(("[a-z]{1,6}", "[^\"]{0,10}"), 0..4),
            upper in any::<bool>(),
            newline in any::<bool>(),
            after in "[a-z ]{0,20}",
        ) {
            let sep = if newline { "\n" } else { " " };
            let name = if upper { "LINK" } else { "link" };
            let attr_text: String = attrs
                .iter()
                .map(|(k, v)| format!("{sep}{k}=\"{v}\""))
                .collect();
            let html = format!("{before}<{name}{attr_text}/>{after}");

            let stripped = strip_link_tags(&html);
            prop_assert!(!stripped.to_ascii_lowercase().contains("<link"));
            prop_assert!(stripped.ends_with(&after));
        }
    }
}
