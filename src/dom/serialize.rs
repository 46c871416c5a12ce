//! Markup serialization of an [`ArenaDom`].

use html5ever::{Namespace, QualName, ns};

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId, Attribute};

/// HTML elements that never have content and are written self-closed.
pub(super) const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// HTML elements whose text children are written verbatim.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript", "plaintext",
];

/// Serialize the whole document.
pub fn serialize(dom: &ArenaDom) -> String {
    let mut out = String::new();
    for child in dom.children(dom.document()) {
        write_node(dom, child, false, &mut out);
    }
    out
}

/// Serialize one node and its subtree.
pub fn serialize_node(dom: &ArenaDom, id: ArenaNodeId) -> String {
    let mut out = String::new();
    write_node(dom, id, false, &mut out);
    out
}

fn write_node(dom: &ArenaDom, id: ArenaNodeId, raw_text: bool, out: &mut String) {
    let Some(node) = dom.get(id) else {
        return;
    };

    match &node.data {
        ArenaNodeData::Document => {
            for child in dom.children(id) {
                write_node(dom, child, false, out);
            }
        }
        ArenaNodeData::Doctype {
            name,
            public_id,
            system_id,
        } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            if !public_id.is_empty() {
                out.push_str(" PUBLIC \"");
                out.push_str(public_id);
                out.push('"');
                if !system_id.is_empty() {
                    out.push_str(" \"");
                    out.push_str(system_id);
                    out.push('"');
                }
            } else if !system_id.is_empty() {
                out.push_str(" SYSTEM \"");
                out.push_str(system_id);
                out.push('"');
            }
            out.push('>');
        }
        ArenaNodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        ArenaNodeData::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        ArenaNodeData::Element { name, attrs, .. } => write_element(dom, id, name, attrs, out),
    }
}

fn write_element(
    dom: &ArenaDom,
    id: ArenaNodeId,
    name: &QualName,
    attrs: &[Attribute],
    out: &mut String,
) {
    let tag = name.local.as_ref();
    let is_html = name.ns == ns!(html);

    out.push('<');
    out.push_str(tag);
    for attr in attrs {
        out.push(' ');
        write_attr_name(&attr.name, out);
        out.push_str("=\"");
        escape_attr(&attr.value, out);
        out.push('"');
    }

    let has_children = dom.children(id).next().is_some();
    if (is_html && VOID_ELEMENTS.contains(&tag)) || (!is_html && !has_children) {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let raw_text = is_html && RAW_TEXT_ELEMENTS.contains(&tag);
    for child in dom.children(id) {
        write_node(dom, child, raw_text, out);
    }

    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_attr_name(name: &QualName, out: &mut String) {
    if name.prefix.is_none() && name.local.as_ref() == "xmlns" {
        out.push_str("xmlns");
        return;
    }
    let prefix = name
        .prefix
        .as_ref()
        .map(|p| p.as_ref())
        .or_else(|| implied_prefix(&name.ns));
    if let Some(prefix) = prefix {
        out.push_str(prefix);
        out.push(':');
    }
    out.push_str(name.local.as_ref());
}

/// Conventional prefix for namespaced attributes that arrive without one.
fn implied_prefix(ns: &Namespace) -> Option<&'static str> {
    if *ns == ns!(xlink) {
        Some("xlink")
    } else if *ns == ns!(xml) {
        Some("xml")
    } else if *ns == ns!(xmlns) {
        Some("xmlns")
    } else {
        None
    }
}

fn escape_text(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
