//! Cascade resolution and style inlining.
//!
//! Each element receives a `style` attribute holding the declarations that
//! win the cascade for it: importance first, then origin (an existing
//! `style` attribute beats the sheet), then the highest specificity among
//! the rule's matching selectors, then source order.

use selectors::context::{MatchingContext, SelectorCaches};
use selectors::matching::{
    MatchingForInvalidation, MatchingMode, NeedsSelectorFlags, matches_selector,
};
use tracing::debug;

use super::declaration::{Declaration, to_style_attribute};
use super::stylesheet::{Specificity, Stylesheet, parse_style_attribute};
use crate::dom::{ArenaDom, ArenaNodeId, ElementRef};

/// Elements that are never rendered and receive no inline style.
const UNSTYLED_ELEMENTS: &[&str] = &[
    "head", "title", "meta", "link", "base", "script", "style", "noscript", "template",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Origin {
    Sheet,
    Attribute,
}

#[derive(Debug)]
struct Candidate<'a> {
    declaration: &'a Declaration,
    origin: Origin,
    specificity: Specificity,
    order: usize,
}

impl Candidate<'_> {
    fn sort_key(&self) -> (bool, Origin, Specificity, usize) {
        (
            self.declaration.important,
            self.origin,
            self.specificity,
            self.order,
        )
    }
}

/// Highest specificity among the rule's selectors that match `elem`.
fn matching_specificity(
    elem: &ElementRef<'_>,
    selectors: &[selectors::parser::Selector<crate::dom::PageSelectors>],
    caches: &mut SelectorCaches,
) -> Option<Specificity> {
    let mut context = MatchingContext::new(
        MatchingMode::Normal,
        None,
        caches,
        selectors::context::QuirksMode::NoQuirks,
        NeedsSelectorFlags::No,
        MatchingForInvalidation::No,
    );

    selectors
        .iter()
        .filter(|selector| matches_selector(selector, 0, None, elem, &mut context))
        .map(Specificity::from_selector)
        .max()
}

/// Resolve the declarations that apply to one element.
///
/// `inline` is the element's existing `style` attribute. Each property is
/// listed once, at the position it was first declared, with the winning value.
pub fn cascade(
    elem: ElementRef<'_>,
    sheet: &Stylesheet,
    inline: &[Declaration],
    caches: &mut SelectorCaches,
) -> Vec<Declaration> {
    let mut candidates = Vec::new();
    let mut order = 0;

    for rule in &sheet.rules {
        let Some(specificity) = matching_specificity(&elem, &rule.selectors, caches) else {
            continue;
        };
        for declaration in &rule.declarations {
            candidates.push(Candidate {
                declaration,
                origin: Origin::Sheet,
                specificity,
                order,
            });
            order += 1;
        }
    }

    if candidates.is_empty() {
        return Vec::new();
    }

    for declaration in inline {
        candidates.push(Candidate {
            declaration,
            origin: Origin::Attribute,
            specificity: Specificity::default(),
            order,
        });
        order += 1;
    }

    // Property positions follow declaration order; values follow the cascade.
    let mut resolved: Vec<Declaration> = Vec::new();
    let mut winners: Vec<&Candidate<'_>> = Vec::new();
    for candidate in &candidates {
        match resolved
            .iter()
            .position(|d| d.property == candidate.declaration.property)
        {
            Some(i) if candidate.sort_key() > winners[i].sort_key() => {
                resolved[i] = candidate.declaration.clone();
                winners[i] = candidate;
            }
            Some(_) => {}
            None => {
                resolved.push(candidate.declaration.clone());
                winners.push(candidate);
            }
        }
    }
    resolved
}

/// Remove every `<style>` element and return their contents in document order.
pub fn take_style_elements(dom: &mut ArenaDom) -> String {
    let mut css = String::new();
    for id in dom.elements_by_local_name("style") {
        css.push_str(&dom.inner_text(id));
        dom.detach(id);
    }
    css
}

/// Inline `css` plus the page's own `<style>` blocks into `style` attributes.
///
/// The `<style>` elements are removed. Returns the number of elements whose
/// style attribute was written.
pub fn inline_styles(dom: &mut ArenaDom, css: &str) -> usize {
    let mut sheet = Stylesheet::parse(css);
    let embedded = take_style_elements(dom);
    if !embedded.is_empty() {
        sheet.extend(Stylesheet::parse(&embedded));
    }
    if sheet.is_empty() {
        return 0;
    }

    let targets: Vec<ArenaNodeId> = dom
        .descendants()
        .into_iter()
        .filter(|&id| is_styled(dom, id))
        .collect();

    let mut caches = SelectorCaches::default();
    let mut updates = Vec::new();
    for id in targets {
        let inline = dom
            .get_attr(id, "style")
            .map(parse_style_attribute)
            .unwrap_or_default();
        let resolved = cascade(ElementRef::new(dom, id), &sheet, &inline, &mut caches);
        if !resolved.is_empty() {
            updates.push((id, to_style_attribute(&resolved)));
        }
    }

    let count = updates.len();
    for (id, style) in updates {
        dom.set_attr(id, "style", style);
    }
    debug!(rules = sheet.rules.len(), elements = count, "inlined styles");
    count
}

fn is_styled(dom: &ArenaDom, id: ArenaNodeId) -> bool {
    let Some(name) = dom.element_name(id) else {
        return false;
    };
    if UNSTYLED_ELEMENTS.contains(&name.as_ref()) {
        return false;
    }
    // Nothing under <head> is rendered.
    let mut current = dom.get(id).map(|n| n.parent);
    while let Some(parent) = current.filter(|p| p.is_some()) {
        if dom.element_name(parent).is_some_and(|n| n.as_ref() == "head") {
            return false;
        }
        current = dom.get(parent).map(|n| n.parent);
    }
    true
}
