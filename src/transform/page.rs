//! Per-page pipeline: load, strip links, inline styles, rewrite images,
//! serialize.

use std::collections::BTreeMap;

use tracing::debug;

use super::images::{EmbeddedAsset, ImageMode, rewrite_images};
use super::links::strip_link_tags;
use crate::dom::{document_title, is_xhtml, parse_html, parse_xhtml, serialize};
use crate::epub::PackageContext;
use crate::error::Result;
use crate::style::inline_styles;
use crate::util::strip_xml_declaration;

/// Options for [`transform_page`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions {
    pub image_mode: ImageMode,
}

/// A page ready for upload.
#[derive(Debug, Clone)]
pub struct TransformedPage {
    pub title: String,
    pub html: String,
    /// Binary parts keyed by part name.
    pub assets: BTreeMap<String, EmbeddedAsset>,
}

/// Transform already-loaded page markup.
///
/// `fallback_title` is used when the page has no non-empty `<title>`.
pub fn transform_markup(
    ctx: &PackageContext,
    markup: &str,
    css: &str,
    fallback_title: &str,
    options: TransformOptions,
) -> Result<TransformedPage> {
    let xhtml = is_xhtml(markup);
    let markup = strip_link_tags(strip_xml_declaration(markup));

    let mut dom = if xhtml {
        parse_xhtml(&markup)
    } else {
        parse_html(&markup)
    };
    let styled = inline_styles(&mut dom, css);
    let assets = rewrite_images(&mut dom, ctx, options.image_mode)?;

    let title = document_title(&dom).unwrap_or_else(|| fallback_title.to_string());
    let html = serialize(&dom);
    debug!(%title, styled, assets = assets.len(), bytes = html.len(), "transformed page");

    Ok(TransformedPage {
        title,
        html,
        assets,
    })
}

/// Load the page at `href` (relative to the package directory) and transform it.
pub fn transform_page(
    ctx: &PackageContext,
    href: &str,
    css: &str,
    fallback_title: &str,
    options: TransformOptions,
) -> Result<TransformedPage> {
    let markup = ctx.read_text(href)?;
    transform_markup(ctx, &markup, css, fallback_title, options)
}
