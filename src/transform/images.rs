//! Image reference discovery and rewriting.
//!
//! Raster images (`<img src>`) and vector images (`<image href>` /
//! `<image xlink:href>`) are found by local name, whatever their namespace.
//! Each reference is rewritten either to a `name:{block}` part reference or
//! to a `data:` URI.

use std::collections::BTreeMap;

use base64::Engine;
use tracing::{debug, warn};

use crate::dom::{ArenaDom, ArenaNodeId};
use crate::epub::PackageContext;
use crate::error::Result;

/// URI scheme used by the note service for multipart part references.
pub const PART_SCHEME: &str = "name:";

/// How rewritten images reach the note service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageMode {
    /// Reference a named multipart part (`name:{block}`).
    #[default]
    Parts,
    /// Embed the bytes as a base64 `data:` URI.
    DataUri,
}

/// Binary part uploaded alongside a page.
#[derive(Clone, PartialEq, Eq)]
pub struct EmbeddedAsset {
    /// Part name, also the `name:` reference used in the markup.
    pub name: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl std::fmt::Debug for EmbeddedAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddedAsset")
            .field("name", &self.name)
            .field("bytes", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// A reference to an image file held by one attribute of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRef {
    /// `<img src>`.
    Raster { node: ArenaNodeId, attr: usize },
    /// One `href` attribute (any prefix) of an `<image>`.
    Vector { node: ArenaNodeId, attr: usize },
}

impl ImageRef {
    /// All image references in document order.
    ///
    /// Every href-like attribute of a vector image yields its own reference.
    pub fn find_all(dom: &ArenaDom) -> Vec<ImageRef> {
        let mut refs = Vec::new();
        for node in dom.descendants() {
            match dom.element_name(node).map(|n| n.as_ref()) {
                Some("img") => {
                    if let Some(attr) = dom
                        .attrs(node)
                        .iter()
                        .position(|a| a.name.ns.is_empty() && a.name.local.as_ref() == "src")
                    {
                        refs.push(ImageRef::Raster { node, attr });
                    }
                }
                Some("image") => {
                    refs.extend(
                        dom.attrs(node)
                            .iter()
                            .enumerate()
                            .filter(|(_, a)| a.name.local.as_ref() == "href")
                            .map(|(attr, _)| ImageRef::Vector { node, attr }),
                    );
                }
                _ => {}
            }
        }
        refs
    }

    fn location(&self) -> (ArenaNodeId, usize) {
        match *self {
            ImageRef::Raster { node, attr } | ImageRef::Vector { node, attr } => (node, attr),
        }
    }

    pub fn node(&self) -> ArenaNodeId {
        self.location().0
    }

    /// Current attribute value.
    pub fn value<'a>(&self, dom: &'a ArenaDom) -> Option<&'a str> {
        let (node, attr) = self.location();
        dom.attrs(node).get(attr).map(|a| a.value.as_str())
    }

    pub fn set_value(&self, dom: &mut ArenaDom, value: String) {
        let (node, attr) = self.location();
        dom.set_attr_at(node, attr, value);
    }
}

/// Values that are not package files and are left alone.
///
/// Covers already-rewritten part references, so rewriting is idempotent.
pub fn is_external(value: &str) -> bool {
    let value = value.trim();
    value.is_empty()
        || value.starts_with(PART_SCHEME)
        || value.starts_with("data:")
        || value.starts_with('#')
        || value.contains("://")
}

/// Normalize an image path relative to the package directory.
///
/// Any `#fragment` or `?query` is dropped, then exactly one leading `../` is
/// removed; deeper nesting is left as is.
pub fn normalize_image_path(src: &str) -> &str {
    let path = src.split(['#', '?']).next().unwrap_or(src);
    let normalized = path.strip_prefix("../").unwrap_or(path);
    if normalized.starts_with("../") {
        warn!(src, "image path climbs more than one directory");
    }
    normalized
}

/// Part name for a normalized image path: `/` becomes `_`.
pub fn block_name(normalized: &str) -> String {
    normalized.replace('/', "_")
}

/// `image/{extension}` with the extension lower-cased.
pub fn content_type(normalized: &str) -> String {
    let file_name = normalized.rsplit('/').next().unwrap_or(normalized);
    match file_name.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() => format!("image/{}", ext.to_ascii_lowercase()),
        _ => "application/octet-stream".to_string(),
    }
}

/// Rewrite every image reference in `dom`.
///
/// In [`ImageMode::Parts`] the returned map holds one asset per distinct part
/// name; in [`ImageMode::DataUri`] it is empty. A missing image file fails
/// the whole call with [`crate::Error::AssetNotFound`].
pub fn rewrite_images(
    dom: &mut ArenaDom,
    ctx: &PackageContext,
    mode: ImageMode,
) -> Result<BTreeMap<String, EmbeddedAsset>> {
    let mut assets = BTreeMap::new();

    for image in ImageRef::find_all(dom) {
        let Some(src) = image.value(dom).filter(|v| !is_external(v)) else {
            continue;
        };
        let normalized = normalize_image_path(src.trim()).to_string();
        let name = block_name(&normalized);
        let content_type = content_type(&normalized);

        let rewritten = match mode {
            ImageMode::Parts => {
                if !assets.contains_key(&name) {
                    let bytes = ctx.read_bytes(&normalized)?;
                    debug!(part = %name, bytes = bytes.len(), "embedded image");
                    assets.insert(
                        name.clone(),
                        EmbeddedAsset {
                            name: name.clone(),
                            bytes,
                            content_type,
                        },
                    );
                }
                format!("{PART_SCHEME}{name}")
            }
            ImageMode::DataUri => {
                let bytes = ctx.read_bytes(&normalized)?;
                debug!(src = %normalized, bytes = bytes.len(), "inlined image");
                format!(
                    "data:{content_type};base64,{}",
                    base64::engine::general_purpose::STANDARD.encode(&bytes)
                )
            }
        };
        image.set_value(dom, rewritten);
    }

    Ok(assets)
}
