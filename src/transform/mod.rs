//! Page transformation for upload.
//!
//! - Links: `<link>` tag removal on raw markup
//! - Images: `img`/`image` reference rewriting into parts or data URIs
//! - Page: the full per-page pipeline

mod images;
mod links;
mod page;

pub use images::{
    EmbeddedAsset, ImageMode, ImageRef, PART_SCHEME, block_name, content_type, is_external,
    normalize_image_path, rewrite_images,
};
pub use links::strip_link_tags;
pub use page::{TransformOptions, TransformedPage, transform_markup, transform_page};
