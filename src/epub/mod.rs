//! EPUB package reading: container, manifest, stylesheets.

mod archive;
mod container;
mod opf;
mod styles;

pub use archive::{EPUB_MIMETYPE, PackageContext, check_mimetype, extract_archive};
pub use container::{CONTAINER_PATH, parse_container_xml};
pub use opf::{Manifest, ManifestItem, parse_opf};
pub use styles::{CSS_MEDIA_TYPE, collect_stylesheet, is_stylesheet};
