//! # epub-onenote
//!
//! Convert EPUB ebooks into OneNote pages.
//!
//! ## Features
//!
//! - Locate the package document and read the manifest and spine
//! - Inline every stylesheet of the book as `style` attributes
//! - Embed raster and SVG images as named multipart parts (or data URIs)
//! - Upload in reading order through the Microsoft Graph API, or write a dry
//!   run to a local directory
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use epub_onenote::{ConvertOptions, GraphClient, convert_archive};
//!
//! let mut client = GraphClient::new(
//!     epub_onenote::onenote::DEFAULT_ENDPOINT,
//!     "access-token",
//!     Duration::from_secs(60),
//! )
//! .unwrap();
//! let report = convert_archive("book.epub".as_ref(), &mut client, &ConvertOptions::default())
//!     .unwrap();
//! println!("{} pages uploaded", report.uploaded());
//! ```
//!
//! ## Transforming a single page
//!
//! The page pipeline works on an extracted book and needs no network access:
//!
//! ```no_run
//! use epub_onenote::epub::{PackageContext, collect_stylesheet};
//! use epub_onenote::transform::{TransformOptions, transform_page};
//!
//! let ctx = PackageContext::open("extracted-book").unwrap();
//! let manifest = ctx.read_manifest().unwrap();
//! let css = collect_stylesheet(&ctx, &manifest).unwrap();
//! for item in manifest.spine_items() {
//!     let page = transform_page(&ctx, &item.href, &css, &item.id, TransformOptions::default())
//!         .unwrap();
//!     println!("{}: {} parts", page.title, page.assets.len());
//! }
//! ```

pub mod config;
pub mod convert;
pub mod dom;
pub mod epub;
pub mod error;
pub mod onenote;
pub mod style;
pub mod transform;
pub(crate) mod util;

pub use config::{Config, Destination};
pub use convert::{
    ConversionReport, ConvertOptions, NotebookName, PageFailurePolicy, PageOutcome, PageReport,
    convert_archive, convert_directory,
};
pub use error::{Error, Result};
pub use onenote::{DirectorySink, GraphClient, NoteSink};
pub use transform::{ImageMode, TransformedPage};
