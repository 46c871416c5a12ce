//! Archive extraction and path resolution for an unpacked EPUB.
//!
//! Every file the pipeline touches is resolved through [`PackageContext`],
//! which holds the extraction root and the package document's directory.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use tracing::{debug, warn};
use zip::ZipArchive;

use super::container::{CONTAINER_PATH, parse_container_xml};
use super::opf::{Manifest, parse_opf};
use crate::error::{Error, Result};
use crate::util::decode_markup;

/// Name of the EPUB mimetype marker file at the archive root.
pub const MIMETYPE_PATH: &str = "mimetype";

/// Expected content of the mimetype marker file.
pub const EPUB_MIMETYPE: &str = "application/epub+zip";

/// Unpack an EPUB (zip) archive into `dest`.
///
/// Fails with [`Error::Archive`] if the file is not a zip archive or carries a
/// mimetype marker for something other than an EPUB.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| Error::Archive(format!("not a valid zip file: {e}")))?;

    debug!(entries = archive.len(), dest = %dest.display(), "extracting archive");
    archive.extract(dest)?;

    check_mimetype(dest)
}

/// Verify the `mimetype` marker of an extracted archive.
///
/// A missing marker is tolerated (many real-world files omit it).
pub fn check_mimetype(root: &Path) -> Result<()> {
    match std::fs::read_to_string(root.join(MIMETYPE_PATH)) {
        Ok(content) if content.trim() == EPUB_MIMETYPE => Ok(()),
        Ok(content) => Err(Error::Archive(format!(
            "unexpected mimetype {:?}",
            content.trim()
        ))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(root = %root.display(), "archive has no mimetype file");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Path-resolution context for one extracted EPUB.
#[derive(Debug, Clone)]
pub struct PackageContext {
    /// Directory holding the extracted archive.
    root: PathBuf,
    /// Package document path relative to `root` (e.g. `OEBPS/content.opf`).
    package_path: String,
    /// Directory of the package document with trailing slash, or empty.
    base_dir: String,
}

impl PackageContext {
    /// Create a context for a package document at `package_path` under `root`.
    pub fn new(root: impl Into<PathBuf>, package_path: &str) -> Self {
        let package_path = package_path.trim_start_matches('/').to_string();
        let base_dir = match package_path.rfind('/') {
            Some(idx) => package_path[..=idx].to_string(),
            None => String::new(),
        };
        Self {
            root: root.into(),
            package_path,
            base_dir,
        }
    }

    /// Locate the package document of an extracted archive.
    ///
    /// Reads `META-INF/container.xml`; its absence is an [`Error::Archive`].
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let container_path = root.join(CONTAINER_PATH);
        let bytes = std::fs::read(&container_path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                Error::Archive(format!("missing container descriptor {CONTAINER_PATH}"))
            }
            _ => Error::Io(e),
        })?;

        let package_path = parse_container_xml(&bytes)?;
        debug!(package = %package_path, "located package document");
        Ok(Self::new(root, &package_path))
    }

    /// Directory holding the extracted archive.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Package document path relative to the archive root.
    pub fn package_path(&self) -> &str {
        &self.package_path
    }

    /// Package document directory relative to the archive root (`""` or `"OEBPS/"`).
    pub fn base_dir(&self) -> &str {
        &self.base_dir
    }

    /// Read and parse the package document.
    pub fn read_manifest(&self) -> Result<Manifest> {
        let path = self.root.join(&self.package_path);
        let bytes = read_file(&path)?;
        let content = decode_markup(&bytes);
        parse_opf(&content).map_err(|e| match e {
            Error::Parse(msg) => Error::Parse(format!("{}: {msg}", self.package_path)),
            other => other,
        })
    }

    /// Resolve an href relative to the package document directory.
    ///
    /// The href is percent-decoded; fragments and query strings are dropped.
    /// `..` segments are applied, and a path climbing above the archive root
    /// is an [`Error::Archive`].
    pub fn resolve_content(&self, href: &str) -> Result<PathBuf> {
        let path = href.split(['#', '?']).next().unwrap_or(href);
        let decoded = percent_decode_str(path).decode_utf8_lossy();
        let relative = format!("{}{}", self.base_dir, decoded.trim_start_matches('/'));

        let mut segments: Vec<&str> = Vec::new();
        for part in relative.split(['/', '\\']) {
            match part {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(Error::Archive(format!(
                            "{href:?} points outside the archive"
                        )));
                    }
                }
                part => segments.push(part),
            }
        }

        let mut resolved = self.root.clone();
        resolved.extend(segments);
        Ok(resolved)
    }

    /// Read the raw bytes of a content file.
    pub fn read_bytes(&self, href: &str) -> Result<Vec<u8>> {
        read_file(&self.resolve_content(href)?)
    }

    /// Read a content file as text, detecting its encoding.
    pub fn read_text(&self, href: &str) -> Result<String> {
        Ok(decode_markup(&self.read_bytes(href)?))
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::AssetNotFound(path.to_path_buf()),
        _ => Error::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    use super::*;

    #[test]
    fn test_base_dir() {
        let ctx = PackageContext::new("/tmp/book", "OEBPS/content.opf");
        assert_eq!(ctx.base_dir(), "OEBPS/");
        assert_eq!(ctx.package_path(), "OEBPS/content.opf");

        let ctx = PackageContext::new("/tmp/book", "content.opf");
        assert_eq!(ctx.base_dir(), "");
    }

    #[test]
    fn test_resolve_content() {
        let ctx = PackageContext::new("/tmp/book", "OEBPS/content.opf");
        assert_eq!(
            ctx.resolve_content("images/cover.jpg").unwrap(),
            PathBuf::from("/tmp/book/OEBPS/images/cover.jpg")
        );
        assert_eq!(
            ctx.resolve_content("text/ch%201.xhtml#top").unwrap(),
            PathBuf::from("/tmp/book/OEBPS/text/ch 1.xhtml")
        );
        assert_eq!(
            ctx.resolve_content("./style.css").unwrap(),
            PathBuf::from("/tmp/book/OEBPS/style.css")
        );
        assert_eq!(
            ctx.resolve_content("text/../images/a.png").unwrap(),
            PathBuf::from("/tmp/book/OEBPS/images/a.png")
        );
        assert_eq!(
            ctx.resolve_content("../shared/a.css").unwrap(),
            PathBuf::from("/tmp/book/shared/a.css")
        );
    }

    #[test]
    fn test_paths_above_root_are_rejected() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("book");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(dir.path().join("secret.png"), b"SECRET").unwrap();

        let ctx = PackageContext::new(&root, "OEBPS/content.opf");
        assert!(matches!(
            ctx.resolve_content("../../secret.png"),
            Err(Error::Archive(_))
        ));
        assert!(matches!(
            ctx.read_bytes("../../secret.png"),
            Err(Error::Archive(_))
        ));
        assert!(matches!(
            ctx.read_bytes("%2E%2E/%2E%2E/secret.png"),
            Err(Error::Archive(_))
        ));
    }

    #[test]
    fn test_missing_file_is_asset_not_found() {
        let dir = TempDir::new().unwrap();
        let ctx = PackageContext::new(dir.path(), "content.opf");
        match ctx.read_bytes("nope.png") {
            Err(Error::AssetNotFound(path)) => assert!(path.ends_with("nope.png")),
            other => panic!("expected AssetNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_open_without_container() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            PackageContext::open(dir.path()),
            Err(Error::Archive(_))
        ));
    }

    #[test]
    fn test_extract_rejects_non_zip() {
        let dir = TempDir::new().unwrap();
        let bogus = dir.path().join("book.epub");
        std::fs::write(&bogus, b"definitely not a zip").unwrap();

        let dest = dir.path().join("out");
        match extract_archive(&bogus, &dest) {
            Err(Error::Archive(msg)) => assert!(msg.contains("not a valid zip file")),
            other => panic!("expected Archive error, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_rejects_wrong_mimetype() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("book.epub");
        {
            let file = File::create(&path).unwrap();
            let mut zip = zip::ZipWriter::new(file);
            zip.start_file("mimetype", SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"application/zip").unwrap();
            zip.finish().unwrap();
        }

        let dest = dir.path().join("out");
        assert!(matches!(
            extract_archive(&path, &dest),
            Err(Error::Archive(_))
        ));
    }

    #[test]
    fn test_missing_mimetype_is_tolerated() {
        let dir = TempDir::new().unwrap();
        assert!(check_mimetype(dir.path()).is_ok());
    }
}
