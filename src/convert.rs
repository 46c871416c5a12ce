//! Conversion of a whole book into one notebook section.

use std::path::Path;

use tempfile::TempDir;
use tracing::{info, warn};

use crate::epub::{Manifest, ManifestItem, PackageContext, collect_stylesheet, extract_archive};
use crate::error::{Error, Result};
use crate::onenote::{NoteSink, Notebook, Page, PagePayload, Section};
use crate::transform::{ImageMode, TransformOptions, transform_page};

/// Section name used when none is given.
pub const DEFAULT_SECTION: &str = "epub";

/// What to do when a page cannot be transformed or uploaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageFailurePolicy {
    /// Stop the conversion and return the error.
    #[default]
    Abort,
    /// Record the failure and continue with the next page.
    Skip,
}

/// How the notebook is named.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NotebookName {
    /// Hex SHA-1 digest of the source file name.
    #[default]
    SourceDigest,
    /// The book's `dc:title`, falling back to the digest.
    BookTitle,
    Named(String),
}

/// Conversion settings.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub notebook: NotebookName,
    pub section: String,
    pub image_mode: ImageMode,
    pub on_page_failure: PageFailurePolicy,
    /// Extra attempts for a page after a transient failure.
    pub retries: u32,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            notebook: NotebookName::default(),
            section: DEFAULT_SECTION.to_string(),
            image_mode: ImageMode::default(),
            on_page_failure: PageFailurePolicy::default(),
            retries: 0,
        }
    }
}

/// Result of one spine item.
#[derive(Debug)]
pub enum PageOutcome {
    Uploaded(Page),
    Failed(Error),
}

#[derive(Debug)]
pub struct PageReport {
    pub spine_id: String,
    pub href: String,
    pub outcome: PageOutcome,
}

/// Summary of a finished conversion.
#[derive(Debug)]
pub struct ConversionReport {
    pub notebook: Notebook,
    pub section: Section,
    /// One entry per spine item, in reading order.
    pub pages: Vec<PageReport>,
}

impl ConversionReport {
    pub fn uploaded(&self) -> usize {
        self.pages
            .iter()
            .filter(|p| matches!(p.outcome, PageOutcome::Uploaded(_)))
            .count()
    }

    pub fn failed(&self) -> impl Iterator<Item = &PageReport> + '_ {
        self.pages
            .iter()
            .filter(|p| matches!(p.outcome, PageOutcome::Failed(_)))
    }
}

/// Hex SHA-1 of a source file name, used as the default notebook name.
pub fn source_digest(source_name: &str) -> String {
    sha1_smol::Sha1::from(source_name).digest().to_string()
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

fn resolve_notebook_name(name: &NotebookName, manifest: &Manifest, source_name: &str) -> String {
    match name {
        NotebookName::Named(name) => name.clone(),
        NotebookName::BookTitle => manifest
            .title
            .clone()
            .unwrap_or_else(|| source_digest(source_name)),
        NotebookName::SourceDigest => source_digest(source_name),
    }
}

/// Convert an `.epub` file.
///
/// The archive is extracted into a temporary directory that is removed when
/// this returns, whether the conversion succeeded or not.
pub fn convert_archive<S: NoteSink>(
    archive: &Path,
    sink: &mut S,
    options: &ConvertOptions,
) -> Result<ConversionReport> {
    let workdir = TempDir::new()?;
    extract_archive(archive, workdir.path())?;
    info!(archive = %archive.display(), "extracted archive");

    convert_extracted(workdir.path(), &file_name_of(archive), sink, options)
}

/// Convert an already-extracted book directory.
pub fn convert_directory<S: NoteSink>(
    root: &Path,
    sink: &mut S,
    options: &ConvertOptions,
) -> Result<ConversionReport> {
    convert_extracted(root, &file_name_of(root), sink, options)
}

fn convert_extracted<S: NoteSink>(
    root: &Path,
    source_name: &str,
    sink: &mut S,
    options: &ConvertOptions,
) -> Result<ConversionReport> {
    let ctx = PackageContext::open(root)?;
    let manifest = ctx.read_manifest()?;
    let css = collect_stylesheet(&ctx, &manifest)?;

    let notebook_name = resolve_notebook_name(&options.notebook, &manifest, source_name);
    let notebook = sink.create_notebook(&notebook_name)?;
    info!(notebook = %notebook.display_name, "created notebook");
    let section = sink.create_section(&notebook, &options.section)?;
    info!(section = %section.display_name, "created section");

    let transform = TransformOptions {
        image_mode: options.image_mode,
    };
    let total = manifest.spine().len();
    let mut pages = Vec::with_capacity(total);

    for (index, item) in manifest.spine_items().enumerate() {
        let result = upload_with_retries(
            &ctx,
            item,
            &css,
            &section,
            sink,
            transform,
            options.retries,
        );
        let outcome = match result {
            Ok(page) => {
                info!(page = index + 1, total, title = %page.title, "created page");
                PageOutcome::Uploaded(page)
            }
            Err(err) => match options.on_page_failure {
                PageFailurePolicy::Abort => return Err(err),
                PageFailurePolicy::Skip => {
                    warn!(page = index + 1, href = %item.href, error = %err, "skipping page");
                    PageOutcome::Failed(err)
                }
            },
        };
        pages.push(PageReport {
            spine_id: item.id.clone(),
            href: item.href.clone(),
            outcome,
        });
    }

    Ok(ConversionReport {
        notebook,
        section,
        pages,
    })
}

/// Transform and upload one page, repeating the whole step on transient errors.
fn upload_with_retries<S: NoteSink>(
    ctx: &PackageContext,
    item: &ManifestItem,
    css: &str,
    section: &Section,
    sink: &mut S,
    transform: TransformOptions,
    retries: u32,
) -> Result<Page> {
    let mut attempt = 0;
    loop {
        let result = transform_page(ctx, &item.href, css, &item.id, transform)
            .and_then(|page| sink.create_page(section, &PagePayload::from_page(&page)));
        match result {
            Err(err) if attempt < retries && err.is_transient() => {
                attempt += 1;
                warn!(href = %item.href, attempt, error = %err, "retrying page");
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;

    /// Sink that records calls and can fail chosen page uploads.
    #[derive(Default)]
    struct RecordingSink {
        pages: Vec<PagePayload>,
        /// Statuses returned for successive page uploads before succeeding.
        failures: Vec<u16>,
    }

    impl NoteSink for RecordingSink {
        fn create_notebook(&mut self, name: &str) -> Result<Notebook> {
            Ok(Notebook {
                id: "nb".to_string(),
                display_name: name.to_string(),
                sections_url: String::new(),
                self_url: String::new(),
            })
        }

        fn create_section(&mut self, _notebook: &Notebook, name: &str) -> Result<Section> {
            Ok(Section {
                id: "s".to_string(),
                display_name: name.to_string(),
                pages_url: "pages".to_string(),
                is_default: false,
            })
        }

        fn create_page(&mut self, _section: &Section, payload: &PagePayload) -> Result<Page> {
            if !self.failures.is_empty() {
                let status = self.failures.remove(0);
                return Err(Error::Upload {
                    status,
                    body: String::new(),
                });
            }
            self.pages.push(payload.clone());
            Ok(Page {
                id: format!("p{}", self.pages.len()),
                title: payload.title.clone(),
                content_url: String::new(),
            })
        }
    }

    fn write(root: &Path, path: &str, content: &str) {
        let path: PathBuf = root.join(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    fn book() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(
            root,
            "META-INF/container.xml",
            r#"<container><rootfiles><rootfile full-path="OEBPS/content.opf"/></rootfiles></container>"#,
        );
        write(
            root,
            "OEBPS/content.opf",
            r#"<package xmlns:dc="http://purl.org/dc/elements/1.1/">
  <metadata><dc:title>Test Book</dc:title></metadata>
  <manifest>
    <item id="css" href="style.css" media-type="text/css"/>
    <item id="b" href="b.xhtml" media-type="application/xhtml+xml"/>
    <item id="a" href="a.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine><itemref idref="a"/><itemref idref="b"/></spine>
</package>"#,
        );
        write(root, "OEBPS/style.css", "p { color: red }");
        write(root, "OEBPS/a.xhtml", "<html><head><title>First</title></head><body><p>a</p></body></html>");
        write(root, "OEBPS/b.xhtml", "<html><body><p>b</p><img src=\"missing.png\"/></body></html>");
        dir
    }

    #[test]
    fn test_abort_on_failed_page() {
        let dir = book();
        let mut sink = RecordingSink::default();

        let result = convert_directory(dir.path(), &mut sink, &ConvertOptions::default());

        assert!(matches!(result, Err(Error::AssetNotFound(_))));
        assert_eq!(sink.pages.len(), 1);
        assert_eq!(sink.pages[0].title, "First");
    }

    #[test]
    fn test_skip_failed_page_in_spine_order() {
        let dir = book();
        let mut sink = RecordingSink::default();
        let options = ConvertOptions {
            notebook: NotebookName::BookTitle,
            on_page_failure: PageFailurePolicy::Skip,
            ..ConvertOptions::default()
        };

        let report = convert_directory(dir.path(), &mut sink, &options).unwrap();

        assert_eq!(report.notebook.display_name, "Test Book");
        assert_eq!(report.section.display_name, DEFAULT_SECTION);
        let ids: Vec<_> = report.pages.iter().map(|p| p.spine_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(report.uploaded(), 1);
        assert_eq!(report.failed().map(|p| p.href.as_str()).collect::<Vec<_>>(), vec!["b.xhtml"]);
        assert!(sink.pages[0].html.contains(r#"<p style="color: red">a</p>"#));
    }

    #[test]
    fn test_transient_upload_errors_are_retried() {
        let dir = book();
        std::fs::write(dir.path().join("OEBPS/missing.png"), b"PNG").unwrap();
        let mut sink = RecordingSink {
            failures: vec![503, 429],
            ..RecordingSink::default()
        };
        let options = ConvertOptions {
            retries: 2,
            ..ConvertOptions::default()
        };

        let report = convert_directory(dir.path(), &mut sink, &options).unwrap();

        assert_eq!(report.uploaded(), 2);
        assert_eq!(sink.pages[1].parts[0].name, "missing.png");
    }

    #[test]
    fn test_permanent_upload_error_is_not_retried() {
        let dir = book();
        let mut sink = RecordingSink {
            failures: vec![401],
            ..RecordingSink::default()
        };
        let options = ConvertOptions {
            retries: 3,
            ..ConvertOptions::default()
        };

        let result = convert_directory(dir.path(), &mut sink, &options);
        assert!(matches!(result, Err(Error::Upload { status: 401, .. })));
    }

    #[test]
    fn test_notebook_names() {
        let manifest = Manifest::default();
        let digest = source_digest("book.epub");

        assert_eq!(digest.len(), 40);
        assert_eq!(
            resolve_notebook_name(&NotebookName::BookTitle, &manifest, "book.epub"),
            digest
        );
        assert_eq!(
            resolve_notebook_name(&NotebookName::Named("Mine".into()), &manifest, "book.epub"),
            "Mine"
        );
    }

    #[test]
    fn test_invalid_archive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("not-a-book.epub");
        std::fs::write(&path, b"plain text").unwrap();

        let result = convert_archive(&path, &mut RecordingSink::default(), &ConvertOptions::default());
        assert!(matches!(result, Err(Error::Archive(_))));
    }
}
