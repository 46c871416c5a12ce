//! Dry-run sink writing pages to the local filesystem.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::model::{Notebook, Page, Section};
use super::payload::PagePayload;
use super::sink::NoteSink;
use crate::error::Result;

/// File holding a page's markup inside its directory.
pub const PAGE_FILE: &str = "index.html";

/// Writes `<out>/<notebook>/<section>/page-NNNN/index.html` plus one file per
/// image part next to it.
#[derive(Debug)]
pub struct DirectorySink {
    out: PathBuf,
    page_counts: HashMap<PathBuf, usize>,
}

impl DirectorySink {
    pub fn new(out: impl Into<PathBuf>) -> Self {
        Self {
            out: out.into(),
            page_counts: HashMap::new(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out
    }
}

/// Make a display name usable as one path component.
fn path_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

fn to_url(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl NoteSink for DirectorySink {
    fn create_notebook(&mut self, name: &str) -> Result<Notebook> {
        let dir = self.out.join(path_component(name));
        fs::create_dir_all(&dir)?;
        Ok(Notebook {
            id: path_component(name),
            display_name: name.to_string(),
            sections_url: to_url(&dir),
            self_url: to_url(&dir),
        })
    }

    fn create_section(&mut self, notebook: &Notebook, name: &str) -> Result<Section> {
        let dir = self
            .out
            .join(&notebook.id)
            .join(path_component(name));
        fs::create_dir_all(&dir)?;
        Ok(Section {
            id: format!("{}/{}", notebook.id, path_component(name)),
            display_name: name.to_string(),
            pages_url: to_url(&dir),
            is_default: false,
        })
    }

    fn create_page(&mut self, section: &Section, payload: &PagePayload) -> Result<Page> {
        let section_dir = PathBuf::from(&section.pages_url);
        let count = self.page_counts.entry(section_dir.clone()).or_insert(0);
        *count += 1;
        let page_id = format!("page-{:04}", *count);

        let dir = section_dir.join(&page_id);
        fs::create_dir_all(&dir)?;
        let page_file = dir.join(PAGE_FILE);
        fs::write(&page_file, &payload.html)?;
        for part in &payload.parts {
            fs::write(dir.join(path_component(&part.name)), &part.bytes)?;
        }
        debug!(dir = %dir.display(), parts = payload.parts.len(), "wrote page");

        Ok(Page {
            id: format!("{}/{page_id}", section.id),
            title: payload.title.clone(),
            content_url: to_url(&page_file),
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::onenote::PagePart;

    fn payload(title: &str) -> PagePayload {
        PagePayload {
            title: title.to_string(),
            html: format!("<html><head><title>{title}</title></head></html>"),
            parts: vec![PagePart {
                name: "images_cover.jpg".to_string(),
                bytes: b"JPEG".to_vec(),
                content_type: "image/jpg".to_string(),
            }],
        }
    }

    #[test]
    fn test_writes_numbered_pages() {
        let out = TempDir::new().unwrap();
        let mut sink = DirectorySink::new(out.path());

        let notebook = sink.create_notebook("My/Book").unwrap();
        let section = sink.create_section(&notebook, "epub").unwrap();
        let first = sink.create_page(&section, &payload("One")).unwrap();
        let second = sink.create_page(&section, &payload("Two")).unwrap();

        let section_dir = out.path().join("My_Book").join("epub");
        assert!(section_dir.join("page-0001").join(PAGE_FILE).is_file());
        assert_eq!(
            fs::read(section_dir.join("page-0002").join("images_cover.jpg")).unwrap(),
            b"JPEG"
        );
        assert_eq!(first.title, "One");
        assert_eq!(second.id, "My_Book/epub/page-0002");
        assert_eq!(notebook.display_name, "My/Book");
    }

    #[test]
    fn test_path_component() {
        assert_eq!(path_component("a:b/c"), "a_b_c");
        assert_eq!(path_component(".."), "_");
        assert_eq!(path_component("  "), "_");
    }
}
