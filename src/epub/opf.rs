//! OPF package document parsing: manifest, spine and title.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::warn;

use crate::error::{Error, Result};
use crate::util::{local_name, resolve_entity};

/// One entry of the package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    pub media_type: String,
    /// Path relative to the package document's directory.
    pub href: String,
}

/// Parsed package document.
///
/// Items are kept in document order and indexed by id. Every spine entry is
/// guaranteed to name a manifest item.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    items: Vec<ManifestItem>,
    index: HashMap<String, usize>,
    spine: Vec<String>,
    /// First `dc:title` of the package metadata.
    pub title: Option<String>,
}

impl Manifest {
    /// Look up an item by id.
    pub fn get(&self, id: &str) -> Option<&ManifestItem> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    /// All items in document order.
    pub fn items(&self) -> &[ManifestItem] {
        &self.items
    }

    /// Map view of the manifest keyed by item id.
    pub fn by_id(&self) -> HashMap<&str, &ManifestItem> {
        self.items.iter().map(|item| (item.id.as_str(), item)).collect()
    }

    /// Reading order as item ids.
    pub fn spine(&self) -> &[String] {
        &self.spine
    }

    /// Reading order as manifest items.
    pub fn spine_items(&self) -> impl Iterator<Item = &ManifestItem> + '_ {
        self.spine.iter().filter_map(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn insert(&mut self, item: ManifestItem) {
        if self.index.contains_key(&item.id) {
            warn!(id = %item.id, "duplicate manifest id, keeping the first");
            return;
        }
        self.index.insert(item.id.clone(), self.items.len());
        self.items.push(item);
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    Metadata,
    Manifest,
    Spine,
}

/// Parse OPF package document.
///
/// Elements are found by local name, so namespace prefixes (`opf:item`) and
/// the relative order of `metadata`, `manifest` and `spine` do not matter.
pub fn parse_opf(content: &str) -> Result<Manifest> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut manifest = Manifest::default();
    let mut section = Section::Other;
    let mut saw_manifest = false;
    let mut saw_spine = false;
    let mut in_title = false;
    let mut title_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"metadata" => section = Section::Metadata,
                b"manifest" => {
                    section = Section::Manifest;
                    saw_manifest = true;
                }
                b"spine" => {
                    section = Section::Spine;
                    saw_spine = true;
                }
                b"title" if section == Section::Metadata && manifest.title.is_none() => {
                    in_title = true;
                    title_text.clear();
                }
                b"item" if section == Section::Manifest => read_item(&e, &mut manifest)?,
                b"itemref" if section == Section::Spine => read_itemref(&e, &mut manifest)?,
                _ => {}
            },
            Ok(Event::Empty(e)) => match local_name(e.name().as_ref()) {
                b"manifest" => saw_manifest = true,
                b"spine" => saw_spine = true,
                b"item" if section == Section::Manifest => read_item(&e, &mut manifest)?,
                b"itemref" if section == Section::Spine => read_itemref(&e, &mut manifest)?,
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_title {
                    title_text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Ok(Event::GeneralRef(e)) => {
                if in_title
                    && let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref()))
                {
                    title_text.push_str(&resolved);
                }
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"metadata" | b"manifest" | b"spine" => section = Section::Other,
                b"title" if in_title => {
                    in_title = false;
                    let title = title_text.trim();
                    if !title.is_empty() {
                        manifest.title = Some(title.to_string());
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Parse(format!(
                    "malformed package document at byte {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    if !saw_manifest {
        return Err(Error::Parse("package document has no manifest".into()));
    }
    if !saw_spine {
        return Err(Error::Parse("package document has no spine".into()));
    }

    if let Some(missing) = manifest.spine.iter().find(|id| !manifest.index.contains_key(*id)) {
        return Err(Error::Parse(format!(
            "spine references unknown manifest item {missing:?}"
        )));
    }

    if manifest.spine.is_empty() {
        warn!("package document has an empty spine");
    }

    Ok(manifest)
}

fn read_item(e: &BytesStart<'_>, manifest: &mut Manifest) -> Result<()> {
    let mut id = String::new();
    let mut href = String::new();
    let mut media_type = String::new();

    for attr in e.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"id" => id = attr_value(&attr.value)?,
            b"href" => href = attr_value(&attr.value)?,
            b"media-type" => media_type = attr_value(&attr.value)?,
            _ => {}
        }
    }

    if id.is_empty() {
        warn!(href = %href, "skipping manifest item without id");
        return Ok(());
    }

    manifest.insert(ManifestItem {
        id,
        media_type,
        href,
    });
    Ok(())
}

fn read_itemref(e: &BytesStart<'_>, manifest: &mut Manifest) -> Result<()> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"idref" {
            manifest.spine.push(attr_value(&attr.value)?);
        }
    }
    Ok(())
}

fn attr_value(raw: &[u8]) -> Result<String> {
    let raw = std::str::from_utf8(raw)
        .map_err(|e| Error::Parse(format!("attribute is not UTF-8: {e}")))?;
    quick_xml::escape::unescape(raw)
        .map(|v| v.into_owned())
        .map_err(|e| Error::Parse(format!("bad attribute value {raw:?}: {e}")))
}
