//! Multipart page payloads.

use crate::transform::TransformedPage;

/// Name of the part carrying the page markup.
pub const PRESENTATION_PART: &str = "Presentation";

/// One named binary part of a page upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePart {
    pub name: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Everything needed to create one page: the markup plus its image parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePayload {
    pub title: String,
    pub html: String,
    pub parts: Vec<PagePart>,
}

impl PagePayload {
    /// Build a payload; parts keep the asset map's (sorted) order.
    pub fn from_page(page: &TransformedPage) -> Self {
        Self {
            title: page.title.clone(),
            html: page.html.clone(),
            parts: page
                .assets
                .values()
                .map(|asset| PagePart {
                    name: asset.name.clone(),
                    bytes: asset.bytes.clone(),
                    content_type: asset.content_type.clone(),
                })
                .collect(),
        }
    }

    /// Parts in upload order: the presentation first, then the images.
    pub fn form_parts(&self) -> impl Iterator<Item = (&str, &[u8], &str)> + '_ {
        std::iter::once((PRESENTATION_PART, self.html.as_bytes(), "text/html")).chain(
            self.parts
                .iter()
                .map(|p| (p.name.as_str(), p.bytes.as_slice(), p.content_type.as_str())),
        )
    }
}
