//! Notebook, section and page resources as returned by the note service.

use serde::{Deserialize, Serialize};

/// A notebook (top-level container).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub sections_url: String,
    #[serde(default, rename = "self")]
    pub self_url: String,
}

/// A section of a notebook; pages are created under `pages_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub display_name: String,
    pub pages_url: String,
    #[serde(default)]
    pub is_default: bool,
}

/// A created page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content_url: String,
}

/// Request body for notebook and section creation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateNamed<'a> {
    pub display_name: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notebook_from_graph_json() {
        let json = r#"{
            "id": "0-ABC",
            "self": "https://graph.microsoft.com/v1.0/me/onenote/notebooks/0-ABC",
            "displayName": "3f786850e387550fdab836ed7e6dc881de23001b",
            "sectionsUrl": "https://graph.microsoft.com/v1.0/me/onenote/notebooks/0-ABC/sections",
            "sectionGroupsUrl": "https://graph.microsoft.com/v1.0/me/onenote/notebooks/0-ABC/sectionGroups",
            "isDefault": false
        }"#;

        let notebook: Notebook = serde_json::from_str(json).unwrap();
        assert_eq!(notebook.id, "0-ABC");
        assert!(notebook.sections_url.ends_with("/sections"));
        assert!(notebook.self_url.ends_with("/0-ABC"));
    }

    #[test]
    fn test_section_and_page() {
        let section: Section = serde_json::from_str(
            r#"{"id":"1-S","displayName":"epub","pagesUrl":"https://x/pages","isDefault":true}"#,
        )
        .unwrap();
        assert_eq!(section.pages_url, "https://x/pages");
        assert!(section.is_default);

        let page: Page = serde_json::from_str(r#"{"id":"p1","title":"Chapter 1"}"#).unwrap();
        assert_eq!(page.title, "Chapter 1");
        assert_eq!(page.content_url, "");
    }

    #[test]
    fn test_create_body() {
        let body = serde_json::to_string(&CreateNamed { display_name: "epub" }).unwrap();
        assert_eq!(body, r#"{"displayName":"epub"}"#);
    }
}
