//! Microsoft Graph OneNote client.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::model::{CreateNamed, Notebook, Page, Section};
use super::payload::PagePayload;
use super::sink::NoteSink;
use crate::error::{Error, Result};

/// Default Graph API root.
pub const DEFAULT_ENDPOINT: &str = "https://graph.microsoft.com/v1.0";

/// Blocking Graph client authenticated with a bearer token.
#[derive(Clone)]
pub struct GraphClient {
    http: Client,
    endpoint: String,
    token: String,
}

impl std::fmt::Debug for GraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl GraphClient {
    pub fn new(endpoint: &str, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn notebooks_url(&self) -> String {
        format!("{}/me/onenote/notebooks", self.endpoint)
    }

    fn sections_url(&self, notebook: &Notebook) -> String {
        format!("{}/me/onenote/notebooks/{}/sections", self.endpoint, notebook.id)
    }

    /// Send a request that must answer `201 Created` with a JSON body.
    fn send_created<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.bearer_auth(&self.token).send()?;
        let status = response.status();
        let body = response.text()?;
        if status != StatusCode::CREATED {
            return Err(Error::Upload {
                status: status.as_u16(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl NoteSink for GraphClient {
    fn create_notebook(&mut self, name: &str) -> Result<Notebook> {
        let request = self
            .http
            .post(self.notebooks_url())
            .json(&CreateNamed { display_name: name });
        self.send_created(request)
    }

    fn create_section(&mut self, notebook: &Notebook, name: &str) -> Result<Section> {
        let request = self
            .http
            .post(self.sections_url(notebook))
            .json(&CreateNamed { display_name: name });
        self.send_created(request)
    }

    fn create_page(&mut self, section: &Section, payload: &PagePayload) -> Result<Page> {
        let mut form = Form::new();
        for (name, bytes, content_type) in payload.form_parts() {
            let part = Part::bytes(bytes.to_vec())
                .file_name(name.to_string())
                .mime_str(content_type)?;
            form = form.part(name.to_string(), part);
        }
        debug!(url = %section.pages_url, parts = payload.parts.len() + 1, "posting page");

        let request = self.http.post(&section.pages_url).multipart(form);
        self.send_created(request)
    }
}
