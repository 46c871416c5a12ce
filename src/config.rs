//! Run configuration: where the book comes from and where its pages go.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::convert::{ConversionReport, ConvertOptions, convert_archive, convert_directory};
use crate::error::{Error, Result};
use crate::onenote::{DirectorySink, GraphClient, NoteSink};

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "ONENOTE_TOKEN";

/// Environment variable overriding the Graph endpoint.
pub const ENDPOINT_ENV: &str = "ONENOTE_ENDPOINT";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Where converted pages are written.
#[derive(Clone, PartialEq, Eq)]
pub enum Destination {
    /// Upload through the Graph API.
    Graph { endpoint: String, token: String },
    /// Dry run into a local directory.
    Directory(PathBuf),
}

impl Destination {
    /// Pick the destination: an output directory wins, otherwise a
    /// non-empty token is required.
    pub fn resolve(token: Option<String>, endpoint: &str, out: Option<PathBuf>) -> Result<Self> {
        if let Some(out) = out {
            return Ok(Destination::Directory(out));
        }
        match token.map(|t| t.trim().to_string()) {
            Some(token) if !token.is_empty() => Ok(Destination::Graph {
                endpoint: endpoint.to_string(),
                token,
            }),
            _ => Err(Error::Config(format!(
                "an access token is required (set {TOKEN_ENV} or pass --token), or use --out for a dry run"
            ))),
        }
    }
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Graph { endpoint, .. } => f
                .debug_struct("Graph")
                .field("endpoint", endpoint)
                .field("token", &"<redacted>")
                .finish(),
            Destination::Directory(path) => f.debug_tuple("Directory").field(path).finish(),
        }
    }
}

/// Everything one conversion run needs.
#[derive(Debug, Clone)]
pub struct Config {
    /// `.epub` file or extracted book directory.
    pub input: PathBuf,
    pub destination: Destination,
    pub timeout: Duration,
    pub options: ConvertOptions,
}

impl Config {
    pub fn new(input: impl Into<PathBuf>, destination: Destination) -> Self {
        Self {
            input: input.into(),
            destination,
            timeout: DEFAULT_TIMEOUT,
            options: ConvertOptions::default(),
        }
    }

    /// Run the conversion against the configured destination.
    pub fn run(&self) -> Result<ConversionReport> {
        if !self.input.exists() {
            return Err(Error::Config(format!(
                "input {} does not exist",
                self.input.display()
            )));
        }

        match &self.destination {
            Destination::Graph { endpoint, token } => {
                info!(%endpoint, "uploading to note service");
                let mut client = GraphClient::new(endpoint, token.clone(), self.timeout)?;
                self.convert_into(&mut client)
            }
            Destination::Directory(out) => {
                info!(out = %out.display(), "writing pages to directory");
                let mut sink = DirectorySink::new(out);
                self.convert_into(&mut sink)
            }
        }
    }

    fn convert_into<S: NoteSink>(&self, sink: &mut S) -> Result<ConversionReport> {
        if self.input.is_dir() {
            convert_directory(&self.input, sink, &self.options)
        } else {
            convert_archive(&self.input, sink, &self.options)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onenote::DEFAULT_ENDPOINT;

    #[test]
    fn test_destination_resolution() {
        let dir = Destination::resolve(None, DEFAULT_ENDPOINT, Some(PathBuf::from("out"))).unwrap();
        assert_eq!(dir, Destination::Directory(PathBuf::from("out")));

        let graph = Destination::resolve(Some(" t0k ".into()), DEFAULT_ENDPOINT, None).unwrap();
        assert_eq!(
            graph,
            Destination::Graph {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                token: "t0k".to_string()
            }
        );

        assert!(matches!(
            Destination::resolve(Some(String::new()), DEFAULT_ENDPOINT, None),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_token_is_not_logged() {
        let graph = Destination::Graph {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: "secret".to_string(),
        };
        assert!(!format!("{graph:?}").contains("secret"));
    }

    #[test]
    fn test_missing_input() {
        let config = Config::new("/nonexistent/book.epub", Destination::Directory("out".into()));
        assert!(matches!(config.run(), Err(Error::Config(_))));
    }
}
