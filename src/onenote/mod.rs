//! Note service sinks: the Graph OneNote API and a local dry-run directory.

mod directory;
mod graph;
mod model;
mod payload;
mod sink;

pub use directory::{DirectorySink, PAGE_FILE};
pub use graph::{DEFAULT_ENDPOINT, GraphClient};
pub use model::{Notebook, Page, Section};
pub use payload::{PRESENTATION_PART, PagePart, PagePayload};
pub use sink::NoteSink;
