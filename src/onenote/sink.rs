//! Destination of a conversion.

use super::model::{Notebook, Page, Section};
use super::payload::PagePayload;
use crate::error::Result;

/// A note service that can hold converted books.
///
/// The converter only creates: one notebook, one section in it, then one page
/// per spine item, in reading order.
pub trait NoteSink {
    fn create_notebook(&mut self, name: &str) -> Result<Notebook>;

    fn create_section(&mut self, notebook: &Notebook, name: &str) -> Result<Section>;

    fn create_page(&mut self, section: &Section, payload: &PagePayload) -> Result<Page>;
}

impl<S: NoteSink + ?Sized> NoteSink for &mut S {
    fn create_notebook(&mut self, name: &str) -> Result<Notebook> {
        (**self).create_notebook(name)
    }

    fn create_section(&mut self, notebook: &Notebook, name: &str) -> Result<Section> {
        (**self).create_section(notebook, name)
    }

    fn create_page(&mut self, section: &Section, payload: &PagePayload) -> Result<Page> {
        (**self).create_page(section, payload)
    }
}
