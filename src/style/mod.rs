//! Stylesheet parsing and inlining into `style` attributes.

mod cascade;
mod declaration;
mod stylesheet;

pub use cascade::{cascade, inline_styles, take_style_elements};
pub use declaration::{Declaration, to_style_attribute};
pub use stylesheet::{CssRule, Specificity, Stylesheet, parse_style_attribute};
