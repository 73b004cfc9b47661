//! PPTX (Office Open XML) backend for populating template slides.
//!
//! A `.pptx` file is a ZIP package of XML parts. This crate reads the
//! package into memory, rewrites the presentation and slide parts with
//! streaming XML, and writes a new package.

pub mod compose;
pub mod package;
pub mod presentation;
pub mod rels;
pub mod shapes;
pub mod slide;
pub mod units;
pub mod xml;

#[cfg(test)]
pub(crate) mod test_support;

pub use compose::{fill, fill_to, generate, generate_to, list_slides, output_file_name, text_value};
pub use package::Package;
pub use presentation::{PptxDocument, SlideRef, SlideSummary, SlideWriter};
pub use shapes::TextStyle;
