//! Library ingestion: metadata extraction and directory scanning.
//!
//! `scan` walks the library directory once and returns the catalog by value;
//! nothing in this module keeps state between calls.

mod metadata;
mod model;
mod scan;

pub use metadata::{Extractor, LoftyExtractor, TrackMetadata};
pub use model::*;
pub use scan::scan;
