//! Static page generation: one playback page per track plus the library index.

mod html;
mod pages;

pub use pages::{GenerateReport, generate_index, generate_pages};
