//! tunehall: turn a folder of audio files into a small static music site and
//! serve it over HTTP.
//!
//! Startup is two stages. [`runtime::ingest`] scans the library, writes
//! artwork, one playback page per track and the library index. Then
//! [`runtime::serve`] answers requests from the files on disk.

pub mod config;
pub mod error;
pub mod layout;
pub mod library;
pub mod logging;
pub mod runtime;
pub mod server;
pub mod site;
