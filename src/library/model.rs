use std::path::Path;
use std::time::Duration;

use crate::layout::url_path;

/// Album name used when a file carries no album tag.
pub const UNKNOWN_ALBUM: &str = "Unknown Album";

/// One successfully ingested audio file.
///
/// All paths are `/`-separated and relative to the site base directory, so
/// they double as URL paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    pub title: String,
    pub album_title: String,
    /// Whole seconds, kept as display text.
    pub length_seconds: String,
    pub page_path: String,
    pub audio_path: String,
    pub artwork_path: String,
}

/// Tracks in directory traversal order. Built once per run, never mutated.
pub type Catalog = Vec<TrackRecord>;

/// `<pages_dir>/<file stem>.html` for the given audio file.
pub fn page_path_for(pages_dir: &Path, audio_file: &Path) -> String {
    let stem = audio_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    join_url(&url_path(pages_dir), &format!("{stem}.html"))
}

/// `<library_dir>/<album>.jpg`; every track of an album maps to the same file.
pub fn artwork_path_for(library_dir: &Path, album_title: &str) -> String {
    join_url(
        &url_path(library_dir),
        &format!("{}.jpg", safe_file_name(album_title)),
    )
}

/// Duration as whole seconds, e.g. `"180"`.
pub fn format_length(duration: Duration) -> String {
    duration.as_secs().to_string()
}

/// Replace characters that cannot appear in a single path segment.
fn safe_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    // "." and ".." would name a directory, not a file
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        UNKNOWN_ALBUM.to_string()
    } else {
        cleaned
    }
}

fn join_url(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}
