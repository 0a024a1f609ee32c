use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::GenerateError;
use crate::layout::SiteLayout;
use crate::library::TrackRecord;

use super::html;

/// Outcome of a page generation pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerateReport {
    pub written: usize,
    /// Pages that already existed and were left untouched.
    pub skipped: usize,
    pub failed: usize,
}

/// Write a playback page for every track that does not have one yet.
///
/// Existing pages are never rewritten, so running ingestion again over an
/// already populated site is a no-op for them. A failed write is logged and
/// the remaining pages are still generated.
pub fn generate_pages(layout: &SiteLayout, catalog: &[TrackRecord]) -> GenerateReport {
    let mut report = GenerateReport::default();
    let index_href = layout.index_href();

    let pages_dir = layout.resolve(&layout.pages_dir);
    if let Err(e) = fs::create_dir_all(&pages_dir) {
        warn!(dir = %pages_dir.display(), "failed to create pages directory: {e}");
    }

    for track in catalog {
        let path = layout.resolve(&track.page_path);
        match write_new(&path, &html::playback_page(track, &index_href)) {
            Ok(true) => {
                debug!(page = %path.display(), "wrote playback page");
                report.written += 1;
            }
            Ok(false) => report.skipped += 1,
            Err(source) => {
                let err = GenerateError::Page { path, source };
                warn!("{err}");
                report.failed += 1;
            }
        }
    }

    info!(
        written = report.written,
        skipped = report.skipped,
        failed = report.failed,
        "playback pages generated"
    );
    report
}

/// Rewrite the library index at `path` from scratch.
///
/// Unlike playback pages the index is always replaced so it lists exactly the
/// tracks of the current catalog.
pub fn generate_index(path: &Path, catalog: &[TrackRecord]) -> Result<(), GenerateError> {
    fs::write(path, html::index_page(catalog)).map_err(|source| GenerateError::Index {
        path: path.to_path_buf(),
        source,
    })?;
    info!(index = %path.display(), tracks = catalog.len(), "library index written");
    Ok(())
}

/// Create `path` with `contents` unless it already exists.
fn write_new(path: &Path, contents: &str) -> io::Result<bool> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    };
    file.write_all(contents.as_bytes())?;
    Ok(true)
}
