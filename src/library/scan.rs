use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::ScanError;
use crate::layout::{SiteLayout, url_path};

use super::metadata::Extractor;
use super::model::{
    Catalog, TrackRecord, UNKNOWN_ALBUM, artwork_path_for, format_length, page_path_for,
};

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Walk the library directory and build the catalog.
///
/// Files the extractor cannot read are skipped, and walk errors (including a
/// missing library root) only cut the walk short; neither aborts the scan.
pub fn scan<E>(layout: &SiteLayout, settings: &LibrarySettings, extractor: &E) -> Catalog
where
    E: Extractor + ?Sized,
{
    let root = layout.resolve(&layout.library_dir);
    let mut tracks: Catalog = Vec::new();

    let mut walker = WalkDir::new(&root)
        .follow_links(settings.follow_links)
        .sort_by_file_name();
    if let Some(d) = settings.max_depth {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                let err = ScanError::Walk {
                    root: root.clone(),
                    source,
                };
                warn!("{err}");
                continue;
            }
        };

        let path = entry.path();
        if entry.file_type().is_file() && is_audio_file(path, settings) {
            if let Some(track) = ingest_file(layout, path, extractor) {
                tracks.push(track);
            }
        }
    }

    info!(root = %root.display(), tracks = tracks.len(), "library scan finished");
    tracks
}

fn ingest_file<E>(layout: &SiteLayout, path: &Path, extractor: &E) -> Option<TrackRecord>
where
    E: Extractor + ?Sized,
{
    debug!(file = %path.display(), "reading track");

    let metadata = match extractor.extract(path) {
        Ok(m) => m,
        Err(err) => {
            warn!("skipping track: {err}");
            return None;
        }
    };

    let title = metadata.title.unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "UNKNOWN".to_string())
    });
    let album_title = metadata
        .album
        .unwrap_or_else(|| UNKNOWN_ALBUM.to_string());

    let artwork_path = artwork_path_for(&layout.library_dir, &album_title);
    if let Some(bytes) = metadata.artwork.as_deref() {
        let target = layout.resolve(&artwork_path);
        match store_artwork(&target, bytes) {
            Ok(true) => debug!(artwork = %target.display(), album = %album_title, "wrote artwork"),
            Ok(false) => {}
            Err(source) => {
                let err = ScanError::Artwork {
                    path: target,
                    source,
                };
                warn!("{err}");
            }
        }
    }

    let audio_rel = path.strip_prefix(&layout.base_dir).unwrap_or(path);

    Some(TrackRecord {
        title,
        album_title,
        length_seconds: format_length(metadata.duration),
        page_path: page_path_for(&layout.pages_dir, path),
        audio_path: url_path(audio_rel),
        artwork_path,
    })
}

/// Write `bytes` to `path` unless something is already there.
///
/// Returns whether a file was written. The first track of an album wins;
/// existing artwork is never compared or replaced.
pub(crate) fn store_artwork(path: &Path, bytes: &[u8]) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    };
    fill_artwork(path, file, bytes)
}

/// A partly written file is removed so a later scan can write it again.
fn fill_artwork<W: Write>(path: &Path, mut file: W, bytes: &[u8]) -> io::Result<bool> {
    if let Err(e) = file.write_all(bytes).and_then(|()| file.flush()) {
        drop(file);
        if let Err(rm) = fs::remove_file(path) {
            debug!(artwork = %path.display(), "cannot remove partial artwork: {rm}");
        }
        return Err(e);
    }
    Ok(true)
}
