use std::path::Path;
use std::time::Duration;

use lofty::picture::{Picture, PictureType};
use lofty::prelude::*;

use crate::error::ExtractError;

/// Tag data read from a single audio file.
///
/// Missing tags are not errors; they show up as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    pub title: Option<String>,
    pub album: Option<String>,
    pub duration: Duration,
    /// Raw bytes of the first embedded image, front cover preferred.
    pub artwork: Option<Vec<u8>>,
}

/// Reads track metadata and artwork from a file.
pub trait Extractor {
    fn extract(&self, path: &Path) -> Result<TrackMetadata, ExtractError>;
}

/// [`Extractor`] backed by `lofty`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyExtractor;

impl Extractor for LoftyExtractor {
    fn extract(&self, path: &Path) -> Result<TrackMetadata, ExtractError> {
        let tagged = lofty::read_from_path(path).map_err(|source| ExtractError {
            path: path.to_path_buf(),
            source,
        })?;

        let mut metadata = TrackMetadata {
            duration: tagged.properties().duration(),
            ..TrackMetadata::default()
        };

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            metadata.title = tag.title().as_deref().and_then(non_blank);
            metadata.album = tag.album().as_deref().and_then(non_blank);
            metadata.artwork = cover_art(tag.pictures()).map(|p| p.data().to_vec());
        }

        Ok(metadata)
    }
}

fn cover_art(pictures: &[Picture]) -> Option<&Picture> {
    pictures
        .iter()
        .find(|p| p.pic_type() == PictureType::CoverFront)
        .or_else(|| pictures.first())
}

fn non_blank(v: &str) -> Option<String> {
    let v = v.trim();
    (!v.is_empty()).then(|| v.to_string())
}
