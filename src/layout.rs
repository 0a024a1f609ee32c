//! Resolved on-disk layout of the served site.

use std::path::{Component, Path, PathBuf};

use crate::config::{LibrarySettings, SiteSettings};

/// Paths shared by ingestion and the HTTP handlers.
///
/// `base_dir` is the only path that may be absolute; the rest are relative to
/// it and are turned into filesystem paths with [`SiteLayout::resolve`].
#[derive(Debug, Clone)]
pub struct SiteLayout {
    pub base_dir: PathBuf,
    pub home_page: PathBuf,
    pub index_page: PathBuf,
    pub favicon: PathBuf,
    pub transfer_file: PathBuf,
    pub resource_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub library_dir: PathBuf,
    pub log_file: PathBuf,
}

impl SiteLayout {
    pub fn new(site: &SiteSettings, library: &LibrarySettings) -> Self {
        Self {
            base_dir: site.base_dir.clone(),
            home_page: site.home_page.clone(),
            index_page: site.index_page.clone(),
            favicon: site.favicon.clone(),
            transfer_file: site.transfer_file.clone(),
            resource_dir: site.resource_dir.clone(),
            pages_dir: site.pages_dir.clone(),
            library_dir: library.dir.clone(),
            log_file: site.log_file.clone(),
        }
    }

    /// Default layout rooted at `base_dir`.
    pub fn rooted_at(base_dir: impl Into<PathBuf>) -> Self {
        let site = SiteSettings {
            base_dir: base_dir.into(),
            ..SiteSettings::default()
        };
        Self::new(&site, &LibrarySettings::default())
    }

    pub fn resolve(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.base_dir.join(rel)
    }

    /// Absolute URL of the generated library index, e.g. `/library.html`.
    pub fn index_href(&self) -> String {
        format!("/{}", url_path(&self.index_page))
    }

    /// URL prefix of the Resource group, e.g. `/res`.
    pub fn resource_mount(&self) -> String {
        format!("/{}", url_path(&self.resource_dir))
    }

    /// URL prefix of the Music group, e.g. `/music`.
    pub fn pages_mount(&self) -> String {
        format!("/{}", url_path(&self.pages_dir))
    }
}

/// Render a relative path with `/` separators, dropping `.` components.
pub fn url_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_path_uses_forward_slashes_and_skips_dots() {
        assert_eq!(url_path(Path::new("./res/library/a.mp3")), "res/library/a.mp3");
        assert_eq!(url_path(Path::new("music")), "music");
        assert_eq!(url_path(Path::new(".")), "");
    }

    #[test]
    fn resolve_joins_onto_base_dir() {
        let layout = SiteLayout::rooted_at("/srv/site");
        assert_eq!(
            layout.resolve("music/Song.html"),
            PathBuf::from("/srv/site/music/Song.html")
        );
        assert_eq!(layout.index_href(), "/library.html");
    }

    #[test]
    fn mounts_follow_configured_directories() {
        let site = SiteSettings {
            resource_dir: PathBuf::from("./media"),
            pages_dir: PathBuf::from("pages"),
            ..SiteSettings::default()
        };
        let layout = SiteLayout::new(&site, &LibrarySettings::default());

        assert_eq!(layout.resource_mount(), "/media");
        assert_eq!(layout.pages_mount(), "/pages");
        assert_eq!(SiteLayout::rooted_at(".").resource_mount(), "/res");
        assert_eq!(SiteLayout::rooted_at(".").pages_mount(), "/music");
    }
}
