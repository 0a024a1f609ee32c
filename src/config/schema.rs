use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level server settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/tunehall/config.toml` or `~/.config/tunehall/config.toml`
///
/// Precedence (highest wins):
/// 1) Command line flags
/// 2) Environment variables (prefix `TUNEHALL__`, `__` as nested separator)
/// 3) Config file (if present)
/// 4) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub site: SiteSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address the HTTP listener binds to.
    pub bind: IpAddr,
    /// Port the HTTP listener binds to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 80,
        }
    }
}

/// Where the served site lives on disk.
///
/// Every path except `base_dir` is relative to `base_dir`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub base_dir: PathBuf,
    /// Hand-written landing page served at `/`.
    pub home_page: PathBuf,
    /// Generated library index, rewritten on every start.
    pub index_page: PathBuf,
    pub favicon: PathBuf,
    /// File served verbatim at `/transfer`.
    pub transfer_file: PathBuf,
    /// Root of the `/res/...` route group.
    pub resource_dir: PathBuf,
    /// Output directory for playback pages, also the root of `/music/...`.
    pub pages_dir: PathBuf,
    /// Append-only request log.
    pub log_file: PathBuf,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            home_page: PathBuf::from("index.html"),
            index_page: PathBuf::from("library.html"),
            favicon: PathBuf::from("favicon.ico"),
            transfer_file: PathBuf::from("transfer.file"),
            resource_dir: PathBuf::from("res"),
            pages_dir: PathBuf::from("music"),
            log_file: PathBuf::from("server.log"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Library root, relative to `site.base_dir`. Artwork is written here too.
    pub dir: PathBuf,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("res/library"),
            extensions: vec!["mp3".into()],
            follow_links: true,
            include_hidden: true,
            max_depth: None,
        }
    }
}
