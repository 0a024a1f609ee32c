use std::env;
use std::path::{Component, Path, PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then lets environment
/// variables (prefix `TUNEHALL__`) override it, and falls back to struct
/// defaults for anything left unset.
impl Settings {
    /// Load settings from an optional config file and the environment.
    ///
    /// `path` wins over `TUNEHALL_CONFIG_PATH` and the XDG default.
    pub fn load(path: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let config_path = path.map(Path::to_path_buf).or_else(resolve_config_path);

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TUNEHALL")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be >= 1".to_string());
        }
        if self
            .library
            .extensions
            .iter()
            .all(|e| e.trim().trim_start_matches('.').is_empty())
        {
            return Err("library.extensions must name at least one extension".to_string());
        }
        if !stays_relative(&self.library.dir) {
            return Err("library.dir must be a relative path inside site.base_dir".to_string());
        }

        let site = &self.site;
        let resource = url_segment(&site.resource_dir)
            .ok_or("site.resource_dir must be a single URL-safe directory name")?;
        let pages = url_segment(&site.pages_dir)
            .ok_or("site.pages_dir must be a single URL-safe directory name")?;
        let index = url_segment(&site.index_page)
            .ok_or("site.index_page must be a single URL-safe file name")?;
        if resource == pages {
            return Err("site.resource_dir and site.pages_dir must differ".to_string());
        }
        if RESERVED_ROUTES.contains(&index) {
            return Err(format!("site.index_page must not be one of {RESERVED_ROUTES:?}"));
        }
        if normal_parts(&self.library.dir).first() != Some(&resource) {
            return Err("library.dir must lie inside site.resource_dir".to_string());
        }
        Ok(())
    }
}

/// Root routes the generated index must not shadow.
const RESERVED_ROUTES: [&str; 3] = ["favicon.ico", "refresh", "transfer"];

fn stays_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn normal_parts(path: &Path) -> Vec<&str> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect()
}

/// The single name `path` consists of, when it can be used verbatim in a URL.
fn url_segment(path: &Path) -> Option<&str> {
    if !stays_relative(path) {
        return None;
    }
    match normal_parts(path).as_slice() {
        [name]
            if !name.chars().all(|c| c == '.')
                && name
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')) =>
        {
            Some(*name)
        }
        _ => None,
    }
}

/// Resolve the config path from `TUNEHALL_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TUNEHALL_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/tunehall/config.toml`
/// or `~/.config/tunehall/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("tunehall").join("config.toml"))
}
