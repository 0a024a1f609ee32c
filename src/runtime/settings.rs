use std::path::Path;

use crate::config;

/// Load settings, falling back to defaults when the config is unusable.
///
/// Runs before logging is set up, so problems go straight to stderr.
pub fn load_settings(path: Option<&Path>) -> config::Settings {
    match config::Settings::load(path) {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("tunehall: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the server from starting.
            eprintln!("tunehall: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
