use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `VIBE__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("VIBE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.base_url.trim().is_empty() {
            return Err("server.base_url must not be empty".to_string());
        }
        if self.server.request_timeout_ms == 0 {
            return Err("server.request_timeout_ms must be >= 1".to_string());
        }
        if self.auth.validate_timeout_ms == 0 {
            return Err("auth.validate_timeout_ms must be >= 1".to_string());
        }
        if self.search.page_size == 0 {
            return Err("search.page_size must be >= 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.audio.default_volume) {
            return Err("audio.default_volume must be within 0..=1".to_string());
        }
        if !(self.controls.volume_step > 0.0 && self.controls.volume_step <= 1.0) {
            return Err("controls.volume_step must be within (0, 1]".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `VIBE_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("VIBE_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/vibe/config.toml`
/// or `~/.config/vibe/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_home("XDG_CONFIG_HOME", ".config").map(|d| d.join("vibe").join("config.toml"))
}

/// Directory holding persistent client data (`$XDG_DATA_HOME/vibe`).
pub fn default_data_dir() -> Option<PathBuf> {
    xdg_home("XDG_DATA_HOME", ".local/share").map(|d| d.join("vibe"))
}

/// Directory holding logs (`$XDG_STATE_HOME/vibe/logs`).
pub fn default_log_dir() -> Option<PathBuf> {
    xdg_home("XDG_STATE_HOME", ".local/state").map(|d| d.join("vibe").join("logs"))
}

fn xdg_home(var: &str, fallback: &str) -> Option<PathBuf> {
    if let Some(dir) = env::var_os(var).filter(|v| !v.is_empty()) {
        Some(PathBuf::from(dir))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(fallback))
    }
}
