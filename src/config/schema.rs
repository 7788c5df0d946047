use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/vibe/config.toml` or `~/.config/vibe/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `VIBE__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub auth: AuthSettings,
    pub audio: AudioSettings,
    pub playback: PlaybackSettings,
    pub search: SearchSettings,
    pub controls: ControlsSettings,
    pub ui: UiSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Base URL of the API server, without the `/api` suffix.
    pub base_url: String,
    /// Upper bound for any single HTTP request (milliseconds).
    pub request_timeout_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            base_url: "https://youtube.ssrhouse.store".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// Upper bound for a token validation round trip (milliseconds).
    /// Expiry counts as an invalid token.
    pub validate_timeout_ms: u64,
    /// Where the bearer token is kept between runs.
    pub secret_store: SecretStoreKind,
    /// Override for the file-backed secret store location.
    pub secret_path: Option<PathBuf>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            validate_timeout_ms: 8_000,
            secret_store: SecretStoreKind::File,
            secret_path: None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecretStoreKind {
    /// Persist the token in an owner-only file under the data directory.
    #[serde(alias = "secure", alias = "persistent")]
    File,
    /// Keep the token for the lifetime of the process only.
    #[serde(alias = "local", alias = "in-memory")]
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Which audio resource adapter drives playback.
    pub backend: AudioBackendSetting,
    /// Initial volume in `[0, 1]`.
    pub default_volume: f32,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            backend: AudioBackendSetting::Engine,
            default_volume: 0.8,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AudioBackendSetting {
    /// Imperative engine: authorized fetch, seek, volume and status callbacks.
    #[serde(alias = "imperative", alias = "native")]
    Engine,
    /// Declarative element: fetch-then-local-URL, play/pause/ended only.
    #[serde(alias = "declarative", alias = "web")]
    Element,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Number of results requested per page.
    pub page_size: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Volume change per `+` / `-` press.
    pub volume_step: f32,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            scrub_seconds: 5,
            volume_step: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// How long transient notices stay visible (milliseconds).
    pub notice_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ Vibe Music ~ ".to_string(),
            notice_ms: 2_500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive when neither `VIBE_LOG` nor `RUST_LOG` is set.
    pub level: String,
    /// Directory for the rolling log file.
    pub directory: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}
