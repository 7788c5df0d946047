use super::load::{default_config_path, default_data_dir, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_vibe_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("VIBE_CONFIG_PATH", "/tmp/vibe-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/vibe-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("vibe")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("vibe")
            .join("config.toml")
    );
}

#[test]
fn default_data_dir_falls_back_to_local_share() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_DATA_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_data_dir().unwrap(),
        std::path::PathBuf::from("/tmp/home-dir/.local/share/vibe")
    );
}

#[test]
fn settings_load_from_config_file_and_parse_aliases() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[server]
base_url = "http://localhost:8080"
request_timeout_ms = 1500

[auth]
validate_timeout_ms = 700
secret_store = "in-memory"

[audio]
backend = "declarative"
default_volume = 0.25

[playback]
shuffle = true

[search]
page_size = 25

[controls]
scrub_seconds = 9
volume_step = 0.1

[ui]
header_text = "hello"
notice_ms = 900

[log]
level = "debug"
directory = "/tmp/vibe-logs"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("VIBE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("VIBE__SEARCH__PAGE_SIZE");

    let s = Settings::load().unwrap();
    assert_eq!(s.server.base_url, "http://localhost:8080");
    assert_eq!(s.server.request_timeout_ms, 1500);
    assert_eq!(s.auth.validate_timeout_ms, 700);
    assert_eq!(s.auth.secret_store, SecretStoreKind::Memory);
    assert!(s.auth.secret_path.is_none());
    assert_eq!(s.audio.backend, AudioBackendSetting::Element);
    assert!((s.audio.default_volume - 0.25).abs() < f32::EPSILON);
    assert!(s.playback.shuffle);
    assert_eq!(s.search.page_size, 25);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.notice_ms, 900);
    assert_eq!(s.log.level, "debug");
    assert_eq!(
        s.log.directory.as_deref(),
        Some(std::path::Path::new("/tmp/vibe-logs"))
    );
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[search]
page_size = 25
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("VIBE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("VIBE__SEARCH__PAGE_SIZE", "40");

    let s = Settings::load().unwrap();
    assert_eq!(s.search.page_size, 40);
}

#[test]
fn missing_config_file_yields_defaults() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let _g1 = EnvGuard::set(
        "VIBE_CONFIG_PATH",
        dir.path().join("absent.toml").to_str().unwrap(),
    );

    let s = Settings::load().unwrap();
    assert_eq!(s.server.base_url, "https://youtube.ssrhouse.store");
    assert_eq!(s.auth.secret_store, SecretStoreKind::File);
    assert_eq!(s.audio.backend, AudioBackendSetting::Engine);
    assert_eq!(s.search.page_size, 10);
    assert!(!s.playback.shuffle);
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut s = Settings::default();
    assert!(s.validate().is_ok());

    s.search.page_size = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.audio.default_volume = 1.5;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.auth.validate_timeout_ms = 0;
    assert!(s.validate().is_err());
}
