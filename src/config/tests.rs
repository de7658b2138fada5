use super::load::{default_config_path, default_playlist_path, resolve_config_path};
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
fn resolve_config_path_prefers_segue_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("SEGUE_CONFIG_PATH", "/tmp/segue-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/segue-test-config.toml")
    );
}

#[test]
fn default_paths_prefer_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let base = std::path::PathBuf::from("/tmp/xdg-config-home").join("segue");
    assert_eq!(default_config_path().unwrap(), base.join("config.toml"));
    assert_eq!(default_playlist_path().unwrap(), base.join("playlist.json"));
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
            .join("segue")
            .join("config.toml")
    );
}

#[test]
fn defaults_match_documented_values() {
    let s = Settings::default();
    assert_eq!(s.playback.tick_interval_ms, 1000);
    assert_eq!(s.playback.seek_settle_ms, 100);
    assert_eq!(s.playback.restart_threshold_ms, 3000);
    assert_eq!(s.discovery.probe_timeout_ms, 5000);
    assert!(s.playlist.autosave);
    assert!(s.library.extensions.iter().any(|e| e == "opus"));
    assert!(s.validate().is_ok());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
tick_interval_ms = 250
seek_settle_ms = 40

[discovery]
probe_timeout_ms = 1500
max_in_flight = 2

[library]
extensions = ["mp3"]
recursive = false
include_hidden = false
follow_links = false
display_fields = ["filename"]
display_separator = "::"

[playlist]
path = "/tmp/segue-list.json"
autosave = false

[logging]
filter = "debug"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SEGUE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("SEGUE__PLAYBACK__TICK_INTERVAL_MS");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.tick_interval_ms, 250);
    assert_eq!(s.playback.seek_settle_ms, 40);
    assert_eq!(s.playback.restart_threshold_ms, 3000);
    assert_eq!(s.discovery.probe_timeout_ms, 1500);
    assert_eq!(s.discovery.max_in_flight, 2);
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(!s.library.recursive);
    assert!(!s.library.include_hidden);
    assert!(!s.library.follow_links);
    assert_eq!(s.library.display_fields, vec![TrackDisplayField::Filename]);
    assert_eq!(s.library.display_separator, "::");
    assert!(!s.playlist.autosave);
    assert_eq!(
        s.playlist_path(),
        Some(std::path::PathBuf::from("/tmp/segue-list.json"))
    );
    assert_eq!(s.logging.filter, "debug");
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[playback]
tick_interval_ms = 250
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("SEGUE_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("SEGUE__PLAYBACK__TICK_INTERVAL_MS", "500");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.tick_interval_ms, 500);
}

#[test]
fn validate_rejects_zero_intervals() {
    let mut s = Settings::default();
    s.playback.tick_interval_ms = 0;
    assert!(s.validate().is_err());

    let mut s = Settings::default();
    s.discovery.probe_timeout_ms = 0;
    assert!(s.validate().is_err());
}
