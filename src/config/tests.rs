use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use crate::error::SettingsError;
use std::path::PathBuf;
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
fn resolve_config_path_prefers_explicit_env_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("OSU_BROWSER_CONFIG_PATH", "/tmp/osu-browser-test.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        PathBuf::from("/tmp/osu-browser-test.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    assert_eq!(
        default_config_path().unwrap(),
        PathBuf::from("/tmp/xdg-config-home")
            .join("osu-browser")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    assert_eq!(
        default_config_path().unwrap(),
        PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("osu-browser")
            .join("config.toml")
    );
}

#[test]
fn defaults_point_at_game_songs_folder_and_home_playlists() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("HOME", "/tmp/home-dir");

    let s = Settings::default();
    assert_eq!(
        s.library.resolved_songs_dir(),
        PathBuf::from("/tmp/home-dir/AppData/Local/osu!/Songs")
    );
    assert_eq!(
        s.playlists.resolved_dir(),
        PathBuf::from("/tmp/home-dir/.osu_playlists")
    );
    assert_eq!(s.library.extensions, vec!["mp3".to_string()]);
    assert!(s.metadata.allow_expensive_duration_probe);
    assert_eq!(s.background.image_extensions.len(), 5);
    assert!(s.validate().is_ok());
}

#[test]
fn partial_toml_keeps_defaults_for_missing_fields() {
    let s: Settings = toml::from_str(
        r#"
[playback]
scrub_seconds = 12
"#,
    )
    .unwrap();
    assert_eq!(s.playback.scrub_seconds, 12);
    assert_eq!(s.playback.poll_interval_ms, 500);
    assert_eq!(s.playlists.default_name, "Favorites");
}

#[test]
fn validate_rejects_zero_poll_interval() {
    let mut s = Settings::default();
    s.playback.poll_interval_ms = 0;
    assert!(s.validate().is_err());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[library]
songs_dir = "/srv/osu/Songs"
extensions = ["mp3", "ogg"]
follow_links = false

[metadata]
allow_expensive_duration_probe = false

[background]
cache = false

[playback]
poll_interval_ms = 250
scrub_seconds = 9

[playlists]
dir = "/srv/osu/playlists"
default_name = "Queue"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("OSU_BROWSER_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("OSU_BROWSER__PLAYBACK__SCRUB_SECONDS");

    let s = Settings::load().unwrap();
    assert_eq!(s.library.songs_dir, Some(PathBuf::from("/srv/osu/Songs")));
    assert_eq!(s.library.extensions, vec!["mp3".to_string(), "ogg".to_string()]);
    assert!(!s.library.follow_links);
    assert!(!s.metadata.allow_expensive_duration_probe);
    assert!(!s.background.cache);
    assert_eq!(s.playback.poll_interval_ms, 250);
    assert_eq!(s.playback.scrub_seconds, 9);
    assert_eq!(s.playlists.resolved_dir(), PathBuf::from("/srv/osu/playlists"));
    assert_eq!(s.playlists.default_name, "Queue");
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
scrub_seconds = 5
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("OSU_BROWSER_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("OSU_BROWSER__PLAYBACK__SCRUB_SECONDS", "30");

    let s = Settings::load().unwrap();
    assert_eq!(s.playback.scrub_seconds, 30);
}

#[test]
fn load_from_missing_file_gives_defaults() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("OSU_BROWSER__PLAYBACK__SCRUB_SECONDS");
    let dir = tempfile::tempdir().unwrap();

    let s = Settings::load_from(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(s.playback.scrub_seconds, 5);
    assert_eq!(s.playlists.default_name, "Favorites");
}

#[test]
fn load_from_reports_malformed_toml_as_a_load_error() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(&cfg_path, "[playback\nscrub_seconds = ").unwrap();

    let err = Settings::load_from(Some(&cfg_path)).unwrap_err();
    assert!(matches!(err, SettingsError::Load(_)));
}

#[test]
fn load_from_validates_what_it_read() {
    let _lock = env_lock();
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[library]
extensions = [" "]
"#,
    )
    .unwrap();

    let err = Settings::load_from(Some(&cfg_path)).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::Invalid {
            key: "library.extensions",
            ..
        }
    ));
}

#[test]
fn validate_rejects_blank_default_playlist_name() {
    let mut s = Settings::default();
    s.playlists.default_name = "  ".to_string();
    let err = s.validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid config: playlists.default_name must not be blank"
    );
}
