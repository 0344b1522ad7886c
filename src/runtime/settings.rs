use crate::config::Settings;
use crate::error::SettingsError;

/// Config is optional: a broken one is reported and the defaults are used.
pub fn load_settings() -> Settings {
    let (settings, notice) = settings_or_default(Settings::load());
    if let Some(notice) = notice {
        // The TUI has not taken the terminal yet, so this is still readable.
        eprintln!("{notice}");
    }
    settings
}

fn settings_or_default(loaded: Result<Settings, SettingsError>) -> (Settings, Option<String>) {
    match loaded {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(format!("osu-browser: {e}, using defaults"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_settings_pass_through_without_a_notice() {
        let mut custom = Settings::default();
        custom.playback.scrub_seconds = 42;

        let (settings, notice) = settings_or_default(Ok(custom));
        assert_eq!(settings.playback.scrub_seconds, 42);
        assert_eq!(notice, None);
    }

    #[test]
    fn a_rejected_config_yields_defaults_and_one_notice() {
        let (settings, notice) = settings_or_default(Err(SettingsError::Invalid {
            key: "playback.poll_interval_ms",
            reason: "must be at least 1",
        }));

        assert_eq!(settings.playback.poll_interval_ms, Settings::default().playback.poll_interval_ms);
        assert_eq!(
            notice.as_deref(),
            Some("osu-browser: invalid config: playback.poll_interval_ms must be at least 1, using defaults")
        );
    }
}
