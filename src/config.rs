use crate::kiosk::Timings;
use log::warn;
use std::path::PathBuf;
use std::str::FromStr;
use tokio::time::Duration;

#[derive(Debug, Clone)]
pub struct KioskConfig {
    pub database_url: String,
    pub export_passphrase: String,
    pub export_dir: PathBuf,
    pub video_path: PathBuf,
    pub video_player: Vec<String>,
    pub video_secs: u64,
    pub timings: Timings,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://kiosk.db?mode=rwc".to_string(),
            export_passphrase: "altaaqa-admin".to_string(),
            export_dir: PathBuf::from("exports"),
            video_path: PathBuf::from("assets/promo.mp4"),
            video_player: Vec::new(),
            video_secs: 20,
            timings: Timings::default(),
        }
    }
}

impl KioskConfig {
    /// 读取 .env 与环境变量，缺失或非法时使用默认值
    pub fn from_env() -> (Self, Vec<String>) {
        let mut notes = Vec::new();
        match dotenv::dotenv() {
            Ok(path) => notes.push(format!("✓ 已加载 {}", path.display())),
            Err(_) => notes.push("⚠ 未找到 .env，使用系统环境变量".to_string()),
        }
        let cfg = Self::from_lookup(|key| std::env::var(key).ok());
        (cfg, notes)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = KioskConfig::default();
        let text = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        let timings = Timings {
            start_delay: Duration::from_millis(parse_or(
                &lookup,
                "KIOSK_START_DELAY_MS",
                d.timings.start_delay.as_millis() as u64,
            )),
            video_grace: Duration::from_millis(parse_or(
                &lookup,
                "KIOSK_VIDEO_GRACE_MS",
                d.timings.video_grace.as_millis() as u64,
            )),
            tick: d.timings.tick,
            countdown_secs: parse_or(&lookup, "KIOSK_COUNTDOWN_SECS", d.timings.countdown_secs),
            admin_taps: parse_or(&lookup, "KIOSK_ADMIN_TAPS", d.timings.admin_taps),
            admin_window: Duration::from_millis(parse_or(
                &lookup,
                "KIOSK_ADMIN_WINDOW_MS",
                d.timings.admin_window.as_millis() as u64,
            )),
        };

        KioskConfig {
            database_url: text("DATABASE_URL", d.database_url),
            export_passphrase: text("KIOSK_EXPORT_PASSPHRASE", d.export_passphrase),
            export_dir: PathBuf::from(text(
                "KIOSK_EXPORT_DIR",
                d.export_dir.display().to_string(),
            )),
            video_path: PathBuf::from(text(
                "KIOSK_VIDEO_PATH",
                d.video_path.display().to_string(),
            )),
            video_player: lookup("KIOSK_VIDEO_PLAYER")
                .map(|raw| crate::media::parse_player_command(&raw))
                .unwrap_or_default(),
            video_secs: parse_or(&lookup, "KIOSK_VIDEO_SECS", d.video_secs),
            timings,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Debug,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!("{}={} 无法解析，使用默认值 {:?}", key, raw, default);
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = KioskConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg.database_url, "sqlite://kiosk.db?mode=rwc");
        assert_eq!(cfg.timings, Timings::default());
        assert!(cfg.video_player.is_empty());
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = KioskConfig::from_lookup(lookup(&[
            ("KIOSK_EXPORT_PASSPHRASE", " booth-2026 "),
            ("KIOSK_COUNTDOWN_SECS", "10"),
            ("KIOSK_VIDEO_GRACE_MS", "500"),
            ("KIOSK_VIDEO_PLAYER", "mpv --fs"),
        ]));
        assert_eq!(cfg.export_passphrase, "booth-2026");
        assert_eq!(cfg.timings.countdown_secs, 10);
        assert_eq!(cfg.timings.video_grace, Duration::from_millis(500));
        assert_eq!(cfg.video_player, vec!["mpv", "--fs"]);
    }

    #[test]
    fn invalid_numbers_fall_back() {
        let cfg = KioskConfig::from_lookup(lookup(&[
            ("KIOSK_COUNTDOWN_SECS", "seven"),
            ("KIOSK_ADMIN_TAPS", "-1"),
            ("DATABASE_URL", "   "),
        ]));
        assert_eq!(cfg.timings.countdown_secs, 7);
        assert_eq!(cfg.timings.admin_taps, 5);
        assert_eq!(cfg.database_url, "sqlite://kiosk.db?mode=rwc");
    }
}
