//! User configuration — scroll tuning and persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/tailview/config.toml` (default
//! `~/.config/tailview/config.toml`).

use std::path::PathBuf;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Duration of the smooth scroll-to-bottom animation, in ms.
    /// Zero disables the animation (instant jumps).
    pub smooth_scroll_ms: u64,
    /// Maximum number of messages kept in the live transcript.
    pub line_limit: usize,
    /// Rows scrolled per mouse-wheel notch.
    pub wheel_step: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            smooth_scroll_ms: 300,
            line_limit: 500,
            wheel_step: 3,
        }
    }
}

impl AppConfig {
    /// Load config from disk, falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        if path.exists() {
            if let Ok(contents) = std::fs::read_to_string(&path) {
                return Self::parse(&contents);
            }
        }
        Self::default()
    }

    /// Write a commented default config on first run so the keys are
    /// discoverable.  Never touches an existing file.
    pub fn ensure_on_disk(&self) -> anyhow::Result<()> {
        if config_path().exists() {
            return Ok(());
        }
        self.save()
    }

    /// Persist current config to disk.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(())
    }

    fn parse(s: &str) -> Self {
        let mut config = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "smooth_scroll_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        // Keep this bounded for predictable UX.
                        config.smooth_scroll_ms = v.min(5000);
                    }
                }
                "line_limit" => {
                    if let Ok(v) = value.parse::<usize>() {
                        config.line_limit = v.clamp(10, 100_000);
                    }
                }
                "wheel_step" => {
                    if let Ok(v) = value.parse::<usize>() {
                        config.wheel_step = v.clamp(1, 10);
                    }
                }
                _ => {}
            }
        }

        config
    }

    fn serialise(&self) -> String {
        [
            "# tailview configuration".to_string(),
            String::new(),
            "# Smooth scroll-to-bottom duration in ms (0 = instant).".to_string(),
            format!("smooth_scroll_ms = {}", self.smooth_scroll_ms),
            "# Messages kept in the live transcript.".to_string(),
            format!("line_limit = {}", self.line_limit),
            "# Rows scrolled per mouse-wheel notch.".to_string(),
            format!("wheel_step = {}", self.wheel_step),
            String::new(),
        ]
        .join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/tailview/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("tailview").join("config.toml")
}
