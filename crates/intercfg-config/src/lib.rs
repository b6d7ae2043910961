//! Configuration for the `intercfg` terminal UI.
//!
//! Layered with figment: built-in defaults, then the TOML file at the
//! platform config directory, then `INTERCFG_*` environment variables
//! (nested keys split on `__`, e.g. `INTERCFG_UI__TICK_RATE_MS=100`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Terminal loop timing and screen defaults.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UiConfig {
    #[serde(default = "default_tick_rate_ms")]
    pub tick_rate_ms: u64,

    #[serde(default = "default_render_rate_ms")]
    pub render_rate_ms: u64,

    /// Screen shown at startup (e.g. "ModeSelection", "DiagnosticMain").
    #[serde(default = "default_initial_screen")]
    pub initial_screen: String,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate_ms(),
            render_rate_ms: default_render_rate_ms(),
            initial_screen: default_initial_screen(),
            page_size: default_page_size(),
        }
    }
}

impl UiConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }

    pub fn render_rate(&self) -> Duration {
        Duration::from_millis(self.render_rate_ms)
    }
}

fn default_tick_rate_ms() -> u64 {
    250
}
fn default_render_rate_ms() -> u64 {
    33
}
fn default_initial_screen() -> String {
    "ModeSelection".into()
}
fn default_page_size() -> usize {
    20
}

/// Knobs for the simulated hardware.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Fixed RNG seed. Unset means a fresh seed per run.
    pub seed: Option<u64>,

    #[serde(default = "default_nfc_read_delay_ms")]
    pub nfc_read_delay_ms: u64,

    #[serde(default = "default_nfc_success_ratio")]
    pub nfc_success_ratio: f64,

    #[serde(default = "default_port_available_ratio")]
    pub port_available_ratio: f64,

    #[serde(default = "default_port_disconnected_ratio")]
    pub port_disconnected_ratio: f64,

    #[serde(default = "default_configure_duration_ms")]
    pub configure_duration_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            nfc_read_delay_ms: default_nfc_read_delay_ms(),
            nfc_success_ratio: default_nfc_success_ratio(),
            port_available_ratio: default_port_available_ratio(),
            port_disconnected_ratio: default_port_disconnected_ratio(),
            configure_duration_ms: default_configure_duration_ms(),
        }
    }
}

impl SimulationConfig {
    pub fn nfc_read_delay(&self) -> Duration {
        Duration::from_millis(self.nfc_read_delay_ms)
    }

    pub fn configure_duration(&self) -> Duration {
        Duration::from_millis(self.configure_duration_ms)
    }
}

fn default_nfc_read_delay_ms() -> u64 {
    2000
}
fn default_nfc_success_ratio() -> f64 {
    0.7
}
fn default_port_available_ratio() -> f64 {
    0.7
}
fn default_port_disconnected_ratio() -> f64 {
    0.2
}
fn default_configure_duration_ms() -> u64 {
    3000
}

impl Config {
    /// Reject values the UI cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratios = [
            ("simulation.nfc_success_ratio", self.simulation.nfc_success_ratio),
            ("simulation.port_available_ratio", self.simulation.port_available_ratio),
            (
                "simulation.port_disconnected_ratio",
                self.simulation.port_disconnected_ratio,
            ),
        ];
        for (field, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Validation {
                    field: field.into(),
                    reason: format!("expected a value between 0.0 and 1.0, got {value}"),
                });
            }
        }
        if self.ui.tick_rate_ms == 0 || self.ui.render_rate_ms == 0 {
            return Err(ConfigError::Validation {
                field: "ui".into(),
                reason: "tick and render rates must be positive".into(),
            });
        }
        if self.ui.page_size == 0 {
            return Err(ConfigError::Validation {
                field: "ui.page_size".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "intercfg", "intercfg").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("intercfg");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is not an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("INTERCFG_").split("__"));

    let config: Config = figment.extract()?;
    config.validate()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.ui.initial_screen, "ModeSelection");
        assert_eq!(cfg.ui.tick_rate(), Duration::from_millis(250));
        assert_eq!(cfg.simulation.nfc_read_delay(), Duration::from_secs(2));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.ui, UiConfig::default());
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[ui]\ninitial_screen = \"DiagnosticMain\"\npage_size = 10\n\n[simulation]\nseed = 42\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.ui.initial_screen, "DiagnosticMain");
        assert_eq!(cfg.ui.page_size, 10);
        assert_eq!(cfg.ui.render_rate_ms, 33);
        assert_eq!(cfg.simulation.seed, Some(42));
    }

    #[test]
    fn out_of_range_ratio_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[simulation]\nnfc_success_ratio = 1.5\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "simulation.nfc_success_ratio"));
    }

    #[test]
    fn save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.simulation.seed = Some(7);
        cfg.ui.tick_rate_ms = 100;

        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }
}
