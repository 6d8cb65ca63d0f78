// Configuration module
// Defaults for the session and the speech service, stored as JSON

use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

pub const DEFAULT_CONFIG_FILE: &str = "tts-pro.json";
pub const CONFIG_ENV: &str = "TTS_PRO_CONFIG";

pub const EDGE_ENDPOINT: &str =
    "wss://speech.platform.bing.com/consumer/speech/synthesize/readaloud/edge/v1";
pub const EDGE_VOICES_ENDPOINT: &str =
    "https://speech.platform.bing.com/consumer/speech/synthesize/readaloud/voices/list";
pub const DEFAULT_OUTPUT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Язык из каталога голосов
    pub language: String,
    /// "Male" или "Female"
    pub gender: String,
    /// Отображаемое имя голоса; `None` означает первый голос в списке
    pub voice: Option<String>,
    /// Изменение скорости речи в процентах (-50..=50)
    pub speed: i32,
    /// "Default", "Auto Detect" или имя стиля
    pub style: String,
    pub output_format: String,
    pub endpoint: String,
    pub voices_endpoint: String,
    pub connect_timeout_secs: u64,
    pub receive_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            language: "English (US)".to_string(),
            gender: "Male".to_string(),
            voice: None,
            speed: 0,
            style: "Default".to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            endpoint: EDGE_ENDPOINT.to_string(),
            voices_endpoint: EDGE_VOICES_ENDPOINT.to_string(),
            connect_timeout_secs: 10,
            receive_timeout_secs: 60,
        }
    }
}

/// Путь к конфигурации: явный путь, иначе `TTS_PRO_CONFIG` (разбирается clap),
/// иначе `tts-pro.json` в текущей директории, если он существует.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}

// Загрузка конфигурации; отсутствие файла по умолчанию не ошибка
pub fn load_config(path: Option<&Path>) -> AppResult<AppConfig> {
    let Some(path) = path else {
        debug!("No config file, using defaults");
        return Ok(AppConfig::default());
    };

    let contents = std::fs::read_to_string(path).map_err(|e| {
        AppError::ConfigurationError(format!("Failed to read {}: {}", path.display(), e))
    })?;

    let config: AppConfig = serde_json::from_str(&contents).map_err(|e| {
        AppError::ConfigurationError(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    info!("Loaded config from {}", path.display());
    config.validate()?;
    Ok(config)
}

// Сохранение конфигурации
pub fn save_config(path: &Path, config: &AppConfig, force: bool) -> AppResult<()> {
    if path.exists() && !force {
        return Err(AppError::ConfigurationError(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json + "\n")?;
    info!("Wrote config to {}", path.display());
    Ok(())
}

impl AppConfig {
    pub fn validate(&self) -> AppResult<()> {
        if self.connect_timeout_secs == 0 || self.receive_timeout_secs == 0 {
            return Err(AppError::ConfigurationError(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if !(self.endpoint.starts_with("wss://") || self.endpoint.starts_with("ws://")) {
            return Err(AppError::ConfigurationError(format!(
                "endpoint must be a websocket URL: {}",
                self.endpoint
            )));
        }
        Ok(())
    }
}
