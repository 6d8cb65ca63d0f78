use std::path::{Path, PathBuf};

use crate::config::{AppConfig, DEFAULT_CONFIG_FILE, save_config};
use crate::errors::AppResult;

/// Текущая конфигурация в виде JSON
pub fn show_config(config: &AppConfig) -> AppResult<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

/// Записывает конфигурацию по умолчанию и возвращает путь к файлу
pub fn init_config(path: Option<&Path>, force: bool) -> AppResult<PathBuf> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    save_config(&path, &AppConfig::default(), force)?;
    Ok(path)
}
