//! Источник текста для озвучивания: аргумент, файл или stdin.

use std::io::Read;
use std::path::Path;

use log::debug;

use crate::errors::{AppError, AppResult};

/// Возвращает текст из аргумента, файла или stdin (в этом порядке).
///
/// Пустой результат после `trim` считается ошибкой `EmptyText`.
pub fn resolve_text(inline: Option<&str>, file: Option<&Path>) -> AppResult<String> {
    let raw = match (inline, file) {
        (Some(_), Some(_)) => {
            return Err(AppError::InvalidArgument(
                "pass either TEXT or --file, not both".to_string(),
            ));
        }
        (Some(text), None) => text.to_string(),
        (None, Some(path)) => {
            debug!("Reading text from {}", path.display());
            std::fs::read_to_string(path)?
        }
        (None, None) => {
            debug!("Reading text from stdin");
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    non_empty(&raw)
}

/// Обрезает пробелы и отклоняет пустой текст.
pub fn non_empty(text: &str) -> AppResult<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::EmptyText);
    }
    Ok(trimmed.to_string())
}
