use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::models::Gender;
use crate::services::tts::catalog;
use crate::services::tts::edge::voices::{RemoteVoice, list_voices};

/// Строки каталога: `язык / пол / имя -> идентификатор`, с необязательными фильтрами
pub fn catalog_lines(language: Option<&str>, gender: Option<Gender>) -> AppResult<Vec<String>> {
    let entries: Vec<&catalog::LanguageEntry> = match language {
        Some(name) => vec![catalog::language(name).ok_or_else(|| {
            AppError::InvalidArgument(format!(
                "unknown language '{}' (choose from: {})",
                name,
                catalog::languages().join(", ")
            ))
        })?],
        None => catalog::CATALOG.iter().collect(),
    };

    let genders: Vec<Gender> = match gender {
        Some(gender) => vec![gender],
        None => Gender::all().to_vec(),
    };

    let mut lines = Vec::new();
    for entry in entries {
        for gender in &genders {
            for (name, id) in entry.voices(*gender) {
                lines.push(format!("{} / {} / {} -> {}", entry.name, gender, name, id));
            }
        }
    }
    Ok(lines)
}

pub async fn remote_lines(config: &AppConfig, locale: Option<&str>) -> AppResult<Vec<String>> {
    let voices = list_voices(config, locale).await?;
    Ok(voices.iter().map(remote_line).collect())
}

fn remote_line(voice: &RemoteVoice) -> String {
    let marker = if catalog::find_by_id(&voice.short_name).is_some() {
        "*"
    } else {
        " "
    };
    format!("{} {} ({}, {})", marker, voice.short_name, voice.locale, voice.gender)
}
