use std::time::Duration;

use chrono::Utc;
use log::{error, info};
use reqwest::{Client, header};
use serde::Deserialize;

use super::protocol;
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};

/// Голос из удалённого списка провайдера
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RemoteVoice {
    pub name: String,
    pub short_name: String,
    pub gender: String,
    pub locale: String,
    #[serde(default)]
    pub friendly_name: String,
}

/// Загружает список голосов; `locale` фильтрует по префиксу без учёта регистра
pub async fn list_voices(config: &AppConfig, locale: Option<&str>) -> AppResult<Vec<RemoteVoice>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.receive_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .build()?;

    let url = protocol::voices_url(&config.voices_endpoint, Utc::now());
    info!("Fetching voice list from {}", config.voices_endpoint);

    let response = client
        .get(url)
        .header(header::USER_AGENT, protocol::user_agent())
        .header(header::ACCEPT, "*/*")
        .header(header::ORIGIN, protocol::ORIGIN)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("Voice list request failed (status {}): {}", status, body);
        return Err(AppError::ApiError(format!("voice list request failed with status {}", status)));
    }

    let voices: Vec<RemoteVoice> = response.json().await?;
    Ok(filter_by_locale(voices, locale))
}

pub fn filter_by_locale(voices: Vec<RemoteVoice>, locale: Option<&str>) -> Vec<RemoteVoice> {
    match locale {
        Some(prefix) => {
            let prefix = prefix.to_lowercase();
            voices
                .into_iter()
                .filter(|voice| voice.locale.to_lowercase().starts_with(&prefix))
                .collect()
        }
        None => voices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "Name": "Microsoft Server Speech Text to Speech Voice (en-US, AriaNeural)",
            "ShortName": "en-US-AriaNeural",
            "Gender": "Female",
            "Locale": "en-US",
            "SuggestedCodec": "audio-24khz-48kbitrate-mono-mp3",
            "FriendlyName": "Microsoft Aria Online (Natural) - English (United States)",
            "Status": "GA"
        },
        {
            "Name": "Microsoft Server Speech Text to Speech Voice (fr-FR, HenriNeural)",
            "ShortName": "fr-FR-HenriNeural",
            "Gender": "Male",
            "Locale": "fr-FR"
        }
    ]"#;

    #[test]
    fn test_deserialize_voice_list() {
        let voices: Vec<RemoteVoice> = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].short_name, "en-US-AriaNeural");
        assert_eq!(voices[1].friendly_name, "");
    }

    #[test]
    fn test_filter_by_locale() {
        let voices: Vec<RemoteVoice> = serde_json::from_str(SAMPLE).unwrap();

        let french = filter_by_locale(voices.clone(), Some("FR"));
        assert_eq!(french.len(), 1);
        assert_eq!(french[0].gender, "Male");

        assert_eq!(filter_by_locale(voices, None).len(), 2);
    }
}
