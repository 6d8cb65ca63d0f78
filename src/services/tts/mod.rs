// TTS services module
// Voice catalog, emotion detection and the speech provider client

use log::warn;

pub mod catalog;
pub mod edge;
pub mod emotion;

pub use edge::EdgeTtsClient;
pub use emotion::{Emotion, detect_emotion};

use crate::config::AppConfig;
use crate::errors::AppResult;
use crate::models::{SpeechStyle, SynthesisRequest};

/// Trait that all TTS services must implement
#[async_trait::async_trait]
pub trait TtsService: Send + Sync {
    /// Synthesize the request and return MP3 bytes
    async fn synthesize(&self, request: &SynthesisRequest) -> AppResult<Vec<u8>>;
}

/// Get the TTS service for the given configuration
pub fn get_tts_service(config: &AppConfig) -> AppResult<Box<dyn TtsService>> {
    config.validate()?;
    Ok(Box::new(EdgeTtsClient::new(config)))
}

/// Синтез со стилем; если провайдер отказал, одна повторная попытка без стиля.
///
/// Возвращает аудио и стиль, с которым синтез реально прошёл.
pub async fn synthesize_with_fallback(
    service: &dyn TtsService,
    request: &SynthesisRequest,
) -> AppResult<(Vec<u8>, Option<SpeechStyle>)> {
    match service.synthesize(request).await {
        Ok(audio) => Ok((audio, request.style)),
        Err(e) => match request.style {
            Some(style) => {
                warn!("Synthesis with style '{}' failed ({}), retrying without style", style, e);
                let audio = service.synthesize(&request.without_style()).await?;
                Ok((audio, None))
            }
            None => Err(e),
        },
    }
}
