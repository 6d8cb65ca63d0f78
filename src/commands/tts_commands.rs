use std::path::Path;
use std::thread::JoinHandle;

use log::info;

use crate::errors::AppResult;
use crate::models::{SpeechStyle, SynthesisRequest, SynthesisResult};
use crate::services::audio::{AudioPlayer, play_in_background, save_audio};
use crate::services::tts::{Emotion, TtsService, detect_emotion, synthesize_with_fallback};
use crate::session::Session;

/// Синтезирует текст сессии; возвращает запрос, аудио и реально применённый стиль
async fn synthesize_session(
    service: &dyn TtsService,
    session: &Session,
) -> AppResult<(SynthesisRequest, Vec<u8>, Option<SpeechStyle>)> {
    let request = session.request()?;
    let (audio, style) = synthesize_with_fallback(service, &request).await?;
    Ok((request, audio, style))
}

/// Speak (Play): синтез и воспроизведение в фоне
pub async fn speak_text<P: AudioPlayer>(
    service: &dyn TtsService,
    session: &Session,
    player: P,
) -> AppResult<JoinHandle<AppResult<()>>> {
    let (request, audio, _) = synthesize_session(service, session).await?;
    info!("Playing {} bytes spoken by {}", audio.len(), request.voice_id);
    play_in_background(player, &audio)
}

/// Save Audio: синтез и сохранение в файл
pub async fn save_text(
    service: &dyn TtsService,
    session: &Session,
    output: &Path,
) -> AppResult<SynthesisResult> {
    let (request, audio, style) = synthesize_session(service, session).await?;
    save_audio(&audio, output, &request.voice_id, style).await
}

/// Эмоция, которую выбрал бы режим "Auto Detect"
pub fn detect(text: &str) -> Emotion {
    detect_emotion(text)
}

pub fn describe_saved(result: &SynthesisResult) -> String {
    let mut message = format!("Audio saved as {}", result.audio_path.display());
    if let Some(duration) = result.duration {
        message.push_str(&format!(" ({:.1}s)", duration));
    }
    if let Some(style) = result.style {
        message.push_str(&format!(" [style: {}]", style));
    }
    message
}
