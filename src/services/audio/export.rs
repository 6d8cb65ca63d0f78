use std::path::{Path, PathBuf};

use log::{info, warn};

use super::probe::audio_duration;
use crate::errors::{AppError, AppResult};
use crate::models::{SpeechStyle, SynthesisResult};

/// Добавляет `.mp3`, если у пути нет расширения
pub fn with_mp3_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("mp3")
    }
}

/// Сохраняет аудио по выбранному пользователем пути; файл остаётся на диске
pub async fn save_audio(
    audio: &[u8],
    path: &Path,
    voice_id: &str,
    style: Option<SpeechStyle>,
) -> AppResult<SynthesisResult> {
    let audio_path = with_mp3_extension(path);

    if let Some(parent) = audio_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.is_dir() {
            return Err(AppError::InvalidArgument(format!(
                "directory does not exist: {}",
                parent.display()
            )));
        }
    }

    tokio::fs::write(&audio_path, audio).await?;
    info!("Saved {} bytes to {}", audio.len(), audio_path.display());

    let probe_path = audio_path.clone();
    let duration = match tokio::task::spawn_blocking(move || audio_duration(&probe_path)).await {
        Ok(Ok(seconds)) => Some(seconds),
        Ok(Err(e)) => {
            warn!("Could not determine duration of {}: {}", audio_path.display(), e);
            None
        }
        Err(e) => {
            warn!("Duration probe task failed: {}", e);
            None
        }
    };

    Ok(SynthesisResult {
        audio_path,
        duration,
        voice_id: voice_id.to_string(),
        style,
        bytes: audio.len(),
    })
}
