//! Воспроизведение синтезированного аудио в фоновом потоке.
//!
//! Каждый запрос получает собственный поток и временный файл `tts_tmp_*.mp3`.
//! Файл удаляется после окончания воспроизведения, в том числе при ошибке.
//! Потоки не отменяются и не упорядочиваются между собой.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use std::thread::JoinHandle;

use log::{debug, error, warn};
use rodio::{Decoder, OutputStream, Sink};
use tempfile::TempPath;

use crate::errors::{AppError, AppResult};

pub const TEMP_PREFIX: &str = "tts_tmp_";

/// Проигрыватель аудиофайла; блокирует поток до конца воспроизведения
pub trait AudioPlayer: Send + 'static {
    fn play_file(&self, path: &Path) -> AppResult<()>;
}

/// Проигрыватель на rodio через устройство вывода по умолчанию
#[derive(Debug, Clone, Copy, Default)]
pub struct RodioPlayer;

impl AudioPlayer for RodioPlayer {
    fn play_file(&self, path: &Path) -> AppResult<()> {
        let (_stream, handle) = OutputStream::try_default()
            .map_err(|e| AppError::PlaybackError(format!("No audio output device: {}", e)))?;
        let sink = Sink::try_new(&handle)
            .map_err(|e| AppError::PlaybackError(format!("Failed to open audio sink: {}", e)))?;

        let file = BufReader::new(File::open(path)?);
        let source = Decoder::new(file)
            .map_err(|e| AppError::PlaybackError(format!("Failed to decode audio: {}", e)))?;

        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }
}

/// Записывает аудио во временный файл, который удалится при освобождении `TempPath`
pub fn write_temp_audio(audio: &[u8]) -> AppResult<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".mp3")
        .tempfile()?;
    file.write_all(audio)?;
    file.flush()?;
    Ok(file.into_temp_path())
}

/// Запускает воспроизведение в отдельном потоке и сразу возвращает управление.
///
/// `JoinHandle` можно дождаться, если вызывающему нужно дослушать до конца.
pub fn play_in_background<P: AudioPlayer>(
    player: P,
    audio: &[u8],
) -> AppResult<JoinHandle<AppResult<()>>> {
    let temp = write_temp_audio(audio)?;
    debug!("Playing {} ({} bytes)", temp.display(), audio.len());

    let handle = std::thread::Builder::new()
        .name("tts-playback".to_string())
        .spawn(move || {
            let result = player.play_file(&temp);
            if let Err(e) = &result {
                error!("Playback failed: {}", e);
            }

            let path = temp.to_path_buf();
            match temp.close() {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
            result
        })?;

    Ok(handle)
}
