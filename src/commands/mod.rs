// User actions: speak, save, voice listing, emotion detection, config and the REPL
pub mod config_commands;
pub mod repl;
pub mod tts_commands;
pub mod voice_commands;

pub use config_commands::*;
pub use repl::run_repl;
pub use tts_commands::*;
pub use voice_commands::*;

use crate::errors::{AppError, AppResult};
use crate::session::Session;

/// Переопределения выбора из командной строки поверх конфигурации
#[derive(Debug, Clone, Default)]
pub struct SessionOverrides {
    pub language: Option<String>,
    pub gender: Option<String>,
    pub voice: Option<String>,
    pub speed: Option<i32>,
    pub style: Option<String>,
}

impl SessionOverrides {
    /// Порядок важен: язык и пол сбрасывают голос
    pub fn apply(&self, session: &mut Session) -> AppResult<()> {
        if let Some(language) = &self.language {
            session.set_language(language);
        }
        if let Some(gender) = &self.gender {
            session.set_gender(gender.parse()?);
        }
        if let Some(voice) = &self.voice {
            session.set_voice(voice)?;
        }
        if let Some(speed) = self.speed {
            session.set_speed(speed);
        }
        if let Some(style) = &self.style {
            session.set_style(style.parse()?);
        }
        Ok(())
    }
}

/// Сообщение пользователю для ошибки действия верхнего уровня
pub fn user_message(err: &AppError) -> String {
    if err.is_warning() {
        format!("Warning: {}", err)
    } else {
        format!("Error: {}", err)
    }
}
