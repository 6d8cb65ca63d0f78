//! # Session state
//!
//! Текущий выбор пользователя: язык, пол, голос, скорость, стиль и текст.
//! Смена языка или пола обновляет список голосов и выбирает первый из них.

use std::fmt;

use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::models::{Gender, SpeechRate, SpeechStyle, StyleChoice, SynthesisRequest};
use crate::services::tts::{catalog, detect_emotion};
use crate::utils::text_input::non_empty;

/// Заглушка для комбинации без голосов
pub const NO_VOICE: &str = "-";

#[derive(Debug, Clone)]
pub struct Session {
    language: String,
    gender: Gender,
    voice: String,
    voice_options: Vec<String>,
    speed: SpeechRate,
    style: StyleChoice,
    text: String,
}

impl Default for Session {
    fn default() -> Self {
        let mut session = Self {
            language: "English (US)".to_string(),
            gender: Gender::Male,
            voice: String::new(),
            voice_options: Vec::new(),
            speed: SpeechRate::default(),
            style: StyleChoice::Default,
            text: String::new(),
        };
        session.refresh_voice_options();
        session
    }
}

impl Session {
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let mut session = Self::default();
        session.set_language(&config.language);
        session.set_gender(config.gender.parse()?);
        if let Some(voice) = &config.voice {
            session.set_voice(voice)?;
        }
        session.set_speed(config.speed);
        session.set_style(config.style.parse()?);
        Ok(session)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn voice_options(&self) -> &[String] {
        &self.voice_options
    }

    pub fn speed(&self) -> SpeechRate {
        self.speed
    }

    pub fn style(&self) -> StyleChoice {
        self.style
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Неизвестный язык допускается, но тогда список голосов состоит из `-`
    pub fn set_language(&mut self, language: &str) {
        self.language = catalog::language(language)
            .map(|entry| entry.name.to_string())
            .unwrap_or_else(|| language.trim().to_string());
        self.refresh_voice_options();
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.gender = gender;
        self.refresh_voice_options();
    }

    pub fn set_voice(&mut self, name: &str) -> AppResult<()> {
        let option = self
            .voice_options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| {
                AppError::UnknownVoice(format!(
                    "'{}' is not available for {} / {} (choose from: {})",
                    name,
                    self.language,
                    self.gender,
                    self.voice_options.join(", ")
                ))
            })?;
        self.voice = option.clone();
        Ok(())
    }

    pub fn set_speed(&mut self, percent: i32) {
        self.speed = SpeechRate::new(percent);
    }

    pub fn set_style(&mut self, style: StyleChoice) {
        self.style = style;
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    pub fn clear_text(&mut self) {
        self.text.clear();
    }

    fn refresh_voice_options(&mut self) {
        let voices = catalog::voices(&self.language, self.gender);
        self.voice_options = if voices.is_empty() {
            vec![NO_VOICE.to_string()]
        } else {
            voices.into_iter().map(str::to_string).collect()
        };
        self.voice = self.voice_options[0].clone();
    }

    /// Стиль для текущего текста; `Auto` решает классификатор
    pub fn resolved_style(&self) -> Option<SpeechStyle> {
        match self.style {
            StyleChoice::Default => None,
            StyleChoice::Auto => detect_emotion(&self.text).style(),
            StyleChoice::Explicit(style) => Some(style),
        }
    }

    /// Собирает запрос на синтез из текущего состояния
    pub fn request(&self) -> AppResult<SynthesisRequest> {
        let text = non_empty(&self.text)?;
        let voice_id = catalog::resolve(&self.language, self.gender, &self.voice)?;

        Ok(SynthesisRequest {
            text,
            voice_id: voice_id.to_string(),
            rate: self.speed,
            style: self.resolved_style(),
        })
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Language: {} | Gender: {} | Voice: {} | Speed: {} | Emotion: {}",
            self.language, self.gender, self.voice, self.speed, self.style
        )
    }
}
