use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Пол голоса в каталоге
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }

    pub fn all() -> [Gender; 2] {
        [Gender::Male, Gender::Female]
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            other => Err(AppError::InvalidArgument(format!("unknown gender: {}", other))),
        }
    }
}

/// Стиль речи, который понимает провайдер (`mstts:express-as`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SpeechStyle {
    Cheerful,
    Sad,
    Angry,
    Whispering,
    Chat,
    Newscast,
}

impl SpeechStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechStyle::Cheerful => "cheerful",
            SpeechStyle::Sad => "sad",
            SpeechStyle::Angry => "angry",
            SpeechStyle::Whispering => "whispering",
            SpeechStyle::Chat => "chat",
            SpeechStyle::Newscast => "newscast",
        }
    }

    pub fn all() -> [SpeechStyle; 6] {
        [
            SpeechStyle::Cheerful,
            SpeechStyle::Sad,
            SpeechStyle::Angry,
            SpeechStyle::Whispering,
            SpeechStyle::Chat,
            SpeechStyle::Newscast,
        ]
    }
}

impl fmt::Display for SpeechStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Выбор стиля пользователем: без стиля, автоопределение или конкретный стиль
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StyleChoice {
    #[default]
    Default,
    Auto,
    Explicit(SpeechStyle),
}

impl StyleChoice {
    /// Варианты в том порядке, в каком их показывает меню
    pub fn labels() -> Vec<String> {
        let mut labels = vec!["Default".to_string(), "Auto Detect".to_string()];
        labels.extend(SpeechStyle::all().iter().map(|s| s.as_str().to_string()));
        labels
    }
}

impl fmt::Display for StyleChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleChoice::Default => f.write_str("Default"),
            StyleChoice::Auto => f.write_str("Auto Detect"),
            StyleChoice::Explicit(style) => f.write_str(style.as_str()),
        }
    }
}

impl FromStr for StyleChoice {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "" | "default" | "none" | "neutral" => Ok(StyleChoice::Default),
            "auto" | "auto detect" | "auto-detect" => Ok(StyleChoice::Auto),
            other => SpeechStyle::all()
                .into_iter()
                .find(|style| style.as_str() == other)
                .map(StyleChoice::Explicit)
                .ok_or_else(|| AppError::InvalidArgument(format!("unknown style: {}", s.trim()))),
        }
    }
}

/// Изменение скорости речи в процентах, ограниченное диапазоном ползунка
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeechRate(i32);

impl SpeechRate {
    pub const MIN: i32 = -50;
    pub const MAX: i32 = 50;

    pub fn new(percent: i32) -> Self {
        Self(percent.clamp(Self::MIN, Self::MAX))
    }

    pub fn percent(&self) -> i32 {
        self.0
    }
}

// "+N%" для N >= 0, "-N%" иначе
impl fmt::Display for SpeechRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 0 {
            write!(f, "+{}%", self.0)
        } else {
            write!(f, "{}%", self.0)
        }
    }
}

/// Запрос на синтез речи; создаётся на каждое действие пользователя
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    /// Идентификатор голоса провайдера, например `en-US-GuyNeural`
    pub voice_id: String,
    pub rate: SpeechRate,
    /// `None` означает нейтральную речь
    pub style: Option<SpeechStyle>,
}

impl SynthesisRequest {
    pub fn without_style(&self) -> Self {
        Self {
            style: None,
            ..self.clone()
        }
    }
}

/// Результат синтеза, записанного в файл
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisResult {
    pub audio_path: PathBuf,
    /// Длительность аудио в секундах, если её удалось определить
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub voice_id: String,
    /// Стиль, с которым реально прошёл синтез
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<SpeechStyle>,
    pub bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_formatting() {
        assert_eq!(SpeechRate::new(0).to_string(), "+0%");
        assert_eq!(SpeechRate::new(25).to_string(), "+25%");
        assert_eq!(SpeechRate::new(-10).to_string(), "-10%");
    }

    #[test]
    fn test_rate_is_clamped() {
        assert_eq!(SpeechRate::new(80).percent(), 50);
        assert_eq!(SpeechRate::new(-300).to_string(), "-50%");
    }

    #[test]
    fn test_style_choice_parsing() {
        assert_eq!("Default".parse::<StyleChoice>().unwrap(), StyleChoice::Default);
        assert_eq!("Auto Detect".parse::<StyleChoice>().unwrap(), StyleChoice::Auto);
        assert_eq!("auto".parse::<StyleChoice>().unwrap(), StyleChoice::Auto);
        assert_eq!(
            "Whispering".parse::<StyleChoice>().unwrap(),
            StyleChoice::Explicit(SpeechStyle::Whispering)
        );
        assert!("excited".parse::<StyleChoice>().is_err());
    }

    #[test]
    fn test_style_labels_match_menu() {
        assert_eq!(
            StyleChoice::labels(),
            vec!["Default", "Auto Detect", "cheerful", "sad", "angry", "whispering", "chat", "newscast"]
        );
    }

    #[test]
    fn test_gender_parsing() {
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(" M ".parse::<Gender>().unwrap(), Gender::Male);
        assert!("other".parse::<Gender>().is_err());
    }

    #[test]
    fn test_without_style_keeps_other_fields() {
        let request = SynthesisRequest {
            text: "hi".to_string(),
            voice_id: "en-US-AriaNeural".to_string(),
            rate: SpeechRate::new(10),
            style: Some(SpeechStyle::Chat),
        };
        let plain = request.without_style();
        assert_eq!(plain.style, None);
        assert_eq!(plain.voice_id, request.voice_id);
        assert_eq!(plain.rate, request.rate);
    }
}
