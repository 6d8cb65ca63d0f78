//! Автоопределение эмоции по ключевым словам.

use std::fmt;

use crate::models::SpeechStyle;

/// Метка, которую возвращает классификатор
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emotion {
    Neutral,
    Cheerful,
    Sad,
    Angry,
    Newscast,
}

impl Emotion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Cheerful => "cheerful",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Newscast => "newscast",
        }
    }

    /// Стиль для провайдера; нейтральная речь идёт без стиля
    pub fn style(&self) -> Option<SpeechStyle> {
        match self {
            Emotion::Neutral => None,
            Emotion::Cheerful => Some(SpeechStyle::Cheerful),
            Emotion::Sad => Some(SpeechStyle::Sad),
            Emotion::Angry => Some(SpeechStyle::Angry),
            Emotion::Newscast => Some(SpeechStyle::Newscast),
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Порядок групп задаёт приоритет
const KEYWORD_GROUPS: &[(Emotion, &[&str])] = &[
    (
        Emotion::Cheerful,
        &["happy", "great", "amazing", "wonderful", "joy", "excited", "love"],
    ),
    (
        Emotion::Sad,
        &["sad", "sorry", "pain", "loss", "cry", "alone", "depressed"],
    ),
    (
        Emotion::Angry,
        &["angry", "hate", "mad", "fight", "shout", "furious", "annoyed"],
    ),
    (
        Emotion::Newscast,
        &["news", "breaking", "headline", "report", "update", "announce"],
    ),
];

/// Возвращает эмоцию первой совпавшей группы или `Neutral`.
///
/// Совпадение ищется как подстрока в тексте, приведённом к нижнему регистру.
pub fn detect_emotion(text: &str) -> Emotion {
    let lower = text.to_lowercase();
    KEYWORD_GROUPS
        .iter()
        .find(|(_, words)| words.iter().any(|word| lower.contains(word)))
        .map(|(emotion, _)| *emotion)
        .unwrap_or(Emotion::Neutral)
}
