//! # Voice catalog
//!
//! Статическая таблица голосов: язык → пол → отображаемое имя → идентификатор
//! голоса провайдера. Порядок объявления сохраняется, первый элемент считается
//! значением по умолчанию.

use crate::errors::{AppError, AppResult};
use crate::models::Gender;

/// Голоса одного пола: (отображаемое имя, идентификатор провайдера)
type VoiceList = &'static [(&'static str, &'static str)];

/// Запись каталога для одного языка
#[derive(Debug)]
pub struct LanguageEntry {
    pub name: &'static str,
    pub male: VoiceList,
    pub female: VoiceList,
}

impl LanguageEntry {
    pub fn voices(&self, gender: Gender) -> VoiceList {
        match gender {
            Gender::Male => self.male,
            Gender::Female => self.female,
        }
    }
}

pub static CATALOG: &[LanguageEntry] = &[
    LanguageEntry {
        name: "English (US)",
        male: &[
            ("Guy", "en-US-GuyNeural"),
            ("Davis", "en-US-DavisNeural"),
            ("Tony", "en-US-TonyNeural"),
            ("Christopher", "en-US-ChristopherNeural"),
        ],
        female: &[
            ("Aria", "en-US-AriaNeural"),
            ("Jenny", "en-US-JennyNeural"),
            ("Amber", "en-US-AmberNeural"),
            ("Ashley", "en-US-AshleyNeural"),
            ("Michelle", "en-US-MichelleNeural"),
        ],
    },
    LanguageEntry {
        name: "English (UK)",
        male: &[
            ("Ryan", "en-GB-RyanNeural"),
            ("Thomas", "en-GB-ThomasNeural"),
            ("Oliver", "en-GB-OliverNeural"),
        ],
        female: &[("Sonia", "en-GB-SoniaNeural"), ("Libby", "en-GB-LibbyNeural")],
    },
    LanguageEntry {
        name: "Urdu (Pakistan)",
        male: &[("Asad", "ur-PK-AsadNeural")],
        female: &[("Gul", "ur-PK-GulNeural")],
    },
    LanguageEntry {
        name: "Hindi (India)",
        male: &[("Madhur", "hi-IN-MadhurNeural"), ("Aarav", "hi-IN-AaravNeural")],
        female: &[("Swara", "hi-IN-SwaraNeural"), ("Aarohi", "hi-IN-AarohiNeural")],
    },
    LanguageEntry {
        name: "Arabic (Egypt)",
        male: &[("Shakir", "ar-EG-ShakirNeural")],
        female: &[("Salma", "ar-EG-SalmaNeural")],
    },
    LanguageEntry {
        name: "Spanish (Spain)",
        male: &[("Alvaro", "es-ES-AlvaroNeural")],
        female: &[("Elvira", "es-ES-ElviraNeural")],
    },
    LanguageEntry {
        name: "French (France)",
        male: &[("Henri", "fr-FR-HenriNeural")],
        female: &[("Denise", "fr-FR-DeniseNeural")],
    },
];

/// Языки в порядке объявления
pub fn languages() -> Vec<&'static str> {
    CATALOG.iter().map(|entry| entry.name).collect()
}

/// Ищет язык без учёта регистра
pub fn language(name: &str) -> Option<&'static LanguageEntry> {
    let name = name.trim();
    CATALOG
        .iter()
        .find(|entry| entry.name.eq_ignore_ascii_case(name))
}

/// Отображаемые имена голосов; пустой список для неизвестной комбинации
pub fn voices(language_name: &str, gender: Gender) -> Vec<&'static str> {
    language(language_name)
        .map(|entry| entry.voices(gender).iter().map(|(name, _)| *name).collect())
        .unwrap_or_default()
}

/// Идентификатор голоса для языка, пола и отображаемого имени
pub fn resolve(language_name: &str, gender: Gender, voice_name: &str) -> AppResult<&'static str> {
    let entry = language(language_name)
        .ok_or_else(|| AppError::UnknownVoice(format!("unknown language '{}'", language_name)))?;

    entry
        .voices(gender)
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(voice_name.trim()))
        .map(|(_, id)| *id)
        .ok_or_else(|| {
            AppError::UnknownVoice(format!(
                "'{}' is not a {} voice for {}",
                voice_name, gender, entry.name
            ))
        })
}

/// Обратный поиск: (язык, пол, имя) по идентификатору провайдера
pub fn find_by_id(voice_id: &str) -> Option<(&'static str, Gender, &'static str)> {
    CATALOG.iter().find_map(|entry| {
        Gender::all().into_iter().find_map(|gender| {
            entry
                .voices(gender)
                .iter()
                .find(|(_, id)| *id == voice_id)
                .map(|(name, _)| (entry.name, gender, *name))
        })
    })
}
