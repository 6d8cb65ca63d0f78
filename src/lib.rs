//! # tts-pro
//!
//! Озвучивание текста нейронными голосами Microsoft Edge: воспроизведение через
//! звуковое устройство или экспорт в MP3. Стиль речи можно выбрать вручную или
//! определить автоматически по ключевым словам.

pub mod commands;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

pub use errors::{AppError, AppResult};
pub use session::Session;
