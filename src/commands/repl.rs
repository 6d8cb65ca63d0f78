//! Интерактивный режим: строка текста озвучивается сразу, команды с `:` меняют
//! выбор голоса, скорости и стиля. Воспроизведение не блокирует ввод, поэтому
//! несколько фраз могут звучать одновременно.

use std::io::Write;
use std::path::PathBuf;
use std::thread::JoinHandle;

use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::tts_commands::{describe_saved, save_text, speak_text};
use super::user_message;
use crate::errors::{AppError, AppResult};
use crate::models::StyleChoice;
use crate::services::audio::AudioPlayer;
use crate::services::tts::TtsService;
use crate::session::Session;

/// Справка по командам; список стилей берётся из `StyleChoice::labels`
pub fn help_text() -> String {
    format!(
        "Type text and press Enter to speak it. Commands:
  :lang NAME      change language (resets voice)
  :gender M|F     change gender (resets voice)
  :voice NAME     pick a voice for the current language and gender
  :speed N        speech rate change in percent, -50..50
  :style NAME     {}
  :speak          speak the current text again
  :save PATH      save the current text as MP3
  :clear          clear the current text
  :show           show the current selection
  :voices         list voices for the current language and gender
  :help           show this help
  :quit           exit",
        StyleChoice::labels().join(", ")
    )
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Text(String),
    Speak,
    Language(String),
    Gender(String),
    Voice(String),
    Speed(i32),
    Style(String),
    Save(PathBuf),
    Clear,
    Show,
    Voices,
    Help,
    Quit,
}

/// Разбирает строку ввода; пустая строка даёт `None`
pub fn parse_line(line: &str) -> AppResult<Option<ReplCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(Some(ReplCommand::Text(line.to_string())));
    };

    let (name, arg) = command
        .split_once(char::is_whitespace)
        .map(|(name, arg)| (name, arg.trim()))
        .unwrap_or((command, ""));

    let require = |what: &str| -> AppResult<String> {
        if arg.is_empty() {
            Err(AppError::InvalidArgument(format!(":{} needs {}", name, what)))
        } else {
            Ok(arg.to_string())
        }
    };

    let parsed = match name.to_lowercase().as_str() {
        "speak" | "play" => ReplCommand::Speak,
        "lang" | "language" => ReplCommand::Language(require("a language")?),
        "gender" => ReplCommand::Gender(require("a gender")?),
        "voice" => ReplCommand::Voice(require("a voice name")?),
        "speed" => {
            let value = require("a number")?;
            let speed = value
                .parse::<i32>()
                .map_err(|_| AppError::InvalidArgument(format!("not a number: {}", value)))?;
            ReplCommand::Speed(speed)
        }
        "style" | "emotion" => ReplCommand::Style(require("a style")?),
        "save" => ReplCommand::Save(PathBuf::from(require("a file path")?)),
        "clear" => ReplCommand::Clear,
        "show" => ReplCommand::Show,
        "voices" => ReplCommand::Voices,
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        other => {
            return Err(AppError::InvalidArgument(format!(
                "unknown command :{} (try :help)",
                other
            )));
        }
    };
    Ok(Some(parsed))
}

pub struct Repl<'a, P: AudioPlayer + Clone> {
    service: &'a dyn TtsService,
    session: Session,
    player: P,
    playing: Vec<JoinHandle<AppResult<()>>>,
}

impl<'a, P: AudioPlayer + Clone> Repl<'a, P> {
    pub fn new(service: &'a dyn TtsService, session: Session, player: P) -> Self {
        Self {
            service,
            session,
            player,
            playing: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Выполняет команду и возвращает текст для пользователя, если он есть
    pub async fn execute(&mut self, command: ReplCommand) -> AppResult<Option<String>> {
        match command {
            ReplCommand::Text(text) => {
                self.session.set_text(&text);
                self.speak().await?;
                Ok(None)
            }
            ReplCommand::Speak => {
                self.speak().await?;
                Ok(None)
            }
            ReplCommand::Language(language) => {
                self.session.set_language(&language);
                Ok(Some(self.session.to_string()))
            }
            ReplCommand::Gender(gender) => {
                self.session.set_gender(gender.parse()?);
                Ok(Some(self.session.to_string()))
            }
            ReplCommand::Voice(voice) => {
                self.session.set_voice(&voice)?;
                Ok(Some(self.session.to_string()))
            }
            ReplCommand::Speed(speed) => {
                self.session.set_speed(speed);
                Ok(Some(self.session.to_string()))
            }
            ReplCommand::Style(style) => {
                self.session.set_style(style.parse::<StyleChoice>()?);
                Ok(Some(self.session.to_string()))
            }
            ReplCommand::Save(path) => {
                let result = save_text(self.service, &self.session, &path).await?;
                Ok(Some(describe_saved(&result)))
            }
            ReplCommand::Clear => {
                self.session.clear_text();
                Ok(Some("Text cleared".to_string()))
            }
            ReplCommand::Show => Ok(Some(self.session.to_string())),
            ReplCommand::Voices => Ok(Some(self.session.voice_options().join(", "))),
            ReplCommand::Help => Ok(Some(help_text())),
            ReplCommand::Quit => Ok(None),
        }
    }

    async fn speak(&mut self) -> AppResult<()> {
        let handle = speak_text(self.service, &self.session, self.player.clone()).await?;
        self.playing.retain(|handle| !handle.is_finished());
        self.playing.push(handle);
        Ok(())
    }

    /// Дожидается фраз, которые ещё звучат
    pub async fn finish(self) {
        let pending: Vec<_> = self
            .playing
            .into_iter()
            .filter(|handle| !handle.is_finished())
            .collect();
        if pending.is_empty() {
            return;
        }

        debug!("Waiting for {} playback thread(s)", pending.len());
        let joined = tokio::task::spawn_blocking(move || {
            for handle in pending {
                if handle.join().is_err() {
                    warn!("Playback thread panicked");
                }
            }
        })
        .await;
        if let Err(e) = joined {
            warn!("Failed to wait for playback: {}", e);
        }
    }
}

fn prompt() {
    print!("tts> ");
    let _ = std::io::stdout().flush();
}

/// Читает команды со stdin до `:quit` или конца ввода
pub async fn run_repl<P: AudioPlayer + Clone>(
    service: &dyn TtsService,
    session: Session,
    player: P,
) -> AppResult<()> {
    let mut repl = Repl::new(service, session, player);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}", repl.session());
    println!("Type :help for commands.");
    prompt();

    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Ok(None) => {}
            Ok(Some(ReplCommand::Quit)) => break,
            Ok(Some(command)) => match repl.execute(command).await {
                Ok(Some(message)) => println!("{}", message),
                Ok(None) => {}
                Err(e) => eprintln!("{}", user_message(&e)),
            },
            Err(e) => eprintln!("{}", user_message(&e)),
        }
        prompt();
    }

    println!();
    repl.finish().await;
    Ok(())
}
