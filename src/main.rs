use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::{debug, error};

use tts_pro::commands::{self, SessionOverrides};
use tts_pro::config::{self, AppConfig};
use tts_pro::errors::AppResult;
use tts_pro::models::{Gender, StyleChoice};
use tts_pro::services::audio::RodioPlayer;
use tts_pro::services::tts::get_tts_service;
use tts_pro::session::Session;
use tts_pro::utils::{logger, text_input};

#[derive(Parser, Debug)]
#[command(name = "tts-pro")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Natural voices, multi-language, emotions, export MP3")]
struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true, env = config::CONFIG_ENV, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Debug logging for tts-pro
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone, Default)]
struct VoiceArgs {
    /// Language, e.g. "English (US)"
    #[arg(short, long)]
    language: Option<String>,

    /// Male or Female
    #[arg(short, long)]
    gender: Option<String>,

    /// Voice display name, e.g. "Jenny"
    #[arg(short, long)]
    voice: Option<String>,

    /// Speech rate change in percent (-50..50)
    #[arg(short, long, allow_negative_numbers = true)]
    speed: Option<i32>,

    #[arg(long, help = style_help())]
    style: Option<String>,
}

fn style_help() -> String {
    format!("Speech style: {}", StyleChoice::labels().join(", "))
}

impl From<VoiceArgs> for SessionOverrides {
    fn from(args: VoiceArgs) -> Self {
        Self {
            language: args.language,
            gender: args.gender,
            voice: args.voice,
            speed: args.speed,
            style: args.style,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Synthesize text and play it
    Speak {
        /// Text to speak (stdin if omitted)
        text: Option<String>,
        /// Read the text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        voice: VoiceArgs,
    },
    /// Synthesize text and save it as MP3
    Save {
        /// Output file (".mp3" is added if there is no extension)
        #[arg(short, long)]
        output: PathBuf,
        text: Option<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        voice: VoiceArgs,
    },
    /// List voices from the built-in catalog or from the service
    Voices {
        #[arg(short, long)]
        language: Option<String>,
        #[arg(short, long)]
        gender: Option<String>,
        /// Query the provider's full voice list
        #[arg(long)]
        remote: bool,
        /// Locale prefix for --remote, e.g. "en" or "fr-FR"
        #[arg(long)]
        locale: Option<String>,
    },
    /// Show which emotion "Auto Detect" would pick
    Detect {
        text: Option<String>,
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Show or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Interactive session
    Repl {
        #[command(flatten)]
        voice: VoiceArgs,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a config file with default values
    Init {
        #[arg(long)]
        force: bool,
    },
}

fn session_for(config: &AppConfig, voice: VoiceArgs) -> AppResult<Session> {
    let mut session = Session::from_config(config)?;
    SessionOverrides::from(voice).apply(&mut session)?;
    debug!("{}", session);
    Ok(session)
}

async fn run(cli: Cli) -> AppResult<()> {
    let config_path = config::resolve_config_path(cli.config.as_deref());

    // init не должен падать из-за битого существующего файла
    if let Command::Config {
        action: ConfigAction::Init { force },
    } = &cli.command
    {
        let path = commands::init_config(config_path.as_deref(), *force)?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    let config = config::load_config(config_path.as_deref())?;

    match cli.command {
        Command::Speak { text, file, voice } => {
            let mut session = session_for(&config, voice)?;
            session.set_text(&text_input::resolve_text(text.as_deref(), file.as_deref())?);

            let service = get_tts_service(&config)?;
            let handle = commands::speak_text(service.as_ref(), &session, RodioPlayer).await?;
            // в одноразовом режиме дослушиваем до конца
            tokio::task::spawn_blocking(move || handle.join())
                .await
                .map_err(anyhow::Error::from)?
                .map_err(|_| anyhow::anyhow!("playback thread panicked"))??;
        }
        Command::Save {
            output,
            text,
            file,
            voice,
        } => {
            let mut session = session_for(&config, voice)?;
            session.set_text(&text_input::resolve_text(text.as_deref(), file.as_deref())?);

            let service = get_tts_service(&config)?;
            let result = commands::save_text(service.as_ref(), &session, &output).await?;
            println!("{}", commands::describe_saved(&result));
        }
        Command::Voices {
            language,
            gender,
            remote,
            locale,
        } => {
            let lines = if remote {
                commands::remote_lines(&config, locale.as_deref()).await?
            } else {
                let gender = gender.as_deref().map(str::parse::<Gender>).transpose()?;
                commands::catalog_lines(language.as_deref(), gender)?
            };
            for line in lines {
                println!("{}", line);
            }
        }
        Command::Detect { text, file } => {
            let text = text_input::resolve_text(text.as_deref(), file.as_deref())?;
            println!("{}", commands::detect(&text));
        }
        Command::Config { action } => match action {
            ConfigAction::Show => {
                if let Some(path) = &config_path {
                    println!("# {}", path.display());
                }
                println!("{}", commands::show_config(&config)?);
            }
            ConfigAction::Init { .. } => unreachable!("handled before loading the config"),
        },
        Command::Repl { voice } => {
            let session = session_for(&config, voice)?;
            let service = get_tts_service(&config)?;
            commands::run_repl(service.as_ref(), session, RodioPlayer).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init_logger(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.is_warning() {
                error!("{:?}", e);
            }
            eprintln!("{}", commands::user_message(&e));
            ExitCode::FAILURE
        }
    }
}
