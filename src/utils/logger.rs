use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

const DEFAULT_FILTER: &str = "warn,tts_pro=info";

pub fn init_logger(verbose: bool) {
    // RUST_LOG имеет приоритет над фильтром по умолчанию
    let env = Env::default().filter_or("RUST_LOG", DEFAULT_FILTER);

    let mut builder = Builder::from_env(env);

    // Явно подавляем логи от шумных модулей
    builder
        .filter_module("tungstenite", LevelFilter::Warn)
        .filter_module("tokio_tungstenite", LevelFilter::Warn)
        .filter_module("native_tls", LevelFilter::Error)
        .filter_module("hyper", LevelFilter::Error)
        .filter_module("reqwest", LevelFilter::Warn)
        .filter_module("symphonia_core", LevelFilter::Error)
        .filter_module("symphonia_bundle_mp3", LevelFilter::Error)
        .filter_module("cpal", LevelFilter::Error)
        .filter_module("rodio", LevelFilter::Warn);

    if verbose {
        builder.filter_module("tts_pro", LevelFilter::Debug);
    }

    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        // stdout занят выводом команд
        .target(env_logger::Target::Stderr);

    // Повторная инициализация (например, в тестах) не считается ошибкой
    let _ = builder.try_init();
}
