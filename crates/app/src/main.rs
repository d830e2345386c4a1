mod render;
mod shell;

use std::sync::Arc;
use std::{fs, path::Path};

use api_client::HttpLegalApi;
use config::{AppConfig, ConfigStore};
use i18n::I18n;
use shell::{ConsoleNotifier, Shell};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let mut data_dir = dirs::data_local_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    data_dir.push("batas");
    if let Err(err) = fs::create_dir_all(&data_dir) {
        eprintln!("failed to prepare data dir: {err}");
    }
    let _log_guard = init_local_logger(&data_dir.join("logs"));

    let loaded = ConfigStore::from_default_location().and_then(|store| store.load_or_init());
    let mut config = match loaded {
        Ok(cfg) => cfg,
        Err(err) => {
            error!("failed to load config: {err:#}");
            AppConfig::default()
        }
    };
    config.apply_env_overrides();

    let api = match HttpLegalApi::new(&config.api) {
        Ok(api) => Arc::new(api),
        Err(err) => {
            error!("failed to create api client: {err:#}");
            eprintln!("failed to create api client: {err:#}");
            return;
        }
    };
    info!(api_root = api.api_root(), timeout_ms = config.api.timeout_ms, "backend configured");

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(err) => {
            eprintln!("failed to create tokio runtime: {err}");
            return;
        }
    };

    let shell = Shell::new(I18n::new(config.language), api, Arc::new(ConsoleNotifier));
    if let Err(err) = runtime.block_on(shell.run()) {
        error!("shell exited with error: {err:#}");
        eprintln!("{err:#}");
    }
}

fn init_local_logger(log_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    if let Err(err) = fs::create_dir_all(log_dir) {
        eprintln!("failed to create log dir `{}`: {err}", log_dir.display());
    }
    let file_appender = tracing_appender::rolling::daily(log_dir, "batas.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,batas=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_writer(writer)
        .init();

    guard
}
