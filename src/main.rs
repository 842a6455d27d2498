use clap::Parser;
use std::sync::Arc;
use timetable_admin::app::commands;
use timetable_admin::core::ConfigProvider;
use timetable_admin::utils::{logger, validation::Validate};
use timetable_admin::{CliConfig, HttpStore, SchedulerError, TomlConfig};

fn fail(e: &SchedulerError) -> ! {
    tracing::error!("❌ {} (category: {:?})", e, e.category());
    eprintln!("❌ {}", e);
    std::process::exit(e.exit_code());
}

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    let file_config = match cli.config.as_ref().map(TomlConfig::from_file).transpose() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    };

    let level = if cli.verbose {
        "debug"
    } else {
        file_config
            .as_ref()
            .and_then(TomlConfig::log_level)
            .unwrap_or("info")
    };
    if cli.json_logs || file_config.as_ref().is_some_and(TomlConfig::json_logs) {
        logger::init_json_logger(level);
    } else {
        logger::init_cli_logger(level);
    }

    let settings: &dyn ConfigProvider = match file_config.as_ref() {
        Some(config) => {
            if let Err(e) = config.validate() {
                fail(&e);
            }
            config
        }
        None => {
            if let Err(e) = cli.validate() {
                fail(&e);
            }
            &cli
        }
    };
    tracing::debug!("Using API at {}", settings.api_base_url());

    let store = match HttpStore::from_config(settings) {
        Ok(store) => Arc::new(store),
        Err(e) => fail(&e),
    };

    match commands::execute(&cli.command, store, settings.grid_settings()).await {
        Ok(output) => print!("{}", output),
        Err(e) => fail(&e),
    }
}
