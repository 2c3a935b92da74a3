mod app;
mod cli;
mod config;
mod error;
mod fetcher;
mod html_text;
mod logger;
mod markup;
mod model;
mod pipeline;
mod preview;
mod time_ago;

use std::io::Read;
use std::process::ExitCode;
use std::sync::Arc;

use chrono::Utc;
use log::{error, warn};

use crate::cli::{Attributes, Command};
use crate::config::Settings;
use crate::error::ConfigError;
use crate::fetcher::RestClient;
use crate::model::DisplayConfig;

fn main() -> ExitCode {
    let args = match cli::parse_args(std::env::args()) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("\x1B[1;31merror:\x1B[0m {}\n\n{}", err, cli::USAGE);
            return ExitCode::FAILURE;
        }
    };
    if args.command == Command::Help {
        println!("{}", cli::USAGE);
        return ExitCode::SUCCESS;
    }

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("\x1B[1;31merror:\x1B[0m {}", err);
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = logger::init(settings.log_level) {
        eprintln!("Warning: could not install logger: {}", err);
    }
    let current_user = args.user.or(settings.current_user);

    let client = match RestClient::from_settings(&settings) {
        Ok(client) => client,
        Err(err) => {
            error!("could not create REST client: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match args.command {
        Command::Render(attributes) => {
            let config = load_attributes(&attributes).unwrap_or_else(|err| {
                warn!("{}; rendering with default attributes", err);
                DisplayConfig::default()
            });
            print!("{}", markup::render_block(&client, &config, current_user, Utc::now()));
            ExitCode::SUCCESS
        }
        Command::Preview => {
            let preview = preview::Preview::new(Arc::new(client), current_user);
            match app::run(app::ActivityPreviewApp::new(DisplayConfig::default(), preview)) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    error!("preview window failed: {}", err);
                    ExitCode::FAILURE
                }
            }
        }
        Command::Help => ExitCode::SUCCESS,
    }
}

fn load_attributes(attributes: &Attributes) -> Result<DisplayConfig, ConfigError> {
    let raw = match attributes {
        Attributes::Defaults => return Ok(DisplayConfig::default()),
        Attributes::Stdin => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|source| ConfigError::Io {
                    path: "<stdin>".into(),
                    source,
                })?;
            raw
        }
        Attributes::File(path) => std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?,
    };
    DisplayConfig::from_json(&raw)
}
