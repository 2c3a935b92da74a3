use std::io::IsTerminal;

use chrono::Utc;
use fern::colors::{Color, ColoredLevelConfig};
use fern::Dispatch;
use log::LevelFilter;

/// Sends log records to stderr; stdout carries rendered markup.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let colored = std::io::stderr().is_terminal();
    let colors = ColoredLevelConfig::new()
        .trace(Color::Magenta)
        .debug(Color::Blue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    Dispatch::new()
        .level(level)
        // eframe's backends are chatty at debug
        .level_for("winit", LevelFilter::Warn)
        .level_for("wgpu_core", LevelFilter::Warn)
        .level_for("eframe", LevelFilter::Info)
        .format(move |out, message, record| {
            let level = if colored {
                colors.color(record.level()).to_string()
            } else {
                record.level().to_string()
            };
            out.finish(format_args!(
                "[{date} - {level}] {message} [{target}]",
                date = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                level = level,
                message = message,
                target = record.target(),
            ))
        })
        .chain(std::io::stderr())
        .apply()
}
