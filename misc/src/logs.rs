use std::io::{self, IsTerminal};

use anyhow::{bail, Context, Result};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::config::{CommonConfig, PathSet};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogsConfig {
    #[serde(default = "LogsConfig::default_level")]
    pub level: String,
}

impl CommonConfig for LogsConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }

    fn complete(&mut self, _ps: &PathSet) -> Result<()> {
        match self.level.as_str() {
            "error" | "warn" | "info" | "debug" => Ok(()),
            _ => bail!("unknown log level '{}'", self.level),
        }
    }
}

impl LogsConfig {
    fn default_level() -> String {
        String::from("info")
    }

    pub fn init(&self, name: &str) -> Result<()> {
        let level = match self.level.as_str() {
            "error" => LevelFilter::Error,
            "warn" => LevelFilter::Warn,
            "info" => LevelFilter::Info,
            "debug" => LevelFilter::Debug,
            _ => bail!("unknown log level '{}'", self.level),
        };

        let stdout = io::stdout();
        let is_terminal = stdout.is_terminal();

        let colors = ColoredLevelConfig::new()
            .info(Color::Green)
            .debug(Color::Magenta);

        let name = name.to_string();
        fern::Dispatch::new()
            .format(move |out, message, record| {
                if is_terminal {
                    out.finish(format_args!(
                        "{} [{}] <{}> {}",
                        humantime::format_rfc3339_millis(std::time::SystemTime::now()),
                        colors.color(record.level()),
                        name,
                        message
                    ))
                } else {
                    out.finish(format_args!(
                        "{} [{}] <{}> {}",
                        humantime::format_rfc3339_millis(std::time::SystemTime::now()),
                        record.level(),
                        name,
                        message
                    ))
                }
            })
            .level(level)
            .chain(std::io::stdout())
            .apply()
            .context("init logger")?;

        Ok(())
    }
}
