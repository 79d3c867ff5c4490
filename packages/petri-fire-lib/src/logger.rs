use std::{
    fmt::Display,
    fs::File,
    io::{BufWriter, Write},
    str::FromStr,
    sync::Mutex,
};

use chrono::Local;
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};

use crate::config::LoggerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn tag(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DBG",
            LogLevel::Info => "INF",
            LogLevel::Warn => "WAR",
            LogLevel::Error => "ERR",
        }
    }

    fn tag_colored(&self) -> ColoredString {
        match self {
            LogLevel::Debug => "DBG".bright_cyan(),
            LogLevel::Info => "INF".bright_green(),
            LogLevel::Warn => "WAR".yellow(),
            LogLevel::Error => "ERR".bright_red(),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "info" | "inf" => Ok(LogLevel::Info),
            "warn" | "warning" | "war" => Ok(LogLevel::Warn),
            "error" | "err" => Ok(LogLevel::Error),
            _ => Err(format!("invalid log level: {s}")),
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "Debug"),
            LogLevel::Info => write!(f, "Info"),
            LogLevel::Warn => write!(f, "Warn"),
            LogLevel::Error => write!(f, "Error"),
        }
    }
}

/// Leveled logger writing colored lines to stderr and, optionally,
/// uncolored copies of every line to a log file.
#[derive(Debug)]
pub struct Logger {
    threshold: LogLevel,
    name: String,
    sink: Option<Mutex<BufWriter<File>>>,
}

impl Logger {
    pub fn new(threshold: LogLevel, name: impl Into<String>, log_file_path: Option<&str>) -> Self {
        let sink = log_file_path.map(|path| {
            let file = File::create(path).unwrap();
            Mutex::new(BufWriter::new(file))
        });

        Logger {
            threshold,
            name: name.into(),
            sink,
        }
    }

    /// Builds a logger from its config section, or `None` when logging is
    /// disabled there. A requested file sink gets a timestamped path under
    /// `./logs`.
    pub fn from_config(config: &LoggerConfig, name: impl Into<String>) -> Option<Self> {
        if !*config.get_enabled() {
            return None;
        }

        let path = (*config.get_log_file()).then(|| {
            format!(
                "./logs/petri_run_{}.txt",
                Local::now().format("%Y-%m-%d_%H-%M-%S")
            )
        });

        Some(Logger::new(*config.get_log_level(), name, path.as_deref()))
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        self.to_sink(&format!("[{}] {}: {}", level.tag(), self.name, message));

        if level >= self.threshold {
            let name = format!("{}:", self.name).dimmed();
            eprintln!("[{}] {} {}", level.tag_colored(), name, message);
        }
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn to_sink(&self, line: &str) {
        if let Some(sink) = &self.sink {
            let mut writer = sink.lock().unwrap();
            writer.write_all(line.as_bytes()).unwrap();
            writer.write_all(b"\n").unwrap();
        }
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Some(sink) = &self.sink {
            let _ = sink.lock().unwrap().flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_order_from_debug_up() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn levels_parse_from_short_and_long_names() {
        assert_eq!("dbg".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!("Info".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!("ERR".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert!("chatty".parse::<LogLevel>().is_err());
    }
}
