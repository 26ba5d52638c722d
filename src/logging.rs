use chrono::Local;
use log::{LevelFilter, Metadata, Record, SetLoggerError};
use std::collections::HashSet;
use std::io::{self, Write};
use std::sync::OnceLock;

// Custom logger structure
#[derive(Debug)]
struct FleetLogger {
    level: LevelFilter,
    debug_filters: Option<HashSet<String>>,
}

// Pulls the number following `marker` out of a log message ("Unit 3" -> 3)
fn number_after(message: &str, marker: &str) -> Option<u64> {
    let start = message.find(marker)? + marker.len();
    let digits: String = message[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

// Builds the "[U03][T000120] " prefix for a message, empty when nothing matched
fn context_prefix(target: &str, message: &str) -> String {
    let unit_id = target
        .strip_prefix("unit_")
        .and_then(|id| id.parse::<u64>().ok())
        .or_else(|| number_after(message, "Unit "));
    let tick = number_after(message, "Tick ");

    let mut context = String::new();
    if let Some(id) = unit_id {
        context.push_str(&format!("[U{:02}]", id));
    }
    if let Some(t) = tick {
        context.push_str(&format!("[T{:06}]", t));
    }
    if !context.is_empty() {
        context.push(' ');
    }
    context
}

// Implement the log::Log trait for our custom logger
impl log::Log for FleetLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        if metadata.level() > self.level {
            return false;
        }
        // Debug and trace records are restricted to the requested topics
        if let Some(filters) = &self.debug_filters {
            if metadata.level() >= log::Level::Debug {
                return filters.contains(metadata.target())
                    || filters.iter().any(|f| metadata.target().starts_with(f.as_str()));
            }
        }
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let level_color = match record.level() {
            log::Level::Error => "\x1B[31m", // Red
            log::Level::Warn => "\x1B[33m",  // Yellow
            log::Level::Info => "\x1B[32m",  // Green
            log::Level::Debug => "\x1B[36m", // Cyan
            log::Level::Trace => "\x1B[35m", // Magenta
        };
        let reset = "\x1B[0m";
        let timestamp = Local::now().format("%H:%M:%S%.3f");
        let message = record.args().to_string();
        let context = context_prefix(record.target(), &message);

        let mut output = format!(
            "{timestamp} {level_color}{level:5}{reset} {context}{target}: {message}",
            level = record.level(),
            target = record.target(),
        );
        if let Some(module_path) = record.module_path() {
            if module_path != record.target() {
                output.push_str(&format!(" [{}]", module_path));
            }
        }

        // Write errors on a closed stdout are ignored
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", output);
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

static LOGGER: OnceLock<FleetLogger> = OnceLock::new();

/// Installs the global logger.
///
/// When `RUST_LOG` is set the standard `env_logger` takes over so the usual
/// filter syntax works; otherwise the coloured topic logger is used, with
/// debug/trace output limited to the comma separated `debug_filter` topics
/// (`unit`, `harvest`, `combat`, `research`, `physics`, `weapon`, `spawn`,
/// `shop`, `base`).
pub fn init_logger(level: LevelFilter, debug_filter: Option<String>) -> Result<(), SetLoggerError> {
    if std::env::var_os("RUST_LOG").is_some() {
        return env_logger::Builder::from_default_env().try_init();
    }

    let debug_filters = debug_filter.map(|filter_str| {
        filter_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<HashSet<String>>()
    });

    let logger = LOGGER.get_or_init(|| FleetLogger {
        level,
        debug_filters,
    });
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

// Topic macros. Unit topics take (unit_id, tick, fmt..); the rest take (fmt..)

#[macro_export]
macro_rules! debug_unit {
    ($unit_id:expr, $tick:expr, $($arg:tt)*) => {
        log::debug!(target: "unit", "[U{:02}][T{:06}] {}", $unit_id, $tick, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_harvest {
    ($unit_id:expr, $tick:expr, $($arg:tt)*) => {
        log::debug!(target: "harvest", "[U{:02}][T{:06}] {}", $unit_id, $tick, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_combat {
    ($unit_id:expr, $tick:expr, $($arg:tt)*) => {
        log::debug!(target: "combat", "[U{:02}][T{:06}] {}", $unit_id, $tick, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! debug_physics {
    ($($arg:tt)*) => {
        log::debug!(target: "physics", "{}", format_args!($($arg)*))
    }
}

#[macro_export]
macro_rules! debug_weapon {
    ($($arg:tt)*) => {
        log::debug!(target: "weapon", "{}", format_args!($($arg)*))
    }
}

#[macro_export]
macro_rules! debug_spawn {
    ($($arg:tt)*) => {
        log::debug!(target: "spawn", "{}", format_args!($($arg)*))
    }
}

#[macro_export]
macro_rules! debug_shop {
    ($($arg:tt)*) => {
        log::debug!(target: "shop", "{}", format_args!($($arg)*))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_prefix_from_message() {
        assert_eq!(context_prefix("unit", "Unit 3 arrived"), "[U03] ");
        assert_eq!(context_prefix("spawn", "Tick 120: spawned"), "[T000120] ");
        assert_eq!(context_prefix("unit_7", "moved"), "[U07] ");
        assert_eq!(context_prefix("shop", "nothing here"), "");
    }

    #[test]
    fn test_number_after_requires_digits() {
        assert_eq!(number_after("Unit x", "Unit "), None);
        assert_eq!(number_after("Unit 12, Tick 4", "Tick "), Some(4));
    }
}
