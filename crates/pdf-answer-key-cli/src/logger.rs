use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Metadata, Record};
use std::io::Write;

/// Writes timestamped log lines to stderr
#[derive(Clone)]
pub struct CliLogger {
    level: LevelFilter,
}

impl CliLogger {
    pub fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    /// Pick the level from `-v` repetitions and `--quiet`
    pub fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
        if quiet {
            return LevelFilter::Error;
        }
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let level = self.level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(level);
        Ok(())
    }

    fn format(timestamp: DateTime<Local>, record: &Record) -> String {
        let level = match record.level() {
            Level::Error => "ERROR",
            Level::Warn => "WARN ",
            Level::Info => "INFO ",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        };
        format!(
            "{} {} {}: {}",
            timestamp.format("%H:%M:%S%.3f"),
            level,
            record.target(),
            record.args()
        )
    }
}

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let line = Self::format(Local::now(), record);
            // Nothing sensible to do if stderr is gone
            let _ = writeln!(std::io::stderr().lock(), "{}", line);
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_selection() {
        assert_eq!(CliLogger::level_for(0, false), LevelFilter::Warn);
        assert_eq!(CliLogger::level_for(2, false), LevelFilter::Debug);
        assert_eq!(CliLogger::level_for(3, true), LevelFilter::Error);
    }

    #[test]
    fn test_line_format() {
        let timestamp = Local::now();
        let line = CliLogger::format(
            timestamp,
            &Record::builder()
                .args(format_args!("hello"))
                .level(Level::Info)
                .target("anskey")
                .build(),
        );
        assert!(line.ends_with("INFO  anskey: hello"));
    }
}
