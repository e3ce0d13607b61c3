use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Colored `[LEVEL] module > message` lines on stderr
pub struct StderrLogger {
    level: LevelFilter,
}

fn color_for(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[0;91m",
        Level::Warn => "\x1b[0;93m",
        Level::Info => "\x1b[0;92m",
        Level::Debug => "\x1b[0;96m",
        Level::Trace => "\x1b[0;90m",
    }
}

impl StderrLogger {
    pub fn new(level: LevelFilter) -> Self {
        StderrLogger { level }
    }

    fn format(&self, record: &Record) -> String {
        format!(
            "\x1b[0;2;37m[{color}\x1b[1m{level:<5}\x1b[0;2;37m]\x1b[0;1;97m {module} \x1b[0;2;37m>\x1b[0;97m {args}\x1b[0m",
            color = color_for(record.level()),
            level = record.level(),
            module = record.module_path().unwrap_or("<unknown>"),
            args = record.args(),
        )
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", self.format(record));
        }
    }

    fn flush(&self) {}
}

/// Install the logger for the whole process. Can only succeed once.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(StderrLogger::new(level)))?;
    log::set_max_level(level);
    Ok(())
}
