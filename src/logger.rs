//! Injected logging capability.
//!
//! Every component receives a [`Logger`] instead of calling the `log` macros
//! directly, so tests can observe exactly what a build pass reported.

use chrono::{Local, NaiveDate};
use log::Level;
use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

/// Log target used by [`LogFacade`].
pub const LOG_TARGET: &str = "kodegen_bundler_onefile";

/// Destination for log lines.
pub trait LogSink: Send + Sync {
    /// Records one message at `level`.
    fn record(&self, level: Level, message: &str);
}

/// Sink forwarding to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacade;

impl LogSink for LogFacade {
    fn record(&self, level: Level, message: &str) {
        log::log!(target: LOG_TARGET, level, "{}", message);
    }
}

/// Sink keeping every message in memory.
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemoryLog {
    /// Creates an empty in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded messages.
    pub fn entries(&self) -> Vec<(Level, String)> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Messages recorded at exactly `level`.
    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    /// Recorded warnings.
    pub fn warnings(&self) -> Vec<String> {
        self.messages_at(Level::Warn)
    }
}

impl LogSink for MemoryLog {
    fn record(&self, level: Level, message: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((level, message.to_string()));
        }
        // Keep test output readable when env_logger is installed.
        log::log!(target: LOG_TARGET, level, "{}", message);
    }
}

/// Sink appending `info` and above to `{dir}/{stem}_{YYYY-MM-DD}.log`.
///
/// A new file is started on the first message of each local day. Every
/// message, debug included, is also passed to the wrapped sink. When the file
/// cannot be written the wrapped sink gets a warning instead.
pub struct DailyFileLog {
    dir: PathBuf,
    stem: String,
    inner: Arc<dyn LogSink>,
    current: Mutex<Option<(NaiveDate, File)>>,
}

impl fmt::Debug for DailyFileLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DailyFileLog")
            .field("dir", &self.dir)
            .field("stem", &self.stem)
            .finish_non_exhaustive()
    }
}

impl DailyFileLog {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>, inner: Arc<dyn LogSink>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
            inner,
            current: Mutex::new(None),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Log file used on `date`.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}_{}.log", self.stem, date.format("%Y-%m-%d")))
    }

    fn append(&self, level: Level, message: &str) -> io::Result<()> {
        let now = Local::now();
        let today = now.date_naive();

        let mut current = self
            .current
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;

        if current.as_ref().is_none_or(|(date, _)| *date != today) {
            fs::create_dir_all(&self.dir)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.path_for(today))?;
            *current = Some((today, file));
        }

        if let Some((_, file)) = current.as_mut() {
            writeln!(
                file,
                "{} | {:<5} | {}",
                now.format("%Y-%m-%d %H:%M:%S%.3f"),
                level,
                message
            )?;
        }
        Ok(())
    }
}

impl LogSink for DailyFileLog {
    fn record(&self, level: Level, message: &str) {
        self.inner.record(level, message);
        if level > Level::Info {
            return;
        }
        if let Err(e) = self.append(level, message) {
            self.inner.record(
                Level::Warn,
                &format!("Failed to write log file in {}: {e}", self.dir.display()),
            );
        }
    }
}

/// Cloneable handle to a [`LogSink`].
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::facade()
    }
}

impl Logger {
    /// Wraps an arbitrary sink.
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    /// Logger backed by the `log` facade.
    pub fn facade() -> Self {
        Self::new(Arc::new(LogFacade))
    }

    /// Logger backed by a shared [`MemoryLog`].
    pub fn memory(sink: Arc<MemoryLog>) -> Self {
        Self { sink }
    }

    /// Same destination, plus a [`DailyFileLog`] in `dir` named after `stem`.
    pub fn with_daily_file(&self, dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self::new(Arc::new(DailyFileLog::new(dir, stem, self.sink.clone())))
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.sink.record(Level::Error, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.sink.record(Level::Warn, message.as_ref());
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.sink.record(Level::Info, message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.sink.record(Level::Debug, message.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_log_records_levels() {
        let sink = Arc::new(MemoryLog::new());
        let log = Logger::memory(sink.clone());

        log.info("starting");
        log.warn("careful");
        log.error("broken");

        assert_eq!(sink.entries().len(), 3);
        assert_eq!(sink.warnings(), vec!["careful".to_string()]);
        assert_eq!(sink.messages_at(Level::Error), vec!["broken".to_string()]);
    }

    #[test]
    fn daily_file_gets_info_and_above() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(MemoryLog::new());
        let log = Logger::memory(sink.clone()).with_daily_file(dir.path().join("logs"), "build_linux_x86_64");

        log.debug("per-file detail");
        log.info("Building predict.py");
        log.error("build failed: boom");

        let file = DailyFileLog::new(dir.path().join("logs"), "build_linux_x86_64", sink.clone())
            .path_for(Local::now().date_naive());
        let name = file.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("build_linux_x86_64_") && name.ends_with(".log"));

        let content = std::fs::read_to_string(&file).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("| INFO  | Building predict.py"));
        assert!(lines[1].contains("| ERROR | build failed: boom"));

        assert_eq!(sink.entries().len(), 3);
    }

    #[test]
    fn unwritable_log_dir_warns_through_inner_sink() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("logs");
        std::fs::write(&blocker, "not a directory").unwrap();
        let sink = Arc::new(MemoryLog::new());
        let log = Logger::memory(sink.clone()).with_daily_file(&blocker, "package_manager");

        log.info("ready");

        assert_eq!(sink.messages_at(Level::Info), vec!["ready".to_string()]);
        assert_eq!(sink.warnings().len(), 1);
        assert!(sink.warnings()[0].starts_with("Failed to write log file"));
    }
}
