//! Logging utilities and the engine log sink
//!
//! Every subsystem logs through the `log` facade. [`init`] installs a logger
//! that forwards records to `env_logger` for terminal output and appends them,
//! timestamped, to a process-wide [`LogSink`]. The developer console renders
//! the sink, so anything logged before the console exists is still shown.

use chrono::Local;
use lazy_static::lazy_static;
use log::{LevelFilter, Log, Metadata, Record};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

pub use log::{debug, error, info, trace, warn};

/// Default number of lines retained by the sink
pub const DEFAULT_MAX_LINES: usize = 2048;

/// One timestamped log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Local wall-clock time, `HH:MM:SS.mmm`
    pub timestamp: String,
    /// Severity of the record
    pub level: log::Level,
    /// Module path or target that produced the record
    pub target: String,
    /// Formatted message
    pub message: String,
}

impl LogLine {
    /// Human-readable form used by the console overlay
    pub fn display(&self) -> String {
        format!("[{}] [{}] {}", self.timestamp, self.level, self.message)
    }
}

struct SinkState {
    lines: VecDeque<LogLine>,
    max_lines: usize,
    total_appended: u64,
}

/// Append-only buffer of log lines shared between the logger and the console
///
/// Cheap to clone; every clone refers to the same buffer. Once `max_lines`
/// is reached the oldest lines are dropped first.
#[derive(Clone)]
pub struct LogSink {
    state: Arc<Mutex<SinkState>>,
}

impl LogSink {
    /// Create an empty sink holding at most `max_lines` lines
    pub fn new(max_lines: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(SinkState {
                lines: VecDeque::new(),
                max_lines: max_lines.max(1),
                total_appended: 0,
            })),
        }
    }

    /// Append a line
    pub fn append(&self, line: LogLine) {
        let mut state = self.state.lock();
        if state.lines.len() >= state.max_lines {
            state.lines.pop_front();
        }
        state.lines.push_back(line);
        state.total_appended += 1;
    }

    /// Change the retention limit, dropping the oldest lines if needed
    pub fn set_max_lines(&self, max_lines: usize) {
        let mut state = self.state.lock();
        state.max_lines = max_lines.max(1);
        while state.lines.len() > state.max_lines {
            state.lines.pop_front();
        }
    }

    /// Number of lines currently retained
    pub fn len(&self) -> usize {
        self.state.lock().lines.len()
    }

    /// Whether the sink holds no lines
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of lines ever appended, including dropped ones
    pub fn total_appended(&self) -> u64 {
        self.state.lock().total_appended
    }

    /// Copy of every retained line, oldest first
    pub fn lines(&self) -> Vec<LogLine> {
        self.state.lock().lines.iter().cloned().collect()
    }

    /// Up to `count` lines ending `skip_newest` lines before the newest one
    ///
    /// Lines appended before `since` (an absolute append index) are excluded.
    pub fn tail(&self, count: usize, skip_newest: usize, since: u64) -> Vec<LogLine> {
        let state = self.state.lock();
        let first_retained = state.total_appended - state.lines.len() as u64;
        let start_index = since.saturating_sub(first_retained) as usize;
        let visible: Vec<&LogLine> = state.lines.iter().skip(start_index).collect();
        let end = visible.len().saturating_sub(skip_newest);
        let start = end.saturating_sub(count);
        visible[start..end].iter().map(|line| (*line).clone()).collect()
    }

    /// Whether any retained line's message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.state
            .lock()
            .lines
            .iter()
            .any(|line| line.message.contains(needle))
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

lazy_static! {
    static ref GLOBAL_SINK: LogSink = LogSink::default();
}

/// The process-wide sink every log record lands in
pub fn sink() -> LogSink {
    GLOBAL_SINK.clone()
}

/// Logger that tees records into `env_logger` and the [`LogSink`]
struct EngineLogger {
    terminal: env_logger::Logger,
    sink: LogSink,
    sink_level: LevelFilter,
}

impl Log for EngineLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.sink_level || self.terminal.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if record.level() <= self.sink_level {
            self.sink.append(LogLine {
                timestamp: Local::now().format("%H:%M:%S%.3f").to_string(),
                level: record.level(),
                target: record.target().to_string(),
                message: record.args().to_string(),
            });
        }
        if self.terminal.matches(record) {
            self.terminal.log(record);
        }
    }

    fn flush(&self) {
        self.terminal.flush();
    }
}

/// Initialize the logging system
///
/// Terminal output follows `RUST_LOG` (defaulting to `level`); the sink
/// records everything at or above `level`. Safe to call more than once: only
/// the first call installs the logger, every call returns the same sink.
pub fn init(level: LevelFilter) -> LogSink {
    let sink = sink();
    let terminal = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .build();
    let max_level = terminal.filter().max(level);
    let logger = EngineLogger {
        terminal,
        sink: sink.clone(),
        sink_level: level,
    };

    if log::set_boxed_logger(Box::new(logger)).is_ok() {
        log::set_max_level(max_level);
    } else {
        log::debug!("Logger already installed, keeping its level");
    }
    sink
}

/// Parse a level name from configuration, falling back to `Info`
pub fn parse_level(name: &str) -> LevelFilter {
    name.parse().unwrap_or_else(|_| {
        log::warn!("Unknown log level '{}', using info", name);
        LevelFilter::Info
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(message: &str) -> LogLine {
        LogLine {
            timestamp: "00:00:00.000".to_string(),
            level: log::Level::Info,
            target: "test".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_sink_drops_oldest_when_full() {
        let sink = LogSink::new(2);
        sink.append(line("a"));
        sink.append(line("b"));
        sink.append(line("c"));

        let messages: Vec<String> = sink.lines().into_iter().map(|l| l.message).collect();
        assert_eq!(messages, vec!["b", "c"]);
        assert_eq!(sink.total_appended(), 3);
    }

    #[test]
    fn test_tail_with_scroll_and_since() {
        let sink = LogSink::new(10);
        for message in ["a", "b", "c", "d", "e"] {
            sink.append(line(message));
        }

        let tail: Vec<String> = sink.tail(2, 0, 0).into_iter().map(|l| l.message).collect();
        assert_eq!(tail, vec!["d", "e"]);

        let scrolled: Vec<String> = sink.tail(2, 1, 0).into_iter().map(|l| l.message).collect();
        assert_eq!(scrolled, vec!["c", "d"]);

        let since: Vec<String> = sink.tail(10, 0, 3).into_iter().map(|l| l.message).collect();
        assert_eq!(since, vec!["d", "e"]);

        assert!(sink.tail(2, 10, 0).is_empty());
    }

    #[test]
    fn test_init_is_idempotent_and_records_before_console() {
        let first = init(LevelFilter::Info);
        let second = init(LevelFilter::Info);
        log::info!("logging-test-marker-7f3a");
        assert!(first.contains("logging-test-marker-7f3a"));
        assert!(second.contains("logging-test-marker-7f3a"));
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("nonsense"), LevelFilter::Info);
    }
}
