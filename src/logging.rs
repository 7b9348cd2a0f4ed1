use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::Mutex;

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

fn format_record(record: &Record) -> String {
    match record.level() {
        Level::Error => format!("error: {}", record.args()),
        Level::Warn => format!("warning: {}", record.args()),
        level => format!("[{}] {}: {}", level, record.target(), record.args()),
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            write(format_record(record));
        }
    }

    fn flush(&self) {}
}

/// Install the stderr logger. `verbose` enables debug output.
pub fn init(verbose: bool) {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    // A logger may already be installed (tests); keep it.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

/// Activate buffering. While active, log lines are stored instead of
/// printed to stderr.
pub fn activate() {
    if let Ok(mut guard) = BUFFER.lock() {
        *guard = Some(Vec::new());
    }
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    BUFFER
        .lock()
        .ok()
        .and_then(|mut guard| guard.take())
        .unwrap_or_default()
}

/// Deactivate buffering and print what was collected.
pub fn flush_buffered() {
    for line in drain() {
        eprintln!("{}", line);
    }
}

/// Write a line. If buffering is active the line is stored; otherwise it is
/// printed to stderr immediately.
fn write(line: String) {
    match BUFFER.lock() {
        Ok(mut guard) => match guard.as_mut() {
            Some(buf) => buf.push(line),
            None => {
                drop(guard);
                eprintln!("{}", line);
            }
        },
        Err(_) => eprintln!("{}", line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffering_collects_lines() {
        activate();
        write("warning: first".to_string());
        write("warning: second".to_string());
        assert_eq!(drain(), vec!["warning: first", "warning: second"]);
        // Inactive again: nothing left to drain.
        assert!(drain().is_empty());
    }

    #[test]
    fn test_format_record_levels() {
        let record = Record::builder()
            .level(Level::Warn)
            .target("podium::competition")
            .args(format_args!("bad score"))
            .build();
        assert_eq!(format_record(&record), "warning: bad score");

        let record = Record::builder()
            .level(Level::Debug)
            .target("podium::scoring")
            .args(format_args!("tie group"))
            .build();
        assert_eq!(format_record(&record), "[DEBUG] podium::scoring: tie group");
    }
}
