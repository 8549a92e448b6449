//! Per-session transcript logs.
//!
//! When a log directory is configured, every session gets an append-only
//! `{log_dir}/{session_id}.log` with one timestamped line per prompt,
//! trace, answer chunk, advisory or error. Without a directory the handle is
//! empty and writes are no-ops.

use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
    sync::{Arc, Mutex},
};

use chrono::{SecondsFormat, Utc};

/// Thread-safe handle to an append-only transcript file.
pub type LogHandle = Arc<Mutex<Option<File>>>;

/// What a transcript line records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    User,
    Trace,
    Answer,
    Advisory,
    Error,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Direction::User => "USER",
            Direction::Trace => "TRACE",
            Direction::Answer => "ANSWER",
            Direction::Advisory => "ADVISORY",
            Direction::Error => "ERROR",
        }
    }
}

/// A handle that writes nothing.
pub fn disabled() -> LogHandle {
    Arc::new(Mutex::new(None))
}

/// Open (or create) `{log_dir}/{log_id}.log`.
///
/// Failures to create the directory or file are logged and leave the
/// handle disabled; transcripts never break a chat.
pub fn open_log_file(log_dir: Option<&Path>, log_id: &str) -> LogHandle {
    let file = log_dir.and_then(|dir| {
        let path = dir.join(format!("{}.log", log_id));
        if let Err(e) = std::fs::create_dir_all(dir) {
            log::warn!("Cannot create transcript dir {}: {}", dir.display(), e);
            return None;
        }
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some(file),
            Err(e) => {
                log::warn!("Cannot open transcript {}: {}", path.display(), e);
                None
            }
        }
    });
    Arc::new(Mutex::new(file))
}

/// Write a timestamped line. Newlines in `data` are escaped so each entry
/// stays on one line.
pub fn log_line(handle: &LogHandle, direction: Direction, data: &str) {
    if let Ok(mut guard) = handle.lock() {
        if let Some(ref mut file) = *guard {
            let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            let _ = writeln!(
                file,
                "[{}] {}: {}",
                ts,
                direction.label(),
                data.replace('\n', "\\n")
            );
            let _ = file.flush();
        }
    }
}
