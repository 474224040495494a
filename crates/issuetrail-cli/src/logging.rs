use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;

/// Buffered log file shared by every event
#[derive(Clone)]
struct SharedFile(Arc<Mutex<BufWriter<File>>>);

impl SharedFile {
    fn open(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;

        Ok(Self(Arc::new(Mutex::new(BufWriter::new(file)))))
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, BufWriter<File>>> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))
    }
}

impl Write for SharedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock()?.flush()
    }
}

impl<'a> MakeWriter<'a> for SharedFile {
    type Writer = SharedFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Keeps the log file open; buffered lines are written out on `flush` and on drop
pub struct LogGuard {
    file: Option<SharedFile>,
}

impl LogGuard {
    pub fn flush(&self) {
        if let Err(e) = self.try_flush() {
            // The subscriber may already be gone
            eprintln!("  Warning: Could not flush log file: {}", e);
        }
    }

    fn try_flush(&self) -> io::Result<()> {
        match self.file.clone() {
            Some(mut file) => file.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Console output plus an optional plain-text file. `RUST_LOG` overrides `level`.
pub fn init(level: &str, file: Option<&Path>) -> Result<LogGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let shared = match file.filter(|path| !path.as_os_str().is_empty()) {
        Some(path) => Some(SharedFile::open(path)?),
        None => None,
    };

    let file_layer = shared
        .clone()
        .map(|writer| fmt::layer().with_ansi(false).with_writer(writer));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .context("logging was already initialised")?;

    Ok(LogGuard { file: shared })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_appends_and_flushes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logfile.log");
        std::fs::write(&path, "earlier run\n").unwrap();

        let shared = SharedFile::open(&path).unwrap();
        let guard = LogGuard {
            file: Some(shared.clone()),
        };

        let mut writer = shared.make_writer();
        writer.write_all(b"Total rows processed: 3\n").unwrap();

        // Still buffered
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "earlier run\n");

        guard.flush();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "earlier run\nTotal rows processed: 3\n"
        );
    }

    #[test]
    fn test_guard_without_file() {
        let guard = LogGuard { file: None };
        assert!(guard.try_flush().is_ok());
        guard.flush();
    }

    #[test]
    fn test_flush_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let shared = SharedFile::open(&dir.path().join("logfile.log")).unwrap();
        let guard = LogGuard {
            file: Some(shared.clone()),
        };

        // Poison the lock so the flush cannot reach the file
        let poisoner = shared.clone();
        let _ = std::thread::spawn(move || {
            let _held = poisoner.0.lock().unwrap();
            panic!("poison the log file lock");
        })
        .join();

        assert!(guard.try_flush().is_err());
        guard.flush();
    }
}
