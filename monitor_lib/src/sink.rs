// Copyright (c) 2024 HUTAOSHUSBAND - Wallbangbros.com/FireflyProtector.xyz

use chrono::Utc;
use sspi_shared::logging::format_line;
use sspi_shared::{DiagError, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Append-only text log shared by every thread of the host process.
pub struct LogSink {
    file: Mutex<Option<File>>,
}

impl LogSink {
    pub const fn new() -> Self {
        Self {
            file: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        // A panic while holding the lock leaves the file usable.
        self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn open(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = self.lock();
        if file.is_some() {
            return Err(DiagError::AlreadyOpen);
        }
        let opened = OpenOptions::new().create(true).append(true).open(path)?;
        *file = Some(opened);
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Appends one timestamped line. Does nothing when no log is open.
    pub fn write(&self, message: &str) {
        let mut file = self.lock();
        if let Some(file) = file.as_mut() {
            let line = format_line(Utc::now(), message);
            let _ = file.write_all(line.as_bytes());
        }
    }

    pub fn close(&self) -> Result<()> {
        let mut file = self.lock();
        match file.take() {
            Some(mut f) => {
                let _ = f.flush();
                Ok(())
            }
            None => Err(DiagError::NotOpen),
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn is_timestamp(prefix: &str) -> bool {
        let bytes = prefix.as_bytes();
        bytes.len() == 23
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                10 => *b == b' ',
                13 | 16 => *b == b':',
                19 => *b == b'.',
                _ => b.is_ascii_digit(),
            })
    }

    #[test]
    fn test_open_write_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sspi.log");
        let sink = LogSink::new();

        sink.write("dropped before open");
        sink.open(&path).unwrap();
        assert!(sink.is_open());
        sink.write("first");
        sink.write("");
        sink.close().unwrap();
        sink.write("dropped after close");

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 2);
        assert!(is_timestamp(&lines[0][..23]));
        assert_eq!(&lines[0][23..], " first");
        assert_eq!(&lines[1][23..], " ");
        assert!(text.ends_with("\r\n"));
    }

    #[test]
    fn test_second_open_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LogSink::new();
        sink.open(dir.path().join("a.log")).unwrap();
        assert!(matches!(sink.open(dir.path().join("b.log")), Err(DiagError::AlreadyOpen)));
        sink.close().unwrap();
    }

    #[test]
    fn test_close_without_open() {
        let sink = LogSink::new();
        assert!(matches!(sink.close(), Err(DiagError::NotOpen)));
    }

    #[test]
    fn test_open_failure_carries_os_error() {
        let dir = tempfile::tempdir().unwrap();
        let sink = LogSink::new();
        let err = sink.open(dir.path().join("no/such/dir/sspi.log")).unwrap_err();
        match err {
            DiagError::OpenFailure(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error {:?}", other),
        }
        assert!(!sink.is_open());
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sspi.log");
        let sink = LogSink::new();
        for run in ["run one", "run two"] {
            sink.open(&path).unwrap();
            sink.write(run);
            sink.close().unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(" run one\r\n"));
        assert!(text.contains(" run two\r\n"));
    }

    #[test]
    fn test_concurrent_lines_never_interleave() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sspi.log");
        let sink = Arc::new(LogSink::new());
        sink.open(&path).unwrap();

        let writers: Vec<_> = ['A', 'B']
            .into_iter()
            .map(|c| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    let payload = c.to_string().repeat(200);
                    for _ in 0..500 {
                        sink.write(&payload);
                    }
                })
            })
            .collect();
        for w in writers {
            w.join().unwrap();
        }
        sink.close().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.split("\r\n").filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 1000);
        for line in lines {
            assert!(is_timestamp(&line[..23]), "{}", line);
            let body = &line[24..];
            assert!(body == "A".repeat(200) || body == "B".repeat(200), "{}", line);
        }
    }
}
