use crate::config::{Config, CONFIG};
use crate::context::DiagnosticContext;
use crate::interceptor::{HookToken, Interceptor};
use crate::sink::LogSink;
use crate::table::{FunctionTable, HookId};
use once_cell::sync::Lazy;
use sspi_shared::{LogLevel, Result};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

pub(crate) struct ActiveHooks {
    pub(crate) interceptor: Box<dyn Interceptor>,
    pub(crate) installed: Vec<(HookId, HookToken)>,
}

/// Owns the state of one diagnostic run: log, function table, handshake
/// context and the installed hooks.
pub struct DiagnosticSession {
    config: Config,
    sink: LogSink,
    table: FunctionTable,
    context: DiagnosticContext,
    pub(crate) hooks: Mutex<Option<ActiveHooks>>,
}

impl DiagnosticSession {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            sink: LogSink::new(),
            table: FunctionTable::new(),
            context: DiagnosticContext::new(),
            hooks: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn table(&self) -> &FunctionTable {
        &self.table
    }

    pub fn context(&self) -> &DiagnosticContext {
        &self.context
    }

    pub fn open_log(&self, path: impl AsRef<Path>) -> Result<()> {
        self.sink.open(path)
    }

    pub fn close_log(&self) -> Result<()> {
        self.sink.close()
    }

    pub fn is_log_open(&self) -> bool {
        self.sink.is_open()
    }

    pub fn log_enabled(&self, level: LogLevel) -> bool {
        level <= self.config.log_level && self.sink.is_open()
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if level <= self.config.log_level {
            self.sink.write(message);
        }
    }

    pub fn is_active(&self) -> bool {
        self.lock_hooks().is_some()
    }

    /// Entry points currently redirected.
    pub fn hooked(&self) -> Vec<HookId> {
        self.lock_hooks()
            .as_ref()
            .map(|active| active.installed.iter().map(|(id, _)| *id).collect())
            .unwrap_or_default()
    }

    pub(crate) fn lock_hooks(&self) -> MutexGuard<'_, Option<ActiveHooks>> {
        self.hooks.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The session the exported wrappers report into. Fixed-ABI entry points
/// have no way to receive a context pointer, so they reach it here.
pub static SESSION: Lazy<DiagnosticSession> = Lazy::new(|| DiagnosticSession::new(CONFIG.clone()));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filtering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.log");
        let session = DiagnosticSession::new(Config {
            log_level: LogLevel::Info,
            ..Config::default()
        });
        assert!(!session.log_enabled(LogLevel::Error));
        session.open_log(&path).unwrap();
        assert!(session.log_enabled(LogLevel::Info));
        assert!(!session.log_enabled(LogLevel::Debug));

        session.log(LogLevel::Info, "kept");
        session.log(LogLevel::Debug, "filtered");
        session.close_log().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(" kept\r\n"));
        assert!(!text.contains("filtered"));
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = DiagnosticSession::new(Config::default());
        assert!(!session.is_active());
        assert!(session.hooked().is_empty());
        assert!(!session.is_log_open());
    }
}
