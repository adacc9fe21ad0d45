//! Entry points for the host process. Every export returns an HRESULT.

use crate::session::{DiagnosticSession, SESSION};
use sspi_shared::error::to_hresult;
use sspi_shared::{DiagError, LogLevel, Result};
use std::ffi::{c_char, CStr};

unsafe fn arg(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

fn open_log(session: &DiagnosticSession, path: Option<String>) -> Result<()> {
    let path = path.ok_or_else(|| DiagError::Config("log path is null".into()))?;
    session.open_log(&path)?;
    session.log(LogLevel::Info, &format!("Log opened, monitor version {}", env!("CARGO_PKG_VERSION")));
    Ok(())
}

fn write_log(session: &DiagnosticSession, line: Option<String>) -> Result<()> {
    if !session.is_log_open() {
        return Err(DiagError::NotOpen);
    }
    session.log(LogLevel::Info, line.as_deref().unwrap_or(""));
    Ok(())
}

fn set_server_name(session: &DiagnosticSession, server: Option<String>, fqdn: Option<String>) {
    let server = server.unwrap_or_default();
    let fqdn = fqdn.unwrap_or_default();
    session.log(
        LogLevel::Debug,
        &format!("Server name set to [{}], resolved FQDN [{}]", server, fqdn),
    );
    session.context().set_server_name(&server, &fqdn);
}

/// # Safety
/// `path` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "system" fn SspiMonitorOpenLog(path: *const c_char) -> i32 {
    to_hresult(open_log(&SESSION, arg(path)))
}

#[no_mangle]
pub extern "system" fn SspiMonitorCloseLog() -> i32 {
    to_hresult(SESSION.close_log())
}

/// # Safety
/// `line` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "system" fn SspiMonitorWriteLog(line: *const c_char) -> i32 {
    to_hresult(write_log(&SESSION, arg(line)))
}

/// # Safety
/// Both arguments must be null or NUL-terminated strings.
#[no_mangle]
pub unsafe extern "system" fn SspiMonitorSetServerName(server: *const c_char, fqdn: *const c_char) -> i32 {
    set_server_name(&SESSION, arg(server), arg(fqdn));
    sspi_shared::error::S_OK
}

#[cfg(windows)]
#[no_mangle]
pub extern "system" fn SspiMonitorStart() -> i32 {
    use crate::interceptor::DetourInterceptor;
    use crate::loader::SystemModuleResolver;

    let result = SESSION
        .start(&SystemModuleResolver, Box::new(DetourInterceptor::new()))
        .map(|_| ());
    if let Err(e) = &result {
        SESSION.log(LogLevel::Error, &format!("Start failed: {}", e));
    }
    to_hresult(result)
}

#[cfg(windows)]
#[no_mangle]
pub extern "system" fn SspiMonitorStop() -> i32 {
    to_hresult(SESSION.stop())
}

/// Best effort teardown used on process detach.
pub fn shutdown() {
    if SESSION.is_active() {
        let _ = SESSION.stop();
    }
    if SESSION.is_log_open() {
        let _ = SESSION.close_log();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use sspi_shared::error::{E_ABORT, E_SSPI_CONFIG_FAILURE, E_SSPI_LOG_FILE_NOT_OPEN, S_OK};

    #[test]
    fn test_open_write_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("host.log");
        let session = DiagnosticSession::new(Config::default());

        assert_eq!(to_hresult(write_log(&session, Some("early".into()))), E_SSPI_LOG_FILE_NOT_OPEN);
        assert_eq!(
            to_hresult(open_log(&session, Some(path.to_string_lossy().into_owned()))),
            S_OK
        );
        assert_eq!(
            to_hresult(open_log(&session, Some(path.to_string_lossy().into_owned()))),
            E_ABORT
        );
        assert_eq!(to_hresult(write_log(&session, Some("from the host".into()))), S_OK);
        assert_eq!(to_hresult(session.close_log()), S_OK);
        assert_eq!(to_hresult(session.close_log()), E_SSPI_LOG_FILE_NOT_OPEN);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(" from the host\r\n"));
        assert!(!text.contains("early"));
    }

    #[test]
    fn test_null_path_is_rejected() {
        let session = DiagnosticSession::new(Config::default());
        assert_eq!(to_hresult(open_log(&session, None)), E_SSPI_CONFIG_FAILURE);
        assert!(!session.is_log_open());
    }

    #[test]
    fn test_server_name_reaches_context() {
        let session = DiagnosticSession::new(Config::default());
        set_server_name(&session, Some("db01".into()), Some("db01.corp.local".into()));
        assert_eq!(session.context().server_name(), "db01");
        assert_eq!(session.context().expected_host().as_deref(), Some("db01.corp.local"));
    }
}
