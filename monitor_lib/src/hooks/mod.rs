pub mod crypt_hooks;
pub(crate) mod dump;
pub mod netlib_hooks;
pub mod sspi_hooks;

use crate::ffi::Bool;
use crate::guard::{log_guarded, CallDepthGuard};
use crate::session::DiagnosticSession;
use crate::table::HookId;
use sspi_shared::decode::{describe_security_status, hex_dump};
use sspi_shared::{LibraryKind, LogLevel};

/// Address of the wrapper that replaces `id`.
pub fn replacement(id: HookId) -> usize {
    match id {
        HookId::AcquireCredentialsHandleA => sspi_hooks::hooked_acquire_credentials_handle_a as *const () as usize,
        HookId::InitializeSecurityContextA => sspi_hooks::hooked_initialize_security_context_a as *const () as usize,
        HookId::CompleteAuthToken => sspi_hooks::hooked_complete_auth_token as *const () as usize,
        HookId::AcceptSecurityContext => sspi_hooks::hooked_accept_security_context as *const () as usize,
        HookId::QuerySecurityPackageInfoA => sspi_hooks::hooked_query_security_package_info_a as *const () as usize,
        HookId::QueryContextAttributesA => sspi_hooks::hooked_query_context_attributes_a as *const () as usize,
        HookId::CertGetCertificateChain => crypt_hooks::hooked_cert_get_certificate_chain as *const () as usize,
        HookId::CertNameToStrW => crypt_hooks::hooked_cert_name_to_str_w as *const () as usize,
        HookId::CertVerifyCertificateChainPolicy => {
            crypt_hooks::hooked_cert_verify_certificate_chain_policy as *const () as usize
        }
        HookId::CertFindChainInStore => crypt_hooks::hooked_cert_find_chain_in_store as *const () as usize,
        HookId::ConnectionGetSvrUser => netlib_hooks::hooked_connection_get_svr_user as *const () as usize,
        HookId::GenClientContext => netlib_hooks::hooked_gen_client_context as *const () as usize,
        HookId::InitSspiPackage => netlib_hooks::hooked_init_sspi_package as *const () as usize,
        HookId::InitSession => netlib_hooks::hooked_init_session as *const () as usize,
        HookId::TermSspiPackage => netlib_hooks::hooked_term_sspi_package as *const () as usize,
        HookId::TermSession => netlib_hooks::hooked_term_session as *const () as usize,
    }
}

/// Log lines for one intercepted call.
pub(crate) struct CallLog<'a> {
    session: &'a DiagnosticSession,
    name: &'static str,
}

impl<'a> CallLog<'a> {
    pub(crate) fn new(session: &'a DiagnosticSession, name: &'static str) -> Self {
        Self { session, name }
    }

    pub(crate) fn session(&self) -> &'a DiagnosticSession {
        self.session
    }

    pub(crate) fn enter(&self) {
        self.info("");
        self.info(&format!("ENTER {}", self.name));
    }

    pub(crate) fn info(&self, line: &str) {
        self.session.log(LogLevel::Info, line);
    }

    pub(crate) fn debug(&self, line: &str) {
        self.session.log(LogLevel::Debug, line);
    }

    pub(crate) fn warn(&self, line: &str) {
        self.session.log(LogLevel::Warn, line);
    }

    pub(crate) fn dump(&self, data: &[u8], base: usize) {
        if self.session.log_enabled(LogLevel::Debug) {
            for line in hex_dump(data, base) {
                self.debug(&line);
            }
        }
    }

    pub(crate) fn exit_status(&self, status: i32) {
        if status == 0 {
            self.info(&format!("EXIT  {} returned SEC_E_OK", self.name));
        } else {
            self.info(&format!(
                "EXIT  {} returned 0x{:08x} {}",
                self.name,
                status as u32,
                describe_security_status(status)
            ));
        }
    }

    /// Exit line for functions returning a count or a pointer.
    pub(crate) fn exit_value(&self, value: impl std::fmt::Display) {
        self.info(&format!("EXIT  {} returned {}", self.name, value));
    }

    pub(crate) fn exit_bool(&self, result: Bool, last_error: u32) {
        let text = if result != 0 { "TRUE" } else { "FALSE" };
        self.info(&format!("{} returned {}", self.name, text));
        if result == 0 {
            self.info(&format!("GetLastError returned {}", last_error));
        }
        self.info(&format!("EXIT  {}", self.name));
    }
}

fn last_error() -> u32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0) as u32
}

#[cfg(windows)]
fn restore_last_error(code: u32) {
    unsafe { windows_sys::Win32::Foundation::SetLastError(code) }
}

#[cfg(not(windows))]
fn restore_last_error(_code: u32) {}

/// Log, call through, log. Logging only happens for the outermost call of
/// a family on this thread and any panic in it is contained; the real call
/// and its result are never touched. The caller's last-error value is
/// preserved across the post-call logging.
pub(crate) fn intercept<R>(
    session: &DiagnosticSession,
    name: &'static str,
    family: LibraryKind,
    before: impl FnOnce(&CallLog<'_>),
    call: impl FnOnce() -> R,
    after: impl FnOnce(&CallLog<'_>, &R, u32),
) -> R {
    let guard = CallDepthGuard::enter(family);
    let logging = guard.is_outermost() && session.is_log_open();
    let log = CallLog::new(session, name);

    if logging {
        log_guarded(session, name, || before(&log));
    }

    let result = call();

    if logging {
        let error = last_error();
        log_guarded(session, name, || after(&log, &result, error));
        restore_last_error(error);
    }
    result
}

/// Used when a wrapper runs but the table has no original to call.
pub(crate) fn missing_original<R>(session: &DiagnosticSession, name: &str, fallback: R) -> R {
    session.log(
        LogLevel::Error,
        &format!("{} was called but its original entry point is not loaded", name),
    );
    fallback
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::config::Config;
    use crate::session::DiagnosticSession;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// A session logging into a fresh temporary file.
    pub(crate) struct LoggedSession {
        pub session: DiagnosticSession,
        pub path: PathBuf,
        _dir: TempDir,
    }

    impl LoggedSession {
        pub(crate) fn new(config: Config) -> Self {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("sspi.log");
            let session = DiagnosticSession::new(config);
            session.open_log(&path).unwrap();
            Self { session, path, _dir: dir }
        }

        /// Closes the log and returns everything written to it.
        pub(crate) fn finish(self) -> String {
            self.session.close_log().unwrap();
            std::fs::read_to_string(&self.path).unwrap()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_every_hook_has_a_distinct_replacement() {
        let mut addrs: Vec<usize> = HookId::ALL.iter().map(|id| replacement(*id)).collect();
        assert!(addrs.iter().all(|a| *a != 0));
        addrs.sort_unstable();
        addrs.dedup();
        assert_eq!(addrs.len(), HookId::COUNT);
    }

    #[test]
    fn test_intercept_returns_real_result_when_logging_panics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intercept.log");
        let session = DiagnosticSession::new(Config::default());
        session.open_log(&path).unwrap();

        let result = intercept(
            &session,
            "InitSession",
            LibraryKind::NetworkLibrary,
            |_| panic!("before"),
            || 7,
            |_, _: &i32, _| panic!("after"),
        );
        assert_eq!(result, 7);
        session.close_log().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("<logging fault suppressed in InitSession>").count(), 2);
    }

    #[test]
    fn test_nested_call_in_same_family_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested.log");
        let session = DiagnosticSession::new(Config::default());
        session.open_log(&path).unwrap();

        intercept(
            &session,
            "CertVerifyCertificateChainPolicy",
            LibraryKind::Certificate,
            |log| log.enter(),
            || {
                intercept(
                    &session,
                    "CertNameToStrW",
                    LibraryKind::Certificate,
                    |log| log.enter(),
                    || 0u32,
                    |_, _, _| {},
                )
            },
            |log, _, _| log.info("done"),
        );
        session.close_log().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("ENTER CertVerifyCertificateChainPolicy"));
        assert!(!text.contains("ENTER CertNameToStrW"));
        assert!(text.contains(" done\r\n"));
    }

    #[test]
    fn test_exit_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exit.log");
        let session = DiagnosticSession::new(Config::default());
        session.open_log(&path).unwrap();
        let log = CallLog::new(&session, "InitializeSecurityContextA");
        log.exit_status(0);
        log.exit_status(0x8009_030C_u32 as i32);
        let log = CallLog::new(&session, "InitSession");
        log.exit_bool(0, 5);
        session.close_log().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains(" EXIT  InitializeSecurityContextA returned SEC_E_OK\r\n"));
        assert!(text.contains(
            " EXIT  InitializeSecurityContextA returned 0x8009030c SEC_E_LOGON_DENIED (The logon attempt failed)\r\n"
        ));
        assert!(text.contains(" InitSession returned FALSE\r\n"));
        assert!(text.contains(" GetLastError returned 5\r\n"));
        assert!(text.contains(" EXIT  InitSession\r\n"));
    }
}
