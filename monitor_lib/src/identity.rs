//! Who the calling thread runs as, for the network library's context
//! generation log.

use sspi_shared::decode::names::{impersonation_level_name, thread_or_process_name, token_type_name};
use sspi_shared::logging::field;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadUser {
    pub user: String,
    pub domain: String,
    pub token_source: String,
    /// Only meaningful for impersonation tokens.
    pub impersonation_level: Option<u32>,
    pub token_type: u32,
    pub process_id: u32,
    pub thread_id: u32,
    pub from_process: bool,
}

impl ThreadUser {
    /// Parameter lines in the usual `name = value` layout.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = vec![
            field("  User", format!("{}\\{}", self.domain, self.user)),
            field("  TokenSource", &self.token_source),
            field("  TokenType", token_type_name(self.token_type)),
        ];
        if let Some(level) = self.impersonation_level {
            lines.push(field("  ImpersonationLevel", impersonation_level_name(level)));
        }
        lines.push(field("  ProcessId", self.process_id));
        lines.push(field("  ThreadId", self.thread_id));
        lines.push(field("  TokenFrom", thread_or_process_name(self.from_process)));
        lines
    }
}

#[cfg(not(windows))]
pub fn current_thread_user() -> Option<ThreadUser> {
    None
}

#[cfg(windows)]
pub use self::windows::current_thread_user;

#[cfg(windows)]
mod windows {
    use super::ThreadUser;
    use std::ffi::c_void;
    use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
    use windows_sys::Win32::Security::{
        GetTokenInformation, LookupAccountSidA, TokenImpersonationLevel, TokenSource, TokenType,
        TokenUser, SID_NAME_USE, TOKEN_INFORMATION_CLASS, TOKEN_QUERY, TOKEN_SOURCE, TOKEN_USER,
    };
    use windows_sys::Win32::System::Threading::{
        GetCurrentProcess, GetCurrentProcessId, GetCurrentThread, GetCurrentThreadId, OpenProcessToken,
        OpenThreadToken,
    };

    const TOKEN_IMPERSONATION: u32 = 2;

    struct Token(HANDLE);

    impl Drop for Token {
        fn drop(&mut self) {
            unsafe { CloseHandle(self.0) };
        }
    }

    impl Token {
        /// The thread's impersonation token if it has one, else the process token.
        fn open() -> Option<(Token, bool)> {
            let mut handle: HANDLE = 0;
            unsafe {
                if OpenThreadToken(GetCurrentThread(), TOKEN_QUERY, 1, &mut handle) != 0 {
                    return Some((Token(handle), false));
                }
                if OpenProcessToken(GetCurrentProcess(), TOKEN_QUERY, &mut handle) != 0 {
                    return Some((Token(handle), true));
                }
            }
            None
        }

        fn query(&self, class: TOKEN_INFORMATION_CLASS) -> Option<Vec<u8>> {
            let mut needed = 0u32;
            unsafe {
                GetTokenInformation(self.0, class, std::ptr::null_mut(), 0, &mut needed);
                if needed == 0 {
                    return None;
                }
                let mut buf = vec![0u8; needed as usize];
                let ok = GetTokenInformation(
                    self.0,
                    class,
                    buf.as_mut_ptr() as *mut c_void,
                    needed,
                    &mut needed,
                );
                (ok != 0).then_some(buf)
            }
        }

        fn query_u32(&self, class: TOKEN_INFORMATION_CLASS) -> Option<u32> {
            let buf = self.query(class)?;
            let raw: [u8; 4] = buf.get(..4)?.try_into().ok()?;
            Some(u32::from_ne_bytes(raw))
        }
    }

    fn account_of(token: &Token) -> Option<(String, String)> {
        let buf = token.query(TokenUser)?;
        let user = unsafe { &*(buf.as_ptr() as *const TOKEN_USER) };
        let mut name = [0u8; 256];
        let mut domain = [0u8; 256];
        let mut name_len = name.len() as u32;
        let mut domain_len = domain.len() as u32;
        let mut use_: SID_NAME_USE = 0;
        let ok = unsafe {
            LookupAccountSidA(
                std::ptr::null(),
                user.User.Sid,
                name.as_mut_ptr(),
                &mut name_len,
                domain.as_mut_ptr(),
                &mut domain_len,
                &mut use_,
            )
        };
        if ok == 0 {
            return None;
        }
        Some((
            String::from_utf8_lossy(&name[..name_len as usize]).into_owned(),
            String::from_utf8_lossy(&domain[..domain_len as usize]).into_owned(),
        ))
    }

    fn source_of(token: &Token) -> String {
        token
            .query(TokenSource)
            .map(|buf| {
                let source = unsafe { &*(buf.as_ptr() as *const TOKEN_SOURCE) };
                let raw: Vec<u8> = source.SourceName.iter().map(|c| *c as u8).take_while(|c| *c != 0).collect();
                String::from_utf8_lossy(&raw).trim_end().to_string()
            })
            .unwrap_or_default()
    }

    pub fn current_thread_user() -> Option<ThreadUser> {
        let (token, from_process) = Token::open()?;
        let (user, domain) = account_of(&token).unwrap_or_default();
        let token_type = token.query_u32(TokenType).unwrap_or(0);
        let impersonation_level = if token_type == TOKEN_IMPERSONATION {
            token.query_u32(TokenImpersonationLevel)
        } else {
            None
        };
        Some(ThreadUser {
            user,
            domain,
            token_source: source_of(&token),
            impersonation_level,
            token_type,
            process_id: unsafe { GetCurrentProcessId() },
            thread_id: unsafe { GetCurrentThreadId() },
            from_process,
        })
    }
}
