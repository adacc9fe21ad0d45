// Copyright (c) 2024 HUTAOSHUSBAND - Wallbangbros.com/CodeConfuser.dev
// All rights reserved.

use std::io;
use thiserror::Error;

pub const S_OK: i32 = 0;
pub const E_ABORT: i32 = 0x8000_4004_u32 as i32;

/// Base of the status codes handed back to the embedding application.
pub const E_SSPI_BASE_ERROR: u32 = 0x8004_0200;
pub const E_SSPI_SECUR32_LOAD_FAILURE: i32 = (E_SSPI_BASE_ERROR + 1) as i32;
pub const E_SSPI_CRYPT32_LOAD_FAILURE: i32 = (E_SSPI_BASE_ERROR + 2) as i32;
pub const E_SSPI_DBNETLIB_LOAD_FAILURE: i32 = (E_SSPI_BASE_ERROR + 3) as i32;
pub const E_SSPI_FUNCTION_LOAD_FAILURE: i32 = (E_SSPI_BASE_ERROR + 5) as i32;
pub const E_SSPI_DETOUR_RESTART_FAILURE: i32 = (E_SSPI_BASE_ERROR + 6) as i32;
pub const E_SSPI_DETOUR_STOP_FAILURE: i32 = (E_SSPI_BASE_ERROR + 7) as i32;
pub const E_SSPI_LOG_FILE_OPEN_FAILURE: i32 = (E_SSPI_BASE_ERROR + 8) as i32;
pub const E_SSPI_LOG_FILE_NOT_OPEN: i32 = (E_SSPI_BASE_ERROR + 9) as i32;
pub const E_SSPI_HOOK_FAILURE: i32 = (E_SSPI_BASE_ERROR + 10) as i32;
pub const E_SSPI_CONFIG_FAILURE: i32 = (E_SSPI_BASE_ERROR + 11) as i32;

/// The library groups the loader knows how to report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryKind {
    Security,
    Certificate,
    NetworkLibrary,
}

impl std::fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LibraryKind::Security => "security (secur32.dll/security.dll)",
            LibraryKind::Certificate => "certificate (crypt32.dll)",
            LibraryKind::NetworkLibrary => "network library (dbnetlib.dll/dbmssocn.dll)",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum DiagError {
    #[error("interception is already active")]
    AlreadyActive,
    #[error("interception is not active")]
    NotActive,
    #[error("failed to load the {library} library")]
    LibraryLoadFailure { library: LibraryKind },
    #[error("no intercepted function could be resolved")]
    FunctionLoadFailure,
    #[error("a diagnostic log is already open")]
    AlreadyOpen,
    #[error("failed to open diagnostic log: {0}")]
    OpenFailure(#[from] io::Error),
    #[error("no diagnostic log is open")]
    NotOpen,
    #[error("interceptor failure: {0}")]
    Hook(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl DiagError {
    /// Maps the error onto the HRESULT-style code returned across the C ABI.
    pub fn hresult(&self) -> i32 {
        match self {
            DiagError::AlreadyActive => E_SSPI_DETOUR_RESTART_FAILURE,
            DiagError::NotActive => E_SSPI_DETOUR_STOP_FAILURE,
            DiagError::LibraryLoadFailure { library } => match library {
                LibraryKind::Security => E_SSPI_SECUR32_LOAD_FAILURE,
                LibraryKind::Certificate => E_SSPI_CRYPT32_LOAD_FAILURE,
                LibraryKind::NetworkLibrary => E_SSPI_DBNETLIB_LOAD_FAILURE,
            },
            DiagError::FunctionLoadFailure => E_SSPI_FUNCTION_LOAD_FAILURE,
            DiagError::AlreadyOpen => E_ABORT,
            DiagError::OpenFailure(_) => E_SSPI_LOG_FILE_OPEN_FAILURE,
            DiagError::NotOpen => E_SSPI_LOG_FILE_NOT_OPEN,
            DiagError::Hook(_) => E_SSPI_HOOK_FAILURE,
            DiagError::Config(_) => E_SSPI_CONFIG_FAILURE,
        }
    }
}

pub type Result<T> = std::result::Result<T, DiagError>;

/// Collapses a unit result into the code the host expects.
pub fn to_hresult(result: Result<()>) -> i32 {
    match result {
        Ok(()) => S_OK,
        Err(e) => e.hresult(),
    }
}
