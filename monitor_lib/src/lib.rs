//! In-process monitor for SSPI/Schannel authentication traffic.
//!
//! Loaded into a client process, it redirects the security package,
//! certificate chain and SQL network library entry points to wrappers that
//! log every call's parameters and results to a diagnostic file, then call
//! through unchanged.

pub mod config;
pub mod context;
mod engine;
pub mod exports;
pub mod ffi;
pub mod guard;
pub mod hooks;
pub mod identity;
pub mod interceptor;
pub mod loader;
pub mod session;
pub mod sink;
pub mod table;

pub use config::Config;
pub use context::DiagnosticContext;
pub use interceptor::{HookToken, Interceptor, RecordingInterceptor};
pub use loader::{LoadReport, ModuleResolver, StaticModuleResolver};
pub use session::{DiagnosticSession, SESSION};
pub use table::{FunctionTable, HookId};

#[cfg(windows)]
use std::ffi::c_void;
#[cfg(windows)]
use windows_sys::Win32::Foundation::{BOOL, HINSTANCE};
#[cfg(windows)]
use windows_sys::Win32::System::SystemServices::DLL_PROCESS_DETACH;

#[cfg(windows)]
#[no_mangle]
#[allow(non_snake_case)]
pub extern "system" fn DllMain(_dll_module: HINSTANCE, call_reason: u32, _reserved: *mut c_void) -> BOOL {
    if call_reason == DLL_PROCESS_DETACH {
        exports::shutdown();
    }
    1
}
