//! Wrappers for the SQL client network library's SSPI helpers.

use super::{dump, intercept, missing_original, CallLog};
use crate::ffi::*;
use crate::identity::current_thread_user;
use crate::session::{DiagnosticSession, SESSION};
use crate::table::HookId;
use sspi_shared::logging::{bool_field, field, ptr_field, str_field};
use sspi_shared::LibraryKind;
use std::ffi::{c_char, c_void};

fn u32_out(log: &CallLog<'_>, name: &str, value: *const u32) {
    if value.is_null() {
        log.info(&ptr_field(name, value));
    } else {
        log.info(&field(name, unsafe { *value }));
    }
}

pub unsafe extern "C" fn hooked_connection_get_svr_user(connection: *mut c_void, user_name: *mut c_char) -> Bool {
    connection_get_svr_user(&SESSION, connection, user_name)
}

pub unsafe fn connection_get_svr_user(
    session: &DiagnosticSession,
    connection: *mut c_void,
    user_name: *mut c_char,
) -> Bool {
    const NAME: &str = "ConnectionGetSvrUser";
    let Some(real) = session.table().resolve::<ConnectionGetSvrUserFn>(HookId::ConnectionGetSvrUser) else {
        return missing_original(session, NAME, FALSE);
    };

    intercept(
        session,
        NAME,
        LibraryKind::NetworkLibrary,
        |log| {
            log.enter();
            log.info(&ptr_field("pConnectionObject", connection));
            log.info(&ptr_field("szUserName", user_name));
        },
        || real(connection, user_name),
        |log, result, error| {
            if *result != FALSE {
                log.info(&str_field("szUserName", dump::ansi(user_name).as_deref()));
            }
            log.exit_bool(*result, error);
        },
    )
}

#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn hooked_gen_client_context(
    key: u32,
    in_buf: *mut u8,
    in_len: u32,
    out_buf: *mut u8,
    out_len: *mut u32,
    done: *mut Bool,
    server_info: *mut c_char,
) -> Bool {
    gen_client_context(&SESSION, key, in_buf, in_len, out_buf, out_len, done, server_info)
}

/// The output length is in/out: capacity on entry, bytes produced on return.
#[allow(clippy::too_many_arguments)]
pub unsafe fn gen_client_context(
    session: &DiagnosticSession,
    key: u32,
    in_buf: *mut u8,
    in_len: u32,
    out_buf: *mut u8,
    out_len: *mut u32,
    done: *mut Bool,
    server_info: *mut c_char,
) -> Bool {
    const NAME: &str = "GenClientContext";
    let Some(real) = session.table().resolve::<GenClientContextFn>(HookId::GenClientContext) else {
        return missing_original(session, NAME, FALSE);
    };

    intercept(
        session,
        NAME,
        LibraryKind::NetworkLibrary,
        |log| {
            log.enter();
            log.info(&field("dwKey", key));
            log.info(&ptr_field("pInBuf", in_buf));
            log.info(&field("cbIn", in_len));
            log.dump(dump::bytes(in_buf, in_len), in_buf as usize);
            log.info(&ptr_field("pOutBuf", out_buf));
            u32_out(log, "pcbOut", out_len);
            log.info(&ptr_field("pfDone", done));
            log.info(&str_field("szServerInfo", dump::ansi(server_info).as_deref()));
            match current_thread_user() {
                Some(user) => {
                    log.info("Calling thread identity");
                    for line in user.describe() {
                        log.info(&line);
                    }
                }
                None => log.info("Calling thread identity not available"),
            }
        },
        || real(key, in_buf, in_len, out_buf, out_len, done, server_info),
        |log, result, error| {
            if *result != FALSE {
                u32_out(log, "pcbOut", out_len);
                if !done.is_null() {
                    log.info(&bool_field("pfDone", *done != FALSE));
                }
                if !out_len.is_null() {
                    log.dump(dump::bytes(out_buf, *out_len), out_buf as usize);
                }
            }
            log.exit_bool(*result, error);
        },
    )
}

pub unsafe extern "C" fn hooked_init_sspi_package(max_message: *mut u32) -> Bool {
    init_sspi_package(&SESSION, max_message)
}

pub unsafe fn init_sspi_package(session: &DiagnosticSession, max_message: *mut u32) -> Bool {
    const NAME: &str = "InitSSPIPackage";
    let Some(real) = session.table().resolve::<InitSspiPackageFn>(HookId::InitSspiPackage) else {
        return missing_original(session, NAME, FALSE);
    };

    intercept(
        session,
        NAME,
        LibraryKind::NetworkLibrary,
        |log| {
            log.enter();
            log.info(&ptr_field("pcbMaxMessage", max_message));
        },
        || real(max_message),
        |log, result, error| {
            if *result != FALSE {
                u32_out(log, "pcbMaxMessage", max_message);
            }
            log.exit_bool(*result, error);
        },
    )
}

pub unsafe extern "C" fn hooked_init_session(key: u32) -> Bool {
    init_session(&SESSION, key)
}

pub unsafe fn init_session(session: &DiagnosticSession, key: u32) -> Bool {
    const NAME: &str = "InitSession";
    let Some(real) = session.table().resolve::<InitSessionFn>(HookId::InitSession) else {
        return missing_original(session, NAME, FALSE);
    };
    intercept(
        session,
        NAME,
        LibraryKind::NetworkLibrary,
        |log| {
            log.enter();
            log.info(&field("dwKey", key));
        },
        || real(key),
        |log, result, error| log.exit_bool(*result, error),
    )
}

pub unsafe extern "C" fn hooked_term_sspi_package() -> Bool {
    term_sspi_package(&SESSION)
}

pub unsafe fn term_sspi_package(session: &DiagnosticSession) -> Bool {
    const NAME: &str = "TermSSPIPackage";
    let Some(real) = session.table().resolve::<TermSspiPackageFn>(HookId::TermSspiPackage) else {
        return missing_original(session, NAME, FALSE);
    };
    intercept(
        session,
        NAME,
        LibraryKind::NetworkLibrary,
        |log| log.enter(),
        || real(),
        |log, result, error| log.exit_bool(*result, error),
    )
}

pub unsafe extern "C" fn hooked_term_session(key: u32) -> Bool {
    term_session(&SESSION, key)
}

pub unsafe fn term_session(session: &DiagnosticSession, key: u32) -> Bool {
    const NAME: &str = "TermSession";
    let Some(real) = session.table().resolve::<TermSessionFn>(HookId::TermSession) else {
        return missing_original(session, NAME, FALSE);
    };
    intercept(
        session,
        NAME,
        LibraryKind::NetworkLibrary,
        |log| {
            log.enter();
            log.info(&field("dwKey", key));
        },
        || real(key),
        |log, result, error| log.exit_bool(*result, error),
    )
}
