// Copyright (c) 2024 HUTAOSHUSBAND - Wallbangbros.com/CodeConfuser.dev
// All rights reserved.

//! Wrappers for the secur32/security.dll entry points.
//!
//! Each `hooked_*` function is what the patched entry point jumps to. It
//! only forwards to the session-parameterized body below it.

use super::{dump, intercept, missing_original, CallLog};
use crate::ffi::*;
use crate::session::{DiagnosticSession, SESSION};
use crate::table::HookId;
use sspi_shared::decode::names::{credential_use_name, data_rep_name, secpkg_attr_name};
use sspi_shared::decode::status::{is_success, SEC_E_INTERNAL_ERROR};
use sspi_shared::decode::{asc_req_flags, asc_ret_flags, isc_req_flags, isc_ret_flags};
use sspi_shared::logging::{field, ptr_field, str_field};
use sspi_shared::LibraryKind;
use std::ffi::{c_char, c_void};

fn flags_field(name: &str, value: u32, decoded: String) -> String {
    field(name, format!("0x{:08x} {}", value, decoded))
}

unsafe fn ret_flags(log: &CallLog<'_>, name: &str, attrs: *const u32, decode: fn(u32) -> String) {
    if attrs.is_null() {
        log.info(&ptr_field(name, attrs));
    } else {
        log.info(&flags_field(name, *attrs, decode(*attrs)));
    }
}

#[allow(clippy::too_many_arguments)]
pub unsafe extern "system" fn hooked_acquire_credentials_handle_a(
    principal: *mut c_char,
    package: *mut c_char,
    credential_use: u32,
    logon_id: *mut c_void,
    auth_data: *mut c_void,
    get_key_fn: *mut c_void,
    get_key_argument: *mut c_void,
    credential: *mut SecHandle,
    expiry: *mut TimeStamp,
) -> SecurityStatus {
    acquire_credentials_handle_a(
        &SESSION,
        principal,
        package,
        credential_use,
        logon_id,
        auth_data,
        get_key_fn,
        get_key_argument,
        credential,
        expiry,
    )
}

#[allow(clippy::too_many_arguments)]
pub unsafe fn acquire_credentials_handle_a(
    session: &DiagnosticSession,
    principal: *mut c_char,
    package: *mut c_char,
    credential_use: u32,
    logon_id: *mut c_void,
    auth_data: *mut c_void,
    get_key_fn: *mut c_void,
    get_key_argument: *mut c_void,
    credential: *mut SecHandle,
    expiry: *mut TimeStamp,
) -> SecurityStatus {
    const NAME: &str = "AcquireCredentialsHandleA";
    let Some(real) = session
        .table()
        .resolve::<AcquireCredentialsHandleAFn>(HookId::AcquireCredentialsHandleA)
    else {
        return missing_original(session, NAME, SEC_E_INTERNAL_ERROR);
    };

    intercept(
        session,
        NAME,
        LibraryKind::Security,
        |log| {
            let package_name = dump::ansi(package);
            log.enter();
            log.info(&str_field("pszPrincipal", dump::ansi(principal).as_deref()));
            log.info(&str_field("pszPackage", package_name.as_deref()));
            log.info(&field(
                "fCredentialUse",
                format!("{} {}", credential_use, credential_use_name(credential_use)),
            ));
            log.info(&ptr_field("pvLogonId", logon_id));
            log.info(&ptr_field("pAuthData", auth_data));
            if !auth_data.is_null() {
                if dump::is_schannel(package_name.as_deref()) {
                    dump::schannel_cred(log, auth_data as *const SCHANNEL_CRED);
                } else {
                    dump::auth_identity(log, auth_data as *const SEC_WINNT_AUTH_IDENTITY_A);
                }
            }
            log.info(&ptr_field("pGetKeyFn", get_key_fn));
            log.info(&ptr_field("pvGetKeyArgument", get_key_argument));
            log.info(&ptr_field("phCredential", credential));
            log.info(&ptr_field("ptsExpiry", expiry));
        },
        || {
            real(
                principal,
                package,
                credential_use,
                logon_id,
                auth_data,
                get_key_fn,
                get_key_argument,
                credential,
                expiry,
            )
        },
        |log, status, _| {
            if is_success(*status) {
                dump::handle(log, "phCredential", credential);
                dump::timestamp(log, "ptsExpiry", expiry);
            }
            log.exit_status(*status);
        },
    )
}

#[allow(clippy::too_many_arguments)]
pub unsafe extern "system" fn hooked_initialize_security_context_a(
    credential: *mut SecHandle,
    context: *mut SecHandle,
    target_name: *mut c_char,
    context_req: u32,
    reserved1: u32,
    target_data_rep: u32,
    input: *mut SecBufferDesc,
    reserved2: u32,
    new_context: *mut SecHandle,
    output: *mut SecBufferDesc,
    context_attr: *mut u32,
    expiry: *mut TimeStamp,
) -> SecurityStatus {
    initialize_security_context_a(
        &SESSION,
        credential,
        context,
        target_name,
        context_req,
        reserved1,
        target_data_rep,
        input,
        reserved2,
        new_context,
        output,
        context_attr,
        expiry,
    )
}

/// Also records the target name as the saved SPN for the certificate
/// name check that follows during the handshake.
#[allow(clippy::too_many_arguments)]
pub unsafe fn initialize_security_context_a(
    session: &DiagnosticSession,
    credential: *mut SecHandle,
    context: *mut SecHandle,
    target_name: *mut c_char,
    context_req: u32,
    reserved1: u32,
    target_data_rep: u32,
    input: *mut SecBufferDesc,
    reserved2: u32,
    new_context: *mut SecHandle,
    output: *mut SecBufferDesc,
    context_attr: *mut u32,
    expiry: *mut TimeStamp,
) -> SecurityStatus {
    const NAME: &str = "InitializeSecurityContextA";
    let Some(real) = session
        .table()
        .resolve::<InitializeSecurityContextAFn>(HookId::InitializeSecurityContextA)
    else {
        return missing_original(session, NAME, SEC_E_INTERNAL_ERROR);
    };

    let target = dump::ansi(target_name);
    if let Some(target) = &target {
        session.context().set_target_name(target);
    }

    intercept(
        session,
        NAME,
        LibraryKind::Security,
        |log| {
            log.enter();
            dump::handle(log, "phCredential", credential);
            dump::handle(log, "phContext", context);
            log.info(&str_field("pszTargetName", target.as_deref()));
            log.info(&flags_field("fContextReq", context_req, isc_req_flags(context_req)));
            log.info(&field("Reserved1", reserved1));
            log.info(&field(
                "TargetDataRep",
                format!("0x{:08x} {}", target_data_rep, data_rep_name(target_data_rep)),
            ));
            dump::sec_buffer_desc(log, "pInput", input);
            log.info(&field("Reserved2", reserved2));
            log.info(&ptr_field("phNewContext", new_context));
            log.info(&ptr_field("pOutput", output));
            log.info(&ptr_field("pfContextAttr", context_attr));
            log.info(&ptr_field("ptsExpiry", expiry));
        },
        || {
            real(
                credential,
                context,
                target_name,
                context_req,
                reserved1,
                target_data_rep,
                input,
                reserved2,
                new_context,
                output,
                context_attr,
                expiry,
            )
        },
        |log, status, _| {
            if is_success(*status) {
                dump::handle(log, "phNewContext", new_context);
                dump::sec_buffer_desc(log, "pOutput", output);
                ret_flags(log, "pfContextAttr", context_attr, isc_ret_flags);
                dump::timestamp(log, "ptsExpiry", expiry);
            }
            log.exit_status(*status);
        },
    )
}

pub unsafe extern "system" fn hooked_complete_auth_token(
    context: *mut SecHandle,
    token: *mut SecBufferDesc,
) -> SecurityStatus {
    complete_auth_token(&SESSION, context, token)
}

pub unsafe fn complete_auth_token(
    session: &DiagnosticSession,
    context: *mut SecHandle,
    token: *mut SecBufferDesc,
) -> SecurityStatus {
    const NAME: &str = "CompleteAuthToken";
    let Some(real) = session.table().resolve::<CompleteAuthTokenFn>(HookId::CompleteAuthToken) else {
        return missing_original(session, NAME, SEC_E_INTERNAL_ERROR);
    };

    intercept(
        session,
        NAME,
        LibraryKind::Security,
        |log| {
            log.enter();
            dump::handle(log, "phContext", context);
            dump::sec_buffer_desc(log, "pToken", token);
        },
        || real(context, token),
        |log, status, _| log.exit_status(*status),
    )
}

#[allow(clippy::too_many_arguments)]
pub unsafe extern "system" fn hooked_accept_security_context(
    credential: *mut SecHandle,
    context: *mut SecHandle,
    input: *mut SecBufferDesc,
    context_req: u32,
    target_data_rep: u32,
    new_context: *mut SecHandle,
    output: *mut SecBufferDesc,
    context_attr: *mut u32,
    expiry: *mut TimeStamp,
) -> SecurityStatus {
    accept_security_context(
        &SESSION,
        credential,
        context,
        input,
        context_req,
        target_data_rep,
        new_context,
        output,
        context_attr,
        expiry,
    )
}

#[allow(clippy::too_many_arguments)]
pub unsafe fn accept_security_context(
    session: &DiagnosticSession,
    credential: *mut SecHandle,
    context: *mut SecHandle,
    input: *mut SecBufferDesc,
    context_req: u32,
    target_data_rep: u32,
    new_context: *mut SecHandle,
    output: *mut SecBufferDesc,
    context_attr: *mut u32,
    expiry: *mut TimeStamp,
) -> SecurityStatus {
    const NAME: &str = "AcceptSecurityContext";
    let Some(real) = session
        .table()
        .resolve::<AcceptSecurityContextFn>(HookId::AcceptSecurityContext)
    else {
        return missing_original(session, NAME, SEC_E_INTERNAL_ERROR);
    };

    intercept(
        session,
        NAME,
        LibraryKind::Security,
        |log| {
            log.enter();
            dump::handle(log, "phCredential", credential);
            dump::handle(log, "phContext", context);
            dump::sec_buffer_desc(log, "pInput", input);
            log.info(&flags_field("fContextReq", context_req, asc_req_flags(context_req)));
            log.info(&field(
                "TargetDataRep",
                format!("0x{:08x} {}", target_data_rep, data_rep_name(target_data_rep)),
            ));
            log.info(&ptr_field("phNewContext", new_context));
            log.info(&ptr_field("pOutput", output));
            log.info(&ptr_field("pfContextAttr", context_attr));
            log.info(&ptr_field("ptsExpiry", expiry));
        },
        || {
            real(
                credential,
                context,
                input,
                context_req,
                target_data_rep,
                new_context,
                output,
                context_attr,
                expiry,
            )
        },
        |log, status, _| {
            if is_success(*status) {
                dump::handle(log, "phNewContext", new_context);
                dump::sec_buffer_desc(log, "pOutput", output);
                ret_flags(log, "pfContextAttr", context_attr, asc_ret_flags);
                dump::timestamp(log, "ptsExpiry", expiry);
            }
            log.exit_status(*status);
        },
    )
}

pub unsafe extern "system" fn hooked_query_security_package_info_a(
    package_name: *mut c_char,
    package_info: *mut *mut SecPkgInfoA,
) -> SecurityStatus {
    query_security_package_info_a(&SESSION, package_name, package_info)
}

pub unsafe fn query_security_package_info_a(
    session: &DiagnosticSession,
    package_name: *mut c_char,
    package_info: *mut *mut SecPkgInfoA,
) -> SecurityStatus {
    const NAME: &str = "QuerySecurityPackageInfoA";
    let Some(real) = session
        .table()
        .resolve::<QuerySecurityPackageInfoAFn>(HookId::QuerySecurityPackageInfoA)
    else {
        return missing_original(session, NAME, SEC_E_INTERNAL_ERROR);
    };

    intercept(
        session,
        NAME,
        LibraryKind::Security,
        |log| {
            log.enter();
            log.info(&str_field("pszPackageName", dump::ansi(package_name).as_deref()));
            log.info(&ptr_field("ppPackageInfo", package_info));
        },
        || real(package_name, package_info),
        |log, status, _| {
            if is_success(*status) && !package_info.is_null() {
                dump::package_info(log, *package_info);
            }
            log.exit_status(*status);
        },
    )
}

pub unsafe extern "system" fn hooked_query_context_attributes_a(
    context: *mut SecHandle,
    attribute: u32,
    buffer: *mut c_void,
) -> SecurityStatus {
    query_context_attributes_a(&SESSION, context, attribute, buffer)
}

pub unsafe fn query_context_attributes_a(
    session: &DiagnosticSession,
    context: *mut SecHandle,
    attribute: u32,
    buffer: *mut c_void,
) -> SecurityStatus {
    const NAME: &str = "QueryContextAttributesA";
    let Some(real) = session
        .table()
        .resolve::<QueryContextAttributesAFn>(HookId::QueryContextAttributesA)
    else {
        return missing_original(session, NAME, SEC_E_INTERNAL_ERROR);
    };

    intercept(
        session,
        NAME,
        LibraryKind::Security,
        |log| {
            log.enter();
            dump::handle(log, "phContext", context);
            log.info(&field("ulAttribute", format!("{} {}", attribute, secpkg_attr_name(attribute))));
            log.info(&ptr_field("pBuffer", buffer));
        },
        || real(context, attribute, buffer),
        |log, status, _| {
            if is_success(*status) {
                dump::context_attribute(log, attribute, buffer);
            }
            log.exit_status(*status);
        },
    )
}
