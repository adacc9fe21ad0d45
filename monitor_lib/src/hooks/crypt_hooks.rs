//! Wrappers for the crypt32.dll chain building and verification calls.

use super::{dump, intercept, missing_original, CallLog};
use crate::context::subject_names_host;
use crate::ffi::*;
use crate::session::{DiagnosticSession, SESSION};
use crate::table::HookId;
use sspi_shared::decode::cert_chain_policy_status_name;
use sspi_shared::decode::format_timestamp;
use sspi_shared::decode::names::{auth_type_name, chain_policy_name, CERT_CHAIN_POLICY_SSL};
use sspi_shared::logging::{field, hex_field, ptr_field, str_field};
use sspi_shared::LibraryKind;
use std::ffi::{c_char, c_void};
use std::ptr::null_mut;

const NAME_ENCODING: u32 = X509_ASN_ENCODING | PKCS_7_ASN_ENCODING;
const NAME_STR_TYPE: u32 = CERT_X500_NAME_STR | CERT_NAME_STR_NO_PLUS_FLAG;

fn trust_status(log: &CallLog<'_>, prefix: &str, status: &CERT_TRUST_STATUS) {
    log.info(&hex_field(&format!("{}dwErrorStatus", prefix), status.dwErrorStatus));
    log.info(&hex_field(&format!("{}dwInfoStatus", prefix), status.dwInfoStatus));
}

#[allow(clippy::too_many_arguments)]
pub unsafe extern "system" fn hooked_cert_get_certificate_chain(
    chain_engine: *mut c_void,
    cert_context: *const CERT_CONTEXT,
    time: *const FILETIME,
    additional_store: *mut c_void,
    chain_para: *const c_void,
    flags: u32,
    reserved: *mut c_void,
    chain_context: *mut *const CERT_CHAIN_CONTEXT,
) -> Bool {
    cert_get_certificate_chain(
        &SESSION,
        chain_engine,
        cert_context,
        time,
        additional_store,
        chain_para,
        flags,
        reserved,
        chain_context,
    )
}

#[allow(clippy::too_many_arguments)]
pub unsafe fn cert_get_certificate_chain(
    session: &DiagnosticSession,
    chain_engine: *mut c_void,
    cert_context: *const CERT_CONTEXT,
    time: *const FILETIME,
    additional_store: *mut c_void,
    chain_para: *const c_void,
    flags: u32,
    reserved: *mut c_void,
    chain_context: *mut *const CERT_CHAIN_CONTEXT,
) -> Bool {
    const NAME: &str = "CertGetCertificateChain";
    let Some(real) = session
        .table()
        .resolve::<CertGetCertificateChainFn>(HookId::CertGetCertificateChain)
    else {
        return missing_original(session, NAME, FALSE);
    };

    intercept(
        session,
        NAME,
        LibraryKind::Certificate,
        |log| {
            log.enter();
            log.info(&ptr_field("hChainEngine", chain_engine));
            log.info(&ptr_field("pCertContext", cert_context));
            log.info(&ptr_field("pTime", time));
            log.info(&ptr_field("hAdditionalStore", additional_store));
            log.info(&ptr_field("pChainPara", chain_para));
            log.info(&hex_field("dwFlags", flags));
            log.info(&ptr_field("ppChainContext", chain_context));
        },
        || {
            real(
                chain_engine,
                cert_context,
                time,
                additional_store,
                chain_para,
                flags,
                reserved,
                chain_context,
            )
        },
        |log, result, error| {
            if *result != FALSE && !chain_context.is_null() {
                let chain = *chain_context;
                log.info(&ptr_field("*ppChainContext", chain));
                if !chain.is_null() {
                    trust_status(log, "  TrustStatus.", &(*chain).TrustStatus);
                    log.info(&field("  cChain", (*chain).cChain));
                }
            }
            log.exit_bool(*result, error);
        },
    )
}

pub unsafe extern "system" fn hooked_cert_name_to_str_w(
    encoding: u32,
    name: *const CRYPT_INTEGER_BLOB,
    str_type: u32,
    psz: *mut u16,
    csz: u32,
) -> u32 {
    cert_name_to_str_w(&SESSION, encoding, name, str_type, psz, csz)
}

/// Besides logging, checks the formatted name against the host the
/// connection is expected to reach.
pub unsafe fn cert_name_to_str_w(
    session: &DiagnosticSession,
    encoding: u32,
    name: *const CRYPT_INTEGER_BLOB,
    str_type: u32,
    psz: *mut u16,
    csz: u32,
) -> u32 {
    const NAME: &str = "CertNameToStrW";
    let Some(real) = session.table().resolve::<CertNameToStrWFn>(HookId::CertNameToStrW) else {
        return missing_original(session, NAME, 0);
    };

    intercept(
        session,
        NAME,
        LibraryKind::Certificate,
        |log| {
            log.enter();
            log.info(&hex_field("dwCertEncodingType", encoding));
            log.info(&ptr_field("pName", name));
            log.info(&hex_field("dwStrType", str_type));
            log.info(&ptr_field("psz", psz));
            log.info(&field("csz", csz));
        },
        || real(encoding, name, str_type, psz, csz),
        |log, returned, _| {
            if *returned > 0 && csz > 0 {
                let subject = dump::wide_counted(psz, (*returned).min(csz) as usize);
                log.info(&str_field("*psz", subject.as_deref()));
                if let Some(subject) = subject.filter(|s| !s.is_empty()) {
                    correlate_subject(log, &subject);
                }
            }
            log.exit_value(*returned);
        },
    )
}

/// Advisory only: the real verification result is never changed.
fn correlate_subject(log: &CallLog<'_>, subject: &str) {
    match log.session().context().expected_host() {
        None => log.info(&format!(
            "No server name recorded, skipping subject check of [{}]",
            subject
        )),
        Some(host) if subject_names_host(subject, &host) => log.info(&format!(
            "Successfully located server name [{}] in subject [{}], VerifyServerCertificate will continue",
            host, subject
        )),
        Some(host) => log.warn(&format!(
            "Could not locate server name [{}] in subject [{}], VerifyServerCertificate will return CERT_E_CN_NO_MATCH",
            host, subject
        )),
    }
}

unsafe fn policy_name(oid: *const c_char) -> String {
    let small = oid as usize;
    if small <= 0xFFFF {
        return match chain_policy_name(small) {
            Some(name) => format!("{} {}", small, name),
            None => format!("{} UNKNOWN_CERT_CHAIN_POLICY", small),
        };
    }
    dump::ansi(oid).unwrap_or_default()
}

pub unsafe extern "system" fn hooked_cert_verify_certificate_chain_policy(
    policy_oid: *const c_char,
    chain_context: *const CERT_CHAIN_CONTEXT,
    policy_para: *const CERT_CHAIN_POLICY_PARA,
    policy_status: *mut CERT_CHAIN_POLICY_STATUS,
) -> Bool {
    cert_verify_certificate_chain_policy(&SESSION, policy_oid, chain_context, policy_para, policy_status)
}

pub unsafe fn cert_verify_certificate_chain_policy(
    session: &DiagnosticSession,
    policy_oid: *const c_char,
    chain_context: *const CERT_CHAIN_CONTEXT,
    policy_para: *const CERT_CHAIN_POLICY_PARA,
    policy_status: *mut CERT_CHAIN_POLICY_STATUS,
) -> Bool {
    const NAME: &str = "CertVerifyCertificateChainPolicy";
    let Some(real) = session
        .table()
        .resolve::<CertVerifyCertificateChainPolicyFn>(HookId::CertVerifyCertificateChainPolicy)
    else {
        return missing_original(session, NAME, FALSE);
    };

    intercept(
        session,
        NAME,
        LibraryKind::Certificate,
        |log| {
            log.enter();
            log.info(&field("pszPolicyOID", policy_name(policy_oid)));
            log.info(&ptr_field("pChainContext", chain_context));
            log.info(&ptr_field("pPolicyPara", policy_para));
            if !policy_para.is_null() {
                let para = &*policy_para;
                log.info(&hex_field("  dwFlags", para.dwFlags));
                log.info(&ptr_field("  pvExtraPolicyPara", para.pvExtraPolicyPara));
                if policy_oid as usize == CERT_CHAIN_POLICY_SSL && !para.pvExtraPolicyPara.is_null() {
                    let https = &*(para.pvExtraPolicyPara as *const HTTPSPolicyCallbackData);
                    log.info(&field(
                        "    dwAuthType",
                        format!("{} {}", https.dwAuthType, auth_type_name(https.dwAuthType)),
                    ));
                    log.info(&hex_field("    fdwChecks", https.fdwChecks));
                    log.info(&str_field(
                        "    pwszServerName",
                        dump::wide(https.pwszServerName).as_deref(),
                    ));
                }
            }
            log.info(&ptr_field("pPolicyStatus", policy_status));
        },
        || real(policy_oid, chain_context, policy_para, policy_status),
        |log, result, error| {
            if !policy_status.is_null() {
                let status = &*policy_status;
                log.info(&field(
                    "  dwError",
                    format!("0x{:08x} {}", status.dwError, cert_chain_policy_status_name(status.dwError)),
                ));
                log.info(&field("  lChainIndex", status.lChainIndex));
                log.info(&field("  lElementIndex", status.lElementIndex));
                if status.dwError != 0 && log.session().config().chain_dump {
                    display_chain(log, chain_context);
                }
            }
            log.exit_bool(*result, error);
        },
    )
}

/// Formats a certificate name through the original CertNameToStrW.
unsafe fn render_name(session: &DiagnosticSession, blob: *const CRYPT_INTEGER_BLOB) -> Option<String> {
    let real = session.table().resolve::<CertNameToStrWFn>(HookId::CertNameToStrW)?;
    let needed = real(NAME_ENCODING, blob, NAME_STR_TYPE, null_mut(), 0);
    if needed == 0 {
        return None;
    }
    let mut buf = vec![0u16; needed as usize];
    let written = real(NAME_ENCODING, blob, NAME_STR_TYPE, buf.as_mut_ptr(), needed);
    dump::wide_counted(buf.as_ptr(), written.min(needed) as usize)
}

/// Leaf to root over the first simple chain.
unsafe fn display_chain(log: &CallLog<'_>, chain: *const CERT_CHAIN_CONTEXT) {
    log.info("ENTER DisplayCertChain");
    let simple = if chain.is_null() || (*chain).cChain == 0 || (*chain).rgpChain.is_null() {
        null_mut()
    } else {
        *(*chain).rgpChain
    };
    if !simple.is_null() && !(*simple).rgpElement.is_null() {
        let elements = std::slice::from_raw_parts((*simple).rgpElement, (*simple).cElement as usize);
        for (index, element) in elements.iter().enumerate() {
            if element.is_null() {
                continue;
            }
            let element = &**element;
            log.info(&format!("  Element {}", index));
            let cert = element.pCertContext;
            if !cert.is_null() && !(*cert).pCertInfo.is_null() {
                let info = &*(*cert).pCertInfo;
                let subject = render_name(log.session(), &info.Subject);
                let issuer = render_name(log.session(), &info.Issuer);
                log.info(&str_field("    Subject", subject.as_deref()));
                log.info(&str_field("    Issuer", issuer.as_deref()));
                log.info(&field("    NotAfter", format_timestamp(filetime_ticks(&info.NotAfter))));
            } else {
                log.info(&ptr_field("    pCertContext", cert));
            }
            trust_status(log, "    ", &element.TrustStatus);
        }
    }
    log.info("EXIT DisplayCertChain");
}

#[allow(clippy::too_many_arguments)]
pub unsafe extern "system" fn hooked_cert_find_chain_in_store(
    store: *mut c_void,
    encoding: u32,
    find_flags: u32,
    find_type: u32,
    find_para: *const c_void,
    prev_chain_context: *const CERT_CHAIN_CONTEXT,
) -> *const CERT_CHAIN_CONTEXT {
    cert_find_chain_in_store(
        &SESSION,
        store,
        encoding,
        find_flags,
        find_type,
        find_para,
        prev_chain_context,
    )
}

#[allow(clippy::too_many_arguments)]
pub unsafe fn cert_find_chain_in_store(
    session: &DiagnosticSession,
    store: *mut c_void,
    encoding: u32,
    find_flags: u32,
    find_type: u32,
    find_para: *const c_void,
    prev_chain_context: *const CERT_CHAIN_CONTEXT,
) -> *const CERT_CHAIN_CONTEXT {
    const NAME: &str = "CertFindChainInStore";
    let Some(real) = session
        .table()
        .resolve::<CertFindChainInStoreFn>(HookId::CertFindChainInStore)
    else {
        return missing_original(session, NAME, std::ptr::null());
    };

    intercept(
        session,
        NAME,
        LibraryKind::Certificate,
        |log| {
            log.enter();
            log.info(&ptr_field("hCertStore", store));
            log.info(&hex_field("dwCertEncodingType", encoding));
            log.info(&hex_field("dwFindFlags", find_flags));
            log.info(&hex_field("dwFindType", find_type));
            log.info(&ptr_field("pvFindPara", find_para));
            log.info(&ptr_field("pPrevChainContext", prev_chain_context));
        },
        || real(store, encoding, find_flags, find_type, find_para, prev_chain_context),
        |log, found, error| {
            if found.is_null() {
                log.info(&format!("GetLastError returned {}", error));
            }
            log.exit_value(format!("0x{:08x}", *found as usize));
        },
    )
}
