//! Readers for the raw structures handed to the intercepted functions.
//!
//! Everything here trusts the caller's pointers the same way the real
//! function would. Null pointers are rendered, never dereferenced.

use super::CallLog;
use crate::ffi::*;
use sspi_shared::decode::names::{
    secbuffer_type_name, SECPKG_ATTR_CONNECTION_INFO, SECPKG_ATTR_LIFESPAN, SECPKG_ATTR_NAMES,
    SECPKG_ATTR_PACKAGE_INFO, SECPKG_ATTR_SIZES,
};
use sspi_shared::decode::{format_timestamp, sp_prot_flags};
use sspi_shared::logging::{field, hex_field, ptr_field, str_field};
use std::ffi::{c_char, c_void, CStr};
use widestring::{U16CStr, U16Str};

const MASKED: &str = "********";

pub(crate) unsafe fn ansi(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// Counted 8-bit string, cut at the first NUL if one comes earlier.
pub(crate) unsafe fn ansi_counted(ptr: *const u8, len: u32) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let raw = bytes(ptr, len);
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    Some(String::from_utf8_lossy(&raw[..end]).into_owned())
}

pub(crate) unsafe fn wide(ptr: *const u16) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(U16CStr::from_ptr_str(ptr).to_string_lossy())
}

/// At most `len` UTF-16 units, cut at the first NUL.
pub(crate) unsafe fn wide_counted(ptr: *const u16, len: usize) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let units = std::slice::from_raw_parts(ptr, len);
    let end = units.iter().position(|u| *u == 0).unwrap_or(units.len());
    Some(U16Str::from_slice(&units[..end]).to_string_lossy())
}

pub(crate) unsafe fn bytes<'a>(ptr: *const u8, len: u32) -> &'a [u8] {
    if ptr.is_null() || len == 0 {
        return &[];
    }
    std::slice::from_raw_parts(ptr, len as usize)
}

pub(crate) unsafe fn handle(log: &CallLog<'_>, name: &str, h: *const SecHandle) {
    if h.is_null() {
        log.info(&ptr_field(name, h));
    } else {
        let value = *h;
        log.info(&field(
            name,
            format!("0x{:08x} ({:08x}:{:08x})", h as usize, value.dwLower, value.dwUpper),
        ));
    }
}

pub(crate) unsafe fn timestamp(log: &CallLog<'_>, name: &str, ts: *const TimeStamp) {
    if ts.is_null() {
        log.info(&field(name, "<NULL>"));
    } else {
        log.info(&field(name, format_timestamp(*ts)));
    }
}

pub(crate) unsafe fn sec_buffer_desc(log: &CallLog<'_>, name: &str, desc: *const SecBufferDesc) {
    log.info(&ptr_field(name, desc));
    if desc.is_null() {
        return;
    }
    let desc = &*desc;
    log.info(&field("  ulVersion", desc.ulVersion));
    log.info(&field("  cBuffers", desc.cBuffers));
    if desc.pBuffers.is_null() {
        log.info(&ptr_field("  pBuffers", desc.pBuffers));
        return;
    }
    let buffers = std::slice::from_raw_parts(desc.pBuffers, desc.cBuffers as usize);
    for (i, buffer) in buffers.iter().enumerate() {
        log.info(&format!("  pBuffers[{}]", i));
        log.info(&field("    cbBuffer", buffer.cbBuffer));
        log.info(&field(
            "    BufferType",
            format!("0x{:08x} {}", buffer.BufferType, secbuffer_type_name(buffer.BufferType)),
        ));
        log.info(&ptr_field("    pvBuffer", buffer.pvBuffer));
        let data = bytes(buffer.pvBuffer as *const u8, buffer.cbBuffer);
        log.dump(data, buffer.pvBuffer as usize);
    }
}

pub(crate) fn is_schannel(package: Option<&str>) -> bool {
    matches!(
        package,
        Some("Microsoft Unified Security Protocol Provider") | Some("Schannel") | Some("Default TLS SSP")
    )
}

pub(crate) unsafe fn auth_identity(log: &CallLog<'_>, data: *const SEC_WINNT_AUTH_IDENTITY_A) {
    let id = &*data;
    let encoding = match id.Flags {
        SEC_WINNT_AUTH_IDENTITY_ANSI => "SEC_WINNT_AUTH_IDENTITY_ANSI",
        SEC_WINNT_AUTH_IDENTITY_UNICODE => "SEC_WINNT_AUTH_IDENTITY_UNICODE",
        _ => "UNKNOWN_AUTH_IDENTITY_FLAG",
    };
    log.info("  SEC_WINNT_AUTH_IDENTITY_A");
    log.info(&str_field("    User", ansi_counted(id.User, id.UserLength).as_deref()));
    log.info(&field("    UserLength", id.UserLength));
    log.info(&str_field("    Domain", ansi_counted(id.Domain, id.DomainLength).as_deref()));
    log.info(&field("    DomainLength", id.DomainLength));
    let password = if id.Password.is_null() {
        None
    } else if log.session().config().mask_secrets {
        Some(MASKED.to_string())
    } else {
        ansi_counted(id.Password, id.PasswordLength)
    };
    log.info(&str_field("    Password", password.as_deref()));
    log.info(&field("    PasswordLength", id.PasswordLength));
    log.info(&field("    Flags", format!("0x{:08x} {}", id.Flags, encoding)));
}

pub(crate) unsafe fn schannel_cred(log: &CallLog<'_>, data: *const SCHANNEL_CRED) {
    let cred = &*data;
    log.info("  SCHANNEL_CRED");
    log.info(&field("    dwVersion", cred.dwVersion));
    if cred.dwVersion != SCHANNEL_CRED_VERSION {
        log.warn(&format!(
            "    credential version {} is not SCHANNEL_CRED_VERSION, remaining fields not decoded",
            cred.dwVersion
        ));
        return;
    }
    log.info(&field("    cCreds", cred.cCreds));
    log.info(&ptr_field("    paCred", cred.paCred));
    log.info(&ptr_field("    hRootStore", cred.hRootStore));
    log.info(&field("    cMappers", cred.cMappers));
    log.info(&field("    cSupportedAlgs", cred.cSupportedAlgs));
    if !cred.palgSupportedAlgs.is_null() {
        let algs = std::slice::from_raw_parts(cred.palgSupportedAlgs, cred.cSupportedAlgs as usize);
        for (i, alg) in algs.iter().enumerate() {
            log.info(&hex_field(&format!("    palgSupportedAlgs[{}]", i), *alg));
        }
    }
    log.info(&field(
        "    grbitEnabledProtocols",
        format!("0x{:08x} {}", cred.grbitEnabledProtocols, sp_prot_flags(cred.grbitEnabledProtocols)),
    ));
    log.info(&field("    dwMinimumCipherStrength", cred.dwMinimumCipherStrength));
    log.info(&field("    dwMaximumCipherStrength", cred.dwMaximumCipherStrength));
    log.info(&field("    dwSessionLifespan", cred.dwSessionLifespan));
    log.info(&hex_field("    dwFlags", cred.dwFlags));
    log.info(&hex_field("    dwCredFormat", cred.dwCredFormat));
}

pub(crate) unsafe fn package_info(log: &CallLog<'_>, info: *const SecPkgInfoA) {
    if info.is_null() {
        log.info(&ptr_field("  PackageInfo", info));
        return;
    }
    let info = &*info;
    log.info(&hex_field("  fCapabilities", info.fCapabilities));
    log.info(&field("  wVersion", info.wVersion));
    log.info(&field("  wRPCID", info.wRPCID));
    log.info(&field("  cbMaxToken", info.cbMaxToken));
    log.info(&str_field("  Name", ansi(info.Name as *const c_char).as_deref()));
    log.info(&str_field("  Comment", ansi(info.Comment as *const c_char).as_deref()));
}

pub(crate) unsafe fn context_attribute(log: &CallLog<'_>, attribute: u32, buffer: *const c_void) {
    if buffer.is_null() {
        return;
    }
    match attribute {
        SECPKG_ATTR_SIZES => {
            let sizes = &*(buffer as *const SecPkgContext_Sizes);
            log.info(&field("  cbMaxToken", sizes.cbMaxToken));
            log.info(&field("  cbMaxSignature", sizes.cbMaxSignature));
            log.info(&field("  cbBlockSize", sizes.cbBlockSize));
            log.info(&field("  cbSecurityTrailer", sizes.cbSecurityTrailer));
        }
        SECPKG_ATTR_NAMES => {
            let names = &*(buffer as *const SecPkgContext_NamesA);
            log.info(&str_field("  sUserName", ansi(names.sUserName as *const c_char).as_deref()));
        }
        SECPKG_ATTR_LIFESPAN => {
            let span = &*(buffer as *const SecPkgContext_Lifespan);
            log.info(&field("  tsStart", format_timestamp(span.tsStart)));
            log.info(&field("  tsExpiry", format_timestamp(span.tsExpiry)));
        }
        SECPKG_ATTR_PACKAGE_INFO => {
            let pkg = &*(buffer as *const SecPkgContext_PackageInfoA);
            package_info(log, pkg.PackageInfo);
        }
        SECPKG_ATTR_CONNECTION_INFO => {
            let info = &*(buffer as *const SecPkgContext_ConnectionInfo);
            log.info(&field(
                "  dwProtocol",
                format!("0x{:08x} {}", info.dwProtocol, sp_prot_flags(info.dwProtocol)),
            ));
            log.info(&hex_field("  aiCipher", info.aiCipher));
            log.info(&field("  dwCipherStrength", info.dwCipherStrength));
            log.info(&hex_field("  aiHash", info.aiHash));
            log.info(&field("  dwHashStrength", info.dwHashStrength));
            log.info(&hex_field("  aiExch", info.aiExch));
            log.info(&field("  dwExchStrength", info.dwExchStrength));
        }
        _ => log.info("  buffer not decoded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counted_strings_stop_at_nul() {
        let raw = b"sa\0junk";
        let text = unsafe { ansi_counted(raw.as_ptr(), raw.len() as u32) };
        assert_eq!(text.as_deref(), Some("sa"));

        let wide_raw: Vec<u16> = "db01.corp\0xx".encode_utf16().collect();
        let text = unsafe { wide_counted(wide_raw.as_ptr(), wide_raw.len()) };
        assert_eq!(text.as_deref(), Some("db01.corp"));
        let text = unsafe { wide_counted(wide_raw.as_ptr(), 4) };
        assert_eq!(text.as_deref(), Some("db01"));
    }

    #[test]
    fn test_null_readers() {
        unsafe {
            assert!(ansi(std::ptr::null()).is_none());
            assert!(wide(std::ptr::null()).is_none());
            assert!(ansi_counted(std::ptr::null(), 4).is_none());
            assert!(bytes(std::ptr::null(), 10).is_empty());
        }
    }

    #[test]
    fn test_schannel_package_names() {
        assert!(is_schannel(Some("Schannel")));
        assert!(is_schannel(Some("Microsoft Unified Security Protocol Provider")));
        assert!(is_schannel(Some("Default TLS SSP")));
        assert!(!is_schannel(Some("Negotiate")));
        assert!(!is_schannel(None));
    }
}
