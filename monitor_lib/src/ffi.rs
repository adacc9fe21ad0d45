//! Entry-point signatures of the intercepted functions, built over the
//! SDK layouts from `windows-sys`.

use std::ffi::{c_char, c_void};

pub use windows_sys::Win32::Foundation::{BOOL as Bool, FALSE, FILETIME, TRUE};
pub use windows_sys::Win32::Security::Authentication::Identity::{
    SecBuffer, SecBufferDesc, SecPkgContext_ConnectionInfo, SecPkgContext_Lifespan, SecPkgContext_NamesA,
    SecPkgContext_PackageInfoA, SecPkgContext_Sizes, SecPkgInfoA, SCHANNEL_CRED, SCHANNEL_CRED_VERSION,
};
pub use windows_sys::Win32::Security::Credentials::SecHandle;
pub use windows_sys::Win32::Security::Cryptography::{
    CERT_CHAIN_CONTEXT, CERT_CHAIN_ELEMENT, CERT_CHAIN_POLICY_PARA, CERT_CHAIN_POLICY_STATUS, CERT_CONTEXT,
    CERT_INFO, CERT_NAME_STR_NO_PLUS_FLAG, CERT_SIMPLE_CHAIN, CERT_TRUST_STATUS, CERT_X500_NAME_STR,
    CRYPT_INTEGER_BLOB, HTTPSPolicyCallbackData, PKCS_7_ASN_ENCODING, X509_ASN_ENCODING,
};
pub use windows_sys::Win32::System::Rpc::{
    SEC_WINNT_AUTH_IDENTITY_A, SEC_WINNT_AUTH_IDENTITY_ANSI, SEC_WINNT_AUTH_IDENTITY_UNICODE,
};

pub type SecurityStatus = i32;
/// 100ns ticks since 1601-01-01 UTC.
pub type TimeStamp = i64;

pub fn filetime_ticks(time: &FILETIME) -> TimeStamp {
    ((u64::from(time.dwHighDateTime) << 32) | u64::from(time.dwLowDateTime)) as i64
}

pub type AcquireCredentialsHandleAFn = unsafe extern "system" fn(
    *mut c_char,
    *mut c_char,
    u32,
    *mut c_void,
    *mut c_void,
    *mut c_void,
    *mut c_void,
    *mut SecHandle,
    *mut TimeStamp,
) -> SecurityStatus;

pub type InitializeSecurityContextAFn = unsafe extern "system" fn(
    *mut SecHandle,
    *mut SecHandle,
    *mut c_char,
    u32,
    u32,
    u32,
    *mut SecBufferDesc,
    u32,
    *mut SecHandle,
    *mut SecBufferDesc,
    *mut u32,
    *mut TimeStamp,
) -> SecurityStatus;

pub type CompleteAuthTokenFn = unsafe extern "system" fn(*mut SecHandle, *mut SecBufferDesc) -> SecurityStatus;

pub type AcceptSecurityContextFn = unsafe extern "system" fn(
    *mut SecHandle,
    *mut SecHandle,
    *mut SecBufferDesc,
    u32,
    u32,
    *mut SecHandle,
    *mut SecBufferDesc,
    *mut u32,
    *mut TimeStamp,
) -> SecurityStatus;

pub type QuerySecurityPackageInfoAFn = unsafe extern "system" fn(*mut c_char, *mut *mut SecPkgInfoA) -> SecurityStatus;

pub type QueryContextAttributesAFn = unsafe extern "system" fn(*mut SecHandle, u32, *mut c_void) -> SecurityStatus;

pub type CertGetCertificateChainFn = unsafe extern "system" fn(
    *mut c_void,
    *const CERT_CONTEXT,
    *const FILETIME,
    *mut c_void,
    *const c_void,
    u32,
    *mut c_void,
    *mut *const CERT_CHAIN_CONTEXT,
) -> Bool;

pub type CertNameToStrWFn = unsafe extern "system" fn(u32, *const CRYPT_INTEGER_BLOB, u32, *mut u16, u32) -> u32;

pub type CertVerifyCertificateChainPolicyFn = unsafe extern "system" fn(
    *const c_char,
    *const CERT_CHAIN_CONTEXT,
    *const CERT_CHAIN_POLICY_PARA,
    *mut CERT_CHAIN_POLICY_STATUS,
) -> Bool;

pub type CertFindChainInStoreFn = unsafe extern "system" fn(
    *mut c_void,
    u32,
    u32,
    u32,
    *const c_void,
    *const CERT_CHAIN_CONTEXT,
) -> *const CERT_CHAIN_CONTEXT;

// The network library exports use the C calling convention.
pub type ConnectionGetSvrUserFn = unsafe extern "C" fn(*mut c_void, *mut c_char) -> Bool;

pub type GenClientContextFn =
    unsafe extern "C" fn(u32, *mut u8, u32, *mut u8, *mut u32, *mut Bool, *mut c_char) -> Bool;

pub type InitSspiPackageFn = unsafe extern "C" fn(*mut u32) -> Bool;

pub type InitSessionFn = unsafe extern "C" fn(u32) -> Bool;

pub type TermSspiPackageFn = unsafe extern "C" fn() -> Bool;

pub type TermSessionFn = unsafe extern "C" fn(u32) -> Bool;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filetime_ticks_joins_halves() {
        let time = FILETIME {
            dwLowDateTime: 0xc89d_c000,
            dwHighDateTime: 0x01c0_7385,
        };
        assert_eq!(filetime_ticks(&time), 0x01c0_7385_c89d_c000);
    }
}
