// Copyright (c) 2024 HUTAOSHUSBAND - Wallbangbros.com/CodeConfuser.dev
// All rights reserved.

//! Security-negotiation and certificate-chain status vocabularies.

pub const UNKNOWN_SECURITY_STATUS: &str = "UNKNOWN_SEC_E_CODE";
pub const UNKNOWN_CERT_CHAIN_POLICY_STATUS: &str = "UNKNOWN_CERT_CHAIN_POLICY_STATUS";

pub const SEC_E_OK: i32 = 0x0000_0000;
pub const SEC_E_INSUFFICIENT_MEMORY: i32 = 0x8009_0300_u32 as i32;
pub const SEC_E_INVALID_HANDLE: i32 = 0x8009_0301_u32 as i32;
pub const SEC_E_UNSUPPORTED_FUNCTION: i32 = 0x8009_0302_u32 as i32;
pub const SEC_E_TARGET_UNKNOWN: i32 = 0x8009_0303_u32 as i32;
pub const SEC_E_INTERNAL_ERROR: i32 = 0x8009_0304_u32 as i32;
pub const SEC_E_SECPKG_NOT_FOUND: i32 = 0x8009_0305_u32 as i32;
pub const SEC_E_NOT_OWNER: i32 = 0x8009_0306_u32 as i32;
pub const SEC_E_CANNOT_INSTALL: i32 = 0x8009_0307_u32 as i32;
pub const SEC_E_INVALID_TOKEN: i32 = 0x8009_0308_u32 as i32;
pub const SEC_E_CANNOT_PACK: i32 = 0x8009_0309_u32 as i32;
pub const SEC_E_QOP_NOT_SUPPORTED: i32 = 0x8009_030A_u32 as i32;
pub const SEC_E_NO_IMPERSONATION: i32 = 0x8009_030B_u32 as i32;
pub const SEC_E_LOGON_DENIED: i32 = 0x8009_030C_u32 as i32;
pub const SEC_E_UNKNOWN_CREDENTIALS: i32 = 0x8009_030D_u32 as i32;
pub const SEC_E_NO_CREDENTIALS: i32 = 0x8009_030E_u32 as i32;
pub const SEC_E_MESSAGE_ALTERED: i32 = 0x8009_030F_u32 as i32;
pub const SEC_E_OUT_OF_SEQUENCE: i32 = 0x8009_0310_u32 as i32;
pub const SEC_E_NO_AUTHENTICATING_AUTHORITY: i32 = 0x8009_0311_u32 as i32;
pub const SEC_I_CONTINUE_NEEDED: i32 = 0x0009_0312_u32 as i32;
pub const SEC_I_COMPLETE_NEEDED: i32 = 0x0009_0313_u32 as i32;
pub const SEC_I_COMPLETE_AND_CONTINUE: i32 = 0x0009_0314_u32 as i32;
pub const SEC_I_LOCAL_LOGON: i32 = 0x0009_0315_u32 as i32;
pub const SEC_E_BAD_PKGID: i32 = 0x8009_0316_u32 as i32;
pub const SEC_E_CONTEXT_EXPIRED: i32 = 0x8009_0317_u32 as i32;
pub const SEC_I_CONTEXT_EXPIRED: i32 = 0x0009_0317_u32 as i32;
pub const SEC_E_INCOMPLETE_MESSAGE: i32 = 0x8009_0318_u32 as i32;
pub const SEC_E_INCOMPLETE_CREDENTIALS: i32 = 0x8009_0320_u32 as i32;
pub const SEC_E_BUFFER_TOO_SMALL: i32 = 0x8009_0321_u32 as i32;
pub const SEC_I_INCOMPLETE_CREDENTIALS: i32 = 0x0009_0320_u32 as i32;
pub const SEC_I_RENEGOTIATE: i32 = 0x0009_0321_u32 as i32;
pub const SEC_E_WRONG_PRINCIPAL: i32 = 0x8009_0322_u32 as i32;
pub const SEC_I_NO_LSA_CONTEXT: i32 = 0x0009_0323_u32 as i32;
pub const SEC_E_TIME_SKEW: i32 = 0x8009_0324_u32 as i32;
pub const SEC_E_UNTRUSTED_ROOT: i32 = 0x8009_0325_u32 as i32;
pub const SEC_E_ILLEGAL_MESSAGE: i32 = 0x8009_0326_u32 as i32;
pub const SEC_E_CERT_UNKNOWN: i32 = 0x8009_0327_u32 as i32;
pub const SEC_E_CERT_EXPIRED: i32 = 0x8009_0328_u32 as i32;
pub const SEC_E_ENCRYPT_FAILURE: i32 = 0x8009_0329_u32 as i32;
pub const SEC_E_DECRYPT_FAILURE: i32 = 0x8009_0330_u32 as i32;
pub const SEC_E_ALGORITHM_MISMATCH: i32 = 0x8009_0331_u32 as i32;
pub const SEC_E_SECURITY_QOS_FAILED: i32 = 0x8009_0332_u32 as i32;
pub const SEC_E_UNFINISHED_CONTEXT_DELETED: i32 = 0x8009_0333_u32 as i32;
pub const SEC_E_NO_TGT_REPLY: i32 = 0x8009_0334_u32 as i32;
pub const SEC_E_NO_IP_ADDRESSES: i32 = 0x8009_0335_u32 as i32;
pub const SEC_E_WRONG_CREDENTIAL_HANDLE: i32 = 0x8009_0336_u32 as i32;
pub const SEC_E_CRYPTO_SYSTEM_INVALID: i32 = 0x8009_0337_u32 as i32;
pub const SEC_E_MAX_REFERRALS_EXCEEDED: i32 = 0x8009_0338_u32 as i32;
pub const SEC_E_MUST_BE_KDC: i32 = 0x8009_0339_u32 as i32;
pub const SEC_E_STRONG_CRYPTO_NOT_SUPPORTED: i32 = 0x8009_033A_u32 as i32;
pub const SEC_E_TOO_MANY_PRINCIPALS: i32 = 0x8009_033B_u32 as i32;
pub const SEC_E_NO_PA_DATA: i32 = 0x8009_033C_u32 as i32;
pub const SEC_E_PKINIT_NAME_MISMATCH: i32 = 0x8009_033D_u32 as i32;
pub const SEC_E_SMARTCARD_LOGON_REQUIRED: i32 = 0x8009_033E_u32 as i32;
pub const SEC_E_SHUTDOWN_IN_PROGRESS: i32 = 0x8009_033F_u32 as i32;
pub const SEC_E_KDC_INVALID_REQUEST: i32 = 0x8009_0340_u32 as i32;
pub const SEC_E_KDC_UNABLE_TO_REFER: i32 = 0x8009_0341_u32 as i32;
pub const SEC_E_KDC_UNKNOWN_ETYPE: i32 = 0x8009_0342_u32 as i32;
pub const SEC_E_UNSUPPORTED_PREAUTH: i32 = 0x8009_0343_u32 as i32;
pub const SEC_E_DELEGATION_REQUIRED: i32 = 0x8009_0345_u32 as i32;
pub const SEC_E_BAD_BINDINGS: i32 = 0x8009_0346_u32 as i32;
pub const SEC_E_MULTIPLE_ACCOUNTS: i32 = 0x8009_0347_u32 as i32;
pub const SEC_E_NO_KERB_KEY: i32 = 0x8009_0348_u32 as i32;

/// Every security status the decoder knows, in the order they are declared.
pub const SECURITY_STATUS_TABLE: &[(i32, &str, &str)] = &[
    (SEC_E_OK, "SEC_E_OK", "The operation completed successfully"),
    (SEC_E_INSUFFICIENT_MEMORY, "SEC_E_INSUFFICIENT_MEMORY", "Not enough memory is available to complete this request"),
    (SEC_E_INVALID_HANDLE, "SEC_E_INVALID_HANDLE", "The handle specified is invalid"),
    (SEC_E_UNSUPPORTED_FUNCTION, "SEC_E_UNSUPPORTED_FUNCTION", "The function requested is not supported"),
    (SEC_E_TARGET_UNKNOWN, "SEC_E_TARGET_UNKNOWN", "The specified target is unknown or unreachable"),
    (SEC_E_INTERNAL_ERROR, "SEC_E_INTERNAL_ERROR", "The Local Security Authority cannot be contacted"),
    (SEC_E_SECPKG_NOT_FOUND, "SEC_E_SECPKG_NOT_FOUND", "The requested security package does not exist"),
    (SEC_E_NOT_OWNER, "SEC_E_NOT_OWNER", "The caller is not the owner of the desired credentials"),
    (SEC_E_CANNOT_INSTALL, "SEC_E_CANNOT_INSTALL", "The security package failed to initialize, and cannot be installed"),
    (SEC_E_INVALID_TOKEN, "SEC_E_INVALID_TOKEN", "The token supplied to the function is invalid"),
    (SEC_E_CANNOT_PACK, "SEC_E_CANNOT_PACK", "The security package is not able to marshall the logon buffer, so the logon attempt has failed"),
    (SEC_E_QOP_NOT_SUPPORTED, "SEC_E_QOP_NOT_SUPPORTED", "The per-message Quality of Protection is not supported by the security package"),
    (SEC_E_NO_IMPERSONATION, "SEC_E_NO_IMPERSONATION", "The security context does not allow impersonation of the client"),
    (SEC_E_LOGON_DENIED, "SEC_E_LOGON_DENIED", "The logon attempt failed"),
    (SEC_E_UNKNOWN_CREDENTIALS, "SEC_E_UNKNOWN_CREDENTIALS", "The credentials supplied to the package were not recognized"),
    (SEC_E_NO_CREDENTIALS, "SEC_E_NO_CREDENTIALS", "No credentials are available in the security package"),
    (SEC_E_MESSAGE_ALTERED, "SEC_E_MESSAGE_ALTERED", "The message or signature supplied for verification has been altered"),
    (SEC_E_OUT_OF_SEQUENCE, "SEC_E_OUT_OF_SEQUENCE", "The message supplied for verification is out of sequence"),
    (SEC_E_NO_AUTHENTICATING_AUTHORITY, "SEC_E_NO_AUTHENTICATING_AUTHORITY", "No authority could be contacted for authentication"),
    (SEC_I_CONTINUE_NEEDED, "SEC_I_CONTINUE_NEEDED", "The function completed successfully, but must be called again to complete the context"),
    (SEC_I_COMPLETE_NEEDED, "SEC_I_COMPLETE_NEEDED", "The function completed successfully, but CompleteToken must be called"),
    (SEC_I_COMPLETE_AND_CONTINUE, "SEC_I_COMPLETE_AND_CONTINUE", "The function completed successfully, but both CompleteToken and this function must be called to complete the context"),
    (SEC_I_LOCAL_LOGON, "SEC_I_LOCAL_LOGON", "The logon was completed, but no network authority was available. The logon was made using locally known information"),
    (SEC_E_BAD_PKGID, "SEC_E_BAD_PKGID", "The requested security package does not exist"),
    (SEC_E_CONTEXT_EXPIRED, "SEC_E_CONTEXT_EXPIRED", "The context has expired and can no longer be used"),
    (SEC_I_CONTEXT_EXPIRED, "SEC_I_CONTEXT_EXPIRED", "The context has expired and can no longer be used"),
    (SEC_E_INCOMPLETE_MESSAGE, "SEC_E_INCOMPLETE_MESSAGE", "The supplied message is incomplete. The signature was not verified"),
    (SEC_E_INCOMPLETE_CREDENTIALS, "SEC_E_INCOMPLETE_CREDENTIALS", "The credentials supplied were not complete, and could not be verified. The context could not be initialized"),
    (SEC_E_BUFFER_TOO_SMALL, "SEC_E_BUFFER_TOO_SMALL", "The buffers supplied to a function were too small"),
    (SEC_I_INCOMPLETE_CREDENTIALS, "SEC_I_INCOMPLETE_CREDENTIALS", "The credentials supplied were not complete, and could not be verified. Additional information can be returned from the context"),
    (SEC_I_RENEGOTIATE, "SEC_I_RENEGOTIATE", "The context data must be renegotiated with the peer"),
    (SEC_E_WRONG_PRINCIPAL, "SEC_E_WRONG_PRINCIPAL", "The target principal name is incorrect"),
    (SEC_I_NO_LSA_CONTEXT, "SEC_I_NO_LSA_CONTEXT", "There is no LSA mode context associated with this context"),
    (SEC_E_TIME_SKEW, "SEC_E_TIME_SKEW", "The clocks on the client and server machines are skewed"),
    (SEC_E_UNTRUSTED_ROOT, "SEC_E_UNTRUSTED_ROOT", "The certificate chain was issued by an authority that is not trusted"),
    (SEC_E_ILLEGAL_MESSAGE, "SEC_E_ILLEGAL_MESSAGE", "The message received was unexpected or badly formatted"),
    (SEC_E_CERT_UNKNOWN, "SEC_E_CERT_UNKNOWN", "An unknown error occurred while processing the certificate"),
    (SEC_E_CERT_EXPIRED, "SEC_E_CERT_EXPIRED", "The received certificate has expired"),
    (SEC_E_ENCRYPT_FAILURE, "SEC_E_ENCRYPT_FAILURE", "The specified data could not be encrypted"),
    (SEC_E_DECRYPT_FAILURE, "SEC_E_DECRYPT_FAILURE", "The specified data could not be decrypted"),
    (SEC_E_ALGORITHM_MISMATCH, "SEC_E_ALGORITHM_MISMATCH", "The client and server cannot communicate, because they do not possess a common algorithm"),
    (SEC_E_SECURITY_QOS_FAILED, "SEC_E_SECURITY_QOS_FAILED", "The security context could not be established due to a failure in the requested quality of service (e.g. mutual authentication or delegation)"),
    (SEC_E_UNFINISHED_CONTEXT_DELETED, "SEC_E_UNFINISHED_CONTEXT_DELETED", "A security context was deleted before the context was completed. This is considered a logon failure"),
    (SEC_E_NO_TGT_REPLY, "SEC_E_NO_TGT_REPLY", "The client is trying to negotiate a context and the server requires user-to-user but didn't send a TGT reply"),
    (SEC_E_NO_IP_ADDRESSES, "SEC_E_NO_IP_ADDRESSES", "Unable to accomplish the requested task because the local machine does not have any IP addresses"),
    (SEC_E_WRONG_CREDENTIAL_HANDLE, "SEC_E_WRONG_CREDENTIAL_HANDLE", "The supplied credential handle does not match the credential associated with the security context"),
    (SEC_E_CRYPTO_SYSTEM_INVALID, "SEC_E_CRYPTO_SYSTEM_INVALID", "The crypto system or checksum function is invalid because a required function is unavailable"),
    (SEC_E_MAX_REFERRALS_EXCEEDED, "SEC_E_MAX_REFERRALS_EXCEEDED", "The number of maximum ticket referrals has been exceeded"),
    (SEC_E_MUST_BE_KDC, "SEC_E_MUST_BE_KDC", "The local machine must be a Kerberos KDC (domain controller) and it is not"),
    (SEC_E_STRONG_CRYPTO_NOT_SUPPORTED, "SEC_E_STRONG_CRYPTO_NOT_SUPPORTED", "The other end of the security negotiation requires strong crypto but it is not supported on the local machine"),
    (SEC_E_TOO_MANY_PRINCIPALS, "SEC_E_TOO_MANY_PRINCIPALS", "The KDC reply contained more than one principal name"),
    (SEC_E_NO_PA_DATA, "SEC_E_NO_PA_DATA", "Expected to find PA data for a hint of what etype to use, but it was not found"),
    (SEC_E_PKINIT_NAME_MISMATCH, "SEC_E_PKINIT_NAME_MISMATCH", "The client cert name does not match the user name or the KDC name is incorrect"),
    (SEC_E_SMARTCARD_LOGON_REQUIRED, "SEC_E_SMARTCARD_LOGON_REQUIRED", "Smartcard logon is required and was not used"),
    (SEC_E_SHUTDOWN_IN_PROGRESS, "SEC_E_SHUTDOWN_IN_PROGRESS", "A system shutdown is in progress"),
    (SEC_E_KDC_INVALID_REQUEST, "SEC_E_KDC_INVALID_REQUEST", "An invalid request was sent to the KDC"),
    (SEC_E_KDC_UNABLE_TO_REFER, "SEC_E_KDC_UNABLE_TO_REFER", "The KDC was unable to generate a referral for the service requested"),
    (SEC_E_KDC_UNKNOWN_ETYPE, "SEC_E_KDC_UNKNOWN_ETYPE", "The encryption type requested is not supported by the KDC"),
    (SEC_E_UNSUPPORTED_PREAUTH, "SEC_E_UNSUPPORTED_PREAUTH", "An unsupported preauthentication mechanism was presented to the kerberos package"),
    (SEC_E_DELEGATION_REQUIRED, "SEC_E_DELEGATION_REQUIRED", "The requested operation requires delegation to be enabled on the machine"),
    (SEC_E_BAD_BINDINGS, "SEC_E_BAD_BINDINGS", "Client's supplied SSPI channel bindings were incorrect"),
    (SEC_E_MULTIPLE_ACCOUNTS, "SEC_E_MULTIPLE_ACCOUNTS", "The received certificate was mapped to multiple accounts"),
    (SEC_E_NO_KERB_KEY, "SEC_E_NO_KERB_KEY", "No Kerberos key was found"),
];

pub const S_OK: u32 = 0x0000_0000;
pub const TRUST_E_CERT_SIGNATURE: u32 = 0x8009_6004;
pub const TRUST_E_BASIC_CONSTRAINTS: u32 = 0x8009_6019;
pub const CERT_E_EXPIRED: u32 = 0x800B_0101;
pub const CERT_E_VALIDITYPERIODNESTING: u32 = 0x800B_0102;
pub const CERT_E_ROLE: u32 = 0x800B_0103;
pub const CERT_E_PURPOSE: u32 = 0x800B_0106;
pub const CERT_E_UNTRUSTEDROOT: u32 = 0x800B_0109;
pub const CERT_E_CHAINING: u32 = 0x800B_010A;
pub const CERT_E_REVOKED: u32 = 0x800B_010C;
pub const CERT_E_UNTRUSTEDTESTROOT: u32 = 0x800B_010D;
pub const CERT_E_REVOCATION_FAILURE: u32 = 0x800B_010E;
pub const CERT_E_CN_NO_MATCH: u32 = 0x800B_010F;
pub const CERT_E_WRONG_USAGE: u32 = 0x800B_0110;
pub const CRYPT_E_REVOKED: u32 = 0x8009_2010;
pub const CRYPT_E_REVOCATION_OFFLINE: u32 = 0x8009_2013;

pub const CERT_CHAIN_POLICY_STATUS_TABLE: &[(u32, &str)] = &[
    (S_OK, "S_OK"),
    (TRUST_E_CERT_SIGNATURE, "TRUST_E_CERT_SIGNATURE"),
    (CERT_E_UNTRUSTEDROOT, "CERT_E_UNTRUSTEDROOT"),
    (CERT_E_UNTRUSTEDTESTROOT, "CERT_E_UNTRUSTEDTESTROOT"),
    (CERT_E_CHAINING, "CERT_E_CHAINING"),
    (CERT_E_WRONG_USAGE, "CERT_E_WRONG_USAGE"),
    (CERT_E_EXPIRED, "CERT_E_EXPIRED"),
    (CERT_E_VALIDITYPERIODNESTING, "CERT_E_VALIDITYPERIODNESTING"),
    (CERT_E_PURPOSE, "CERT_E_PURPOSE"),
    (TRUST_E_BASIC_CONSTRAINTS, "TRUST_E_BASIC_CONSTRAINTS"),
    (CERT_E_ROLE, "CERT_E_ROLE"),
    (CERT_E_CN_NO_MATCH, "CERT_E_CN_NO_MATCH"),
    (CRYPT_E_REVOKED, "CRYPT_E_REVOKED"),
    (CRYPT_E_REVOCATION_OFFLINE, "CRYPT_E_REVOCATION_OFFLINE"),
    (CERT_E_REVOKED, "CERT_E_REVOKED"),
    (CERT_E_REVOCATION_FAILURE, "CERT_E_REVOCATION_FAILURE"),
];

/// Returns the mnemonic for a SECURITY_STATUS, or the unknown marker.
pub fn security_status_name(status: i32) -> &'static str {
    SECURITY_STATUS_TABLE
        .iter()
        .find(|(code, _, _)| *code == status)
        .map(|(_, name, _)| *name)
        .unwrap_or(UNKNOWN_SECURITY_STATUS)
}

/// `MNEMONIC (description)` for a SECURITY_STATUS.
pub fn describe_security_status(status: i32) -> String {
    match SECURITY_STATUS_TABLE.iter().find(|(code, _, _)| *code == status) {
        Some((_, name, description)) => format!("{} ({})", name, description),
        None => UNKNOWN_SECURITY_STATUS.to_string(),
    }
}

pub fn cert_chain_policy_status_name(status: u32) -> &'static str {
    CERT_CHAIN_POLICY_STATUS_TABLE
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, name)| *name)
        .unwrap_or(UNKNOWN_CERT_CHAIN_POLICY_STATUS)
}

/// Success in the SECURITY_STATUS sense: informational SEC_I codes count.
pub fn is_success(status: i32) -> bool {
    status >= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_known_status_decodes_to_its_mnemonic() {
        for (code, name, description) in SECURITY_STATUS_TABLE {
            assert_eq!(security_status_name(*code), *name);
            let described = describe_security_status(*code);
            assert!(described.starts_with(name));
            assert!(described.contains(description));
        }
    }

    #[test]
    fn test_known_security_statuses() {
        assert_eq!(security_status_name(SEC_E_LOGON_DENIED), "SEC_E_LOGON_DENIED");
        assert_eq!(
            describe_security_status(SEC_E_LOGON_DENIED),
            "SEC_E_LOGON_DENIED (The logon attempt failed)"
        );
        assert_eq!(security_status_name(0x0009_0312), "SEC_I_CONTINUE_NEEDED");
        assert_eq!(security_status_name(0x8009_0322_u32 as i32), "SEC_E_WRONG_PRINCIPAL");
    }

    #[test]
    fn test_unknown_security_status() {
        assert_eq!(security_status_name(0x1234), UNKNOWN_SECURITY_STATUS);
        assert_eq!(describe_security_status(-1), UNKNOWN_SECURITY_STATUS);
        assert!(!describe_security_status(0x7fff_ffff).is_empty());
    }

    #[test]
    fn test_cert_chain_policy_status() {
        for (code, name) in CERT_CHAIN_POLICY_STATUS_TABLE {
            assert_eq!(cert_chain_policy_status_name(*code), *name);
        }
        assert_eq!(cert_chain_policy_status_name(0x800B_010F), "CERT_E_CN_NO_MATCH");
        assert_eq!(cert_chain_policy_status_name(1), UNKNOWN_CERT_CHAIN_POLICY_STATUS);
    }

    #[test]
    fn test_status_codes_are_unique() {
        let mut codes: Vec<i32> = SECURITY_STATUS_TABLE.iter().map(|(c, _, _)| *c).collect();
        codes.sort_unstable();
        let len = codes.len();
        codes.dedup();
        assert_eq!(codes.len(), len);
    }

    #[test]
    fn test_informational_codes_are_success() {
        assert!(is_success(SEC_I_CONTINUE_NEEDED));
        assert!(is_success(SEC_E_OK));
        assert!(!is_success(SEC_E_INTERNAL_ERROR));
    }
}
