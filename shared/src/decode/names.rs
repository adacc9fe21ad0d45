// Copyright (c) 2024 HUTAOSHUSBAND - Wallbangbros.com/CodeConfuser.dev
// All rights reserved.

//! Small closed vocabularies that show up in SSPI and CryptoAPI parameters.

fn lookup(table: &[(u32, &'static str)], value: u32, unknown: &'static str) -> &'static str {
    table
        .iter()
        .find(|(code, _)| *code == value)
        .map(|(_, name)| *name)
        .unwrap_or(unknown)
}

pub const SECBUFFER_ATTRMASK: u32 = 0xF000_0000;
pub const SECBUFFER_READONLY: u32 = 0x8000_0000;
pub const SECBUFFER_READONLY_WITH_CHECKSUM: u32 = 0x1000_0000;

pub const SECBUFFER_EMPTY: u32 = 0;
pub const SECBUFFER_DATA: u32 = 1;
pub const SECBUFFER_TOKEN: u32 = 2;

const SECBUFFER_TYPES: &[(u32, &str)] = &[
    (0, "SECBUFFER_EMPTY"),
    (1, "SECBUFFER_DATA"),
    (2, "SECBUFFER_TOKEN"),
    (3, "SECBUFFER_PKG_PARAMS"),
    (4, "SECBUFFER_MISSING"),
    (5, "SECBUFFER_EXTRA"),
    (6, "SECBUFFER_STREAM_TRAILER"),
    (7, "SECBUFFER_STREAM_HEADER"),
    (8, "SECBUFFER_NEGOTIATION_INFO"),
    (9, "SECBUFFER_PADDING"),
    (10, "SECBUFFER_STREAM"),
    (11, "SECBUFFER_MECHLIST"),
    (12, "SECBUFFER_MECHLIST_SIGNATURE"),
    (13, "SECBUFFER_TARGET"),
    (14, "SECBUFFER_CHANNEL_BINDINGS"),
];

/// Name of a SecBuffer type; attribute bits in the top nibble are ignored.
pub fn secbuffer_type_name(buffer_type: u32) -> &'static str {
    lookup(SECBUFFER_TYPES, buffer_type & !SECBUFFER_ATTRMASK, "UNKNOWN_SECBUFFER_FLAG_VALUE")
}

pub const SECPKG_ATTR_SIZES: u32 = 0;
pub const SECPKG_ATTR_NAMES: u32 = 1;
pub const SECPKG_ATTR_LIFESPAN: u32 = 2;
pub const SECPKG_ATTR_PACKAGE_INFO: u32 = 10;
pub const SECPKG_ATTR_CONNECTION_INFO: u32 = 0x5a;

const SECPKG_ATTRS: &[(u32, &str)] = &[
    (0, "SECPKG_ATTR_SIZES"),
    (1, "SECPKG_ATTR_NAMES"),
    (2, "SECPKG_ATTR_LIFESPAN"),
    (3, "SECPKG_ATTR_DCE_INFO"),
    (4, "SECPKG_ATTR_STREAM_SIZES"),
    (5, "SECPKG_ATTR_KEY_INFO"),
    (6, "SECPKG_ATTR_AUTHORITY"),
    (7, "SECPKG_ATTR_PROTO_INFO"),
    (8, "SECPKG_ATTR_PASSWORD_EXPIRY"),
    (9, "SECPKG_ATTR_SESSION_KEY"),
    (10, "SECPKG_ATTR_PACKAGE_INFO"),
    (11, "SECPKG_ATTR_USER_FLAGS"),
    (12, "SECPKG_ATTR_NEGOTIATION_INFO"),
    (13, "SECPKG_ATTR_NATIVE_NAMES"),
    (14, "SECPKG_ATTR_FLAGS"),
    (15, "SECPKG_ATTR_USE_VALIDATED"),
    (16, "SECPKG_ATTR_CREDENTIAL_NAME"),
    (17, "SECPKG_ATTR_TARGET_INFORMATION"),
    (18, "SECPKG_ATTR_ACCESS_TOKEN"),
    (0x50, "SECPKG_ATTR_ISSUER_LIST"),
    (0x51, "SECPKG_ATTR_REMOTE_CRED"),
    (0x52, "SECPKG_ATTR_LOCAL_CRED"),
    (0x53, "SECPKG_ATTR_REMOTE_CERT_CONTEXT"),
    (0x54, "SECPKG_ATTR_LOCAL_CERT_CONTEXT"),
    (0x55, "SECPKG_ATTR_ROOT_STORE"),
    (0x56, "SECPKG_ATTR_SUPPORTED_ALGS"),
    (0x57, "SECPKG_ATTR_CIPHER_STRENGTHS"),
    (0x58, "SECPKG_ATTR_SUPPORTED_PROTOCOLS"),
    (0x59, "SECPKG_ATTR_ISSUER_LIST_EX"),
    (0x5a, "SECPKG_ATTR_CONNECTION_INFO"),
];

pub fn secpkg_attr_name(attribute: u32) -> &'static str {
    lookup(SECPKG_ATTRS, attribute, "UNKNOWN_SECPKG_ATTR_VALUE")
}

pub const AUTHTYPE_CLIENT: u32 = 1;
pub const AUTHTYPE_SERVER: u32 = 2;

pub fn auth_type_name(auth_type: u32) -> &'static str {
    lookup(
        &[(AUTHTYPE_CLIENT, "AUTHTYPE_CLIENT"), (AUTHTYPE_SERVER, "AUTHTYPE_SERVER")],
        auth_type,
        "UNKNOWN_AUTH_TYPE",
    )
}

pub fn credential_use_name(usage: u32) -> &'static str {
    lookup(
        &[
            (1, "SECPKG_CRED_INBOUND"),
            (2, "SECPKG_CRED_OUTBOUND"),
            (3, "SECPKG_CRED_BOTH"),
        ],
        usage,
        "UNKNOWN_SECPKG_CRED_USE",
    )
}

pub fn data_rep_name(rep: u32) -> &'static str {
    lookup(
        &[(0x10, "SECURITY_NATIVE_DREP"), (0x00, "SECURITY_NETWORK_DREP")],
        rep,
        "UNKNOWN_DREP",
    )
}

pub const CERT_CHAIN_POLICY_SSL: usize = 4;

/// Well-known chain policies are passed as small integers in place of an
/// OID string pointer.
pub fn chain_policy_name(oid: usize) -> Option<&'static str> {
    let name = match oid {
        1 => "CERT_CHAIN_POLICY_BASE",
        2 => "CERT_CHAIN_POLICY_AUTHENTICODE",
        3 => "CERT_CHAIN_POLICY_AUTHENTICODE_TS",
        4 => "CERT_CHAIN_POLICY_SSL",
        5 => "CERT_CHAIN_POLICY_BASIC_CONSTRAINTS",
        6 => "CERT_CHAIN_POLICY_NT_AUTH",
        7 => "CERT_CHAIN_POLICY_MICROSOFT_ROOT",
        8 => "CERT_CHAIN_POLICY_EV",
        9 => "CERT_CHAIN_POLICY_SSL_F12",
        _ => return None,
    };
    Some(name)
}

pub fn impersonation_level_name(level: u32) -> &'static str {
    lookup(
        &[
            (0, "SecurityAnonymous"),
            (1, "SecurityIdentification"),
            (2, "SecurityImpersonation"),
            (3, "SecurityDelegation"),
            (4, "SecurityNoImpersonation"),
        ],
        level,
        "UnknownImpLevel",
    )
}

pub fn token_type_name(token_type: u32) -> &'static str {
    lookup(
        &[(1, "TokenPrimary"), (2, "TokenImpersonation")],
        token_type,
        "UnknownTokenType",
    )
}

pub fn thread_or_process_name(from_process: bool) -> &'static str {
    if from_process {
        "Process"
    } else {
        "Thread"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secbuffer_types() {
        assert_eq!(secbuffer_type_name(SECBUFFER_TOKEN), "SECBUFFER_TOKEN");
        assert_eq!(secbuffer_type_name(14), "SECBUFFER_CHANNEL_BINDINGS");
        assert_eq!(secbuffer_type_name(SECBUFFER_TOKEN | SECBUFFER_READONLY), "SECBUFFER_TOKEN");
        assert_eq!(secbuffer_type_name(99), "UNKNOWN_SECBUFFER_FLAG_VALUE");
    }

    #[test]
    fn test_secpkg_attrs() {
        assert_eq!(secpkg_attr_name(SECPKG_ATTR_NAMES), "SECPKG_ATTR_NAMES");
        assert_eq!(secpkg_attr_name(0x53), "SECPKG_ATTR_REMOTE_CERT_CONTEXT");
        assert_eq!(secpkg_attr_name(0x4242), "UNKNOWN_SECPKG_ATTR_VALUE");
    }

    #[test]
    fn test_auth_types_and_policies() {
        assert_eq!(auth_type_name(AUTHTYPE_SERVER), "AUTHTYPE_SERVER");
        assert_eq!(auth_type_name(7), "UNKNOWN_AUTH_TYPE");
        assert_eq!(chain_policy_name(CERT_CHAIN_POLICY_SSL), Some("CERT_CHAIN_POLICY_SSL"));
        assert_eq!(chain_policy_name(0x7ff0_0000), None);
    }

    #[test]
    fn test_token_identity_names() {
        assert_eq!(impersonation_level_name(2), "SecurityImpersonation");
        assert_eq!(impersonation_level_name(4), "SecurityNoImpersonation");
        assert_eq!(impersonation_level_name(5), "UnknownImpLevel");
        assert_eq!(token_type_name(1), "TokenPrimary");
        assert_eq!(token_type_name(0), "UnknownTokenType");
        assert_eq!(thread_or_process_name(false), "Thread");
        assert_eq!(thread_or_process_name(true), "Process");
    }

    #[test]
    fn test_credential_use_and_drep() {
        assert_eq!(credential_use_name(2), "SECPKG_CRED_OUTBOUND");
        assert_eq!(data_rep_name(0x10), "SECURITY_NATIVE_DREP");
        assert_eq!(data_rep_name(0x20), "UNKNOWN_DREP");
    }
}
