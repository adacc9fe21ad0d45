// Copyright (c) 2024 HUTAOSHUSBAND - Wallbangbros.com/CodeConfuser.dev
// All rights reserved.

/// Context requirements passed to InitializeSecurityContext.
pub const ISC_REQ_FLAGS: &[(u32, &str)] = &[
    (0x00000001, "ISC_REQ_DELEGATE"),
    (0x00000002, "ISC_REQ_MUTUAL_AUTH"),
    (0x00000004, "ISC_REQ_REPLAY_DETECT"),
    (0x00000008, "ISC_REQ_SEQUENCE_DETECT"),
    (0x00000010, "ISC_REQ_CONFIDENTIALITY"),
    (0x00000020, "ISC_REQ_USE_SESSION_KEY"),
    (0x00000040, "ISC_REQ_PROMPT_FOR_CREDS"),
    (0x00000080, "ISC_REQ_USE_SUPPLIED_CREDS"),
    (0x00000100, "ISC_REQ_ALLOCATE_MEMORY"),
    (0x00000200, "ISC_REQ_USE_DCE_STYLE"),
    (0x00000400, "ISC_REQ_DATAGRAM"),
    (0x00000800, "ISC_REQ_CONNECTION"),
    (0x00001000, "ISC_REQ_CALL_LEVEL"),
    (0x00002000, "ISC_REQ_FRAGMENT_SUPPLIED"),
    (0x00004000, "ISC_REQ_EXTENDED_ERROR"),
    (0x00008000, "ISC_REQ_STREAM"),
    (0x00010000, "ISC_REQ_INTEGRITY"),
    (0x00020000, "ISC_REQ_IDENTIFY"),
    (0x00040000, "ISC_REQ_NULL_SESSION"),
    (0x00080000, "ISC_REQ_MANUAL_CRED_VALIDATION"),
    (0x00100000, "ISC_REQ_RESERVED1"),
    (0x00200000, "ISC_REQ_FRAGMENT_TO_FIT"),
];

/// Context attributes returned by InitializeSecurityContext.
pub const ISC_RET_FLAGS: &[(u32, &str)] = &[
    (0x00000001, "ISC_RET_DELEGATE"),
    (0x00000002, "ISC_RET_MUTUAL_AUTH"),
    (0x00000004, "ISC_RET_REPLAY_DETECT"),
    (0x00000008, "ISC_RET_SEQUENCE_DETECT"),
    (0x00000010, "ISC_RET_CONFIDENTIALITY"),
    (0x00000020, "ISC_RET_USE_SESSION_KEY"),
    (0x00000040, "ISC_RET_USED_COLLECTED_CREDS"),
    (0x00000080, "ISC_RET_USED_SUPPLIED_CREDS"),
    (0x00000100, "ISC_RET_ALLOCATED_MEMORY"),
    (0x00000200, "ISC_RET_USED_DCE_STYLE"),
    (0x00000400, "ISC_RET_DATAGRAM"),
    (0x00000800, "ISC_RET_CONNECTION"),
    (0x00001000, "ISC_RET_INTERMEDIATE_RETURN"),
    (0x00002000, "ISC_RET_CALL_LEVEL"),
    (0x00004000, "ISC_RET_EXTENDED_ERROR"),
    (0x00008000, "ISC_RET_STREAM"),
    (0x00010000, "ISC_RET_INTEGRITY"),
    (0x00020000, "ISC_RET_IDENTIFY"),
    (0x00040000, "ISC_RET_NULL_SESSION"),
    (0x00080000, "ISC_RET_MANUAL_CRED_VALIDATION"),
    (0x00100000, "ISC_RET_RESERVED1"),
    (0x00200000, "ISC_RET_FRAGMENT_ONLY"),
];

/// Context requirements passed to AcceptSecurityContext.
pub const ASC_REQ_FLAGS: &[(u32, &str)] = &[
    (0x00000001, "ASC_REQ_DELEGATE"),
    (0x00000002, "ASC_REQ_MUTUAL_AUTH"),
    (0x00000004, "ASC_REQ_REPLAY_DETECT"),
    (0x00000008, "ASC_REQ_SEQUENCE_DETECT"),
    (0x00000010, "ASC_REQ_CONFIDENTIALITY"),
    (0x00000020, "ASC_REQ_USE_SESSION_KEY"),
    (0x00000100, "ASC_REQ_ALLOCATE_MEMORY"),
    (0x00000200, "ASC_REQ_USE_DCE_STYLE"),
    (0x00000400, "ASC_REQ_DATAGRAM"),
    (0x00000800, "ASC_REQ_CONNECTION"),
    (0x00001000, "ASC_REQ_CALL_LEVEL"),
    (0x00008000, "ASC_REQ_EXTENDED_ERROR"),
    (0x00010000, "ASC_REQ_STREAM"),
    (0x00020000, "ASC_REQ_INTEGRITY"),
    (0x00040000, "ASC_REQ_LICENSING"),
    (0x00080000, "ASC_REQ_IDENTIFY"),
    (0x00100000, "ASC_REQ_ALLOW_NULL_SESSION"),
    (0x00200000, "ASC_REQ_ALLOW_NON_USER_LOGONS"),
    (0x00400000, "ASC_REQ_ALLOW_CONTEXT_REPLAY"),
    (0x00800000, "ASC_REQ_FRAGMENT_TO_FIT"),
    (0x00002000, "ASC_REQ_FRAGMENT_SUPPLIED"),
];

/// Context attributes returned by AcceptSecurityContext.
pub const ASC_RET_FLAGS: &[(u32, &str)] = &[
    (0x00000001, "ASC_RET_DELEGATE"),
    (0x00000002, "ASC_RET_MUTUAL_AUTH"),
    (0x00000004, "ASC_RET_REPLAY_DETECT"),
    (0x00000008, "ASC_RET_SEQUENCE_DETECT"),
    (0x00000010, "ASC_RET_CONFIDENTIALITY"),
    (0x00000020, "ASC_RET_USE_SESSION_KEY"),
    (0x00000100, "ASC_RET_ALLOCATED_MEMORY"),
    (0x00000200, "ASC_RET_USED_DCE_STYLE"),
    (0x00000400, "ASC_RET_DATAGRAM"),
    (0x00000800, "ASC_RET_CONNECTION"),
    (0x00002000, "ASC_RET_CALL_LEVEL"),
    (0x00004000, "ASC_RET_THIRD_LEG_FAILED"),
    (0x00008000, "ASC_RET_EXTENDED_ERROR"),
    (0x00010000, "ASC_RET_STREAM"),
    (0x00020000, "ASC_RET_INTEGRITY"),
    (0x00040000, "ASC_RET_LICENSING"),
    (0x00080000, "ASC_RET_IDENTIFY"),
    (0x00100000, "ASC_RET_NULL_SESSION"),
    (0x00200000, "ASC_RET_ALLOW_NON_USER_LOGONS"),
    (0x00400000, "ASC_RET_ALLOW_CONTEXT_REPLAY"),
    (0x00800000, "ASC_RET_FRAGMENT_ONLY"),
];

/// Schannel protocol bits, as used by `grbitEnabledProtocols` and connection info.
pub const SP_PROT_FLAGS: &[(u32, &str)] = &[
    (0x00000001, "SP_PROT_PCT1_SERVER"),
    (0x00000002, "SP_PROT_PCT1_CLIENT"),
    (0x00000004, "SP_PROT_SSL2_SERVER"),
    (0x00000008, "SP_PROT_SSL2_CLIENT"),
    (0x00000010, "SP_PROT_SSL3_SERVER"),
    (0x00000020, "SP_PROT_SSL3_CLIENT"),
    (0x00000040, "SP_PROT_TLS1_SERVER"),
    (0x00000080, "SP_PROT_TLS1_CLIENT"),
    (0x00000100, "SP_PROT_TLS1_1_SERVER"),
    (0x00000200, "SP_PROT_TLS1_1_CLIENT"),
    (0x00000400, "SP_PROT_TLS1_2_SERVER"),
    (0x00000800, "SP_PROT_TLS1_2_CLIENT"),
    (0x00001000, "SP_PROT_TLS1_3_SERVER"),
    (0x00002000, "SP_PROT_TLS1_3_CLIENT"),
];
/// Joins the names of every set bit with `|`, in table order. Bits the
/// table does not know are dropped.
pub fn decode_flags(value: u32, table: &[(u32, &str)]) -> String {
    table
        .iter()
        .filter(|(bit, _)| value & bit != 0)
        .map(|(_, name)| *name)
        .collect::<Vec<_>>()
        .join("|")
}

pub fn isc_req_flags(value: u32) -> String {
    decode_flags(value, ISC_REQ_FLAGS)
}

pub fn isc_ret_flags(value: u32) -> String {
    decode_flags(value, ISC_RET_FLAGS)
}

pub fn asc_req_flags(value: u32) -> String {
    decode_flags(value, ASC_REQ_FLAGS)
}

pub fn asc_ret_flags(value: u32) -> String {
    decode_flags(value, ASC_RET_FLAGS)
}

pub fn sp_prot_flags(value: u32) -> String {
    decode_flags(value, SP_PROT_FLAGS)
}
