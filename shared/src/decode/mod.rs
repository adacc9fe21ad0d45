pub mod flags;
pub mod hexdump;
pub mod names;
pub mod status;
pub mod timestamp;

pub use flags::{asc_req_flags, asc_ret_flags, decode_flags, isc_req_flags, isc_ret_flags, sp_prot_flags};
pub use hexdump::hex_dump;
pub use status::{cert_chain_policy_status_name, describe_security_status, security_status_name};
pub use timestamp::{format_timestamp, format_timestamp_at, format_timestamp_into};
