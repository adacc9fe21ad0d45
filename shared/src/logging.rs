// Copyright (c) 2024 HUTAOSHUSBAND - Wallbangbros.com/CodeConfuser.dev
// All rights reserved.


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Prefix format of every line in the diagnostic log.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub const LINE_TERMINATOR: &str = "\r\n";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// Builds one complete log line, terminator included, so the sink can
/// write it with a single call.
pub fn format_line(now: DateTime<Utc>, message: &str) -> String {
    let mut line = String::with_capacity(message.len() + 26);
    line.push_str(&now.format(TIMESTAMP_FORMAT).to_string());
    line.push(' ');
    line.push_str(message);
    line.push_str(LINE_TERMINATOR);
    line
}

/// `%-25s = value`, the layout used for every logged parameter.
pub fn field(name: &str, value: impl std::fmt::Display) -> String {
    format!("{:<25} = {}", name, value)
}

pub fn hex_field(name: &str, value: u32) -> String {
    format!("{:<25} = 0x{:08x}", name, value)
}

pub fn ptr_field<T>(name: &str, ptr: *const T) -> String {
    format!("{:<25} = 0x{:08x}", name, ptr as usize)
}

pub fn bool_field(name: &str, value: bool) -> String {
    format!("{:<25} = {}", name, if value { "TRUE" } else { "FALSE" })
}

/// Quoted string parameter; a missing string is rendered as `'<NULL>'`.
pub fn str_field(name: &str, value: Option<&str>) -> String {
    format!("{:<25} = '{}'", name, value.unwrap_or("<NULL>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_line_layout() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap()
            + chrono::Duration::milliseconds(42);
        let line = format_line(now, "ENTER AcquireCredentialsHandleA");
        assert_eq!(line, "2024-03-07 09:05:01.042 ENTER AcquireCredentialsHandleA\r\n");
    }

    #[test]
    fn test_empty_message_keeps_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_line(now, ""), "2024-01-01 00:00:00.000 \r\n");
    }

    #[test]
    fn test_field_layouts() {
        assert_eq!(field("cBuffers", 2), format!("cBuffers{} = 2", " ".repeat(17)));
        assert_eq!(hex_field("fContextReq", 0x83), format!("fContextReq{} = 0x00000083", " ".repeat(14)));
        assert_eq!(str_field("pszPackage", None), format!("pszPackage{} = '<NULL>'", " ".repeat(15)));
        assert!(str_field("pszPackage", Some("Kerberos")).ends_with(" = 'Kerberos'"));
        assert!(bool_field("fDone", true).ends_with(" = TRUE"));
        assert_eq!(field("a_name_longer_than_the_column_width", 1).find(" = "), Some(35));
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("DEBUG".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert_eq!(" warn ".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::Error < LogLevel::Trace);
    }
}
