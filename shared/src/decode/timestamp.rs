// Copyright (c) 2024 HUTAOSHUSBAND - Wallbangbros.com/CodeConfuser.dev
// All rights reserved.

//! Rendering of SSPI `TimeStamp` values (100ns ticks since 1601-01-01 UTC).

use chrono::{DateTime, Utc};

/// Ticks between 1601-01-01 and 1970-01-01.
const UNIX_EPOCH_TICKS: i64 = 116_444_736_000_000_000;
const TICKS_PER_SECOND: i64 = 10_000_000;

/// Smallest scratch buffer the bounded renderer accepts.
pub const MIN_TIMESTAMP_BUFFER: usize = 2;
pub const TIMESTAMP_NULL_TOKEN: &str = "NULL";
pub const TIMESTAMP_OVERFLOW_TOKEN: &str = "BUFFER_TOO_SMALL";

fn split(ticks: i64) -> (u32, u32) {
    ((ticks as u64 >> 32) as u32, ticks as u64 as u32)
}

/// Packages report "never expires" as 0x7FFFFFFF:FFFFFFFF, some with a
/// slightly smaller high part.
pub fn is_infinite(ticks: i64) -> bool {
    let (high, low) = split(ticks);
    (high == 0x7FFF_FFFF && low == 0xFFFF_FFFF) || (high as i32) > 0x7FFF_0000
}

pub fn ticks_to_utc(ticks: i64) -> Option<DateTime<Utc>> {
    if ticks < 0 {
        return None;
    }
    let since_unix = ticks - UNIX_EPOCH_TICKS;
    let secs = since_unix.div_euclid(TICKS_PER_SECOND);
    let nanos = (since_unix.rem_euclid(TICKS_PER_SECOND) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}

pub fn utc_to_ticks(time: DateTime<Utc>) -> i64 {
    time.timestamp() * TICKS_PER_SECOND
        + i64::from(time.timestamp_subsec_nanos() / 100)
        + UNIX_EPOCH_TICKS
}

pub fn now_ticks() -> i64 {
    utc_to_ticks(Utc::now())
}

/// Renders `ticks` relative to `now`, both in 100ns units since 1601.
pub fn format_timestamp_at(ticks: i64, now: i64) -> String {
    if is_infinite(ticks) {
        let (high, low) = split(ticks);
        return format!("{:08x}:{:08x} Infinite", high, low);
    }
    let Some(time) = ticks_to_utc(ticks) else {
        return format!("<invalid time 0x{:016x}>", ticks as u64);
    };

    let state = if ticks < now { "*** EXPIRED ***" } else { "STILL VALID" };
    let delta_secs = ticks.abs_diff(now) / TICKS_PER_SECOND as u64;
    format!(
        "{} {} ({:02}:{:02}:{:02} diff)",
        time.format("%Y-%m-%d %H:%M:%S"),
        state,
        delta_secs / 3600,
        (delta_secs / 60) % 60,
        delta_secs % 60
    )
}

pub fn format_timestamp(ticks: i64) -> String {
    format_timestamp_at(ticks, now_ticks())
}

/// Bounded variant writing into caller-owned scratch space. Never writes
/// past `buf`; returns a fixed token when the rendering cannot fit.
pub fn format_timestamp_into<'a>(ticks: i64, now: i64, buf: &'a mut [u8]) -> &'a str {
    if buf.len() < MIN_TIMESTAMP_BUFFER {
        return TIMESTAMP_NULL_TOKEN;
    }
    let rendered = format_timestamp_at(ticks, now);
    if rendered.len() > buf.len() {
        return TIMESTAMP_OVERFLOW_TOKEN;
    }
    let out = &mut buf[..rendered.len()];
    out.copy_from_slice(rendered.as_bytes());
    std::str::from_utf8(out).unwrap_or(TIMESTAMP_NULL_TOKEN)
}
