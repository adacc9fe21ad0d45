// Copyright (c) 2024 HUTAOSHUSBAND - Wallbangbros.com/CodeConfuser.dev
// All rights reserved.

use std::fmt::Write;

pub const BYTES_PER_LINE: usize = 16;

fn printable(byte: u8) -> char {
    if byte <= 31 || byte >= 127 {
        '.'
    } else {
        byte as char
    }
}

/// Formats one dump line: address, 16 hex groups, 16 ASCII columns.
/// Short chunks are blank-padded to full width.
fn dump_line(address: usize, chunk: &[u8]) -> String {
    let mut hex = String::with_capacity(BYTES_PER_LINE * 3);
    let mut ascii = String::with_capacity(BYTES_PER_LINE);
    for i in 0..BYTES_PER_LINE {
        match chunk.get(i) {
            Some(b) => {
                let _ = write!(hex, "{:02x} ", b);
                ascii.push(printable(*b));
            }
            None => {
                hex.push_str("   ");
                ascii.push(' ');
            }
        }
    }
    format!("{:08x}  {}  {}", address, hex, ascii)
}

/// Canonical hex + ASCII dump. `base` is the address shown for the first
/// byte; an empty buffer yields no lines.
pub fn hex_dump(data: &[u8], base: usize) -> Vec<String> {
    data.chunks(BYTES_PER_LINE)
        .enumerate()
        .map(|(i, chunk)| dump_line(base.wrapping_add(i * BYTES_PER_LINE), chunk))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_has_no_lines() {
        assert!(hex_dump(&[], 0x1000).is_empty());
    }

    #[test]
    fn test_line_count_is_ceiling() {
        for n in [1usize, 15, 16, 17, 32, 33, 100] {
            let data = vec![0x41u8; n];
            assert_eq!(hex_dump(&data, 0).len(), (n + 15) / 16, "n = {}", n);
        }
    }

    #[test]
    fn test_full_line_layout() {
        let data: Vec<u8> = (0x40..0x50).collect();
        let lines = hex_dump(&data, 0x0012_3400);
        assert_eq!(
            lines[0],
            "00123400  40 41 42 43 44 45 46 47 48 49 4a 4b 4c 4d 4e 4f   @ABCDEFGHIJKLMNO"
        );
    }

    #[test]
    fn test_partial_line_is_blank_padded() {
        let data = [0x00u8, 0x1f, 0x20, 0x7e, 0x7f, 0xff, b'A'];
        let lines = hex_dump(&data, 0x10);
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        let (addr, rest) = line.split_at(8);
        assert_eq!(addr, "00000010");
        let hex = &rest[2..2 + 48];
        assert_eq!(hex.split_whitespace().count(), 7);
        assert_eq!(hex.len(), 48);
        let ascii = &rest[2 + 48 + 2..];
        assert_eq!(ascii.len(), 16);
        assert_eq!(ascii, format!(".. ~..A{}", " ".repeat(9)));
    }

    #[test]
    fn test_addresses_advance_per_line() {
        let lines = hex_dump(&[0u8; 40], 0x2000);
        assert!(lines[0].starts_with("00002000"));
        assert!(lines[1].starts_with("00002010"));
        assert!(lines[2].starts_with("00002020"));
        assert!(lines[2].ends_with(&" ".repeat(8)));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_wide_addresses_are_not_truncated() {
        let lines = hex_dump(&[0x41], 0x7ff6_1234_0010);
        assert!(lines[0].starts_with("7ff612340010  41 "), "{}", lines[0]);
        assert!(lines[0].ends_with("A               "));
    }
}
