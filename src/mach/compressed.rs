//! mach/compressed — сжатые u32 (префиксная схема 1..5 байт) и dulint.
//!
//! | диапазон      | размер | первый байт |
//! |---------------|--------|-------------|
//! | < 0x80        | 1      | 0xxxxxxx    |
//! | < 0x4000      | 2      | 10xxxxxx    |
//! | < 0x200000    | 3      | 110xxxxx    |
//! | < 0x10000000  | 4      | 1110xxxx    |
//! | иначе         | 5      | 11110000 + 4 байта BE |

use super::{read_from_1, read_from_2, read_from_3, read_from_4, write_to_1, write_to_2,
            write_to_3, write_to_4, Dulint};

/// Marker byte of the "much compressed" dulint form when `high != 0`.
const MUCH_COMPRESSED_MARKER: u32 = 0xFF;

pub fn get_compressed_size(n: u32) -> usize {
    match n {
        0..=0x7F => 1,
        0x80..=0x3FFF => 2,
        0x4000..=0x1F_FFFF => 3,
        0x20_0000..=0x0FFF_FFFF => 4,
        _ => 5,
    }
}

/// Writes `n` compressed; returns bytes written, or 0 when `b` is too short.
pub fn write_compressed(b: &mut [u8], n: u32) -> usize {
    let size = get_compressed_size(n);
    if b.len() < size {
        return 0;
    }
    match size {
        1 => write_to_1(b, n),
        2 => write_to_2(b, n | 0x8000),
        3 => write_to_3(b, n | 0xC0_0000),
        4 => write_to_4(b, n | 0xE000_0000),
        _ => {
            write_to_1(b, 0xF0);
            write_to_4(&mut b[1..], n);
        }
    }
    size
}

/// Size implied by the first byte of a compressed value.
#[inline]
fn size_from_flag(flag: u32) -> usize {
    if flag < 0x80 {
        1
    } else if flag < 0xC0 {
        2
    } else if flag < 0xE0 {
        3
    } else if flag < 0xF0 {
        4
    } else {
        5
    }
}

/// Reads a compressed value. Returns 0 when the buffer is short.
pub fn read_compressed(b: &[u8]) -> u32 {
    match parse_compressed(b) {
        Some((_, v)) => v,
        None => 0,
    }
}

/// Parses a compressed value; None means "not fully contained".
pub fn parse_compressed(b: &[u8]) -> Option<(&[u8], u32)> {
    if b.is_empty() {
        return None;
    }
    let flag = read_from_1(b);
    let size = size_from_flag(flag);
    if b.len() < size {
        return None;
    }
    let v = match size {
        1 => flag,
        2 => read_from_2(b) & 0x7FFF,
        3 => read_from_3(b) & 0x3F_FFFF,
        4 => read_from_4(b) & 0x1FFF_FFFF,
        _ => read_from_4(&b[1..]),
    };
    Some((&b[size..], v))
}

// ---------- dulint ----------

pub fn dulint_get_compressed_size(n: Dulint) -> usize {
    get_compressed_size(n.high) + 4
}

/// compressed(high) then 4 BE bytes of low. Returns 0 on short output.
pub fn dulint_write_compressed(b: &mut [u8], n: Dulint) -> usize {
    let size = dulint_get_compressed_size(n);
    if b.len() < size {
        return 0;
    }
    let hs = write_compressed(b, n.high);
    write_to_4(&mut b[hs..], n.low);
    size
}

pub fn dulint_read_compressed(b: &[u8]) -> Dulint {
    dulint_parse_compressed(b).map(|(_, d)| d).unwrap_or(Dulint::ZERO)
}

pub fn dulint_parse_compressed(b: &[u8]) -> Option<(&[u8], Dulint)> {
    let (rest, high) = parse_compressed(b)?;
    if rest.len() < 4 {
        return None;
    }
    let low = read_from_4(rest);
    Some((&rest[4..], Dulint::new(high, low)))
}

pub fn dulint_get_much_compressed_size(n: Dulint) -> usize {
    if n.high == 0 {
        get_compressed_size(n.low)
    } else {
        1 + get_compressed_size(n.high) + get_compressed_size(n.low)
    }
}

/// high == 0: compressed(low); else 0xFF, compressed(high), compressed(low).
pub fn dulint_write_much_compressed(b: &mut [u8], n: Dulint) -> usize {
    let size = dulint_get_much_compressed_size(n);
    if b.len() < size {
        return 0;
    }
    if n.high == 0 {
        return write_compressed(b, n.low);
    }
    write_to_1(b, MUCH_COMPRESSED_MARKER);
    let hs = write_compressed(&mut b[1..], n.high);
    write_compressed(&mut b[1 + hs..], n.low);
    size
}

pub fn dulint_read_much_compressed(b: &[u8]) -> Dulint {
    dulint_parse_much_compressed(b)
        .map(|(_, d)| d)
        .unwrap_or(Dulint::ZERO)
}

pub fn dulint_parse_much_compressed(b: &[u8]) -> Option<(&[u8], Dulint)> {
    if b.is_empty() {
        return None;
    }
    if read_from_1(b) != MUCH_COMPRESSED_MARKER {
        let (rest, low) = parse_compressed(b)?;
        return Some((rest, Dulint::new(0, low)));
    }
    let (rest, high) = parse_compressed(&b[1..])?;
    let (rest, low) = parse_compressed(rest)?;
    Some((rest, Dulint::new(high, low)))
}
