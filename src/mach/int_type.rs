//! mach/int_type — целые в форме хранения, сравнимой через memcmp.
//!
//! Значение пишется big-endian шириной `dest.len()` (1..=8 байт).
//! У знаковых значений инвертируется знаковый бит старшего байта, беззнаковые
//! хранятся как есть: в обоих случаях лексикографический порядок байтов
//! совпадает с числовым.
//!
//! Эта форма не совместима побайтно с хранением Uint32 в классическом
//! формате InnoDB, где бит инвертируется у беззнаковых значений.

const SIGN_FLIP: u8 = 0x80;

/// Writes the low `dest.len()` bytes of `value` in storage form.
/// `value` carries two's-complement bits for signed integers.
pub fn write_int_type(dest: &mut [u8], value: u64, unsigned: bool) {
    let width = dest.len();
    if width == 0 || width > 8 {
        return;
    }
    let be = value.to_be_bytes();
    dest.copy_from_slice(&be[8 - width..]);
    if !unsigned {
        dest[0] ^= SIGN_FLIP;
    }
}

/// Reads a `src.len()`-byte storage-form integer. Signed values are
/// sign-extended to 64 bits.
pub fn read_int_type(src: &[u8], unsigned: bool) -> u64 {
    let width = src.len();
    if width == 0 || width > 8 {
        return 0;
    }
    let mut be = [0u8; 8];
    be[8 - width..].copy_from_slice(src);
    if !unsigned {
        be[8 - width] ^= SIGN_FLIP;
    }
    let raw = u64::from_be_bytes(be);
    if unsigned || width == 8 {
        return raw;
    }
    let bits = (width * 8) as u32;
    let sign = 1u64 << (bits - 1);
    if raw & sign != 0 {
        raw | (u64::MAX << bits)
    } else {
        raw
    }
}

pub fn write_u32(dest: &mut [u8], n: u32) {
    if dest.len() >= 4 {
        write_int_type(&mut dest[..4], n as u64, true);
    }
}

pub fn read_u32(src: &[u8]) -> u32 {
    if src.len() < 4 {
        return 0;
    }
    read_int_type(&src[..4], true) as u32
}

pub fn write_i32(dest: &mut [u8], n: i32) {
    if dest.len() >= 4 {
        write_int_type(&mut dest[..4], n as u32 as u64, false);
    }
}

pub fn read_i32(src: &[u8]) -> i32 {
    if src.len() < 4 {
        return 0;
    }
    read_int_type(&src[..4], false) as i64 as i32
}

pub fn write_u64(dest: &mut [u8], n: u64) {
    if dest.len() >= 8 {
        write_int_type(&mut dest[..8], n, true);
    }
}

pub fn read_u64(src: &[u8]) -> u64 {
    if src.len() < 8 {
        return 0;
    }
    read_int_type(&src[..8], true)
}

pub fn write_i64(dest: &mut [u8], n: i64) {
    if dest.len() >= 8 {
        write_int_type(&mut dest[..8], n as u64, false);
    }
}

pub fn read_i64(src: &[u8]) -> i64 {
    if src.len() < 8 {
        return 0;
    }
    read_int_type(&src[..8], false) as i64
}
