//! mach — байтовый кодек: чтение/запись целых фиксированной ширины в
//! big-endian порядке хранения, сжатые целые, dulint, float/double и
//! little-endian хелперы.
//!
//! Контракт (общий для всего модуля):
//! - читатели возвращают 0 на короткий вход;
//! - писатели ничего не делают на короткий выход (размер буфера: забота вызывающего).

use byteorder::{BigEndian, ByteOrder, LittleEndian};

mod compressed;
mod int_type;

pub use compressed::{
    dulint_get_compressed_size, dulint_get_much_compressed_size, dulint_parse_compressed,
    dulint_parse_much_compressed, dulint_read_compressed, dulint_read_much_compressed,
    dulint_write_compressed, dulint_write_much_compressed, get_compressed_size, parse_compressed,
    read_compressed, write_compressed,
};
pub use int_type::{
    read_i32, read_i64, read_int_type, read_u32, read_u64, write_i32, write_i64, write_int_type,
    write_u32, write_u64,
};

/// 64-bit value as (high, low) 32-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Dulint {
    pub high: u32,
    pub low: u32,
}

impl Dulint {
    pub const ZERO: Dulint = Dulint { high: 0, low: 0 };

    pub fn new(high: u32, low: u32) -> Self {
        Self { high, low }
    }

    pub fn is_zero(&self) -> bool {
        self.high == 0 && self.low == 0
    }
}

impl From<u64> for Dulint {
    fn from(v: u64) -> Self {
        Self {
            high: (v >> 32) as u32,
            low: v as u32,
        }
    }
}

impl From<Dulint> for u64 {
    fn from(d: Dulint) -> Self {
        ((d.high as u64) << 32) | d.low as u64
    }
}

// ---------- fixed width, big-endian ----------

#[inline]
pub fn write_to_1(b: &mut [u8], n: u32) {
    if let Some(x) = b.first_mut() {
        *x = n as u8;
    }
}

#[inline]
pub fn read_from_1(b: &[u8]) -> u32 {
    b.first().map(|&x| x as u32).unwrap_or(0)
}

#[inline]
pub fn write_to_2(b: &mut [u8], n: u32) {
    if b.len() >= 2 {
        BigEndian::write_u16(&mut b[..2], n as u16);
    }
}

#[inline]
pub fn read_from_2(b: &[u8]) -> u32 {
    if b.len() < 2 {
        return 0;
    }
    BigEndian::read_u16(&b[..2]) as u32
}

/// Host u16 -> its 2-byte storage (big-endian) image.
#[inline]
pub fn encode_2(n: u32) -> u16 {
    u16::from_ne_bytes((n as u16).to_be_bytes())
}

/// Inverse of `encode_2`.
#[inline]
pub fn decode_2(n: u16) -> u32 {
    u16::from_be_bytes(n.to_ne_bytes()) as u32
}

#[inline]
pub fn write_to_3(b: &mut [u8], n: u32) {
    if b.len() >= 3 {
        BigEndian::write_u24(&mut b[..3], n & 0x00FF_FFFF);
    }
}

#[inline]
pub fn read_from_3(b: &[u8]) -> u32 {
    if b.len() < 3 {
        return 0;
    }
    BigEndian::read_u24(&b[..3])
}

#[inline]
pub fn write_to_4(b: &mut [u8], n: u32) {
    if b.len() >= 4 {
        BigEndian::write_u32(&mut b[..4], n);
    }
}

#[inline]
pub fn read_from_4(b: &[u8]) -> u32 {
    if b.len() < 4 {
        return 0;
    }
    BigEndian::read_u32(&b[..4])
}

/// 6 bytes: low 16 bits of `high` then `low`.
pub fn write_to_6(b: &mut [u8], n: Dulint) {
    if b.len() < 6 {
        return;
    }
    write_to_2(b, n.high);
    write_to_4(&mut b[2..], n.low);
}

pub fn read_from_6(b: &[u8]) -> Dulint {
    if b.len() < 6 {
        return Dulint::ZERO;
    }
    Dulint::new(read_from_2(b), read_from_4(&b[2..]))
}

/// 7 bytes: low 24 bits of `high` then `low`.
pub fn write_to_7(b: &mut [u8], n: Dulint) {
    if b.len() < 7 {
        return;
    }
    write_to_3(b, n.high);
    write_to_4(&mut b[3..], n.low);
}

pub fn read_from_7(b: &[u8]) -> Dulint {
    if b.len() < 7 {
        return Dulint::ZERO;
    }
    Dulint::new(read_from_3(b), read_from_4(&b[3..]))
}

pub fn write_to_8(b: &mut [u8], n: Dulint) {
    if b.len() < 8 {
        return;
    }
    write_to_4(b, n.high);
    write_to_4(&mut b[4..], n.low);
}

pub fn read_from_8(b: &[u8]) -> Dulint {
    if b.len() < 8 {
        return Dulint::ZERO;
    }
    Dulint::new(read_from_4(b), read_from_4(&b[4..]))
}

#[inline]
pub fn write_ull(b: &mut [u8], n: u64) {
    if b.len() >= 8 {
        BigEndian::write_u64(&mut b[..8], n);
    }
}

#[inline]
pub fn read_ull(b: &[u8]) -> u64 {
    if b.len() < 8 {
        return 0;
    }
    BigEndian::read_u64(&b[..8])
}

// ---------- float / double (little-endian IEEE-754) ----------

pub fn double_write(b: &mut [u8], v: f64) {
    if b.len() >= 8 {
        LittleEndian::write_f64(&mut b[..8], v);
    }
}

pub fn double_read(b: &[u8]) -> f64 {
    if b.len() < 8 {
        return 0.0;
    }
    LittleEndian::read_f64(&b[..8])
}

pub fn float_write(b: &mut [u8], v: f32) {
    if b.len() >= 4 {
        LittleEndian::write_f32(&mut b[..4], v);
    }
}

pub fn float_read(b: &[u8]) -> f32 {
    if b.len() < 4 {
        return 0.0;
    }
    LittleEndian::read_f32(&b[..4])
}

// ---------- little-endian N-byte ----------

pub fn read_from_n_little_endian(buf: &[u8], size: usize) -> u64 {
    if size == 0 || size > 8 || buf.len() < size {
        return 0;
    }
    LittleEndian::read_uint(&buf[..size], size)
}

pub fn write_to_n_little_endian(dest: &mut [u8], size: usize, n: u64) {
    if size == 0 || size > 8 || dest.len() < size {
        return;
    }
    let masked = if size == 8 { n } else { n & ((1u64 << (size * 8)) - 1) };
    LittleEndian::write_uint(&mut dest[..size], masked, size);
}

pub fn read_from_2_little_endian(buf: &[u8]) -> u32 {
    read_from_n_little_endian(buf, 2) as u32
}

pub fn write_to_2_little_endian(dest: &mut [u8], n: u32) {
    write_to_n_little_endian(dest, 2, n as u64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_widths_big_endian() {
        let mut b = [0u8; 8];
        write_to_2(&mut b, 0x1234);
        assert_eq!(&b[..2], &[0x12, 0x34]);
        write_to_3(&mut b, 0xABCDEF);
        assert_eq!(&b[..3], &[0xAB, 0xCD, 0xEF]);
        assert_eq!(read_from_3(&b), 0xABCDEF);
        write_to_4(&mut b, 0xDEADBEEF);
        assert_eq!(read_from_4(&b), 0xDEADBEEF);
        write_ull(&mut b, 0x0102030405060708);
        assert_eq!(b, [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(read_ull(&b), 0x0102030405060708);
    }

    #[test]
    fn six_seven_eight_dulint() {
        let mut b = [0u8; 8];
        write_to_6(&mut b, Dulint::new(0xBEEF, 0x01020304));
        assert_eq!(&b[..6], &[0xBE, 0xEF, 1, 2, 3, 4]);
        assert_eq!(read_from_6(&b), Dulint::new(0xBEEF, 0x01020304));
        write_to_7(&mut b, Dulint::new(0xABCDEF, 7));
        assert_eq!(read_from_7(&b), Dulint::new(0xABCDEF, 7));
        let d = Dulint::from(0x1122334455667788u64);
        write_to_8(&mut b, d);
        assert_eq!(read_ull(&b), 0x1122334455667788);
        assert_eq!(u64::from(read_from_8(&b)), 0x1122334455667788);
    }

    #[test]
    fn short_buffers_are_noops() {
        let mut b = [0xAAu8; 3];
        write_to_4(&mut b, 1);
        write_ull(&mut b, 1);
        write_to_6(&mut b, Dulint::new(1, 1));
        assert_eq!(b, [0xAA; 3]);
        assert_eq!(read_from_4(&b), 0);
        assert_eq!(read_ull(&b), 0);
        assert_eq!(read_from_1(&[]), 0);
        assert_eq!(double_read(&b), 0.0);
    }

    #[test]
    fn encode_decode_2() {
        let e = encode_2(0x1234);
        assert_eq!(e.to_ne_bytes(), [0x12, 0x34]);
        assert_eq!(decode_2(e), 0x1234);
    }

    #[test]
    fn floats_are_little_endian() {
        let mut b = [0u8; 8];
        double_write(&mut b, 1.0);
        assert_eq!(b, 1.0f64.to_bits().to_le_bytes());
        assert_eq!(double_read(&b), 1.0);
        float_write(&mut b, -2.5);
        assert_eq!(&b[..4], &(-2.5f32).to_bits().to_le_bytes());
        assert_eq!(float_read(&b), -2.5);
    }

    #[test]
    fn little_endian_n() {
        let mut b = [0u8; 8];
        write_to_n_little_endian(&mut b, 3, 0x00AABBCC);
        assert_eq!(&b[..3], &[0xCC, 0xBB, 0xAA]);
        assert_eq!(read_from_n_little_endian(&b, 3), 0xAABBCC);
        write_to_2_little_endian(&mut b, 0x0102);
        assert_eq!(read_from_2_little_endian(&b), 0x0102);
        assert_eq!(read_from_n_little_endian(&b, 9), 0);
    }
}
