//! rec/header — info bits / n_owned (byte 0) и heap_no / status (bytes 1..3 BE).
//! Короткий буфер: геттеры возвращают 0, сеттеры ничего не делают.

use byteorder::{BigEndian, ByteOrder};

use super::REC_HEAP_NO_SHIFT;

const INFO_BITS_MASK: u8 = 0xF0;
const N_OWNED_MASK: u8 = 0x0F;
const STATUS_MASK: u16 = (1 << REC_HEAP_NO_SHIFT) - 1;

pub fn header_info_bits(rec: &[u8]) -> u8 {
    rec.first().map(|b| b & INFO_BITS_MASK).unwrap_or(0)
}

pub fn header_set_info_bits(rec: &mut [u8], bits: u8) {
    if let Some(b) = rec.first_mut() {
        *b = (*b & N_OWNED_MASK) | (bits & INFO_BITS_MASK);
    }
}

pub fn header_n_owned(rec: &[u8]) -> u8 {
    rec.first().map(|b| b & N_OWNED_MASK).unwrap_or(0)
}

pub fn header_set_n_owned(rec: &mut [u8], n_owned: u8) {
    if let Some(b) = rec.first_mut() {
        *b = (*b & INFO_BITS_MASK) | (n_owned & N_OWNED_MASK);
    }
}

fn heap_word(rec: &[u8]) -> Option<u16> {
    if rec.len() < 3 {
        return None;
    }
    Some(BigEndian::read_u16(&rec[1..3]))
}

pub fn header_status(rec: &[u8]) -> u16 {
    heap_word(rec).map(|w| w & STATUS_MASK).unwrap_or(0)
}

pub fn header_set_status(rec: &mut [u8], status: u16) {
    if let Some(w) = heap_word(rec) {
        BigEndian::write_u16(&mut rec[1..3], (w & !STATUS_MASK) | (status & STATUS_MASK));
    }
}

pub fn header_heap_no(rec: &[u8]) -> u16 {
    heap_word(rec).map(|w| w >> REC_HEAP_NO_SHIFT).unwrap_or(0)
}

pub fn header_set_heap_no(rec: &mut [u8], heap_no: u16) {
    if let Some(w) = heap_word(rec) {
        BigEndian::write_u16(&mut rec[1..3], (heap_no << REC_HEAP_NO_SHIFT) | (w & STATUS_MASK));
    }
}

pub fn header_is_deleted(rec: &[u8]) -> bool {
    header_info_bits(rec) & super::REC_INFO_DELETED_FLAG != 0
}

#[cfg(test)]
mod tests {
    use super::super::*;
    use super::*;

    #[test]
    fn fields_do_not_clobber_each_other() {
        let mut rec = [0u8; REC_N_NEW_EXTRA_BYTES];
        header_set_n_owned(&mut rec, 7);
        header_set_info_bits(&mut rec, REC_INFO_DELETED_FLAG | REC_INFO_MIN_REC_FLAG);
        header_set_heap_no(&mut rec, 0x1ABC);
        header_set_status(&mut rec, REC_STATUS_NODE_PTR);

        assert_eq!(header_n_owned(&rec), 7);
        assert_eq!(header_info_bits(&rec), 0x30);
        assert!(header_is_deleted(&rec));
        assert_eq!(header_heap_no(&rec), 0x1ABC);
        assert_eq!(header_status(&rec), REC_STATUS_NODE_PTR);

        header_set_status(&mut rec, REC_STATUS_SUPREMUM);
        assert_eq!(header_heap_no(&rec), 0x1ABC);
        header_set_info_bits(&mut rec, 0);
        assert_eq!(header_n_owned(&rec), 7);
    }

    #[test]
    fn short_record_is_tolerated() {
        let mut rec = [0u8; 2];
        header_set_heap_no(&mut rec, 5);
        assert_eq!(rec, [0, 0]);
        assert_eq!(header_status(&rec), 0);
        assert_eq!(header_info_bits(&[]), 0);
    }
}
