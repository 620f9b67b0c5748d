//! rem/compare — сравнение по основному типу столбца.
//!
//! - INT: big-endian целое длины `len`, знаковое расширение для signed;
//! - CHAR: правые пробелы (0x20) отбрасываются, затем memcmp;
//! - VARCHAR / BINARY / FIXBINARY / BLOB и всё прочее: memcmp.
//! NULL меньше любого не-NULL значения.

use std::cmp::Ordering;

use crate::data::{
    charset_coll, DataType, Field, Tuple, DATA_CHAR, DATA_INT, DATA_UNSIGNED,
};
use crate::univ::SQL_NULL;

pub fn compare_data(mtype: u32, prtype: u32, a: &[u8], a_len: u32, b: &[u8], b_len: u32) -> Ordering {
    match (a_len == SQL_NULL, b_len == SQL_NULL) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }
    let a = bounded(a, a_len);
    let b = bounded(b, b_len);
    match mtype {
        DATA_INT => compare_int(a, b, prtype & DATA_UNSIGNED != 0),
        DATA_CHAR => trim_spaces(a).cmp(trim_spaces(b)),
        _ => a.cmp(b),
    }
}

/// Compares under the type of the first field.
pub fn compare_fields(a: &Field, b: &Field) -> Ordering {
    compare_data(a.typ.mtype, a.typ.prtype, &a.data, a.len, &b.data, b.len)
}

/// Field by field over the common prefix of both tuples.
pub fn compare_tuples(a: &Tuple, b: &Tuple) -> Ordering {
    a.fields
        .iter()
        .zip(b.fields.iter())
        .map(|(x, y)| compare_fields(x, y))
        .find(|o| *o != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Whether values of the two column types can be compared with each other.
pub fn cols_are_equal(col1: &DataType, col2: &DataType, check_charset: bool) -> bool {
    if col1.is_non_binary_string() && col2.is_non_binary_string() {
        return !check_charset || charset_coll(col1.prtype) == charset_coll(col2.prtype);
    }
    if col1.is_binary_string() && col2.is_binary_string() {
        return true;
    }
    if col1.mtype != col2.mtype {
        return false;
    }
    if col1.mtype == DATA_INT {
        return col1.is_unsigned() == col2.is_unsigned() && col1.len == col2.len;
    }
    true
}

fn bounded(data: &[u8], len: u32) -> &[u8] {
    &data[..(len as usize).min(data.len())]
}

fn trim_spaces(v: &[u8]) -> &[u8] {
    let end = v.iter().rposition(|&c| c != b' ').map_or(0, |p| p + 1);
    &v[..end]
}

fn compare_int(a: &[u8], b: &[u8], unsigned: bool) -> Ordering {
    if a.len() > 8 || b.len() > 8 {
        return a.cmp(b);
    }
    if unsigned {
        decode_uint(a).cmp(&decode_uint(b))
    } else {
        decode_int(a).cmp(&decode_int(b))
    }
}

fn decode_uint(v: &[u8]) -> u64 {
    v.iter().fold(0u64, |acc, &x| (acc << 8) | x as u64)
}

fn decode_int(v: &[u8]) -> i64 {
    if v.is_empty() {
        return 0;
    }
    let u = decode_uint(v);
    let bits = (v.len() * 8) as u32;
    if bits < 64 && u & (1u64 << (bits - 1)) != 0 {
        (u | (u64::MAX << bits)) as i64
    } else {
        u as i64
    }
}
