//! data — логические кортежи: поля (байты + длина + тип) и кортежи.
//!
//! SQL NULL кодируется длиной `SQL_NULL`; NULL меньше любого не-NULL значения.

use std::cmp::Ordering;

mod types;

pub use types::*;

use crate::univ::SQL_NULL;

/// Upper bound on fields in one record.
pub const REC_MAX_N_FIELDS: usize = 1023;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Field {
    pub data: Vec<u8>,
    pub len: u32,
    pub typ: DataType,
}

impl Field {
    pub fn new(data: impl Into<Vec<u8>>, typ: DataType) -> Self {
        let data = data.into();
        let len = data.len() as u32;
        Self {
            data,
            len,
            typ,
        }
    }

    /// Untyped field (main type 0: compared with memcmp).
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Self::new(data, DataType::default())
    }

    pub fn null() -> Self {
        Self {
            data: Vec::new(),
            len: SQL_NULL,
            typ: DataType::default(),
        }
    }

    pub fn null_typed(typ: DataType) -> Self {
        Self {
            typ,
            ..Self::null()
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        self.len == SQL_NULL
    }

    /// Payload bounded by `len`; empty for NULL.
    pub fn value(&self) -> &[u8] {
        if self.is_null() {
            return &[];
        }
        let n = (self.len as usize).min(self.data.len());
        &self.data[..n]
    }

    pub fn set_data(&mut self, data: impl Into<Vec<u8>>) {
        self.data = data.into();
        self.len = self.data.len() as u32;
    }

    pub fn set_null(&mut self) {
        self.data.clear();
        self.len = SQL_NULL;
    }

    /// Same length and bytes (two NULLs are equal).
    pub fn binary_eq(&self, other: &Field) -> bool {
        self.len == other.len && (self.is_null() || self.value() == other.value())
    }

    pub fn data_is_binary_equal(&self, len: u32, data: &[u8]) -> bool {
        self.len == len && (len == SQL_NULL || self.value() == data)
    }
}

/// Bytewise comparison; NULL sorts first.
pub fn compare_fields_bytes(a: &Field, b: &Field) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.value().cmp(b.value()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tuple {
    pub info_bits: u8,
    pub n_fields_cmp: usize,
    pub fields: Vec<Field>,
}

impl Tuple {
    /// Tuple of `n` empty (non-NULL, zero-length) fields.
    pub fn new(n: usize) -> Self {
        Self {
            info_bits: 0,
            n_fields_cmp: n,
            fields: vec![Field::default(); n],
        }
    }

    pub fn with_fields(fields: Vec<Field>) -> Self {
        Self {
            info_bits: 0,
            n_fields_cmp: fields.len(),
            fields,
        }
    }

    #[inline]
    pub fn n_fields(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn n_fields_cmp(&self) -> usize {
        self.n_fields_cmp
    }

    pub fn field(&self, n: usize) -> Option<&Field> {
        self.fields.get(n)
    }

    pub fn field_mut(&mut self, n: usize) -> Option<&mut Field> {
        self.fields.get_mut(n)
    }

    /// Resizes to `n` fields; both counters follow.
    pub fn set_n_fields(&mut self, n: usize) {
        self.fields.resize(n, Field::default());
        self.n_fields_cmp = n;
    }

    /// Field count within limits and every field carries a valid type.
    pub fn check_typed(&self) -> bool {
        self.n_fields() <= REC_MAX_N_FIELDS && self.fields.iter().all(|f| f.typ.validate())
    }

    /// Field count first, then bytewise field by field.
    pub fn coll_cmp(&self, other: &Tuple) -> Ordering {
        self.n_fields()
            .cmp(&other.n_fields())
            .then_with(|| {
                self.fields
                    .iter()
                    .zip(other.fields.iter())
                    .map(|(a, b)| compare_fields_bytes(a, b))
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_field_basics() {
        let f = Field::null();
        assert!(f.is_null());
        assert!(f.value().is_empty());
        assert!(f.binary_eq(&Field::null()));
        assert!(!f.binary_eq(&Field::bytes(vec![])));
    }

    #[test]
    fn value_is_bounded_by_len() {
        let mut f = Field::bytes(b"abcdef".to_vec());
        f.len = 3;
        assert_eq!(f.value(), b"abc");
        assert!(f.data_is_binary_equal(3, b"abc"));
    }

    #[test]
    fn tuple_resize_and_coll_cmp() {
        let mut t = Tuple::new(1);
        t.set_n_fields(3);
        assert_eq!(t.n_fields(), 3);
        assert_eq!(t.n_fields_cmp(), 3);

        let a = Tuple::with_fields(vec![Field::bytes(b"a".to_vec()), Field::null()]);
        let b = Tuple::with_fields(vec![Field::bytes(b"a".to_vec()), Field::bytes(b"".to_vec())]);
        assert_eq!(a.coll_cmp(&b), Ordering::Less);
        assert_eq!(b.coll_cmp(&a), Ordering::Greater);
        assert_eq!(Tuple::new(1).coll_cmp(&Tuple::new(2)), Ordering::Less);
    }

    #[test]
    fn typed_tuple_check() {
        let t = Tuple::with_fields(vec![Field::new(vec![0, 0, 0, 1], DataType::int(4))]);
        assert!(t.check_typed());
        assert!(!Tuple::with_fields(vec![Field::bytes(vec![1])]).check_typed());
    }
}
