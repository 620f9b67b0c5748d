//! rec — компактный формат записей на странице.
//!
//! Раскладка заголовка (REC_N_NEW_EXTRA_BYTES = 5 байт перед данными):
//! - byte 0: старший полубайт: info bits (min-rec 0x10, deleted 0x20), младший: n_owned;
//! - bytes 1..3 BE: (heap_no << 3) | status;
//! - bytes 3..5: указатель на следующую запись (здесь не интерпретируется).
//!
//! Модули:
//! - header  : упаковка/распаковка полей заголовка;
//! - fixed   : записи из полей фиксированной ширины;
//! - var     : записи с [null-flag, len u16 BE] перед каждым полем;
//! - offsets : массивы смещений полей;
//! - node_ptr: записи-указатели на дочернюю страницу;
//! - compare : сравнение записей с учётом порядка столбцов и префиксов.

pub mod compare;
pub mod fixed;
pub mod header;
pub mod node_ptr;
pub mod offsets;
pub mod var;

pub use compare::{compare_records, compare_tuples};
pub use fixed::{decode_fixed, encode_fixed};
pub use node_ptr::{node_ptr_decode, node_ptr_encode};
pub use offsets::{offsets_fixed, offsets_var};
pub use var::{decode_var, encode_var};

pub const REC_N_NEW_EXTRA_BYTES: usize = 5;

pub const REC_INFO_MIN_REC_FLAG: u8 = 0x10;
pub const REC_INFO_DELETED_FLAG: u8 = 0x20;

pub const REC_STATUS_ORDINARY: u16 = 0;
pub const REC_STATUS_NODE_PTR: u16 = 1;
pub const REC_STATUS_INFIMUM: u16 = 2;
pub const REC_STATUS_SUPREMUM: u16 = 3;

pub const REC_HEAP_NO_SHIFT: u32 = 3;
/// First heap number available to user records (0 and 1 are infimum/supremum).
pub const REC_NEW_HEAP_NO: u16 = 4;
pub const REC_HEAP_NO_INFIMUM: u16 = 0;
pub const REC_HEAP_NO_SUPREMUM: u16 = 1;

pub const REC_NODE_PTR_SIZE: usize = 4;

pub const REC_OFFS_SQL_NULL: u32 = 1 << 31;
pub const REC_OFFS_EXTERNAL: u32 = 1 << 30;
pub const REC_OFFS_MASK: u32 = REC_OFFS_EXTERNAL - 1;

pub const INFIMUM_EXTRA: [u8; REC_N_NEW_EXTRA_BYTES] = [0x01, 0x00, 0x02, 0x00, 0x00];
pub const SUPREMUM_EXTRA: [u8; REC_N_NEW_EXTRA_BYTES] = [0x01, 0x00, 0x0B, 0x00, 0x00];
pub const INFIMUM_DATA: [u8; 8] = *b"infimum\0";
pub const SUPREMUM_DATA: [u8; 8] = *b"supremum";

/// Infimum record bytes: extra header followed by its payload.
pub fn infimum_record() -> Vec<u8> {
    let mut v = Vec::with_capacity(REC_N_NEW_EXTRA_BYTES + INFIMUM_DATA.len());
    v.extend_from_slice(&INFIMUM_EXTRA);
    v.extend_from_slice(&INFIMUM_DATA);
    v
}

pub fn supremum_record() -> Vec<u8> {
    let mut v = Vec::with_capacity(REC_N_NEW_EXTRA_BYTES + SUPREMUM_DATA.len());
    v.extend_from_slice(&SUPREMUM_EXTRA);
    v.extend_from_slice(&SUPREMUM_DATA);
    v
}

#[cfg(test)]
mod tests {
    use super::header::*;
    use super::*;

    #[test]
    fn special_record_headers() {
        let inf = infimum_record();
        assert_eq!(&inf[..5], &[0x01, 0x00, 0x02, 0x00, 0x00]);
        assert_eq!(&inf[5..], b"infimum\0");
        assert_eq!(header_status(&inf), REC_STATUS_INFIMUM);
        assert_eq!(header_heap_no(&inf), REC_HEAP_NO_INFIMUM);
        assert_eq!(header_n_owned(&inf), 1);

        let sup = supremum_record();
        assert_eq!(&sup[..5], &[0x01, 0x00, 0x0B, 0x00, 0x00]);
        assert_eq!(&sup[5..], b"supremum");
        assert_eq!(header_status(&sup), REC_STATUS_SUPREMUM);
        assert_eq!(header_heap_no(&sup), REC_HEAP_NO_SUPREMUM);
    }
}
