//! fil/checksum — CRC32C страницы заголовка в FIL-трейлере.
//!
//! - trailer[0..4]: CRC32C (BE) по всей странице с занулённым трейлером;
//! - trailer[4..8]: нули;
//! - stored == 0: страница не проштампована, проверка проходит.
//!
//! Штампуется только страница 0; обычный page I/O побайтно точен.

use byteorder::{BigEndian, ByteOrder};

use super::consts::FIL_PAGE_DATA_END;
use crate::univ::PAGE_SIZE;

const TRAILER_START: usize = PAGE_SIZE - FIL_PAGE_DATA_END;

/// CRC32C of `page` as if its trailer were zero.
pub fn page_checksum(page: &[u8]) -> u32 {
    let crc = crc32c::crc32c(&page[..TRAILER_START]);
    crc32c::crc32c_append(crc, &[0u8; FIL_PAGE_DATA_END])
}

/// Zero the trailer and store the checksum in it.
pub fn stamp_checksum(page: &mut [u8]) {
    page[TRAILER_START..PAGE_SIZE].fill(0);
    let crc = page_checksum(page);
    BigEndian::write_u32(&mut page[TRAILER_START..TRAILER_START + 4], crc);
}

pub fn stored_checksum(page: &[u8]) -> u32 {
    BigEndian::read_u32(&page[TRAILER_START..TRAILER_START + 4])
}

/// True when the page is unstamped or its checksum matches.
pub fn verify_checksum(page: &[u8]) -> bool {
    match stored_checksum(page) {
        0 => true,
        stored => stored == page_checksum(page),
    }
}
