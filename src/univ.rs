//! univ — геометрия страницы и общие сентинелы.
//!
//! Размер страницы задаётся на этапе компиляции (как в simpledb: features
//! `page-8k` / `page-4k`); по умолчанию 16 KiB.
//! Размер экстента всегда 1 MiB: EXTENT_PAGES = 2^(20 - PAGE_SIZE_SHIFT).

#[cfg(feature = "page-4k")]
pub const PAGE_SIZE_SHIFT: u32 = 12;
#[cfg(all(feature = "page-8k", not(feature = "page-4k")))]
pub const PAGE_SIZE_SHIFT: u32 = 13;
#[cfg(not(any(feature = "page-8k", feature = "page-4k")))]
pub const PAGE_SIZE_SHIFT: u32 = 14;

pub const PAGE_SIZE: usize = 1 << PAGE_SIZE_SHIFT;
pub const PAGE_SIZE_U64: u64 = PAGE_SIZE as u64;

/// Pages per extent (64 for 16 KiB pages).
pub const EXTENT_PAGES: u32 = 1 << (20 - PAGE_SIZE_SHIFT);

/// Bytes of allocation bitmap per extent.
pub const EXTENT_BITMAP_BYTES: usize = ((EXTENT_PAGES as usize) + 7) / 8;

/// "No page" sentinel (FIL_NULL).
pub const NULL_PAGE: u32 = u32::MAX;

/// Length sentinel marking an SQL NULL field.
pub const SQL_NULL: u32 = u32::MAX;

/// Pages needed to hold `bytes`, rounded down.
#[inline]
pub fn bytes_to_pages(bytes: u64) -> u64 {
    bytes >> PAGE_SIZE_SHIFT
}

#[inline]
pub fn pages_to_bytes(pages: u64) -> u64 {
    pages << PAGE_SIZE_SHIFT
}
