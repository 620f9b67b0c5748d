//! fsp/header — поля заголовка пространства на странице 0.
//!
//! Раскладка (все поля u32 BE, смещения от HEADER_OFFSET):
//! - 0  space id
//! - 8  size (pages)
//! - 12 free limit
//! - 16 flags
//! - 20 extent count
//! - 24 extent bitmap (EXTENT_BITMAP_BYTES на экстент, бит = 1: занято)
//!
//! Сайдкар узлов лежит в последних NODE_META_RESERVED байтах страницы,
//! поэтому карта экстентов ограничена MAX_EXTENTS.

use crate::fil::{
    FIL_PAGE_ARCH_LOG_NO_OR_SPACE_ID, FIL_PAGE_DATA, FIL_PAGE_OFFSET, FIL_PAGE_SPACE_OR_CHKSUM,
    FIL_PAGE_TYPE, FIL_PAGE_TYPE_FSP_HDR,
};
use crate::mach::{read_from_4, write_to_2, write_to_4};
use crate::univ::{EXTENT_BITMAP_BYTES, EXTENT_PAGES, PAGE_SIZE};

pub const HEADER_OFFSET: usize = FIL_PAGE_DATA;

pub const FSP_SPACE_ID: usize = 0;
pub const FSP_SIZE: usize = 8;
pub const FSP_FREE_LIMIT: usize = 12;
pub const FSP_SPACE_FLAGS: usize = 16;
pub const FSP_EXTENT_COUNT: usize = 20;
pub const FSP_EXTENT_MAP: usize = 24;

/// Bytes reserved at the end of page 0 for the node sidecar.
pub const NODE_META_RESERVED: usize = 1024;
pub const NODE_META_OFFSET: usize = PAGE_SIZE - NODE_META_RESERVED;

/// Extents whose bitmaps fit before the sidecar (1912 for 16 KiB pages).
pub const MAX_EXTENTS: u32 =
    ((NODE_META_OFFSET - HEADER_OFFSET - FSP_EXTENT_MAP) / EXTENT_BITMAP_BYTES) as u32;

#[inline]
fn get(page: &[u8], field: usize) -> u32 {
    read_from_4(&page[HEADER_OFFSET + field..])
}

#[inline]
fn set(page: &mut [u8], field: usize, val: u32) {
    write_to_4(&mut page[HEADER_OFFSET + field..], val);
}

/// Extents needed to cover `pages`.
pub fn extent_count_for(pages: u64) -> u64 {
    pages.div_ceil(EXTENT_PAGES as u64)
}

pub fn header_get_space_id(page: &[u8]) -> u32 {
    get(page, FSP_SPACE_ID)
}

pub fn header_get_size(page: &[u8]) -> u32 {
    get(page, FSP_SIZE)
}

/// Size field as stored (no repair).
pub fn get_size_low(page: &[u8]) -> u32 {
    header_get_size(page)
}

pub fn header_get_free_limit(page: &[u8]) -> u32 {
    get(page, FSP_FREE_LIMIT)
}

pub fn header_get_flags(page: &[u8]) -> u32 {
    get(page, FSP_SPACE_FLAGS)
}

/// Compressed page size: the raw flags word (0 when uncompressed).
pub fn header_get_zip_size(page: &[u8]) -> u32 {
    header_get_flags(page)
}

pub fn header_get_extent_count(page: &[u8]) -> u32 {
    get(page, FSP_EXTENT_COUNT)
}

pub fn header_set_space_id(page: &mut [u8], id: u32) {
    set(page, FSP_SPACE_ID, id);
}

pub fn header_set_size(page: &mut [u8], size: u32) {
    set(page, FSP_SIZE, size);
}

pub fn header_set_free_limit(page: &mut [u8], limit: u32) {
    set(page, FSP_FREE_LIMIT, limit);
}

pub fn header_set_flags(page: &mut [u8], flags: u32) {
    set(page, FSP_SPACE_FLAGS, flags);
}

pub fn header_set_extent_count(page: &mut [u8], count: u32) {
    set(page, FSP_EXTENT_COUNT, count);
}

pub fn header_init_fields(page: &mut [u8], space_id: u32, flags: u32) {
    header_set_space_id(page, space_id);
    header_set_flags(page, flags);
}

/// Zero the page and lay out a fresh FSP_HDR page: FIL header, id, flags,
/// size, extent count and page 0 marked allocated. Free limit is left 0.
pub fn header_init(page: &mut [u8], space_id: u32, size: u32, flags: u32) {
    page.fill(0);
    write_to_4(&mut page[FIL_PAGE_SPACE_OR_CHKSUM..], space_id);
    write_to_4(&mut page[FIL_PAGE_OFFSET..], 0);
    write_to_2(&mut page[FIL_PAGE_TYPE..], FIL_PAGE_TYPE_FSP_HDR as u32);
    write_to_4(&mut page[FIL_PAGE_ARCH_LOG_NO_OR_SPACE_ID..], space_id);
    header_init_fields(page, space_id, flags);
    header_set_size(page, size);
    header_set_free_limit(page, 0);
    let extents = extent_count_for(size as u64).max(1) as u32;
    header_set_extent_count(page, extents.min(MAX_EXTENTS));
    extent_map_set(page, 0, true);
}

// ---------- extent map on the page ----------

/// Byte range of extent `idx`'s bitmap within the page.
pub fn extent_bitmap_range(idx: u32) -> std::ops::Range<usize> {
    let start = HEADER_OFFSET + FSP_EXTENT_MAP + idx as usize * EXTENT_BITMAP_BYTES;
    start..start + EXTENT_BITMAP_BYTES
}

/// Whether `page_no` is marked allocated in the page's extent map.
pub fn extent_map_get(page: &[u8], page_no: u32) -> bool {
    let ext = page_no / EXTENT_PAGES;
    if ext >= MAX_EXTENTS {
        return false;
    }
    let off = page_no % EXTENT_PAGES;
    let byte = extent_bitmap_range(ext).start + (off / 8) as usize;
    page[byte] & (1 << (off % 8)) != 0
}

pub fn extent_map_set(page: &mut [u8], page_no: u32, used: bool) {
    let ext = page_no / EXTENT_PAGES;
    if ext >= MAX_EXTENTS {
        return;
    }
    let off = page_no % EXTENT_PAGES;
    let byte = extent_bitmap_range(ext).start + (off / 8) as usize;
    if used {
        page[byte] |= 1 << (off % 8);
    } else {
        page[byte] &= !(1 << (off % 8));
    }
}
