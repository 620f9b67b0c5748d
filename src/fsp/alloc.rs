//! fsp/alloc — выдача номеров страниц.
//!
//! Состояние пространства (SpaceAlloc):
//! - карта экстентов в памяти (битмап + счётчик занятых);
//! - LIFO free-лист номеров страниц.
//!
//! Инвариант: страница p (0 < p < size) в free-листе ⇔ её бит сброшен.
//! После рестарта free-лист собирается из битмапа в убывающем порядке,
//! поэтому pop выдаёт номера по возрастанию.

use log::{debug, warn};
use std::sync::Arc;

use super::header::{
    extent_bitmap_range, extent_count_for, header_get_extent_count, header_set_extent_count,
    MAX_EXTENTS,
};
use super::Fsp;
use crate::error::{Error, IoResultExt, Result};
use crate::metrics::{record_file_grow, record_page_alloc, record_page_free, record_space_extend};
use crate::os::ensure_file_size;
use crate::univ::{pages_to_bytes, EXTENT_BITMAP_BYTES, EXTENT_PAGES, NULL_PAGE, PAGE_SIZE_U64};

#[derive(Debug, Clone, Default)]
pub(crate) struct Extent {
    bitmap: [u8; EXTENT_BITMAP_BYTES],
    used: u32,
}

impl Extent {
    fn from_bitmap(bytes: &[u8]) -> Self {
        let mut bitmap = [0u8; EXTENT_BITMAP_BYTES];
        bitmap.copy_from_slice(bytes);
        let used = bitmap.iter().map(|b| b.count_ones()).sum();
        Self { bitmap, used }
    }
}

/// In-memory allocator state of one space.
#[derive(Debug, Default)]
pub(crate) struct SpaceAlloc {
    extents: Vec<Extent>,
    free: Vec<u32>,
}

impl SpaceAlloc {
    /// State for a space of `size` pages where only page 0 is in use.
    pub(crate) fn fresh(size: u64) -> Result<Self> {
        let mut a = SpaceAlloc::default();
        a.ensure_extents(extent_count_for(size).max(1))?;
        a.mark(0, true);
        a.rebuild_free_list(size);
        Ok(a)
    }

    /// Load the extent map stored on page 0 and rebuild the free list.
    pub(crate) fn from_header_page(page: &[u8], size: u64) -> Result<Self> {
        let stored = header_get_extent_count(page);
        if stored > MAX_EXTENTS {
            return Err(Error::CapacityExceeded(format!(
                "extent map exceeds header capacity ({stored} > {MAX_EXTENTS} extents)"
            )));
        }
        let mut a = SpaceAlloc {
            extents: (0..stored)
                .map(|i| Extent::from_bitmap(&page[extent_bitmap_range(i)]))
                .collect(),
            free: Vec::new(),
        };
        a.ensure_extents(extent_count_for(size).max(1))?;
        a.mark(0, true);
        a.rebuild_free_list(size);
        Ok(a)
    }

    /// Write extent count and bitmaps into page 0.
    pub(crate) fn store(&self, page: &mut [u8]) {
        header_set_extent_count(page, self.extents.len() as u32);
        for (i, ext) in self.extents.iter().enumerate() {
            page[extent_bitmap_range(i as u32)].copy_from_slice(&ext.bitmap);
        }
    }

    pub(crate) fn extent_count(&self) -> u32 {
        self.extents.len() as u32
    }

    pub(crate) fn used_pages(&self) -> u64 {
        self.extents.iter().map(|e| e.used as u64).sum()
    }

    pub(crate) fn free_list(&self) -> &[u32] {
        &self.free
    }

    fn ensure_extents(&mut self, count: u64) -> Result<()> {
        if count > MAX_EXTENTS as u64 {
            return Err(Error::CapacityExceeded(format!(
                "extent map exceeds header capacity ({count} > {MAX_EXTENTS} extents)"
            )));
        }
        if (self.extents.len() as u64) < count {
            self.extents.resize(count as usize, Extent::default());
        }
        Ok(())
    }

    pub(crate) fn is_used(&self, page_no: u32) -> bool {
        let (ext, off) = (page_no / EXTENT_PAGES, page_no % EXTENT_PAGES);
        match self.extents.get(ext as usize) {
            Some(e) => e.bitmap[(off / 8) as usize] & (1 << (off % 8)) != 0,
            None => false,
        }
    }

    /// Set or clear the bit of `page_no`; returns whether it changed.
    /// The extent must already exist.
    fn mark(&mut self, page_no: u32, used: bool) -> bool {
        let (ext, off) = (page_no / EXTENT_PAGES, page_no % EXTENT_PAGES);
        let Some(e) = self.extents.get_mut(ext as usize) else {
            return false;
        };
        let byte = &mut e.bitmap[(off / 8) as usize];
        let mask = 1u8 << (off % 8);
        let before = *byte & mask != 0;
        if before == used {
            return false;
        }
        if used {
            *byte |= mask;
            e.used += 1;
        } else {
            *byte &= !mask;
            e.used = e.used.saturating_sub(1);
        }
        true
    }

    fn rebuild_free_list(&mut self, size: u64) {
        let top = size.min(NULL_PAGE as u64) as u32;
        self.free = (1..top).rev().filter(|p| !self.is_used(*p)).collect();
    }
}

impl Fsp {
    /// Hand out a page number: pop the free list, else grow the space by one
    /// page. Returns `NULL_PAGE` when the space is not registered.
    pub fn alloc_page(&self, space_id: u32) -> Result<u32> {
        if !self.fil.exists(space_id) {
            return Ok(NULL_PAGE);
        }
        let rec = self.alloc_record(space_id)?;
        let mut a = Self::lock_alloc(&rec);

        if let Some(p) = a.free.pop() {
            a.mark(p, true);
            record_page_alloc();
            return Ok(p);
        }

        let size = self.fil.space_get_size(space_id)?;
        let page = size.max(1);
        if page >= NULL_PAGE as u64 {
            return Err(Error::CapacityExceeded(format!(
                "space {space_id} has no page numbers left"
            )));
        }
        if let Err(e) = a.ensure_extents(extent_count_for(page + 1)) {
            warn!("fsp: space {} cannot grow past {} pages: {}", space_id, page, e);
            return Err(e);
        }
        self.extend_space(space_id, page + 1)?;
        a.mark(page as u32, true);
        record_page_alloc();
        Ok(page as u32)
    }

    /// Return `page_no` to the free list and clear its bit.
    pub fn free_page(&self, space_id: u32, page_no: u32) -> Result<()> {
        let size = self.fil.space_get_size(space_id)?;
        if page_no == 0 || page_no as u64 >= size {
            return Err(Error::InvalidArgument(format!(
                "cannot free page {page_no} of space {space_id} (size {size})"
            )));
        }
        let rec = self.alloc_record(space_id)?;
        let mut a = Self::lock_alloc(&rec);
        if !a.mark(page_no, false) {
            debug!("fsp: page {} of space {} is already free", page_no, space_id);
            return Ok(());
        }
        a.free.push(page_no);
        record_page_free();
        Ok(())
    }

    /// Grow the space to `new_size` pages: the last node takes the delta,
    /// its file is grown (rounded up to the autoextend increment).
    fn extend_space(&self, space_id: u32, new_size: u64) -> Result<()> {
        let (file, node_bytes, inc, old_size) = self.fil.with_space(space_id, |s| {
            let old = s.size;
            let delta = new_size.saturating_sub(old);
            let inc = s.autoextend_increment;
            s.nodes.last().map(|n| {
                (
                    n.file.clone(),
                    pages_to_bytes(n.size + delta),
                    inc,
                    old,
                )
            })
        })?
        .ok_or_else(|| {
            Error::InvalidArgument(format!("space {space_id} has no file nodes to grow"))
        })?;
        if new_size <= old_size {
            return Ok(());
        }

        if let Some(file) = file {
            let cur = file
                .size()
                .ctx(|| format!("size of {}", file.name()))?;
            if cur < node_bytes {
                let mut target = node_bytes;
                if inc > 0 {
                    let step = inc.max(PAGE_SIZE_U64);
                    target = target.max(cur + step);
                    target = target.div_ceil(PAGE_SIZE_U64) * PAGE_SIZE_U64;
                }
                let grown = ensure_file_size(file.as_ref(), target, self.fil.config().preallocate)
                    .ctx(|| format!("grow {} to {} bytes", file.name(), target))?;
                if grown {
                    record_file_grow();
                    if self.fil.config().data_fsync {
                        file.sync().ctx(|| format!("sync {}", file.name()))?;
                    }
                }
            }
        }

        self.header_inc_size(space_id, (new_size - old_size) as u32)?;
        record_space_extend();
        Ok(())
    }

    pub(crate) fn alloc_record(
        &self,
        space_id: u32,
    ) -> Result<Arc<std::sync::Mutex<SpaceAlloc>>> {
        if let Some(rec) = self.shared().allocs.get(&space_id) {
            return Ok(rec.clone());
        }
        let size = self.fil.space_get_size(space_id)?;
        let fresh = SpaceAlloc::fresh(size)?;
        let mut sh = self.shared();
        let rec = sh
            .allocs
            .entry(space_id)
            .or_insert_with(|| Arc::new(std::sync::Mutex::new(fresh)));
        Ok(rec.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsp::header::{extent_map_get, header_init};
    use crate::univ::PAGE_SIZE;

    #[test]
    fn fresh_pops_ascending() {
        let mut a = SpaceAlloc::fresh(5).unwrap();
        assert!(a.is_used(0));
        assert_eq!(a.free_list(), &[4, 3, 2, 1]);
        assert_eq!(a.free.pop(), Some(1));
    }

    #[test]
    fn store_and_reload_keeps_bits() {
        let mut a = SpaceAlloc::fresh(2 * EXTENT_PAGES as u64).unwrap();
        a.mark(5, true);
        a.mark(EXTENT_PAGES + 1, true);
        let mut page = vec![0u8; PAGE_SIZE];
        header_init(&mut page, 0, 2 * EXTENT_PAGES, 0);
        a.store(&mut page);
        assert!(extent_map_get(&page, EXTENT_PAGES + 1));

        let b = SpaceAlloc::from_header_page(&page, 2 * EXTENT_PAGES as u64).unwrap();
        assert_eq!(b.extent_count(), 2);
        assert_eq!(b.used_pages(), 3);
        assert!(!b.free_list().contains(&5));
        assert_eq!(b.free_list().last(), Some(&1));
    }

    #[test]
    fn oversized_map_is_rejected() {
        let e = SpaceAlloc::fresh((MAX_EXTENTS as u64 + 1) * EXTENT_PAGES as u64).unwrap_err();
        assert_eq!(e.kind(), crate::error::ErrorKind::CapacityExceeded);
    }
}
