//! fsp — заголовок пространства, аллокатор страниц и открытие/закрытие
//! системного табличного пространства.
//!
//! Порядок локов: мьютекс SpaceAlloc → мьютекс реестра fil → shared
//! (кратко). Open/close не пересекаются с аллокацией на том же
//! пространстве (вызывающий обязан их разнести).

use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::fil::{stamp_checksum, FilSystem, FIL_PAGE_DATA_END, SYSTEM_SPACE_ID};
use crate::univ::PAGE_SIZE;

pub mod alloc;
pub mod header;
pub mod node_meta;
pub mod system;

use alloc::SpaceAlloc;
pub use header::*;
pub use node_meta::{read_node_meta, write_node_meta, NodeMeta};
pub use system::FileSpec;

#[derive(Debug, Default)]
struct Shared {
    allocs: HashMap<u32, Arc<Mutex<SpaceAlloc>>>,
    /// Free limit of the system space.
    free_limit: u32,
}

/// Allocator and header state over a tablespace registry.
#[derive(Debug)]
pub struct Fsp {
    fil: Arc<FilSystem>,
    shared: Mutex<Shared>,
}

/// Allocation summary of one space.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AllocStats {
    pub extent_count: u32,
    pub used_pages: u64,
    pub free_pages: usize,
}

impl Fsp {
    pub fn new(fil: Arc<FilSystem>) -> Self {
        Self {
            fil,
            shared: Mutex::new(Shared::default()),
        }
    }

    pub fn fil(&self) -> &Arc<FilSystem> {
        &self.fil
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_alloc(rec: &Arc<Mutex<SpaceAlloc>>) -> MutexGuard<'_, SpaceAlloc> {
        rec.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Free limit of the system space.
    pub fn header_get_free_limit(&self) -> u32 {
        self.shared().free_limit
    }

    /// Cached size of the system space (0 when not registered).
    pub fn header_get_tablespace_size(&self) -> u64 {
        self.fil.space_get_size(SYSTEM_SPACE_ID).unwrap_or(0)
    }

    /// Grow the cached size of a space; the system space also advances
    /// its free limit.
    pub fn header_inc_size(&self, space_id: u32, inc: u32) -> Result<()> {
        let size = self.fil.space_get_size(space_id)?;
        self.fil.space_ensure_size(space_id, size + inc as u64)?;
        if space_id == SYSTEM_SPACE_ID {
            let mut sh = self.shared();
            sh.free_limit = sh.free_limit.saturating_add(inc);
        }
        Ok(())
    }

    fn set_free_limit(&self, limit: u32) {
        self.shared().free_limit = limit;
    }

    fn drop_alloc_record(&self, space_id: u32) {
        self.shared().allocs.remove(&space_id);
    }

    /// Page numbers currently on the free list (pop order is from the end).
    pub fn free_pages(&self, space_id: u32) -> Option<Vec<u32>> {
        let rec = self.shared().allocs.get(&space_id).cloned()?;
        let a = Self::lock_alloc(&rec);
        Some(a.free_list().to_vec())
    }

    pub fn alloc_stats(&self, space_id: u32) -> Option<AllocStats> {
        let rec = self.shared().allocs.get(&space_id).cloned()?;
        let a = Self::lock_alloc(&rec);
        Some(AllocStats {
            extent_count: a.extent_count(),
            used_pages: a.used_pages(),
            free_pages: a.free_list().len(),
        })
    }

    /// Write size, free limit, flags, extent map and node sidecar into
    /// page 0 of an open space.
    pub fn persist_header(&self, space_id: u32) -> Result<()> {
        let (size, flags, metas) = self.fil.with_space(space_id, |s| {
            let metas: Vec<NodeMeta> = s
                .nodes
                .iter()
                .map(|n| NodeMeta::new(n.name.clone(), n.size))
                .collect();
            (s.size, s.flags, metas)
        })?;
        let size32 = u32::try_from(size)
            .map_err(|_| Error::CapacityExceeded(format!("space {space_id} has {size} pages")))?;
        let free_limit = if space_id == SYSTEM_SPACE_ID {
            self.header_get_free_limit()
        } else {
            size32
        };

        let mut page = self.fil.space_read_page(space_id, 0)?;
        header_set_space_id(&mut page, space_id);
        header_set_size(&mut page, size32);
        header_set_free_limit(&mut page, free_limit);
        header_set_flags(&mut page, flags);
        let rec = self.shared().allocs.get(&space_id).cloned();
        if let Some(rec) = rec {
            Self::lock_alloc(&rec).store(&mut page);
        }
        write_node_meta(&mut page, &metas)?;
        self.write_header_page(space_id, &mut page)?;
        debug!(
            "fsp: persisted header of space {} (size={}, free_limit={}, nodes={})",
            space_id,
            size,
            free_limit,
            metas.len()
        );
        Ok(())
    }

    fn write_header_page(&self, space_id: u32, page: &mut [u8]) -> Result<()> {
        debug_assert_eq!(page.len(), PAGE_SIZE);
        if self.fil.config().page_checksum {
            stamp_checksum(page);
        } else {
            page[PAGE_SIZE - FIL_PAGE_DATA_END..].fill(0);
        }
        self.fil.space_write_page(space_id, 0, page)
    }
}
