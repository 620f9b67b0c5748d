//! engine — фасад над реестром (fil), аллокатором (fsp) и буферным пулом.
//!
//! - register/open/close/read_page/write_page/size: табличные пространства;
//! - alloc_page/free_page: аллокатор;
//! - чтение и запись страниц идут через буферный пул; flush/close
//!   сбрасывают грязные кадры, close дополнительно пишет заголовок.

use log::info;
use serde::Serialize;
use std::sync::Arc;

use crate::buf::{BufPool, BufStats};
use crate::config::{EngineBuilder, SpaceConfig};
use crate::error::{Error, Result};
use crate::fil::{FilSystem, Purpose, SpaceInfo, SYSTEM_SPACE_ID};
use crate::fsp::{AllocStats, FileSpec, Fsp};
use crate::os::{FileSystem, MemFileSystem, OsFileSystem};
use crate::univ::PAGE_SIZE;

/// Name under which `open` registers the system space when needed.
pub const SYSTEM_SPACE_NAME: &str = "innodb_system";

pub struct Engine {
    cfg: SpaceConfig,
    fil: Arc<FilSystem>,
    fsp: Fsp,
    pool: BufPool,
}

/// Summary of one open space.
#[derive(Debug, Clone, Serialize)]
pub struct SpaceStatus {
    pub space: SpaceInfo,
    pub free_limit: u32,
    pub alloc: Option<AllocStats>,
    pub buf: BufStats,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Engine over the OS file system.
    pub fn with_config(cfg: SpaceConfig) -> Result<Self> {
        let fs: Arc<dyn FileSystem> = Arc::new(OsFileSystem::new(cfg.lock_files));
        Ok(Self::with_fs(fs, cfg))
    }

    /// Engine over an in-memory file system.
    pub fn in_memory(cfg: SpaceConfig) -> Self {
        Self::with_fs(Arc::new(MemFileSystem::new()), cfg)
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>, cfg: SpaceConfig) -> Self {
        let fil = Arc::new(FilSystem::new(fs, cfg.clone()));
        let fsp = Fsp::new(fil.clone());
        let pool = BufPool::new(fil.clone(), cfg.buf_pool_pages);
        Self {
            cfg,
            fil,
            fsp,
            pool,
        }
    }

    pub fn config(&self) -> &SpaceConfig {
        &self.cfg
    }

    pub fn fil(&self) -> &Arc<FilSystem> {
        &self.fil
    }

    pub fn fsp(&self) -> &Fsp {
        &self.fsp
    }

    pub fn pool(&self) -> &BufPool {
        &self.pool
    }

    // ---------- tablespaces ----------

    pub fn register(&self, name: &str, id: u32, flags: u32) -> Result<()> {
        self.fil.space_create(name, id, flags, Purpose::Tablespace)
    }

    /// Open the system tablespace, registering it first if needed.
    pub fn open(&self, files: &[FileSpec]) -> Result<()> {
        if !self.fil.exists(SYSTEM_SPACE_ID) {
            self.register(SYSTEM_SPACE_NAME, SYSTEM_SPACE_ID, 0)?;
        }
        self.open_space(SYSTEM_SPACE_ID, files)
    }

    pub fn open_space(&self, id: u32, files: &[FileSpec]) -> Result<()> {
        self.pool.drop_space(id);
        self.fsp.open_tablespace(id, files)
    }

    pub fn close(&self) -> Result<()> {
        self.close_space(SYSTEM_SPACE_ID)
    }

    /// Flush buffered pages, persist the header and close the files.
    pub fn close_space(&self, id: u32) -> Result<()> {
        let flushed = self.pool.flush_space(id);
        self.pool.drop_space(id);
        let closed = self.fsp.close_tablespace(id);
        let n = flushed?;
        closed?;
        info!("engine: closed space {} ({} buffered pages written)", id, n);
        Ok(())
    }

    pub fn size(&self, id: u32) -> Result<u64> {
        self.fil.space_get_size(id)
    }

    pub fn read_page(&self, id: u32, page_no: u32) -> Result<Vec<u8>> {
        let h = self.pool.fetch(id, page_no)?;
        let bytes = h.lock().clone();
        Ok(bytes)
    }

    pub fn write_page(&self, id: u32, page_no: u32, bytes: &[u8]) -> Result<()> {
        if bytes.len() != PAGE_SIZE {
            return Err(Error::InvalidArgument(format!(
                "page buffer is {} bytes, expected {}",
                bytes.len(),
                PAGE_SIZE
            )));
        }
        let h = self.pool.fetch(id, page_no)?;
        h.lock().copy_from_slice(bytes);
        h.mark_dirty();
        Ok(())
    }

    /// Write dirty pages of a space and sync its files.
    pub fn flush(&self, id: u32) -> Result<()> {
        self.pool.flush_space(id)?;
        self.fil.space_flush(id)
    }

    // ---------- allocator ----------

    pub fn alloc_page(&self, id: u32) -> Result<u32> {
        self.fsp.alloc_page(id)
    }

    pub fn free_page(&self, id: u32, page_no: u32) -> Result<()> {
        self.pool.drop_page(id, page_no);
        self.fsp.free_page(id, page_no)
    }

    pub fn status(&self, id: u32) -> Result<SpaceStatus> {
        let space = self
            .fil
            .space_by_id(id)
            .ok_or_else(|| Error::NotFound(format!("tablespace {id}")))?;
        let free_limit = if id == SYSTEM_SPACE_ID {
            self.fsp.header_get_free_limit()
        } else {
            space.size as u32
        };
        Ok(SpaceStatus {
            space,
            free_limit,
            alloc: self.fsp.alloc_stats(id),
            buf: self.pool.stats(),
        })
    }
}
