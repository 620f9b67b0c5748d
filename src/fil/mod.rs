//! fil — реестр табличных пространств и адресация страниц.
//!
//! - Space: имя, id, flags, purpose, кэшированный размер в страницах,
//!   autoextend и упорядоченный список файловых узлов (Node);
//! - узлы конкатенируются в объявленном порядке: логическая страница
//!   `page_no` живёт в узле, чей накопленный диапазон её содержит;
//! - I/O выполняется без удержания мьютекса реестра (Arc на хэндл
//!   клонируется под локом).
//!
//! Ошибки возвращаются, а не логируются.

use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::SpaceConfig;
use crate::error::{Error, IoResultExt, Result};
use crate::metrics::record_sync;
use crate::os::{FileIo, FileSystem};

pub mod checksum;
pub mod consts;
pub mod io;

pub use checksum::{page_checksum, stamp_checksum, stored_checksum, verify_checksum};
pub use consts::*;
pub use io::{read_page, read_page_into, write_page};

/// One data file of a space.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    /// Size in pages.
    pub size: u64,
    pub(crate) file: Option<Arc<dyn FileIo>>,
}

impl Node {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            file: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Space {
    pub name: String,
    pub id: u32,
    pub flags: u32,
    pub purpose: Purpose,
    /// Cached total pages.
    pub size: u64,
    pub autoextend: bool,
    /// Autoextend increment in bytes (0 = one page at a time).
    pub autoextend_increment: u64,
    pub nodes: Vec<Node>,
}

impl Space {
    fn new(name: String, id: u32, flags: u32, purpose: Purpose) -> Self {
        Self {
            name,
            id,
            flags,
            purpose,
            size: 0,
            autoextend: false,
            autoextend_increment: 0,
            nodes: Vec::new(),
        }
    }

    /// Sum of node sizes.
    pub fn node_pages(&self) -> u64 {
        self.nodes.iter().map(|n| n.size).sum()
    }

    /// Node index and node-local page for a logical page.
    pub fn locate(&self, page_no: u64) -> Option<(usize, u64)> {
        let mut start = 0u64;
        for (i, n) in self.nodes.iter().enumerate() {
            if page_no < start + n.size {
                return Some((i, page_no - start));
            }
            start += n.size;
        }
        None
    }

    /// Drop every node handle; the files close with their last reference.
    pub(crate) fn close_handles(&mut self) {
        for n in &mut self.nodes {
            n.file = None;
        }
    }
}

/// Handle-free view of a node, for status output.
#[derive(Debug, Clone, Serialize)]
pub struct NodeInfo {
    pub name: String,
    pub size: u64,
    pub open: bool,
}

/// Handle-free view of a space.
#[derive(Debug, Clone, Serialize)]
pub struct SpaceInfo {
    pub name: String,
    pub id: u32,
    pub flags: u32,
    pub purpose: Purpose,
    pub size: u64,
    pub autoextend: bool,
    pub nodes: Vec<NodeInfo>,
}

impl From<&Space> for SpaceInfo {
    fn from(s: &Space) -> Self {
        Self {
            name: s.name.clone(),
            id: s.id,
            flags: s.flags,
            purpose: s.purpose,
            size: s.size,
            autoextend: s.autoextend,
            nodes: s
                .nodes
                .iter()
                .map(|n| NodeInfo {
                    name: n.name.clone(),
                    size: n.size,
                    open: n.is_open(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default)]
struct FilState {
    spaces: HashMap<u32, Space>,
    ids_by_name: HashMap<String, u32>,
    max_space_id: u32,
}

/// Tablespace registry.
#[derive(Debug)]
pub struct FilSystem {
    fs: Arc<dyn FileSystem>,
    cfg: SpaceConfig,
    state: Mutex<FilState>,
}

fn not_found(id: u32) -> Error {
    Error::NotFound(format!("tablespace {id}"))
}

impl FilSystem {
    pub fn new(fs: Arc<dyn FileSystem>, cfg: SpaceConfig) -> Self {
        Self {
            fs,
            cfg,
            state: Mutex::new(FilState::default()),
        }
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn config(&self) -> &SpaceConfig {
        &self.cfg
    }

    fn state(&self) -> MutexGuard<'_, FilState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    // ---------- registry ----------

    pub fn space_create(&self, name: &str, id: u32, flags: u32, purpose: Purpose) -> Result<()> {
        let mut st = self.state();
        if st.spaces.contains_key(&id) {
            return Err(Error::AlreadyExists(format!("tablespace id {id}")));
        }
        if st.ids_by_name.contains_key(name) {
            return Err(Error::AlreadyExists(format!("tablespace name {name}")));
        }
        st.spaces
            .insert(id, Space::new(name.to_string(), id, flags, purpose));
        st.ids_by_name.insert(name.to_string(), id);
        st.max_space_id = st.max_space_id.max(id);
        info!("fil: registered space {} (id={}, flags={:#x})", name, id, flags);
        Ok(())
    }

    pub fn space_rename(&self, id: u32, new_name: &str) -> Result<()> {
        let mut st = self.state();
        if let Some(other) = st.ids_by_name.get(new_name) {
            if *other == id {
                return Ok(());
            }
            return Err(Error::AlreadyExists(format!("tablespace name {new_name}")));
        }
        let space = st.spaces.get_mut(&id).ok_or_else(|| not_found(id))?;
        let old = std::mem::replace(&mut space.name, new_name.to_string());
        st.ids_by_name.remove(&old);
        st.ids_by_name.insert(new_name.to_string(), id);
        debug!("fil: renamed space {} -> {} (id={})", old, new_name, id);
        Ok(())
    }

    /// Unregister a space, closing its node handles.
    pub fn space_drop(&self, id: u32) -> Result<()> {
        let mut st = self.state();
        let mut space = st.spaces.remove(&id).ok_or_else(|| not_found(id))?;
        st.ids_by_name.remove(&space.name);
        space.close_handles();
        info!("fil: dropped space {} (id={})", space.name, id);
        Ok(())
    }

    pub fn exists(&self, id: u32) -> bool {
        self.state().spaces.contains_key(&id)
    }

    pub fn space_by_id(&self, id: u32) -> Option<SpaceInfo> {
        self.state().spaces.get(&id).map(SpaceInfo::from)
    }

    pub fn space_id_by_name(&self, name: &str) -> Option<u32> {
        self.state().ids_by_name.get(name).copied()
    }

    pub fn space_flags(&self, id: u32) -> Option<u32> {
        self.state().spaces.get(&id).map(|s| s.flags)
    }

    pub fn space_purpose(&self, id: u32) -> Option<Purpose> {
        self.state().spaces.get(&id).map(|s| s.purpose)
    }

    pub fn max_space_id(&self) -> u32 {
        self.state().max_space_id
    }

    /// Append a (closed) node to a space and grow its cached size.
    pub fn node_create(&self, name: &str, size_pages: u64, id: u32) -> Result<()> {
        let mut st = self.state();
        let space = st.spaces.get_mut(&id).ok_or_else(|| not_found(id))?;
        space.nodes.push(Node::new(name, size_pages));
        space.size += size_pages;
        Ok(())
    }

    /// Cached total pages.
    pub fn space_get_size(&self, id: u32) -> Result<u64> {
        self.state()
            .spaces
            .get(&id)
            .map(|s| s.size)
            .ok_or_else(|| not_found(id))
    }

    /// Raise the cached size to `size`, attributing the delta to the last node.
    pub fn space_ensure_size(&self, id: u32, size: u64) -> Result<()> {
        let mut st = self.state();
        let space = st.spaces.get_mut(&id).ok_or_else(|| not_found(id))?;
        if size > space.size {
            let delta = size - space.size;
            if let Some(last) = space.nodes.last_mut() {
                last.size += delta;
            }
            space.size = size;
        }
        Ok(())
    }

    /// Run `f` on the space under the registry lock.
    pub(crate) fn with_space<R>(&self, id: u32, f: impl FnOnce(&mut Space) -> R) -> Result<R> {
        let mut st = self.state();
        let space = st.spaces.get_mut(&id).ok_or_else(|| not_found(id))?;
        Ok(f(space))
    }

    fn open_handles(&self, id: u32) -> Result<Vec<Arc<dyn FileIo>>> {
        self.with_space(id, |s| {
            s.nodes.iter().filter_map(|n| n.file.clone()).collect()
        })
    }

    /// Sync every open node handle.
    pub fn space_flush(&self, id: u32) -> Result<()> {
        for f in self.open_handles(id)? {
            f.sync().ctx(|| format!("sync {}", f.name()))?;
            record_sync();
        }
        Ok(())
    }

    /// Flush and close all node handles of a space.
    pub fn space_close_file(&self, id: u32) -> Result<()> {
        let res = self.space_flush(id);
        self.with_space(id, |s| s.close_handles())?;
        debug!("fil: closed files of space {}", id);
        res
    }

    // ---------- page addressing ----------

    fn node_for_page(&self, id: u32, page_no: u64) -> Result<(Arc<dyn FileIo>, u64)> {
        let st = self.state();
        let space = st.spaces.get(&id).ok_or_else(|| not_found(id))?;
        if page_no >= space.size {
            return Err(Error::InvalidArgument(format!(
                "page {} beyond size {} of space {}",
                page_no, space.size, id
            )));
        }
        let (idx, local) = space.locate(page_no).ok_or_else(|| {
            Error::InvalidArgument(format!(
                "page {} not covered by the nodes of space {}",
                page_no, id
            ))
        })?;
        let node = &space.nodes[idx];
        let file = node.file.clone().ok_or_else(|| {
            Error::InvalidArgument(format!("file {} of space {} is not open", node.name, id))
        })?;
        Ok((file, local))
    }

    pub fn space_read_page(&self, id: u32, page_no: u64) -> Result<Vec<u8>> {
        let (file, local) = self.node_for_page(id, page_no)?;
        read_page(file.as_ref(), local)
    }

    pub fn space_write_page(&self, id: u32, page_no: u64, buf: &[u8]) -> Result<()> {
        let (file, local) = self.node_for_page(id, page_no)?;
        write_page(file.as_ref(), local, buf)?;
        if self.cfg.data_fsync {
            file.sync().ctx(|| format!("sync {}", file.name()))?;
            record_sync();
        }
        Ok(())
    }
}
