//! fsp/system — открытие/закрытие табличного пространства из набора файлов.
//!
//! Open:
//! 1) валидация спецификаций файлов;
//! 2) закрыть старые хэндлы, сбросить узлы и состояние аллокатора;
//! 3) открыть/создать файлы, дорастить до объявленного размера;
//! 4) новый файл 0: построить заголовок; иначе: восстановить размер,
//!    флаги, free limit и размеры узлов из сайдкара;
//! 5) собрать карту экстентов и free-лист;
//! 6) записать заголовок обратно.
//!
//! Любая ошибка после шага 2 откатывает пространство к пустому списку
//! узлов с закрытыми хэндлами.

use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::alloc::SpaceAlloc;
use super::header::{
    get_size_low, header_get_flags, header_get_free_limit, header_get_space_id, header_init,
    header_set_free_limit,
};
use super::node_meta::read_node_meta;
use super::Fsp;
use crate::error::{Error, IoResultExt, Result};
use crate::fil::{verify_checksum, Node, SYSTEM_SPACE_ID};
use crate::metrics::record_file_grow;
use crate::os::{create_subdirs_if_needed, ensure_file_size, FileIo};
use crate::univ::{bytes_to_pages, pages_to_bytes, PAGE_SIZE, PAGE_SIZE_U64};

/// One data file of a tablespace as declared by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSpec {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub autoextend: bool,
    /// Growth step in bytes when autoextending (0 = one page).
    pub autoextend_increment: u64,
}

impl FileSpec {
    pub fn new(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        Self {
            path: path.into(),
            size_bytes,
            autoextend: false,
            autoextend_increment: 0,
        }
    }

    pub fn pages(path: impl Into<PathBuf>, size_pages: u64) -> Self {
        Self::new(path, pages_to_bytes(size_pages))
    }

    pub fn with_autoextend(mut self, increment_bytes: u64) -> Self {
        self.autoextend = true;
        self.autoextend_increment = increment_bytes;
        self
    }

    pub fn size_pages(&self) -> u64 {
        bytes_to_pages(self.size_bytes)
    }
}

fn validate(files: &[FileSpec]) -> Result<()> {
    if files.is_empty() {
        return Err(Error::InvalidArgument("no data files given".into()));
    }
    for (i, f) in files.iter().enumerate() {
        if f.path.as_os_str().is_empty() {
            return Err(Error::InvalidArgument(format!("data file #{i} has an empty path")));
        }
        if f.size_bytes == 0 || f.size_bytes % PAGE_SIZE_U64 != 0 {
            return Err(Error::InvalidArgument(format!(
                "{}: size {} is not a positive multiple of {}",
                f.path.display(),
                f.size_bytes,
                PAGE_SIZE
            )));
        }
        if f.autoextend && i + 1 != files.len() {
            return Err(Error::InvalidArgument(format!(
                "{}: only the last data file may autoextend",
                f.path.display()
            )));
        }
        if files[..i].iter().any(|o| o.path == f.path) {
            return Err(Error::InvalidArgument(format!(
                "{}: listed twice",
                f.path.display()
            )));
        }
    }
    Ok(())
}

fn node_name(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn grow(file: &dyn FileIo, bytes: u64, preallocate: bool) -> Result<()> {
    let grown = ensure_file_size(file, bytes, preallocate)
        .ctx(|| format!("grow {} to {} bytes", file.name(), bytes))?;
    if grown {
        record_file_grow();
        debug!("fsp: grew {} to {} bytes", file.name(), bytes);
    }
    Ok(())
}

impl Fsp {
    pub fn open_system_tablespace(&self, files: &[FileSpec]) -> Result<()> {
        self.open_tablespace(SYSTEM_SPACE_ID, files)
    }

    pub fn close_system_tablespace(&self) -> Result<()> {
        self.close_tablespace(SYSTEM_SPACE_ID)
    }

    /// Open (creating when missing) the files of a registered space.
    pub fn open_tablespace(&self, space_id: u32, files: &[FileSpec]) -> Result<()> {
        validate(files)?;
        if !self.fil.exists(space_id) {
            return Err(Error::NotFound(format!("tablespace {space_id} is not registered")));
        }
        self.reset_space(space_id)?;
        match self.open_files(space_id, files) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!("fsp: open of space {} failed: {}", space_id, e);
                let _ = self.reset_space(space_id);
                Err(e)
            }
        }
    }

    /// Persist page 0 and close every node handle of a space.
    pub fn close_tablespace(&self, space_id: u32) -> Result<()> {
        let header_open = self
            .fil
            .with_space(space_id, |s| s.nodes.first().is_some_and(|n| n.is_open()))?;
        let persisted = if header_open {
            self.persist_header(space_id)
        } else {
            Ok(())
        };
        let closed = self.fil.space_close_file(space_id);
        self.drop_alloc_record(space_id);
        info!("fsp: closed space {}", space_id);
        persisted.and(closed)
    }

    /// Close handles, clear the node list and forget allocator state.
    fn reset_space(&self, space_id: u32) -> Result<()> {
        self.fil.with_space(space_id, |s| {
            s.close_handles();
            s.nodes.clear();
            s.size = 0;
        })?;
        self.drop_alloc_record(space_id);
        Ok(())
    }

    fn open_files(&self, space_id: u32, files: &[FileSpec]) -> Result<()> {
        let fs = self.fil.file_system().clone();
        let preallocate = self.fil.config().preallocate;

        let mut nodes = Vec::with_capacity(files.len());
        let mut created = false;
        for (i, spec) in files.iter().enumerate() {
            let path = &spec.path;
            create_subdirs_if_needed(fs.as_ref(), path)
                .ctx(|| format!("create directories for {}", path.display()))?;
            let existed = fs
                .exists(path)
                .ctx(|| format!("stat {}", path.display()))?;
            let file = fs
                .open(path, true)
                .ctx(|| format!("open {}", path.display()))?;
            if i == 0 {
                created = !existed;
                if existed {
                    let len = file.size().ctx(|| format!("size of {}", path.display()))?;
                    if len < PAGE_SIZE_U64 {
                        return Err(Error::CorruptMetadata(format!(
                            "{}: {} bytes is shorter than the header page",
                            path.display(),
                            len
                        )));
                    }
                }
            }
            grow(file.as_ref(), spec.size_bytes, preallocate)?;
            nodes.push(Node {
                name: node_name(path),
                size: spec.size_pages(),
                file: Some(file),
            });
        }

        let last = &files[files.len() - 1];
        let total: u64 = nodes.iter().map(|n| n.size).sum();
        self.fil.with_space(space_id, |s| {
            s.nodes = nodes;
            s.size = total;
            s.autoextend = last.autoextend;
            s.autoextend_increment = last.autoextend_increment;
        })?;

        let alloc = if created {
            self.create_header(space_id, total)?
        } else {
            self.recover_header(space_id)?
        };
        self.shared()
            .allocs
            .insert(space_id, Arc::new(Mutex::new(alloc)));
        self.persist_header(space_id)?;

        let size = self.fil.space_get_size(space_id)?;
        info!(
            "fsp: opened space {} ({} files, {} pages, {})",
            space_id,
            files.len(),
            size,
            if created { "created" } else { "recovered" }
        );
        Ok(())
    }

    fn create_header(&self, space_id: u32, size: u64) -> Result<SpaceAlloc> {
        let size32 = u32::try_from(size)
            .map_err(|_| Error::CapacityExceeded(format!("space {space_id} has {size} pages")))?;
        let flags = self.fil.space_flags(space_id).unwrap_or(0);
        let alloc = SpaceAlloc::fresh(size)?;

        let mut page = vec![0u8; PAGE_SIZE];
        header_init(&mut page, space_id, size32, flags);
        header_set_free_limit(&mut page, size32);
        alloc.store(&mut page);
        self.write_header_page(space_id, &mut page)?;
        if space_id == SYSTEM_SPACE_ID {
            self.set_free_limit(size32);
        }
        debug!("fsp: created header of space {} ({} pages)", space_id, size);
        Ok(alloc)
    }

    fn recover_header(&self, space_id: u32) -> Result<SpaceAlloc> {
        let page = self.fil.space_read_page(space_id, 0)?;
        if self.fil.config().page_checksum && !verify_checksum(&page) {
            return Err(Error::CorruptMetadata(format!(
                "header page checksum mismatch in space {space_id}"
            )));
        }
        let stored_id = header_get_space_id(&page);
        if stored_id != space_id {
            return Err(Error::CorruptMetadata(format!(
                "header page carries space id {stored_id}, expected {space_id}"
            )));
        }
        let header_size = get_size_low(&page) as u64;
        let flags = header_get_flags(&page);
        let metas = read_node_meta(&page)?;

        // Adopt sizes from the sidecar (or the header) and grow short files.
        let preallocate = self.fil.config().preallocate;
        let to_grow = self.fil.with_space(space_id, |s| -> Result<Vec<(Arc<dyn FileIo>, u64)>> {
            if !metas.is_empty() {
                if metas.len() != s.nodes.len() {
                    return Err(Error::CorruptMetadata(format!(
                        "node sidecar lists {} files, {} given",
                        metas.len(),
                        s.nodes.len()
                    )));
                }
                for (m, n) in metas.iter().zip(s.nodes.iter_mut()) {
                    if m.name != n.name {
                        return Err(Error::CorruptMetadata(format!(
                            "node sidecar names {}, file given is {}",
                            m.name, n.name
                        )));
                    }
                    n.size = m.size_pages;
                }
            } else {
                let sum = s.node_pages();
                if header_size > sum {
                    if let Some(last) = s.nodes.last_mut() {
                        last.size += header_size - sum;
                    }
                }
            }
            s.size = s.node_pages();
            s.flags = flags;
            Ok(s
                .nodes
                .iter()
                .filter_map(|n| n.file.clone().map(|f| (f, pages_to_bytes(n.size))))
                .collect())
        })??;
        for (file, bytes) in to_grow {
            grow(file.as_ref(), bytes, preallocate)?;
        }

        let size = self.fil.space_get_size(space_id)?;
        if !metas.is_empty() {
            debug!(
                "fsp: adopted sidecar sizes for space {} ({} pages over {} files)",
                space_id,
                size,
                metas.len()
            );
        }
        if header_size == 0 {
            warn!("fsp: space {} header size was 0, repaired to {}", space_id, size);
        }
        if space_id == SYSTEM_SPACE_ID {
            let stored = header_get_free_limit(&page);
            let limit = if stored == 0 { size as u32 } else { stored };
            self.set_free_limit(limit);
        }
        SpaceAlloc::from_header_page(&page, size)
    }
}
