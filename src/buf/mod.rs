//! buf — буферный пул поверх реестра пространств.
//!
//! Контракт:
//! - fetch(space, page) закрепляет кадр и возвращает PageHandle;
//!   handle.lock() даёт изменяемые байты страницы, Drop снимает pin;
//! - промах читает страницу через FilSystem::space_read_page;
//! - вытесняется LRU-кадр без pin'ов; грязный кадр сначала пишется;
//! - все кадры закреплены: fetch возвращает CapacityExceeded.

use log::debug;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{Error, Result};
use crate::fil::FilSystem;
use crate::metrics::{record_buf_eviction, record_buf_flush, record_buf_hit, record_buf_miss};

mod lru;

use lru::Lru;

#[inline]
fn frame_key(space: u32, page_no: u32) -> u64 {
    ((space as u64) << 32) | page_no as u64
}

#[derive(Debug)]
struct Frame {
    space: u32,
    page_no: u32,
    data: Mutex<Vec<u8>>,
    pins: AtomicU32,
    dirty: AtomicBool,
}

impl Frame {
    fn bytes(&self) -> MutexGuard<'_, Vec<u8>> {
        self.data.lock().unwrap_or_else(|p| p.into_inner())
    }
}

struct PoolState {
    frames: HashMap<u64, Arc<Frame>>,
    lru: Lru,
}

pub struct BufPool {
    fil: Arc<FilSystem>,
    capacity: usize,
    state: Mutex<PoolState>,
}

/// A pinned page.
pub struct PageHandle<'a> {
    _pool: &'a BufPool,
    frame: Arc<Frame>,
}

impl PageHandle<'_> {
    pub fn space(&self) -> u32 {
        self.frame.space
    }

    pub fn page_no(&self) -> u32 {
        self.frame.page_no
    }

    /// Page bytes; the guard is the page lock.
    pub fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.frame.bytes()
    }

    pub fn mark_dirty(&self) {
        self.frame.dirty.store(true, Ordering::Release);
    }

    pub fn is_dirty(&self) -> bool {
        self.frame.dirty.load(Ordering::Acquire)
    }
}

impl Drop for PageHandle<'_> {
    fn drop(&mut self) {
        self.frame.pins.fetch_sub(1, Ordering::AcqRel);
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BufStats {
    pub capacity: usize,
    pub resident: usize,
    pub dirty: usize,
    pub pinned: usize,
}

impl BufPool {
    pub fn new(fil: Arc<FilSystem>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            fil,
            capacity,
            state: Mutex::new(PoolState {
                frames: HashMap::with_capacity(capacity),
                lru: Lru::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn write_back(&self, frame: &Frame) -> Result<()> {
        let data = frame.bytes();
        self.fil
            .space_write_page(frame.space, frame.page_no as u64, &data)?;
        frame.dirty.store(false, Ordering::Release);
        record_buf_flush();
        Ok(())
    }

    pub fn fetch(&self, space: u32, page_no: u32) -> Result<PageHandle<'_>> {
        let key = frame_key(space, page_no);
        let mut st = self.state();
        if let Some(frame) = st.frames.get(&key).cloned() {
            frame.pins.fetch_add(1, Ordering::AcqRel);
            st.lru.touch(key);
            record_buf_hit();
            return Ok(PageHandle {
                _pool: self,
                frame,
            });
        }
        record_buf_miss();

        if st.frames.len() >= self.capacity {
            let victim = {
                let frames = &st.frames;
                st.lru.victim(|k| {
                    frames
                        .get(&k)
                        .is_some_and(|f| f.pins.load(Ordering::Acquire) == 0)
                })
            };
            let Some(vkey) = victim else {
                return Err(Error::CapacityExceeded(format!(
                    "all {} buffer frames are pinned",
                    self.capacity
                )));
            };
            if let Some(vframe) = st.frames.get(&vkey).cloned() {
                if vframe.dirty.load(Ordering::Acquire) {
                    self.write_back(&vframe)?;
                }
            }
            st.frames.remove(&vkey);
            st.lru.remove(vkey);
            record_buf_eviction();
        }

        let data = self.fil.space_read_page(space, page_no as u64)?;
        let frame = Arc::new(Frame {
            space,
            page_no,
            data: Mutex::new(data),
            pins: AtomicU32::new(1),
            dirty: AtomicBool::new(false),
        });
        st.frames.insert(key, frame.clone());
        st.lru.touch(key);
        Ok(PageHandle {
            _pool: self,
            frame,
        })
    }

    /// Mark a resident page dirty; false when it is not resident.
    pub fn mark_dirty(&self, space: u32, page_no: u32) -> bool {
        match self.state().frames.get(&frame_key(space, page_no)) {
            Some(f) => {
                f.dirty.store(true, Ordering::Release);
                true
            }
            None => false,
        }
    }

    fn dirty_frames(&self, space: Option<u32>) -> Vec<Arc<Frame>> {
        self.state()
            .frames
            .values()
            .filter(|f| space.map_or(true, |s| f.space == s))
            .filter(|f| f.dirty.load(Ordering::Acquire))
            .cloned()
            .collect()
    }

    /// Write every dirty frame back; returns how many were written.
    pub fn flush_all(&self) -> Result<usize> {
        let dirty = self.dirty_frames(None);
        for f in &dirty {
            self.write_back(f)?;
        }
        if !dirty.is_empty() {
            debug!("buf: flushed {} pages", dirty.len());
        }
        Ok(dirty.len())
    }

    pub fn flush_space(&self, space: u32) -> Result<usize> {
        let dirty = self.dirty_frames(Some(space));
        for f in &dirty {
            self.write_back(f)?;
        }
        Ok(dirty.len())
    }

    /// Forget a resident page without writing it.
    pub fn drop_page(&self, space: u32, page_no: u32) -> bool {
        let key = frame_key(space, page_no);
        let mut st = self.state();
        st.lru.remove(key);
        st.frames.remove(&key).is_some()
    }

    /// Forget every resident page of a space without writing.
    pub fn drop_space(&self, space: u32) -> usize {
        let mut st = self.state();
        let keys: Vec<u64> = st
            .frames
            .iter()
            .filter(|(_, f)| f.space == space)
            .map(|(k, _)| *k)
            .collect();
        for k in &keys {
            st.frames.remove(k);
            st.lru.remove(*k);
        }
        keys.len()
    }

    pub fn stats(&self) -> BufStats {
        let st = self.state();
        BufStats {
            capacity: self.capacity,
            resident: st.frames.len(),
            dirty: st
                .frames
                .values()
                .filter(|f| f.dirty.load(Ordering::Acquire))
                .count(),
            pinned: st
                .frames
                .values()
                .filter(|f| f.pins.load(Ordering::Acquire) > 0)
                .count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpaceConfig;
    use crate::error::ErrorKind;
    use crate::fil::Purpose;
    use crate::os::{FileSystem, MemFileSystem};
    use std::path::Path;

    fn pool(cap: usize) -> BufPool {
        let fil = FilSystem::new(Arc::new(MemFileSystem::new()), SpaceConfig::default());
        fil.space_create("s", 1, 0, Purpose::Tablespace).unwrap();
        fil.node_create("s.ibd", 8, 1).unwrap();
        let h = fil.file_system().open(Path::new("s.ibd"), true).unwrap();
        fil.with_space(1, |s| s.nodes[0].file = Some(h)).unwrap();
        BufPool::new(Arc::new(fil), cap)
    }

    #[test]
    fn dirty_page_is_written_on_eviction() {
        let p = pool(1);
        {
            let h = p.fetch(1, 3).unwrap();
            h.lock()[0] = 0x5A;
            h.mark_dirty();
        }
        // evicts page 3
        drop(p.fetch(1, 4).unwrap());
        assert_eq!(p.fil.space_read_page(1, 3).unwrap()[0], 0x5A);
        assert_eq!(p.stats().resident, 1);
    }

    #[test]
    fn all_pinned_is_capacity_exceeded() {
        let p = pool(2);
        let _a = p.fetch(1, 0).unwrap();
        let _b = p.fetch(1, 1).unwrap();
        let e = p.fetch(1, 2).err().unwrap();
        assert_eq!(e.kind(), ErrorKind::CapacityExceeded);
        assert_eq!(p.stats().pinned, 2);
    }

    #[test]
    fn flush_and_drop() {
        let p = pool(4);
        {
            let h = p.fetch(1, 2).unwrap();
            h.lock()[10] = 1;
        }
        assert!(p.mark_dirty(1, 2));
        assert!(!p.mark_dirty(1, 7));
        assert_eq!(p.flush_all().unwrap(), 1);
        assert_eq!(p.flush_all().unwrap(), 0);
        assert_eq!(p.drop_space(1), 1);
        assert!(!p.drop_page(1, 2));
    }
}
