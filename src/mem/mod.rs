//! mem — стековая арена («heap») для временных буферов декодирования.
//!
//! - аллокации только растут вверх; освобождать можно верхнюю (free_top),
//!   всё сразу (reset: первый блок остаётся) или кучу целиком (free/Drop);
//! - alloc возвращает `HeapRef` (блок + смещение + длина + поколение),
//!   байты доступны через get/get_mut, пока ссылка жива;
//! - размер следующего блока удваивается до BLOCK_STANDARD_SIZE
//!   (MAX_ALLOC_IN_BUF для buffer-куч), но не меньше запроса;
//! - блоки стандартного размера переиспользуются через общий BlockPool.

use std::sync::{Mutex, OnceLock};

use crate::univ::PAGE_SIZE;

pub const BLOCK_START_SIZE: usize = 64;

/// Largest block a buffer heap grows to.
pub const MAX_ALLOC_IN_BUF: usize = PAGE_SIZE - 200;

pub const BLOCK_STANDARD_SIZE: usize = if PAGE_SIZE >= 16384 {
    8000
} else {
    MAX_ALLOC_IN_BUF
};

/// Blocks kept by a pool before extra ones are dropped.
const POOL_MAX_CACHED: usize = 64;

// ---------- block pool ----------

#[derive(Debug)]
pub struct BlockPool {
    block_size: usize,
    blocks: Mutex<Vec<Vec<u8>>>,
}

impl BlockPool {
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            blocks: Mutex::new(Vec::new()),
        }
    }

    /// Process-wide pool of BLOCK_STANDARD_SIZE blocks.
    pub fn standard() -> &'static BlockPool {
        static POOL: OnceLock<BlockPool> = OnceLock::new();
        POOL.get_or_init(|| BlockPool::new(BLOCK_STANDARD_SIZE))
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn cached(&self) -> usize {
        self.blocks.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    fn get(&self) -> Vec<u8> {
        let reused = self
            .blocks
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .pop();
        reused.unwrap_or_else(|| vec![0u8; self.block_size])
    }

    fn put(&self, block: Vec<u8>) {
        if block.len() != self.block_size {
            return;
        }
        let mut blocks = self.blocks.lock().unwrap_or_else(|p| p.into_inner());
        if blocks.len() < POOL_MAX_CACHED {
            blocks.push(block);
        }
    }
}

// ---------- heap ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapKind {
    Dynamic,
    Buffer,
}

/// Location of one allocation inside a heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapRef {
    gen: u32,
    block: u32,
    start: u32,
    len: u32,
}

impl HeapRef {
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug)]
struct Block {
    buf: Vec<u8>,
    used: usize,
}

#[derive(Debug)]
pub struct Heap {
    kind: HeapKind,
    blocks: Vec<Block>,
    allocations: Vec<HeapRef>,
    total_size: usize,
    gen: u32,
    pool: &'static BlockPool,
}

impl Heap {
    pub fn new(size: usize) -> Self {
        Self::with_pool(size, HeapKind::Dynamic, BlockPool::standard())
    }

    pub fn in_buffer(size: usize) -> Self {
        Self::with_pool(size, HeapKind::Buffer, BlockPool::standard())
    }

    pub fn with_pool(size: usize, kind: HeapKind, pool: &'static BlockPool) -> Self {
        let mut h = Self {
            kind,
            blocks: Vec::new(),
            allocations: Vec::new(),
            total_size: 0,
            gen: 0,
            pool,
        };
        h.add_block(if size == 0 { BLOCK_START_SIZE } else { size });
        h
    }

    pub fn kind(&self) -> HeapKind {
        self.kind
    }

    /// Total bytes of all blocks.
    pub fn size(&self) -> usize {
        self.total_size
    }

    /// Reserve `n` bytes (contents unspecified).
    pub fn alloc(&mut self, n: usize) -> HeapRef {
        if self.blocks.is_empty() {
            self.add_block(n.max(BLOCK_START_SIZE));
        }
        let fits = self
            .blocks
            .last()
            .is_some_and(|b| b.buf.len() - b.used >= n);
        if !fits {
            let size = self.next_block_size(n);
            self.add_block(size);
        }
        let idx = self.blocks.len() - 1;
        let b = &mut self.blocks[idx];
        let r = HeapRef {
            gen: self.gen,
            block: idx as u32,
            start: b.used as u32,
            len: n as u32,
        };
        b.used += n;
        self.allocations.push(r);
        r
    }

    pub fn alloc_zero(&mut self, n: usize) -> HeapRef {
        let r = self.alloc(n);
        if let Some(b) = self.get_mut(r) {
            b.fill(0);
        }
        r
    }

    pub fn dup(&mut self, data: &[u8]) -> HeapRef {
        let r = self.alloc(data.len());
        if let Some(b) = self.get_mut(r) {
            b.copy_from_slice(data);
        }
        r
    }

    /// Copy `s` with a trailing NUL.
    pub fn strdup(&mut self, s: &str) -> HeapRef {
        self.strdupl(s, s.len())
    }

    /// Copy at most `n` bytes of `s` with a trailing NUL.
    pub fn strdupl(&mut self, s: &str, n: usize) -> HeapRef {
        let n = n.min(s.len());
        let r = self.alloc(n + 1);
        if let Some(b) = self.get_mut(r) {
            b[..n].copy_from_slice(&s.as_bytes()[..n]);
            b[n] = 0;
        }
        r
    }

    /// `a` followed by `b` and a trailing NUL.
    pub fn strcat(&mut self, a: &str, b: &str) -> HeapRef {
        let r = self.alloc(a.len() + b.len() + 1);
        if let Some(buf) = self.get_mut(r) {
            buf[..a.len()].copy_from_slice(a.as_bytes());
            buf[a.len()..a.len() + b.len()].copy_from_slice(b.as_bytes());
            buf[a.len() + b.len()] = 0;
        }
        r
    }

    fn is_live(&self, r: HeapRef) -> bool {
        r.gen == self.gen
            && self
                .blocks
                .get(r.block as usize)
                .is_some_and(|b| r.start as usize + r.len as usize <= b.used)
    }

    pub fn get(&self, r: HeapRef) -> Option<&[u8]> {
        if !self.is_live(r) {
            return None;
        }
        let b = &self.blocks[r.block as usize];
        Some(&b.buf[r.start as usize..(r.start + r.len) as usize])
    }

    pub fn get_mut(&mut self, r: HeapRef) -> Option<&mut [u8]> {
        if !self.is_live(r) {
            return None;
        }
        let b = &mut self.blocks[r.block as usize];
        Some(&mut b.buf[r.start as usize..(r.start + r.len) as usize])
    }

    /// The latest allocation, if it is `n` bytes long.
    pub fn get_top(&self, n: usize) -> Option<HeapRef> {
        self.allocations.last().copied().filter(|r| r.len() == n)
    }

    /// Release the latest allocation if it is `n` bytes long.
    pub fn free_top(&mut self, n: usize) -> bool {
        let Some(top) = self.get_top(n) else {
            return false;
        };
        self.allocations.pop();
        let idx = top.block as usize;
        if let Some(b) = self.blocks.get_mut(idx) {
            b.used = top.start as usize;
        }
        if idx + 1 == self.blocks.len() && idx > 0 && self.blocks[idx].used == 0 {
            if let Some(b) = self.blocks.pop() {
                self.release_block(b);
            }
        }
        true
    }

    /// Drop every allocation but keep the first block.
    pub fn reset(&mut self) {
        while self.blocks.len() > 1 {
            if let Some(b) = self.blocks.pop() {
                self.release_block(b);
            }
        }
        if let Some(first) = self.blocks.first_mut() {
            first.used = 0;
        }
        self.allocations.clear();
        self.total_size = self.blocks.first().map_or(0, |b| b.buf.len());
        self.gen = self.gen.wrapping_add(1);
    }

    /// Release all blocks; the heap may be reused and grows from scratch.
    pub fn free(&mut self) {
        for b in std::mem::take(&mut self.blocks) {
            self.release_block(b);
        }
        self.allocations.clear();
        self.total_size = 0;
        self.gen = self.gen.wrapping_add(1);
    }

    fn next_block_size(&self, min: usize) -> usize {
        let last = self.blocks.last().map_or(BLOCK_START_SIZE / 2, |b| b.buf.len());
        let cap = match self.kind {
            HeapKind::Buffer => MAX_ALLOC_IN_BUF,
            HeapKind::Dynamic => BLOCK_STANDARD_SIZE,
        };
        (last * 2).min(cap).max(min)
    }

    fn add_block(&mut self, size: usize) {
        let buf = if size == self.pool.block_size() {
            self.pool.get()
        } else {
            vec![0u8; size]
        };
        self.total_size += buf.len();
        self.blocks.push(Block { buf, used: 0 });
    }

    fn release_block(&mut self, b: Block) {
        self.total_size = self.total_size.saturating_sub(b.buf.len());
        self.pool.put(b.buf);
    }
}

impl Drop for Heap {
    fn drop(&mut self) {
        self.free();
    }
}
