//! Centralized configuration and builder for the tablespace engine.
//!
//! Goals:
//! - Single place to collect tunables instead of scattering env lookups.
//! - SpaceConfig::from_env() reads IB_* variables; fluent `with_*` setters override.
//! - EngineBuilder wraps a SpaceConfig and produces an Engine.
//!
//! Defaults:
//! - data_fsync = false (page writes are not fsync'ed; close always syncs)
//! - preallocate = false (files grow by a single byte write at size-1)
//! - page_checksum = true (CRC32C of the header page in the FIL trailer)
//! - lock_files = true (exclusive advisory lock per data file)
//! - buf_pool_pages = 64

use std::fmt;

use crate::engine::Engine;
use crate::error::Result;

/// Top-level configuration for an engine instance.
#[derive(Clone, Debug)]
pub struct SpaceConfig {
    /// fsync node files after page writes and file growth.
    /// Env: IB_DATA_FSYNC (default false; "1|true|on|yes" => true)
    pub data_fsync: bool,

    /// Grow data files with fs2 `allocate` instead of a single-byte write.
    /// Env: IB_PREALLOCATE (default false)
    pub preallocate: bool,

    /// Stamp and verify the header page checksum.
    /// Env: IB_PAGE_CHECKSUM (default true; "0|false|off|no" => false)
    pub page_checksum: bool,

    /// Hold an exclusive advisory lock on each OS-backed data file while open.
    /// Env: IB_LOCK_FILES (default true)
    pub lock_files: bool,

    /// Buffer pool capacity in pages.
    /// Env: IB_BUF_POOL_PAGES (default 64)
    pub buf_pool_pages: usize,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            data_fsync: false,
            preallocate: false,
            page_checksum: true,
            lock_files: true,
            buf_pool_pages: 64,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let v = std::env::var(name).ok()?;
    let s = v.trim().to_ascii_lowercase();
    if s == "1" || s == "true" || s == "on" || s == "yes" {
        Some(true)
    } else if s == "0" || s == "false" || s == "off" || s == "no" {
        Some(false)
    } else {
        None
    }
}

impl SpaceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(on) = env_flag("IB_DATA_FSYNC") {
            cfg.data_fsync = on;
        }
        if let Some(on) = env_flag("IB_PREALLOCATE") {
            cfg.preallocate = on;
        }
        if let Some(on) = env_flag("IB_PAGE_CHECKSUM") {
            cfg.page_checksum = on;
        }
        if let Some(on) = env_flag("IB_LOCK_FILES") {
            cfg.lock_files = on;
        }
        if let Ok(v) = std::env::var("IB_BUF_POOL_PAGES") {
            if let Ok(n) = v.trim().parse::<usize>() {
                cfg.buf_pool_pages = n;
            }
        }

        cfg
    }

    pub fn with_data_fsync(mut self, on: bool) -> Self {
        self.data_fsync = on;
        self
    }

    pub fn with_preallocate(mut self, on: bool) -> Self {
        self.preallocate = on;
        self
    }

    pub fn with_page_checksum(mut self, on: bool) -> Self {
        self.page_checksum = on;
        self
    }

    pub fn with_lock_files(mut self, on: bool) -> Self {
        self.lock_files = on;
        self
    }

    pub fn with_buf_pool_pages(mut self, pages: usize) -> Self {
        self.buf_pool_pages = pages;
        self
    }
}

impl fmt::Display for SpaceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SpaceConfig {{ \
             data_fsync: {}, \
             preallocate: {}, \
             page_checksum: {}, \
             lock_files: {}, \
             buf_pool_pages: {} \
             }}",
            self.data_fsync,
            self.preallocate,
            self.page_checksum,
            self.lock_files,
            self.buf_pool_pages,
        )
    }
}

/// Builder that produces an `Engine` over the OS file system.
#[derive(Clone, Debug)]
pub struct EngineBuilder {
    cfg: SpaceConfig,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        // Start from env, then allow overrides.
        Self {
            cfg: SpaceConfig::from_env(),
        }
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a clean default (without reading env).
    pub fn from_default() -> Self {
        Self {
            cfg: SpaceConfig::default(),
        }
    }

    pub fn data_fsync(mut self, on: bool) -> Self {
        self.cfg.data_fsync = on;
        self
    }

    pub fn preallocate(mut self, on: bool) -> Self {
        self.cfg.preallocate = on;
        self
    }

    pub fn page_checksum(mut self, on: bool) -> Self {
        self.cfg.page_checksum = on;
        self
    }

    pub fn lock_files(mut self, on: bool) -> Self {
        self.cfg.lock_files = on;
        self
    }

    pub fn buf_pool_pages(mut self, pages: usize) -> Self {
        self.cfg.buf_pool_pages = pages;
        self
    }

    pub fn config(&self) -> &SpaceConfig {
        &self.cfg
    }

    /// Finish the builder and obtain an engine over the OS file system.
    pub fn build(self) -> Result<Engine> {
        Engine::with_config(self.cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_setters() {
        let c = SpaceConfig::default();
        assert!(c.page_checksum);
        assert!(!c.preallocate);
        let c = c.with_preallocate(true).with_buf_pool_pages(8);
        assert!(c.preallocate);
        assert_eq!(c.buf_pool_pages, 8);
        let s = c.to_string();
        assert!(s.contains("preallocate: true"), "{s}");
    }

    #[test]
    fn builder_from_default_ignores_env() {
        let b = EngineBuilder::from_default().lock_files(false).data_fsync(true);
        assert!(!b.config().lock_files);
        assert!(b.config().data_fsync);
    }
}
