//! innospace — подложка табличных пространств в духе InnoDB.
//!
//! Слои снизу вверх:
//! - univ / mach: геометрия страницы и байтовые кодеки;
//! - data / rec / rem: кортежи, компактные записи, сравнение;
//! - os / fil: файлы и адресация страниц по узлам пространства;
//! - fsp: заголовок, сайдкар узлов, аллокатор страниц;
//! - buf / mem: буферный пул и арена;
//! - read: MVCC read views;
//! - engine: фасад.

pub mod config;
pub mod error;
pub mod metrics;
pub mod univ;

pub mod data;
pub mod mach;
pub mod rec;
pub mod rem;

pub mod fil;
pub mod fsp;
pub mod os;

pub mod buf;
pub mod mem;
pub mod read;

pub mod engine;

// Удобные реэкспорты
pub use config::{EngineBuilder, SpaceConfig};
pub use engine::{Engine, SpaceStatus};
pub use error::{Error, ErrorKind, Result};
pub use fil::{FilSystem, Purpose};
pub use fsp::{FileSpec, Fsp};
pub use read::{ReadView, ViewId, ViewList};
