//! os — узкий интерфейс файлов, который потребляет менеджер табличных
//! пространств.
//!
//! - `FileIo`: read-at / write-at / sync / size / set_len / allocate / name;
//! - `FileSystem`: exists / open(create) / create_dir_all / remove / rename;
//! - `OsFileSystem`: std::fs + (опционально) эксклюзивная fs2-блокировка;
//! - `MemFileSystem`: in-memory вариант для тестов.
//!
//! Файл закрывается, когда отпущен последний `Arc<dyn FileIo>`.

use std::fmt;
use std::io;
use std::path::Path;
use std::sync::Arc;

mod file;
mod mem;

pub use file::{OsFile, OsFileSystem};
pub use mem::{MemFile, MemFileSystem};

pub trait FileIo: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Reads up to `buf.len()` bytes at `offset`; returns the count (short at EOF).
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Writes all of `buf` at `offset`, extending the file if needed.
    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<()>;

    fn sync(&self) -> io::Result<()>;

    fn size(&self) -> io::Result<u64>;

    /// Truncates or grows (zero-filled) to `len` bytes.
    fn set_len(&self, len: u64) -> io::Result<()>;

    /// Reserves space so that the file is at least `len` bytes.
    fn allocate(&self, len: u64) -> io::Result<()> {
        if self.size()? < len {
            self.set_len(len)?;
        }
        Ok(())
    }
}

pub trait FileSystem: Send + Sync + fmt::Debug {
    fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Opens `path` read-write; creates it when `create` is set.
    fn open(&self, path: &Path, create: bool) -> io::Result<Arc<dyn FileIo>>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    fn remove(&self, path: &Path) -> io::Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Creates the parent directories of `path`, if any.
pub fn create_subdirs_if_needed(fs: &dyn FileSystem, path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs.create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Grows `file` to at least `size` bytes: fs2 preallocation when asked,
/// otherwise a single zero byte at `size - 1`. Returns whether it grew.
pub fn ensure_file_size(file: &dyn FileIo, size: u64, preallocate: bool) -> io::Result<bool> {
    let cur = file.size()?;
    if cur >= size || size == 0 {
        return Ok(false);
    }
    if preallocate {
        file.allocate(size)?;
    } else {
        file.write_at(&[0u8], size - 1)?;
    }
    Ok(true)
}

/// Reads exactly `buf.len()` bytes at `offset`, zero-filling past EOF.
/// Returns the number of bytes that came from the file.
pub fn read_full_at(file: &dyn FileIo, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let mut done = 0;
    while done < buf.len() {
        let n = file.read_at(&mut buf[done..], offset + done as u64)?;
        if n == 0 {
            break;
        }
        done += n;
    }
    buf[done..].fill(0);
    Ok(done)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_size_writes_last_byte() {
        let fs = MemFileSystem::new();
        let f = fs.open(Path::new("a/b.ibd"), true).unwrap();
        assert!(ensure_file_size(f.as_ref(), 100, false).unwrap());
        assert_eq!(f.size().unwrap(), 100);
        assert!(!ensure_file_size(f.as_ref(), 50, false).unwrap());
        assert!(ensure_file_size(f.as_ref(), 200, true).unwrap());
        assert_eq!(f.size().unwrap(), 200);
    }

    #[test]
    fn read_full_zero_fills_past_eof() {
        let fs = MemFileSystem::new();
        let f = fs.open(Path::new("x"), true).unwrap();
        f.write_at(&[1, 2, 3], 0).unwrap();
        let mut buf = [0xEEu8; 6];
        assert_eq!(read_full_at(f.as_ref(), &mut buf, 1).unwrap(), 2);
        assert_eq!(buf, [2, 3, 0, 0, 0, 0]);
    }
}
