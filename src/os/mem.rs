//! os/mem — in-memory файловая система (тесты, утилиты).
//!
//! Содержимое файла переживает «закрытие»: повторный open того же пути
//! возвращает тот же буфер, пока жив `MemFileSystem`.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{FileIo, FileSystem};

#[derive(Debug)]
pub struct MemFile {
    name: String,
    data: Mutex<Vec<u8>>,
}

impl MemFile {
    fn data(&self) -> MutexGuard<'_, Vec<u8>> {
        self.data.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Snapshot of the whole file.
    pub fn contents(&self) -> Vec<u8> {
        self.data().clone()
    }
}

impl FileIo for MemFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let data = self.data();
        let len = data.len() as u64;
        if offset >= len {
            return Ok(0);
        }
        let start = offset as usize;
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<()> {
        let end = offset
            .checked_add(buf.len() as u64)
            .filter(|e| *e <= usize::MAX as u64)
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "write offset overflow"))?
            as usize;
        let mut data = self.data();
        if data.len() < end {
            data.resize(end, 0);
        }
        data[offset as usize..end].copy_from_slice(buf);
        Ok(())
    }

    fn sync(&self) -> io::Result<()> {
        Ok(())
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.data().len() as u64)
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "length overflow"))?;
        self.data().resize(len, 0);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemFileSystem {
    files: Mutex<HashMap<PathBuf, Arc<MemFile>>>,
}

impl MemFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> MutexGuard<'_, HashMap<PathBuf, Arc<MemFile>>> {
        self.files.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Direct handle to a file's buffer, bypassing open().
    pub fn file(&self, path: &Path) -> Option<Arc<MemFile>> {
        self.files().get(path).cloned()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{}: no such file", path.display()),
    )
}

impl FileSystem for MemFileSystem {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        Ok(self.files().contains_key(path))
    }

    fn open(&self, path: &Path, create: bool) -> io::Result<Arc<dyn FileIo>> {
        let mut files = self.files();
        if let Some(f) = files.get(path) {
            return Ok(f.clone());
        }
        if !create {
            return Err(not_found(path));
        }
        let f = Arc::new(MemFile {
            name: path.to_string_lossy().into_owned(),
            data: Mutex::new(Vec::new()),
        });
        files.insert(path.to_path_buf(), f.clone());
        Ok(f)
    }

    fn create_dir_all(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        self.files()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut files = self.files();
        let f = files.remove(from).ok_or_else(|| not_found(from))?;
        files.insert(to.to_path_buf(), f);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reopen_sees_same_bytes() {
        let fs = MemFileSystem::new();
        assert!(fs.open(Path::new("t.ibd"), false).is_err());
        let f = fs.open(Path::new("t.ibd"), true).unwrap();
        f.write_at(&[7; 4], 2).unwrap();
        drop(f);
        let g = fs.open(Path::new("t.ibd"), false).unwrap();
        assert_eq!(g.size().unwrap(), 6);
        let mut b = [0u8; 6];
        g.read_at(&mut b, 0).unwrap();
        assert_eq!(b, [0, 0, 7, 7, 7, 7]);
    }

    #[test]
    fn rename_and_remove() {
        let fs = MemFileSystem::new();
        fs.open(Path::new("a"), true).unwrap();
        fs.rename(Path::new("a"), Path::new("b")).unwrap();
        assert!(!fs.exists(Path::new("a")).unwrap());
        assert!(fs.exists(Path::new("b")).unwrap());
        fs.remove(Path::new("b")).unwrap();
        assert!(fs.remove(Path::new("b")).is_err());
    }
}
