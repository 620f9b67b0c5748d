//! os/file — файлы ОС поверх std::fs.
//!
//! Блокировка (fs2, advisory):
//! - при lock_files = true каждый открытый файл данных держит эксклюзивную
//!   блокировку; второй процесс получит ошибку при открытии;
//! - блокировка снимается в Drop.

use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{FileIo, FileSystem};

#[derive(Debug)]
pub struct OsFile {
    name: String,
    file: Mutex<File>,
    locked: bool,
}

impl OsFile {
    fn lock(&self) -> MutexGuard<'_, File> {
        self.file.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

impl Drop for OsFile {
    fn drop(&mut self) {
        if self.locked {
            // unlock errors are ignored on drop
            let f = self.file.get_mut().unwrap_or_else(|p| p.into_inner());
            let _ = f.unlock();
        }
    }
}

impl FileIo for OsFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let mut f = self.lock();
        f.seek(SeekFrom::Start(offset))?;
        let mut done = 0;
        while done < buf.len() {
            match f.read(&mut buf[done..]) {
                Ok(0) => break,
                Ok(n) => done += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(done)
    }

    fn write_at(&self, buf: &[u8], offset: u64) -> io::Result<()> {
        let mut f = self.lock();
        f.seek(SeekFrom::Start(offset))?;
        f.write_all(buf)
    }

    fn sync(&self) -> io::Result<()> {
        self.lock().sync_all()
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.lock().metadata()?.len())
    }

    fn set_len(&self, len: u64) -> io::Result<()> {
        self.lock().set_len(len)
    }

    fn allocate(&self, len: u64) -> io::Result<()> {
        let f = self.lock();
        if f.metadata()?.len() < len {
            f.allocate(len)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem {
    lock_files: bool,
}

impl OsFileSystem {
    pub fn new(lock_files: bool) -> Self {
        Self { lock_files }
    }
}

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> io::Result<bool> {
        match std::fs::metadata(path) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn open(&self, path: &Path, create: bool) -> io::Result<Arc<dyn FileIo>> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(create)
            .open(path)?;
        if self.lock_files {
            file.try_lock_exclusive().map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("data file {} is locked by another process: {e}", path.display()),
                )
            })?;
        }
        Ok(Arc::new(OsFile {
            name: path.to_string_lossy().into_owned(),
            file: Mutex::new(file),
            locked: self.lock_files,
        }))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn tmp_path(tag: &str) -> std::path::PathBuf {
        let t = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        std::env::temp_dir().join(format!("ibos-{tag}-{}-{t}", std::process::id()))
    }

    #[test]
    fn write_read_and_grow() {
        let p = tmp_path("rw");
        let fs = OsFileSystem::new(false);
        assert!(!fs.exists(&p).unwrap());
        let f = fs.open(&p, true).unwrap();
        f.write_at(b"hello", 10).unwrap();
        assert_eq!(f.size().unwrap(), 15);
        let mut buf = [0u8; 8];
        assert_eq!(f.read_at(&mut buf, 10).unwrap(), 5);
        assert_eq!(&buf[..5], b"hello");
        f.allocate(4096).unwrap();
        assert!(f.size().unwrap() >= 4096);
        drop(f);
        fs.remove(&p).unwrap();
    }

    #[test]
    fn second_exclusive_open_fails() {
        let p = tmp_path("lock");
        let fs = OsFileSystem::new(true);
        let f1 = fs.open(&p, true).unwrap();
        assert!(fs.open(&p, false).is_err());
        drop(f1);
        let f2 = fs.open(&p, false).unwrap();
        drop(f2);
        let _ = std::fs::remove_file(&p);
    }
}
