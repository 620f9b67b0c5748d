//! fil/io — побайтно точный ввод/вывод целых страниц по `page_no * PAGE_SIZE`.
//!
//! Чтение за концом файла возвращает нули (страница ещё не записана).

use crate::error::{Error, IoResultExt, Result};
use crate::metrics::{record_page_read, record_page_write};
use crate::os::{read_full_at, FileIo};
use crate::univ::{pages_to_bytes, PAGE_SIZE};

/// Reads page `page_no` of `file` into `buf` (exactly PAGE_SIZE bytes).
pub fn read_page_into(file: &dyn FileIo, page_no: u64, buf: &mut [u8]) -> Result<()> {
    if buf.len() != PAGE_SIZE {
        return Err(Error::InvalidArgument(format!(
            "page buffer is {} bytes, expected {}",
            buf.len(),
            PAGE_SIZE
        )));
    }
    read_full_at(file, buf, pages_to_bytes(page_no))
        .ctx(|| format!("read page {} of {}", page_no, file.name()))?;
    record_page_read();
    Ok(())
}

pub fn read_page(file: &dyn FileIo, page_no: u64) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; PAGE_SIZE];
    read_page_into(file, page_no, &mut buf)?;
    Ok(buf)
}

pub fn write_page(file: &dyn FileIo, page_no: u64, buf: &[u8]) -> Result<()> {
    if buf.len() != PAGE_SIZE {
        return Err(Error::InvalidArgument(format!(
            "page buffer is {} bytes, expected {}",
            buf.len(),
            PAGE_SIZE
        )));
    }
    file.write_at(buf, pages_to_bytes(page_no))
        .ctx(|| format!("write page {} of {}", page_no, file.name()))?;
    record_page_write();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::os::{FileSystem, MemFileSystem};
    use std::path::Path;

    #[test]
    fn whole_page_roundtrip_and_zero_tail() {
        let fs = MemFileSystem::new();
        let f = fs.open(Path::new("p.ibd"), true).unwrap();
        let mut page = vec![0u8; PAGE_SIZE];
        page[0] = 0xAB;
        page[PAGE_SIZE - 1] = 0xCD;
        write_page(f.as_ref(), 2, &page).unwrap();
        assert_eq!(f.size().unwrap(), 3 * PAGE_SIZE as u64);
        assert_eq!(read_page(f.as_ref(), 2).unwrap(), page);
        assert!(read_page(f.as_ref(), 9).unwrap().iter().all(|b| *b == 0));
    }

    #[test]
    fn wrong_buffer_size_is_rejected() {
        let fs = MemFileSystem::new();
        let f = fs.open(Path::new("p.ibd"), true).unwrap();
        let e = write_page(f.as_ref(), 0, &[0u8; 10]).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
        let mut small = [0u8; 3];
        let e = read_page_into(f.as_ref(), 0, &mut small).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    }
}
