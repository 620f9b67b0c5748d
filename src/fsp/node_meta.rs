//! fsp/node_meta — сайдкар со списком файловых узлов на странице 0.
//!
//! Формат (BE): `[u32 count]` затем на каждый узел
//! `[u16 name_len][u32 size_pages][name bytes]`; хвост до FIL-трейлера
//! зануляется. count == 0: сайдкара нет.

use byteorder::{BigEndian, ByteOrder};

use super::header::NODE_META_OFFSET;
use crate::error::{Error, Result};
use crate::fil::FIL_PAGE_DATA_END;
use crate::univ::PAGE_SIZE;

const NODE_META_END: usize = PAGE_SIZE - FIL_PAGE_DATA_END;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMeta {
    pub name: String,
    pub size_pages: u64,
}

impl NodeMeta {
    pub fn new(name: impl Into<String>, size_pages: u64) -> Self {
        Self {
            name: name.into(),
            size_pages,
        }
    }
}

pub fn read_node_meta(page: &[u8]) -> Result<Vec<NodeMeta>> {
    let region = &page[NODE_META_OFFSET..NODE_META_END];
    let count = BigEndian::read_u32(&region[..4]) as usize;
    let mut off = 4;
    let mut out = Vec::with_capacity(count.min(region.len() / 6));
    for i in 0..count {
        if off + 6 > region.len() {
            return Err(Error::CorruptMetadata(format!(
                "node sidecar truncated at entry {i} of {count}"
            )));
        }
        let name_len = BigEndian::read_u16(&region[off..off + 2]) as usize;
        let size_pages = BigEndian::read_u32(&region[off + 2..off + 6]) as u64;
        off += 6;
        if off + name_len > region.len() {
            return Err(Error::CorruptMetadata(format!(
                "node sidecar name of entry {i} runs past the page"
            )));
        }
        let name = std::str::from_utf8(&region[off..off + name_len])
            .map_err(|e| Error::CorruptMetadata(format!("node sidecar name of entry {i}: {e}")))?
            .to_string();
        off += name_len;
        out.push(NodeMeta { name, size_pages });
    }
    Ok(out)
}

pub fn write_node_meta(page: &mut [u8], nodes: &[NodeMeta]) -> Result<()> {
    let count = u32::try_from(nodes.len())
        .map_err(|_| Error::CapacityExceeded(format!("{} file nodes", nodes.len())))?;
    let region = &mut page[NODE_META_OFFSET..NODE_META_END];
    BigEndian::write_u32(&mut region[..4], count);
    let mut off = 4;
    for n in nodes {
        let name = n.name.as_bytes();
        let name_len = u16::try_from(name.len()).map_err(|_| {
            Error::CapacityExceeded(format!("node name of {} bytes", name.len()))
        })?;
        let size = u32::try_from(n.size_pages).map_err(|_| {
            Error::CapacityExceeded(format!("node {} has {} pages", n.name, n.size_pages))
        })?;
        if off + 6 + name.len() > region.len() {
            return Err(Error::CapacityExceeded(
                "node sidecar exceeds its reserved region".into(),
            ));
        }
        BigEndian::write_u16(&mut region[off..off + 2], name_len);
        BigEndian::write_u32(&mut region[off + 2..off + 6], size);
        off += 6;
        region[off..off + name.len()].copy_from_slice(name);
        off += name.len();
    }
    region[off..].fill(0);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn write_then_read_back() {
        let mut page = vec![0xAAu8; PAGE_SIZE];
        let nodes = vec![NodeMeta::new("ibdata1", 4), NodeMeta::new("dir/ibdata2", 3)];
        write_node_meta(&mut page, &nodes).unwrap();
        assert_eq!(read_node_meta(&page).unwrap(), nodes);
        // trailing region zeroed, trailer untouched
        assert_eq!(page[NODE_META_END - 1], 0);
        assert_eq!(page[PAGE_SIZE - 1], 0xAA);
    }

    #[test]
    fn empty_page_has_no_nodes() {
        let page = vec![0u8; PAGE_SIZE];
        assert!(read_node_meta(&page).unwrap().is_empty());
    }

    #[test]
    fn overflow_is_capacity_exceeded() {
        let mut page = vec![0u8; PAGE_SIZE];
        let long = "x".repeat(600);
        let nodes = vec![NodeMeta::new(long.clone(), 1), NodeMeta::new(long, 1)];
        let e = write_node_meta(&mut page, &nodes).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::CapacityExceeded);

        let big = vec![NodeMeta::new("a", u32::MAX as u64 + 1)];
        let e = write_node_meta(&mut page, &big).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::CapacityExceeded);
    }

    #[test]
    fn garbage_count_is_corrupt() {
        let mut page = vec![0u8; PAGE_SIZE];
        BigEndian::write_u32(&mut page[NODE_META_OFFSET..], 5000);
        let e = read_node_meta(&page).unwrap_err();
        assert_eq!(e.kind(), ErrorKind::CorruptMetadata);
    }
}
