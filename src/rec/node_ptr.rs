//! rec/node_ptr — запись-указатель узла: [child page no u32 BE][ключ].

use byteorder::{BigEndian, ByteOrder};

use super::REC_NODE_PTR_SIZE;
use crate::error::{Error, Result};

pub fn node_ptr_encode(child_page_no: u32, key: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; REC_NODE_PTR_SIZE + key.len()];
    BigEndian::write_u32(&mut out[..REC_NODE_PTR_SIZE], child_page_no);
    out[REC_NODE_PTR_SIZE..].copy_from_slice(key);
    out
}

pub fn node_ptr_decode(rec: &[u8]) -> Result<(u32, &[u8])> {
    if rec.len() < REC_NODE_PTR_SIZE {
        return Err(Error::Truncated(format!(
            "node pointer of {} bytes",
            rec.len()
        )));
    }
    let child = BigEndian::read_u32(&rec[..REC_NODE_PTR_SIZE]);
    Ok((child, &rec[REC_NODE_PTR_SIZE..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_then_key() {
        let rec = node_ptr_encode(0x01020304, b"key");
        assert_eq!(&rec[..4], &[1, 2, 3, 4]);
        let (child, key) = node_ptr_decode(&rec).unwrap();
        assert_eq!(child, 0x01020304);
        assert_eq!(key, b"key");
    }

    #[test]
    fn child_zero_is_allowed() {
        let rec = node_ptr_encode(0, b"");
        assert_eq!(node_ptr_decode(&rec).unwrap(), (0, &b""[..]));
        assert!(node_ptr_decode(&rec[..3]).is_err());
    }
}
