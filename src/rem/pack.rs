//! rem/pack — самоописывающий упакованный кортеж:
//! [n_fields u16 BE] затем для каждого поля [null-flag u8][len u32 BE][bytes];
//! у NULL-поля нет ни длины, ни данных.

use byteorder::{BigEndian, ByteOrder};

use crate::data::{Field, Tuple};
use crate::error::{Error, Result};

pub fn pack_tuple(tuple: &Tuple) -> Result<Vec<u8>> {
    let n = tuple.n_fields();
    if n > u16::MAX as usize {
        return Err(Error::InvalidArgument(format!("{n} fields do not fit a u16 count")));
    }
    let payload: usize = tuple.fields.iter().map(|f| f.value().len()).sum();
    let mut buf = Vec::with_capacity(2 + n * 5 + payload);
    let mut hdr = [0u8; 4];
    BigEndian::write_u16(&mut hdr[..2], n as u16);
    buf.extend_from_slice(&hdr[..2]);
    for field in &tuple.fields {
        if field.is_null() {
            buf.push(1);
            continue;
        }
        let v = field.value();
        buf.push(0);
        BigEndian::write_u32(&mut hdr, v.len() as u32);
        buf.extend_from_slice(&hdr);
        buf.extend_from_slice(v);
    }
    Ok(buf)
}

pub fn unpack_tuple(buf: &[u8]) -> Result<Tuple> {
    if buf.len() < 2 {
        return Err(Error::Truncated("packed tuple shorter than its count".into()));
    }
    let n = BigEndian::read_u16(&buf[..2]) as usize;
    let mut pos = 2;
    let mut fields = Vec::with_capacity(n);
    for i in 0..n {
        let flag = *buf
            .get(pos)
            .ok_or_else(|| Error::Truncated(format!("field {i} flag at {pos}")))?;
        pos += 1;
        match flag {
            0 => {}
            1 => {
                fields.push(Field::null());
                continue;
            }
            _ => {
                return Err(Error::InvalidArgument(format!(
                    "field {i} has null flag {flag}"
                )))
            }
        }
        if pos + 4 > buf.len() {
            return Err(Error::Truncated(format!("field {i} length at {pos}")));
        }
        let len = BigEndian::read_u32(&buf[pos..pos + 4]) as usize;
        pos += 4;
        if pos + len > buf.len() {
            return Err(Error::Truncated(format!(
                "field {i} needs {len} bytes at {pos}, buffer has {}",
                buf.len()
            )));
        }
        fields.push(Field::bytes(buf[pos..pos + len].to_vec()));
        pos += len;
    }
    Ok(Tuple::with_fields(fields))
}
