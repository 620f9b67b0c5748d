//! rec/var — записи переменной длины: перед каждым полем
//! [null-flag u8][len u16 BE]; при null-flag = 1 данных нет.

use byteorder::{BigEndian, ByteOrder};

use crate::data::{Field, Tuple};
use crate::error::{Error, Result};

const FIELD_HDR: usize = 3;

/// Encodes `tuple`; `prefixes[i] > 0` truncates field `i` on the wire.
pub fn encode_var(tuple: &Tuple, prefixes: Option<&[usize]>, extra: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; extra];
    for (i, field) in tuple.fields.iter().enumerate() {
        if field.is_null() {
            buf.extend_from_slice(&[1, 0, 0]);
            continue;
        }
        let mut v = field.value();
        let prefix = prefixes.and_then(|p| p.get(i)).copied().unwrap_or(0);
        if prefix > 0 && v.len() > prefix {
            v = &v[..prefix];
        }
        if v.len() > u16::MAX as usize {
            return Err(Error::InvalidArgument(format!(
                "field {i} of {} bytes does not fit a 2-byte length",
                v.len()
            )));
        }
        let mut hdr = [0u8; FIELD_HDR];
        BigEndian::write_u16(&mut hdr[1..], v.len() as u16);
        buf.extend_from_slice(&hdr);
        buf.extend_from_slice(v);
    }
    Ok(buf)
}

pub fn decode_var(rec: &[u8], n_fields: usize, extra: usize) -> Result<Tuple> {
    if rec.len() < extra {
        return Err(Error::Truncated(format!(
            "record of {} bytes shorter than {extra} extra bytes",
            rec.len()
        )));
    }
    let mut pos = extra;
    let mut fields = Vec::with_capacity(n_fields);
    for i in 0..n_fields {
        if pos + FIELD_HDR > rec.len() {
            return Err(Error::Truncated(format!("field {i} header at {pos}")));
        }
        let flag = rec[pos];
        let len = BigEndian::read_u16(&rec[pos + 1..pos + 3]) as usize;
        pos += FIELD_HDR;
        match flag {
            1 => {
                fields.push(Field::null());
                continue;
            }
            0 => {}
            other => {
                return Err(Error::InvalidArgument(format!(
                    "field {i}: bad null flag {other:#04x}"
                )))
            }
        }
        if pos + len > rec.len() {
            return Err(Error::Truncated(format!(
                "field {i} needs {len} bytes at {pos}, record has {}",
                rec.len()
            )));
        }
        fields.push(Field::bytes(rec[pos..pos + len].to_vec()));
        pos += len;
    }
    Ok(Tuple::with_fields(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn roundtrip_with_null() {
        let t = Tuple::with_fields(vec![
            Field::bytes(b"alpha".to_vec()),
            Field::null(),
            Field::bytes(b"beta".to_vec()),
        ]);
        let enc = encode_var(&t, None, 2).unwrap();
        assert_eq!(enc.len(), 2 + 3 + 5 + 3 + 3 + 4);
        assert_eq!(&enc[7..10], &[1, 0, 0]);
        let dec = decode_var(&enc, 3, 2).unwrap();
        assert_eq!(dec.n_fields(), 3);
        assert_eq!(dec.fields[0].value(), b"alpha");
        assert!(dec.fields[1].is_null());
        assert_eq!(dec.fields[2].value(), b"beta");
    }

    #[test]
    fn prefix_truncates_on_wire() {
        let t = Tuple::with_fields(vec![Field::bytes(b"prefix".to_vec()), Field::bytes(b"xy".to_vec())]);
        let enc = encode_var(&t, Some(&[3, 0]), 0).unwrap();
        let dec = decode_var(&enc, 2, 0).unwrap();
        assert_eq!(dec.fields[0].len, 3);
        assert_eq!(dec.fields[0].value(), b"pre");
        assert_eq!(dec.fields[1].value(), b"xy");
    }

    #[test]
    fn truncated_and_bad_flag() {
        let t = Tuple::with_fields(vec![Field::bytes(b"abc".to_vec())]);
        let enc = encode_var(&t, None, 0).unwrap();
        assert_eq!(
            decode_var(&enc[..enc.len() - 1], 1, 0).unwrap_err().kind(),
            ErrorKind::Truncated
        );
        assert_eq!(decode_var(&enc, 2, 0).unwrap_err().kind(), ErrorKind::Truncated);
        assert_eq!(
            decode_var(&[7, 0, 0], 1, 0).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }
}
