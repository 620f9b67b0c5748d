//! rec/fixed — записи из полей фиксированной ширины.
//!
//! Полезная нагрузка = `extra` нулевых байт + поля, дополненные нулями до своей
//! ширины. NULL-поле оставляет свой слот нулевым.

use crate::data::{Field, Tuple};
use crate::error::{Error, Result};

pub fn encode_fixed(tuple: &Tuple, widths: &[usize], extra: usize) -> Result<Vec<u8>> {
    if widths.len() != tuple.n_fields() {
        return Err(Error::InvalidArgument(format!(
            "field count {} does not match {} widths",
            tuple.n_fields(),
            widths.len()
        )));
    }
    let total: usize = widths.iter().sum();
    let mut buf = vec![0u8; extra + total];
    let mut pos = extra;
    for (field, &width) in tuple.fields.iter().zip(widths) {
        if !field.is_null() {
            let v = field.value();
            let n = v.len().min(width);
            buf[pos..pos + n].copy_from_slice(&v[..n]);
        }
        pos += width;
    }
    Ok(buf)
}

pub fn decode_fixed(rec: &[u8], widths: &[usize], extra: usize) -> Result<Tuple> {
    if rec.len() < extra {
        return Err(Error::Truncated(format!(
            "record of {} bytes shorter than {extra} extra bytes",
            rec.len()
        )));
    }
    let mut pos = extra;
    let mut fields = Vec::with_capacity(widths.len());
    for (i, &width) in widths.iter().enumerate() {
        if pos + width > rec.len() {
            return Err(Error::Truncated(format!(
                "field {i} needs {width} bytes at {pos}, record has {}",
                rec.len()
            )));
        }
        fields.push(Field::bytes(rec[pos..pos + width].to_vec()));
        pos += width;
    }
    Ok(Tuple::with_fields(fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rec::REC_N_NEW_EXTRA_BYTES;

    #[test]
    fn int_and_char_with_padding() {
        let t = Tuple::with_fields(vec![
            Field::bytes(vec![0x00, 0x00, 0x00, 0x2a]),
            Field::bytes(b"ab".to_vec()),
        ]);
        let enc = encode_fixed(&t, &[4, 3], REC_N_NEW_EXTRA_BYTES).unwrap();
        assert_eq!(enc.len(), 12);
        assert_eq!(&enc[5..], &[0x00, 0x00, 0x00, 0x2a, 0x61, 0x62, 0x00]);

        let dec = decode_fixed(&enc, &[4, 3], REC_N_NEW_EXTRA_BYTES).unwrap();
        assert_eq!(dec.n_fields(), 2);
        assert_eq!(dec.n_fields_cmp(), 2);
        assert_eq!(dec.fields[0].len, 4);
        assert_eq!(dec.fields[0].value(), &[0x00, 0x00, 0x00, 0x2a]);
        assert_eq!(dec.fields[1].len, 3);
        assert_eq!(dec.fields[1].value(), b"ab\0");
    }

    #[test]
    fn null_leaves_zero_slot() {
        let t = Tuple::with_fields(vec![Field::null(), Field::bytes(vec![9])]);
        let enc = encode_fixed(&t, &[2, 1], 0).unwrap();
        assert_eq!(enc, vec![0, 0, 9]);
    }

    #[test]
    fn width_mismatch_and_truncation() {
        let t = Tuple::with_fields(vec![Field::bytes(vec![1])]);
        let e = encode_fixed(&t, &[1, 1], 0).unwrap_err();
        assert_eq!(e.kind(), crate::error::ErrorKind::InvalidArgument);

        let e = decode_fixed(&[0, 0, 0], &[2, 2], 0).unwrap_err();
        assert_eq!(e.kind(), crate::error::ErrorKind::Truncated);
        let e = decode_fixed(&[0], &[], 5).unwrap_err();
        assert_eq!(e.kind(), crate::error::ErrorKind::Truncated);
    }
}
