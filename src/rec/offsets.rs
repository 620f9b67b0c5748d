//! rec/offsets — массивы смещений: `[extra, end_0, end_1, ...]`, концы полей
//! считаются от начала данных (без extra).

use super::REC_OFFS_SQL_NULL;

pub fn offsets_fixed(widths: &[usize], extra: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(widths.len() + 1);
    out.push(extra);
    let mut end = 0;
    for w in widths {
        end += w;
        out.push(end);
    }
    out
}

/// NULL entries carry `REC_OFFS_SQL_NULL` and do not advance the position.
pub fn offsets_var(lens: &[usize], nulls: &[bool], extra: usize) -> Vec<u32> {
    let mut out = Vec::with_capacity(lens.len() + 1);
    out.push(extra as u32);
    let mut end: u32 = 0;
    for (i, &len) in lens.iter().enumerate() {
        if nulls.get(i).copied().unwrap_or(false) {
            out.push(end | REC_OFFS_SQL_NULL);
            continue;
        }
        end += len as u32;
        out.push(end);
    }
    out
}

/// Start and end of field `n` within the data part; None if NULL or out of range.
pub fn offsets_field_range(offsets: &[u32], n: usize) -> Option<(usize, usize)> {
    let end = *offsets.get(n + 1)?;
    if end & REC_OFFS_SQL_NULL != 0 {
        return None;
    }
    let start = if n == 0 {
        0
    } else {
        offsets[n] & super::REC_OFFS_MASK
    };
    Some((start as usize, (end & super::REC_OFFS_MASK) as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_offsets() {
        assert_eq!(offsets_fixed(&[4, 3, 2], 5), vec![5, 4, 7, 9]);
        assert_eq!(offsets_fixed(&[], 5), vec![5]);
    }

    #[test]
    fn var_offsets_flag_nulls() {
        let o = offsets_var(&[3, 9, 2], &[false, true, false], 5);
        assert_eq!(o, vec![5, 3, 3 | REC_OFFS_SQL_NULL, 5]);
        assert_eq!(offsets_field_range(&o, 0), Some((0, 3)));
        assert_eq!(offsets_field_range(&o, 1), None);
        assert_eq!(offsets_field_range(&o, 2), Some((3, 5)));
        assert_eq!(offsets_field_range(&o, 3), None);
    }
}
