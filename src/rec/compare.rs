//! rec/compare — сравнение записей по выбранным столбцам с префиксами.
//!
//! Правила для одного столбца:
//! 1. оба NULL => равны; один NULL => NULL меньше;
//! 2. префикс 0 => типизированное сравнение (rem::compare);
//! 3. префикс p > 0 => memcmp первых min(len, p) байт; более короткое значение,
//!    целиком уместившееся в префикс, меньше.

use std::cmp::Ordering;

use crate::data::{Field, Tuple};
use crate::rem;

/// Compares `a` and `b` over the columns listed in `order` (positional when
/// empty), each bounded by `prefixes[i]` (0 = whole value). A column missing
/// from a record compares as NULL.
pub fn compare_records(a: &[Field], b: &[Field], order: &[usize], prefixes: &[usize]) -> Ordering {
    let positional: Vec<usize>;
    let cols = if order.is_empty() {
        positional = (0..a.len().min(b.len())).collect();
        &positional[..]
    } else {
        order
    };

    for (i, &col) in cols.iter().enumerate() {
        let prefix = prefixes.get(i).copied().unwrap_or(0);
        let ord = compare_field_prefix(a.get(col), b.get(col), prefix);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

pub fn compare_tuples(a: &Tuple, b: &Tuple, order: &[usize], prefixes: &[usize]) -> Ordering {
    compare_records(&a.fields, &b.fields, order, prefixes)
}

fn compare_field_prefix(a: Option<&Field>, b: Option<&Field>, prefix: usize) -> Ordering {
    let a_null = a.map_or(true, Field::is_null);
    let b_null = b.map_or(true, Field::is_null);
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) if !a_null && !b_null => (a, b),
        _ => {
            return match (a_null, b_null) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Less,
                _ => Ordering::Greater,
            }
        }
    };

    if prefix == 0 {
        return rem::compare_fields(a, b);
    }
    let av = a.value();
    let bv = b.value();
    av[..av.len().min(prefix)].cmp(&bv[..bv.len().min(prefix)])
}
