//! rem — типизированное сравнение полей и упакованные кортежи для передачи
//! между компонентами.

pub mod compare;
pub mod pack;

pub use compare::{cols_are_equal, compare_data, compare_fields, compare_tuples};
pub use pack::{pack_tuple, unpack_tuple};
