//! data/types — типы столбцов: основной тип (mtype), точный тип (prtype), длина.

// Main types.
pub const DATA_VARCHAR: u32 = 1;
pub const DATA_CHAR: u32 = 2;
pub const DATA_FIXBINARY: u32 = 3;
pub const DATA_BINARY: u32 = 4;
pub const DATA_BLOB: u32 = 5;
pub const DATA_INT: u32 = 6;
pub const DATA_SYS_CHILD: u32 = 7;
pub const DATA_SYS: u32 = 8;
pub const DATA_FLOAT: u32 = 9;
pub const DATA_DOUBLE: u32 = 10;
pub const DATA_DECIMAL: u32 = 11;
pub const DATA_VARCLIENT: u32 = 12;
pub const DATA_CLIENT: u32 = 13;
pub const DATA_MTYPE_MAX: u32 = 63;

// Precise type flags.
pub const DATA_CLIENT_TYPE_MASK: u32 = 255;
pub const DATA_NOT_NULL: u32 = 256;
pub const DATA_UNSIGNED: u32 = 512;
pub const DATA_BINARY_TYPE: u32 = 1024;

// System columns (prtype low bits for DATA_SYS).
pub const DATA_ROW_ID: u32 = 0;
pub const DATA_TRX_ID: u32 = 1;
pub const DATA_ROLL_PTR: u32 = 2;
pub const DATA_N_SYS_COLS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataType {
    pub mtype: u32,
    pub prtype: u32,
    pub len: u32,
}

impl DataType {
    pub const fn new(mtype: u32, prtype: u32, len: u32) -> Self {
        Self { mtype, prtype, len }
    }

    /// Signed integer of `len` bytes.
    pub const fn int(len: u32) -> Self {
        Self::new(DATA_INT, 0, len)
    }

    pub const fn uint(len: u32) -> Self {
        Self::new(DATA_INT, DATA_UNSIGNED, len)
    }

    pub const fn char(len: u32) -> Self {
        Self::new(DATA_CHAR, 0, len)
    }

    pub const fn varchar(len: u32) -> Self {
        Self::new(DATA_VARCHAR, 0, len)
    }

    pub const fn binary(len: u32) -> Self {
        Self::new(DATA_BINARY, 0, len)
    }

    pub fn is_unsigned(&self) -> bool {
        self.prtype & DATA_UNSIGNED != 0
    }

    pub fn charset_coll(&self) -> u32 {
        charset_coll(self.prtype)
    }

    pub fn is_string(&self) -> bool {
        is_string_type(self.mtype)
    }

    pub fn is_binary_string(&self) -> bool {
        is_binary_string_type(self.mtype, self.prtype)
    }

    pub fn is_non_binary_string(&self) -> bool {
        is_non_binary_string_type(self.mtype, self.prtype)
    }

    /// Main type in range and system-column index valid.
    pub fn validate(&self) -> bool {
        if self.mtype < DATA_VARCHAR || self.mtype > DATA_CLIENT {
            return false;
        }
        if self.mtype == DATA_SYS && (self.prtype & DATA_CLIENT_TYPE_MASK) >= DATA_N_SYS_COLS {
            return false;
        }
        true
    }
}

pub fn is_string_type(mtype: u32) -> bool {
    mtype <= DATA_BLOB || mtype == DATA_CLIENT || mtype == DATA_VARCLIENT
}

pub fn is_binary_string_type(mtype: u32, prtype: u32) -> bool {
    mtype == DATA_FIXBINARY
        || mtype == DATA_BINARY
        || (mtype == DATA_BLOB && prtype & DATA_BINARY_TYPE != 0)
}

pub fn is_non_binary_string_type(mtype: u32, prtype: u32) -> bool {
    is_string_type(mtype) && !is_binary_string_type(mtype, prtype)
}

/// Combines an old-style prtype with a charset-collation number.
pub fn form_prtype(old_prtype: u32, charset_coll: u32) -> u32 {
    old_prtype + (charset_coll << 16)
}

#[inline]
pub fn charset_coll(prtype: u32) -> u32 {
    prtype >> 16
}
