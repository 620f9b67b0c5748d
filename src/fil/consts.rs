//! fil/consts — раскладка FIL-заголовка страницы, коды типов страниц и
//! назначения пространств.

use serde::Serialize;

// ---------- FIL page header (38 bytes) ----------

/// Space id or checksum (older formats).
pub const FIL_PAGE_SPACE_OR_CHKSUM: usize = 0;
pub const FIL_PAGE_OFFSET: usize = 4;
pub const FIL_PAGE_PREV: usize = 8;
pub const FIL_PAGE_NEXT: usize = 12;
pub const FIL_PAGE_LSN: usize = 16;
pub const FIL_PAGE_TYPE: usize = 24;
pub const FIL_PAGE_FILE_FLUSH_LSN: usize = 26;
pub const FIL_PAGE_ARCH_LOG_NO_OR_SPACE_ID: usize = 34;
/// Start of page payload.
pub const FIL_PAGE_DATA: usize = 38;

// ---------- FIL page trailer ----------

/// Trailer length at the end of every page.
pub const FIL_PAGE_DATA_END: usize = 8;

// ---------- page types ----------

pub const FIL_PAGE_TYPE_ALLOCATED: u16 = 0;
pub const FIL_PAGE_UNDO_LOG: u16 = 2;
pub const FIL_PAGE_INODE: u16 = 3;
pub const FIL_PAGE_IBUF_FREE_LIST: u16 = 4;
pub const FIL_PAGE_IBUF_BITMAP: u16 = 5;
pub const FIL_PAGE_TYPE_SYS: u16 = 6;
pub const FIL_PAGE_TYPE_TRX_SYS: u16 = 7;
pub const FIL_PAGE_TYPE_FSP_HDR: u16 = 8;
pub const FIL_PAGE_TYPE_XDES: u16 = 9;
pub const FIL_PAGE_TYPE_BLOB: u16 = 10;
pub const FIL_PAGE_INDEX: u16 = 17855;

/// Id of the system tablespace.
pub const SYSTEM_SPACE_ID: u32 = 0;

/// What a space holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Purpose {
    Tablespace,
    Log,
}

impl Purpose {
    pub fn code(self) -> u32 {
        match self {
            Purpose::Tablespace => 501,
            Purpose::Log => 502,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            501 => Some(Purpose::Tablespace),
            502 => Some(Purpose::Log),
            _ => None,
        }
    }
}
