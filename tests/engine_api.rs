use anyhow::Result;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use innospace::error::ErrorKind;
use innospace::fil::SYSTEM_SPACE_ID;
use innospace::mem::Heap;
use innospace::univ::PAGE_SIZE;
use innospace::{metrics, Engine, EngineBuilder, FileSpec, SpaceConfig};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("innospace-{prefix}-{pid}-{t}-{id}"))
}

#[test]
fn builder_engine_persists_buffered_pages() -> Result<()> {
    let root = unique_root("engine");
    let files = [
        FileSpec::pages(root.join("ibdata1"), 8),
        FileSpec::pages(root.join("ibdata2"), 8).with_autoextend(0),
    ];

    let engine = EngineBuilder::from_default()
        .buf_pool_pages(4)
        .page_checksum(true)
        .build()?;
    assert_eq!(engine.config().buf_pool_pages, 4);
    engine.open(&files)?;

    let p = engine.alloc_page(SYSTEM_SPACE_ID)?;
    let mut page = vec![0u8; PAGE_SIZE];
    page[100..105].copy_from_slice(b"hello");
    engine.write_page(SYSTEM_SPACE_ID, p, &page)?;
    assert_eq!(&engine.read_page(SYSTEM_SPACE_ID, p)?[100..105], b"hello");
    assert!(engine.status(SYSTEM_SPACE_ID)?.buf.dirty >= 1);
    engine.close()?;

    let engine = EngineBuilder::from_default().build()?;
    engine.open(&files)?;
    assert_eq!(&engine.read_page(SYSTEM_SPACE_ID, p)?[100..105], b"hello");
    assert_eq!(engine.size(SYSTEM_SPACE_ID)?, 16);
    engine.close()?;
    Ok(())
}

#[test]
fn buffer_pool_evicts_and_writes_back() -> Result<()> {
    let engine = Engine::in_memory(SpaceConfig::default().with_buf_pool_pages(2));
    engine.open(&[FileSpec::pages("ibdata1", 10)])?;

    for p in 1..10u32 {
        let mut page = vec![0u8; PAGE_SIZE];
        page[0] = p as u8;
        engine.write_page(SYSTEM_SPACE_ID, p, &page)?;
    }
    let stats = engine.pool().stats();
    assert_eq!(stats.capacity, 2);
    assert!(stats.resident <= 2);
    assert_eq!(stats.pinned, 0);

    // evicted frames reached the files
    assert_eq!(engine.fil().space_read_page(SYSTEM_SPACE_ID, 1)?[0], 1);
    for p in 1..10u32 {
        assert_eq!(engine.read_page(SYSTEM_SPACE_ID, p)?[0], p as u8);
    }

    let err = engine
        .write_page(SYSTEM_SPACE_ID, 1, &[0u8; 10])
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    engine.close()?;
    Ok(())
}

#[test]
fn status_serializes_to_json() -> Result<()> {
    let engine = Engine::in_memory(SpaceConfig::default());
    engine.open(&[FileSpec::pages("ibdata1", 4)])?;
    engine.alloc_page(SYSTEM_SPACE_ID)?;

    let status = engine.status(SYSTEM_SPACE_ID)?;
    assert_eq!(status.free_limit, 4);
    let alloc = status.alloc.clone().expect("loaded");
    assert_eq!(alloc.used_pages, 2);
    assert_eq!(alloc.free_pages, 2);

    let v = serde_json::to_value(&status)?;
    assert_eq!(v["space"]["id"], 0);
    assert_eq!(v["space"]["size"], 4);
    assert_eq!(v["space"]["purpose"], "Tablespace");
    assert_eq!(v["alloc"]["extent_count"], 1);

    assert_eq!(engine.status(77).unwrap_err().kind(), ErrorKind::NotFound);
    engine.close()?;
    Ok(())
}

#[test]
fn registered_spaces_open_independently() -> Result<()> {
    let engine = Engine::in_memory(SpaceConfig::default());
    engine.open(&[FileSpec::pages("ibdata1", 4)])?;
    engine.register("t1", 7, 0)?;
    assert_eq!(
        engine.register("t1", 8, 0).unwrap_err().kind(),
        ErrorKind::AlreadyExists
    );
    engine.open_space(7, &[FileSpec::pages("t1.ibd", 6)])?;
    assert_eq!(engine.size(7)?, 6);
    assert_eq!(engine.alloc_page(7)?, 1);
    assert_eq!(engine.alloc_page(SYSTEM_SPACE_ID)?, 1);
    assert_eq!(engine.status(7)?.free_limit, 6);

    engine.close_space(7)?;
    engine.open_space(7, &[FileSpec::pages("t1.ibd", 6)])?;
    assert_eq!(engine.alloc_page(7)?, 2);
    engine.close_space(7)?;
    engine.close()?;
    Ok(())
}

#[test]
fn metrics_track_activity() -> Result<()> {
    let before = metrics::snapshot();
    let engine = Engine::in_memory(SpaceConfig::default());
    engine.open(&[FileSpec::pages("ibdata1", 4)])?;
    let p = engine.alloc_page(SYSTEM_SPACE_ID)?;
    engine.free_page(SYSTEM_SPACE_ID, p)?;
    engine.read_page(SYSTEM_SPACE_ID, 2)?;
    engine.read_page(SYSTEM_SPACE_ID, 2)?;
    engine.close()?;

    let after = metrics::snapshot();
    assert!(after.fsp_pages_allocated > before.fsp_pages_allocated);
    assert!(after.fsp_pages_freed > before.fsp_pages_freed);
    assert!(after.buf_hits > before.buf_hits);
    assert!(after.fil_page_writes > before.fil_page_writes);
    assert!(after.buf_hit_ratio() > 0.0);
    Ok(())
}

#[test]
fn scratch_heap_for_decode_buffers() -> Result<()> {
    let mut heap = Heap::new(0);
    let name = heap.strdup("ibdata1");
    let rec = heap.dup(&[1, 2, 3]);
    assert_eq!(heap.get(name), Some(&b"ibdata1\0"[..]));
    assert!(heap.free_top(3));
    assert!(heap.get(rec).is_none());
    heap.reset();
    assert!(heap.get(name).is_none());
    Ok(())
}
