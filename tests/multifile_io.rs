use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

use innospace::error::ErrorKind;
use innospace::fil::{FilSystem, Purpose};
use innospace::fsp::{FileSpec, Fsp};
use innospace::os::MemFileSystem;
use innospace::univ::{PAGE_SIZE, PAGE_SIZE_U64};
use innospace::SpaceConfig;

fn mem_fsp() -> Result<(Arc<MemFileSystem>, Fsp)> {
    let fs = Arc::new(MemFileSystem::new());
    let fil = FilSystem::new(fs.clone(), SpaceConfig::default());
    fil.space_create("innodb_system", 0, 0, Purpose::Tablespace)?;
    Ok((fs, Fsp::new(Arc::new(fil))))
}

#[test]
fn page_four_lands_in_second_file() -> Result<()> {
    let (fs, fsp) = mem_fsp()?;
    fsp.open_system_tablespace(&[FileSpec::pages("ibdata1", 4), FileSpec::pages("ibdata2", 4)])?;
    let fil = fsp.fil();
    assert_eq!(fil.space_get_size(0)?, 8);

    let mut page = vec![0u8; PAGE_SIZE];
    page[0] = 0xAB;
    fil.space_write_page(0, 4, &page)?;
    assert_eq!(fil.space_read_page(0, 4)?[0], 0xAB);

    let second = fs.file(Path::new("ibdata2")).expect("second file exists").contents();
    assert_eq!(second[0], 0xAB);
    let first = fs.file(Path::new("ibdata1")).expect("first file exists").contents();
    assert_eq!(first.len(), 4 * PAGE_SIZE);
    // page 0 of file 1 is the header, untouched by the write
    assert_ne!(&first[..PAGE_SIZE], &page[..]);
    fsp.close_system_tablespace()?;
    Ok(())
}

#[test]
fn every_page_addresses_its_own_slot() -> Result<()> {
    let (fs, fsp) = mem_fsp()?;
    fsp.open_system_tablespace(&[
        FileSpec::pages("d1", 3),
        FileSpec::pages("d2", 2),
        FileSpec::pages("d3", 5),
    ])?;
    let fil = fsp.fil();
    for p in 1..10u64 {
        let mut page = vec![0u8; PAGE_SIZE];
        page[..8].copy_from_slice(&p.to_be_bytes());
        fil.space_write_page(0, p, &page)?;
    }
    for p in 1..10u64 {
        assert_eq!(&fil.space_read_page(0, p)?[..8], &p.to_be_bytes());
    }
    // page 5 is local page 0 of d3
    let d3 = fs.file(Path::new("d3")).expect("d3").contents();
    assert_eq!(&d3[..8], &5u64.to_be_bytes());
    Ok(())
}

#[test]
fn out_of_range_and_bad_buffers_are_rejected() -> Result<()> {
    let (_fs, fsp) = mem_fsp()?;
    fsp.open_system_tablespace(&[FileSpec::pages("ibdata1", 4)])?;
    let fil = fsp.fil();
    let page = vec![0u8; PAGE_SIZE];
    assert_eq!(
        fil.space_write_page(0, 4, &page).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        fil.space_write_page(0, 1, &page[..100]).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    assert_eq!(fil.space_read_page(9, 0).unwrap_err().kind(), ErrorKind::NotFound);

    fsp.close_system_tablespace()?;
    assert_eq!(
        fil.space_read_page(0, 1).unwrap_err().kind(),
        ErrorKind::InvalidArgument
    );
    Ok(())
}

#[test]
fn allocation_past_the_end_grows_the_last_file() -> Result<()> {
    let (fs, fsp) = mem_fsp()?;
    fsp.open_system_tablespace(&[
        FileSpec::pages("ibdata1", 4),
        FileSpec::pages("ibdata2", 2).with_autoextend(4 * PAGE_SIZE_U64),
    ])?;

    let pages: Vec<u32> = (0..6).map(|_| fsp.alloc_page(0)).collect::<Result<_, _>>()?;
    assert_eq!(pages, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(fsp.fil().space_get_size(0)?, 7);
    assert_eq!(fsp.header_get_free_limit(), 7);

    let info = fsp.fil().space_by_id(0).expect("registered");
    assert!(info.autoextend);
    assert_eq!(info.nodes[1].size, 3);
    // grown by the whole increment
    let file2 = fs.file(Path::new("ibdata2")).expect("ibdata2").contents();
    assert_eq!(file2.len(), 6 * PAGE_SIZE);

    fsp.close_system_tablespace()?;
    fsp.open_system_tablespace(&[
        FileSpec::pages("ibdata1", 4),
        FileSpec::pages("ibdata2", 2).with_autoextend(4 * PAGE_SIZE_U64),
    ])?;
    assert_eq!(fsp.fil().space_get_size(0)?, 7);
    assert_eq!(fsp.alloc_page(0)?, 7);
    Ok(())
}
