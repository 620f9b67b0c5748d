use anyhow::{anyhow, Result};

use innospace::univ::NULL_PAGE;

use crate::util::open_engine;

pub fn exec_alloc(files: &[String], count: u32) -> Result<()> {
    let engine = open_engine(files)?;
    let mut pages = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let p = engine.alloc_page(0)?;
        if p == NULL_PAGE {
            return Err(anyhow!("system tablespace is not registered"));
        }
        pages.push(p);
    }
    let size = engine.size(0)?;
    engine.close()?;
    for p in &pages {
        println!("{}", p);
    }
    println!("alloc: {} pages, space size now {} pages", pages.len(), size);
    Ok(())
}

pub fn exec_free(files: &[String], page: u32) -> Result<()> {
    let engine = open_engine(files)?;
    engine.free_page(0, page)?;
    engine.close()?;
    println!("free: page {} returned to the free list", page);
    Ok(())
}
