use anyhow::Result;

use crate::util::open_engine;

pub fn exec(files: &[String]) -> Result<()> {
    let engine = open_engine(files)?;
    let size = engine.size(0)?;
    engine.close()?;
    println!("init: system tablespace ready ({} files, {} pages)", files.len(), size);
    Ok(())
}
