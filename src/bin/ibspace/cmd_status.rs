use anyhow::Result;
use serde_json::json;

use innospace::metrics;

use crate::util::open_engine;

pub fn exec(files: &[String], json: bool) -> Result<()> {
    let engine = open_engine(files)?;
    let st = engine.status(0)?;
    let free_pages = engine.fsp().free_pages(0).unwrap_or_default();
    engine.close()?;

    if json {
        let ms = metrics::snapshot();
        let out = json!({
            "space": st.space,
            "free_limit": st.free_limit,
            "alloc": st.alloc,
            // pop order: last element first
            "free_pages": free_pages.iter().rev().collect::<Vec<_>>(),
            "config": engine.config().to_string(),
            "metrics": ms,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Space:");
    println!("  name        = {}", st.space.name);
    println!("  id          = {}", st.space.id);
    println!("  flags       = {:#x}", st.space.flags);
    println!("  size_pages  = {}", st.space.size);
    println!("  free_limit  = {}", st.free_limit);
    println!("  autoextend  = {}", st.space.autoextend);
    println!("Nodes:");
    for n in &st.space.nodes {
        println!("  {:<40} {:>10} pages", n.name, n.size);
    }
    if let Some(a) = &st.alloc {
        println!("Allocator:");
        println!("  extents     = {}", a.extent_count);
        println!("  used_pages  = {}", a.used_pages);
        println!("  free_pages  = {}", a.free_pages);
        let head: Vec<String> = free_pages
            .iter()
            .rev()
            .take(16)
            .map(|p| p.to_string())
            .collect();
        if !head.is_empty() {
            println!("  next_free   = {}", head.join(", "));
        }
    }
    Ok(())
}
