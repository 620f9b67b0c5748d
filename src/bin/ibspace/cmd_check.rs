//! check — проверка страницы 0 без записи: чексумма и инварианты
//! заголовка/сайдкара.

use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::path::Path;

use innospace::fil::{read_page, stored_checksum, verify_checksum};
use innospace::fsp::{
    extent_count_for, extent_map_get, get_size_low, header_get_extent_count,
    header_get_free_limit, header_get_space_id, read_node_meta, MAX_EXTENTS,
};
use innospace::os::{FileSystem, OsFileSystem};

use crate::util::parse_file_specs;

#[derive(Debug, Serialize)]
struct CheckReport {
    file: String,
    checksum: u32,
    checksum_ok: bool,
    space_id: u32,
    size_pages: u32,
    free_limit: u32,
    extent_count: u32,
    nodes: Vec<(String, u64)>,
    problems: Vec<String>,
}

pub fn exec(files: &[String], json: bool) -> Result<()> {
    let specs = parse_file_specs(files)?;
    let first = specs
        .first()
        .ok_or_else(|| anyhow!("at least one --file is required"))?;

    // no lock: read-only inspection
    let fs = OsFileSystem::new(false);
    let path: &Path = &first.path;
    let file = fs
        .open(path, false)
        .with_context(|| format!("open {}", path.display()))?;
    let page = read_page(file.as_ref(), 0).with_context(|| format!("read header of {}", path.display()))?;

    let mut problems = Vec::new();
    let checksum_ok = verify_checksum(&page);
    if !checksum_ok {
        problems.push("header page checksum mismatch".to_string());
    }

    let size = get_size_low(&page);
    let free_limit = header_get_free_limit(&page);
    let extents = header_get_extent_count(&page);
    if free_limit > size {
        problems.push(format!("free limit {} exceeds size {}", free_limit, size));
    }
    if extents > MAX_EXTENTS {
        problems.push(format!("extent count {} exceeds capacity {}", extents, MAX_EXTENTS));
    }
    if (extents as u64) < extent_count_for(size as u64) {
        problems.push(format!("extent count {} does not cover {} pages", extents, size));
    }
    if !extent_map_get(&page, 0) {
        problems.push("page 0 is not marked allocated".to_string());
    }

    let nodes = match read_node_meta(&page) {
        Ok(n) => n,
        Err(e) => {
            problems.push(e.to_string());
            Vec::new()
        }
    };
    if !nodes.is_empty() {
        let sum: u64 = nodes.iter().map(|n| n.size_pages).sum();
        if sum != size as u64 {
            problems.push(format!("node sizes sum to {}, header says {}", sum, size));
        }
        if nodes.len() != specs.len() {
            problems.push(format!("{} nodes recorded, {} files given", nodes.len(), specs.len()));
        }
        for (n, s) in nodes.iter().zip(specs.iter()) {
            if n.name != s.path.to_string_lossy() {
                problems.push(format!("node {} recorded, file {} given", n.name, s.path.display()));
            }
        }
    }

    let report = CheckReport {
        file: path.display().to_string(),
        checksum: stored_checksum(&page),
        checksum_ok,
        space_id: header_get_space_id(&page),
        size_pages: size,
        free_limit,
        extent_count: extents,
        nodes: nodes.into_iter().map(|n| (n.name, n.size_pages)).collect(),
        problems,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("check {}:", report.file);
        println!("  space_id     = {}", report.space_id);
        println!("  size_pages   = {}", report.size_pages);
        println!("  free_limit   = {}", report.free_limit);
        println!("  extent_count = {}", report.extent_count);
        println!(
            "  checksum     = {:#010x} ({})",
            report.checksum,
            if report.checksum_ok { "ok" } else { "MISMATCH" }
        );
        for (name, pages) in &report.nodes {
            println!("  node {:<40} {:>10} pages", name, pages);
        }
        for p in &report.problems {
            println!("  PROBLEM: {}", p);
        }
    }

    if report.problems.is_empty() {
        Ok(())
    } else {
        Err(anyhow!("{} problem(s) found", report.problems.len()))
    }
}
