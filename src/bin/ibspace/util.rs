use anyhow::{anyhow, Context, Result};

use innospace::univ::pages_to_bytes;
use innospace::{Engine, FileSpec};

/// Parse `PATH:SIZE_PAGES[:auto[=INC_PAGES]]`.
pub fn parse_file_spec(s: &str) -> Result<FileSpec> {
    let mut parts: Vec<&str> = s.rsplitn(3, ':').collect();
    parts.reverse();

    let (path, pages, auto) = match parts.as_slice() {
        [path, pages, auto] if auto.starts_with("auto") => (*path, *pages, Some(*auto)),
        [head, path_tail, pages] => {
            // path itself contained ':'
            let path = &s[..head.len() + 1 + path_tail.len()];
            (path, *pages, None)
        }
        [path, pages] => (*path, *pages, None),
        _ => return Err(anyhow!("bad file spec {:?}: want PATH:SIZE_PAGES[:auto]", s)),
    };
    if path.is_empty() {
        return Err(anyhow!("bad file spec {:?}: empty path", s));
    }
    let pages: u64 = pages
        .parse()
        .with_context(|| format!("bad page count in file spec {:?}", s))?;

    let mut spec = FileSpec::pages(path, pages);
    if let Some(auto) = auto {
        let inc_pages: u64 = match auto.strip_prefix("auto") {
            Some("") => 0,
            Some(rest) => rest
                .strip_prefix('=')
                .ok_or_else(|| anyhow!("bad autoextend suffix {:?}", auto))?
                .parse()
                .with_context(|| format!("bad autoextend increment in {:?}", s))?,
            None => return Err(anyhow!("bad autoextend suffix {:?}", auto)),
        };
        spec = spec.with_autoextend(pages_to_bytes(inc_pages));
    }
    Ok(spec)
}

pub fn parse_file_specs(files: &[String]) -> Result<Vec<FileSpec>> {
    files.iter().map(|f| parse_file_spec(f)).collect()
}

/// Engine from env config with the system tablespace open.
pub fn open_engine(files: &[String]) -> Result<Engine> {
    let specs = parse_file_specs(files)?;
    let engine = Engine::builder().build()?;
    engine
        .open(&specs)
        .with_context(|| format!("open system tablespace ({} files)", specs.len()))?;
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_auto() {
        let s = parse_file_spec("data/ibdata1:64").unwrap();
        assert_eq!(s.size_pages(), 64);
        assert!(!s.autoextend);
        let s = parse_file_spec("ibdata2:8:auto=4").unwrap();
        assert!(s.autoextend);
        assert_eq!(s.autoextend_increment, pages_to_bytes(4));
        let s = parse_file_spec("C:/db/ibdata1:16").unwrap();
        assert_eq!(s.path.to_string_lossy(), "C:/db/ibdata1");
        assert!(parse_file_spec("ibdata1").is_err());
        assert!(parse_file_spec("ibdata1:x").is_err());
    }
}
