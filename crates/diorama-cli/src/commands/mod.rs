//! CLI command implementations

pub mod apply;
pub mod artworks;
pub mod capture;
pub mod inspect;
pub mod migrate;
pub mod scene;

use anyhow::{Context, Result};

/// Write `content` to `out`, or print it when no path is given
pub(crate) fn emit(content: &str, out: Option<&str>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, content).with_context(|| format!("failed to write {}", path))?;
            eprintln!("Wrote {}", path);
        }
        None => println!("{}", content),
    }
    Ok(())
}

pub(crate) fn read(path: &str) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))
}
