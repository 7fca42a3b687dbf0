use crate::error::Result;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Readers never observe a half-written file.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    atomic_copy(path, &mut &data[..]).map(|_| ())
}

/// Stream `reader` into `path` through a sibling tempfile, renaming it into
/// place only once the copy completed. Returns the number of bytes written.
pub fn atomic_copy(path: &Path, reader: &mut dyn Read) -> Result<u64> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    let written = std::io::copy(reader, &mut tmp)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(written)
}
