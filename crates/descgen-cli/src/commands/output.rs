use std::fs;
use std::io;
use std::path::Path;

/// Write `contents` to `path` unless the file already holds exactly that.
///
/// Returns whether the file was written. Leaving an identical file untouched
/// keeps its mtime, so `make` doesn't rebuild everything that includes it.
pub fn write_if_changed(path: &Path, contents: &str) -> io::Result<bool> {
    match fs::read(path) {
        Ok(existing) if existing == contents.as_bytes() => {
            log::debug!("{} is up to date", path.display());
            return Ok(false);
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)?;
    log::info!("wrote {}", path.display());
    Ok(true)
}
