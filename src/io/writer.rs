//! Atomic saving of rendered encyclopedias.
use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::entry::Encyclopedia;
use crate::error::Error;
use crate::render::render;

/// Render `encyclopedia` and replace `path` with it.
///
/// The document is written to a temporary file next to `path` and renamed over
/// it, so `path` holds either the old or the new document, never a partial one.
pub fn save(encyclopedia: &Encyclopedia, path: &Path) -> Result<(), Error> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let html = render(encyclopedia);

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(html.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;

    info!(
        "saved {} entries ({} bytes) to {:?}",
        encyclopedia.len(),
        html.len(),
        path
    );
    Ok(())
}
