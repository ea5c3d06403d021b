//! Reading inputs from and writing outputs to disk

use crate::types::*;
use std::path::{Path, PathBuf};

/// Read a file into a [`SourceFile`] named after its file name
pub async fn read_source(path: impl AsRef<Path>) -> Result<SourceFile> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    Ok(SourceFile::new(name, bytes))
}

pub async fn read_sources(paths: &[impl AsRef<Path>]) -> Result<Vec<SourceFile>> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        sources.push(read_source(path).await?);
    }
    Ok(sources)
}

/// Write `output` into `dir` under its own name and return the full path
pub async fn write_output(output: &NamedOutput, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(&output.name);
    tokio::fs::write(&path, &output.bytes).await?;
    log::info!("Wrote {} ({} bytes)", path.display(), output.bytes.len());
    Ok(path)
}
