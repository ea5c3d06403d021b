use std::io::{Cursor, Write};

use crate::types::*;
use pdf_pages::{Progress, SharedProgress};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Package several outputs into one zip archive named `archive_name`
pub async fn zip_outputs(
    files: Vec<NamedOutput>,
    archive_name: String,
    progress: SharedProgress,
) -> Result<NamedOutput> {
    tokio::task::spawn_blocking(move || {
        let bytes = zip_sync(&files, progress)?;
        Ok::<_, OpsError>(NamedOutput::new(archive_name, bytes))
    })
    .await?
}

fn zip_sync(files: &[NamedOutput], progress: SharedProgress) -> Result<Vec<u8>> {
    if files.is_empty() {
        return Err(OpsError::Config("Nothing to archive".to_string()));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (i, file) in files.iter().enumerate() {
        progress.report(Progress::new(
            i + 1,
            files.len(),
            format!("Adding {} to archive...", file.name),
        ));
        zip.start_file(file.name.as_str(), options)?;
        zip.write_all(&file.bytes)?;
    }

    let cursor = zip.finish()?;
    log::debug!("Archived {} files", files.len());
    Ok(cursor.into_inner())
}
