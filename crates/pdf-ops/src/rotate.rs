use crate::document::{load, save};
use crate::types::*;
use lopdf::{Document, Object};
use pdf_pages::codec::inherited_attribute;
use pdf_pages::{PagesError, Progress, ProgressSink, SharedProgress, output_file_name};

/// Turn one page (1-based) by a multiple of 90 degrees, clockwise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageRotation {
    pub page: u32,
    pub degrees: i32,
}

/// Add each rotation to the page's current rotation
pub async fn rotate(
    source: SourceFile,
    rotations: Vec<PageRotation>,
    progress: SharedProgress,
) -> Result<NamedOutput> {
    tokio::task::spawn_blocking(move || {
        let mut doc = load(&source.bytes)?;
        apply_rotations(&mut doc, &rotations, progress.as_ref())?;
        let bytes = save(&mut doc)?;
        Ok::<_, OpsError>(NamedOutput::new(
            output_file_name(&source.name, "_rotated"),
            bytes,
        ))
    })
    .await?
}

/// Rotate every page by the same amount
pub async fn rotate_all(
    source: SourceFile,
    degrees: i32,
    progress: SharedProgress,
) -> Result<NamedOutput> {
    let page_count = {
        let bytes = source.bytes.clone();
        tokio::task::spawn_blocking(move || load(&bytes).map(|doc| doc.get_pages().len()))
            .await??
    };
    let rotations = (1..=page_count as u32)
        .map(|page| PageRotation { page, degrees })
        .collect();
    rotate(source, rotations, progress).await
}

fn apply_rotations(
    doc: &mut Document,
    rotations: &[PageRotation],
    progress: &dyn ProgressSink,
) -> Result<()> {
    let pages = doc.get_pages();
    let page_count = pages.len();
    let total = rotations.len();

    for (i, rotation) in rotations.iter().enumerate() {
        progress.report(Progress::new(
            i + 1,
            total,
            format!("Rotating page {} of {total}...", i + 1),
        ));
        if rotation.degrees % 90 != 0 {
            return Err(OpsError::Config(format!(
                "Rotation must be a multiple of 90 degrees, got {}",
                rotation.degrees
            )));
        }
        let page_id = *pages
            .get(&rotation.page)
            .ok_or(PagesError::PageOutOfRange {
                page: rotation.page,
                page_count,
            })?;

        let current = inherited_attribute(doc, page_id, b"Rotate")
            .and_then(|obj| obj.as_i64().ok())
            .unwrap_or(0);
        let angle = (current + rotation.degrees as i64).rem_euclid(360);
        doc.get_dictionary_mut(page_id)?
            .set("Rotate", Object::Integer(angle));
    }

    log::info!("Applied {} page rotations", rotations.len());
    Ok(())
}
