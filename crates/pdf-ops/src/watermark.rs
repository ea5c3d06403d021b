//! Text watermark stamped across the middle of every page

use crate::constants::{HELVETICA_FALLBACK_WIDTH, HELVETICA_WIDTHS};
use crate::document::{load, page_dimensions, resolve_dictionary, save};
use crate::options::WatermarkOptions;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_pages::codec::inherited_attribute;
use pdf_pages::{Progress, SharedProgress, output_file_name};

const FONT_RESOURCE: &str = "WmF1";
const STATE_RESOURCE: &str = "WmGS1";

pub async fn add_watermark(
    source: SourceFile,
    text: String,
    options: WatermarkOptions,
    progress: SharedProgress,
) -> Result<NamedOutput> {
    options.validate()?;
    if text.trim().is_empty() {
        return Err(OpsError::Config("Watermark text is empty".to_string()));
    }

    tokio::task::spawn_blocking(move || {
        let mut doc = load(&source.bytes)?;
        stamp_document(&mut doc, &text, &options, progress)?;
        let bytes = save(&mut doc)?;
        Ok::<_, OpsError>(NamedOutput::new(
            output_file_name(&source.name, "_watermarked"),
            bytes,
        ))
    })
    .await?
}

fn stamp_document(
    doc: &mut Document,
    text: &str,
    options: &WatermarkOptions,
    progress: SharedProgress,
) -> Result<()> {
    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ]));
    let state_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"ExtGState".to_vec())),
        ("ca", Object::Real(options.opacity)),
        ("CA", Object::Real(options.opacity)),
    ]));

    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    let total = page_ids.len();
    for (i, page_id) in page_ids.into_iter().enumerate() {
        progress.report(Progress::new(
            i + 1,
            total,
            format!("Adding watermark to page {}...", i + 1),
        ));
        let (width, height) = page_dimensions(doc, page_id);
        let ops = watermark_operations(text, options, width, height);
        add_resources(doc, page_id, font_id, state_id)?;
        append_content(doc, page_id, ops.into_bytes())?;
    }

    log::info!("Watermarked {total} pages");
    Ok(())
}

/// Text width in points for Helvetica at `font_size`
pub fn helvetica_text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .map(|c| match c as u32 {
            code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize] as u32,
            _ => HELVETICA_FALLBACK_WIDTH as u32,
        })
        .sum();
    units as f32 * font_size / 1000.0
}

/// PDF literal string body; characters outside printable ASCII become `?`
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            ' '..='~' => escaped.push(c),
            _ => escaped.push('?'),
        }
    }
    escaped
}

fn watermark_operations(text: &str, options: &WatermarkOptions, width: f32, height: f32) -> String {
    let text_width = helvetica_text_width(text, options.font_size);
    let x = (width - text_width) / 2.0;
    let y = height / 2.0;
    let (sin, cos) = options.rotation.to_radians().sin_cos();
    let color = options.color;

    format!(
        "q /{STATE_RESOURCE} gs {} {} {} rg BT /{FONT_RESOURCE} {} Tf {cos:.5} {sin:.5} {:.5} {cos:.5} {x:.3} {y:.3} Tm ({}) Tj ET Q\n",
        color.r,
        color.g,
        color.b,
        options.font_size,
        -sin,
        escape_text(text),
    )
}

/// Give the page its own Resources with the watermark font and graphics
/// state registered, keeping whatever it had or inherited
fn add_resources(
    doc: &mut Document,
    page_id: ObjectId,
    font_id: ObjectId,
    state_id: ObjectId,
) -> Result<()> {
    let mut resources = resolve_dictionary(doc, inherited_attribute(doc, page_id, b"Resources"));

    let mut fonts = resolve_dictionary(doc, resources.get(b"Font").ok());
    fonts.set(FONT_RESOURCE, Object::Reference(font_id));
    resources.set("Font", Object::Dictionary(fonts));

    let mut states = resolve_dictionary(doc, resources.get(b"ExtGState").ok());
    states.set(STATE_RESOURCE, Object::Reference(state_id));
    resources.set("ExtGState", Object::Dictionary(states));

    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Draw `ops` over the existing content. The old content is wrapped in
/// q/Q so its graphics state cannot leak into the watermark.
fn append_content(doc: &mut Document, page_id: ObjectId, ops: Vec<u8>) -> Result<()> {
    let existing: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(obj @ Object::Reference(_)) => vec![obj.clone()],
        _ => Vec::new(),
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    if !existing.is_empty() {
        let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        contents.push(Object::Reference(open_id));
        contents.extend(existing);
    }
    let mut stamp = Vec::with_capacity(ops.len() + 2);
    if !contents.is_empty() {
        stamp.extend_from_slice(b"Q\n");
    }
    stamp.extend(ops);
    let stamp_id = doc.add_object(Stream::new(Dictionary::new(), stamp));
    contents.push(Object::Reference(stamp_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}
