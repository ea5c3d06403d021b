use crate::document::{load, resolve};
use crate::types::*;
use lopdf::{Document, Object};

/// Page count, version and document information entries
pub async fn document_info(source: &SourceFile) -> Result<PdfInfo> {
    let name = source.name.clone();
    let bytes = source.bytes.clone();
    tokio::task::spawn_blocking(move || {
        let doc = load(&bytes)?;
        Ok::<_, OpsError>(PdfInfo {
            name,
            page_count: doc.get_pages().len(),
            size: bytes.len(),
            version: doc.version.clone(),
            title: info_entry(&doc, b"Title"),
            author: info_entry(&doc, b"Author"),
            producer: info_entry(&doc, b"Producer"),
            encrypted: doc.trailer.has(b"Encrypt"),
        })
    })
    .await?
}

fn info_entry(doc: &Document, key: &[u8]) -> Option<String> {
    let info = doc.trailer.get(b"Info").ok()?;
    let info = resolve(doc, info).as_dict().ok()?;
    match resolve(doc, info.get(key).ok()?) {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        _ => None,
    }
}

/// PDF text strings are either UTF-16BE with a BOM or single-byte
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Human readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, `2.25 MB`
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut exponent = 0;
    while value >= 1024.0 && exponent < UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    // Trailing zeros are dropped: 1.50 -> 1.5, 2.00 -> 2
    format!("{} {}", rounded, UNITS[exponent])
}
