//! lopdf helpers shared by the tools that edit pages in place

use crate::constants::DEFAULT_PAGE_DIMENSIONS;
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use pdf_pages::PagesError;
use pdf_pages::codec::inherited_attribute;

pub(crate) fn load(bytes: &[u8]) -> Result<Document> {
    Document::load_mem(bytes).map_err(|e| PagesError::LoadParse(e.to_string()).into())
}

pub(crate) fn save(doc: &mut Document) -> Result<Vec<u8>> {
    let mut writer = Vec::new();
    doc.save_to(&mut writer)?;
    Ok(writer)
}

/// Page size in points, from the (possibly inherited) MediaBox
pub(crate) fn page_dimensions(doc: &Document, page_id: ObjectId) -> (f32, f32) {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| resolve(doc, obj).as_array().ok());

    match media_box {
        Some(mb) if mb.len() == 4 => {
            let coords: Vec<Option<f32>> = mb.iter().map(|o| extract_number(resolve(doc, o))).collect();
            match (coords[0], coords[1], coords[2], coords[3]) {
                (Some(x0), Some(y0), Some(x1), Some(y1)) => ((x1 - x0).abs(), (y1 - y0).abs()),
                _ => DEFAULT_PAGE_DIMENSIONS,
            }
        }
        _ => DEFAULT_PAGE_DIMENSIONS,
    }
}

/// Follow a reference one level; anything else is returned as-is
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        _ => obj,
    }
}

/// Owned copy of a dictionary that may be stored inline or by reference
pub(crate) fn resolve_dictionary(doc: &Document, obj: Option<&Object>) -> Dictionary {
    obj.map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .cloned()
        .unwrap_or_default()
}

pub(crate) fn extract_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
