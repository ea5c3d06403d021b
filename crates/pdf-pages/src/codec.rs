//! Document codec seam
//!
//! Everything that touches PDF bytes goes through [`DocumentCodec`]. The
//! session and controller only ever ask for "load", "copy these original
//! pages in this order", "add" and "serialize".

use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

pub trait DocumentCodec: Send + Sync + 'static {
    type Document: Send + 'static;
    type Page: Send;

    fn load_document(&self, bytes: &[u8]) -> Result<Self::Document>;

    fn page_count(&self, document: &Self::Document) -> usize;

    fn create_document(&self) -> Result<Self::Document>;

    /// Copy pages addressed by 1-based original index, in the given order.
    /// The copies are not part of `dest`'s page list until added.
    fn copy_pages(
        &self,
        dest: &mut Self::Document,
        source: &Self::Document,
        pages: &[u32],
    ) -> Result<Vec<Self::Page>>;

    fn add_page(&self, dest: &mut Self::Document, page: Self::Page) -> Result<()>;

    fn serialize(&self, document: &mut Self::Document) -> Result<Vec<u8>>;
}

/// Copy `pages` out of `source` into a fresh document and serialize it
pub fn assemble<C: DocumentCodec>(
    codec: &C,
    source: &C::Document,
    pages: &[u32],
) -> Result<Vec<u8>> {
    if pages.is_empty() {
        return Err(PagesError::EmptyPlan);
    }

    let mut dest = codec.create_document()?;
    let copied = codec.copy_pages(&mut dest, source, pages)?;
    for page in copied {
        codec.add_page(&mut dest, page)?;
    }
    codec.serialize(&mut dest)
}

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed, cyclic page trees
const MAX_TREE_DEPTH: usize = 64;

/// [`DocumentCodec`] backed by `lopdf`
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfCodec;

impl LopdfCodec {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentCodec for LopdfCodec {
    type Document = Document;
    type Page = ObjectId;

    fn load_document(&self, bytes: &[u8]) -> Result<Document> {
        Document::load_mem(bytes).map_err(|e| PagesError::LoadParse(e.to_string()))
    }

    fn page_count(&self, document: &Document) -> usize {
        document.get_pages().len()
    }

    fn create_document(&self) -> Result<Document> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(Vec::new())),
                ("Count", Object::Integer(0)),
            ])),
        );
        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        doc.trailer.set("Root", catalog_id);
        Ok(doc)
    }

    fn copy_pages(
        &self,
        dest: &mut Document,
        source: &Document,
        pages: &[u32],
    ) -> Result<Vec<ObjectId>> {
        let source_pages = source.get_pages();
        let page_count = source_pages.len();

        let mut page_ids = Vec::with_capacity(pages.len());
        for &page in pages {
            let id = source_pages
                .get(&page)
                .copied()
                .ok_or(PagesError::PageOutOfRange { page, page_count })?;
            page_ids.push(id);
        }

        let mut copier = PageCopier::new(source);
        // Reserve targets for every copied page first so that links between
        // them (annotation /P entries, for instance) resolve to the copies
        for &id in &page_ids {
            copier.reserve(id, dest);
        }

        let mut copied = Vec::with_capacity(page_ids.len());
        let mut written: HashMap<ObjectId, ObjectId> = HashMap::new();
        for &id in &page_ids {
            let new_id = match written.get(&id) {
                // Same source page requested twice: give the duplicate its own
                // page object that shares the already-copied resources
                Some(first) => {
                    let object = dest
                        .get_object(*first)
                        .map_err(|e| PagesError::Codec(e.to_string()))?
                        .clone();
                    dest.add_object(object)
                }
                None => {
                    let target = copier.reserved(id);
                    let dict = flatten_page(source, id)?;
                    let copy = copier.copy_dictionary(dest, &dict)?;
                    dest.objects.insert(target, Object::Dictionary(copy));
                    written.insert(id, target);
                    target
                }
            };
            copied.push(new_id);
        }

        log::debug!("Copied {} pages ({} objects)", copied.len(), copier.len());
        Ok(copied)
    }

    fn add_page(&self, dest: &mut Document, page: ObjectId) -> Result<()> {
        let pages_id = pages_root(dest)?;

        match dest.objects.get_mut(&page) {
            Some(Object::Dictionary(dict)) => dict.set("Parent", Object::Reference(pages_id)),
            _ => return Err(PagesError::Codec(format!("Page object {page:?} not found"))),
        }

        match dest.objects.get_mut(&pages_id) {
            Some(Object::Dictionary(pages_dict)) => {
                let mut kids = match pages_dict.get(b"Kids") {
                    Ok(Object::Array(kids)) => kids.clone(),
                    _ => Vec::new(),
                };
                kids.push(Object::Reference(page));
                let count = kids.len() as i64;
                pages_dict.set("Kids", Object::Array(kids));
                pages_dict.set("Count", Object::Integer(count));
                Ok(())
            }
            _ => Err(PagesError::Codec("Invalid pages dictionary".to_string())),
        }
    }

    fn serialize(&self, document: &mut Document) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        document
            .save_to(&mut buffer)
            .map_err(|e| PagesError::Codec(format!("Failed to save PDF: {e}")))?;
        Ok(buffer)
    }
}

/// Object id of the root `/Pages` node
pub fn pages_root(doc: &Document) -> Result<ObjectId> {
    let lookup = || -> lopdf::Result<ObjectId> {
        let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
        doc.get_dictionary(catalog_id)?.get(b"Pages")?.as_reference()
    };
    lookup().map_err(|e| PagesError::Codec(format!("Page tree not found: {e}")))
}

/// Look up `key` on a page, walking up the page tree for inherited values
pub fn inherited_attribute<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = current.get(key) {
            return Some(value);
        }
        let parent = current.get(b"Parent").ok()?.as_reference().ok()?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Page dictionary with inherited attributes made explicit and the link to
/// the source page tree removed
fn flatten_page(source: &Document, page_id: ObjectId) -> Result<Dictionary> {
    let mut dict = source
        .get_dictionary(page_id)
        .map_err(|e| PagesError::Codec(e.to_string()))?
        .clone();

    for key in INHERITABLE_KEYS {
        if !dict.has(key) {
            if let Some(value) = inherited_attribute(source, page_id, key) {
                dict.set(key.to_vec(), value.clone());
            }
        }
    }
    dict.remove(b"Parent");
    Ok(dict)
}

fn is_page_tree_node(object: &Object) -> bool {
    match object.as_dict() {
        Ok(dict) => matches!(
            dict.get(b"Type").and_then(Object::as_name),
            Ok(b"Page") | Ok(b"Pages")
        ),
        Err(_) => false,
    }
}

/// Deep copy of the objects reachable from a page, remapped into another
/// document. Shared objects (fonts, images) are copied once per copier.
struct PageCopier<'a> {
    source: &'a Document,
    remapped: HashMap<ObjectId, ObjectId>,
}

impl<'a> PageCopier<'a> {
    fn new(source: &'a Document) -> Self {
        Self {
            source,
            remapped: HashMap::new(),
        }
    }

    fn len(&self) -> usize {
        self.remapped.len()
    }

    fn reserve(&mut self, id: ObjectId, dest: &mut Document) {
        if !self.remapped.contains_key(&id) {
            let new_id = dest.new_object_id();
            self.remapped.insert(id, new_id);
        }
    }

    fn reserved(&self, id: ObjectId) -> ObjectId {
        self.remapped[&id]
    }

    fn copy_reference(&mut self, dest: &mut Document, id: ObjectId) -> Result<Object> {
        if let Some(&new_id) = self.remapped.get(&id) {
            return Ok(Object::Reference(new_id));
        }

        let source = self.source;
        let object = match source.get_object(id) {
            Ok(object) => object,
            Err(_) => return Ok(Object::Null),
        };
        // Links to pages that are not being copied would pull in the whole
        // source page tree
        if is_page_tree_node(object) {
            return Ok(Object::Null);
        }

        let new_id = dest.new_object_id();
        self.remapped.insert(id, new_id);
        let copy = self.copy_object(dest, object)?;
        dest.objects.insert(new_id, copy);
        Ok(Object::Reference(new_id))
    }

    fn copy_object(&mut self, dest: &mut Document, object: &Object) -> Result<Object> {
        Ok(match object {
            Object::Reference(id) => self.copy_reference(dest, *id)?,
            Object::Array(items) => Object::Array(
                items
                    .iter()
                    .map(|item| self.copy_object(dest, item))
                    .collect::<Result<Vec<_>>>()?,
            ),
            Object::Dictionary(dict) => Object::Dictionary(self.copy_dictionary(dest, dict)?),
            Object::Stream(stream) => {
                let mut copy = stream.clone();
                copy.dict = self.copy_dictionary(dest, &stream.dict)?;
                Object::Stream(copy)
            }
            other => other.clone(),
        })
    }

    fn copy_dictionary(&mut self, dest: &mut Document, dict: &Dictionary) -> Result<Dictionary> {
        let mut copy = Dictionary::new();
        for (key, value) in dict.iter() {
            copy.set(key.clone(), self.copy_object(dest, value)?);
        }
        Ok(copy)
    }
}
