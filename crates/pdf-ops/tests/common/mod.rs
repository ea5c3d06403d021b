#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, Stream};
use pdf_ops::SourceFile;
use pdf_pages::{Progress, SharedProgress};
use std::sync::{Arc, Mutex};

/// Sink that keeps every tick for later assertions
pub fn recording_progress() -> (Arc<Mutex<Vec<Progress>>>, SharedProgress) {
    let ticks = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let ticks = Arc::clone(&ticks);
        move |progress: Progress| ticks.lock().unwrap().push(progress)
    };
    (ticks, Arc::new(sink))
}

/// PDF with `num_pages` Letter pages whose content reads `(label N)`
pub fn create_test_pdf(num_pages: usize, label: &str) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for n in 1..=num_pages {
        let content = format!("BT /F1 24 Tf 72 720 Td ({label} {n}) Tj ET");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(num_pages as i64)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);
    doc
}

pub fn test_source(name: &str, num_pages: usize, label: &str) -> SourceFile {
    let mut doc = create_test_pdf(num_pages, label);
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    SourceFile::new(name, bytes)
}

/// `label N` strings of every page, in page order
pub fn page_labels(bytes: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc.get_page_content(page_id).unwrap();
            let text = String::from_utf8_lossy(&content).into_owned();
            let start = text.find('(').unwrap() + 1;
            let end = text.find(')').unwrap();
            text[start..end].to_string()
        })
        .collect()
}
