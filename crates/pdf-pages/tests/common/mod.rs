#![allow(dead_code)]

use lopdf::{Dictionary, Document, Object, Stream};
use pdf_pages::*;
use std::sync::{Arc, Mutex};

/// PDF with `num_pages` pages whose content streams read `(page N)`
pub fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));
    let resources_id = doc.add_object(Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![(
            "F1",
            Object::Reference(font_id),
        )])),
    )]));

    let mut kids = Vec::new();
    for n in 1..=num_pages {
        let content = format!("BT /F1 24 Tf 72 720 Td (page {n}) Tj ET");
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    // MediaBox and Resources live on the tree root so copies must inherit them
    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(612),
                Object::Integer(792),
            ]),
        ),
        ("Resources", Object::Reference(resources_id)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

pub fn create_test_pdf_bytes(num_pages: usize) -> Vec<u8> {
    let mut doc = create_test_pdf(num_pages);
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

/// The `N` of `(page N)` for every page of `bytes`, in page order
pub fn page_markers(bytes: &[u8]) -> Vec<u32> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc.get_page_content(page_id).unwrap();
            let text = String::from_utf8_lossy(&content);
            let start = text.find("(page ").unwrap() + "(page ".len();
            let end = start + text[start..].find(')').unwrap();
            text[start..end].parse().unwrap()
        })
        .collect()
}

pub struct StubDocument {
    pub pages: Vec<u32>,
}

/// Codec over `stub:N` byte strings that records every call
#[derive(Clone, Default)]
pub struct RecordingCodec {
    pub calls: Arc<Mutex<Vec<&'static str>>>,
}

impl RecordingCodec {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

pub fn stub_bytes(num_pages: usize) -> Vec<u8> {
    format!("stub:{num_pages}").into_bytes()
}

impl DocumentCodec for RecordingCodec {
    type Document = StubDocument;
    type Page = u32;

    fn load_document(&self, bytes: &[u8]) -> Result<StubDocument> {
        self.record("load");
        let pages = std::str::from_utf8(bytes)
            .ok()
            .and_then(|text| text.strip_prefix("stub:"))
            .and_then(|n| n.parse::<u32>().ok())
            .ok_or_else(|| PagesError::LoadParse("not a stub document".to_string()))?;
        Ok(StubDocument {
            pages: (1..=pages).collect(),
        })
    }

    fn page_count(&self, document: &StubDocument) -> usize {
        document.pages.len()
    }

    fn create_document(&self) -> Result<StubDocument> {
        self.record("create");
        Ok(StubDocument { pages: Vec::new() })
    }

    fn copy_pages(
        &self,
        _dest: &mut StubDocument,
        source: &StubDocument,
        pages: &[u32],
    ) -> Result<Vec<u32>> {
        self.record("copy");
        pages
            .iter()
            .map(|&page| {
                source
                    .pages
                    .get(page as usize - 1)
                    .copied()
                    .ok_or(PagesError::PageOutOfRange {
                        page,
                        page_count: source.pages.len(),
                    })
            })
            .collect()
    }

    fn add_page(&self, dest: &mut StubDocument, page: u32) -> Result<()> {
        self.record("add");
        dest.pages.push(page);
        Ok(())
    }

    fn serialize(&self, document: &mut StubDocument) -> Result<Vec<u8>> {
        self.record("serialize");
        let pages: Vec<String> = document.pages.iter().map(|p| p.to_string()).collect();
        Ok(pages.join(",").into_bytes())
    }
}

/// Provider that returns a 1x1 image per page whose red channel is the page number
#[derive(Default)]
pub struct NumberedThumbnails;

impl ThumbnailProvider for NumberedThumbnails {
    fn render(
        &self,
        bytes: &[u8],
        _scale: f32,
        progress: &dyn ProgressSink,
    ) -> Result<Vec<Thumbnail>> {
        let count = std::str::from_utf8(bytes)
            .ok()
            .and_then(|text| text.strip_prefix("stub:"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        Ok((1..=count)
            .map(|n| {
                progress.report(Progress::new(n, count, format!("Rendering page {n}...")));
                Thumbnail {
                    width: 1,
                    height: 1,
                    rgba: vec![n as u8, 0, 0, 255],
                }
            })
            .collect())
    }
}

pub fn recording_progress() -> (Arc<Mutex<Vec<Progress>>>, SharedProgress) {
    let ticks = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let ticks = Arc::clone(&ticks);
        move |progress: Progress| ticks.lock().unwrap().push(progress)
    };
    (ticks, Arc::new(sink))
}
