#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use lopdf::{Dictionary, Document, Object, Stream};
use pdf_async_runtime::{PdfCommand, PdfUpdate, worker_task};
use pdf_pages::NoThumbnails;
use tokio::sync::mpsc;

/// Write a PDF with `num_pages` pages reading `(page N)` into `dir`
pub fn write_test_pdf(dir: &Path, name: &str, num_pages: usize) -> PathBuf {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

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

    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
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
            ("Resources", Object::Dictionary(Dictionary::new())),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let path = dir.join(name);
    doc.save(&path).unwrap();
    path
}

/// Page numbers read back from the `(page N)` markers of a saved file
pub fn page_markers(path: &Path) -> Vec<u32> {
    let doc = Document::load(path).unwrap();
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let content = doc.get_page_content(page_id).unwrap();
            let text = String::from_utf8_lossy(&content).into_owned();
            let start = text.find("(page ").unwrap() + "(page ".len();
            let end = text[start..].find(')').unwrap() + start;
            text[start..end].parse().unwrap()
        })
        .collect()
}

pub struct Harness {
    pub command_tx: mpsc::UnboundedSender<PdfCommand>,
    pub update_rx: mpsc::UnboundedReceiver<PdfUpdate>,
}

impl Harness {
    /// Spawn a worker without a page renderer
    pub fn spawn() -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        tokio::spawn(worker_task(command_rx, update_tx, Arc::new(NoThumbnails)));
        Self {
            command_tx,
            update_rx,
        }
    }

    pub fn send(&self, command: PdfCommand) {
        self.command_tx.send(command).unwrap();
    }

    /// Next update that is not a progress tick
    pub async fn next(&mut self) -> PdfUpdate {
        loop {
            let update = tokio::time::timeout(Duration::from_secs(10), self.update_rx.recv())
                .await
                .expect("worker timed out")
                .expect("worker stopped");
            if !matches!(update, PdfUpdate::Progress { .. }) {
                return update;
            }
        }
    }

    /// Close the command channel and collect everything the worker still sends
    pub async fn finish(mut self) -> Vec<PdfUpdate> {
        drop(self.command_tx);
        let mut rest = Vec::new();
        while let Some(update) = self.update_rx.recv().await {
            rest.push(update);
        }
        rest
    }
}
