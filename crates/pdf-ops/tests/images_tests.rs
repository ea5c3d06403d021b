mod common;

use common::*;
use image::{ImageFormat as RasterFormat, Rgba, RgbaImage};
use lopdf::Document;
use pdf_ops::*;
use pdf_pages::{PagesError, Progress, ProgressSink, Thumbnail, ThumbnailProvider, no_progress};
use std::io::{Cursor, Read};
use std::sync::Arc;

fn png_bytes(width: u32, height: u32, alpha: u8) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([200, 10, 10, alpha]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), RasterFormat::Png)
        .unwrap();
    buffer
}

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([10, 200, 10]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), RasterFormat::Jpeg)
        .unwrap();
    buffer
}

/// Renders solid pages without needing a real rasterizer
struct SolidPages(usize);

impl ThumbnailProvider for SolidPages {
    fn render(
        &self,
        _bytes: &[u8],
        scale: f32,
        progress: &dyn ProgressSink,
    ) -> pdf_pages::Result<Vec<Thumbnail>> {
        let side = (10.0 * scale) as usize;
        Ok((1..=self.0)
            .map(|n| {
                progress.report(Progress::new(n, self.0, format!("Converting page {n}...")));
                Thumbnail {
                    width: side,
                    height: side,
                    rgba: vec![128; side * side * 4],
                }
            })
            .collect())
    }
}

struct BrokenRenderer;

impl ThumbnailProvider for BrokenRenderer {
    fn render(
        &self,
        _bytes: &[u8],
        _scale: f32,
        _progress: &dyn ProgressSink,
    ) -> pdf_pages::Result<Vec<Thumbnail>> {
        Err(PagesError::Thumbnail("no renderer".to_string()))
    }
}

#[tokio::test]
async fn test_images_become_pages_of_their_size() {
    let images = vec![
        SourceFile::new("photo.jpg", jpeg_bytes(40, 30)),
        SourceFile::new("logo.png", png_bytes(20, 50, 128)),
        SourceFile::new("flat.png", png_bytes(8, 8, 255)),
    ];

    let output = images_to_pdf(images, no_progress()).await.unwrap();
    assert_eq!(output.name, "images.pdf");

    let doc = Document::load_mem(&output.bytes).unwrap();
    let sizes: Vec<(i64, i64)> = doc
        .get_pages()
        .values()
        .map(|&id| {
            let media_box = doc
                .get_dictionary(id)
                .unwrap()
                .get(b"MediaBox")
                .unwrap()
                .as_array()
                .unwrap();
            (
                media_box[2].as_i64().unwrap(),
                media_box[3].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(sizes, vec![(40, 30), (20, 50), (8, 8)]);
}

#[tokio::test]
async fn test_images_to_pdf_rejects_non_images() {
    let err = images_to_pdf(
        vec![SourceFile::new("notes.txt", b"plain text".to_vec())],
        no_progress(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OpsError::Image(_)));

    let err = images_to_pdf(Vec::new(), no_progress()).await.unwrap_err();
    assert!(matches!(err, OpsError::Config(_)));
}

#[tokio::test]
async fn test_pdf_to_images_names_and_formats() {
    let source = test_source("slides.pdf", 2, "x");
    let options = ImageExportOptions {
        format: ImageFormat::Jpeg,
        scale: 2.0,
    };

    let images = pdf_to_images(Arc::new(SolidPages(2)), source, options, no_progress())
        .await
        .unwrap();

    assert_eq!(images.len(), 2);
    assert_eq!(images[1].name, "slides_page_2.jpeg");
    let decoded = image::load_from_memory(&images[0].bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (20, 20));
}

#[tokio::test]
async fn test_pdf_to_images_surfaces_render_failure() {
    let err = pdf_to_images(
        Arc::new(BrokenRenderer),
        test_source("slides.pdf", 1, "x"),
        ImageExportOptions::default(),
        no_progress(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, OpsError::Pages(PagesError::Thumbnail(_))));
}

#[tokio::test]
async fn test_zip_outputs_contains_every_file() {
    let files = vec![
        NamedOutput::new("a_page_1.pdf", b"one".to_vec()),
        NamedOutput::new("a_page_2.pdf", b"two".to_vec()),
    ];

    let archive = zip_outputs(files, "split-pages.zip".to_string(), no_progress())
        .await
        .unwrap();
    assert_eq!(archive.name, "split-pages.zip");

    let mut zip = zip::ZipArchive::new(Cursor::new(archive.bytes)).unwrap();
    assert_eq!(zip.len(), 2);
    let mut contents = String::new();
    zip.by_name("a_page_2.pdf")
        .unwrap()
        .read_to_string(&mut contents)
        .unwrap();
    assert_eq!(contents, "two");
}
