//! Conversions between images and PDF pages

use std::io::Cursor;
use std::sync::Arc;

use crate::constants::{IMAGES_FILE_NAME, JPEG_QUALITY};
use crate::document::save;
use crate::options::{ImageExportOptions, ImageFormat};
use crate::types::*;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_pages::{Progress, SharedProgress, Thumbnail, ThumbnailProvider, base_name};

/// One page per image, each page exactly the size of its image
pub async fn images_to_pdf(images: Vec<SourceFile>, progress: SharedProgress) -> Result<NamedOutput> {
    tokio::task::spawn_blocking(move || images_to_pdf_sync(&images, progress)).await?
}

fn images_to_pdf_sync(images: &[SourceFile], progress: SharedProgress) -> Result<NamedOutput> {
    if images.is_empty() {
        return Err(OpsError::Config("No images selected".to_string()));
    }

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let mut kids = Vec::with_capacity(images.len());

    for (i, source) in images.iter().enumerate() {
        progress.report(Progress::new(
            i + 1,
            images.len(),
            format!("Adding {}...", source.name),
        ));
        let embedded = embed_image(&mut doc, &source.bytes)?;
        kids.push(Object::Reference(add_image_page(&mut doc, pages_id, &embedded)));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(kids.len() as i64)),
            ("Kids", Object::Array(kids)),
        ])),
    );
    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    let bytes = save(&mut doc)?;
    log::info!("Created PDF from {} images", images.len());
    Ok(NamedOutput::new(IMAGES_FILE_NAME, bytes))
}

struct EmbeddedImage {
    id: ObjectId,
    width: u32,
    height: u32,
}

/// JPEG data is embedded untouched; anything else is decoded and stored as
/// deflated RGB with a soft mask when it has transparency
fn embed_image(doc: &mut Document, bytes: &[u8]) -> Result<EmbeddedImage> {
    let format = image::guess_format(bytes)?;
    if format == image::ImageFormat::Jpeg {
        if let Some(header) = jpeg_header(bytes) {
            return Ok(embed_jpeg(doc, bytes, header));
        }
        log::debug!("No frame header found in JPEG, re-encoding it");
    }

    let decoded = image::load_from_memory_with_format(bytes, format)?;
    let (width, height) = (decoded.width(), decoded.height());
    let pixels = width as usize * height as usize;

    let rgba = decoded.to_rgba8();
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::with_capacity(pixels);
    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel.0[3]);
    }

    let mut dict = image_dictionary(width, height, b"DeviceRGB");
    if alpha.iter().any(|&a| a != u8::MAX) {
        let mask = image_dictionary(width, height, b"DeviceGray");
        let mask_id = doc.add_object(deflated(mask, alpha)?);
        dict.set("SMask", Object::Reference(mask_id));
    }

    Ok(EmbeddedImage {
        id: doc.add_object(deflated(dict, rgb)?),
        width,
        height,
    })
}

fn embed_jpeg(doc: &mut Document, bytes: &[u8], header: JpegHeader) -> EmbeddedImage {
    let color_space: &[u8] = match header.components {
        1 => b"DeviceGray",
        4 => b"DeviceCMYK",
        _ => b"DeviceRGB",
    };
    let mut dict = image_dictionary(header.width, header.height, color_space);
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    // Adobe writes CMYK JPEGs with inverted components
    if header.components == 4 && header.adobe {
        dict.set(
            "Decode",
            Object::Array([1, 0, 1, 0, 1, 0, 1, 0].map(Object::Integer).to_vec()),
        );
    }

    let stream = Stream::new(dict, bytes.to_vec()).with_compression(false);
    EmbeddedImage {
        id: doc.add_object(stream),
        width: header.width,
        height: header.height,
    }
}

fn image_dictionary(width: u32, height: u32, color_space: &[u8]) -> Dictionary {
    Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(width as i64)),
        ("Height", Object::Integer(height as i64)),
        ("BitsPerComponent", Object::Integer(8)),
        ("ColorSpace", Object::Name(color_space.to_vec())),
    ])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegHeader {
    width: u32,
    height: u32,
    components: u8,
    adobe: bool,
}

/// Walk the marker segments up to the first frame header
fn jpeg_header(bytes: &[u8]) -> Option<JpegHeader> {
    let mut pos = 2;
    let mut adobe = false;

    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        let len = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let segment = bytes.get(pos + 4..pos + 2 + len)?;

        match marker {
            0xEE if segment.starts_with(b"Adobe") => adobe = true,
            // SOF0..SOF15, skipping DHT, JPG and DAC
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                let [_, h0, h1, w0, w1, components, ..] = *segment else {
                    return None;
                };
                return Some(JpegHeader {
                    width: u16::from_be_bytes([w0, w1]) as u32,
                    height: u16::from_be_bytes([h0, h1]) as u32,
                    components,
                    adobe,
                });
            }
            0xD9 | 0xDA => return None,
            _ => {}
        }
        pos += 2 + len;
    }
    None
}

fn deflated(dict: Dictionary, content: Vec<u8>) -> Result<Stream> {
    let mut stream = Stream::new(dict, content);
    stream.compress()?;
    Ok(stream)
}

fn add_image_page(doc: &mut Document, pages_id: ObjectId, image: &EmbeddedImage) -> ObjectId {
    let (w, h) = (image.width, image.height);
    let content = format!("q {w} 0 0 {h} 0 0 cm /Im0 Do Q\n");
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    let resources = Dictionary::from_iter(vec![(
        "XObject",
        Object::Dictionary(Dictionary::from_iter(vec![(
            "Im0",
            Object::Reference(image.id),
        )])),
    )]);

    doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(w as i64),
                Object::Integer(h as i64),
            ]),
        ),
        ("Resources", Object::Dictionary(resources)),
        ("Contents", Object::Reference(content_id)),
    ]))
}

/// Rasterize every page and encode it as `{base}_page_{n}.{ext}`
pub async fn pdf_to_images(
    provider: Arc<dyn ThumbnailProvider>,
    source: SourceFile,
    options: ImageExportOptions,
    progress: SharedProgress,
) -> Result<Vec<NamedOutput>> {
    options.validate()?;
    tokio::task::spawn_blocking(move || {
        let pages = provider.render(&source.bytes, options.scale, progress.as_ref())?;
        let base = base_name(&source.name);
        pages
            .into_iter()
            .enumerate()
            .map(|(i, page)| {
                let bytes = encode_page(page, options.format)?;
                Ok(NamedOutput::new(
                    format!("{base}_page_{}.{}", i + 1, options.format.extension()),
                    bytes,
                ))
            })
            .collect::<Result<Vec<_>>>()
    })
    .await?
}

pub fn encode_page(page: Thumbnail, format: ImageFormat) -> Result<Vec<u8>> {
    let (width, height) = (page.width as u32, page.height as u32);
    let rgba = RgbaImage::from_raw(width, height, page.rgba).ok_or_else(|| {
        OpsError::Config(format!("Rendered page buffer does not match {width}x{height}"))
    })?;

    let mut buffer = Vec::new();
    match format {
        ImageFormat::Png => {
            DynamicImage::ImageRgba8(rgba)
                .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)?;
        }
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();
            JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY).encode_image(&rgb)?;
        }
    }
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Frame header only: SOI, optional APP14, SOF0 with `components`, EOI
    fn jpeg_frame(width: u16, height: u16, components: u8, adobe: bool) -> Vec<u8> {
        let mut bytes = vec![0xFF, 0xD8];
        if adobe {
            bytes.extend_from_slice(&[0xFF, 0xEE, 0x00, 0x0E]);
            bytes.extend_from_slice(b"Adobe");
            bytes.extend_from_slice(&[0x00, 0x64, 0x00, 0x00, 0x00, 0x00, 0x02]);
        }
        let len = 8 + 3 * components as u16;
        bytes.extend_from_slice(&[0xFF, 0xC0]);
        bytes.extend_from_slice(&len.to_be_bytes());
        bytes.push(8);
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.push(components);
        for id in 1..=components {
            bytes.extend_from_slice(&[id, 0x11, 0x00]);
        }
        bytes.extend_from_slice(&[0xFF, 0xD9]);
        bytes
    }

    #[test]
    fn test_jpeg_header_reads_frame() {
        assert_eq!(
            jpeg_header(&jpeg_frame(640, 480, 3, false)),
            Some(JpegHeader {
                width: 640,
                height: 480,
                components: 3,
                adobe: false,
            })
        );
        assert!(jpeg_header(&[0xFF, 0xD8, 0xFF, 0xD9]).is_none());
        assert!(jpeg_header(&[0xFF, 0xD8, 0xFF, 0xC0, 0x00]).is_none());
    }

    #[test]
    fn test_cmyk_jpeg_keeps_its_color_space() {
        let mut doc = Document::with_version("1.7");
        let embedded = embed_image(&mut doc, &jpeg_frame(30, 20, 4, true)).unwrap();
        assert_eq!((embedded.width, embedded.height), (30, 20));

        let stream = doc.get_object(embedded.id).unwrap().as_stream().unwrap();
        assert_eq!(
            stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceCMYK"
        );
        assert_eq!(
            stream.dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"DCTDecode"
        );
        assert_eq!(stream.dict.get(b"Decode").unwrap().as_array().unwrap().len(), 8);
    }

    #[test]
    fn test_gray_jpeg_has_no_decode_array() {
        let mut doc = Document::with_version("1.7");
        let embedded = embed_image(&mut doc, &jpeg_frame(8, 8, 1, false)).unwrap();
        let stream = doc.get_object(embedded.id).unwrap().as_stream().unwrap();
        assert_eq!(
            stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap(),
            b"DeviceGray"
        );
        assert!(stream.dict.get(b"Decode").is_err());
    }

    #[test]
    fn test_encode_rejects_short_buffer() {
        let page = Thumbnail {
            width: 4,
            height: 4,
            rgba: vec![0; 8],
        };
        assert!(matches!(
            encode_page(page, ImageFormat::Png),
            Err(OpsError::Config(_))
        ));
    }

    #[test]
    fn test_encode_png_and_jpeg() {
        let page = Thumbnail {
            width: 2,
            height: 2,
            rgba: vec![255; 16],
        };
        let png = encode_page(page.clone(), ImageFormat::Png).unwrap();
        assert_eq!(image::guess_format(&png).unwrap(), image::ImageFormat::Png);
        let jpeg = encode_page(page, ImageFormat::Jpeg).unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), image::ImageFormat::Jpeg);
    }
}
