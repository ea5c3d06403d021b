//! Shared constants for the page tools

/// Default page width in points (US Letter: 8.5" × 11")
pub const DEFAULT_PAGE_WIDTH_PT: f32 = 612.0;

/// Default page height in points (US Letter)
pub const DEFAULT_PAGE_HEIGHT_PT: f32 = 792.0;

pub const DEFAULT_PAGE_DIMENSIONS: (f32, f32) = (DEFAULT_PAGE_WIDTH_PT, DEFAULT_PAGE_HEIGHT_PT);

/// JPEG quality used when exporting pages as images
pub const JPEG_QUALITY: u8 = 92;

/// Render scale used when exporting pages as images
pub const DEFAULT_EXPORT_SCALE: f32 = 1.5;

pub const MERGED_FILE_NAME: &str = "merged.pdf";
pub const IMAGES_FILE_NAME: &str = "images.pdf";
pub const SPLIT_ARCHIVE_NAME: &str = "split-pages.zip";

/// Helvetica advance widths (1/1000 em) for WinAnsi codes 32..=126
pub const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Width of `?`, used for characters Helvetica cannot show
pub const HELVETICA_FALLBACK_WIDTH: u16 = 556;
