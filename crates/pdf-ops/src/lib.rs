mod archive;
mod compress;
pub mod constants;
mod document;
mod images;
mod info;
mod io;
mod options;
mod pages;
mod rotate;
mod types;
mod watermark;

pub use archive::zip_outputs;
pub use compress::{CompressedOutput, CompressionReport, compress};
pub use images::{encode_page, images_to_pdf, pdf_to_images};
pub use info::{document_info, format_file_size};
pub use io::{read_source, read_sources, write_output};
pub use options::*;
pub use pages::{extract_pages, merge, remove_pages, split_pages, split_ranges};
pub use rotate::{PageRotation, rotate, rotate_all};
pub use types::*;
pub use watermark::{add_watermark, helvetica_text_width};

pub use pdf_pages::{base_name, output_file_name};
