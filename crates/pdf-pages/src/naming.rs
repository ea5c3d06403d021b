//! Output file naming

/// File name without its final extension. Names without a dot are returned
/// whole; a leading dot (hidden files) is not treated as an extension.
pub fn base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(dot) => &file_name[..dot],
    }
}

/// `report.pdf` + `_extracted` -> `report_extracted.pdf`
pub fn output_file_name(input: &str, suffix: &str) -> String {
    format!("{}{}.pdf", base_name(input), suffix)
}
