mod common;

use common::*;
use lopdf::{Document, Object};
use pdf_pages::codec::{inherited_attribute, pages_root};
use pdf_pages::*;

#[test]
fn test_load_rejects_garbage() {
    let codec = LopdfCodec::new();
    assert!(matches!(
        codec.load_document(b"not a pdf"),
        Err(PagesError::LoadParse(_))
    ));
}

#[test]
fn test_assemble_materializes_inherited_attributes() {
    let codec = LopdfCodec::new();
    let source = create_test_pdf(3);
    let bytes = assemble(&codec, &source, &[2]).unwrap();

    let output = Document::load_mem(&bytes).unwrap();
    let pages = output.get_pages();
    assert_eq!(pages.len(), 1);

    let page = output.get_dictionary(pages[&1]).unwrap();
    let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
    assert_eq!(media_box[2].as_i64().unwrap(), 612);
    let resources = page.get(b"Resources").unwrap();
    let resources = match resources {
        Object::Reference(id) => output.get_dictionary(*id).unwrap(),
        other => other.as_dict().unwrap(),
    };
    assert!(resources.has(b"Font"));
}

#[test]
fn test_assemble_allows_duplicate_pages() {
    let codec = LopdfCodec::new();
    let source = create_test_pdf(2);
    let bytes = assemble(&codec, &source, &[2, 2, 1]).unwrap();
    assert_eq!(page_markers(&bytes), vec![2, 2, 1]);
}

#[test]
fn test_assemble_rejects_missing_page() {
    let codec = LopdfCodec::new();
    let source = create_test_pdf(2);
    let err = assemble(&codec, &source, &[1, 3]).unwrap_err();
    assert!(matches!(
        err,
        PagesError::PageOutOfRange {
            page: 3,
            page_count: 2
        }
    ));
}

#[test]
fn test_assemble_empty_plan() {
    let codec = LopdfCodec::new();
    let source = create_test_pdf(2);
    assert!(matches!(
        assemble(&codec, &source, &[]),
        Err(PagesError::EmptyPlan)
    ));
}

#[test]
fn test_copied_pages_do_not_drag_in_source_tree() {
    let codec = LopdfCodec::new();
    let source = create_test_pdf(6);
    let mut dest = codec.create_document().unwrap();
    let copied = codec.copy_pages(&mut dest, &source, &[5]).unwrap();
    for page in copied {
        codec.add_page(&mut dest, page).unwrap();
    }

    // catalog + root + page + content + resources + font
    assert_eq!(dest.objects.len(), 6);
    let root = pages_root(&dest).unwrap();
    let page_id = dest.get_pages()[&1];
    assert_eq!(
        inherited_attribute(&dest, page_id, b"Parent")
            .and_then(|p| p.as_reference().ok()),
        Some(root)
    );
}

#[tokio::test]
async fn test_assembled_file_round_trips_through_disk() {
    let codec = LopdfCodec::new();
    let source = create_test_pdf(4);
    let bytes = assemble(&codec, &source, &[4, 3]).unwrap();

    let temp = tempfile::NamedTempFile::new().unwrap();
    tokio::fs::write(temp.path(), &bytes).await.unwrap();
    let reread = tokio::fs::read(temp.path()).await.unwrap();

    let document = codec.load_document(&reread).unwrap();
    assert_eq!(codec.page_count(&document), 2);
    assert_eq!(page_markers(&reread), vec![4, 3]);
}
