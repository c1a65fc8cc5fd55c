//! Combining documents.
//!
//! Appended documents get their object IDs shifted past the destination's
//! highest ID, every internal reference is rewritten to match, and the
//! destination's page tree is rebuilt with the combined page list.

use super::{file_size, load_document, page_count, save_document, OpStats};
use crate::error::{Error, Result};
use lopdf::{Document, Object, ObjectId};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Merge two or more documents into one, pages in input order.
///
/// The first document is the base: its version and, when `keep_metadata`
/// is set, its Info dictionary survive into the result.
pub fn merge_documents(documents: Vec<Document>, keep_metadata: bool) -> Result<Document> {
    if documents.len() < 2 {
        return Err(Error::Other(
            "merge requires at least two documents".to_string(),
        ));
    }

    let mut documents = documents;
    let mut dest = documents.remove(0);
    let mut dest_max_id = dest.max_id;
    let mut page_refs: Vec<ObjectId> = dest.get_pages().values().copied().collect();

    for source in documents {
        let source_pages: Vec<ObjectId> = source.get_pages().values().copied().collect();
        let source_max_id = source.max_id;
        let id_offset = dest_max_id;

        for (old_id, object) in source.objects.into_iter() {
            let new_id = (old_id.0 + id_offset, old_id.1);
            dest.objects.insert(new_id, shift_references(object, id_offset));
        }

        for old_ref in source_pages {
            page_refs.push((old_ref.0 + id_offset, old_ref.1));
        }

        dest_max_id = (source_max_id + id_offset).max(dest_max_id);
    }

    rebuild_page_tree(&mut dest, page_refs)?;
    dest.max_id = dest_max_id;

    if !keep_metadata {
        dest.trailer.remove(b"Info");
    }

    dest.prune_objects();
    dest.compress();
    Ok(dest)
}

/// Merge files in order and write the result to `output`.
/// Inputs are loaded in parallel.
pub fn merge_files(
    inputs: &[PathBuf],
    output: impl AsRef<Path>,
    keep_metadata: bool,
) -> Result<OpStats> {
    let start = Instant::now();
    let output = output.as_ref();

    let documents: Vec<Document> = inputs
        .par_iter()
        .map(|path| load_document(path))
        .collect::<Result<_>>()?;

    let input_bytes: u64 = inputs.iter().map(|path| file_size(path)).sum();
    let input_pages: u32 = documents.iter().map(page_count).sum();

    let mut merged = merge_documents(documents, keep_metadata)?;
    let output_pages = page_count(&merged);
    let output_bytes = save_document(&mut merged, output)?;

    log::debug!("merged {} files into {}", inputs.len(), output.display());

    Ok(OpStats {
        input_bytes,
        output_bytes,
        input_pages,
        output_pages,
        elapsed_ms: start.elapsed().as_millis() as u64,
    })
}

/// Rewrite every object reference by `offset`, recursing into containers.
fn shift_references(object: Object, offset: u32) -> Object {
    match object {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(items) => Object::Array(
            items
                .into_iter()
                .map(|item| shift_references(item, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = shift_references(value.clone(), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = shift_references(value.clone(), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Point the destination's page tree root at the combined page list and
/// reparent every page to it.
fn rebuild_page_tree(doc: &mut Document, page_refs: Vec<ObjectId>) -> Result<()> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .map_err(|_| Error::MissingObject("Root".to_string()))?
        .as_reference()
        .map_err(|_| Error::Corrupted("Root is not a reference".to_string()))?;

    let pages_id = doc
        .objects
        .get(&catalog_id)
        .ok_or_else(|| Error::MissingObject("catalog".to_string()))?
        .as_dict()
        .map_err(|_| Error::Corrupted("catalog is not a dictionary".to_string()))?
        .get(b"Pages")
        .map_err(|_| Error::MissingObject("Pages".to_string()))?
        .as_reference()
        .map_err(|_| Error::Corrupted("Pages is not a reference".to_string()))?;

    match doc.objects.get_mut(&pages_id) {
        Some(Object::Dictionary(pages)) => {
            pages.set(
                "Kids",
                Object::Array(page_refs.iter().map(|&id| Object::Reference(id)).collect()),
            );
            pages.set("Count", Object::Integer(page_refs.len() as i64));
        }
        _ => {
            return Err(Error::Corrupted(
                "page tree root is not a dictionary".to_string(),
            ))
        }
    }

    for &page_ref in &page_refs {
        if let Some(Object::Dictionary(page)) = doc.objects.get_mut(&page_ref) {
            page.set("Parent", Object::Reference(pages_id));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::test_fixtures::sample_pdf_labeled;
    use lopdf::{Dictionary, Document};

    fn doc_with_title(pages: u32, title: &str) -> Document {
        let mut doc = Document::load_mem(&sample_pdf_labeled(pages, title)).unwrap();
        let mut info = Dictionary::new();
        info.set(
            "Title",
            Object::String(title.as_bytes().to_vec(), lopdf::StringFormat::Literal),
        );
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", Object::Reference(info_id));
        doc
    }

    fn trailer_title(doc: &Document) -> Option<String> {
        let info_id = doc.trailer.get(b"Info").ok()?.as_reference().ok()?;
        let info = doc.get_object(info_id).ok()?.as_dict().ok()?;
        match info.get(b"Title").ok()? {
            Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_merge_combines_pages() {
        let a = Document::load_mem(&sample_pdf_labeled(2, "A")).unwrap();
        let b = Document::load_mem(&sample_pdf_labeled(3, "B")).unwrap();
        let merged = merge_documents(vec![a, b], true).unwrap();
        assert_eq!(merged.get_pages().len(), 5);
    }

    #[test]
    fn test_merge_three_documents() {
        let docs = vec![
            Document::load_mem(&sample_pdf_labeled(2, "First")).unwrap(),
            Document::load_mem(&sample_pdf_labeled(1, "Second")).unwrap(),
            Document::load_mem(&sample_pdf_labeled(2, "Third")).unwrap(),
        ];
        let merged = merge_documents(docs, true).unwrap();
        assert_eq!(merged.get_pages().len(), 5);
    }

    #[test]
    fn test_merge_requires_two_documents() {
        assert!(merge_documents(vec![], true).is_err());

        let single = Document::load_mem(&sample_pdf_labeled(2, "Only")).unwrap();
        assert!(merge_documents(vec![single], true).is_err());
    }

    #[test]
    fn test_merge_result_reloads() {
        let a = Document::load_mem(&sample_pdf_labeled(2, "A")).unwrap();
        let b = Document::load_mem(&sample_pdf_labeled(2, "B")).unwrap();
        let mut merged = merge_documents(vec![a, b], true).unwrap();

        let mut buffer = Vec::new();
        merged.save_to(&mut buffer).unwrap();
        let reloaded = Document::load_mem(&buffer).unwrap();
        assert_eq!(reloaded.get_pages().len(), 4);
    }

    #[test]
    fn test_merge_keeps_base_metadata() {
        let a = doc_with_title(1, "BaseDoc");
        let b = doc_with_title(1, "Appended");
        let merged = merge_documents(vec![a, b], true).unwrap();
        assert_eq!(trailer_title(&merged).as_deref(), Some("BaseDoc"));
    }

    #[test]
    fn test_merge_can_strip_metadata() {
        let a = doc_with_title(1, "BaseDoc");
        let b = doc_with_title(1, "Appended");
        let merged = merge_documents(vec![a, b], false).unwrap();
        assert!(trailer_title(&merged).is_none());
    }

    #[test]
    fn test_merge_files_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        std::fs::write(&a, sample_pdf_labeled(2, "A")).unwrap();
        std::fs::write(&b, sample_pdf_labeled(3, "B")).unwrap();

        let out = dir.path().join("merged.pdf");
        let stats = merge_files(&[a, b], &out, true).unwrap();

        assert_eq!(stats.input_pages, 5);
        assert_eq!(stats.output_pages, 5);
        let merged = Document::load(&out).unwrap();
        assert_eq!(merged.get_pages().len(), 5);
    }
}
