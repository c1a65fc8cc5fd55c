//! Document operations: split, merge, delete pages, compress.
//!
//! Operations come in two layers: document-level functions working on
//! [`lopdf::Document`] values, and file-level functions that load, run,
//! save, and report an [`OpStats`] record.

mod compress;
mod delete;
mod merge;
mod split;

pub use compress::{compress_document, compress_file};
pub use delete::{delete_pages, delete_pages_file};
pub use merge::{merge_documents, merge_files};
pub use split::{extract_pages, split_document, split_file, split_plan, SplitPart};
pub(crate) use split::write_parts;

use crate::error::{Error, Result};
use lopdf::Document;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

/// Outcome record of one operation.
#[derive(Debug, Clone, Serialize)]
pub struct OpStats {
    /// Total size of the input file(s) in bytes.
    pub input_bytes: u64,
    /// Total size of the output file(s) in bytes.
    pub output_bytes: u64,
    /// Page count of the input (summed across merge inputs).
    pub input_pages: u32,
    /// Page count of the output (summed across split parts).
    pub output_pages: u32,
    /// Wall-clock time spent, in milliseconds.
    pub elapsed_ms: u64,
}

/// Load a document from a file, probing the header before parsing.
///
/// Encrypted documents are rejected here rather than failing later with
/// garbled content.
pub fn load_document(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("file not found: {}", path.display()),
        )));
    }
    let bytes = fs::read(path)?;
    load_document_bytes(&bytes)
}

/// Load a document from memory, probing the header before parsing.
pub fn load_document_bytes(bytes: &[u8]) -> Result<Document> {
    if !crate::inspect::is_pdf_bytes(bytes) {
        return Err(Error::UnknownFormat);
    }
    let doc = Document::load_mem(bytes)?;
    if doc.is_encrypted() {
        return Err(Error::Encrypted);
    }
    Ok(doc)
}

/// Serialize a document to bytes.
pub fn document_to_bytes(doc: &mut Document) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

/// Save a document to a file, creating missing parent directories.
/// Returns the written size in bytes.
pub fn save_document(doc: &mut Document, path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    let mut file = fs::File::create(path)?;
    doc.save_to(&mut file)?;
    Ok(fs::metadata(path)?.len())
}

pub(crate) fn page_count(doc: &Document) -> u32 {
    doc.get_pages().len() as u32
}

pub(crate) fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_document_bytes() {
        let bytes = test_fixtures::sample_pdf(3);
        let doc = load_document_bytes(&bytes).unwrap();
        assert_eq!(page_count(&doc), 3);
    }

    #[test]
    fn test_load_rejects_non_pdf() {
        assert!(matches!(
            load_document_bytes(b"hello world"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            load_document_bytes(b""),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_document("/no/such/file.pdf").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_document_byte_round_trip() {
        let bytes = test_fixtures::sample_pdf(2);
        let mut doc = load_document_bytes(&bytes).unwrap();
        let saved = document_to_bytes(&mut doc).unwrap();
        let reloaded = load_document_bytes(&saved).unwrap();
        assert_eq!(page_count(&reloaded), 2);
    }
}
