//! Removing pages from a document.

use super::{file_size, load_document, page_count, save_document, OpStats};
use crate::error::{Error, Result};
use crate::pages::PageSet;
use lopdf::Document;
use std::path::Path;
use std::time::Instant;

/// Delete the pages named by `pages` from the document.
///
/// Removing every page is rejected; a PDF must keep at least one.
/// Returns the number of pages removed.
pub fn delete_pages(doc: &mut Document, pages: &PageSet) -> Result<u32> {
    let total = page_count(doc);
    if total == 0 {
        return Err(Error::Corrupted("document has no pages".to_string()));
    }

    let selected = pages.resolve(total)?;
    if selected.len() as u32 == total {
        return Err(Error::EmptyDocument(pages.to_string()));
    }

    // delete back to front so remaining indices stay valid
    for &page in selected.iter().rev() {
        doc.delete_pages(&[page]);
    }
    doc.prune_objects();

    Ok(selected.len() as u32)
}

/// Delete pages from a file and write the result to `output`.
pub fn delete_pages_file(
    input: impl AsRef<Path>,
    pages: &PageSet,
    output: impl AsRef<Path>,
) -> Result<OpStats> {
    let start = Instant::now();
    let input = input.as_ref();
    let output = output.as_ref();

    let mut doc = load_document(input)?;
    let input_pages = page_count(&doc);
    let removed = delete_pages(&mut doc, pages)?;
    let output_bytes = save_document(&mut doc, output)?;

    log::debug!(
        "removed {} pages from {} into {}",
        removed,
        input.display(),
        output.display()
    );

    Ok(OpStats {
        input_bytes: file_size(input),
        output_bytes,
        input_pages,
        output_pages: input_pages - removed,
        elapsed_ms: start.elapsed().as_millis() as u64,
    })
}
