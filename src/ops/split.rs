//! Splitting a document into parts.
//!
//! Page extraction builds each part by whitelist: clone the source, delete
//! every page outside the part in reverse order, then prune the objects the
//! deleted pages no longer reference.

use super::{file_size, load_document, page_count, save_document, OpStats};
use crate::error::{Error, Result};
use crate::pages::PageSet;
use crate::settings::{SplitMode, SplitOptions};
use lopdf::Document;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One planned output of a split: a file label and the 1-indexed source
/// pages it will contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitPart {
    pub label: String,
    pub pages: Vec<u32>,
}

/// Plan the parts a split mode produces for a document of `page_count`
/// pages, without touching the document.
pub fn split_plan(mode: &SplitMode, page_count: u32) -> Result<Vec<SplitPart>> {
    if page_count == 0 {
        return Err(Error::Corrupted("document has no pages".to_string()));
    }

    match mode {
        SplitMode::Single => {
            let width = digits(page_count);
            Ok((1..=page_count)
                .map(|page| SplitPart {
                    label: format!("page{page:0width$}"),
                    pages: vec![page],
                })
                .collect())
        }
        SplitMode::Chunks { size } => {
            if *size == 0 {
                return Err(Error::InvalidPageRange(
                    "chunk size must be at least 1".to_string(),
                ));
            }
            let all: Vec<u32> = (1..=page_count).collect();
            let chunks: Vec<Vec<u32>> = all
                .chunks(*size as usize)
                .map(|chunk| chunk.to_vec())
                .collect();
            let width = digits(chunks.len() as u32);
            Ok(chunks
                .into_iter()
                .enumerate()
                .map(|(i, pages)| SplitPart {
                    label: format!("part{:0width$}", i + 1),
                    pages,
                })
                .collect())
        }
        SplitMode::Ranges { ranges } => {
            let set = PageSet::parse(ranges)?;
            set.resolve(page_count)?;
            let segments = set.segments();
            let width = digits(segments.len() as u32);
            Ok(segments
                .iter()
                .enumerate()
                .map(|(i, &(start, end))| SplitPart {
                    label: format!("part{:0width$}", i + 1),
                    pages: (start..=end).collect(),
                })
                .collect())
        }
    }
}

/// Extract the given 1-indexed pages into a new document.
///
/// The page order of the source is preserved; `pages` selects, it does not
/// reorder.
pub fn extract_pages(source: &Document, pages: &[u32]) -> Result<Document> {
    if pages.is_empty() {
        return Err(Error::InvalidPageRange("no pages selected".to_string()));
    }
    if pages.contains(&0) {
        return Err(Error::InvalidPageRange(
            "page numbers are 1-indexed".to_string(),
        ));
    }

    let total = page_count(source);
    if let Some(&out) = pages.iter().find(|&&p| p > total) {
        return Err(Error::PageOutOfRange(out, total));
    }

    let mut part = source.clone();
    let keep: HashSet<u32> = pages.iter().copied().collect();
    let mut to_delete: Vec<u32> = (1..=total).filter(|p| !keep.contains(p)).collect();

    // delete back to front so remaining indices stay valid
    to_delete.reverse();
    for page in to_delete {
        part.delete_pages(&[page]);
    }

    part.prune_objects();
    part.compress();
    Ok(part)
}

/// Split a document into labeled parts per the split options.
pub fn split_document(source: &Document, options: &SplitOptions) -> Result<Vec<(String, Document)>> {
    let plan = split_plan(&options.mode, page_count(source))?;
    plan.into_iter()
        .map(|part| Ok((part.label, extract_pages(source, &part.pages)?)))
        .collect()
}

/// Extract and write every part of a split, in parallel. Returns
/// `(path, bytes written, page count)` per part, in part order.
pub(crate) fn write_parts(
    source: &Document,
    options: &SplitOptions,
    stem: &str,
    output_dir: &Path,
) -> Result<Vec<(PathBuf, u64, u32)>> {
    let plan = split_plan(&options.mode, page_count(source))?;
    fs::create_dir_all(output_dir)?;

    plan.into_par_iter()
        .map(|part| {
            let mut doc = extract_pages(source, &part.pages)?;
            let path = output_dir.join(format!("{}_{}.pdf", stem, part.label));
            let written = save_document(&mut doc, &path)?;
            Ok((path, written, part.pages.len() as u32))
        })
        .collect()
}

/// Split a file into part files named `{stem}_{label}.pdf` under
/// `output_dir`. Parts are extracted and written in parallel; the returned
/// paths follow part order.
pub fn split_file(
    input: impl AsRef<Path>,
    options: &SplitOptions,
    output_dir: impl AsRef<Path>,
) -> Result<(Vec<PathBuf>, OpStats)> {
    let start = Instant::now();
    let input = input.as_ref();
    let output_dir = output_dir.as_ref();

    let source = load_document(input)?;
    let input_pages = page_count(&source);
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let outputs = write_parts(&source, options, stem, output_dir)?;

    log::debug!(
        "split {} into {} parts under {}",
        input.display(),
        outputs.len(),
        output_dir.display()
    );

    let stats = OpStats {
        input_bytes: file_size(input),
        output_bytes: outputs.iter().map(|(_, bytes, _)| bytes).sum(),
        input_pages,
        output_pages: outputs.iter().map(|(_, _, pages)| pages).sum(),
        elapsed_ms: start.elapsed().as_millis() as u64,
    };
    Ok((outputs.into_iter().map(|(path, _, _)| path).collect(), stats))
}

fn digits(n: u32) -> usize {
    n.to_string().len()
}
