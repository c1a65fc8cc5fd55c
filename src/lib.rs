//! # pdfdesk
//!
//! Desktop-style PDF manipulation library for Rust.
//!
//! This library splits, merges, compresses, and prunes PDF documents,
//! and runs whole settings-driven jobs the way a desktop front end
//! submits them: one input file, one JSON settings aggregate, a fixed
//! pipeline of stages.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfdesk::{Job, JobSettings, SplitOptions};
//!
//! fn main() -> pdfdesk::Result<()> {
//!     // Drop pages 2-4, then split the rest into 10-page chunks
//!     let settings = JobSettings::new()
//!         .with_delete_pages("2-4")
//!         .with_split(SplitOptions::chunks(10));
//!
//!     let report = Job::new("document.pdf", settings).run()?;
//!     println!("wrote {} file(s)", report.outputs.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Split**: one file per page, fixed-size chunks, or page-range expressions
//! - **Merge**: append any number of documents under one rebuilt page tree
//! - **Delete**: remove pages named by an expression like `"2-4, 7"`
//! - **Compress**: level-controlled stream compression and object pruning
//! - **Jobs**: run a settings aggregate as one pipeline, with progress events
//! - **Inspect**: header probing and document metadata summaries
//! - **Parallel processing**: uses Rayon when loading and writing batches

pub mod error;
pub mod inspect;
pub mod job;
pub mod ops;
pub mod pages;
pub mod settings;
pub mod workspace;

// Re-export commonly used types
pub use error::{Error, Result};
pub use inspect::{
    inspect_file, is_pdf_bytes, is_pdf_file, page_count_of, probe_version, probe_version_bytes,
    DocumentSummary,
};
pub use job::{Job, JobEvent, JobReport, JobStage, StageReport};
pub use ops::{OpStats, SplitPart};
pub use pages::PageSet;
pub use settings::{CompressionLevel, JobSettings, MergeOptions, SplitMode, SplitOptions};
pub use workspace::{FileEntry, FileMove};

use std::path::{Path, PathBuf};

/// Split a PDF file into parts written to `output_dir`.
///
/// # Arguments
///
/// * `input` - Path to the PDF file
/// * `options` - How to divide the document
/// * `output_dir` - Directory receiving the parts (created if missing)
///
/// # Returns
///
/// The paths written, in page order, plus operation statistics.
///
/// # Example
///
/// ```no_run
/// use pdfdesk::{split_file, SplitOptions};
///
/// let (parts, stats) = split_file("report.pdf", &SplitOptions::single(), "out").unwrap();
/// println!("{} parts from {} pages", parts.len(), stats.input_pages);
/// ```
pub fn split_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    options: &SplitOptions,
    output_dir: Q,
) -> Result<(Vec<PathBuf>, OpStats)> {
    ops::split_file(input, options, output_dir)
}

/// Merge PDF files into one document.
///
/// The first input is the primary document; the rest are appended in
/// order. With `keep_metadata` the primary document's Info dictionary
/// survives the merge.
///
/// # Example
///
/// ```no_run
/// use pdfdesk::merge_files;
/// use std::path::PathBuf;
///
/// let inputs = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
/// let stats = merge_files(&inputs, "combined.pdf", true).unwrap();
/// println!("{} pages", stats.output_pages);
/// ```
pub fn merge_files<P: AsRef<Path>>(
    inputs: &[PathBuf],
    output: P,
    keep_metadata: bool,
) -> Result<OpStats> {
    ops::merge_files(inputs, output, keep_metadata)
}

/// Recompress a PDF file's streams at the given level.
pub fn compress_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    level: CompressionLevel,
    output: Q,
) -> Result<OpStats> {
    ops::compress_file(input, level, output)
}

/// Delete the pages named by a page expression from a PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfdesk::delete_pages;
///
/// let stats = delete_pages("report.pdf", "2-4, 9", "trimmed.pdf").unwrap();
/// println!("{} pages left", stats.output_pages);
/// ```
pub fn delete_pages<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    expression: &str,
    output: Q,
) -> Result<OpStats> {
    let pages = PageSet::parse(expression)?;
    ops::delete_pages_file(input, &pages, output)
}

/// Run a settings aggregate against a PDF file.
///
/// Equivalent to `Job::new(input, settings).run()`.
pub fn run_job<P: AsRef<Path>>(input: P, settings: JobSettings) -> Result<JobReport> {
    Job::new(input.as_ref(), settings).run()
}
