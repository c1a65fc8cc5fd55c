//! Job settings: the serializable aggregate that describes what to do with
//! a document.
//!
//! The aggregate mirrors the JSON a front end would hand over: camelCase
//! field names, every field optional. `mergeOptions` arrived in a later
//! revision of the format, so documents written without it still
//! deserialize.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for a processing job.
///
/// Each populated field enables one pipeline stage (see [`crate::job`]).
/// An aggregate with no field populated describes no work and is rejected
/// at job time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobSettings {
    /// How to divide the document into parts, if at all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_options: Option<SplitOptions>,

    /// Stream compression intensity to apply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<CompressionLevel>,

    /// Page expression naming pages to remove, e.g. `"2-4, 7"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_pages: Option<String>,

    /// Documents to append to the input before other stages run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_options: Option<MergeOptions>,

    /// Where outputs go: a file path for a single output, a directory for
    /// split parts. Defaults to the input's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

impl JobSettings {
    /// Create empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the split options.
    pub fn with_split(mut self, options: SplitOptions) -> Self {
        self.split_options = Some(options);
        self
    }

    /// Set the compression level.
    pub fn with_compression(mut self, level: CompressionLevel) -> Self {
        self.compression_level = Some(level);
        self
    }

    /// Set the page expression for deletion.
    pub fn with_delete_pages(mut self, expr: impl Into<String>) -> Self {
        self.delete_pages = Some(expr.into());
        self
    }

    /// Set the merge options.
    pub fn with_merge(mut self, options: MergeOptions) -> Self {
        self.merge_options = Some(options);
        self
    }

    /// Set the output path.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// True when no operation is enabled.
    ///
    /// A blank `deletePages` expression, a `none` compression level, and
    /// merge options without append entries all count as "nothing to do";
    /// `outputPath` alone does not make a job.
    pub fn is_empty(&self) -> bool {
        let split = self.split_options.is_some();
        let compress = self
            .compression_level
            .is_some_and(|level| level != CompressionLevel::None);
        let delete = self
            .delete_pages
            .as_deref()
            .is_some_and(|expr| !expr.trim().is_empty());
        let merge = self
            .merge_options
            .as_ref()
            .is_some_and(|options| !options.append.is_empty());
        !(split || compress || delete || merge)
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Other(format!(
                "Cannot read settings file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Save settings to a JSON file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }
}

/// How to divide a document into parts.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SplitOptions {
    /// The split mode. Flattened so the wire form is
    /// `{"mode": "chunks", "size": 2}`.
    #[serde(flatten)]
    pub mode: SplitMode,
}

impl SplitOptions {
    /// One output file per page.
    pub fn single() -> Self {
        Self {
            mode: SplitMode::Single,
        }
    }

    /// Output files of `size` consecutive pages each.
    pub fn chunks(size: u32) -> Self {
        Self {
            mode: SplitMode::Chunks { size },
        }
    }

    /// One output file per segment of a page expression.
    pub fn ranges(expr: impl Into<String>) -> Self {
        Self {
            mode: SplitMode::Ranges {
                ranges: expr.into(),
            },
        }
    }
}

/// The split mode carried by [`SplitOptions`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum SplitMode {
    /// One part per page.
    #[default]
    Single,
    /// Parts of `size` consecutive pages; the last part may be shorter.
    Chunks { size: u32 },
    /// One part per comma-separated segment of `ranges`.
    Ranges { ranges: String },
}

/// Stream compression intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionLevel {
    /// Leave the document untouched.
    None,
    /// Compress uncompressed streams with a speed-biased encoder.
    Fast,
    /// Compress uncompressed streams and prune orphan objects.
    #[default]
    Balanced,
    /// Also re-encode already-compressed streams at the best encoder level.
    Maximum,
}

/// Options for combining documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MergeOptions {
    /// Documents appended after the primary input, in order.
    pub append: Vec<PathBuf>,

    /// Carry the primary input's Info dictionary into the result.
    pub keep_metadata: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            append: Vec::new(),
            keep_metadata: true,
        }
    }
}

impl MergeOptions {
    /// Merge options appending the given documents.
    pub fn appending<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            append: paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Control whether the primary input's metadata survives the merge.
    pub fn with_keep_metadata(mut self, keep: bool) -> Self {
        self.keep_metadata = keep;
        self
    }
}
