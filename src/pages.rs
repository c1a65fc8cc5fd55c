//! Page-range expressions.
//!
//! A page expression is a comma-separated list of 1-indexed pages and
//! inclusive ranges, e.g. `"1-3, 5, 8-10"`. Parsing is strict: zero,
//! reversed ranges, and non-numeric terms are rejected. Bounds against a
//! concrete document happen later, in [`PageSet::resolve`].

use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::fmt;

/// A parsed page expression.
///
/// Keeps the written segments in order (a range split emits one part per
/// segment), while [`pages`](PageSet::pages) and [`resolve`](PageSet::resolve)
/// give the sorted, deduplicated view used for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSet {
    segments: Vec<(u32, u32)>,
}

impl PageSet {
    /// Parse an expression like `"1-3, 5, 8-10"`.
    ///
    /// Whitespace around terms is tolerated and empty terms are skipped;
    /// an expression that names no page at all is an error.
    pub fn parse(expr: &str) -> Result<Self> {
        let mut segments = Vec::new();

        for part in expr.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            if let Some((start, end)) = part.split_once('-') {
                let start = parse_page(start.trim(), part)?;
                let end = parse_page(end.trim(), part)?;
                if start > end {
                    return Err(Error::InvalidPageRange(part.to_string()));
                }
                segments.push((start, end));
            } else {
                let page = parse_page(part, part)?;
                segments.push((page, page));
            }
        }

        if segments.is_empty() {
            return Err(Error::InvalidPageRange(expr.to_string()));
        }

        Ok(PageSet { segments })
    }

    /// The expression's segments in written order, as inclusive
    /// `(start, end)` pairs. A single page is a one-page segment.
    pub fn segments(&self) -> &[(u32, u32)] {
        &self.segments
    }

    /// All selected pages, sorted and deduplicated.
    pub fn pages(&self) -> Vec<u32> {
        let set: BTreeSet<u32> = self
            .segments
            .iter()
            .flat_map(|&(start, end)| start..=end)
            .collect();
        set.into_iter().collect()
    }

    /// Check whether a page number is selected.
    pub fn contains(&self, page: u32) -> bool {
        self.segments
            .iter()
            .any(|&(start, end)| page >= start && page <= end)
    }

    /// Whether the set names no pages. [`parse`](PageSet::parse) rejects
    /// expressions naming no page, so a parsed set is never empty.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// The highest page named by the expression.
    pub fn max_page(&self) -> u32 {
        self.segments.iter().map(|&(_, end)| end).max().unwrap_or(0)
    }

    /// All selected pages, validated against a document of `page_count`
    /// pages. Any page beyond the document is an error.
    pub fn resolve(&self, page_count: u32) -> Result<Vec<u32>> {
        let pages = self.pages();
        if let Some(&out) = pages.iter().find(|&&p| p > page_count) {
            return Err(Error::PageOutOfRange(out, page_count));
        }
        Ok(pages)
    }

    /// The pages of a `page_count`-page document NOT named by the
    /// expression, sorted ascending.
    pub fn complement(&self, page_count: u32) -> Result<Vec<u32>> {
        let selected: BTreeSet<u32> = self.resolve(page_count)?.into_iter().collect();
        Ok((1..=page_count)
            .filter(|p| !selected.contains(p))
            .collect())
    }
}

impl fmt::Display for PageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &(start, end)) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if start == end {
                write!(f, "{start}")?;
            } else {
                write!(f, "{start}-{end}")?;
            }
        }
        Ok(())
    }
}

fn parse_page(token: &str, context: &str) -> Result<u32> {
    let page: u32 = token
        .parse()
        .map_err(|_| Error::InvalidPageRange(context.to_string()))?;
    if page == 0 {
        return Err(Error::InvalidPageRange(context.to_string()));
    }
    Ok(page)
}
