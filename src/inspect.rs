//! Document probing and inspection.
//!
//! The header probe answers "is this a PDF, and which version" from the
//! first bytes without parsing. [`inspect_file`] goes further and builds a
//! [`DocumentSummary`] with the page count and Info-dictionary metadata.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use lopdf::Document;
use serde::Serialize;
use std::fs;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::{Path, PathBuf};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Summary of a document on disk.
///
/// Metadata fields come from the Info dictionary and are omitted for
/// encrypted documents, whose strings are not readable without a password.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub path: PathBuf,
    pub name: String,
    pub file_size: u64,
    pub pdf_version: String,
    pub page_count: u32,
    pub encrypted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
}

/// Probe the PDF version from a file's header.
pub fn probe_version(path: impl AsRef<Path>) -> Result<String> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(16);
    file.take(16).read_to_end(&mut header)?;
    probe_version_bytes(&header)
}

/// Probe the PDF version from the first bytes of a file.
///
/// Returns the version string (e.g. `"1.7"`), [`Error::UnknownFormat`] when
/// the magic is missing, or [`Error::UnsupportedVersion`] when the version
/// digits are malformed.
pub fn probe_version_bytes(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN {
        return Err(Error::UnknownFormat);
    }
    if !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(version)
}

/// Check if a file starts with a valid PDF header.
pub fn is_pdf_file(path: impl AsRef<Path>) -> bool {
    probe_version(path).is_ok()
}

/// Check if bytes start with a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    probe_version_bytes(data).is_ok()
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3
        && bytes[0].is_ascii_digit()
        && bytes[1] == b'.'
        && bytes[2].is_ascii_digit()
}

/// Inspect a file and build its summary.
///
/// Encrypted documents are summarized rather than rejected: the page count
/// and version are still reported, only the Info metadata is skipped.
pub fn inspect_file(path: impl AsRef<Path>) -> Result<DocumentSummary> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("file not found: {}", path.display()),
        )));
    }

    let bytes = fs::read(path)?;
    let pdf_version = probe_version_bytes(&bytes)?;
    let doc = Document::load_mem(&bytes)?;
    let encrypted = doc.is_encrypted();

    let mut summary = DocumentSummary {
        path: path.to_path_buf(),
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        file_size: bytes.len() as u64,
        pdf_version,
        page_count: doc.get_pages().len() as u32,
        encrypted,
        title: None,
        author: None,
        subject: None,
        keywords: None,
        creator: None,
        producer: None,
        created: None,
        modified: None,
    };

    if !encrypted {
        if let Ok(info) = doc.trailer.get(b"Info") {
            if let Ok(info_ref) = info.as_reference() {
                if let Ok(info_dict) = doc.get_dictionary(info_ref) {
                    summary.title = info_string(info_dict, b"Title");
                    summary.author = info_string(info_dict, b"Author");
                    summary.subject = info_string(info_dict, b"Subject");
                    summary.keywords = info_string(info_dict, b"Keywords");
                    summary.creator = info_string(info_dict, b"Creator");
                    summary.producer = info_string(info_dict, b"Producer");

                    if let Some(date) = info_string(info_dict, b"CreationDate") {
                        summary.created = parse_pdf_date(&date);
                    }
                    if let Some(date) = info_string(info_dict, b"ModDate") {
                        summary.modified = parse_pdf_date(&date);
                    }
                }
            }
        }
    }

    Ok(summary)
}

/// Count the pages of a document on disk.
pub fn page_count_of(path: impl AsRef<Path>) -> Result<u32> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("file not found: {}", path.display()),
        )));
    }
    probe_version(path)?;
    let doc = Document::load(path)?;
    Ok(doc.get_pages().len() as u32)
}

/// Read a text value from an Info dictionary entry.
fn info_string(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        lopdf::Object::String(bytes, _) => {
            // UTF-16BE with BOM is the PDF way of spelling Unicode
            if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                let utf16: Vec<u16> = bytes[2..]
                    .chunks(2)
                    .filter_map(|c| {
                        if c.len() == 2 {
                            Some(u16::from_be_bytes([c[0], c[1]]))
                        } else {
                            None
                        }
                    })
                    .collect();
                String::from_utf16(&utf16).ok()
            } else {
                String::from_utf8(bytes.clone())
                    .ok()
                    .or_else(|| Some(bytes.iter().map(|&b| b as char).collect()))
            }
        }
        lopdf::Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    })
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.strip_prefix("D:")?;

    // At minimum we need YYYY
    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::test_fixtures::sample_pdf;
    use chrono::Datelike;
    use lopdf::{Dictionary, Object, StringFormat};

    #[test]
    fn test_probe_valid_header() {
        let data = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3";
        assert_eq!(probe_version_bytes(data).unwrap(), "1.7");
    }

    #[test]
    fn test_probe_pdf_2_0() {
        let data = b"%PDF-2.0\n%\xe2\xe3\xcf\xd3";
        assert_eq!(probe_version_bytes(data).unwrap(), "2.0");
    }

    #[test]
    fn test_probe_rejects_non_pdf() {
        assert!(matches!(
            probe_version_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_probe_rejects_truncated_header() {
        assert!(matches!(
            probe_version_bytes(b"%PDF"),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_probe_rejects_bad_version() {
        assert!(matches!(
            probe_version_bytes(b"%PDF-abc\n"),
            Err(Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_is_pdf_bytes() {
        assert!(is_pdf_bytes(b"%PDF-1.4\nrest"));
        assert!(!is_pdf_bytes(b"Not a PDF"));
        assert!(!is_pdf_bytes(b""));
    }

    #[test]
    fn test_parse_pdf_date() {
        let date = parse_pdf_date("D:20240115103045").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_pdf_date_minimal() {
        let date = parse_pdf_date("D:2024").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 1);
    }

    #[test]
    fn test_parse_pdf_date_rejects_garbage() {
        assert!(parse_pdf_date("20240115").is_none());
        assert!(parse_pdf_date("D:20").is_none());
    }

    #[test]
    fn test_info_string_utf16be() {
        let mut dict = Dictionary::new();
        dict.set(
            "Title",
            Object::String(
                vec![0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42],
                StringFormat::Literal,
            ),
        );
        assert_eq!(info_string(&dict, b"Title").as_deref(), Some("AB"));
    }

    #[test]
    fn test_inspect_file_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");

        let mut doc = Document::load_mem(&sample_pdf(3)).unwrap();
        let mut info = Dictionary::new();
        info.set(
            "Title",
            Object::String(b"Quarterly Report".to_vec(), StringFormat::Literal),
        );
        info.set(
            "Author",
            Object::String(b"Finance".to_vec(), StringFormat::Literal),
        );
        info.set(
            "CreationDate",
            Object::String(b"D:20240115103045".to_vec(), StringFormat::Literal),
        );
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", Object::Reference(info_id));
        let mut file = std::fs::File::create(&path).unwrap();
        doc.save_to(&mut file).unwrap();

        let summary = inspect_file(&path).unwrap();
        assert_eq!(summary.name, "report.pdf");
        assert_eq!(summary.page_count, 3);
        assert_eq!(summary.pdf_version, "1.7");
        assert!(!summary.encrypted);
        assert_eq!(summary.title.as_deref(), Some("Quarterly Report"));
        assert_eq!(summary.author.as_deref(), Some("Finance"));
        assert_eq!(summary.created.unwrap().year(), 2024);
        assert!(summary.file_size > 0);
    }

    #[test]
    fn test_inspect_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "just text").unwrap();
        assert!(matches!(
            inspect_file(&path),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_page_count_of() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.pdf");
        std::fs::write(&path, sample_pdf(7)).unwrap();
        assert_eq!(page_count_of(&path).unwrap(), 7);
    }

    #[test]
    fn test_page_count_of_missing_file() {
        assert!(matches!(
            page_count_of("/no/such/doc.pdf"),
            Err(Error::Io(_))
        ));
    }
}
