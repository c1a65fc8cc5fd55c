//! Folder utilities behind the file picker: listing, searching, and
//! tidying directories into category folders.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One directory entry, shaped for display.
#[derive(Debug, Clone, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub is_dir: bool,
    pub is_file: bool,
}

impl FileEntry {
    fn from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        let metadata = fs::metadata(&path).ok()?;
        Some(Self {
            name,
            size: metadata.len(),
            is_dir: metadata.is_dir(),
            is_file: metadata.is_file(),
            path,
        })
    }
}

/// A file relocation performed (or planned) by [`organize_folder`].
#[derive(Debug, Clone, Serialize)]
pub struct FileMove {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// The starting folder offered to the picker, per platform.
pub fn default_root() -> PathBuf {
    match std::env::consts::OS {
        "linux" => PathBuf::from("/home"),
        "macos" => PathBuf::from("/Users"),
        _ => PathBuf::from("C:\\"),
    }
}

/// List a folder's immediate entries, directories first, names compared
/// case-insensitively. Entries whose metadata cannot be read are skipped.
pub fn list_folder(path: impl AsRef<Path>) -> Result<Vec<FileEntry>> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Err(Error::Other(format!(
            "not a directory: {}",
            path.display()
        )));
    }

    let mut entries: Vec<FileEntry> = fs::read_dir(path)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| FileEntry::from_path(entry.path()))
        .collect();
    entries.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    Ok(entries)
}

/// Search a folder tree for files whose name contains `pattern`,
/// case-insensitively. Results come back sorted by path. Unreadable
/// subdirectories are skipped, not fatal; symbolic links are not
/// followed.
pub fn search_folder(root: impl AsRef<Path>, pattern: &str) -> Result<Vec<FileEntry>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(Error::Other(format!(
            "not a directory: {}",
            root.display()
        )));
    }
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return Err(Error::Other("search pattern is empty".to_string()));
    }

    // literal match; the pattern is user input, not a regex
    let matcher = RegexBuilder::new(&regex::escape(pattern))
        .case_insensitive(true)
        .build()
        .map_err(|e| Error::Other(format!("bad search pattern: {e}")))?;

    let mut matches = Vec::new();
    walk(root, &matcher, &mut matches);
    matches.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(matches)
}

fn walk(dir: &Path, matcher: &Regex, matches: &mut Vec<FileEntry>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("skipping unreadable directory {}: {}", dir.display(), e);
            return;
        }
    };
    for entry in entries.filter_map(|entry| entry.ok()) {
        // file_type() reads the entry itself, so link cycles cannot recurse
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        let path = entry.path();
        if file_type.is_dir() {
            walk(&path, matcher, matches);
        } else if file_type.is_file()
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| matcher.is_match(name))
        {
            if let Some(found) = FileEntry::from_path(path) {
                matches.push(found);
            }
        }
    }
}

const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "documents",
        &[
            "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "md", "odt", "csv",
        ],
    ),
    (
        "images",
        &[
            "png", "jpg", "jpeg", "gif", "bmp", "webp", "svg", "tif", "tiff", "heic",
        ],
    ),
    ("audio", &["mp3", "wav", "flac", "ogg", "m4a", "aac"]),
    ("video", &["mp4", "mkv", "avi", "mov", "webm", "wmv"]),
    ("archives", &["zip", "tar", "gz", "bz2", "xz", "7z", "rar"]),
];

fn category_for(extension: &str) -> &'static str {
    let extension = extension.to_lowercase();
    CATEGORIES
        .iter()
        .find(|(_, extensions)| extensions.contains(&extension.as_str()))
        .map(|(name, _)| *name)
        .unwrap_or("other")
}

/// Move a folder's top-level files into category subfolders (`documents`,
/// `images`, `audio`, `video`, `archives`, `other`) keyed on extension.
///
/// Name collisions inside a category get a numeric suffix
/// (`report.pdf` -> `report_1.pdf`). With `dry_run` the planned moves are
/// returned but nothing on disk changes.
pub fn organize_folder(path: impl AsRef<Path>, dry_run: bool) -> Result<Vec<FileMove>> {
    let root = path.as_ref();
    if !root.is_dir() {
        return Err(Error::Other(format!(
            "not a directory: {}",
            root.display()
        )));
    }

    let mut files: Vec<PathBuf> = fs::read_dir(root)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut moves = Vec::with_capacity(files.len());
    for from in files {
        let Some(name) = from.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        let extension = from.extension().and_then(|e| e.to_str()).unwrap_or("");
        let target_dir = root.join(category_for(extension));
        let to = free_slot(&target_dir, name);
        if !dry_run {
            fs::create_dir_all(&target_dir)?;
            fs::rename(&from, &to)?;
            log::debug!("moved {} -> {}", from.display(), to.display());
        }
        moves.push(FileMove { from, to });
    }
    Ok(moves)
}

fn free_slot(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }
    let (stem, extension) = match name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, Some(extension)),
        _ => (name, None),
    };
    let mut n = 1u32;
    loop {
        let renamed = match extension {
            Some(extension) => format!("{stem}_{n}.{extension}"),
            None => format!("{stem}_{n}"),
        };
        let candidate = dir.join(renamed);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
