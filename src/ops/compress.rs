//! Stream compression.
//!
//! Only flate handling is attempted: uncompressed streams gain a
//! `FlateDecode` filter, and at the maximum level already-flated streams
//! are re-encoded at the best encoder setting, keeping whichever bytes are
//! smaller. Streams with any other filter (`DCTDecode` images and the
//! like) and structural streams (`XRef`, `ObjStm`) are never touched.

use super::{file_size, load_document, page_count, save_document, OpStats};
use crate::error::Result;
use crate::settings::CompressionLevel;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{Document, Object, ObjectId, Stream};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

/// Compress the document's streams at the given level.
/// Returns the number of streams rewritten.
pub fn compress_document(doc: &mut Document, level: CompressionLevel) -> Result<usize> {
    let encoding = match level {
        CompressionLevel::None => return Ok(0),
        CompressionLevel::Fast => Compression::fast(),
        CompressionLevel::Balanced => Compression::default(),
        CompressionLevel::Maximum => Compression::best(),
    };

    let mut replacements: Vec<(ObjectId, Stream)> = Vec::new();
    for (&id, object) in doc.objects.iter() {
        let Object::Stream(stream) = object else {
            continue;
        };
        if is_structural(stream) {
            continue;
        }

        match stream.dict.get(b"Filter") {
            Err(_) => {
                if stream.content.is_empty() {
                    continue;
                }
                let encoded = flate_encode(&stream.content, encoding)?;
                let mut dict = stream.dict.clone();
                dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
                dict.set("Length", Object::Integer(encoded.len() as i64));
                replacements.push((id, Stream::new(dict, encoded)));
            }
            Ok(Object::Name(name))
                if name == b"FlateDecode" && level == CompressionLevel::Maximum =>
            {
                let raw = match stream.decompressed_content() {
                    Ok(raw) => raw,
                    Err(e) => {
                        log::warn!("skipping stream {:?}: {}", id, e);
                        continue;
                    }
                };
                let encoded = flate_encode(&raw, Compression::best())?;
                if encoded.len() < stream.content.len() {
                    let mut dict = stream.dict.clone();
                    dict.set("Length", Object::Integer(encoded.len() as i64));
                    replacements.push((id, Stream::new(dict, encoded)));
                }
            }
            Ok(_) => {}
        }
    }

    let touched = replacements.len();
    for (id, stream) in replacements {
        doc.objects.insert(id, Object::Stream(stream));
    }

    if matches!(
        level,
        CompressionLevel::Balanced | CompressionLevel::Maximum
    ) {
        doc.prune_objects();
    }

    Ok(touched)
}

/// Compress a file and write the result to `output`.
///
/// At [`CompressionLevel::None`] the input bytes are copied through
/// untouched (after validating the file parses as a PDF).
pub fn compress_file(
    input: impl AsRef<Path>,
    level: CompressionLevel,
    output: impl AsRef<Path>,
) -> Result<OpStats> {
    let start = Instant::now();
    let input = input.as_ref();
    let output = output.as_ref();

    let mut doc = load_document(input)?;
    let input_pages = page_count(&doc);

    let output_bytes = if level == CompressionLevel::None {
        if let Some(dir) = output.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        fs::copy(input, output)?
    } else {
        let touched = compress_document(&mut doc, level)?;
        log::debug!(
            "rewrote {} streams in {} at level {:?}",
            touched,
            input.display(),
            level
        );
        save_document(&mut doc, output)?
    };

    Ok(OpStats {
        input_bytes: file_size(input),
        output_bytes,
        input_pages,
        output_pages: input_pages,
        elapsed_ms: start.elapsed().as_millis() as u64,
    })
}

fn is_structural(stream: &Stream) -> bool {
    matches!(
        stream.dict.get(b"Type"),
        Ok(Object::Name(name)) if name == b"XRef" || name == b"ObjStm"
    )
}

fn flate_encode(data: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), level);
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
