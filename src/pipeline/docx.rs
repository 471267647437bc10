//! DOCX container I/O.
//!
//! A `.docx` file is a ZIP archive of XML parts. The engine only ever
//! rewrites the parts that carry visible text — the main body and the
//! header/footer parts — so this module models the archive as an *ordered*
//! list of `(entry name, bytes)` pairs: untouched entries round-trip
//! byte-identical and in their original order, which is what keeps the
//! substitution pass idempotent and Word happy.
//!
//! On write, media entries are stored uncompressed and everything else is
//! deflated, matching the layout Word itself produces.

use crate::error::ContractError;
use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;

/// The main body part every DOCX must have.
const DOCUMENT_PART: &str = "word/document.xml";

/// An opened DOCX archive: ordered entries, ready for part rewriting.
#[derive(Debug, Clone)]
pub struct DocxArchive {
    entries: Vec<(String, Vec<u8>)>,
}

impl DocxArchive {
    /// Open a DOCX from raw bytes, validating it is a usable template.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ContractError> {
        let mut archive =
            zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| ContractError::InvalidTemplate {
                detail: format!("not a zip archive: {e}"),
            })?;
        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive
                .by_index(i)
                .map_err(|e| ContractError::InvalidTemplate {
                    detail: format!("unreadable archive entry {i}: {e}"),
                })?;
            let name = entry.name().to_string();
            let mut data = Vec::new();
            entry
                .read_to_end(&mut data)
                .map_err(|e| ContractError::InvalidTemplate {
                    detail: format!("unreadable archive entry '{name}': {e}"),
                })?;
            entries.push((name, data));
        }
        let archive = Self { entries };
        if archive.part(DOCUMENT_PART).is_none() {
            return Err(ContractError::InvalidTemplate {
                detail: format!("missing {DOCUMENT_PART}"),
            });
        }
        Ok(archive)
    }

    /// Open a DOCX template from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ContractError::TemplateRead {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        Self::from_bytes(&bytes)
    }

    /// Bytes of a named part, if present.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d.as_slice())
    }

    /// Replace the bytes of an existing part.
    pub fn set_part(&mut self, name: &str, data: Vec<u8>) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| n == name) {
            entry.1 = data;
        }
    }

    /// Names of the parts the substitution engine must visit: the body,
    /// then every header and footer part, in archive order.
    pub fn text_parts(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(n, _)| n.as_str())
            .filter(|n| {
                *n == DOCUMENT_PART
                    || ((n.starts_with("word/header") || n.starts_with("word/footer"))
                        && n.ends_with(".xml"))
            })
            .map(str::to_string)
            .collect()
    }

    /// Re-serialise the archive to DOCX bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ContractError> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let deflated =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        let stored =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, data) in &self.entries {
            let opts = if name.starts_with("word/media/") {
                stored
            } else {
                deflated
            };
            zip.start_file(name.as_str(), opts)
                .and_then(|()| zip.write_all(data).map_err(zip::result::ZipError::Io))
                .map_err(|e| ContractError::Substitution {
                    part: name.clone(),
                    detail: format!("archive write failed: {e}"),
                })?;
        }
        let cursor = zip.finish().map_err(|e| ContractError::Substitution {
            part: DOCUMENT_PART.to_string(),
            detail: format!("archive finalisation failed: {e}"),
        })?;
        Ok(cursor.into_inner())
    }
}

/// A minimal but structurally honest DOCX for unit tests: content types,
/// rels, body, optionally one header.
#[cfg(test)]
pub(crate) fn minimal_docx(body_xml: &str, header_xml: Option<&str>) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let opts = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut put = |name: &str, data: &str| {
        zip.start_file(name, opts).unwrap();
        zip.write_all(data.as_bytes()).unwrap();
    };
    put(
        "[Content_Types].xml",
        r#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#,
    );
    put(
        "_rels/.rels",
        r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#,
    );
    put(DOCUMENT_PART, body_xml);
    if let Some(header) = header_xml {
        put("word/header1.xml", header);
    }
    zip.finish().unwrap().into_inner()
}
