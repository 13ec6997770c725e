use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::DocxError;

/// The package part holding the document body.
pub(crate) const DOCUMENT_PART: &str = "word/document.xml";

/// Read a DOCX zip into an ordered list of (entry name, bytes).
///
/// Entry order is preserved so the rewritten package keeps the layout the
/// original producer chose.
pub(crate) fn read_package(bytes: &[u8]) -> Result<Vec<(String, Vec<u8>)>, DocxError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| DocxError::Package(e.to_string()))?;

    let mut entries = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| DocxError::Package(e.to_string()))?;
        let name = entry.name().to_string();
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        entries.push((name, data));
    }

    Ok(entries)
}

/// Write the entry list back out as a DOCX zip.
///
/// Uses STORED for media files (images) and DEFLATED for everything else,
/// matching the typical DOCX layout that Word expects.
pub(crate) fn write_package(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>, DocxError> {
    let mut cursor = Cursor::new(Vec::new());

    let mut writer = ZipWriter::new(&mut cursor);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, data) in entries {
        let options = if name.starts_with("word/media/") {
            stored
        } else {
            deflated
        };
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| DocxError::Package(e.to_string()))?;
        writer.write_all(data)?;
    }
    writer
        .finish()
        .map_err(|e| DocxError::Package(e.to_string()))?;

    Ok(cursor.into_inner())
}
