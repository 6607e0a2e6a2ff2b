//! Zip packaging of generated trees

use crate::MirrorError;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive holding the linked HTML tree
pub const HTML_ARCHIVE: &str = "Generated-Offline-Manual.zip";

/// Archive holding the rendered PDFs
pub const PDF_ARCHIVE: &str = "PDF-Offline-Manual.zip";

/// Zips the contents of `source` into `destination`
///
/// Entry names are relative to `source` with `/` separators, so unpacking
/// the archive recreates the tree without its top directory.
///
/// # Returns
///
/// The number of files stored
pub fn zip_dir(source: &Path, destination: &Path) -> Result<u64, MirrorError> {
    let file = File::create(destination)?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut files = 0;
    for entry in WalkDir::new(source).sort_by_file_name().follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = match entry.path().strip_prefix(source) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative,
            _ => continue,
        };

        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            zip.write_all(&std::fs::read(entry.path())?)?;
            files += 1;
        }
    }

    zip.finish()?;
    tracing::info!("Wrote {} ({} files)", destination.display(), files);
    Ok(files)
}
