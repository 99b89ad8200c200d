use std::fs::File;
use std::io::{self, Cursor};
use std::path::Path;

use log::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::batch::slash_path;
use crate::error::Error;

/// Download name offered for the packaged results.
pub const ARCHIVE_NAME: &str = "converted_files.zip";

/// Deflate every regular file under `root` into an in-memory ZIP, named by its
/// path relative to `root`.
pub fn zip_folder(root: &Path) -> Result<Vec<u8>, Error> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = slash_path(entry.path().strip_prefix(root).unwrap_or(entry.path()));
        debug!("packing {name}");
        zip.start_file(name, options)?;
        let mut file = File::open(entry.path())?;
        io::copy(&mut file, &mut zip)?;
    }

    Ok(zip.finish()?.into_inner())
}
