mod batch;
mod classify;
mod convert;
mod error;
mod model;
mod package;
mod staging;

pub use batch::process_folder;
pub use classify::{RESERVED_NAME, classify};
pub use convert::{Backend, Converter, OfficeConverter};
pub use error::Error;
pub use model::{
    BatchInput, BatchOptions, BatchOutcome, BatchReport, BatchRequest, ConversionRecord,
    DocumentKind, FileClass, RecordKind, SkipRecord, Upload,
};
pub use package::{ARCHIVE_NAME, zip_folder};
pub use staging::{FolderTree, StagedInput, materialize, upload_path};

const OUTPUT_DIR: &str = "converted";
const STAGING_DIR: &str = "staging";

/// Run one batch: stage the input, convert it, and package the PDFs.
///
/// The staging and output directories live in a temporary directory that is
/// removed before this returns.
pub fn convert_batch<C: Converter>(request: &BatchRequest, converter: C) -> Result<BatchOutcome, Error> {
    let work = tempfile::tempdir()?;
    let output_root = work.path().join(OUTPUT_DIR);

    let staged = staging::materialize(&request.input, &work.path().join(STAGING_DIR))?;
    let preserve = request.options.preserve_structure && !staged.force_flatten;

    let report = batch::process_folder(&staged.root, &output_root, preserve, converter)?;
    let archive = if report.converted.is_empty() {
        None
    } else {
        Some(package::zip_folder(&output_root)?)
    };

    Ok(BatchOutcome {
        converted: report.converted,
        skipped: report.skipped,
        archive,
    })
}
