use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{info, warn};
use walkdir::WalkDir;

use crate::classify::{RESERVED_NAME, classify};
use crate::convert::{Converter, pdf_name};
use crate::error::Error;
use crate::model::{BatchReport, ConversionRecord, DocumentKind, FileClass, RecordKind, SkipRecord};

/// `/`-joined normal components of a relative path.
pub(crate) fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Name a walk failure by its path below `root`, or by the full path when the
/// failure is at (or has no path below) the root itself.
fn walk_error_label(path: Option<&Path>, root: &Path) -> String {
    let rel = path
        .and_then(|p| p.strip_prefix(root).ok())
        .map(slash_path)
        .unwrap_or_default();
    if rel.is_empty() {
        path.unwrap_or(root).display().to_string()
    } else {
        rel
    }
}

struct Walker<'a, C> {
    root: &'a Path,
    output_root: &'a Path,
    preserve_structure: bool,
    converter: C,
    produced: HashSet<PathBuf>,
    report: BatchReport,
}

/// Convert every office document under `root` into `output_root`.
///
/// Fails only when `root` is not a directory; everything that goes wrong with
/// an individual file ends up in `BatchReport::skipped`.
pub fn process_folder<C: Converter>(
    root: &Path,
    output_root: &Path,
    preserve_structure: bool,
    converter: C,
) -> Result<BatchReport, Error> {
    if !root.is_dir() {
        return Err(Error::NotADirectory(root.to_path_buf()));
    }
    fs::create_dir_all(output_root)?;

    let mut walker = Walker {
        root,
        output_root,
        preserve_structure,
        converter,
        produced: HashSet::new(),
        report: BatchReport::default(),
    };

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let rel = walk_error_label(e.path(), root);
                warn!("cannot read '{rel}': {e}");
                walker.skip(rel, Some(e.to_string()));
                continue;
            }
        };
        if !entry.file_type().is_file() || entry.file_name() == RESERVED_NAME {
            continue;
        }
        walker.visit(entry.path());
    }

    Ok(walker.report)
}

impl<C: Converter> Walker<'_, C> {
    fn visit(&mut self, path: &Path) {
        let relative = path.strip_prefix(self.root).unwrap_or(path);
        let rel = slash_path(relative);

        match classify(path) {
            FileClass::Document(kind) => match self.convert(kind, path, relative) {
                Ok(pdf) => {
                    info!("converted: {rel} -> {pdf}");
                    let ext = path
                        .extension()
                        .map(|e| format!(".{}", e.to_string_lossy().to_uppercase()))
                        .unwrap_or_default();
                    self.report.converted.push(ConversionRecord {
                        original: rel,
                        pdf,
                        kind: RecordKind::Converted(ext),
                    });
                }
                Err(e) => {
                    warn!("failed to convert '{rel}': {e}");
                    self.skip(rel, Some(e.to_string()));
                }
            },
            FileClass::Pdf => match self.copy(path, relative) {
                Ok(pdf) => {
                    info!("copied PDF: {rel}");
                    self.report.converted.push(ConversionRecord {
                        original: rel,
                        pdf,
                        kind: RecordKind::PdfCopied,
                    });
                }
                Err(e) => {
                    warn!("failed to copy PDF '{rel}': {e}");
                    self.skip(rel, Some(e.to_string()));
                }
            },
            FileClass::Ignored => {}
            FileClass::Unsupported => self.skip(rel, None),
        }
    }

    fn skip(&mut self, path: String, reason: Option<String>) {
        self.report.skipped.push(SkipRecord { path, reason });
    }

    fn output_dir(&self, relative: &Path) -> Result<PathBuf, Error> {
        let dir = match relative.parent() {
            Some(parent) if self.preserve_structure => self.output_root.join(parent),
            _ => self.output_root.to_path_buf(),
        };
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    fn claim(&mut self, target: &Path) -> String {
        let rel = target.strip_prefix(self.output_root).unwrap_or(target);
        if !self.produced.insert(target.to_path_buf()) {
            warn!("overwriting earlier output {}", rel.display());
        }
        slash_path(rel)
    }

    fn convert(&mut self, kind: DocumentKind, path: &Path, relative: &Path) -> Result<String, Error> {
        let target = self.output_dir(relative)?.join(pdf_name(path));

        // A flattened batch may already hold a PDF at `target`; convert into an
        // empty directory so only this run's output counts.
        let scratch = tempfile::tempdir()?;
        let fresh = scratch.path().join(pdf_name(path));
        self.converter.convert(kind, path, &fresh)?;
        if !fresh.is_file() {
            return Err(Error::Conversion {
                path: path.to_path_buf(),
                reason: "converter produced no output".to_string(),
            });
        }
        fs::copy(&fresh, &target)?;
        Ok(self.claim(&target))
    }

    fn copy(&mut self, path: &Path, relative: &Path) -> Result<String, Error> {
        let name = path.file_name().unwrap_or_default();
        let target = self.output_dir(relative)?.join(name);
        fs::copy(path, &target)?;
        Ok(self.claim(&target))
    }
}
