use std::path::Path;

use crate::model::{DocumentKind, FileClass};

/// Staging-internal file name that is never treated as batch input.
pub const RESERVED_NAME: &str = "uploaded.zip";

const IGNORED_EXTENSIONS: &[&str] = &["txt", "md", "log"];

pub fn classify(path: &Path) -> FileClass {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "doc" | "docx" => FileClass::Document(DocumentKind::Word),
        "ppt" | "pptx" => FileClass::Document(DocumentKind::PowerPoint),
        "pdf" => FileClass::Pdf,
        _ if name.starts_with('.') || IGNORED_EXTENSIONS.contains(&ext.as_str()) => {
            FileClass::Ignored
        }
        _ => FileClass::Unsupported,
    }
}

