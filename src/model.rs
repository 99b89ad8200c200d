use std::fmt;

use serde::{Serialize, Serializer};

/// One uploaded item. The name may carry a relative path using `/` or `\`.
#[derive(Clone, Debug)]
pub struct Upload {
    pub name: String,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Upload {
            name: name.into(),
            data: data.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub enum BatchInput {
    /// Raw bytes of a ZIP archive.
    Archive(Vec<u8>),
    /// Individual files, always converted into a flat output.
    Files(Vec<Upload>),
    /// Files from a folder drop; directories are rebuilt from the names.
    Folder(Vec<Upload>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchOptions {
    pub preserve_structure: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            preserve_structure: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BatchRequest {
    pub input: BatchInput,
    pub options: BatchOptions,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Word,
    PowerPoint,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Word => f.write_str("Word"),
            DocumentKind::PowerPoint => f.write_str("PowerPoint"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileClass {
    Document(DocumentKind),
    Pdf,
    Ignored,
    Unsupported,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordKind {
    /// Upper-cased source extension including the dot, e.g. `.DOCX`.
    Converted(String),
    PdfCopied,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Converted(ext) => f.write_str(ext),
            RecordKind::PdfCopied => f.write_str("PDF (copied)"),
        }
    }
}

impl Serialize for RecordKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ConversionRecord {
    /// Source path relative to the traversal root, `/`-separated.
    pub original: String,
    /// Produced path relative to the output root, `/`-separated.
    pub pdf: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SkipRecord {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl fmt::Display for SkipRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            Some(reason) => write!(f, "{}: {reason}", self.path),
            None => f.write_str(&self.path),
        }
    }
}

/// Records produced by one walk over a traversal root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub converted: Vec<ConversionRecord>,
    pub skipped: Vec<SkipRecord>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct BatchOutcome {
    pub converted: Vec<ConversionRecord>,
    pub skipped: Vec<SkipRecord>,
    /// Deflated ZIP of the output root; `None` when nothing was produced.
    #[serde(skip)]
    pub archive: Option<Vec<u8>>,
}
