#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use officebatch_pdf::{Converter, DocumentKind, Error};
use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// One-page PDF carrying `label` as text.
pub fn render_pdf(label: &str) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let catalog_id = Ref::new(1);
    let pages_id = Ref::new(2);
    let page_id = Ref::new(3);
    let content_id = Ref::new(4);
    let font_id = Ref::new(5);

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id).kids([page_id]).count(1);

    let mut content = Content::new();
    content
        .begin_text()
        .set_font(Name(b"F1"), 12.0)
        .next_line(72.0, 720.0)
        .show(Str(label.as_bytes()))
        .end_text();
    pdf.stream(content_id, &content.finish());

    pdf.page(page_id)
        .media_box(Rect::new(0.0, 0.0, 612.0, 792.0))
        .parent(pages_id)
        .contents(content_id)
        .resources()
        .fonts()
        .pair(Name(b"F1"), font_id);
    pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

    pdf.finish()
}

/// Renders the input file's contents into a PDF and remembers every call.
#[derive(Default)]
pub struct StubConverter {
    pub calls: RefCell<Vec<(DocumentKind, PathBuf)>>,
    /// Inputs whose file name contains this string fail.
    pub fail_on: Option<String>,
    /// Inputs whose file name contains this string succeed without writing output.
    pub silent_on: Option<String>,
}

impl StubConverter {
    pub fn failing_on(name: &str) -> Self {
        StubConverter {
            fail_on: Some(name.to_string()),
            ..StubConverter::default()
        }
    }

    pub fn silent_on(name: &str) -> Self {
        StubConverter {
            silent_on: Some(name.to_string()),
            ..StubConverter::default()
        }
    }

    pub fn kinds(&self) -> Vec<DocumentKind> {
        self.calls.borrow().iter().map(|(k, _)| *k).collect()
    }
}

impl Converter for StubConverter {
    fn convert(&self, kind: DocumentKind, input: &Path, output: &Path) -> Result<(), Error> {
        self.calls.borrow_mut().push((kind, input.to_path_buf()));
        let name = input.file_name().unwrap().to_string_lossy();
        if self.fail_on.as_deref().is_some_and(|f| name.contains(f)) {
            return Err(Error::Conversion {
                path: input.to_path_buf(),
                reason: "document is corrupt".to_string(),
            });
        }
        if self.silent_on.as_deref().is_some_and(|f| name.contains(f)) {
            return Ok(());
        }
        let text = fs::read_to_string(input).unwrap_or_default();
        fs::write(output, render_pdf(&text))?;
        Ok(())
    }
}

/// Reports success without writing anything.
pub struct SilentConverter;

impl Converter for SilentConverter {
    fn convert(&self, _kind: DocumentKind, _input: &Path, _output: &Path) -> Result<(), Error> {
        Ok(())
    }
}

pub fn make_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
    }
    zip.finish().unwrap().into_inner()
}

pub fn read_zip(bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut files = BTreeMap::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        if entry.is_dir() {
            continue;
        }
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        files.insert(entry.name().to_string(), data);
    }
    files
}

pub fn write_tree(root: &Path, files: &[(&str, &[u8])]) {
    for (rel, data) in files {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }
}

/// Relative `/`-separated paths of all regular files under `root`.
pub fn list_tree(root: &Path) -> Vec<String> {
    let mut out: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    out.sort();
    out
}
