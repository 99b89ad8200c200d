use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use log::{debug, warn};
use zip::ZipArchive;

use crate::classify::RESERVED_NAME;
use crate::error::Error;
use crate::model::{BatchInput, Upload};

const EXTRACT_DIR: &str = "extracted";
const INPUT_DIR: &str = "input";

/// Where materialized input ended up, and whether its layout must be flattened.
pub struct StagedInput {
    pub root: PathBuf,
    pub force_flatten: bool,
}

pub fn materialize(input: &BatchInput, staging_root: &Path) -> Result<StagedInput, Error> {
    match input {
        BatchInput::Archive(bytes) => {
            let root = extract_archive(bytes, staging_root)?;
            Ok(StagedInput { root, force_flatten: false })
        }
        BatchInput::Folder(uploads) => {
            let root = staging_root.join(INPUT_DIR);
            fs::create_dir_all(&root)?;
            for upload in uploads {
                let relative = upload_path(&upload.name)?;
                write_upload(&root, &relative, upload)?;
            }
            Ok(StagedInput { root, force_flatten: false })
        }
        BatchInput::Files(uploads) => {
            let root = staging_root.join(INPUT_DIR);
            fs::create_dir_all(&root)?;
            for upload in uploads {
                let relative = upload_path(&upload.name)?;
                let base = relative
                    .file_name()
                    .map(PathBuf::from)
                    .ok_or_else(|| Error::InvalidUploadName(upload.name.clone()))?;
                write_upload(&root, &base, upload)?;
            }
            Ok(StagedInput { root, force_flatten: true })
        }
    }
}

/// Segments of `name` split on either separator, keeping only those that are a
/// single plain path component. Drive prefixes (`C:` on Windows), roots, `.`
/// and `..` are dropped, so the result always stays below whatever it is
/// joined onto.
fn segments(name: &str) -> impl Iterator<Item = &str> {
    name.split(['/', '\\']).filter(|s| {
        let mut components = Path::new(s).components();
        matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        )
    })
}

/// Split an upload name on either separator into a relative path.
pub fn upload_path(name: &str) -> Result<PathBuf, Error> {
    sanitize(name).ok_or_else(|| Error::InvalidUploadName(name.to_string()))
}

fn sanitize(name: &str) -> Option<PathBuf> {
    let path: PathBuf = segments(name).collect();
    if path.as_os_str().is_empty() {
        None
    } else {
        Some(path)
    }
}

fn write_upload(root: &Path, relative: &Path, upload: &Upload) -> Result<(), Error> {
    let target = root.join(relative);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    debug!("staging {} ({} bytes)", relative.display(), upload.data.len());
    fs::write(&target, &upload.data)?;
    Ok(())
}

fn extract_archive(bytes: &[u8], staging_root: &Path) -> Result<PathBuf, Error> {
    fs::create_dir_all(staging_root)?;
    let zip_path = staging_root.join(RESERVED_NAME);
    fs::write(&zip_path, bytes)?;

    let file = File::open(&zip_path)?;
    let mut archive = ZipArchive::new(file).map_err(|e| Error::InvalidArchive(e.to_string()))?;

    let root = staging_root.join(EXTRACT_DIR);
    fs::create_dir_all(&root)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let raw_name = entry.name().to_string();
        let Some(relative) = sanitize(&raw_name) else {
            warn!("dropping archive entry with unusable path: {raw_name}");
            continue;
        };
        let target = root.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
    }

    Ok(root)
}

#[derive(Debug, PartialEq, Eq)]
enum Entry {
    Dir(String, FolderTree),
    /// All files of one level, listed where the first of them appeared.
    Files(Vec<String>),
}

/// Directory tree implied by a set of upload names, for previewing a folder drop.
/// Entries keep the order in which they first appear.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FolderTree {
    entries: Vec<Entry>,
}

impl FolderTree {
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut tree = FolderTree::default();
        for name in names {
            let parts: Vec<&str> = segments(name).collect();
            let Some((file, dirs)) = parts.split_last() else {
                continue;
            };
            let mut level = &mut tree;
            for dir in dirs {
                level = level.child(dir);
            }
            level.push_file(file);
        }
        tree
    }

    fn child(&mut self, name: &str) -> &mut FolderTree {
        let found = self
            .entries
            .iter()
            .position(|e| matches!(e, Entry::Dir(n, _) if n == name));
        let idx = match found {
            Some(idx) => idx,
            None => {
                self.entries.push(Entry::Dir(name.to_string(), FolderTree::default()));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[idx] {
            Entry::Dir(_, sub) => sub,
            Entry::Files(_) => unreachable!("index points at a directory"),
        }
    }

    fn push_file(&mut self, name: &str) {
        for entry in &mut self.entries {
            if let Entry::Files(files) = entry {
                files.push(name.to_string());
                return;
            }
        }
        self.entries.push(Entry::Files(vec![name.to_string()]));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        for entry in &self.entries {
            match entry {
                Entry::Dir(name, sub) => {
                    out.push_str(&format!("{indent}{name}/\n"));
                    sub.render_into(out, depth + 1);
                }
                Entry::Files(files) => {
                    for file in files {
                        out.push_str(&format!("{indent}{file}\n"));
                    }
                }
            }
        }
    }
}
