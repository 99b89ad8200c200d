use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use log::debug;

use crate::error::Error;
use crate::model::DocumentKind;

/// Turns one office document into a PDF at exactly `output`.
pub trait Converter {
    fn convert(&self, kind: DocumentKind, input: &Path, output: &Path) -> Result<(), Error>;
}

impl<C: Converter + ?Sized> Converter for &C {
    fn convert(&self, kind: DocumentKind, input: &Path, output: &Path) -> Result<(), Error> {
        (**self).convert(kind, input, output)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Headless LibreOffice (`soffice --convert-to pdf`).
    LibreOffice { program: PathBuf },
    /// Microsoft Word / PowerPoint driven over COM from PowerShell.
    MsOffice,
}

impl Backend {
    pub fn detect() -> Self {
        if cfg!(windows) {
            Backend::MsOffice
        } else {
            Backend::LibreOffice {
                program: PathBuf::from("soffice"),
            }
        }
    }
}

pub struct OfficeConverter {
    backend: Backend,
}

impl OfficeConverter {
    pub fn new(backend: Backend) -> Self {
        OfficeConverter { backend }
    }
}

impl Converter for OfficeConverter {
    fn convert(&self, kind: DocumentKind, input: &Path, output: &Path) -> Result<(), Error> {
        match &self.backend {
            Backend::LibreOffice { program } => convert_with_soffice(program, input, output),
            Backend::MsOffice => convert_with_com(kind, input, output),
        }
    }
}

/// `<stem>.pdf` for `input`, keeping any inner dots of the stem.
pub fn pdf_name(input: &Path) -> OsString {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push(".pdf");
    name
}

fn run(mut cmd: Command, what: &str) -> Result<Output, Error> {
    debug!("running {cmd:?}");
    cmd.output().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::ConverterUnavailable(format!("{what} not found")),
        _ => Error::ConverterUnavailable(format!("failed to start {what}: {e}")),
    })
}

fn failure(input: &Path, output: &Output) -> Error {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let reason = match stderr.trim() {
        "" => format!("exited with {}", output.status),
        msg => msg.to_string(),
    };
    Error::Conversion {
        path: input.to_path_buf(),
        reason,
    }
}

fn convert_with_soffice(program: &Path, input: &Path, output: &Path) -> Result<(), Error> {
    let out_dir = tempfile::tempdir()?;

    let mut cmd = Command::new(program);
    cmd.args(["--headless", "--convert-to", "pdf", "--outdir"])
        .arg(out_dir.path())
        .arg(input);
    let result = run(cmd, "LibreOffice (soffice)")?;
    if !result.status.success() {
        return Err(failure(input, &result));
    }

    let produced = out_dir.path().join(pdf_name(input));
    if !produced.is_file() {
        return Err(Error::Conversion {
            path: input.to_path_buf(),
            reason: format!("LibreOffice did not produce {}", produced.display()),
        });
    }
    fs::copy(&produced, output)?;
    Ok(())
}

// wdFormatPDF = 17
const WORD_SCRIPT: &str = r#"
$ErrorActionPreference = 'Stop'
$word = New-Object -ComObject Word.Application
$word.Visible = $false
$src = $args[0]
$dst = $args[1]
try {
    $doc = $word.Documents.Open($src)
    try { $doc.SaveAs([ref]$dst, [ref]17) } finally { $doc.Close() }
} finally {
    $word.Quit()
}
"#;

// ppSaveAsPDF = 32
const POWERPOINT_SCRIPT: &str = r#"
$ErrorActionPreference = 'Stop'
$ppt = New-Object -ComObject PowerPoint.Application
$src = $args[0]
$dst = $args[1]
try {
    $pres = $ppt.Presentations.Open($src, $true, $false, $false)
    try { $pres.SaveAs($dst, 32) } finally { $pres.Close() }
} finally {
    $ppt.Quit()
}
"#;

fn convert_with_com(kind: DocumentKind, input: &Path, output: &Path) -> Result<(), Error> {
    let script = match kind {
        DocumentKind::Word => WORD_SCRIPT,
        DocumentKind::PowerPoint => POWERPOINT_SCRIPT,
    };
    let script_dir = tempfile::tempdir()?;
    let script_path = script_dir.path().join("save_as_pdf.ps1");
    fs::write(&script_path, script)?;

    // COM resolves relative paths against the application's own directory.
    let input_abs = std::path::absolute(input)?;
    let output_abs = std::path::absolute(output)?;

    let mut cmd = Command::new("powershell");
    cmd.args(["-NoProfile", "-NonInteractive", "-ExecutionPolicy", "Bypass", "-File"])
        .arg(&script_path)
        .arg(&input_abs)
        .arg(&output_abs);
    let result = run(cmd, &format!("Microsoft {kind} automation (powershell)"))?;
    if !result.status.success() {
        return Err(failure(input, &result));
    }
    Ok(())
}
