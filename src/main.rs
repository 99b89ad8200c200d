use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use officebatch_pdf::{
    ARCHIVE_NAME, Backend, BatchInput, BatchOptions, BatchOutcome, BatchRequest, FolderTree,
    OfficeConverter, Upload,
};

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Auto,
    Libreoffice,
    Msoffice,
}

#[derive(Parser)]
#[command(name = "officebatch-pdf", about = "Convert Word and PowerPoint files to PDF in bulk")]
struct Args {
    /// Input files, a ZIP archive (--zip) or folders (--folder)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Treat the single input as a ZIP archive of documents
    #[arg(long, conflicts_with = "folder")]
    zip: bool,
    /// Treat inputs as folders and keep their layout
    #[arg(long)]
    folder: bool,
    /// Put every PDF at the top of the output archive
    #[arg(long)]
    flatten: bool,
    /// Output ZIP file
    #[arg(short, long, default_value = ARCHIVE_NAME)]
    output: PathBuf,
    /// Conversion backend
    #[arg(long, value_enum, default_value = "auto", env = "OFFICEBATCH_BACKEND")]
    backend: BackendArg,
    /// LibreOffice executable
    #[arg(long, default_value = "soffice", env = "OFFICEBATCH_SOFFICE")]
    soffice: PathBuf,
    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
    /// Print the detected folder structure before converting (--folder only)
    #[arg(long, requires = "folder")]
    show_tree: bool,
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

/// Name every file under `dir` by its path relative to `dir`'s parent, the way
/// a browser names files from a dropped folder.
fn folder_uploads(dir: &Path, uploads: &mut Vec<Upload>) -> Result<(), String> {
    let base = dir.parent().unwrap_or(dir);
    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| e.to_string())?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(base).unwrap_or(entry.path());
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let data = std::fs::read(entry.path()).map_err(|e| format!("{}: {e}", entry.path().display()))?;
        uploads.push(Upload::new(name, data));
    }
    Ok(())
}

fn build_input(args: &Args) -> Result<BatchInput, String> {
    for input in &args.inputs {
        if !input.exists() {
            return Err(format!("file not found: {}", input.display()));
        }
    }

    if args.zip {
        let [archive] = args.inputs.as_slice() else {
            return Err("--zip takes exactly one archive".to_string());
        };
        let bytes = std::fs::read(archive).map_err(|e| format!("{}: {e}", archive.display()))?;
        return Ok(BatchInput::Archive(bytes));
    }

    if args.folder {
        let mut uploads = Vec::new();
        for dir in &args.inputs {
            if !dir.is_dir() {
                return Err(format!("not a folder: {}", dir.display()));
            }
            folder_uploads(dir, &mut uploads)?;
        }
        return Ok(BatchInput::Folder(uploads));
    }

    let mut uploads = Vec::new();
    for file in &args.inputs {
        if !file.is_file() {
            return Err(format!("not a file: {}", file.display()));
        }
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let data = std::fs::read(file).map_err(|e| format!("{}: {e}", file.display()))?;
        uploads.push(Upload::new(name, data));
    }
    Ok(BatchInput::Files(uploads))
}

fn print_summary(outcome: &BatchOutcome) {
    if outcome.converted.is_empty() {
        println!("No files were converted.");
    } else {
        println!("converted: {}", outcome.converted.len());
        for record in &outcome.converted {
            println!("  {} -> {} ({})", record.original, record.pdf, record.kind);
        }
    }
    if !outcome.skipped.is_empty() {
        println!("skipped:");
        for skipped in &outcome.skipped {
            println!("  {skipped}");
        }
    }
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let input = build_input(&args).unwrap_or_else(|e| fail(e));

    if args.show_tree {
        if let BatchInput::Folder(uploads) = &input {
            let tree = FolderTree::from_names(uploads.iter().map(|u| u.name.as_str()));
            if !tree.is_empty() {
                println!("Detected folder structure:");
                print!("{}", tree.render());
            }
        }
    }

    let backend = match (args.backend, Backend::detect()) {
        (BackendArg::Msoffice, _) | (BackendArg::Auto, Backend::MsOffice) => Backend::MsOffice,
        _ => Backend::LibreOffice {
            program: args.soffice.clone(),
        },
    };
    let converter = OfficeConverter::new(backend);

    let request = BatchRequest {
        input,
        options: BatchOptions {
            preserve_structure: !args.flatten,
        },
    };
    let outcome = officebatch_pdf::convert_batch(&request, &converter).unwrap_or_else(|e| fail(e));

    if args.json {
        match serde_json::to_string_pretty(&outcome) {
            Ok(json) => println!("{json}"),
            Err(e) => fail(e),
        }
    } else {
        print_summary(&outcome);
    }

    if let Some(archive) = &outcome.archive {
        if let Err(e) = std::fs::write(&args.output, archive) {
            fail(format!("{}: {e}", args.output.display()));
        }
        if !args.json {
            println!("wrote {}", args.output.display());
        }
    }
}
