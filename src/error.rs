use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Error {
    InvalidArchive(String),
    InvalidUploadName(String),
    NotADirectory(PathBuf),
    Conversion { path: PathBuf, reason: String },
    ConverterUnavailable(String),
    Zip(zip::result::ZipError),
    Walk(walkdir::Error),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArchive(reason) => write!(f, "the uploaded file is not a valid ZIP file: {reason}"),
            Error::InvalidUploadName(name) => write!(f, "invalid upload name: {name:?}"),
            Error::NotADirectory(path) => write!(f, "not a folder: {}", path.display()),
            Error::Conversion { path, reason } => {
                write!(f, "could not convert {}: {reason}", path.display())
            }
            Error::ConverterUnavailable(reason) => write!(f, "converter unavailable: {reason}"),
            Error::Zip(e) => write!(f, "ZIP error: {e}"),
            Error::Walk(e) => write!(f, "directory walk error: {e}"),
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Zip(e)
    }
}

impl From<walkdir::Error> for Error {
    fn from(e: walkdir::Error) -> Self {
        Error::Walk(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
