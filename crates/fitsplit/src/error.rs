use std::path::{Path, PathBuf};

/// All errors that can occur while splitting or combining FITS files.
#[derive(Debug)]
pub enum Error {
    /// An I/O error from the standard library with no path attached.
    Io(std::io::Error),
    /// An I/O error while opening, reading, or writing `path`.
    File {
        path: PathBuf,
        source: std::io::Error,
    },
    /// One or more input files do not exist.
    MissingInputs(Vec<PathBuf>),
    /// The path has no file name usable for naming output files.
    InvalidPath(PathBuf),
    /// An output file would replace the file being split.
    OverwritesSource(PathBuf),
    /// No terminated FITS header was found anywhere in the input.
    NoHeader,
    /// The source ended before a segment could be copied in full.
    UnexpectedEof,
    /// A map file line could not be parsed.
    InvalidMapEntry { line: usize, text: String },
    /// A map file lists no parts.
    EmptyMap(PathBuf),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {e}"),
            Error::File { path, source } => write!(f, "{}: {source}", path.display()),
            Error::MissingInputs(paths) => {
                write!(f, "input file(s) do not exist:")?;
                for path in paths {
                    write!(f, " {}", path.display())?;
                }
                Ok(())
            }
            Error::InvalidPath(path) => {
                write!(f, "{}: not a usable file name", path.display())
            }
            Error::OverwritesSource(path) => {
                write!(f, "{}: output would overwrite the source file", path.display())
            }
            Error::NoHeader => write!(f, "no FITS header found"),
            Error::UnexpectedEof => write!(f, "unexpected end of file"),
            Error::InvalidMapEntry { line, text } => {
                write!(f, "invalid map entry on line {line}: {text:?}")
            }
            Error::EmptyMap(path) => write!(f, "{}: map file lists no parts", path.display()),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::File { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

/// Attaches the offending path to an I/O result.
pub(crate) trait PathContext<T> {
    fn with_path(self, path: &Path) -> Result<T>;
}

impl<T> PathContext<T> for std::io::Result<T> {
    fn with_path(self, path: &Path) -> Result<T> {
        self.map_err(|source| Error::File {
            path: path.to_path_buf(),
            source,
        })
    }
}
