//! Input and output locations
//!
//! `-` stands for stdin/stdout. Named outputs are replaced atomically: the
//! text goes to a temporary file next to the target, which is then renamed
//! over it, so a failed run never leaves a truncated file behind.

use std::fmt;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Placeholder selecting a standard stream
pub const STDIO_PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Stdio,
    File(PathBuf),
}

impl Location {
    pub fn is_stdio(&self) -> bool {
        matches!(self, Location::Stdio)
    }
}

impl From<&str> for Location {
    fn from(value: &str) -> Self {
        if value == STDIO_PLACEHOLDER {
            Location::Stdio
        } else {
            Location::File(PathBuf::from(value))
        }
    }
}

impl From<PathBuf> for Location {
    fn from(value: PathBuf) -> Self {
        if value.as_os_str() == STDIO_PLACEHOLDER {
            Location::Stdio
        } else {
            Location::File(value)
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Stdio => f.write_str("<stdio>"),
            Location::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Read the whole input as UTF-8 text
pub fn read_input(location: &Location) -> io::Result<String> {
    match location {
        Location::Stdio => {
            let mut text = String::new();
            io::stdin().lock().read_to_string(&mut text)?;
            Ok(text)
        }
        Location::File(path) => std::fs::read_to_string(path),
    }
}

/// Destination opened ahead of the run.
///
/// For a named file this creates the temporary sibling up front, so an
/// unwritable destination is reported before any parsing happens. Dropping
/// the sink without [`OutputSink::commit`] removes the temporary and
/// leaves the target alone.
pub enum OutputSink {
    Stdout,
    File { temp: NamedTempFile, target: PathBuf },
}

impl OutputSink {
    pub fn open(location: &Location) -> io::Result<Self> {
        match location {
            Location::Stdio => Ok(OutputSink::Stdout),
            Location::File(path) => {
                let dir = match path.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent,
                    _ => Path::new("."),
                };
                Ok(OutputSink::File {
                    temp: NamedTempFile::new_in(dir)?,
                    target: path.clone(),
                })
            }
        }
    }

    /// Write `contents` in one piece and put it in place
    pub fn commit(self, contents: &str) -> io::Result<()> {
        match self {
            OutputSink::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(contents.as_bytes())?;
                stdout.flush()
            }
            OutputSink::File { mut temp, target } => {
                temp.write_all(contents.as_bytes())?;
                temp.as_file().sync_all()?;
                temp.persist(&target).map_err(|e| e.error)?;
                log::debug!("Wrote {} bytes to {}", contents.len(), target.display());
                Ok(())
            }
        }
    }
}
