//! Various utilities for working with files

use crate::errors::{err_msg, Result, ResultExt};
use log::{debug, trace};
use std::fs;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// A wrapper over a buffered `std::fs::File` containing this file's path.
pub struct File<F> {
    file: F,
    path: PathBuf,
}

/// A wrapper over `std::fs::File::open` with better error reporting.
pub fn open_file<P: AsRef<Path>>(path: P) -> Result<File<BufReader<fs::File>>> {
    let file = fs::File::open(path.as_ref())
        .with_context(|_| format!("Failed to open file for reading: {:?}", path.as_ref()))?;
    Ok(File {
        file: BufReader::new(file),
        path: path.as_ref().to_path_buf(),
    })
}

/// Returns content of the file `path` as a string.
pub fn file_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut f = open_file(path)?;
    f.read_all()
}

/// A wrapper over `std::fs::File::create` with better error reporting.
pub fn create_file<P: AsRef<Path>>(path: P) -> Result<File<BufWriter<fs::File>>> {
    let file = fs::File::create(path.as_ref())
        .with_context(|_| format!("Failed to create file: {:?}", path.as_ref()))?;
    Ok(File {
        file: BufWriter::new(file),
        path: path.as_ref().to_path_buf(),
    })
}

impl<F: Read> File<F> {
    /// Read content of the file to a string
    pub fn read_all(&mut self) -> Result<String> {
        let mut r = String::new();
        self.file
            .read_to_string(&mut r)
            .with_context(|_| format!("Failed to read from file: {:?}", self.path))?;
        Ok(r)
    }
}

impl<F: Write> Write for File<F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf).map_err(|err| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to write to file: {:?}: {}", self.path, err),
            )
        })
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush().map_err(|err| {
            io::Error::new(
                io::ErrorKind::Other,
                format!("Failed to flush file: {:?}: {}", self.path, err),
            )
        })
    }
}

/// Writes `content` to `path` unless the file already has exactly
/// this content. Returns `true` if the file was written.
pub fn save_if_changed<P: AsRef<Path>>(path: P, content: &str) -> Result<bool> {
    let path = path.as_ref();
    if path.is_file() && file_to_string(path)? == content {
        trace!("File not changed: {}", path.display());
        return Ok(false);
    }
    let mut file = create_file(path)?;
    file.write_all(content.as_bytes())
        .with_context(|_| format!("Failed to write file: {:?}", path))?;
    file.flush()
        .with_context(|_| format!("Failed to flush file: {:?}", path))?;
    debug!("File written: {}", path.display());
    Ok(true)
}

/// Deserialize value from TOML file `path`.
pub fn load_toml<P: AsRef<Path>, T: serde::de::DeserializeOwned>(path: P) -> Result<T> {
    let data = file_to_string(path.as_ref())?;
    Ok(toml::from_str(&data)
        .with_context(|_| format!("failed to parse TOML file: {}", path.as_ref().display()))?)
}

/// A wrapper over `std::fs::create_dir_all` with better error reporting
pub fn create_dir_all<P: AsRef<Path>>(path: P) -> Result<()> {
    fs::create_dir_all(path.as_ref()).with_context(|_| {
        format!(
            "Failed to create dirs (with parent components): {:?}",
            path.as_ref()
        )
    })?;
    Ok(())
}

/// A wrapper over `Path::to_str` with better error reporting
pub fn path_to_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| err_msg(format!("Path is not valid unicode: {}", path.display())))
}

/// Returns the canonical, absolute form of `path`. The path must exist.
pub fn canonicalize<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    Ok(dunce::canonicalize(path.as_ref())
        .with_context(|_| format!("failed to canonicalize {}", path.as_ref().display()))?)
}

/// Returns the directory containing the running executable.
pub fn current_exe_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().with_context(|_| "failed to get current executable path")?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| err_msg(format!("executable has no parent dir: {}", exe.display())))
}
