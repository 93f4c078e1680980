// ABOUTME: Zip codec used by the extract and backup actions.
// ABOUTME: Extracts an archive over a directory and packs a directory into a new archive.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The destination archive already exists; callers pick another name.
    #[error("archive already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("zip error on {path}")]
    Zip {
        path: PathBuf,
        #[source]
        source: ZipError,
    },
}

impl ArchiveError {
    fn io(path: &Path, source: io::Error) -> Self {
        ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn zip(path: &Path, source: ZipError) -> Self {
        ArchiveError::Zip {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Extract every entry of `archive` into `target_dir`, overwriting files
/// that already exist.
pub fn extract(archive: &Path, target_dir: &Path) -> Result<usize, ArchiveError> {
    let file = File::open(archive).map_err(|e| ArchiveError::io(archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| ArchiveError::zip(archive, e))?;
    let entries = zip.len();
    zip.extract(target_dir)
        .map_err(|e| ArchiveError::zip(archive, e))?;
    Ok(entries)
}

/// Pack the contents of `source_dir` into a new archive at `destination`.
///
/// The destination is created exclusively: an existing file yields
/// [`ArchiveError::AlreadyExists`] and is left untouched.
pub fn create_from_dir(source_dir: &Path, destination: &Path) -> Result<usize, ArchiveError> {
    let file = match File::options()
        .write(true)
        .create_new(true)
        .open(destination)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(ArchiveError::AlreadyExists(destination.to_path_buf()));
        }
        Err(e) => return Err(ArchiveError::io(destination, e)),
    };

    let result = write_dir(file, source_dir, destination);
    if result.is_err() {
        let _ = fs::remove_file(destination);
    }
    result
}

fn write_dir(file: File, source_dir: &Path, destination: &Path) -> Result<usize, ArchiveError> {
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();
    let mut count = 0;

    let mut pending = vec![source_dir.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut entries = fs::read_dir(&dir)
            .map_err(|e| ArchiveError::io(&dir, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ArchiveError::io(&dir, e))?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let path = entry.path();
            let name = entry_name(source_dir, &path);
            if path.is_dir() {
                zip.add_directory(format!("{name}/"), options)
                    .map_err(|e| ArchiveError::zip(destination, e))?;
                pending.push(path);
            } else {
                zip.start_file(name, options)
                    .map_err(|e| ArchiveError::zip(destination, e))?;
                let mut input = File::open(&path).map_err(|e| ArchiveError::io(&path, e))?;
                io::copy(&mut input, &mut zip).map_err(|e| ArchiveError::io(&path, e))?;
            }
            count += 1;
        }
    }

    zip.finish().map_err(|e| ArchiveError::zip(destination, e))?;
    Ok(count)
}

/// Archive entry name: path relative to the root, `/` separated.
fn entry_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
