// ABOUTME: File system actions: back up, clear, extract and archive a release.
// ABOUTME: Timestamped file names come from an injectable clock.

use snafu::ResultExt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use super::error::{ArchiveSnafu, BackupCollisionSnafu, IoSnafu};
use super::{Action, ActionError, ActionKind, ActionOutcome, Clock};
use crate::archive::{self, ArchiveError};

const BACKUP_STAMP: &str = "%Y-%m-%d %H_%M_%S";
const BACKUP_RETRY_STAMP: &str = "%Y-%m-%d %H_%M_%S_%3f";
const HISTORY_STAMP: &str = "%H%M%S";

/// Zips the current content of the target directory into the backup path.
pub struct BackupCurrentRelease {
    package: String,
    source_dir: PathBuf,
    backup_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl BackupCurrentRelease {
    pub fn new(
        package: impl Into<String>,
        source_dir: impl Into<PathBuf>,
        backup_dir: impl Into<PathBuf>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            package: package.into(),
            source_dir: source_dir.into(),
            backup_dir: backup_dir.into(),
            clock,
        }
    }

    fn backup_path(&self, stamp_format: &str) -> PathBuf {
        let stamp = self.clock.now().format(stamp_format);
        self.backup_dir
            .join(format!("{} before deploy {}.zip", self.package, stamp))
    }
}

impl Action for BackupCurrentRelease {
    fn kind(&self) -> ActionKind {
        ActionKind::BackupCurrentRelease
    }

    fn describe(&self) -> String {
        format!(
            "zip {} into {}",
            self.source_dir.display(),
            self.backup_dir.display()
        )
    }

    fn execute(&self) -> Result<ActionOutcome, ActionError> {
        if !self.source_dir.is_dir() {
            return Ok(ActionOutcome::info(format!(
                "Nothing to back up, {} does not exist.",
                self.source_dir.display()
            )));
        }

        let first = self.backup_path(BACKUP_STAMP);
        let (path, entries) = match archive::create_from_dir(&self.source_dir, &first) {
            Ok(entries) => (first, entries),
            Err(ArchiveError::AlreadyExists(_)) => {
                tracing::debug!("{} exists, retrying with a finer timestamp", first.display());
                let retry = self.backup_path(BACKUP_RETRY_STAMP);
                match archive::create_from_dir(&self.source_dir, &retry) {
                    Ok(entries) => (retry, entries),
                    Err(ArchiveError::AlreadyExists(path)) => {
                        return BackupCollisionSnafu { path }.fail();
                    }
                    Err(e) => return Err(e).context(ArchiveSnafu),
                }
            }
            Err(e) => return Err(e).context(ArchiveSnafu),
        };

        Ok(ActionOutcome::done().with_debug(format!(
            "Backed up {entries} entries to {}",
            path.display()
        )))
    }
}

/// Removes every file and subdirectory under a directory, keeping the directory.
pub struct DeleteDirectoryContent {
    target_dir: PathBuf,
}

impl DeleteDirectoryContent {
    pub fn new(target_dir: impl Into<PathBuf>) -> Self {
        Self {
            target_dir: target_dir.into(),
        }
    }
}

impl Action for DeleteDirectoryContent {
    fn kind(&self) -> ActionKind {
        ActionKind::DeleteDirectoryContent
    }

    fn describe(&self) -> String {
        format!("delete everything under {}", self.target_dir.display())
    }

    fn execute(&self) -> Result<ActionOutcome, ActionError> {
        let entries = match fs::read_dir(&self.target_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(ActionOutcome::info(format!(
                    "{} does not exist, nothing to delete.",
                    self.target_dir.display()
                )));
            }
            Err(e) => {
                return Err(e).context(IoSnafu {
                    operation: "list",
                    path: &self.target_dir,
                });
            }
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry.context(IoSnafu {
                operation: "list",
                path: &self.target_dir,
            })?;
            let path = entry.path();
            // Symlinked directories are unlinked, never descended into.
            let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
            let result = if is_dir {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            result.context(IoSnafu {
                operation: "delete",
                path: &path,
            })?;
            removed += 1;
        }

        Ok(ActionOutcome::done().with_debug(format!(
            "Deleted {removed} entries from {}",
            self.target_dir.display()
        )))
    }
}

/// Extracts the package archive over the target directory.
pub struct ExtractArchive {
    archive: PathBuf,
    target_dir: PathBuf,
}

impl ExtractArchive {
    pub fn new(archive: impl Into<PathBuf>, target_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            target_dir: target_dir.into(),
        }
    }
}

impl Action for ExtractArchive {
    fn kind(&self) -> ActionKind {
        ActionKind::ExtractArchive
    }

    fn describe(&self) -> String {
        format!(
            "extract {} into {}",
            self.archive.display(),
            self.target_dir.display()
        )
    }

    fn execute(&self) -> Result<ActionOutcome, ActionError> {
        fs::create_dir_all(&self.target_dir).context(IoSnafu {
            operation: "create",
            path: &self.target_dir,
        })?;
        let entries = archive::extract(&self.archive, &self.target_dir).context(ArchiveSnafu)?;
        Ok(ActionOutcome::done().with_debug(format!("Extracted {entries} entries")))
    }
}

/// Moves the delivered archive into the release history as `<stem>_<HHmmss>.zip`.
pub struct MoveToReleaseHistory {
    archive: PathBuf,
    history_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl MoveToReleaseHistory {
    pub fn new(
        archive: impl Into<PathBuf>,
        history_dir: impl Into<PathBuf>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            archive: archive.into(),
            history_dir: history_dir.into(),
            clock,
        }
    }

    fn destination(&self) -> PathBuf {
        let stem = self
            .archive
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stamp = self.clock.now().format(HISTORY_STAMP);
        self.history_dir.join(format!("{stem}_{stamp}.zip"))
    }
}

impl Action for MoveToReleaseHistory {
    fn kind(&self) -> ActionKind {
        ActionKind::MoveToReleaseHistory
    }

    fn describe(&self) -> String {
        format!(
            "move {} into {}",
            self.archive.display(),
            self.history_dir.display()
        )
    }

    fn execute(&self) -> Result<ActionOutcome, ActionError> {
        let destination = self.destination();
        fs::rename(&self.archive, &destination).context(IoSnafu {
            operation: "move",
            path: &self.archive,
        })?;
        Ok(ActionOutcome::done().with_debug(format!("Moved to {}", destination.display())))
    }
}
