//! On-disk content fixtures backed by temporary directories.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// Piece-sized building block used by the sample content.
pub const SAMPLE_BLOCK: usize = 16 * 1024;

/// Temporary directory that removes itself when dropped.
pub struct Workspace {
    root: TempDir,
}

impl Workspace {
    /// Create an empty workspace.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> Result<Self> {
        let root = TempDir::new().context("failed to create temporary workspace")?;
        Ok(Self { root })
    }

    /// Root directory of the workspace.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Absolute path for `relative` inside the workspace.
    #[must_use]
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.path().join(relative)
    }

    /// Write `contents` to `relative`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parents cannot be written.
    pub fn write(&self, relative: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> Result<PathBuf> {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(path)
    }

    /// A single file spanning several pieces at the minimum piece length.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn single_file(&self, name: &str) -> Result<PathBuf> {
        self.write(name, patterned(SAMPLE_BLOCK * 2 + SAMPLE_BLOCK / 2))
    }

    /// A directory of two tracks whose boundary falls inside a piece.
    ///
    /// # Errors
    ///
    /// Returns an error if the files cannot be written.
    pub fn album(&self, name: &str) -> Result<PathBuf> {
        self.write(
            Path::new(name).join("01 - opening.flac"),
            patterned(SAMPLE_BLOCK + 1_000),
        )?;
        self.write(
            Path::new(name).join("02 - closing.flac"),
            patterned(SAMPLE_BLOCK * 2),
        )?;
        Ok(self.join(name))
    }
}

/// Deterministic, non-repeating-per-piece byte pattern of `len` bytes.
#[must_use]
pub fn patterned(len: usize) -> Vec<u8> {
    (0..len)
        .map(|index| u8::try_from((index * 31 + index / 251) % 251).unwrap_or(0))
        .collect()
}
