//! Piece verification of on-disk data against a torrent's piece digests.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use sha1::{Digest, Sha1};

use crate::error::EngineError;
use crate::metainfo::ParsedMetainfo;

/// Result of checking existing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verification {
    /// Pieces whose on-disk bytes match their digest.
    pub verified: usize,
    /// Pieces in the torrent.
    pub total: usize,
}

impl Verification {
    #[must_use]
    /// Treat every piece as present (seed mode).
    pub const fn assume_complete(total: usize) -> Self {
        Self {
            verified: total,
            total,
        }
    }

    #[must_use]
    /// Whether all pieces are present.
    pub const fn is_complete(&self) -> bool {
        self.verified == self.total
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    /// Fraction of verified pieces; an empty torrent counts as complete.
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.verified as f64 / self.total as f64
        }
    }
}

/// Bytes read from disk per step while hashing a piece.
const READ_CHUNK: usize = 64 * 1024;

/// Hash every piece found under `save_path`.
///
/// Missing or short files make the pieces they overlap count as absent.
/// Blocking: reads all present data in fixed-size chunks.
///
/// # Errors
///
/// Returns an error for IO failures other than a file being absent or short.
pub fn verify_pieces(
    parsed: &ParsedMetainfo,
    save_path: &Path,
) -> Result<Verification, EngineError> {
    let mut reader = PieceReader {
        parsed,
        save_path,
        handles: std::iter::repeat_with(|| None)
            .take(parsed.files().len())
            .collect(),
        chunk: vec![0; READ_CHUNK],
    };
    let mut verified = 0;

    for index in 0..parsed.piece_count() {
        let start = index as u64 * parsed.piece_length();
        let end = start + parsed.piece_size(index);
        let mut hasher = Sha1::new();
        if reader.hash_range(start, end, &mut hasher)?
            && parsed
                .piece_hash(index)
                .is_some_and(|expected| hasher.finalize().as_slice() == expected)
        {
            verified += 1;
        }
    }

    Ok(Verification {
        verified,
        total: parsed.piece_count(),
    })
}

struct PieceReader<'a> {
    parsed: &'a ParsedMetainfo,
    save_path: &'a Path,
    /// Lazily opened handles; `Some(None)` marks a file that is absent.
    handles: Vec<Option<Option<File>>>,
    chunk: Vec<u8>,
}

impl PieceReader<'_> {
    /// Feed content bytes `start..end` into `hasher`; `false` when any are missing.
    fn hash_range(
        &mut self,
        start: u64,
        end: u64,
        hasher: &mut Sha1,
    ) -> Result<bool, EngineError> {
        for (slot, file) in self.handles.iter_mut().zip(self.parsed.files()) {
            let file_end = file.offset + file.length;
            if file.length == 0 || file_end <= start || file.offset >= end {
                continue;
            }
            let path = self.save_path.join(&file.path);
            let handle = slot.get_or_insert_with(|| File::open(&path).ok());
            let Some(handle) = handle.as_mut() else {
                return Ok(false);
            };
            let io_err = |source| EngineError::Io {
                operation: "read torrent data",
                path: path.clone(),
                source,
            };

            handle
                .seek(SeekFrom::Start(start.saturating_sub(file.offset)))
                .map_err(io_err)?;
            let mut remaining = file_end.min(end) - file.offset.max(start);
            while remaining > 0 {
                let want = usize::try_from(remaining)
                    .map_or(self.chunk.len(), |left| left.min(self.chunk.len()));
                let buffer = &mut self.chunk[..want];
                match handle.read_exact(buffer) {
                    Ok(()) => hasher.update(&*buffer),
                    Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Ok(false),
                    Err(err) => return Err(io_err(err)),
                }
                remaining -= want as u64;
            }
        }
        Ok(true)
    }
}
