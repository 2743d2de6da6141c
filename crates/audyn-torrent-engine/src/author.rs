//! Torrent authoring: walk a file or directory, hash pieces, emit metainfo.

use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use audyn_torrent_core::{CreateTorrent, CreatedTorrent};
use sha1::{Digest, Sha1};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::EngineError;
use crate::metainfo::{Info, InfoFile, Metainfo, ParsedMetainfo};
use crate::types::EngineConfig;

/// Smallest piece length the author will pick or accept.
pub const MIN_PIECE_LENGTH: u32 = 16 * 1024;
/// Largest piece length the author will pick or accept.
pub const MAX_PIECE_LENGTH: u32 = 16 * 1024 * 1024;
const TARGET_PIECE_COUNT: u64 = 1_500;
const READ_CHUNK: usize = 64 * 1024;

/// Pick a power-of-two piece length that keeps the piece count near the target.
#[must_use]
pub fn auto_piece_length(total_size: u64) -> u32 {
    let mut length = MIN_PIECE_LENGTH;
    while length < MAX_PIECE_LENGTH && total_size / u64::from(length) > TARGET_PIECE_COUNT {
        length *= 2;
    }
    length
}

struct SourceFile {
    absolute: PathBuf,
    components: Vec<String>,
}

struct PieceHasher {
    piece_length: usize,
    current: Sha1,
    filled: usize,
    pieces: Vec<u8>,
}

impl PieceHasher {
    fn new(piece_length: usize) -> Self {
        Self {
            piece_length,
            current: Sha1::new(),
            filled: 0,
            pieces: Vec::new(),
        }
    }

    fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let take = (self.piece_length - self.filled).min(data.len());
            self.current.update(&data[..take]);
            self.filled += take;
            data = &data[take..];
            if self.filled == self.piece_length {
                self.finish_piece();
            }
        }
    }

    fn finish_piece(&mut self) {
        let digest = std::mem::replace(&mut self.current, Sha1::new()).finalize();
        self.pieces.extend_from_slice(&digest);
        self.filled = 0;
    }

    fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.finish_piece();
        }
        self.pieces
    }
}

/// Build metainfo for `request`, writing it out when an output path is set.
///
/// Blocking: reads every byte of the source.
///
/// # Errors
///
/// Returns an error when the source is missing, empty, or unreadable, when the
/// piece length override is out of range, or when the output cannot be written.
pub fn author(
    request: &CreateTorrent,
    config: &EngineConfig,
) -> Result<CreatedTorrent, EngineError> {
    let source = request.source.as_path();
    let source_meta = fs::metadata(source).map_err(|err| EngineError::Io {
        operation: "inspect torrent source",
        path: source.to_path_buf(),
        source: err,
    })?;
    let name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or(EngineError::InvalidRequest {
            field: "source",
            reason: "has no file name",
        })?;

    let single_file = source_meta.is_file();
    let files = if single_file {
        vec![SourceFile {
            absolute: source.to_path_buf(),
            components: Vec::new(),
        }]
    } else {
        collect_files(source)?
    };

    let total_size = files
        .iter()
        .map(|file| fs::metadata(&file.absolute).map(|meta| meta.len()))
        .sum::<Result<u64, _>>()
        .map_err(|err| EngineError::Io {
            operation: "inspect torrent source",
            path: source.to_path_buf(),
            source: err,
        })?;
    if total_size == 0 {
        return Err(EngineError::InvalidRequest {
            field: "source",
            reason: "contains no data",
        });
    }

    let piece_length = match request.piece_length.or(config.piece_length) {
        Some(length) => validate_piece_length(length)?,
        None => auto_piece_length(total_size),
    };
    debug!(
        source = %source.display(),
        total_size,
        piece_length,
        files = files.len(),
        "hashing torrent source"
    );

    let mut hasher = PieceHasher::new(piece_length as usize);
    let mut entries = Vec::with_capacity(files.len());
    for file in &files {
        let length = hash_file(&file.absolute, &mut hasher)?;
        entries.push(InfoFile {
            length,
            path: file.components.clone(),
        });
    }
    let pieces = hasher.finish();

    let (length, files) = if single_file {
        (Some(entries.iter().map(|entry| entry.length).sum()), None)
    } else {
        (None, Some(entries))
    };

    let trackers: Vec<String> = request
        .trackers
        .iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect();

    let metainfo = Metainfo {
        info: Info {
            name,
            piece_length: u64::from(piece_length),
            pieces,
            length,
            files,
        },
        announce: trackers.first().cloned(),
        announce_list: (!trackers.is_empty())
            .then(|| trackers.iter().map(|url| vec![url.clone()]).collect()),
        creation_date: Some(chrono::Utc::now().timestamp()),
        comment: Some(
            request
                .comment
                .clone()
                .unwrap_or_else(|| config.comment.clone()),
        ),
        created_by: Some(
            request
                .creator
                .clone()
                .unwrap_or_else(|| config.creator.clone()),
        ),
    };

    let bytes = serde_bencode::to_bytes(&metainfo)
        .map_err(|source| EngineError::BencodeEncode { source })?;
    let parsed = ParsedMetainfo::parse(&bytes)?;

    let written_to = match &request.output {
        Some(output) => {
            write_output(output, &bytes)?;
            Some(output.clone())
        }
        None => None,
    };

    Ok(CreatedTorrent {
        info_hash: parsed.info_hash,
        metainfo: bytes,
        written_to,
    })
}

fn validate_piece_length(length: u32) -> Result<u32, EngineError> {
    if length.is_power_of_two() && (MIN_PIECE_LENGTH..=MAX_PIECE_LENGTH).contains(&length) {
        Ok(length)
    } else {
        Err(EngineError::InvalidRequest {
            field: "piece_length",
            reason: "must be a power of two between 16 KiB and 16 MiB",
        })
    }
}

fn collect_files(root: &Path) -> Result<Vec<SourceFile>, EngineError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| {
            let path = err.path().unwrap_or(root).to_path_buf();
            EngineError::Io {
                operation: "walk torrent source",
                path,
                source: err
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop detected")),
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|_| EngineError::InvalidRequest {
                field: "source",
                reason: "walked outside of the source directory",
            })?;
        let components = relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy().into_owned())
            .collect();
        files.push(SourceFile {
            absolute: entry.path().to_path_buf(),
            components,
        });
    }
    Ok(files)
}

fn hash_file(path: &Path, hasher: &mut PieceHasher) -> Result<u64, EngineError> {
    let io_err = |source| EngineError::Io {
        operation: "read torrent source",
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    let mut buffer = vec![0_u8; READ_CHUNK];
    let mut length = 0_u64;
    loop {
        let read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(io_err(err)),
        };
        hasher.update(&buffer[..read]);
        length += read as u64;
    }
    Ok(length)
}

fn write_output(output: &Path, bytes: &[u8]) -> Result<(), EngineError> {
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| EngineError::Io {
            operation: "create metainfo directory",
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::write(output, bytes).map_err(|source| EngineError::Io {
        operation: "write metainfo file",
        path: output.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn auto_piece_length_scales_with_size() {
        assert_eq!(auto_piece_length(1), MIN_PIECE_LENGTH);
        assert_eq!(auto_piece_length(1_500 * 16 * 1024), MIN_PIECE_LENGTH);
        assert_eq!(auto_piece_length(1_501 * 16 * 1024), 32 * 1024);
        assert_eq!(auto_piece_length(u64::MAX), MAX_PIECE_LENGTH);
    }

    #[test]
    fn piece_hasher_splits_across_updates() {
        let mut hasher = PieceHasher::new(4);
        hasher.update(b"ab");
        hasher.update(b"cdef");
        let pieces = hasher.finish();

        let mut expected = Sha1::digest(b"abcd").to_vec();
        expected.extend_from_slice(&Sha1::digest(b"ef"));
        assert_eq!(pieces, expected);
    }

    #[test]
    fn authors_directory_with_sorted_files() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let root = dir.path().join("album");
        fs::create_dir_all(root.join("disc1"))?;
        fs::write(root.join("b.txt"), b"second")?;
        fs::write(root.join("disc1").join("a.txt"), b"first")?;

        let request = CreateTorrent {
            source: root,
            trackers: vec!["udp://one".into(), " ".into(), "udp://two".into()],
            ..CreateTorrent::default()
        };
        let created = author(&request, &EngineConfig::default())?;
        let parsed = ParsedMetainfo::parse(&created.metainfo)?;

        assert_eq!(parsed.info_hash, created.info_hash);
        assert_eq!(parsed.name(), "album");
        let paths: Vec<_> = parsed.files().iter().map(|file| file.path.clone()).collect();
        assert_eq!(
            paths,
            vec![
                PathBuf::from("album").join("b.txt"),
                PathBuf::from("album").join("disc1").join("a.txt"),
            ]
        );
        assert_eq!(parsed.trackers(), vec!["udp://one", "udp://two"]);
        assert_eq!(parsed.metainfo.created_by.as_deref(), Some("audyn"));
        assert_eq!(
            parsed.piece_hash(0),
            Some(Sha1::digest(b"secondfirst").as_slice())
        );
        assert!(created.written_to.is_none());
        Ok(())
    }

    #[test]
    fn writes_output_and_creates_parent() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let source = dir.path().join("track.flac");
        fs::write(&source, vec![7_u8; 40_000])?;
        let output = dir.path().join("out").join("track.torrent");

        let request = CreateTorrent {
            source,
            output: Some(output.clone()),
            piece_length: Some(MIN_PIECE_LENGTH),
            creator: Some("tester".into()),
            ..CreateTorrent::default()
        };
        let created = author(&request, &EngineConfig::default())?;

        assert_eq!(created.written_to.as_deref(), Some(output.as_path()));
        assert_eq!(fs::read(&output)?, created.metainfo);
        let parsed = ParsedMetainfo::from_path(&output)?;
        assert_eq!(parsed.piece_count(), 3);
        assert_eq!(parsed.metainfo.created_by.as_deref(), Some("tester"));
        assert_eq!(parsed.metainfo.comment.as_deref(), Some("Generated by Audyn"));
        Ok(())
    }

    #[test]
    fn rejects_empty_and_missing_sources() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let empty = dir.path().join("empty.bin");
        fs::write(&empty, b"")?;

        let empty_request = CreateTorrent {
            source: empty,
            ..CreateTorrent::default()
        };
        assert!(matches!(
            author(&empty_request, &EngineConfig::default()),
            Err(EngineError::InvalidRequest { field: "source", .. })
        ));

        let missing_request = CreateTorrent {
            source: dir.path().join("missing"),
            ..CreateTorrent::default()
        };
        assert!(matches!(
            author(&missing_request, &EngineConfig::default()),
            Err(EngineError::Io { .. })
        ));
        Ok(())
    }

    #[test]
    fn rejects_odd_piece_length() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let source = dir.path().join("data.bin");
        fs::write(&source, b"payload")?;
        let request = CreateTorrent {
            source,
            piece_length: Some(20_000),
            ..CreateTorrent::default()
        };
        assert!(matches!(
            author(&request, &EngineConfig::default()),
            Err(EngineError::InvalidRequest {
                field: "piece_length",
                ..
            })
        ));
        Ok(())
    }
}
