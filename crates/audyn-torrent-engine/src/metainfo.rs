//! Bencoded `.torrent` metainfo: typed decoding, validation, and info-hash derivation.
//!
//! The info-hash is taken over the exact bytes of the `info` value as they
//! appear in the input, so re-encoding quirks never change a torrent's identity.

use std::path::{Component, Path, PathBuf};

use audyn_torrent_core::InfoHash;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::EngineError;

const MAX_NESTING: usize = 64;
const PIECE_HASH_LEN: usize = 20;
/// Largest piece length accepted from foreign metainfo.
pub const MAX_ACCEPTED_PIECE_LENGTH: u64 = 128 * 1024 * 1024;

/// Top-level metainfo dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metainfo {
    /// Content description hashed into the info-hash.
    pub info: Info,
    /// Primary tracker URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub announce: Option<String>,
    /// Tracker tiers.
    #[serde(
        rename = "announce-list",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub announce_list: Option<Vec<Vec<String>>>,
    /// Unix timestamp the torrent was authored at.
    #[serde(
        rename = "creation date",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub creation_date: Option<i64>,
    /// Free-form comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Authoring tool.
    #[serde(rename = "created by", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// The `info` dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// Suggested file name (single-file) or root directory (multi-file).
    pub name: String,
    /// Bytes per piece.
    #[serde(rename = "piece length")]
    pub piece_length: u64,
    /// Concatenated 20-byte SHA-1 piece digests.
    #[serde(with = "serde_bytes")]
    pub pieces: Vec<u8>,
    /// Content length for single-file torrents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u64>,
    /// File list for multi-file torrents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<InfoFile>>,
}

/// One entry of a multi-file `files` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InfoFile {
    /// File length in bytes.
    pub length: u64,
    /// Path components below the torrent's root directory.
    pub path: Vec<String>,
}

/// A file of the torrent laid out in the piece address space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Location relative to the save path.
    pub path: PathBuf,
    /// File length in bytes.
    pub length: u64,
    /// Offset of the first byte within the concatenated content.
    pub offset: u64,
}

/// Metainfo that passed validation, with its derived identity and layout.
#[derive(Debug, Clone)]
pub struct ParsedMetainfo {
    /// Canonical content identifier.
    pub info_hash: InfoHash,
    /// Decoded metainfo.
    pub metainfo: Metainfo,
    files: Vec<FileEntry>,
    total_size: u64,
}

impl ParsedMetainfo {
    /// Decode and validate bencoded metainfo.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload is not valid bencode, lacks required
    /// keys, or describes an inconsistent piece layout.
    pub fn parse(bytes: &[u8]) -> Result<Self, EngineError> {
        let metainfo: Metainfo = serde_bencode::from_bytes(bytes)
            .map_err(|source| EngineError::BencodeDecode { source })?;
        let info_bytes = info_span(bytes)?;
        let info_hash = InfoHash::from_bytes(Sha1::digest(info_bytes).into());

        let files = layout(&metainfo.info, &info_hash)?;
        let total_size = files.iter().map(|file| file.length).sum::<u64>();
        validate_pieces(&metainfo.info, total_size)?;

        Ok(Self {
            info_hash,
            metainfo,
            files,
            total_size,
        })
    }

    /// Read and parse a `.torrent` file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or fails [`Self::parse`].
    pub fn from_path(path: &Path) -> Result<Self, EngineError> {
        let bytes = std::fs::read(path).map_err(|source| EngineError::Io {
            operation: "read metainfo file",
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&bytes)
    }

    #[must_use]
    /// Torrent name as recorded in the metainfo.
    pub fn name(&self) -> &str {
        &self.metainfo.info.name
    }

    #[must_use]
    /// Files in piece order.
    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    #[must_use]
    /// Total content size in bytes.
    pub const fn total_size(&self) -> u64 {
        self.total_size
    }

    #[must_use]
    /// Bytes per piece.
    pub const fn piece_length(&self) -> u64 {
        self.metainfo.info.piece_length
    }

    #[must_use]
    /// Number of pieces.
    pub fn piece_count(&self) -> usize {
        self.metainfo.info.pieces.len() / PIECE_HASH_LEN
    }

    #[must_use]
    /// Expected digest of a piece.
    pub fn piece_hash(&self, index: usize) -> Option<&[u8]> {
        let start = index.checked_mul(PIECE_HASH_LEN)?;
        self.metainfo.info.pieces.get(start..start + PIECE_HASH_LEN)
    }

    #[must_use]
    /// Length of a piece; the last piece may be short.
    pub fn piece_size(&self, index: usize) -> u64 {
        let offset = index as u64 * self.piece_length();
        self.piece_length()
            .min(self.total_size.saturating_sub(offset))
    }

    #[must_use]
    /// Tracker URLs in tier order without duplicates.
    pub fn trackers(&self) -> Vec<String> {
        let mut trackers: Vec<String> = Vec::new();
        let tiers = self.metainfo.announce_list.iter().flatten().flatten();
        for url in self.metainfo.announce.iter().chain(tiers) {
            if !url.is_empty() && !trackers.contains(url) {
                trackers.push(url.clone());
            }
        }
        trackers
    }
}

fn layout(info: &Info, info_hash: &InfoHash) -> Result<Vec<FileEntry>, EngineError> {
    // Nameless torrents keep their files directly under the save path; a
    // nameless single file is stored under its info-hash.
    let root = if info.name.is_empty() {
        None
    } else {
        Some(safe_component(&info.name)?)
    };
    match (&info.length, &info.files) {
        (Some(length), None) => Ok(vec![FileEntry {
            path: root.map_or_else(|| PathBuf::from(info_hash.to_hex()), PathBuf::from),
            length: *length,
            offset: 0,
        }]),
        (None, Some(files)) => {
            let mut entries = Vec::with_capacity(files.len());
            let mut offset = 0_u64;
            for file in files {
                if file.path.is_empty() {
                    return Err(EngineError::InvalidMetainfo {
                        reason: "file path must not be empty",
                    });
                }
                let mut path = root.map(PathBuf::from).unwrap_or_default();
                for component in &file.path {
                    path.push(safe_component(component)?);
                }
                entries.push(FileEntry {
                    path,
                    length: file.length,
                    offset,
                });
                offset = offset
                    .checked_add(file.length)
                    .ok_or(EngineError::InvalidMetainfo {
                        reason: "total size overflows",
                    })?;
            }
            Ok(entries)
        }
        _ => Err(EngineError::InvalidMetainfo {
            reason: "exactly one of length or files is required",
        }),
    }
}

fn safe_component(value: &str) -> Result<&str, EngineError> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(value),
        _ => Err(EngineError::InvalidMetainfo {
            reason: "file path component is not a plain name",
        }),
    }
}

fn validate_pieces(info: &Info, total_size: u64) -> Result<(), EngineError> {
    if info.piece_length == 0 {
        return Err(EngineError::InvalidMetainfo {
            reason: "piece length must be positive",
        });
    }
    if info.piece_length > MAX_ACCEPTED_PIECE_LENGTH {
        return Err(EngineError::InvalidMetainfo {
            reason: "piece length exceeds 128 MiB",
        });
    }
    if info.pieces.len() % PIECE_HASH_LEN != 0 {
        return Err(EngineError::InvalidMetainfo {
            reason: "pieces must be a multiple of 20 bytes",
        });
    }
    let expected = total_size.div_ceil(info.piece_length);
    if expected != (info.pieces.len() / PIECE_HASH_LEN) as u64 {
        return Err(EngineError::InvalidMetainfo {
            reason: "piece count does not match content size",
        });
    }
    Ok(())
}

/// Locate the raw bytes of the top-level `info` value.
fn info_span(input: &[u8]) -> Result<&[u8], EngineError> {
    if input.first() != Some(&b'd') {
        return Err(EngineError::InvalidMetainfo {
            reason: "metainfo must be a dictionary",
        });
    }
    let mut pos = 1;
    while input.get(pos) != Some(&b'e') {
        let (key, value_start) = read_string(input, pos)?;
        let value_end = skip_value(input, value_start, 0)?;
        if key == b"info" {
            return Ok(&input[value_start..value_end]);
        }
        pos = value_end;
    }
    Err(EngineError::InvalidMetainfo {
        reason: "info dictionary missing",
    })
}

fn truncated() -> EngineError {
    EngineError::InvalidMetainfo {
        reason: "truncated bencode",
    }
}

fn read_string(input: &[u8], pos: usize) -> Result<(&[u8], usize), EngineError> {
    let rest = input.get(pos..).ok_or_else(truncated)?;
    let colon = rest
        .iter()
        .position(|byte| *byte == b':')
        .ok_or_else(truncated)?;
    let digits = &rest[..colon];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(EngineError::InvalidMetainfo {
            reason: "malformed string length",
        });
    }
    let len = digits.iter().try_fold(0_usize, |acc, digit| {
        acc.checked_mul(10)?.checked_add(usize::from(digit - b'0'))
    });
    let len = len.ok_or(EngineError::InvalidMetainfo {
        reason: "string length overflows",
    })?;
    let start = pos + colon + 1;
    let end = start.checked_add(len).ok_or_else(truncated)?;
    let value = input.get(start..end).ok_or_else(truncated)?;
    Ok((value, end))
}

fn skip_value(input: &[u8], pos: usize, depth: usize) -> Result<usize, EngineError> {
    if depth > MAX_NESTING {
        return Err(EngineError::InvalidMetainfo {
            reason: "bencode nested too deeply",
        });
    }
    match input.get(pos).ok_or_else(truncated)? {
        b'i' => {
            let rest = input.get(pos + 1..).ok_or_else(truncated)?;
            let end = rest
                .iter()
                .position(|byte| *byte == b'e')
                .ok_or_else(truncated)?;
            Ok(pos + 1 + end + 1)
        }
        b'l' => {
            let mut cursor = pos + 1;
            while input.get(cursor).ok_or_else(truncated)? != &b'e' {
                cursor = skip_value(input, cursor, depth + 1)?;
            }
            Ok(cursor + 1)
        }
        b'd' => {
            let mut cursor = pos + 1;
            while input.get(cursor).ok_or_else(truncated)? != &b'e' {
                let (_, value_start) = read_string(input, cursor)?;
                cursor = skip_value(input, value_start, depth + 1)?;
            }
            Ok(cursor + 1)
        }
        b'0'..=b'9' => read_string(input, pos).map(|(_, end)| end),
        _ => Err(EngineError::InvalidMetainfo {
            reason: "unexpected bencode token",
        }),
    }
}
