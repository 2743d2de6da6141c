//! Core torrent domain types and DTOs shared across the workspace.

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::InfoHashError;

/// SHA-1 digest of a torrent's bencoded `info` dictionary.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InfoHash([u8; 20]);

impl InfoHash {
    /// Digest width in bytes.
    pub const LEN: usize = 20;
    /// Width of the canonical hexadecimal form.
    pub const HEX_LEN: usize = 40;

    #[must_use]
    /// Wrap a raw digest.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    #[must_use]
    /// Raw digest bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    #[must_use]
    /// Canonical 40-character lowercase hexadecimal form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl FromStr for InfoHash {
    type Err = InfoHashError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.len() != Self::HEX_LEN {
            return Err(InfoHashError::Length { len: value.len() });
        }
        let mut bytes = [0_u8; 20];
        hex::decode_to_slice(value, &mut bytes).map_err(|_| InfoHashError::NotHex)?;
        Ok(Self(bytes))
    }
}

impl Display for InfoHash {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.to_hex())
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "InfoHash({})", self.to_hex())
    }
}

impl Serialize for InfoHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for InfoHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifies a torrent in the session either by content or by display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorrentHandle {
    /// Canonical content identifier.
    InfoHash(InfoHash),
    /// Human-readable torrent name as reported by the metainfo.
    Name(String),
}

impl Display for TorrentHandle {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InfoHash(hash) => Display::fmt(hash, formatter),
            Self::Name(name) => formatter.write_str(name),
        }
    }
}

impl From<InfoHash> for TorrentHandle {
    fn from(value: InfoHash) -> Self {
        Self::InfoHash(value)
    }
}

/// Where torrent metainfo should be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorrentSource {
    /// Path to a `.torrent` file on disk.
    File {
        /// Location of the metainfo file.
        path: PathBuf,
    },
    /// Raw bencoded metainfo bytes.
    Metainfo {
        /// Bencoded metainfo payload.
        bytes: Vec<u8>,
    },
}

impl TorrentSource {
    #[must_use]
    /// Convenience constructor for file-based sources.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File { path: path.into() }
    }

    #[must_use]
    /// Convenience constructor for in-memory metainfo.
    pub fn metainfo(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Metainfo {
            bytes: bytes.into(),
        }
    }
}

/// Per-add configuration toggles. Each one switches a single engine feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(clippy::struct_excessive_bools)]
pub struct AddTorrentFlags {
    /// Assume the data is already complete and skip hash checking.
    pub seed_mode: bool,
    /// Map listen ports (`UPnP`/NAT-PMP) so announces are reachable.
    pub announce: bool,
    /// Enable the distributed hash table.
    #[serde(rename = "enableDHT")]
    pub enable_dht: bool,
    /// Enable local service discovery.
    #[serde(rename = "enableLSD")]
    pub enable_lsd: bool,
    /// Enable incoming and outgoing uTP.
    #[serde(rename = "enableUTP")]
    pub enable_utp: bool,
    /// Use the trackers listed in the metainfo.
    pub enable_trackers: bool,
    /// Enable peer exchange for this torrent.
    pub enable_peer_exchange: bool,
}

impl Default for AddTorrentFlags {
    fn default() -> Self {
        Self {
            seed_mode: false,
            announce: false,
            enable_dht: true,
            enable_lsd: true,
            enable_utp: true,
            enable_trackers: false,
            enable_peer_exchange: true,
        }
    }
}

/// Request payload for admitting a torrent into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddTorrent {
    /// Where the metainfo comes from.
    pub source: TorrentSource,
    /// Directory the torrent's content lives in (or will be written to).
    pub save_path: PathBuf,
    /// Feature toggles applied alongside admission.
    pub flags: AddTorrentFlags,
}

/// Lifecycle state reported for a torrent in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TorrentState {
    /// Data is incomplete and the torrent is running.
    Downloading,
    /// Data is complete and the torrent is running.
    Seeding,
    /// Torrent was stopped by the caller.
    Paused,
}

/// Full snapshot of a torrent in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentDescriptor {
    /// Display name; `"Unknown"` when the metainfo carried none.
    pub name: String,
    /// Canonical content identifier.
    pub info_hash: InfoHash,
    /// Current lifecycle state.
    pub state: TorrentState,
    /// Fraction of verified pieces, `0.0..=1.0`.
    pub progress: f64,
    /// Connected peers.
    pub peers: u32,
    /// Connected peers that hold the complete content.
    pub seeds: u32,
    /// Payload upload rate in bytes per second.
    pub upload_rate: u64,
    /// Payload download rate in bytes per second.
    pub download_rate: u64,
    /// Total content size in bytes.
    pub total_size: u64,
    /// Directory holding the torrent's content.
    pub save_path: String,
}

/// Compact per-torrent transfer statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TorrentStats {
    /// Display name.
    pub name: String,
    /// Canonical content identifier.
    pub info_hash: InfoHash,
    /// Current lifecycle state.
    pub state: TorrentState,
    /// Fraction of verified pieces.
    pub progress: f64,
    /// Connected peers.
    pub peers: u32,
    /// Connected seeds.
    pub seeds: u32,
    /// Payload upload rate in bytes per second.
    pub upload_rate: u64,
    /// Payload download rate in bytes per second.
    pub download_rate: u64,
}

impl From<&TorrentDescriptor> for TorrentStats {
    fn from(descriptor: &TorrentDescriptor) -> Self {
        Self {
            name: descriptor.name.clone(),
            info_hash: descriptor.info_hash,
            state: descriptor.state,
            progress: descriptor.progress,
            peers: descriptor.peers,
            seeds: descriptor.seeds,
            upload_rate: descriptor.upload_rate,
            download_rate: descriptor.download_rate,
        }
    }
}

/// Swarm-level view of a torrent, including discovery features in effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct SwarmInfo {
    /// Display name.
    pub name: String,
    /// Canonical content identifier.
    pub info_hash: InfoHash,
    /// Current lifecycle state.
    pub state: TorrentState,
    /// Connected peers.
    pub peers: u32,
    /// Connected seeds.
    pub seeds: u32,
    /// Payload upload rate in bytes per second.
    pub upload_rate: u64,
    /// Payload download rate in bytes per second.
    pub download_rate: u64,
    /// Trackers in use; empty when trackers are disabled for the torrent.
    pub trackers: Vec<String>,
    /// Whether the session DHT is enabled.
    pub dht: bool,
    /// Whether local service discovery is enabled.
    pub lsd: bool,
    /// Whether uTP is enabled.
    pub utp: bool,
    /// Whether peer exchange is enabled for this torrent.
    pub peer_exchange: bool,
}

/// Request to author a new `.torrent` from a file or directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTorrent {
    /// File or directory to describe.
    pub source: PathBuf,
    /// Where to write the metainfo; `None` returns the bytes only.
    pub output: Option<PathBuf>,
    /// Tracker announce URLs, one tier each.
    pub trackers: Vec<String>,
    /// Piece length override; chosen automatically when absent.
    pub piece_length: Option<u32>,
    /// Value for the `created by` field.
    pub creator: Option<String>,
    /// Value for the `comment` field.
    pub comment: Option<String>,
}

/// Outcome of authoring a torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTorrent {
    /// Info-hash of the new torrent.
    pub info_hash: InfoHash,
    /// Bencoded metainfo.
    pub metainfo: Vec<u8>,
    /// Location the metainfo was written to, when an output was requested.
    pub written_to: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0123456789abcdef0123456789abcdef01234567";

    #[test]
    fn info_hash_parses_and_renders_lowercase() -> Result<(), InfoHashError> {
        let hash: InfoHash = SAMPLE.to_uppercase().parse()?;
        assert_eq!(hash.to_hex(), SAMPLE);
        assert_eq!(hash.to_string().len(), InfoHash::HEX_LEN);
        Ok(())
    }

    #[test]
    fn info_hash_rejects_bad_input() {
        assert_eq!(
            "abc".parse::<InfoHash>(),
            Err(InfoHashError::Length { len: 3 })
        );
        let not_hex = "z".repeat(40);
        assert_eq!(not_hex.parse::<InfoHash>(), Err(InfoHashError::NotHex));
    }

    #[test]
    fn add_flags_default_matches_documented_values() {
        let flags = AddTorrentFlags::default();
        assert!(!flags.seed_mode);
        assert!(!flags.announce);
        assert!(flags.enable_dht);
        assert!(flags.enable_lsd);
        assert!(flags.enable_utp);
        assert!(!flags.enable_trackers);
        assert!(flags.enable_peer_exchange);
    }

    #[test]
    fn add_flags_deserialize_with_channel_keys() -> Result<(), serde_json::Error> {
        let flags: AddTorrentFlags =
            serde_json::from_str(r#"{"seedMode": true, "enableDHT": false}"#)?;
        assert!(flags.seed_mode);
        assert!(!flags.enable_dht);
        assert!(flags.enable_lsd);
        Ok(())
    }

    #[test]
    fn descriptor_serializes_hash_as_hex() -> Result<(), Box<dyn std::error::Error>> {
        let descriptor = TorrentDescriptor {
            name: "demo".into(),
            info_hash: SAMPLE.parse()?,
            state: TorrentState::Seeding,
            progress: 1.0,
            peers: 0,
            seeds: 0,
            upload_rate: 0,
            download_rate: 0,
            total_size: 42,
            save_path: "/data".into(),
        };
        let value = serde_json::to_value(&descriptor)?;
        assert_eq!(value["info_hash"], SAMPLE);
        assert_eq!(value["state"], "seeding");
        let stats = TorrentStats::from(&descriptor);
        assert_eq!(stats.name, "demo");
        Ok(())
    }
}
