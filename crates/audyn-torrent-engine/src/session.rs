//! In-memory session registry owned by the engine worker.

use std::collections::BTreeMap;
use std::path::PathBuf;

use audyn_torrent_core::{
    AddTorrentFlags, InfoHash, SwarmInfo, TorrentDescriptor, TorrentError, TorrentHandle,
    TorrentResult, TorrentState,
};

use crate::metainfo::ParsedMetainfo;
use crate::types::SessionSettings;
use crate::verify::Verification;

const UNKNOWN_NAME: &str = "Unknown";

/// A torrent admitted into the session.
#[derive(Debug, Clone)]
pub(crate) struct SessionTorrent {
    pub(crate) parsed: ParsedMetainfo,
    pub(crate) save_path: PathBuf,
    pub(crate) flags: AddTorrentFlags,
    pub(crate) verification: Verification,
    pub(crate) paused: bool,
}

impl SessionTorrent {
    fn state(&self) -> TorrentState {
        if self.paused {
            TorrentState::Paused
        } else if self.verification.is_complete() {
            TorrentState::Seeding
        } else {
            TorrentState::Downloading
        }
    }

    fn display_name(&self) -> &str {
        match self.parsed.name() {
            "" => UNKNOWN_NAME,
            name => name,
        }
    }

    fn descriptor(&self) -> TorrentDescriptor {
        TorrentDescriptor {
            name: self.display_name().to_string(),
            info_hash: self.parsed.info_hash,
            state: self.state(),
            progress: self.verification.progress(),
            peers: 0,
            seeds: 0,
            upload_rate: 0,
            download_rate: 0,
            total_size: self.parsed.total_size(),
            save_path: self.save_path.display().to_string(),
        }
    }
}

/// Registry of admitted torrents plus session-wide settings.
#[derive(Debug, Default)]
pub(crate) struct LocalSession {
    settings: SessionSettings,
    torrents: BTreeMap<InfoHash, SessionTorrent>,
}

impl LocalSession {
    pub(crate) const fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub(crate) fn contains(&self, info_hash: &InfoHash) -> bool {
        self.torrents.contains_key(info_hash)
    }

    pub(crate) fn len(&self) -> usize {
        self.torrents.len()
    }

    pub(crate) fn insert(&mut self, torrent: SessionTorrent) -> TorrentResult<InfoHash> {
        let info_hash = torrent.parsed.info_hash;
        if self.contains(&info_hash) {
            return Err(TorrentError::Duplicate { info_hash });
        }
        self.settings.apply_add_flags(&torrent.flags);
        self.torrents.insert(info_hash, torrent);
        Ok(info_hash)
    }

    fn resolve(&self, handle: &TorrentHandle) -> Option<&SessionTorrent> {
        match handle {
            TorrentHandle::InfoHash(hash) => self.torrents.get(hash),
            TorrentHandle::Name(name) => self
                .torrents
                .values()
                .find(|torrent| torrent.display_name() == name.as_str()),
        }
    }

    pub(crate) fn remove(&mut self, handle: &TorrentHandle) -> TorrentResult<SessionTorrent> {
        let info_hash = self
            .resolve(handle)
            .map(|torrent| torrent.parsed.info_hash)
            .ok_or_else(|| not_found(handle))?;
        self.torrents
            .remove(&info_hash)
            .ok_or_else(|| not_found(handle))
    }

    pub(crate) fn descriptors(&self) -> Vec<TorrentDescriptor> {
        self.torrents.values().map(SessionTorrent::descriptor).collect()
    }

    pub(crate) fn swarm(&self, info_hash: &InfoHash) -> Option<SwarmInfo> {
        let torrent = self.torrents.get(info_hash)?;
        let descriptor = torrent.descriptor();
        Some(SwarmInfo {
            name: descriptor.name,
            info_hash: descriptor.info_hash,
            state: descriptor.state,
            peers: descriptor.peers,
            seeds: descriptor.seeds,
            upload_rate: descriptor.upload_rate,
            download_rate: descriptor.download_rate,
            trackers: if torrent.flags.enable_trackers {
                torrent.parsed.trackers()
            } else {
                Vec::new()
            },
            dht: self.settings.enable_dht.is_enabled(),
            lsd: self.settings.enable_lsd.is_enabled(),
            utp: self.settings.utp_enabled(),
            peer_exchange: torrent.flags.enable_peer_exchange,
        })
    }

    pub(crate) fn save_path(&self, handle: &TorrentHandle) -> Option<PathBuf> {
        self.resolve(handle).map(|torrent| torrent.save_path.clone())
    }

    pub(crate) fn set_paused(&mut self, info_hash: &InfoHash, paused: bool) -> TorrentResult<()> {
        let torrent = self
            .torrents
            .get_mut(info_hash)
            .ok_or_else(|| not_found(&TorrentHandle::InfoHash(*info_hash)))?;
        torrent.paused = paused;
        Ok(())
    }

    pub(crate) fn is_active(&self, info_hash: &InfoHash) -> bool {
        self.torrents
            .get(info_hash)
            .is_some_and(|torrent| !torrent.paused)
    }
}

fn not_found(handle: &TorrentHandle) -> TorrentError {
    TorrentError::NotFound {
        handle: handle.to_string(),
    }
}
