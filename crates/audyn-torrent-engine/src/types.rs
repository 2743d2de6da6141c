//! Strongly typed settings and defaults exposed by the in-process engine.

use audyn_torrent_core::AddTorrentFlags;

/// Default `created by` value stamped into authored torrents.
pub const DEFAULT_CREATOR: &str = "audyn";
/// Default `comment` value stamped into authored torrents.
pub const DEFAULT_COMMENT: &str = "Generated by Audyn";

/// Wrapper for boolean flags to avoid pedantic lint churn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Toggle(pub bool);

impl Toggle {
    #[must_use]
    /// Whether the toggle is enabled.
    pub const fn is_enabled(self) -> bool {
        self.0
    }
}

impl From<bool> for Toggle {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl From<Toggle> for bool {
    fn from(toggle: Toggle) -> Self {
        toggle.0
    }
}

/// Session-wide discovery and transport settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    /// Whether the distributed hash table is enabled for peer discovery.
    pub enable_dht: Toggle,
    /// Whether local service discovery is enabled.
    pub enable_lsd: Toggle,
    /// Whether `UPnP` port mapping is enabled.
    pub enable_upnp: Toggle,
    /// Whether NAT-PMP port mapping is enabled.
    pub enable_natpmp: Toggle,
    /// Whether outgoing uTP is enabled.
    pub enable_outgoing_utp: Toggle,
    /// Whether incoming uTP is enabled.
    pub enable_incoming_utp: Toggle,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            enable_dht: true.into(),
            enable_lsd: true.into(),
            enable_upnp: true.into(),
            enable_natpmp: true.into(),
            enable_outgoing_utp: true.into(),
            enable_incoming_utp: true.into(),
        }
    }
}

impl SessionSettings {
    /// Fold the session-wide parts of an add request into the settings.
    ///
    /// Port mapping follows `announce`; both uTP directions follow `enable_utp`.
    pub const fn apply_add_flags(&mut self, flags: &AddTorrentFlags) {
        self.enable_dht = Toggle(flags.enable_dht);
        self.enable_lsd = Toggle(flags.enable_lsd);
        self.enable_upnp = Toggle(flags.announce);
        self.enable_natpmp = Toggle(flags.announce);
        self.enable_outgoing_utp = Toggle(flags.enable_utp);
        self.enable_incoming_utp = Toggle(flags.enable_utp);
    }

    #[must_use]
    /// Whether uTP is usable in at least one direction.
    pub const fn utp_enabled(&self) -> bool {
        self.enable_outgoing_utp.is_enabled() || self.enable_incoming_utp.is_enabled()
    }
}

/// Static configuration for the in-process engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// `created by` value used when an authoring request does not supply one.
    pub creator: String,
    /// `comment` value used when an authoring request does not supply one.
    pub comment: String,
    /// Piece length used when an authoring request does not supply one.
    pub piece_length: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            creator: DEFAULT_CREATOR.to_string(),
            comment: DEFAULT_COMMENT.to_string(),
            piece_length: None,
        }
    }
}
