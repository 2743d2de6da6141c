//! Typed gateway requests and the parsing step that produces them.
//!
//! Parsing validates arguments and applies flag defaults. It never touches
//! the engine, so every invalid-argument failure happens before delegation.

use std::path::PathBuf;

use audyn_torrent_core::{AddTorrent, AddTorrentFlags, InfoHash, TorrentHandle, TorrentSource};

use crate::args::{
    ArgumentBag, Arguments, flag, optional_bytes, optional_str, required_str, string_list,
};
use crate::error::GatewayError;

const FILE_OR_BYTES: &str = "filePath or torrentBytes";
const HASH_OR_NAME: &str = "infoHash or name";

/// One strongly typed variant per gateway operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayRequest {
    /// `getVersion`
    GetVersion,
    /// `addTorrent`
    AddTorrent(AddTorrent),
    /// `createTorrent`
    CreateTorrent {
        /// File or directory to describe.
        source: PathBuf,
        /// Where to write the metainfo; bytes are returned when absent.
        output: Option<PathBuf>,
        /// Tracker announce URLs.
        trackers: Vec<String>,
    },
    /// `createTorrentInAppDir`
    CreateTorrentInAppDir {
        /// File or directory to describe.
        source: PathBuf,
        /// Tracker announce URLs.
        trackers: Vec<String>,
    },
    /// `removeTorrent`
    RemoveTorrent(TorrentHandle),
    /// `removeTorrentByInfoHash`
    RemoveTorrentByInfoHash(InfoHash),
    /// `removeTorrentByName`
    RemoveTorrentByName(String),
    /// `getTorrentStats`
    GetTorrentStats,
    /// `getAllTorrents`
    GetAllTorrents,
    /// `getSwarmInfo`
    GetSwarmInfo(InfoHash),
    /// `getInfoHash`
    GetInfoHash(TorrentSource),
    /// `getSavePath`
    GetSavePath(TorrentHandle),
    /// `getTorrentSavePathByName`
    GetTorrentSavePathByName(String),
    /// `startTorrent`
    StartTorrent(InfoHash),
    /// `stopTorrent`
    StopTorrent(InfoHash),
    /// `isTorrentActive`
    IsTorrentActive(InfoHash),
    /// `cleanupSession`
    CleanupSession,
}

impl GatewayRequest {
    /// Validate `args` for `method` and build the typed request.
    ///
    /// # Errors
    ///
    /// Returns `NotImplemented` for unknown methods and an invalid-argument
    /// error when the arguments do not satisfy the method's contract.
    pub fn parse(method: &str, args: &Arguments) -> Result<Self, GatewayError> {
        let request = match method {
            "getVersion" => Self::GetVersion,
            "addTorrent" => Self::AddTorrent(parse_add(args.as_bag()?)?),
            "createTorrent" => {
                let bag = args.as_bag()?;
                Self::CreateTorrent {
                    source: PathBuf::from(required_str(bag, "filePath")?),
                    output: optional_str(bag, "outputPath").map(PathBuf::from),
                    trackers: string_list(bag, "trackers"),
                }
            }
            "createTorrentInAppDir" => {
                let bag = args.as_bag()?;
                Self::CreateTorrentInAppDir {
                    source: PathBuf::from(required_str(bag, "filePath")?),
                    trackers: string_list(bag, "trackers"),
                }
            }
            "removeTorrent" => Self::RemoveTorrent(parse_handle(args.as_bag()?)?),
            "removeTorrentByInfoHash" => {
                Self::RemoveTorrentByInfoHash(parse_info_hash(args.as_bag()?)?)
            }
            "removeTorrentByName" => {
                Self::RemoveTorrentByName(args.text_or_field("torrentName")?.to_string())
            }
            "getTorrentStats" => Self::GetTorrentStats,
            "getAllTorrents" => Self::GetAllTorrents,
            "getSwarmInfo" => Self::GetSwarmInfo(parse_info_hash(args.as_bag()?)?),
            "getInfoHash" => Self::GetInfoHash(parse_info_hash_source(args)?),
            "getSavePath" => Self::GetSavePath(parse_handle(args.as_bag()?)?),
            "getTorrentSavePathByName" => {
                Self::GetTorrentSavePathByName(args.text_or_field("torrentName")?.to_string())
            }
            "startTorrent" => Self::StartTorrent(parse_info_hash(args.as_bag()?)?),
            "stopTorrent" => Self::StopTorrent(parse_info_hash(args.as_bag()?)?),
            "isTorrentActive" => Self::IsTorrentActive(parse_info_hash(args.as_bag()?)?),
            "cleanupSession" => Self::CleanupSession,
            other => {
                return Err(GatewayError::NotImplemented {
                    method: other.to_string(),
                });
            }
        };
        Ok(request)
    }

    /// Method name the request answers to.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::GetVersion => "getVersion",
            Self::AddTorrent(_) => "addTorrent",
            Self::CreateTorrent { .. } => "createTorrent",
            Self::CreateTorrentInAppDir { .. } => "createTorrentInAppDir",
            Self::RemoveTorrent(_) => "removeTorrent",
            Self::RemoveTorrentByInfoHash(_) => "removeTorrentByInfoHash",
            Self::RemoveTorrentByName(_) => "removeTorrentByName",
            Self::GetTorrentStats => "getTorrentStats",
            Self::GetAllTorrents => "getAllTorrents",
            Self::GetSwarmInfo(_) => "getSwarmInfo",
            Self::GetInfoHash(_) => "getInfoHash",
            Self::GetSavePath(_) => "getSavePath",
            Self::GetTorrentSavePathByName(_) => "getTorrentSavePathByName",
            Self::StartTorrent(_) => "startTorrent",
            Self::StopTorrent(_) => "stopTorrent",
            Self::IsTorrentActive(_) => "isTorrentActive",
            Self::CleanupSession => "cleanupSession",
        }
    }
}

fn parse_add(bag: &ArgumentBag) -> Result<AddTorrent, GatewayError> {
    let source = parse_source(bag)?;
    let save_path = PathBuf::from(required_str(bag, "savePath")?);
    let defaults = AddTorrentFlags::default();
    let flags = AddTorrentFlags {
        seed_mode: flag(bag, "seedMode", defaults.seed_mode),
        announce: flag(bag, "announce", defaults.announce),
        enable_dht: flag(bag, "enableDHT", defaults.enable_dht),
        enable_lsd: flag(bag, "enableLSD", defaults.enable_lsd),
        enable_utp: flag(bag, "enableUTP", defaults.enable_utp),
        enable_trackers: flag(bag, "enableTrackers", defaults.enable_trackers),
        enable_peer_exchange: flag(bag, "enablePeerExchange", defaults.enable_peer_exchange),
    };
    Ok(AddTorrent {
        source,
        save_path,
        flags,
    })
}

fn parse_source(bag: &ArgumentBag) -> Result<TorrentSource, GatewayError> {
    match (optional_str(bag, "filePath"), optional_bytes(bag, "torrentBytes")) {
        (Some(path), None) => Ok(TorrentSource::file(path)),
        (None, Some(bytes)) => Ok(TorrentSource::metainfo(bytes)),
        (Some(_), Some(_)) => Err(GatewayError::ConflictingFields {
            fields: FILE_OR_BYTES,
        }),
        (None, None) => Err(GatewayError::MissingOneOf {
            fields: FILE_OR_BYTES,
        }),
    }
}

fn parse_info_hash_source(args: &Arguments) -> Result<TorrentSource, GatewayError> {
    match args {
        Arguments::Text(path) if !path.is_empty() => Ok(TorrentSource::file(path)),
        Arguments::Bag(bag) => parse_source(bag),
        Arguments::None | Arguments::Text(_) => Err(GatewayError::MissingOneOf {
            fields: FILE_OR_BYTES,
        }),
    }
}

fn parse_info_hash(bag: &ArgumentBag) -> Result<InfoHash, GatewayError> {
    required_str(bag, "infoHash")?
        .parse()
        .map_err(|_| GatewayError::InvalidValue {
            field: "infoHash",
            reason: "must be a 40-character hexadecimal info-hash",
        })
}

fn parse_handle(bag: &ArgumentBag) -> Result<TorrentHandle, GatewayError> {
    let has_hash = optional_str(bag, "infoHash").is_some();
    match (has_hash, optional_str(bag, "name")) {
        (true, None) => parse_info_hash(bag).map(TorrentHandle::InfoHash),
        (false, Some(name)) => Ok(TorrentHandle::Name(name.to_string())),
        (true, Some(_)) => Err(GatewayError::ConflictingFields {
            fields: HASH_OR_NAME,
        }),
        (false, None) => Err(GatewayError::MissingOneOf {
            fields: HASH_OR_NAME,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ArgValue;

    const HASH: &str = "0123456789abcdef0123456789abcdef01234567";

    fn parse(method: &str, args: Arguments) -> Result<GatewayRequest, GatewayError> {
        GatewayRequest::parse(method, &args)
    }

    #[test]
    fn add_applies_documented_defaults() -> Result<(), GatewayError> {
        let request = parse(
            "addTorrent",
            Arguments::bag([
                ("filePath", ArgValue::from("/t/a.torrent")),
                ("savePath", ArgValue::from("/music")),
            ]),
        )?;
        let GatewayRequest::AddTorrent(add) = request else {
            panic!("expected addTorrent, got {request:?}");
        };
        assert_eq!(add.source, TorrentSource::file("/t/a.torrent"));
        assert_eq!(add.save_path, PathBuf::from("/music"));
        assert!(!add.flags.seed_mode);
        assert!(!add.flags.announce);
        assert!(add.flags.enable_dht);
        assert!(add.flags.enable_lsd);
        assert!(add.flags.enable_utp);
        assert!(!add.flags.enable_trackers);
        assert!(add.flags.enable_peer_exchange);
        Ok(())
    }

    #[test]
    fn add_honours_explicit_flags_and_bytes() -> Result<(), GatewayError> {
        let request = parse(
            "addTorrent",
            Arguments::bag([
                ("torrentBytes", ArgValue::Bytes(b"d4:infodee".to_vec())),
                ("savePath", ArgValue::from("/music")),
                ("seedMode", ArgValue::Bool(true)),
                ("enableDHT", ArgValue::Bool(false)),
                ("enableTrackers", ArgValue::Bool(true)),
            ]),
        )?;
        let GatewayRequest::AddTorrent(add) = request else {
            panic!("expected addTorrent, got {request:?}");
        };
        assert_eq!(add.source, TorrentSource::metainfo(b"d4:infodee".to_vec()));
        assert!(add.flags.seed_mode);
        assert!(!add.flags.enable_dht);
        assert!(add.flags.enable_trackers);
        assert!(add.flags.enable_lsd);
        Ok(())
    }

    #[test]
    fn add_rejects_missing_and_malformed_fields() {
        let cases = [
            (
                Arguments::bag([("savePath", ArgValue::from("/music"))]),
                "one of filePath or torrentBytes is required",
            ),
            (
                Arguments::bag([("filePath", ArgValue::from("/t/a.torrent"))]),
                "savePath is required",
            ),
            (
                Arguments::bag([
                    ("filePath", ArgValue::from("/t/a.torrent")),
                    ("savePath", ArgValue::from("")),
                ]),
                "savePath is required",
            ),
            (Arguments::Text("/t/a.torrent".into()), "expected map arguments"),
        ];
        for (args, message) in cases {
            let err = parse("addTorrent", args).err();
            assert_eq!(err.map(|err| err.message()).as_deref(), Some(message));
        }
    }

    #[test]
    fn wrongly_typed_optional_values_take_their_defaults() -> Result<(), GatewayError> {
        let request = parse(
            "addTorrent",
            Arguments::bag([
                ("filePath", ArgValue::from("/t/a.torrent")),
                ("savePath", ArgValue::from("/music")),
                ("seedMode", ArgValue::from("yes")),
                ("enableDHT", ArgValue::Int(0)),
                ("torrentBytes", ArgValue::from("not bytes")),
            ]),
        )?;
        let GatewayRequest::AddTorrent(add) = request else {
            panic!("expected addTorrent, got {request:?}");
        };
        assert_eq!(add.source, TorrentSource::file("/t/a.torrent"));
        assert_eq!(add.flags, AddTorrentFlags::default());

        assert_eq!(
            parse(
                "createTorrent",
                Arguments::bag([
                    ("filePath", ArgValue::from("/music/album")),
                    ("outputPath", ArgValue::Bool(true)),
                    ("trackers", ArgValue::Int(5)),
                ]),
            )?,
            GatewayRequest::CreateTorrent {
                source: PathBuf::from("/music/album"),
                output: None,
                trackers: Vec::new(),
            }
        );
        Ok(())
    }

    #[test]
    fn create_keeps_optional_output_and_string_trackers() -> Result<(), GatewayError> {
        let request = parse(
            "createTorrent",
            Arguments::bag([
                ("filePath", ArgValue::from("/music/album")),
                (
                    "trackers",
                    ArgValue::List(vec![ArgValue::from("udp://t"), ArgValue::Bool(true)]),
                ),
            ]),
        )?;
        assert_eq!(
            request,
            GatewayRequest::CreateTorrent {
                source: PathBuf::from("/music/album"),
                output: None,
                trackers: vec!["udp://t".into()],
            }
        );
        Ok(())
    }

    #[test]
    fn name_methods_accept_bare_strings_or_bags() -> Result<(), GatewayError> {
        assert_eq!(
            parse("removeTorrentByName", Arguments::Text("album".into()))?,
            GatewayRequest::RemoveTorrentByName("album".into())
        );
        assert_eq!(
            parse(
                "getTorrentSavePathByName",
                Arguments::bag([("torrentName", ArgValue::from("album"))])
            )?,
            GatewayRequest::GetTorrentSavePathByName("album".into())
        );
        assert!(matches!(
            parse("removeTorrentByName", Arguments::None),
            Err(GatewayError::MissingField {
                field: "torrentName"
            })
        ));
        Ok(())
    }

    #[test]
    fn handles_resolve_hash_or_name() -> Result<(), GatewayError> {
        let by_hash = parse("removeTorrent", Arguments::bag([("infoHash", ArgValue::from(HASH))]))?;
        let GatewayRequest::RemoveTorrent(TorrentHandle::InfoHash(hash)) = by_hash else {
            panic!("expected hash handle, got {by_hash:?}");
        };
        assert_eq!(hash.to_hex(), HASH);

        assert_eq!(
            parse("getSavePath", Arguments::bag([("name", ArgValue::from("album"))]))?,
            GatewayRequest::GetSavePath(TorrentHandle::Name("album".into()))
        );
        assert!(matches!(
            parse("removeTorrent", Arguments::bag(Vec::<(String, ArgValue)>::new())),
            Err(GatewayError::MissingOneOf { .. })
        ));
        Ok(())
    }

    #[test]
    fn info_hash_fields_must_be_hex() {
        for value in ["xyz", "0123", ""] {
            let err = parse("stopTorrent", Arguments::bag([("infoHash", ArgValue::from(value))]));
            assert!(err.is_err_and(|err| err.code() == "INVALID_ARGUMENT"));
        }
    }

    #[test]
    fn get_info_hash_accepts_bare_path() -> Result<(), GatewayError> {
        assert_eq!(
            parse("getInfoHash", Arguments::Text("/t/a.torrent".into()))?,
            GatewayRequest::GetInfoHash(TorrentSource::file("/t/a.torrent"))
        );
        assert!(parse("getInfoHash", Arguments::None).is_err());
        Ok(())
    }

    #[test]
    fn argument_free_methods_ignore_arguments() -> Result<(), GatewayError> {
        assert_eq!(parse("getVersion", Arguments::None)?, GatewayRequest::GetVersion);
        assert_eq!(
            parse("cleanupSession", Arguments::Text("ignored".into()))?,
            GatewayRequest::CleanupSession
        );
        Ok(())
    }

    #[test]
    fn unknown_methods_are_not_implemented() {
        let err = parse("teleport", Arguments::None).err();
        assert_eq!(err.map(|err| err.code()), Some("NOT_IMPLEMENTED"));
    }

    #[test]
    fn parsed_requests_report_their_method() -> Result<(), GatewayError> {
        for method in ["getVersion", "getTorrentStats", "getAllTorrents", "cleanupSession"] {
            assert_eq!(parse(method, Arguments::None)?.method(), method);
        }
        Ok(())
    }
}
