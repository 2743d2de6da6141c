use std::path::PathBuf;

use audyn_torrent_core::{
    AddTorrent, CreateTorrent, CreatedTorrent, InfoHash, SwarmInfo,
    TorrentError, TorrentHandle, TorrentResult, TorrentSource,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::author::author;
use crate::command::{EngineCommand, Responder};
use crate::error::{EngineError, op_failed};
use crate::metainfo::ParsedMetainfo;
use crate::session::{LocalSession, SessionTorrent};
use crate::types::EngineConfig;
use crate::verify::{Verification, verify_pieces};

pub(crate) fn spawn(config: EngineConfig, mut commands: mpsc::Receiver<EngineCommand>) {
    tokio::spawn(async move {
        let mut worker = Worker::new(config);
        while let Some(command) = commands.recv().await {
            worker.handle(command).await;
        }
        debug!("engine command channel closed; worker exiting");
    });
}

struct Worker {
    config: EngineConfig,
    session: Option<LocalSession>,
}

impl Worker {
    const fn new(config: EngineConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    fn session_mut(&mut self) -> &mut LocalSession {
        self.session.get_or_insert_with(|| {
            info!("torrent session initialized");
            LocalSession::default()
        })
    }

    async fn handle(&mut self, command: EngineCommand) {
        let operation = command.operation();
        debug!(operation, "engine command received");
        match command {
            EngineCommand::InfoHash { source, respond_to } => {
                let result = load_metainfo(operation, source)
                    .await
                    .map(|parsed| parsed.info_hash);
                reply(operation, respond_to, result);
            }
            EngineCommand::Add {
                request,
                respond_to,
            } => {
                let result = self.handle_add(*request).await;
                reply(operation, respond_to, result);
            }
            EngineCommand::Create {
                request,
                respond_to,
            } => {
                let result = self.handle_create(*request).await;
                reply(operation, respond_to, result);
            }
            EngineCommand::Remove { handle, respond_to } => {
                let result = self.handle_remove(&handle);
                reply(operation, respond_to, result);
            }
            EngineCommand::List { respond_to } => {
                let descriptors = self
                    .session
                    .as_ref()
                    .map(LocalSession::descriptors)
                    .unwrap_or_default();
                reply(operation, respond_to, Ok(descriptors));
            }
            EngineCommand::Swarm {
                info_hash,
                respond_to,
            } => {
                let swarm: Option<SwarmInfo> = self
                    .session
                    .as_ref()
                    .and_then(|session| session.swarm(&info_hash));
                reply(operation, respond_to, Ok(swarm));
            }
            EngineCommand::SavePath { handle, respond_to } => {
                let path: Option<PathBuf> = self
                    .session
                    .as_ref()
                    .and_then(|session| session.save_path(&handle));
                reply(operation, respond_to, Ok(path));
            }
            EngineCommand::SetPaused {
                info_hash,
                paused,
                respond_to,
            } => {
                let result = self.handle_set_paused(info_hash, paused);
                reply(operation, respond_to, result);
            }
            EngineCommand::IsActive {
                info_hash,
                respond_to,
            } => {
                let active = self
                    .session
                    .as_ref()
                    .is_some_and(|session| session.is_active(&info_hash));
                reply(operation, respond_to, Ok(active));
            }
            EngineCommand::Cleanup { respond_to } => {
                if let Some(session) = self.session.take() {
                    info!(torrents = session.len(), "torrent session cleaned up");
                }
                reply(operation, respond_to, Ok(()));
            }
        }
    }

    async fn handle_add(&mut self, request: AddTorrent) -> TorrentResult<InfoHash> {
        let AddTorrent {
            source,
            save_path,
            flags,
        } = request;
        let parsed = load_metainfo("add_torrent", source).await?;
        let info_hash = parsed.info_hash;
        if self.session_mut().contains(&info_hash) {
            return Err(TorrentError::Duplicate { info_hash });
        }

        let verification = if flags.seed_mode {
            Verification::assume_complete(parsed.piece_count())
        } else {
            let check = parsed.clone();
            let root = save_path.clone();
            run_blocking("add_torrent", Some(info_hash), move || {
                verify_pieces(&check, &root)
            })
            .await?
        };

        let name = parsed.name().to_string();
        let session = self.session_mut();
        session.insert(SessionTorrent {
            parsed,
            save_path,
            flags,
            verification,
            paused: false,
        })?;
        let settings = session.settings();
        info!(
            %info_hash,
            name = %name,
            verified = verification.verified,
            pieces = verification.total,
            seed_mode = flags.seed_mode,
            dht = settings.enable_dht.is_enabled(),
            lsd = settings.enable_lsd.is_enabled(),
            utp = settings.utp_enabled(),
            "torrent added"
        );
        Ok(info_hash)
    }

    async fn handle_create(&self, request: CreateTorrent) -> TorrentResult<CreatedTorrent> {
        let config = self.config.clone();
        let created = run_blocking("create_torrent", None, move || author(&request, &config))
            .await?;
        info!(
            info_hash = %created.info_hash,
            written_to = ?created.written_to,
            bytes = created.metainfo.len(),
            "torrent created"
        );
        Ok(created)
    }

    fn handle_remove(&mut self, handle: &TorrentHandle) -> TorrentResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(TorrentError::NotFound {
                handle: handle.to_string(),
            });
        };
        let removed = session.remove(handle)?;
        info!(info_hash = %removed.parsed.info_hash, "torrent removed");
        Ok(())
    }

    fn handle_set_paused(&mut self, info_hash: InfoHash, paused: bool) -> TorrentResult<()> {
        let Some(session) = self.session.as_mut() else {
            return Err(TorrentError::NotFound {
                handle: info_hash.to_hex(),
            });
        };
        session.set_paused(&info_hash, paused)?;
        info!(%info_hash, paused, "torrent state changed");
        Ok(())
    }
}

fn reply<T>(operation: &'static str, respond_to: Responder<T>, result: TorrentResult<T>) {
    if let Err(err) = &result {
        warn!(operation, error = %err.detail(), "engine command failed");
    }
    if respond_to.send(result).is_err() {
        debug!(operation, "engine caller went away before the reply");
    }
}

async fn load_metainfo(
    operation: &'static str,
    source: TorrentSource,
) -> TorrentResult<ParsedMetainfo> {
    run_blocking(operation, None, move || match source {
        TorrentSource::File { path } => ParsedMetainfo::from_path(&path),
        TorrentSource::Metainfo { bytes } => ParsedMetainfo::parse(&bytes),
    })
    .await
}

async fn run_blocking<T, F>(
    operation: &'static str,
    info_hash: Option<InfoHash>,
    task: F,
) -> TorrentResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, EngineError> + Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(EngineError::InvalidRequest { field, reason })) => {
            Err(TorrentError::InvalidInput { field, reason })
        }
        Ok(Err(err)) => Err(op_failed(operation, info_hash, err)),
        Err(source) => Err(op_failed(
            operation,
            info_hash,
            EngineError::TaskFailed { source },
        )),
    }
}
