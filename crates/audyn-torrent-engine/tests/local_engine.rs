use anyhow::Result;
use audyn_test_support::fixtures::{SAMPLE_BLOCK, Workspace};
use audyn_torrent_core::{
    AddTorrent, AddTorrentFlags, CreateTorrent, TorrentEngine, TorrentHandle, TorrentSource,
    TorrentState,
};
use audyn_torrent_engine::{EngineConfig, LocalTorrentEngine, ParsedMetainfo};

fn min_piece() -> Option<u32> {
    u32::try_from(SAMPLE_BLOCK).ok()
}

#[tokio::test]
async fn authored_file_round_trips_through_info_hash() -> Result<()> {
    let workspace = Workspace::new()?;
    let source = workspace.album("session")?;
    let output = workspace.join("out/session.torrent");
    let engine = LocalTorrentEngine::new();

    let created = engine
        .create_torrent(CreateTorrent {
            source,
            output: Some(output.clone()),
            trackers: vec!["udp://tracker.example:1337/announce".into()],
            piece_length: min_piece(),
            ..CreateTorrent::default()
        })
        .await?;
    assert_eq!(created.written_to.as_deref(), Some(output.as_path()));

    let from_file = engine.info_hash(TorrentSource::file(&output)).await?;
    let from_bytes = engine
        .info_hash(TorrentSource::metainfo(created.metainfo.clone()))
        .await?;
    assert_eq!(from_file, created.info_hash);
    assert_eq!(from_bytes, created.info_hash);

    let parsed = ParsedMetainfo::parse(&created.metainfo)?;
    assert_eq!(parsed.name(), "session");
    assert_eq!(parsed.files().len(), 2);
    assert_eq!(parsed.piece_count(), 4);
    assert_eq!(
        parsed.metainfo.created_by.as_deref(),
        Some("audyn"),
        "default creator is stamped"
    );
    Ok(())
}

#[tokio::test]
async fn configured_creator_and_comment_are_stamped() -> Result<()> {
    let workspace = Workspace::new()?;
    let source = workspace.single_file("mix.wav")?;
    let engine = LocalTorrentEngine::with_config(EngineConfig {
        creator: "studio".into(),
        comment: "take one".into(),
        piece_length: min_piece(),
    });

    let created = engine
        .create_torrent(CreateTorrent {
            source,
            ..CreateTorrent::default()
        })
        .await?;
    let parsed = ParsedMetainfo::parse(&created.metainfo)?;
    assert_eq!(parsed.metainfo.created_by.as_deref(), Some("studio"));
    assert_eq!(parsed.metainfo.comment.as_deref(), Some("take one"));
    assert_eq!(parsed.piece_length(), SAMPLE_BLOCK as u64);
    assert!(created.written_to.is_none());
    Ok(())
}

#[tokio::test]
async fn session_lifecycle_by_name() -> Result<()> {
    let workspace = Workspace::new()?;
    let source = workspace.album("set")?;
    let engine = LocalTorrentEngine::new();
    let created = engine
        .create_torrent(CreateTorrent {
            source,
            trackers: vec!["http://tracker.example/announce".into()],
            piece_length: min_piece(),
            ..CreateTorrent::default()
        })
        .await?;

    let hash = engine
        .add_torrent(AddTorrent {
            source: TorrentSource::metainfo(created.metainfo),
            save_path: workspace.path().to_path_buf(),
            flags: AddTorrentFlags {
                enable_trackers: true,
                ..AddTorrentFlags::default()
            },
        })
        .await?;

    let listed = engine.list().await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "set");
    assert_eq!(listed[0].state, TorrentState::Seeding);
    assert_eq!(listed[0].peers, 0);

    let swarm = engine.swarm(hash).await?.ok_or_else(|| anyhow::anyhow!("no swarm"))?;
    assert_eq!(swarm.trackers, vec!["http://tracker.example/announce"]);
    assert!(swarm.dht && swarm.lsd && swarm.utp);

    let by_name = TorrentHandle::Name("set".into());
    assert_eq!(
        engine.save_path(by_name.clone()).await?.as_deref(),
        Some(workspace.path())
    );
    engine.remove_torrent(by_name.clone()).await?;
    assert!(engine.save_path(by_name).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn cleanup_drops_every_torrent() -> Result<()> {
    let workspace = Workspace::new()?;
    let first = workspace.single_file("a.bin")?;
    let second = workspace.single_file("b.bin")?;
    let engine = LocalTorrentEngine::new();

    for source in [first, second] {
        let created = engine
            .create_torrent(CreateTorrent {
                source,
                ..CreateTorrent::default()
            })
            .await?;
        engine
            .add_torrent(AddTorrent {
                source: TorrentSource::metainfo(created.metainfo),
                save_path: workspace.path().to_path_buf(),
                flags: AddTorrentFlags::default(),
            })
            .await?;
    }
    assert_eq!(engine.list().await?.len(), 2);

    engine.cleanup().await?;
    assert!(engine.list().await?.is_empty());
    engine.cleanup().await?;
    Ok(())
}
