use std::time::Duration;

use misctags::{
    core::book::{BookError, RecordBook},
    core::store::StoreError,
    persist::MemoryBlobStore,
    runtime::{
        events::RecordEvent,
        handle::{RuntimeConfig, RuntimeError, spawn_records},
    },
};

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn runtime_create_update_delete_and_events_ordered() {
    let blobs = MemoryBlobStore::new();
    let handle = spawn_records(RecordBook::open_default(blobs.clone()), RuntimeConfig::default());
    let mut sub = handle.subscribe();

    let rec = handle.create(tags(&["alpha", "beta"])).await.expect("create");
    assert!(handle.update(rec.id, tags(&["alpha", "gamma"])).await.expect("update"));
    assert!(handle.delete(rec.id).await.expect("delete"));
    assert!(!handle.delete(rec.id).await.expect("delete again"));

    let mut seen = Vec::new();
    for _ in 0..3 {
        let evt = tokio::time::timeout(Duration::from_secs(1), sub.recv())
            .await
            .expect("event")
            .expect("recv");
        seen.push(evt);
    }

    assert_eq!(
        seen,
        vec![
            RecordEvent::Created { id: rec.id },
            RecordEvent::Updated { id: rec.id },
            RecordEvent::Deleted { id: rec.id },
        ]
    );

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn runtime_serves_search_and_tag_views() {
    let handle = spawn_records(
        RecordBook::open_default(MemoryBlobStore::new()),
        RuntimeConfig::default(),
    );

    handle.create(tags(&["alpha", "beta"])).await.expect("create");
    handle.create(tags(&["alpha", "gamma"])).await.expect("create");

    assert_eq!(handle.search("alpha be").await.expect("search").len(), 1);
    assert_eq!(handle.list().await.expect("list").len(), 2);

    let freqs = handle.frequencies("alpha g").await.expect("freqs");
    assert_eq!(freqs[0].tag, "alpha");
    assert_eq!(freqs.len(), 2);

    let all: Vec<String> = handle.universe().await.expect("universe").into_iter().collect();
    assert_eq!(all, vec!["alpha", "beta", "gamma"]);
    assert_eq!(handle.suggest("al", 5).await.expect("suggest"), vec!["alpha"]);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn duplicate_create_is_declined_not_fatal() {
    let handle = spawn_records(
        RecordBook::open_default(MemoryBlobStore::new()),
        RuntimeConfig::default(),
    );

    handle.create(tags(&["Foo", "Bar"])).await.expect("create");
    let err = handle.create(tags(&["foo", "bar"])).await.unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Book(BookError::Store(StoreError::AlreadyExists { .. }))
    ));

    // The loop keeps serving after a declined command.
    assert_eq!(handle.list().await.expect("list").len(), 1);
    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn import_export_through_runtime() {
    let handle = spawn_records(
        RecordBook::open_default(MemoryBlobStore::new()),
        RuntimeConfig::default(),
    );
    let mut sub = handle.subscribe();

    handle.create(tags(&["one"])).await.expect("create");
    handle.create(tags(&["two"])).await.expect("create");
    let exported = handle.export_json().await.expect("export");

    assert!(matches!(
        handle.import_json("nope").await,
        Err(RuntimeError::Book(BookError::Import(_)))
    ));
    assert_eq!(handle.import_json(exported).await.expect("import"), 2);

    let mut imported = None;
    for _ in 0..4 {
        let evt = tokio::time::timeout(Duration::from_secs(1), sub.recv())
            .await
            .expect("event")
            .expect("recv");
        if let RecordEvent::Imported { count } = evt {
            imported = Some(count);
            break;
        }
    }
    assert_eq!(imported, Some(2));

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn calls_after_shutdown_report_closed_channel() {
    let handle = spawn_records(
        RecordBook::open_default(MemoryBlobStore::new()),
        RuntimeConfig::default(),
    );
    handle.shutdown().await.expect("shutdown");

    let err = handle.list().await.unwrap_err();
    assert!(matches!(err, RuntimeError::ChannelClosed));
}
