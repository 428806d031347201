//! Integration tests: live-stream lifecycle.
//!
//! Drives the state machine end to end over the in-memory store, the same
//! code path the Postgres store uses above the `SermonStore` trait.

use std::sync::Arc;
use std::time::Duration;

use sermon_service::db::InMemoryStore;
use sermon_service::models::{LiveState, SpecialEventCandidate, StreamCandidate};
use sermon_service::services::LiveService;

fn live_service() -> LiveService {
    LiveService::new(Arc::new(InMemoryStore::new()), Duration::from_secs(1), 3)
}

fn stream(title: &str, link: &str) -> StreamCandidate {
    StreamCandidate {
        title: Some(title.into()),
        link: Some(link.into()),
    }
}

#[tokio::test]
async fn full_broadcast_lifecycle() {
    let svc = live_service();

    // Nothing live yet.
    let snap = svc.poll().await.unwrap();
    assert!(!snap.is_live);
    assert!(snap.title.is_none());

    // Operator goes live.
    svc.go_live(stream("Sunday Service", "https://stream.example.org/main"))
        .await
        .unwrap();
    let snap = svc.poll().await.unwrap();
    assert!(snap.is_live);
    assert_eq!(snap.title.as_deref(), Some("Sunday Service"));

    // A special event takes over the board.
    svc.update_special_event(SpecialEventCandidate {
        title: Some("Christmas Eve".into()),
        link: Some("https://stream.example.org/special".into()),
        expiration: None,
    })
    .await
    .unwrap();
    let snap = svc.poll().await.unwrap();
    assert!(snap.is_live);
    assert!(snap.special_event);
    assert_eq!(snap.title.as_deref(), Some("Christmas Eve"));
    assert_eq!(
        snap.link.as_deref(),
        Some("https://stream.example.org/special")
    );

    // The schedule is still there underneath.
    let status = svc.get_status().await.unwrap();
    match status.state {
        LiveState::SpecialEvent { default, .. } => {
            assert_eq!(default.unwrap().link, "https://stream.example.org/main");
        }
        other => panic!("expected SpecialEvent, got {:?}", other),
    }

    // Broadcast ends; nothing leaks into the inactive snapshot.
    svc.set_inactive().await.unwrap();
    let snap = svc.poll().await.unwrap();
    assert!(!snap.is_live);
    assert!(snap.title.is_none());
    assert!(snap.link.is_none());
    assert!(!snap.special_event);
    assert!(snap.special_event_expiration.is_none());

    // Ending twice is fine.
    svc.set_inactive().await.unwrap();
}

#[tokio::test]
async fn go_live_after_special_event_ends_the_override_cleanly() {
    let svc = live_service();

    svc.update_special_event(SpecialEventCandidate {
        title: Some("Vigil".into()),
        link: Some("https://stream.example.org/vigil".into()),
        expiration: None,
    })
    .await
    .unwrap();
    svc.set_inactive().await.unwrap();

    // A fresh go-live starts from a clean slate, not from the old override.
    svc.go_live(stream("Sunday Service", "https://stream.example.org/main"))
        .await
        .unwrap();
    let status = svc.get_status().await.unwrap();
    assert!(matches!(status.state, LiveState::Live { .. }));
}
