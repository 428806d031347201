//! Integration tests: sermon archive flows.
//!
//! Coverage:
//! - series create / fetch by id and slug
//! - paged cross-series listing with the 5-then-10 page shape
//! - guarded message move between series

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use sermon_service::db::InMemoryStore;
use sermon_service::models::{MessageCandidate, SeriesCandidate};
use sermon_service::services::SermonsService;

fn archive() -> SermonsService {
    SermonsService::new(Arc::new(InMemoryStore::new()), Duration::from_secs(1))
}

fn series(name: &str, slug: &str) -> SeriesCandidate {
    SeriesCandidate {
        name: Some(name.into()),
        year: Some("2024".into()),
        start_date: NaiveDate::from_ymd_opt(2024, 6, 1),
        end_date: None,
        slug: Some(slug.into()),
        thumbnail: Some("https://cdn.example.org/thumb.jpg".into()),
        art_url: Some("https://cdn.example.org/art.jpg".into()),
        last_updated: None,
        messages: None,
    }
}

fn message(title: &str, day: u32) -> MessageCandidate {
    MessageCandidate {
        title: Some(title.into()),
        speaker: Some("Pastor Smith".into()),
        date: NaiveDate::from_ymd_opt(2024, 6, day),
        audio_url: Some("https://cdn.example.org/audio.mp3".into()),
        video_url: None,
        passage_ref: Some("Matthew 5:1-12".into()),
    }
}

#[tokio::test]
async fn create_and_fetch_by_id_and_slug() {
    let svc = archive();
    let created = svc.create_series(series("Advent", "advent-2024")).await.unwrap();

    let by_id = svc.get_series(created.id).await.unwrap();
    assert_eq!(by_id, created);

    let by_slug = svc.get_series_by_slug("advent-2024").await.unwrap();
    assert_eq!(by_slug.id, created.id);

    let all = svc.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn paged_listing_follows_the_five_then_ten_shape() {
    let svc = archive();
    let s = svc.create_series(series("Advent", "advent-2024")).await.unwrap();

    for day in 1..=12 {
        svc.add_message(s.id, message(&format!("Day {}", day), day))
            .await
            .unwrap();
    }

    let p1 = svc.list_paged(1).await.unwrap();
    assert_eq!(p1.items.len(), 5);
    assert_eq!(p1.total_pages, 2);
    assert_eq!(p1.total_items, 12);
    // Newest first.
    assert_eq!(p1.items[0].message.title, "Day 12");

    let p2 = svc.list_paged(2).await.unwrap();
    assert_eq!(p2.items.len(), 7);
    assert_eq!(p2.items.last().unwrap().message.title, "Day 1");

    let p3 = svc.list_paged(3).await.unwrap();
    assert!(p3.items.is_empty());
    assert_eq!(p3.total_pages, 2);
}

#[tokio::test]
async fn moving_a_message_keeps_exactly_one_owner() {
    let svc = archive();
    let from = svc.create_series(series("Advent", "advent-2024")).await.unwrap();
    let to = svc.create_series(series("Easter", "easter-2024")).await.unwrap();

    let from = svc.add_message(from.id, message("Moving talk", 5)).await.unwrap();
    let moved_id = from.messages[0].id;

    let to_after = svc.move_message(moved_id, to.id).await.unwrap();
    assert_eq!(to_after.messages.len(), 1);
    assert_eq!(to_after.messages[0].series_id, to.id);

    let from_after = svc.get_series(from.id).await.unwrap();
    assert!(from_after.messages.is_empty());

    // The paged projection sees the message exactly once.
    let page = svc.list_paged(1).await.unwrap();
    let occurrences = page
        .items
        .iter()
        .filter(|m| m.message.id == moved_id)
        .count();
    assert_eq!(occurrences, 1);
}
