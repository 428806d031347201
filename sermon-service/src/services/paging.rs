/// Pagination engine.
///
/// Pure, deterministic slicing over an already-ordered sequence: page 1
/// holds the first five items, every later page holds up to ten. Callers
/// order their items with `order_newest_first` before slicing so repeated
/// polls of the same page always see the same items.
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{AppError, Result};

pub const FIRST_PAGE_SIZE: usize = 5;
pub const PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub total_pages: u32,
    pub total_items: usize,
}

/// Slice one page out of `items`. `page_number` is 1-based.
///
/// A page past the end is not an error: it comes back empty together with
/// the real total-page count so the caller can detect the overrun.
pub fn paginate<T: Clone>(items: &[T], page_number: u32) -> Result<Page<T>> {
    if page_number < 1 {
        return Err(AppError::validation(
            "PageNumber",
            "page numbers are 1-based",
        ));
    }

    let total = items.len();
    let (start, capacity) = if page_number == 1 {
        (0, FIRST_PAGE_SIZE)
    } else {
        (
            FIRST_PAGE_SIZE + (page_number as usize - 2) * PAGE_SIZE,
            PAGE_SIZE,
        )
    };

    let page_items = if start >= total {
        Vec::new()
    } else {
        items[start..total.min(start + capacity)].to_vec()
    };

    Ok(Page {
        items: page_items,
        page_number,
        total_pages: total_pages(total) as u32,
        total_items: total,
    })
}

/// Total page count for a sequence of `total` items. An empty sequence
/// still has exactly one (empty) page.
pub fn total_pages(total: usize) -> usize {
    if total == 0 {
        1
    } else {
        1 + total.saturating_sub(FIRST_PAGE_SIZE).div_ceil(PAGE_SIZE)
    }
}

/// Newest-first delivery order with a stable id tie-break, so pagination
/// stays deterministic across calls even when delivery dates collide.
pub fn order_newest_first<T, F>(items: &mut [T], key: F)
where
    F: Fn(&T) -> (NaiveDate, Uuid),
{
    items.sort_by(|a, b| {
        let (date_a, id_a) = key(a);
        let (date_b, id_b) = key(b);
        date_b.cmp(&date_a).then(id_a.cmp(&id_b))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn page_zero_is_rejected() {
        let err = paginate(&items(3), 0);
        assert!(matches!(err, Err(AppError::Validation { .. })));
    }

    #[test]
    fn empty_sequence_has_exactly_one_empty_page() {
        let page = paginate::<usize>(&[], 1).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn first_page_holds_at_most_five() {
        for n in [0, 1, 4, 5, 6, 30] {
            let page = paginate(&items(n), 1).unwrap();
            assert!(page.items.len() <= FIRST_PAGE_SIZE);
            assert_eq!(page.items.len(), n.min(FIRST_PAGE_SIZE));
        }
    }

    #[test]
    fn later_pages_hold_at_most_ten() {
        for n in 0..40 {
            let all = items(n);
            for page_number in 2..6u32 {
                let page = paginate(&all, page_number).unwrap();
                assert!(page.items.len() <= PAGE_SIZE);
            }
        }
    }

    #[test]
    fn pages_partition_the_sequence() {
        for n in 0..60 {
            let all = items(n);
            let mut reassembled = Vec::new();
            for page_number in 1..=total_pages(n) as u32 {
                reassembled.extend(paginate(&all, page_number).unwrap().items);
            }
            assert_eq!(reassembled, all, "partition failed for n={}", n);

            // The page after the last is empty, same total count.
            let past_end = paginate(&all, total_pages(n) as u32 + 1).unwrap();
            assert!(past_end.items.is_empty());
            assert_eq!(past_end.total_pages as usize, total_pages(n));
        }
    }

    #[test]
    fn twelve_item_worked_example() {
        let all = items(12);

        let p1 = paginate(&all, 1).unwrap();
        assert_eq!(p1.items, items(5));
        assert_eq!(p1.total_pages, 2);

        let p2 = paginate(&all, 2).unwrap();
        assert_eq!(p2.items, (5..12).collect::<Vec<_>>());

        let p3 = paginate(&all, 3).unwrap();
        assert!(p3.items.is_empty());
        assert_eq!(p3.total_pages, 2);
    }

    #[test]
    fn ordering_breaks_date_ties_by_id() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let series_id = Uuid::new_v4();
        let mut messages: Vec<_> = (0..4)
            .map(|i| crate::models::SermonMessage {
                id: Uuid::new_v4(),
                title: format!("msg {}", i),
                speaker: "Speaker".into(),
                date,
                audio_url: None,
                video_url: Some("https://example.org/v".into()),
                passage_ref: None,
                series_id,
            })
            .collect();

        order_newest_first(&mut messages, |m| (m.date, m.id));
        let first_pass: Vec<_> = messages.iter().map(|m| m.id).collect();

        // Shuffle by reversing and re-sorting; order must be reproducible.
        messages.reverse();
        order_newest_first(&mut messages, |m| (m.date, m.id));
        let second_pass: Vec<_> = messages.iter().map(|m| m.id).collect();

        assert_eq!(first_pass, second_pass);
    }
}
