/// HTTP handlers for the sermon archive and live-status endpoints.
///
/// Thin adapters only: deserialize the request, call the service, map the
/// result to a response. All invariants live in `services`.
pub mod live;
pub mod sermons;

pub use live::{end_live, get_live_status, go_live, poll_live_status, update_special_event};
pub use sermons::{
    add_message_to_series, create_series, get_series_by_id, get_series_by_slug, list_all_sermons,
    list_paged_sermons, move_message, update_message, update_series,
};
