/// Business logic layer.
///
/// - `sermons`: series/message operations behind the consistency guard
/// - `live`: the live-stream state machine
/// - `paging`: pure pagination over ordered message sequences
pub mod live;
pub mod paging;
pub mod sermons;

pub use live::{LiveService, LiveSnapshot};
pub use paging::{paginate, Page};
pub use sermons::SermonsService;
