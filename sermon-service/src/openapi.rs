/// OpenAPI documentation for the sermon service.
use utoipa::OpenApi;

use crate::handlers::sermons::{AllSermonsResponse, PagedSermonsResponse, SeriesSummary};
use crate::models::{
    LiveSermons, LiveState, MessageCandidate, SeriesCandidate, SermonMessage, SermonSeries,
    SpecialEvent, SpecialEventCandidate, StreamCandidate, StreamInfo,
};
use crate::services::LiveSnapshot;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sermon Service API",
        version = "1.0.0",
        description = "Backend content service for the sermon archive and the live-stream status board. Public clients read sermon series and messages and poll the live status; the operator pushes go-live, special-event, and end-live transitions.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8085", description = "Development server"),
    ),
    tags(
        (name = "health", description = "Service health checks"),
        (name = "sermons", description = "Sermon series and message archive"),
        (name = "live", description = "Live-stream status board and transitions"),
    ),
    components(schemas(
        SermonSeries,
        SermonMessage,
        SeriesCandidate,
        MessageCandidate,
        SeriesSummary,
        AllSermonsResponse,
        PagedSermonsResponse,
        LiveSermons,
        LiveState,
        StreamInfo,
        SpecialEvent,
        StreamCandidate,
        SpecialEventCandidate,
        LiveSnapshot,
    ))
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn title() -> &'static str {
        "Sermon Service"
    }

    pub fn version() -> &'static str {
        "1.0.0"
    }
}
