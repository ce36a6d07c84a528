use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DataSourceState;

pub const EVENTS_ROUTE: &str = "/events";
pub const HEALTH_ROUTE: &str = "/health";
pub const MEETINGS_ROUTE: &str = "/meetings";
pub const MEETING_REDIRECT_ROUTE: &str = "/meetings/redirect";
pub const VIDEO_PLATFORMS_ROUTE: &str = "/video-platforms";
pub const ASSISTANT_RESOLVE_ROUTE: &str = "/assistant/resolve";
pub const ASSISTANT_SUGGESTIONS_ROUTE: &str = "/assistant/suggestions";

/// Response header naming the tier that served `/events`.
pub const DATA_SOURCE_HEADER: &str = "x-data-source";
/// Response header naming the tier that produced an assistant reply.
pub const RESOLUTION_TIER_HEADER: &str = "x-resolution-tier";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateMeetingRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(
        default,
        rename = "durationMinutes",
        alias = "duration_minutes",
        alias = "duration"
    )]
    pub duration_minutes: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolveRequest {
    #[serde(default, alias = "message")]
    pub utterance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveResponse {
    pub reply: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub data_source: DataSourceState,
    pub video_platform: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointMap {
    pub health: String,
    pub events: String,
    pub create_meeting: String,
    pub meeting_redirect: String,
    pub video_platforms: String,
    pub assistant_resolve: String,
    pub assistant_suggestions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceIndex {
    pub message: String,
    pub status: String,
    pub data_source: DataSourceState,
    pub video_platform: String,
    pub endpoints: EndpointMap,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoPlatform {
    pub name: String,
    pub status: String,
    pub join_url: String,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoPlatformsResponse {
    pub platforms: Vec<VideoPlatform>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub greeting: String,
    pub quick_actions: Vec<String>,
}
