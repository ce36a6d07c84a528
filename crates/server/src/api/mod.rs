use assistant::{rules, Resolution, ResponseResolver};
use catalog::{fallback, CatalogRead, CatalogService};
use chrono::Utc;
use shared::{
    domain::JoinDescriptor,
    error::{ApiError, ServiceError},
    protocol::{
        CreateMeetingRequest, EndpointMap, HealthResponse, ResolveRequest, ServiceIndex,
        SuggestionsResponse, VideoPlatformsResponse, ASSISTANT_RESOLVE_ROUTE,
        ASSISTANT_SUGGESTIONS_ROUTE, EVENTS_ROUTE, HEALTH_ROUTE, MEETINGS_ROUTE,
        MEETING_REDIRECT_ROUTE, VIDEO_PLATFORMS_ROUTE,
    },
};
use tracing::info;

pub const SERVICE_NAME: &str = "Virtual Festival Hub API";

#[derive(Clone)]
pub struct ApiContext {
    pub catalog: CatalogService,
    pub resolver: ResponseResolver,
}

pub async fn list_events(ctx: &ApiContext) -> CatalogRead {
    let read = ctx.catalog.read_events().await;
    info!(
        count = read.events.len(),
        tier = read.source.as_str(),
        "sending events"
    );
    read
}

pub async fn health(ctx: &ApiContext) -> HealthResponse {
    HealthResponse {
        status: "OK".into(),
        data_source: ctx.catalog.data_source_state().await,
        video_platform: catalog::meeting::PLATFORM_NAME.into(),
        timestamp: Utc::now(),
    }
}

pub async fn service_index(ctx: &ApiContext) -> ServiceIndex {
    ServiceIndex {
        message: SERVICE_NAME.into(),
        status: "Running".into(),
        data_source: ctx.catalog.data_source_state().await,
        video_platform: catalog::meeting::PLATFORM_NAME.into(),
        endpoints: EndpointMap {
            health: HEALTH_ROUTE.into(),
            events: EVENTS_ROUTE.into(),
            create_meeting: format!("{MEETINGS_ROUTE} (POST)"),
            meeting_redirect: MEETING_REDIRECT_ROUTE.into(),
            video_platforms: VIDEO_PLATFORMS_ROUTE.into(),
            assistant_resolve: format!("{ASSISTANT_RESOLVE_ROUTE} (POST)"),
            assistant_suggestions: ASSISTANT_SUGGESTIONS_ROUTE.into(),
        },
        timestamp: Utc::now(),
    }
}

pub fn create_meeting(
    ctx: &ApiContext,
    req: &CreateMeetingRequest,
) -> Result<JoinDescriptor, ApiError> {
    let topic = req.topic.as_deref().unwrap_or_default();
    ctx.catalog
        .synthesize_join_descriptor(topic, req.duration_minutes)
        .map_err(ApiError::from)
}

pub fn video_platforms(ctx: &ApiContext) -> VideoPlatformsResponse {
    VideoPlatformsResponse {
        platforms: vec![ctx.catalog.meetings().platform()],
    }
}

pub fn meeting_join_url(ctx: &ApiContext) -> String {
    ctx.catalog.meetings().join_url()
}

/// Answers with the caller's context when one is given.
pub async fn resolve_utterance(ctx: &ApiContext, req: &ResolveRequest) -> Resolution {
    match req.context.as_deref().map(str::trim) {
        Some(context) if !context.is_empty() => {
            ctx.resolver
                .clone()
                .with_context(context)
                .resolve_with_tier(&req.utterance)
                .await
        }
        _ => ctx.resolver.resolve_with_tier(&req.utterance).await,
    }
}

pub fn suggestions() -> SuggestionsResponse {
    SuggestionsResponse {
        greeting: rules::GREETING.into(),
        quick_actions: rules::QUICK_ACTIONS.iter().map(|q| q.to_string()).collect(),
    }
}

/// Fails when a static tier could not answer.
pub fn verify_static_tiers(ctx: &ApiContext) -> Result<usize, ServiceError> {
    let bundled = fallback::verify()?;
    ctx.resolver.rules().verify()?;
    Ok(bundled)
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
