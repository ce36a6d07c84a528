use std::{net::SocketAddr, sync::Arc, time::Duration};

use assistant::{HttpResponder, ResponseResolver};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use catalog::{CatalogService, MeetingSynthesizer};
use shared::{
    domain::JoinDescriptor,
    error::{ApiError, ErrorCode},
    protocol::{
        CreateMeetingRequest, HealthResponse, ResolveRequest, ResolveResponse, ServiceIndex,
        SuggestionsResponse, VideoPlatformsResponse, ASSISTANT_RESOLVE_ROUTE,
        ASSISTANT_SUGGESTIONS_ROUTE, DATA_SOURCE_HEADER, EVENTS_ROUTE, HEALTH_ROUTE,
        MEETINGS_ROUTE, MEETING_REDIRECT_ROUTE, RESOLUTION_TIER_HEADER, VIDEO_PLATFORMS_ROUTE,
    },
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{debug, error, info, warn};

mod api;
mod app_state;
mod config;

use api::ApiContext;
use app_state::AppState;
use config::{load_settings, prepare_database_url, Settings};

const MAX_REQUEST_BYTES: usize = 64 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let api = build_context(&settings).await?;
    let bundled = api::verify_static_tiers(&api)?;
    info!(bundled, "static tiers verified");

    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    match settings.server_public_url.as_deref() {
        Some(public_url) => info!(%addr, public_url, "server listening"),
        None => info!(%addr, "server listening"),
    }
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_context(settings: &Settings) -> anyhow::Result<ApiContext> {
    let meetings = MeetingSynthesizer::new(settings.meeting_join_url.clone());
    let catalog = match open_primary(&settings.database_url).await {
        Some(storage) => CatalogService::new(Arc::new(storage)),
        None => CatalogService::snapshot_only(),
    }
    .with_primary_timeout(Duration::from_millis(settings.primary_timeout_ms))
    .with_meetings(meetings);

    let assistant_timeout = Duration::from_millis(settings.assistant_timeout_ms);
    let resolver = match settings.assistant_upstream_url.as_deref() {
        Some(upstream) => {
            let responder = HttpResponder::new(upstream, assistant_timeout)?;
            info!(endpoint = responder.endpoint(), "assistant upstream configured");
            ResponseResolver::new(Arc::new(responder)).with_timeout(assistant_timeout)
        }
        None => {
            info!("no assistant upstream; answering from local rules");
            ResponseResolver::local_only()
        }
    };

    Ok(ApiContext { catalog, resolver })
}

/// Opens the primary store. An unreachable database still yields a lazy
/// handle so reads can recover without a restart.
async fn open_primary(raw_database_url: &str) -> Option<Storage> {
    let database_url = match prepare_database_url(raw_database_url) {
        Ok(url) => url,
        Err(error) => {
            warn!(error = %format!("{error:#}"), "cannot prepare database url; serving bundled events only");
            return None;
        }
    };

    match Storage::new(&database_url).await {
        Ok(storage) => Some(storage),
        Err(error) => {
            error!(
                %database_url,
                %error,
                "failed to open SQLite database; serving bundled events until it recovers"
            );
            match Storage::connect_lazy(&database_url) {
                Ok(storage) => Some(storage),
                Err(error) => {
                    warn!(%error, "serving bundled events only");
                    None
                }
            }
        }
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route(HEALTH_ROUTE, get(health))
        .route(EVENTS_ROUTE, get(list_events))
        .route(MEETINGS_ROUTE, post(create_meeting))
        .route(MEETING_REDIRECT_ROUTE, get(redirect_to_meeting))
        .route(VIDEO_PLATFORMS_ROUTE, get(video_platforms))
        .route(ASSISTANT_RESOLVE_ROUTE, post(resolve))
        .route(ASSISTANT_SUGGESTIONS_ROUTE, get(suggestions))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .with_state(state)
}

async fn index(State(state): State<Arc<AppState>>) -> Json<ServiceIndex> {
    Json(api::service_index(&state.api).await)
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(api::health(&state.api).await)
}

async fn list_events(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let read = api::list_events(&state.api).await;
    ([(DATA_SOURCE_HEADER, read.source.as_str())], Json(read.events))
}

/// A body sent without a JSON content type reads as `{}`, so it fails on the
/// missing topic. A JSON body that does not fit the request is an invalid
/// argument too.
async fn create_meeting(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateMeetingRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(JsonRejection::MissingJsonContentType(_)) => CreateMeetingRequest::default(),
        Err(rejection @ (JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_))) => {
            return api_error(ApiError::new(
                ErrorCode::InvalidArgument,
                rejection.body_text(),
            ));
        }
        Err(rejection) => return rejection.into_response(),
    };

    match api::create_meeting(&state.api, &req) {
        Ok(descriptor) => Json::<JoinDescriptor>(descriptor).into_response(),
        Err(error) => api_error(error),
    }
}

async fn redirect_to_meeting(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::to(&api::meeting_join_url(&state.api))
}

async fn video_platforms(State(state): State<Arc<AppState>>) -> Json<VideoPlatformsResponse> {
    Json(api::video_platforms(&state.api))
}

/// An unreadable body is answered like an empty utterance.
async fn resolve(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ResolveRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(JsonRejection::BytesRejection(rejection)) => return rejection.into_response(),
        Err(rejection) => {
            debug!(reason = %rejection.body_text(), "unreadable resolve request");
            ResolveRequest::default()
        }
    };
    let resolution = api::resolve_utterance(&state.api, &req).await;
    (
        [(RESOLUTION_TIER_HEADER, resolution.tier.as_str())],
        Json(ResolveResponse {
            reply: resolution.reply,
        }),
    )
        .into_response()
}

async fn suggestions() -> Json<SuggestionsResponse> {
    Json(api::suggestions())
}

fn api_error(error: ApiError) -> Response {
    (status_for(&error), Json(error)).into_response()
}

fn status_for(error: &ApiError) -> StatusCode {
    match error.code {
        ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
