use super::*;
use assistant::{rules::DEFAULT_REPLY, ResolutionTier, RuleEngine};
use axum::{
    body::{self, Body},
    http::{header, Request},
};
use shared::{
    domain::{DataSourceState, EventRecord},
    error::ErrorCode,
};
use storage::NewEvent;
use tower::ServiceExt;

fn snapshot_app() -> Router {
    build_router(Arc::new(AppState {
        api: ApiContext {
            catalog: CatalogService::snapshot_only(),
            resolver: ResponseResolver::local_only(),
        },
    }))
}

async fn primary_app() -> (Router, Storage) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    for (event_id, name, date) in [
        ("holi", "Holi", "2025-03-14"),
        ("lohri", "Lohri", "2025-01-13"),
    ] {
        storage
            .upsert_event(&NewEvent {
                event_id,
                name,
                description: "",
                date: date.parse().expect("date"),
            })
            .await
            .expect("insert");
    }

    let app = build_router(Arc::new(AppState {
        api: ApiContext {
            catalog: CatalogService::new(Arc::new(storage.clone())),
            resolver: ResponseResolver::local_only(),
        },
    }));
    (app, storage)
}

async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn post_json(uri: &str, value: serde_json::Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(value.to_string()))
        .expect("request")
}

#[tokio::test]
async fn events_fall_back_to_bundled_snapshot_when_primary_is_down() {
    let response = snapshot_app()
        .oneshot(Request::get("/events").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[DATA_SOURCE_HEADER], "fallback");

    let events: Vec<EventRecord> = json_body(response).await;
    assert_eq!(events.len(), 14);
    assert_eq!(events[0].name, "Lohri");
    assert_eq!(events[13].name, "Nukahai");
    assert!(events.windows(2).all(|pair| pair[0].date <= pair[1].date));
}

#[tokio::test]
async fn events_come_from_primary_when_available() {
    let (app, _storage) = primary_app().await;
    let response = app
        .oneshot(Request::get("/events").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.headers()[DATA_SOURCE_HEADER], "primary");

    let events: Vec<serde_json::Value> = json_body(response).await;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["name"], "Lohri");
    assert_eq!(events[0]["date"], "2025-01-13");
    assert_eq!(events[1]["id"], "holi");
}

#[tokio::test]
async fn health_reports_backing_tier() {
    let (app, storage) = primary_app().await;
    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let report: HealthResponse = json_body(response).await;
    assert_eq!(report.data_source, DataSourceState::PrimaryAvailable);

    storage.pool().close().await;
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let report: HealthResponse = json_body(response).await;
    assert_eq!(report.data_source, DataSourceState::PrimaryUnavailable);
}

#[tokio::test]
async fn closed_primary_still_serves_events() {
    let (app, storage) = primary_app().await;
    storage.pool().close().await;

    let response = app
        .oneshot(Request::get("/events").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[DATA_SOURCE_HEADER], "fallback");
    let events: Vec<EventRecord> = json_body(response).await;
    assert_eq!(events.len(), 14);
}

#[tokio::test]
async fn meeting_requires_topic() {
    let app = snapshot_app();
    for body in [
        serde_json::json!({}),
        serde_json::json!({ "topic": "" }),
        serde_json::json!({ "topic": null, "durationMinutes": 30 }),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/meetings", body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let err: ApiError = json_body(response).await;
        assert_eq!(err.code, ErrorCode::InvalidArgument);
    }
}

#[tokio::test]
async fn meeting_descriptor_echoes_topic() {
    let app = snapshot_app();
    let response = app
        .clone()
        .oneshot(post_json(
            "/meetings",
            serde_json::json!({ "topic": "Holi", "durationMinutes": 60 }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let first: serde_json::Value = json_body(response).await;
    assert_eq!(first["topic"], "Holi");
    assert_eq!(first["type"], "google_meet");
    assert_eq!(first["join_url"], "https://meet.google.com/new");
    assert_eq!(first["duration_minutes"], 60);

    let response = app
        .oneshot(post_json(
            "/meetings",
            serde_json::json!({ "topic": "Holi", "duration": 45 }),
        ))
        .await
        .expect("response");
    let second: JoinDescriptor = json_body(response).await;
    assert_eq!(second.duration_minutes, 45);
    assert_ne!(first["meeting_id"], second.meeting_id.0);
}

#[tokio::test]
async fn meeting_body_without_json_content_type_reads_as_empty() {
    let response = snapshot_app()
        .oneshot(Request::post("/meetings").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::InvalidArgument);
    assert_eq!(err.message, "Topic is required");
}

#[tokio::test]
async fn malformed_meeting_requests_are_invalid_arguments() {
    let app = snapshot_app();
    for body in [
        serde_json::json!({ "topic": "Holi", "durationMinutes": -5 }),
        serde_json::json!({ "topic": "Holi", "durationMinutes": 0 }),
        serde_json::json!({ "topic": 42 }),
        serde_json::json!({ "topic": "Holi", "durationMinutes": "long" }),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/meetings", body.clone()))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let err: ApiError = json_body(response).await;
        assert_eq!(err.code, ErrorCode::InvalidArgument, "{body}");
    }

    let request = Request::post("/meetings")
        .header("content-type", "application/json")
        .body(Body::from("{\"topic\": "))
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.code, ErrorCode::InvalidArgument);
}

#[tokio::test]
async fn unreadable_resolve_body_gets_default_reply() {
    let app = snapshot_app();
    let requests = [
        Request::post("/assistant/resolve")
            .body(Body::empty())
            .expect("request"),
        Request::post("/assistant/resolve")
            .header("content-type", "application/json")
            .body(Body::from("not json"))
            .expect("request"),
        post_json("/assistant/resolve", serde_json::json!({ "utterance": 7 })),
    ];
    for request in requests {
        let response = app.clone().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[RESOLUTION_TIER_HEADER], "local_rules");
        let reply: ResolveResponse = json_body(response).await;
        assert_eq!(reply.reply, DEFAULT_REPLY);
    }
}

#[tokio::test]
async fn redirect_points_at_join_url() {
    let response = snapshot_app()
        .oneshot(
            Request::get("/meetings/redirect")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://meet.google.com/new"
    );
}

#[tokio::test]
async fn resolve_answers_every_utterance() {
    let app = snapshot_app();
    for (body, expected) in [
        (
            serde_json::json!({ "utterance": "How do I join a festival?" }),
            RuleEngine::standard().respond("How do I join a festival?"),
        ),
        (
            serde_json::json!({ "message": "I need support", "context": "ctx" }),
            RuleEngine::standard().respond("I need support"),
        ),
        (serde_json::json!({ "utterance": "" }), DEFAULT_REPLY),
        (serde_json::json!({}), DEFAULT_REPLY),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/assistant/resolve", body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[RESOLUTION_TIER_HEADER], "local_rules");
        let reply: ResolveResponse = json_body(response).await;
        assert_eq!(reply.reply, expected);
    }
}

#[tokio::test]
async fn index_platforms_and_suggestions_describe_the_service() {
    let app = snapshot_app();

    let response = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let index: ServiceIndex = json_body(response).await;
    assert_eq!(index.message, api::SERVICE_NAME);
    assert_eq!(index.endpoints.events, "/events");
    assert_eq!(index.data_source, DataSourceState::PrimaryUnavailable);

    let response = app
        .clone()
        .oneshot(
            Request::get("/video-platforms")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let platforms: VideoPlatformsResponse = json_body(response).await;
    assert_eq!(platforms.platforms.len(), 1);
    assert_eq!(platforms.platforms[0].name, "Google Meet");

    let response = app
        .oneshot(
            Request::get("/assistant/suggestions")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let suggestions: SuggestionsResponse = json_body(response).await;
    assert_eq!(suggestions.quick_actions[0], "How do I join a festival?");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let body = serde_json::json!({ "topic": "x".repeat(MAX_REQUEST_BYTES + 1) }).to_string();
    let request = Request::post("/meetings")
        .header("content-type", "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .expect("request");
    let response = snapshot_app().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn caller_resolver_reaches_responder_over_http() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, snapshot_app()).await.expect("serve");
    });

    let responder =
        HttpResponder::new(&format!("http://{addr}"), Duration::from_secs(2)).expect("client");
    let resolution = ResponseResolver::new(Arc::new(responder))
        .resolve_with_tier("Tell me about Google Meet integration")
        .await;

    assert_eq!(resolution.tier, ResolutionTier::Remote);
    assert_eq!(
        resolution.reply,
        RuleEngine::standard().respond("Tell me about Google Meet integration")
    );
}

#[test]
fn error_codes_map_to_statuses() {
    assert_eq!(
        status_for(&ApiError::new(ErrorCode::InvalidArgument, "bad")),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        status_for(&ApiError::new(ErrorCode::Internal, "boom")),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert!(serde_json::from_str::<ErrorCode>("\"not_found\"").is_err());
}
