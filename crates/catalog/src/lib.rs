use std::{collections::HashSet, sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use shared::{
    domain::{DataSourceState, EventId, EventRecord, JoinDescriptor},
    error::ServiceError,
};
use storage::{Storage, StoredEvent};
use tracing::{debug, warn};

pub mod fallback;
pub mod meeting;

pub use meeting::MeetingSynthesizer;

const DEFAULT_PRIMARY_TIMEOUT: Duration = Duration::from_secs(2);

/// Read access to the primary event store.
///
/// Implementations answer readiness per call; the catalog never caches it.
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn is_ready(&self) -> bool;
    async fn fetch_events(&self) -> Result<Vec<StoredEvent>>;
}

#[async_trait]
impl EventSource for Storage {
    async fn is_ready(&self) -> bool {
        self.health_check().await.is_ok()
    }

    async fn fetch_events(&self) -> Result<Vec<StoredEvent>> {
        self.list_events().await
    }
}

/// Events together with the tier that produced them.
#[derive(Debug, Clone)]
pub struct CatalogRead {
    pub source: DataSourceState,
    pub events: Vec<EventRecord>,
}

#[derive(Clone)]
pub struct CatalogService {
    primary: Option<Arc<dyn EventSource>>,
    primary_timeout: Duration,
    meetings: MeetingSynthesizer,
}

impl CatalogService {
    pub fn new(primary: Arc<dyn EventSource>) -> Self {
        Self {
            primary: Some(primary),
            primary_timeout: DEFAULT_PRIMARY_TIMEOUT,
            meetings: MeetingSynthesizer::default(),
        }
    }

    /// A catalog that always serves the bundled snapshot.
    pub fn snapshot_only() -> Self {
        Self {
            primary: None,
            primary_timeout: DEFAULT_PRIMARY_TIMEOUT,
            meetings: MeetingSynthesizer::default(),
        }
    }

    pub fn with_primary_timeout(mut self, timeout: Duration) -> Self {
        self.primary_timeout = timeout;
        self
    }

    pub fn with_meetings(mut self, meetings: MeetingSynthesizer) -> Self {
        self.meetings = meetings;
        self
    }

    pub fn meetings(&self) -> &MeetingSynthesizer {
        &self.meetings
    }

    /// Events ascending by date. Never fails and is never empty.
    pub async fn list_events(&self) -> Vec<EventRecord> {
        self.read_events().await.events
    }

    pub async fn read_events(&self) -> CatalogRead {
        match self.read_primary().await {
            Ok(events) => {
                debug!(count = events.len(), "serving events from primary store");
                CatalogRead {
                    source: DataSourceState::PrimaryAvailable,
                    events,
                }
            }
            Err(error) => {
                warn!(%error, "using fallback event snapshot");
                CatalogRead {
                    source: DataSourceState::PrimaryUnavailable,
                    events: fallback::snapshot(),
                }
            }
        }
    }

    /// Tier a read issued now would be served from. Probes the primary
    /// store on every call.
    pub async fn data_source_state(&self) -> DataSourceState {
        match self.read_primary().await {
            Ok(_) => DataSourceState::PrimaryAvailable,
            Err(_) => DataSourceState::PrimaryUnavailable,
        }
    }

    pub fn synthesize_join_descriptor(
        &self,
        topic: &str,
        duration_minutes: Option<i64>,
    ) -> Result<JoinDescriptor, ServiceError> {
        self.meetings.synthesize(topic, duration_minutes)
    }

    async fn read_primary(&self) -> Result<Vec<EventRecord>, ServiceError> {
        let Some(primary) = &self.primary else {
            return Err(ServiceError::DataSourceUnavailable(
                "no primary store configured".into(),
            ));
        };

        let rows = tokio::time::timeout(self.primary_timeout, async {
            if !primary.is_ready().await {
                return Err(ServiceError::DataSourceUnavailable(
                    "primary store is not ready".into(),
                ));
            }
            primary
                .fetch_events()
                .await
                .map_err(|error| ServiceError::DataSourceUnavailable(format!("{error:#}")))
        })
        .await
        .map_err(|_| {
            ServiceError::DataSourceUnavailable(format!(
                "primary store did not answer within {:?}",
                self.primary_timeout
            ))
        })??;

        into_event_records(rows)
    }
}

/// Validates stored rows; one bad row rejects the whole read.
fn into_event_records(rows: Vec<StoredEvent>) -> Result<Vec<EventRecord>, ServiceError> {
    if rows.is_empty() {
        return Err(ServiceError::DataSourceUnavailable(
            "primary store holds no events".into(),
        ));
    }

    let mut seen = HashSet::new();
    let mut events = Vec::with_capacity(rows.len());
    for row in rows {
        let event_id = row.event_id.trim();
        if event_id.is_empty() {
            return Err(malformed("event without id".into()));
        }
        if !seen.insert(event_id.to_string()) {
            return Err(malformed(format!("duplicate event id '{event_id}'")));
        }
        if row.name.trim().is_empty() {
            return Err(malformed(format!("event '{event_id}' has no name")));
        }
        let date = parse_event_date(&row.date)
            .ok_or_else(|| malformed(format!("event '{event_id}' has invalid date '{}'", row.date)))?;
        events.push(EventRecord {
            id: EventId(event_id.to_string()),
            name: row.name,
            description: row.description,
            date,
        });
    }

    events.sort_by_key(|event| event.date);
    Ok(events)
}

/// Accepts a calendar date or a full RFC 3339 timestamp.
fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    raw.parse::<NaiveDate>()
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

fn malformed(message: String) -> ServiceError {
    ServiceError::DataSourceUnavailable(format!("malformed primary data: {message}"))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
