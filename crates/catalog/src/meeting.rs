use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{bail, Context};
use chrono::Utc;
use shared::{
    domain::{DirectLinks, JoinDescriptor, MeetingId, MeetingKind},
    error::ServiceError,
    protocol::VideoPlatform,
};
use tracing::{info, warn};
use url::Url;
use uuid::Uuid;

/// Join target used whenever the configured one cannot be used.
pub const DEFAULT_JOIN_URL: &str = "https://meet.google.com/new";
pub const DEFAULT_DURATION_MINUTES: u32 = 60;
pub const PLATFORM_NAME: &str = "Google Meet";

const DOWNLOAD_APP_URL: &str = "https://meet.google.com/download";
const LEARN_MORE_URL: &str = "https://support.google.com/meet/";
const WEB_VERSION_URL: &str = "https://meet.google.com";
const INSTRUCTIONS: &str = "Click the link to create a new Google Meet. Share the generated meeting link with participants.";
const FALLBACK_INSTRUCTIONS: &str = "Click to create a new Google Meet";
const FALLBACK_NOTICE: &str = "Using fallback meeting link";

const FEATURES: &[&str] = &[
    "No account required to join",
    "Up to 100 participants",
    "Screen sharing",
    "Chat functionality",
    "Recording available",
];

const PLATFORM_FEATURES: &[&str] = &["Free", "No signup required to join", "100 participants"];

static MEETING_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Turns a topic into a join descriptor without any network I/O.
#[derive(Debug, Clone)]
pub struct MeetingSynthesizer {
    join_url: String,
}

impl Default for MeetingSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_JOIN_URL)
    }
}

impl MeetingSynthesizer {
    pub fn new(join_url: impl Into<String>) -> Self {
        Self {
            join_url: join_url.into(),
        }
    }

    /// Join target handed out for new meetings, or the default when the
    /// configured one is unusable.
    pub fn join_url(&self) -> String {
        match validate_join_url(&self.join_url) {
            Ok(url) => url.to_string(),
            Err(_) => DEFAULT_JOIN_URL.to_string(),
        }
    }

    pub fn platform(&self) -> VideoPlatform {
        VideoPlatform {
            name: PLATFORM_NAME.to_string(),
            status: "active".to_string(),
            join_url: self.join_url(),
            features: PLATFORM_FEATURES.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Builds a descriptor for `topic`.
    ///
    /// Only a blank topic or a duration outside `1..=u32::MAX` minutes is
    /// reported to the caller. Any other failure yields a `fallback-` descriptor that points at
    /// [`DEFAULT_JOIN_URL`].
    pub fn synthesize(
        &self,
        topic: &str,
        duration_minutes: Option<i64>,
    ) -> Result<JoinDescriptor, ServiceError> {
        if topic.trim().is_empty() {
            return Err(ServiceError::InvalidArgument("Topic is required".into()));
        }
        let duration_minutes = match duration_minutes {
            None => DEFAULT_DURATION_MINUTES,
            Some(minutes) => u32::try_from(minutes)
                .ok()
                .filter(|minutes| *minutes > 0)
                .ok_or_else(|| {
                    ServiceError::InvalidArgument("durationMinutes must be positive".into())
                })?,
        };

        match self.try_synthesize(topic, duration_minutes) {
            Ok(descriptor) => {
                info!(meeting_id = %descriptor.meeting_id, %topic, "meeting link created");
                Ok(descriptor)
            }
            Err(error) => {
                warn!(%topic, error = %format!("{error:#}"), "meeting synthesis failed; using fallback link");
                Ok(fallback_descriptor(topic, duration_minutes))
            }
        }
    }

    fn try_synthesize(&self, topic: &str, duration_minutes: u32) -> anyhow::Result<JoinDescriptor> {
        let join_url = validate_join_url(&self.join_url)?.to_string();
        Ok(JoinDescriptor {
            meeting_id: next_meeting_id(),
            join_url: join_url.clone(),
            topic: topic.to_string(),
            kind: MeetingKind::GoogleMeet,
            platform: PLATFORM_NAME.to_string(),
            duration_minutes,
            instructions: INSTRUCTIONS.to_string(),
            direct_links: Some(DirectLinks {
                join_meet: join_url,
                download_app: DOWNLOAD_APP_URL.to_string(),
                learn_more: LEARN_MORE_URL.to_string(),
                web_version: WEB_VERSION_URL.to_string(),
            }),
            features: FEATURES.iter().map(|f| f.to_string()).collect(),
            error: None,
        })
    }
}

/// Random part plus a process-wide monotonic part, so two calls in the same
/// clock tick still differ.
pub fn next_meeting_id() -> MeetingId {
    let random = Uuid::new_v4().simple().to_string();
    let sequence = MEETING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    MeetingId(format!(
        "festival-{}-{:x}-{sequence}",
        &random[..12],
        Utc::now().timestamp_millis()
    ))
}

fn fallback_descriptor(topic: &str, duration_minutes: u32) -> JoinDescriptor {
    let sequence = MEETING_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JoinDescriptor {
        meeting_id: MeetingId(format!(
            "fallback-{:x}-{sequence}",
            Utc::now().timestamp_millis()
        )),
        join_url: DEFAULT_JOIN_URL.to_string(),
        topic: topic.to_string(),
        kind: MeetingKind::GoogleMeet,
        platform: PLATFORM_NAME.to_string(),
        duration_minutes,
        instructions: FALLBACK_INSTRUCTIONS.to_string(),
        direct_links: None,
        features: Vec::new(),
        error: Some(FALLBACK_NOTICE.to_string()),
    }
}

fn validate_join_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid join url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("join url '{raw}' must use http or https");
    }
    if url.host_str().is_none() {
        bail!("join url '{raw}' has no host");
    }
    Ok(url)
}

#[cfg(test)]
#[path = "tests/meeting_tests.rs"]
mod tests;
