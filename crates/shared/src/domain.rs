use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

id_newtype!(EventId);
id_newtype!(MeetingId);

/// A festival or cultural event as shown in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(alias = "_id")]
    pub id: EventId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
}

/// Which tier backed a catalog read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceState {
    PrimaryAvailable,
    PrimaryUnavailable,
}

impl DataSourceState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrimaryAvailable => "primary",
            Self::PrimaryUnavailable => "fallback",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingKind {
    GoogleMeet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectLinks {
    pub join_meet: String,
    pub download_app: String,
    pub learn_more: String,
    pub web_version: String,
}

/// How to enter an externally hosted video session for a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinDescriptor {
    pub meeting_id: MeetingId,
    pub join_url: String,
    pub topic: String,
    #[serde(rename = "type")]
    pub kind: MeetingKind,
    pub platform: String,
    pub duration_minutes: u32,
    pub instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_links: Option<DirectLinks>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JoinDescriptor {
    pub fn is_fallback(&self) -> bool {
        self.meeting_id.0.starts_with("fallback-")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: String,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
        }
    }
}
