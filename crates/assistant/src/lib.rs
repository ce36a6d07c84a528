use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

mod conversation;
pub mod remote;
pub mod rules;

pub use conversation::Conversation;
pub use remote::{HttpResponder, RemoteResponder};
pub use rules::RuleEngine;

/// What the assistant is allowed to talk about, sent with every remote call.
pub const PLATFORM_CONTEXT: &str = "Virtual Festival Hub - A platform for experiencing cultural festivals through Google Meet integration. Users can browse festivals, join virtual meetings, learn about cultural traditions, and connect with Team Innovators developers.";

pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    Remote,
    LocalRules,
}

impl ResolutionTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::LocalRules => "local_rules",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub reply: String,
    pub tier: ResolutionTier,
}

/// Answers utterances, remote tier first, local rules second.
#[derive(Clone)]
pub struct ResponseResolver {
    remote: Option<Arc<dyn RemoteResponder>>,
    rules: Arc<RuleEngine>,
    timeout: Duration,
    context: String,
}

impl ResponseResolver {
    pub fn new(remote: Arc<dyn RemoteResponder>) -> Self {
        Self {
            remote: Some(remote),
            ..Self::local_only()
        }
    }

    pub fn local_only() -> Self {
        Self {
            remote: None,
            rules: Arc::new(RuleEngine::standard()),
            timeout: DEFAULT_REMOTE_TIMEOUT,
            context: PLATFORM_CONTEXT.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// A rule set that fails [`RuleEngine::verify`] is replaced by the
    /// standard rules.
    pub fn with_rules(mut self, rules: RuleEngine) -> Self {
        self.rules = match rules.verify() {
            Ok(()) => Arc::new(rules),
            Err(error) => {
                warn!(%error, "custom rule set rejected; keeping standard rules");
                Arc::new(RuleEngine::standard())
            }
        };
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Never fails and never returns empty text.
    pub async fn resolve(&self, utterance: &str) -> String {
        self.resolve_with_tier(utterance).await.reply
    }

    pub async fn resolve_with_tier(&self, utterance: &str) -> Resolution {
        if let Some(remote) = &self.remote {
            match tokio::time::timeout(self.timeout, remote.respond(utterance, &self.context)).await
            {
                Ok(Ok(reply)) if !reply.trim().is_empty() => {
                    debug!("assistant reply served by remote responder");
                    return Resolution {
                        reply,
                        tier: ResolutionTier::Remote,
                    };
                }
                Ok(Ok(_)) => warn!("remote responder returned an empty reply; using local rules"),
                Ok(Err(error)) => warn!(%error, "remote responder failed; using local rules"),
                Err(_) => warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "remote responder timed out; using local rules"
                ),
            }
        }

        let matched = self.rules.evaluate(utterance);
        debug!(topic = matched.topic.unwrap_or("default"), "assistant reply served by local rules");
        Resolution {
            reply: matched.reply.to_string(),
            tier: ResolutionTier::LocalRules,
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
