//! Local rule engine.
//!
//! An ordered list of topic rules matched lexically against the case-folded
//! utterance. The first rule with any matching trigger answers; inside it,
//! the first matching branch refines the reply. Declaration order is part of
//! the behavior: "festival" outranks "meet" because its rule comes first.

use shared::error::ServiceError;

pub const DEFAULT_REPLY: &str = "I'm here to help you get the most out of the Virtual Festival Hub! You can ask me about joining festivals, using Google Meet, platform features, or anything else about your virtual cultural experience. What would you like to know? 🎉";

pub const GREETING: &str = "Hello! I'm your Virtual Festival Hub assistant! 🎉 I can help you explore festivals, join meetings, learn about features, or navigate the platform. What would you like to know?";

pub const QUICK_ACTIONS: &[&str] = &[
    "How do I join a festival?",
    "What festivals are available?",
    "Tell me about Google Meet integration",
    "Who built this platform?",
    "How do I navigate the site?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch {
    pub triggers: &'static [&'static str],
    pub reply: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicRule {
    pub topic: &'static str,
    pub triggers: &'static [&'static str],
    pub branches: &'static [Branch],
    pub reply: &'static str,
}

impl TopicRule {
    fn matches(&self, normalized: &str) -> bool {
        contains_any(normalized, self.triggers)
    }

    fn reply_for(&self, normalized: &str) -> &'static str {
        self.branches
            .iter()
            .find(|branch| contains_any(normalized, branch.triggers))
            .map_or(self.reply, |branch| branch.reply)
    }
}

/// Outcome of a local evaluation. `topic` is `None` for the default reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    pub topic: Option<&'static str>,
    pub reply: &'static str,
}

const FESTIVALS: TopicRule = TopicRule {
    topic: "festivals",
    triggers: &["festival", "event"],
    branches: &[
        Branch {
            triggers: &["join", "participate"],
            reply: "To join a festival meeting: 1) Browse the festival cards on the main page 2) Click the 'JOIN GOOGLE MEET' button on any festival 3) This will open a new Google Meet session where you can experience the cultural celebration in real-time! 🎪",
        },
        Branch {
            triggers: &["list", "available"],
            reply: "The Virtual Festival Hub features various cultural festivals! You'll see them displayed as cards on the main page. Each festival has its own description, date, and a direct link to join the virtual celebration via Google Meet. 🌍",
        },
    ],
    reply: "Our platform showcases cultural festivals from around the world! Each festival offers a unique virtual experience where you can learn about traditions, watch performances, and connect with others interested in that culture. Click any festival card to get started!",
};

const MEETINGS: TopicRule = TopicRule {
    topic: "meetings",
    triggers: &["meet", "meeting", "video"],
    branches: &[Branch {
        triggers: &["problem", "error", "not working"],
        reply: "If you're having issues with Google Meet: 1) Check your internet connection 2) Ensure pop-ups are allowed 3) Make sure you're signed into a Google account 4) Try refreshing the page. If problems persist, you can visit meet.google.com directly. 🔧",
    }],
    reply: "Google Meet integration allows you to join live virtual festival sessions! Simply click the 'JOIN GOOGLE MEET' button on any festival card to enter the celebration. You'll need a Google account to participate. 🎥",
};

const FEATURES: TopicRule = TopicRule {
    topic: "features",
    triggers: &["feature", "what can", "how to use"],
    branches: &[],
    reply: "Virtual Festival Hub Features: • Browse cultural festivals • Join live Google Meet sessions • Learn about different traditions • Connect with global participants • Meet the development team • Get AI assistance (that's me!) ✨",
};

const TEAM: TopicRule = TopicRule {
    topic: "team",
    triggers: &["team", "developer", "innovator"],
    branches: &[],
    reply: "Team Innovators built this platform! We're passionate about creating immersive virtual experiences. Scroll down to the 'Meet the Team' section to learn about our developers, their roles, and connect with them on GitHub and LinkedIn. 👨‍💻",
};

const NAVIGATION: TopicRule = TopicRule {
    topic: "navigation",
    triggers: &["navigate", "where is", "how to find"],
    branches: &[],
    reply: "Navigation Guide: • Main page: Festival cards • About section: Platform information • Team section: Developer profiles • Use the navigation bar at the top for quick navigation • I'm here to help with anything else! 🗺️",
};

const SUPPORT: TopicRule = TopicRule {
    topic: "support",
    triggers: &["help", "support", "problem"],
    branches: &[],
    reply: "I'm here to help! You can: • Ask about specific festivals • Get help with Google Meet • Learn platform features • Navigate the site • Contact the team. What do you need assistance with? 🤗",
};

const GREETINGS: TopicRule = TopicRule {
    topic: "greetings",
    triggers: &["hello", "hi", "hey"],
    branches: &[],
    reply: "Hello! 👋 Welcome to the Virtual Festival Hub! I'm your AI assistant here to help you explore cultural festivals, join virtual celebrations, and navigate our platform. What would you like to know?",
};

pub const STANDARD_RULES: &[TopicRule] = &[
    FESTIVALS, MEETINGS, FEATURES, TEAM, NAVIGATION, SUPPORT, GREETINGS,
];

#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<TopicRule>,
    default_reply: &'static str,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleEngine {
    pub fn standard() -> Self {
        Self::new(STANDARD_RULES.to_vec(), DEFAULT_REPLY)
    }

    /// Unchecked; run [`RuleEngine::verify`] before answering with it.
    pub fn new(rules: Vec<TopicRule>, default_reply: &'static str) -> Self {
        Self {
            rules,
            default_reply,
        }
    }

    pub fn rules(&self) -> &[TopicRule] {
        &self.rules
    }

    pub fn evaluate(&self, utterance: &str) -> RuleMatch {
        let normalized = utterance.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map_or(
                RuleMatch {
                    topic: None,
                    reply: self.default_reply,
                },
                |rule| RuleMatch {
                    topic: Some(rule.topic),
                    reply: rule.reply_for(&normalized),
                },
            )
    }

    pub fn respond(&self, utterance: &str) -> &'static str {
        self.evaluate(utterance).reply
    }

    /// Rejects rule sets that could answer with empty text.
    pub fn verify(&self) -> Result<(), ServiceError> {
        if self.default_reply.trim().is_empty() {
            return Err(ServiceError::AllTiersExhausted(
                "local rule engine has an empty default reply".into(),
            ));
        }
        for rule in &self.rules {
            let blank_trigger = rule
                .triggers
                .iter()
                .chain(rule.branches.iter().flat_map(|b| b.triggers.iter()))
                .any(|trigger| trigger.is_empty());
            if rule.triggers.is_empty() || blank_trigger {
                return Err(ServiceError::AllTiersExhausted(format!(
                    "rule '{}' has an empty trigger",
                    rule.topic
                )));
            }
            let blank_reply = std::iter::once(rule.reply)
                .chain(rule.branches.iter().map(|b| b.reply))
                .any(|reply| reply.trim().is_empty());
            if blank_reply {
                return Err(ServiceError::AllTiersExhausted(format!(
                    "rule '{}' has an empty reply",
                    rule.topic
                )));
            }
        }
        Ok(())
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

#[cfg(test)]
#[path = "tests/rules_tests.rs"]
mod tests;
