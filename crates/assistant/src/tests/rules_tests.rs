use super::*;

fn topic(utterance: &str) -> Option<&'static str> {
    RuleEngine::standard().evaluate(utterance).topic
}

#[test]
fn earlier_rule_wins_when_two_topics_match() {
    let utterance = "Can I meet people at the festival?";
    let engine = RuleEngine::standard();
    assert_eq!(engine.respond(utterance), FESTIVALS.reply);

    let reordered = RuleEngine::new(vec![MEETINGS, FESTIVALS], DEFAULT_REPLY);
    assert_eq!(reordered.respond(utterance), MEETINGS.reply);
}

#[test]
fn branches_refine_the_topic_reply() {
    let engine = RuleEngine::standard();
    assert_eq!(
        engine.respond("How do I join a festival?"),
        FESTIVALS.branches[0].reply
    );
    assert_eq!(
        engine.respond("What festivals are available?"),
        FESTIVALS.branches[1].reply
    );
    assert_eq!(
        engine.respond("the video is not working"),
        MEETINGS.branches[0].reply
    );
}

#[test]
fn meeting_rule_outranks_support_for_shared_keywords() {
    let engine = RuleEngine::standard();
    let reply = engine.respond("I have a problem with the meeting");
    assert_eq!(reply, MEETINGS.branches[0].reply);
    assert_eq!(engine.respond("I have a problem"), SUPPORT.reply);
}

#[test]
fn each_topic_is_reachable() {
    assert_eq!(topic("Tell me about Google Meet integration"), Some("meetings"));
    assert_eq!(topic("Which features exist?"), Some("features"));
    assert_eq!(topic("Tell me about the developers"), Some("team"));
    assert_eq!(topic("Where is the about section?"), Some("navigation"));
    assert_eq!(topic("I need support"), Some("support"));
    assert_eq!(topic("HELLO there"), Some("greetings"));
    assert_eq!(topic("upcoming EVENTS"), Some("festivals"));
}

#[test]
fn unmatched_input_gets_the_default_reply() {
    let engine = RuleEngine::standard();
    let long = "a".repeat(100_000);
    for utterance in ["", "   ", "\n\t", "xyz", "नमस्ते 🎉", long.as_str()] {
        let result = engine.evaluate(utterance);
        assert_eq!(result.topic, None);
        assert_eq!(result.reply, DEFAULT_REPLY);
    }
}

#[test]
fn every_input_produces_non_empty_text() {
    let engine = RuleEngine::standard();
    let adversarial = format!("{} ÄÖÜ ß İ festival meet team help hi", "event ".repeat(5_000));
    for utterance in ["", " ", "ǅ", "🎪🎥", "FESTIVAL MEET", adversarial.as_str()] {
        assert!(!engine.respond(utterance).trim().is_empty());
    }
}

#[test]
fn local_resolution_is_deterministic() {
    let engine = RuleEngine::standard();
    let first = engine.respond("how to use this thing");
    for _ in 0..10 {
        assert_eq!(engine.respond("how to use this thing").as_bytes(), first.as_bytes());
    }
}

#[test]
fn standard_rules_keep_declared_order() {
    let topics: Vec<&str> = RuleEngine::standard()
        .rules()
        .iter()
        .map(|rule| rule.topic)
        .collect();
    assert_eq!(
        topics,
        vec!["festivals", "meetings", "features", "team", "navigation", "support", "greetings"]
    );
}

#[test]
fn verify_accepts_standard_rules_and_rejects_blank_replies() {
    assert!(RuleEngine::standard().verify().is_ok());

    let blank_default = RuleEngine::new(STANDARD_RULES.to_vec(), "  ");
    assert!(matches!(
        blank_default.verify(),
        Err(ServiceError::AllTiersExhausted(_))
    ));

    let blank_rule = TopicRule {
        topic: "blank",
        triggers: &["x"],
        branches: &[],
        reply: "",
    };
    assert!(RuleEngine::new(vec![blank_rule], DEFAULT_REPLY).verify().is_err());

    let catch_all = TopicRule {
        topic: "catch-all",
        triggers: &[""],
        branches: &[],
        reply: "always",
    };
    assert!(RuleEngine::new(vec![catch_all], DEFAULT_REPLY).verify().is_err());
}
