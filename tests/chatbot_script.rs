// tests/chatbot_script.rs
//
// The chatbot script is an ordered rule list: first match wins, reordering
// changes the outcome, and anything unmatched falls through to the fallback.

use prevalence_risk_analyzer::chatbot::{ChatEngine, SessionStore};

const TWO_RULES: &str = r#"
fallback = "fallback response"

[[rules]]
id = "first"
pattern = '(?i)\bhello\b'
response = "first wins"

[[rules]]
id = "second"
pattern = '(?i)\bworld\b'
response = "second wins"
"#;

const TWO_RULES_REVERSED: &str = r#"
fallback = "fallback response"

[[rules]]
id = "second"
pattern = '(?i)\bworld\b'
response = "second wins"

[[rules]]
id = "first"
pattern = '(?i)\bhello\b'
response = "first wins"
"#;

#[test]
fn match_order_is_the_file_order() {
    let e = ChatEngine::from_toml_str(TWO_RULES).expect("script compiles");
    let r = e.reply("hello world");
    assert_eq!(r.rule_id, Some("first"));
    assert_eq!(r.text, "first wins");

    let e = ChatEngine::from_toml_str(TWO_RULES_REVERSED).expect("script compiles");
    let r = e.reply("hello world");
    assert_eq!(r.rule_id, Some("second"));
    assert_eq!(r.text, "second wins");
}

#[test]
fn replies_are_deterministic() {
    let e = ChatEngine::from_toml_str(TWO_RULES).expect("script compiles");
    for _ in 0..5 {
        assert_eq!(e.reply("hello world").text, "first wins");
        assert_eq!(e.reply("no match here").text, "fallback response");
    }
}

#[test]
fn fallback_covers_the_empty_message() {
    let e = ChatEngine::from_toml_str(TWO_RULES).expect("script compiles");
    let r = e.reply("");
    assert_eq!(r.rule_id, None);
    assert_eq!(r.text, "fallback response");
}

#[test]
fn default_script_loads_and_answers() {
    // Embedded script (no file override in this test environment).
    let e = ChatEngine::load(None);
    let r = e.reply("what does the percentage mean?");
    assert!(r.rule_id.is_some(), "expected a scripted answer");
    assert!(!r.text.is_empty());
}

#[test]
fn sessions_survive_across_exchanges() {
    let store = SessionStore::with_capacity(10);
    let id = store.create();
    for _ in 0..3 {
        let resolved = store.resolve_or_create(Some(&id));
        assert_eq!(resolved, id);
        store.record_exchange(&resolved);
    }
    assert_eq!(store.get(&id).unwrap().exchanges, 3);
}
