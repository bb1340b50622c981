//! Scripted support chatbot: an ordered list of (pattern, response) rules
//! compiled from TOML, evaluated first-match-wins, plus explicit server-side
//! sessions behind opaque ids.
//!
//! Privacy rule carried throughout: raw chat text is never logged; dev
//! diagnostics see only an anonymizing hash and the matched rule id.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, warn};

pub const DEFAULT_CHATBOT_CONFIG_PATH: &str = "config/chatbot.toml";
pub const ENV_CHATBOT_CONFIG_PATH: &str = "CHATBOT_CONFIG_PATH";

static EMBEDDED_TOML: &str = include_str!("../config/chatbot.toml");

static EMBEDDED: Lazy<ChatScript> = Lazy::new(|| {
    toml::from_str(EMBEDDED_TOML).expect("embedded chatbot script is valid TOML")
});

/* ----------------------------
Script schema (from TOML)
---------------------------- */

#[derive(Debug, Clone, Deserialize)]
pub struct ChatScript {
    /// Response when no rule matches.
    pub fallback: String,
    #[serde(default)]
    pub rules: Vec<ChatRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRule {
    pub id: String,
    pub pattern: String, // regex (case-insensitivity via (?i) in the pattern)
    pub response: String,
}

/* ----------------------------
Compiled engine
---------------------------- */

#[derive(Debug)]
struct CompiledRule {
    id: String,
    re: Regex,
    response: String,
}

/// Holds the compiled rule list. Match order is the file order, which makes
/// the script's precedence explicit and deterministic.
#[derive(Debug)]
pub struct ChatEngine {
    rules: Vec<CompiledRule>,
    fallback: String,
}

impl ChatEngine {
    pub fn from_script(script: &ChatScript) -> anyhow::Result<Self> {
        let rules = script
            .rules
            .iter()
            .map(|r| {
                let re = Regex::new(&r.pattern)
                    .map_err(|e| anyhow::anyhow!("rule `{}` regex error: {}", r.id, e))?;
                Ok(CompiledRule {
                    id: r.id.clone(),
                    re,
                    response: r.response.clone(),
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self {
            rules,
            fallback: script.fallback.clone(),
        })
    }

    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let script: ChatScript = toml::from_str(toml_str)?;
        Self::from_script(&script)
    }

    /// Resolve the script path (explicit > env > default) and load it,
    /// falling back to the embedded script on any error.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var(ENV_CHATBOT_CONFIG_PATH).ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CHATBOT_CONFIG_PATH));
        match fs::read_to_string(&path).map_err(anyhow::Error::from).and_then(|s| Self::from_toml_str(&s)) {
            Ok(engine) => engine,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "bad chatbot script, using embedded rules");
                Self::from_script(&EMBEDDED).expect("embedded chatbot script compiles")
            }
        }
    }

    /// First matching rule wins; otherwise the fallback.
    pub fn reply(&self, message: &str) -> ChatReply<'_> {
        for rule in &self.rules {
            if rule.re.is_match(message) {
                debug!(target: "chatbot", id = %anon_hash(message), rule = %rule.id, "rule matched");
                return ChatReply {
                    text: &rule.response,
                    rule_id: Some(&rule.id),
                };
            }
        }
        debug!(target: "chatbot", id = %anon_hash(message), "fallback");
        ChatReply {
            text: &self.fallback,
            rule_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatReply<'a> {
    pub text: &'a str,
    pub rule_id: Option<&'a str>,
}

/* ----------------------------
Sessions
---------------------------- */

#[derive(Debug, Clone)]
pub struct ChatSession {
    pub created_at: DateTime<Utc>,
    pub exchanges: u32,
}

/// Explicit, passed-around session state instead of ambient globals. Bounded:
/// when full, the oldest session is evicted.
#[derive(Debug)]
pub struct SessionStore {
    inner: Mutex<HashMap<String, ChatSession>>,
    cap: usize,
}

impl SessionStore {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            cap: cap.clamp(1, 100_000),
        }
    }

    /// Mint a fresh session and return its opaque id.
    pub fn create(&self) -> String {
        let id = mint_session_id();
        let mut map = self.inner.lock().expect("session store poisoned");
        if map.len() >= self.cap {
            if let Some(oldest) = map
                .iter()
                .min_by_key(|(_, s)| s.created_at)
                .map(|(k, _)| k.clone())
            {
                map.remove(&oldest);
            }
        }
        map.insert(
            id.clone(),
            ChatSession {
                created_at: Utc::now(),
                exchanges: 0,
            },
        );
        id
    }

    /// Resolve an id from the client. A missing or unknown id mints a fresh
    /// session — the browser client adopts whatever id comes back.
    pub fn resolve_or_create(&self, id: Option<&str>) -> String {
        if let Some(id) = id {
            let map = self.inner.lock().expect("session store poisoned");
            if map.contains_key(id) {
                return id.to_string();
            }
        }
        self.create()
    }

    /// Count one user/bot exchange against the session.
    pub fn record_exchange(&self, id: &str) {
        let mut map = self.inner.lock().expect("session store poisoned");
        if let Some(s) = map.get_mut(id) {
            s.exchanges += 1;
        }
    }

    pub fn get(&self, id: &str) -> Option<ChatSession> {
        self.inner
            .lock()
            .expect("session store poisoned")
            .get(id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("session store poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Opaque 24-hex-char id from hashing a timestamp, a random draw, and a
/// process-wide counter. Not guessable, no coordination needed.
fn mint_session_id() -> String {
    use sha2::{Digest, Sha256};
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    let mut hasher = Sha256::new();
    hasher.update(Utc::now().timestamp_nanos_opt().unwrap_or_default().to_le_bytes());
    hasher.update(rand::random::<u64>().to_le_bytes());
    hasher.update(COUNTER.fetch_add(1, Ordering::Relaxed).to_le_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(24);
    for b in digest.iter().take(12) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Short anonymizing hash for log lines. Never log raw chat text.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ChatEngine {
        ChatEngine::from_script(&EMBEDDED).expect("embedded script compiles")
    }

    #[test]
    fn first_match_wins_over_later_rules() {
        // "hello, I feel anxious" matches both `greeting` and `anxiety`;
        // `greeting` is listed first and must win.
        let e = engine();
        let r = e.reply("hello, I feel anxious");
        assert_eq!(r.rule_id, Some("greeting"));
    }

    #[test]
    fn crisis_rule_outranks_everything() {
        let e = engine();
        let r = e.reply("I have been thinking about suicide lately");
        assert_eq!(r.rule_id, Some("crisis"));
        assert!(r.text.contains("988"));
    }

    #[test]
    fn unmatched_input_gets_fallback() {
        let e = engine();
        let r = e.reply("qwerty zxcvb");
        assert_eq!(r.rule_id, None);
        assert_eq!(r.text, EMBEDDED.fallback);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let e = engine();
        assert_eq!(e.reply("DEPRESSED and tired").rule_id, Some("depression"));
    }

    #[test]
    fn bad_rule_regex_is_reported_with_rule_id() {
        let toml = r#"
fallback = "f"

[[rules]]
id = "broken"
pattern = "(?i)[unclosed"
response = "r"
"#;
        let err = ChatEngine::from_toml_str(toml).unwrap_err();
        assert!(err.to_string().contains("broken"), "got: {err}");
    }

    #[test]
    fn sessions_mint_resolve_and_count() {
        let store = SessionStore::with_capacity(100);
        let id = store.create();
        assert_eq!(store.resolve_or_create(Some(&id)), id);
        store.record_exchange(&id);
        store.record_exchange(&id);
        assert_eq!(store.get(&id).unwrap().exchanges, 2);

        // Unknown or missing ids mint fresh sessions.
        let fresh = store.resolve_or_create(Some("nope"));
        assert_ne!(fresh, id);
        let fresh2 = store.resolve_or_create(None);
        assert_ne!(fresh2, fresh);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn store_evicts_oldest_at_capacity() {
        let store = SessionStore::with_capacity(2);
        let a = store.create();
        let b = store.create();
        let c = store.create();
        assert_eq!(store.len(), 2);
        // The newest session always survives; one of the earlier two is gone.
        assert!(store.get(&c).is_some());
        assert!(store.get(&a).is_none() || store.get(&b).is_none());
    }

    #[test]
    fn session_ids_are_opaque_hex() {
        let id = mint_session_id();
        assert_eq!(id.len(), 24);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
