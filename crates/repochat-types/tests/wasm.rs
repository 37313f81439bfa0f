//! WASM-target tests for repochat-types.
//!
//! Runs the serialization-sensitive and clock-sensitive parts of the
//! shared types under wasm32-unknown-unknown via `wasm-pack test --node`.

use wasm_bindgen_test::*;

use chrono::{Duration, Utc};
use repochat_types::config::*;
use repochat_types::content::*;
use repochat_types::message::*;
use repochat_types::project::*;
use repochat_types::session::*;
use repochat_types::ChatError;

// ─── Message Tests ───────────────────────────────────────

#[wasm_bindgen_test]
fn message_ids_generated_in_wasm() {
    // uuid v4 needs the `js` randomness source on this target
    let a = ChatMessage::user("a");
    let b = ChatMessage::assistant("b");
    assert_eq!(a.id.len(), 36);
    assert_ne!(a.id, b.id);
}

#[wasm_bindgen_test]
fn history_roundtrip() {
    let json = r#"[{"role":"user","content":"q"},{"role":"assistant","content":"a","sources":["x.rs"]}]"#;
    let history: Vec<ChatMessage> = serde_json::from_str(json).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].sources, vec!["x.rs"]);
}

// ─── Lockout Tests ───────────────────────────────────────

#[wasm_bindgen_test]
fn lockout_uses_wasm_clock() {
    // chrono's `wasmbind` feature backs Utc::now() with Date.now()
    let now = Utc::now();
    let lockout = Lockout::from_rate_limit(
        "Daily limit reached",
        Some(now + Duration::minutes(90)),
        now,
    );
    assert!(lockout.reason.contains("1h 30m"));
}

// ─── Project / Config Tests ──────────────────────────────

#[wasm_bindgen_test]
fn project_status_parsing() {
    let status: ProjectStatus = serde_json::from_str(r#""READY""#).unwrap();
    assert_eq!(status, ProjectStatus::Ready);
}

#[wasm_bindgen_test]
fn default_endpoint() {
    let config = ClientConfig::default();
    assert_eq!(config.api.endpoint("api/projects"), "http://localhost:3000/api/projects");
}

// ─── Content Tests ───────────────────────────────────────

#[wasm_bindgen_test]
fn code_block_with_file_header() {
    let segments = scan_code_blocks("```ts\n// File: src/a.ts\nexport {}\n```\n");
    let ContentSegment::Code { language, code } = &segments[0] else {
        panic!("Expected a code segment");
    };
    assert_eq!(language, "ts");
    let (path, clean) = detect_code_filename(code).unwrap();
    assert_eq!(path, "src/a.ts");
    assert_eq!(clean, "export {}");
}

#[wasm_bindgen_test]
fn error_display() {
    assert_eq!(ChatError::http(429, "slow down").to_string(), "HTTP 429: slow down");
}
