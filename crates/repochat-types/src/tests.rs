#[cfg(test)]
mod tests {
    use crate::message::*;
    use crate::event::*;
    use crate::project::*;
    use crate::config::*;
    use crate::session::*;
    use crate::content::*;
    use crate::error::*;
    use chrono::{Duration, TimeZone, Utc};

    // ─── Message Tests ───────────────────────────────────────

    #[test]
    fn test_message_user() {
        let msg = ChatMessage::user("Hello");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello");
        assert!(msg.sources.is_empty());
        assert!(!msg.is_error);
        assert!(!msg.id.is_empty());
    }

    #[test]
    fn test_message_placeholder() {
        let msg = ChatMessage::placeholder(vec!["src/auth.ts".to_string()]);
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_empty());
        assert_eq!(msg.sources, vec!["src/auth.ts"]);
        assert!(!msg.is_error);
    }

    #[test]
    fn test_message_error() {
        let msg = ChatMessage::error("boom");
        assert!(msg.is_assistant());
        assert!(msg.is_error);
        assert_eq!(msg.content, "boom");
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = ChatMessage::user("a");
        let b = ChatMessage::user("a");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_history_entry_deserialization() {
        let json = r#"[
            {"role": "user", "content": "explain auth.ts"},
            {"role": "assistant", "content": "It uses JWT.", "sources": ["src/auth.ts"]},
            {"role": "user", "content": "thanks", "sources": null}
        ]"#;
        let history: Vec<ChatMessage> = serde_json::from_str(json).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::User);
        assert!(history[0].sources.is_empty());
        assert_eq!(history[1].sources, vec!["src/auth.ts"]);
        assert!(history[2].sources.is_empty());
        assert!(!history[1].is_error);
        assert!(!history[0].id.is_empty());
    }

    #[test]
    fn test_message_serialization_skips_local_fields() {
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert!(!json.contains("id"));
        assert!(!json.contains("isError"));
        assert!(!json.contains("sources"));

        let json = serde_json::to_string(&ChatMessage::error("x")).unwrap();
        assert!(json.contains(r#""isError":true"#));
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), r#""assistant""#);
        let role: Role = serde_json::from_str(r#""assistant""#).unwrap();
        assert_eq!(role, Role::Assistant);
    }

    // ─── Event Tests ─────────────────────────────────────────

    #[test]
    fn test_chat_event_serialization() {
        let event = ChatEvent::StreamDelta { text: "Auth ".to_string() };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("StreamDelta"));
        assert!(json.contains("Auth "));
    }

    // ─── Project Tests ───────────────────────────────────────

    #[test]
    fn test_project_deserialization() {
        let json = r#"{
            "id": "p1",
            "name": "acme/api",
            "status": "INDEXING",
            "is_private": true,
            "url": "https://github.com/acme/api",
            "created_at": "2026-01-01T00:00:00Z"
        }"#;
        let project: Project = serde_json::from_str(json).unwrap();
        assert_eq!(project.status, ProjectStatus::Indexing);
        assert_eq!(project.owner(), "acme");
        assert_eq!(project.repo(), "api");
        assert!(project.is_private);
        assert_eq!(project.created_at, "2026-01-01T00:00:00Z");
        assert!(!project.is_ready());

        let json = serde_json::to_string(&project).unwrap();
        assert!(json.contains(r#""is_private":true"#));
        assert!(json.contains(r#""created_at""#));
    }

    #[test]
    fn test_github_repo_defaults_and_filter() {
        let repo: GithubRepo = serde_json::from_str(
            r#"{"id": 42, "name": "Acme/Web-App", "url": "https://github.com/Acme/Web-App"}"#,
        )
        .unwrap();
        assert_eq!(repo.id, 42);
        assert!(repo.description.is_none());
        assert!(!repo.private);
        assert_eq!(repo.stars, 0);

        assert!(repo.matches("web"));
        assert!(repo.matches("  ACME/ "));
        assert!(repo.matches(""));
        assert!(!repo.matches("api"));
    }

    #[test]
    fn test_new_project_wire_names() {
        let repo = GithubRepo {
            id: 7,
            name: "acme/api".to_string(),
            description: Some("API".to_string()),
            url: "https://github.com/acme/api".to_string(),
            private: true,
            stars: 3,
            updated_at: String::new(),
        };
        let body = serde_json::to_value(NewProject::from(&repo)).unwrap();
        assert_eq!(body["repoId"], 7);
        assert_eq!(body["name"], "acme/api");
        assert_eq!(body["isPrivate"], true);
        assert_eq!(body["url"], "https://github.com/acme/api");
    }

    #[test]
    fn test_set_status() {
        let mut projects = vec![Project {
            id: "p".to_string(),
            name: "a/b".to_string(),
            status: ProjectStatus::Ready,
            is_private: false,
            url: String::new(),
            created_at: String::new(),
        }];
        assert!(set_status(&mut projects, "p", ProjectStatus::Indexing));
        assert_eq!(projects[0].status, ProjectStatus::Indexing);
        assert!(!set_status(&mut projects, "missing", ProjectStatus::Ready));
    }

    #[test]
    fn test_project_repo_without_owner() {
        let project = Project {
            id: "p".to_string(),
            name: "solo".to_string(),
            status: ProjectStatus::Ready,
            is_private: false,
            url: String::new(),
            created_at: String::new(),
        };
        assert_eq!(project.owner(), "solo");
        assert_eq!(project.repo(), "solo");
    }

    #[test]
    fn test_needs_polling() {
        let mut project = Project {
            id: "p".to_string(),
            name: "a/b".to_string(),
            status: ProjectStatus::Ready,
            is_private: false,
            url: String::new(),
            created_at: String::new(),
        };
        assert!(!needs_polling(&[project.clone()]));
        project.status = ProjectStatus::Pending;
        assert!(needs_polling(&[project.clone()]));
        project.status = ProjectStatus::Error;
        assert!(!needs_polling(&[project]));
        assert!(!needs_polling(&[]));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(ProjectStatus::Ready.label(), "READY");
        assert_eq!(ProjectStatus::Pending.label(), "PENDING");
        assert_eq!(serde_json::to_string(&ProjectStatus::Error).unwrap(), r#""ERROR""#);
    }

    #[test]
    fn test_pull_request_draft_wire_format() {
        let draft = PullRequestDraft {
            project_id: "p1".to_string(),
            file_path: "src/a.ts".to_string(),
            new_content: "export {}".to_string(),
        };
        let json = serde_json::to_string(&draft).unwrap();
        assert!(json.contains(r#""filePath":"src/a.ts""#));
        assert!(json.contains(r#""content":"export {}""#));
        assert!(!json.contains("p1"));
    }

    // ─── Config Tests ────────────────────────────────────────

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:3000");
        assert!(config.api.include_credentials);
        assert_eq!(config.mention_debounce_ms, 300);
        assert_eq!(config.project_poll_interval_ms, 5000);
        assert_eq!(config.max_visible_sources, 3);
    }

    #[test]
    fn test_config_partial_deserialization() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"api": {"base_url": "https://chat.example.com"}}"#).unwrap();
        assert_eq!(config.api.base_url, "https://chat.example.com");
        assert!(config.api.include_credentials);
        assert_eq!(config.mention_debounce_ms, 300);
    }

    #[test]
    fn test_endpoint_join() {
        let api = ApiConfig::new("http://localhost:3000/");
        assert_eq!(api.endpoint("/api/chat"), "http://localhost:3000/api/chat");
        assert_eq!(api.endpoint("api/chat"), "http://localhost:3000/api/chat");
    }

    // ─── Lockout Tests ───────────────────────────────────────

    #[test]
    fn test_format_remaining_floors() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(format_remaining(now + Duration::milliseconds(5_400_000), now), "1h 30m");
        assert_eq!(format_remaining(now + Duration::seconds(5_399), now), "1h 29m");
        assert_eq!(format_remaining(now + Duration::seconds(59), now), "0h 0m");
        assert_eq!(format_remaining(now + Duration::hours(26), now), "26h 0m");
    }

    #[test]
    fn test_format_remaining_past_reset() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(format_remaining(now - Duration::minutes(10), now), "0h 0m");
    }

    #[test]
    fn test_lockout_from_rate_limit() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let reset = now + Duration::milliseconds(5_400_000);
        let lockout = Lockout::from_rate_limit("Daily limit reached", Some(reset), now);
        assert_eq!(lockout.reason, "Daily limit reached. Try again in 1h 30m.");
        assert_eq!(lockout.reset_at, Some(reset));
        assert!(!lockout.is_expired(now));
        assert!(lockout.is_expired(reset));
    }

    #[test]
    fn test_lockout_without_reset() {
        let now = Utc::now();
        let lockout = Lockout::from_rate_limit("Too many requests", None, now);
        assert_eq!(lockout.reason, "Too many requests");
        assert!(lockout.reset_at.is_none());
        assert!(!lockout.is_expired(now));
    }

    #[test]
    fn test_snapshot_can_send() {
        let mut snapshot = SessionSnapshot::default();
        assert!(!snapshot.can_send());
        snapshot.project_id = Some("p".to_string());
        assert!(snapshot.can_send());
        snapshot.pending = true;
        assert!(!snapshot.can_send());
        snapshot.pending = false;
        snapshot.lockout = Some(Lockout { reason: "x".to_string(), reset_at: None });
        assert!(!snapshot.can_send());
    }

    // ─── Content Tests ───────────────────────────────────────

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(r"src\lib\auth.ts"), "src/lib/auth.ts");
        assert_eq!(normalize_path("src/main.rs"), "src/main.rs");
    }

    #[test]
    fn test_scan_code_blocks() {
        let content = "Here is the fix:\n```ts\nconst x = 1;\nconst y = 2;\n```\nDone.";
        let segments = scan_code_blocks(content);
        assert_eq!(segments, vec![
            ContentSegment::Text("Here is the fix:\n".to_string()),
            ContentSegment::Code {
                language: "ts".to_string(),
                code: "const x = 1;\nconst y = 2;".to_string(),
            },
            ContentSegment::Text("Done.".to_string()),
        ]);
    }

    #[test]
    fn test_scan_code_blocks_unterminated() {
        let segments = scan_code_blocks("Partial\n```rust\nfn main() {\n");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1], ContentSegment::Code {
            language: "rust".to_string(),
            code: "fn main() {".to_string(),
        });
    }

    #[test]
    fn test_scan_code_blocks_plain_text() {
        assert_eq!(
            scan_code_blocks("no code here"),
            vec![ContentSegment::Text("no code here".to_string())]
        );
        assert!(scan_code_blocks("").is_empty());
    }

    #[test]
    fn test_detect_code_filename_slash_comment() {
        let code = "// File: src/auth.ts\nexport const a = 1;";
        let (path, clean) = detect_code_filename(code).unwrap();
        assert_eq!(path, "src/auth.ts");
        assert_eq!(clean, "export const a = 1;");
    }

    #[test]
    fn test_detect_code_filename_hash_comment_mid_block() {
        let code = "import os\n# File:   scripts/run.py  \nprint(1)\n";
        let (path, clean) = detect_code_filename(code).unwrap();
        assert_eq!(path, "scripts/run.py");
        assert_eq!(clean, "import os\nprint(1)\n");
    }

    #[test]
    fn test_detect_code_filename_requires_spacing() {
        assert!(detect_code_filename("//File: a.ts\n").is_none());
        assert!(detect_code_filename("// file: a.ts\n").is_none());
        assert!(detect_code_filename("let x = 1;").is_none());
    }

    #[test]
    fn test_detect_code_filename_last_line_kept() {
        let (path, clean) = detect_code_filename("x = 1\n# File: a.py").unwrap();
        assert_eq!(path, "a.py");
        assert_eq!(clean, "x = 1\n# File: a.py");
    }

    #[test]
    fn test_file_kind_detection() {
        assert_eq!(FileKind::detect("src/App.tsx"), FileKind::Text { language: "typescript" });
        assert_eq!(FileKind::detect("index.JS"), FileKind::Text { language: "javascript" });
        assert_eq!(FileKind::detect("ci.yml"), FileKind::Text { language: "yaml" });
        assert_eq!(FileKind::detect("Makefile"), FileKind::Text { language: "text" });
        assert!(FileKind::detect("assets/logo.PNG").is_binary());
        assert!(FileKind::detect("lib/libfoo.so").is_binary());
        assert!(!FileKind::detect("v1.2/readme").is_binary());
    }

    #[test]
    fn test_file_view_new() {
        let view = FileView::new("docs/guide.md", "# Guide");
        assert_eq!(view.kind, FileKind::Text { language: "markdown" });
        assert_eq!(view.content, "# Guide");
    }

    // ─── Error Tests ─────────────────────────────────────────

    #[test]
    fn test_error_display() {
        assert_eq!(ChatError::http(500, "oops").to_string(), "HTTP 500: oops");
        assert_eq!(ChatError::Network("offline".to_string()).to_string(), "Network error: offline");
        assert_eq!(ChatError::Cancelled.to_string(), "Cancelled");
        assert_eq!(ChatError::NoProject.to_string(), "No project selected");
    }

    #[test]
    fn test_error_from_serde() {
        let serde_err = serde_json::from_str::<serde_json::Value>("{{invalid}}").unwrap_err();
        let err: ChatError = serde_err.into();
        assert!(matches!(err, ChatError::Serialization(_)));
    }
}
