// src/tests/sinks.rs
use chrono::{TimeZone, Utc};
use serde_json::{json, Map};
use std::sync::Arc;
use tempfile::tempdir;

use crate::config_loader::ErrorLogConfig;
use crate::log_event::{Event, Frame, Level};
use crate::log_sink::Sink;
use crate::sinks::{BufferedSink, ErrorLogSink, SharedBuffer};

fn fixed_event(level: Level, message: &str, context: Map<String, serde_json::Value>) -> Arc<Event> {
    let mut event = Event::with_origin(
        level,
        message,
        context,
        "app",
        vec![Frame::new("src/lib.rs", 10, 1), Frame::new("src/main.rs", 3, 5)],
    );
    event.timestamp = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    Arc::new(event)
}

fn ctx(value: serde_json::Value) -> Map<String, serde_json::Value> {
    value.as_object().cloned().unwrap_or_default()
}

#[test]
fn error_log_renders_header_line() {
    let sink = ErrorLogSink::with_writer(ErrorLogConfig::default(), SharedBuffer::new());
    let rendered = sink.render(&fixed_event(Level::Warning, "disk low", Map::new()));
    assert_eq!(rendered, "2025-01-02 03:04:05.000000 app::[WARNING] disk low");
}

#[test]
fn error_log_prints_context_and_trace() {
    let config = ErrorLogConfig {
        print_trace: true,
        ..ErrorLogConfig::default()
    };
    let sink = ErrorLogSink::with_writer(config, SharedBuffer::new());
    let rendered = sink.render(&fixed_event(Level::Info, "m", ctx(json!({"k": "v"}))));
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[1], "  data:");
    assert!(lines.contains(&"      \"k\": \"v\""));
    let trace_at = lines.iter().position(|l| *l == "  trace:").unwrap();
    assert_eq!(lines[trace_at + 1], "    - src/lib.rs:10");
    assert_eq!(lines[trace_at + 2], "    - src/main.rs:3");
}

#[test]
fn error_log_skips_context_when_disabled_or_empty() {
    let config = ErrorLogConfig {
        print_context: false,
        ..ErrorLogConfig::default()
    };
    let sink = ErrorLogSink::with_writer(config, SharedBuffer::new());
    let rendered = sink.render(&fixed_event(Level::Info, "m", ctx(json!({"k": 1}))));
    assert!(!rendered.contains("data:"));

    let sink = ErrorLogSink::with_writer(ErrorLogConfig::default(), SharedBuffer::new());
    assert!(!sink.render(&fixed_event(Level::Info, "m", Map::new())).contains("data:"));
}

#[test]
fn error_log_applies_offset_and_format() {
    let config = ErrorLogConfig {
        utc_offset_minutes: Some(120),
        date_format: "%H:%M".to_string(),
        ..ErrorLogConfig::default()
    };
    let sink = ErrorLogSink::with_writer(config, SharedBuffer::new());
    let rendered = sink.render(&fixed_event(Level::Info, "m", Map::new()));
    assert!(rendered.starts_with("05:04 app::[INFO]"));
}

#[test]
fn error_log_filters_below_min_level() {
    let out = SharedBuffer::new();
    let mut sink = ErrorLogSink::with_writer(ErrorLogConfig::default(), out.clone());
    sink.append(fixed_event(Level::Debug, "skipped", Map::new())).unwrap();
    sink.append(fixed_event(Level::Error, "kept", Map::new())).unwrap();
    sink.commit().unwrap();

    let written = out.contents();
    assert!(!written.contains("skipped"));
    assert!(written.contains("app::[ERROR] kept"));
    assert!(written.ends_with('\n'));
}

#[test]
fn error_log_decorator_replaces_message() {
    let sink = ErrorLogSink::with_writer(ErrorLogConfig::default(), SharedBuffer::new())
        .with_decorator(|event: &Event| format!("<{}>", event.message.to_uppercase()));
    let rendered = sink.render(&fixed_event(Level::Info, "quiet", Map::new()));
    assert!(rendered.ends_with("app::[INFO] <QUIET>"));
}

#[test]
fn buffered_default_render_is_compact_json() {
    let out = SharedBuffer::new();
    let mut sink = BufferedSink::new(out.clone());
    sink.append(fixed_event(Level::Info, "hello", ctx(json!({"a": 1})))).unwrap();
    assert_eq!(
        out.contents(),
        "{\"module\":\"app\",\"level\":2,\"message\":\"hello\",\"context\":{\"a\":1}}\n"
    );
}

#[test]
fn buffered_writes_full_batches_and_remainder_on_commit() {
    let out = SharedBuffer::new();
    let mut sink = BufferedSink::new(out.clone())
        .with_render(|e: &Event| e.message.clone())
        .with_element_separator("\n")
        .with_batch_separator("\n\n\n")
        .with_batch_limit(3);

    for m in ["1", "2", "3", "4"] {
        sink.append(fixed_event(Level::Info, m, Map::new())).unwrap();
    }
    assert_eq!(out.contents(), "1\n2\n3\n\n\n");
    assert_eq!(sink.pending(), 1);

    sink.commit().unwrap();
    sink.commit().unwrap();
    assert_eq!(out.contents(), "1\n2\n3\n\n\n4\n\n\n");
}

#[test]
fn buffered_file_sink_writes_header_per_batch() {
    let dir = tempdir().expect("failed to create temp dir");
    let path = dir.path().join("custom.log");
    let separator = "######################";

    let mut sink = BufferedSink::file(&path)
        .unwrap()
        .with_render(|e: &Event| format!("{} [{}:{}] {}", e.micros(), e.module, e.level, e.message))
        .with_batch_header(separator)
        .with_batch_limit(5);

    for i in 1..=7 {
        sink.append(fixed_event(Level::Info, &format!("hello{i}"), Map::new())).unwrap();
    }
    sink.commit().unwrap();

    let log = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    let expected = [
        separator, "hello1", "hello2", "hello3", "hello4", "hello5", separator, "hello6", "hello7",
    ];
    assert_eq!(lines.len(), expected.len());
    for (line, want) in lines.iter().zip(expected) {
        assert!(line.contains(want), "line `{line}` must include `{want}`");
    }
}

#[test]
fn buffered_file_sink_reports_unopenable_path() {
    let dir = tempdir().expect("failed to create temp dir");
    let result = BufferedSink::file(dir.path().join("missing").join("x.log"));
    assert!(matches!(result, Err(crate::errors::LogError::Io { .. })));
}
