//! Integration tests for the hiclip pipeline
//!
//! These tests use fixture chat logs in `tests/fixtures/` to verify the path
//! from chat log to timecode file to planned and rendered clips.

use hiclip_core::config::Config;
use hiclip_core::download::chat_log_from_staging;
use hiclip_core::extract::{extract_matching, extract_timestamps};
use hiclip_core::render::{merge_clips, render_clips, ClipRenderer};
use hiclip_core::{
    create_registry, timecode, ChatLog, ClipPlanner, ClipSpec, Error, HighlightEvent, MediaPaths,
    TimeClusterer, Timestamp,
};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get the path to a fixture file
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> ChatLog {
    ChatLog::load(&fixture_path(name)).expect("fixture should load")
}

fn highlights_for(log: &ChatLog, matcher: &str) -> Vec<HighlightEvent> {
    hiclip_core::logging::init_test();
    let registry = create_registry(&[]).unwrap();
    let hits = extract_matching(&log.chats, registry.get(matcher).unwrap()).unwrap();
    TimeClusterer::default().highlights(&hits).unwrap()
}

/// Writes an empty file per cut and records merge inputs.
#[derive(Default)]
struct RecordingRenderer {
    merges: RefCell<Vec<Vec<PathBuf>>>,
}

impl ClipRenderer for RecordingRenderer {
    fn probe_duration(&self, _source: &Path) -> hiclip_core::Result<Option<f64>> {
        Ok(Some(4000.0))
    }

    fn cut(&self, _source: &Path, _clip: &ClipSpec, output: &Path) -> hiclip_core::Result<()> {
        std::fs::write(output, b"clip")?;
        Ok(())
    }

    fn concat(&self, inputs: &[PathBuf], output: &Path) -> hiclip_core::Result<()> {
        self.merges.borrow_mut().push(inputs.to_vec());
        std::fs::write(output, b"merged")?;
        Ok(())
    }
}

// ============================================
// Extraction and clustering
// ============================================

#[test]
fn test_fixture_loads_with_extra_fields() {
    let log = load_fixture("stream.chat.json");
    assert_eq!(log.id, "stream");
    assert_eq!(log.chats.len(), 15);
    assert_eq!(log.chats[1].extra["author"]["name"], "a");
}

#[test]
fn test_default_matcher_pipeline() {
    let log = load_fixture("stream.chat.json");
    let highlights = highlights_for(&log, "hic_ubye");

    assert_eq!(
        highlights,
        vec![
            HighlightEvent {
                representative_time: 12,
                member_count: 6,
            },
            HighlightEvent {
                representative_time: 3726,
                member_count: 3,
            },
        ]
    );
}

#[test]
fn test_exact_matcher_pipeline() {
    let log = load_fixture("stream.chat.json");
    let highlights = highlights_for(&log, "hic_ame");

    // "hiccup lol" only counts for the substring matcher.
    assert_eq!(highlights.len(), 2);
    assert_eq!(highlights[0].representative_time, 12);
    assert_eq!(highlights[0].member_count, 5);
    assert_eq!(highlights[1].representative_time, 3726);
}

#[test]
fn test_configured_matcher() {
    let config: Config = toml::from_str(
        r#"
[[matchers]]
name = "kusa"
contains = ["草"]
"#,
    )
    .unwrap();
    let registry = create_registry(&config.matchers).unwrap();
    let log = load_fixture("stream.chat.json");

    let hits = extract_timestamps(&log.chats, registry.get("kusa").unwrap()).unwrap();
    assert_eq!(hits, vec![300, 301, 303]);

    let highlights = TimeClusterer::default().highlights(&hits).unwrap();
    assert_eq!(highlights[0].representative_time, 301);
}

#[test]
fn test_higher_threshold_drops_smaller_burst() {
    let log = load_fixture("stream.chat.json");
    let registry = create_registry(&[]).unwrap();
    let hits = extract_matching(&log.chats, registry.get("hic_ubye").unwrap()).unwrap();

    let highlights = TimeClusterer::new(60, 4).unwrap().highlights(&hits).unwrap();
    assert_eq!(highlights.len(), 1);
    assert_eq!(highlights[0].representative_time, 12);

    let none = TimeClusterer::new(60, 50).unwrap().highlights(&hits).unwrap();
    assert!(none.is_empty());
}

#[test]
fn test_malformed_time_aborts() {
    let log = load_fixture("malformed.chat.json");
    let registry = create_registry(&[]).unwrap();

    let err = extract_matching(&log.chats, registry.get("hic_ubye").unwrap()).unwrap_err();
    assert!(matches!(err, Error::TimeParse { ref input, .. } if input == "0:1x"));
}

#[test]
fn test_missing_chat_log() {
    let dir = TempDir::new().unwrap();
    let paths = MediaPaths::new(dir.path(), "absent");

    let err = ChatLog::load(&paths.chat_log()).unwrap_err();
    assert!(matches!(err, Error::ResourceNotFound { kind: "chat log", .. }));
}

// ============================================
// Timecode persistence and planning
// ============================================

#[test]
fn test_timecode_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let paths = MediaPaths::new(dir.path(), "stream");
    let highlights = highlights_for(&load_fixture("stream.chat.json"), "hic_ubye");

    timecode::write(&paths.timecode(), &highlights, "hic").unwrap();
    let text = std::fs::read_to_string(paths.timecode()).unwrap();
    assert_eq!(text, "0:00:12,hic00\n1:02:06,hic01\n");

    let times = timecode::read(&paths.timecode()).unwrap();
    let expected: Vec<Timestamp> = highlights.iter().map(|h| h.representative_time).collect();
    assert_eq!(times, expected);
}

#[test]
fn test_plan_from_timecode_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stream.hic.time.csv");
    std::fs::write(&path, "0:00:12,hic00\n1:02:06,hic01\n").unwrap();

    let times = timecode::read(&path).unwrap();
    let clips = ClipPlanner::new(5.0, 10.0, "hic").plan(&times, None);

    assert_eq!(clips.len(), 2);
    assert_eq!((clips[0].start, clips[0].end), (7.0, 22.0));
    assert_eq!((clips[1].start, clips[1].end), (3721.0, 3736.0));
    assert_eq!(clips[1].label, "hic01");

    let reclip = ClipPlanner::new(5.0, 10.0, "hic").plan(&times, Some(1));
    assert_eq!(reclip.len(), 1);
    assert_eq!(reclip[0].label, "hic01");
}

// ============================================
// Rendering and merging
// ============================================

#[test]
fn test_render_then_merge_is_repeatable() {
    let dir = TempDir::new().unwrap();
    let paths = MediaPaths::new(dir.path(), "stream");
    std::fs::write(paths.video(), b"video").unwrap();
    let renderer = RecordingRenderer::default();

    let clips = ClipPlanner::default().plan(&[12, 3726], None);
    let written = render_clips(&renderer, &paths, &clips).unwrap();
    assert_eq!(written, vec![paths.clip("hic00"), paths.clip("hic01")]);

    // A clip of another suffix sharing the prefix is not picked up.
    std::fs::write(paths.clip("hicx00"), b"other").unwrap();

    let (first, merged) = merge_clips(&renderer, &paths, "hic").unwrap().unwrap();
    assert_eq!(merged, paths.merged("hic"));
    let (second, _) = merge_clips(&renderer, &paths, "hic").unwrap().unwrap();

    assert_eq!(first, written);
    assert_eq!(second, written);
}

// ============================================
// Downloaded chat
// ============================================

#[test]
fn test_staged_chat_feeds_pipeline() {
    let dir = TempDir::new().unwrap();
    let paths = MediaPaths::new(dir.path(), "live");

    let staging = r#"{"time_text":"0:10","message":"hic","author":{"name":"a"}}
{"time_text":"0:11","message":"hic"}
{"time_text":"0:30","message":"HIC"}
{"time_text":"9:00","message":"bye"}
"#;
    let log = chat_log_from_staging(paths.id(), staging).unwrap();
    std::fs::write(paths.chat_log(), serde_json::to_string(&log).unwrap()).unwrap();

    let reloaded = ChatLog::load(&paths.chat_log()).unwrap();
    assert_eq!(reloaded.id, "live");
    assert_eq!(reloaded.chats[0].elapsed_time, "0:10");

    let highlights = highlights_for(&reloaded, "hic_ubye");
    assert_eq!(
        highlights,
        vec![HighlightEvent {
            representative_time: 11,
            member_count: 3,
        }]
    );
}
