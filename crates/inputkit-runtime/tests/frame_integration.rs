//! Integration tests: the frame processor driven by a scripted input source.
//!
//! These exercise the whole per-frame pipeline the way the headless binary
//! runs it: configuration → settings → processor → scripted session.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use inputkit_core::{
    ControllerButton, FocusManager, KeyCode, KeyboardMapping, Navigation, Rect, TaskScheduler, ViewTree,
};
use inputkit_runtime::application::feedback::{FeedbackKind, FeedbackSink};
use inputkit_runtime::application::frame::{FrameProcessor, FrameSettings};
use inputkit_runtime::demo;
use inputkit_runtime::infrastructure::input_source::mock::{ScriptedFrame, ScriptedInputSource};
use inputkit_runtime::infrastructure::storage::config::AppConfig;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

const FRAME: Duration = Duration::from_millis(16);

/// Records every feedback request in order.
#[derive(Clone, Default)]
struct RecordingFeedback {
    played: Arc<Mutex<Vec<FeedbackKind>>>,
}

impl RecordingFeedback {
    fn played(&self) -> Vec<FeedbackKind> {
        self.played.lock().unwrap().clone()
    }
}

impl FeedbackSink for RecordingFeedback {
    fn play(&mut self, kind: FeedbackKind) {
        self.played.lock().unwrap().push(kind);
    }
}

fn processor_with(
    frames: Vec<ScriptedFrame>,
    settings: FrameSettings,
    keyboard: KeyboardMapping,
    tasks: TaskScheduler,
    feedback: RecordingFeedback,
) -> FrameProcessor<ScriptedInputSource> {
    FrameProcessor::new(
        ScriptedInputSource::new(frames),
        settings,
        FocusManager::new(Default::default(), Box::new(ChaCha8Rng::seed_from_u64(11))),
        keyboard,
        tasks,
        Box::new(feedback),
    )
}

#[test]
fn test_demo_session_produces_expected_feedback_and_focus() {
    // Arrange
    let mut tree = ViewTree::new();
    let tasks = TaskScheduler::new();
    let scene = demo::build_scene(&mut tree, &tasks).unwrap();
    let feedback = RecordingFeedback::default();
    let mut p = processor_with(
        demo::scripted_session(180),
        FrameSettings::default(),
        KeyboardMapping::default(),
        tasks.clone(),
        feedback.clone(),
    );
    p.give_focus(&mut tree, scene.sidebar_items[0], Duration::ZERO);

    // Act
    let reports: Vec<_> = (1..=180u32).map(|i| p.run_frame(&mut tree, FRAME * i)).collect();

    // Assert
    use FeedbackKind::*;
    assert_eq!(
        feedback.played(),
        vec![FocusChange, FocusChange, Click, FocusError, Click, Click, FocusChange, Click]
    );
    assert_eq!(p.focus().focused(), Some(scene.sidebar_items[1]));
    assert_eq!(tasks.pending_async(), 2, "two confirms deferred their work");
    assert!(tree.get(scene.sidebar_items[2]).unwrap().shake().is_none(), "shake finished");
    assert!(reports
        .iter()
        .any(|r| matches!(r.navigation, Some(Navigation::Blocked { shaken: Some(v) }) if v == scene.sidebar_items[2])));
    let claims: usize = reports.iter().map(|r| r.claims.len()).sum();
    assert_eq!(claims, 3, "touch tap, pan and mouse tap");
    assert_eq!(p.arbiter().active_sequences(), 0);
}

#[test]
fn test_configured_key_bindings_drive_navigation() {
    // Arrange
    let cfg: AppConfig = toml::from_str(
        r#"
[input]
key_bindings = [{ key = "KeyS", button = "Down" }]
"#,
    )
    .unwrap();
    let settings = cfg.runtime_settings().unwrap();
    let mut tree = ViewTree::new();
    let scene = demo::build_scene(&mut tree, &TaskScheduler::new()).unwrap();
    let frames = vec![
        ScriptedFrame::new().key(KeyCode::ArrowDown, true),
        ScriptedFrame::new().key(KeyCode::ArrowDown, false),
        ScriptedFrame::new().key(KeyCode::KeyS, true),
    ];
    let mut p = processor_with(
        frames,
        settings.frame,
        settings.keyboard.clone(),
        TaskScheduler::new(),
        RecordingFeedback::default(),
    );
    p.give_focus(&mut tree, scene.sidebar_items[0], Duration::ZERO);

    // Act
    let reports: Vec<_> = (1..=3u32).map(|i| p.run_frame(&mut tree, FRAME * i)).collect();

    // Assert: arrows are unbound once bindings are configured
    assert!(reports[0].navigation.is_none());
    assert!(reports[2].navigation.is_some());
    assert_eq!(p.focus().focused(), Some(scene.sidebar_items[1]));
}

#[test]
fn test_removing_view_mid_drag_is_harmless() {
    // Arrange
    let mut tree = ViewTree::new();
    let scene = demo::build_scene(&mut tree, &TaskScheduler::new()).unwrap();
    let mut frames: Vec<_> = (0..4)
        .map(|k| ScriptedFrame::new().touch(0, 700.0, 300.0 + k as f32 * 3.0))
        .collect();
    frames.push(ScriptedFrame::new());
    let mut p = processor_with(
        frames,
        FrameSettings::default(),
        KeyboardMapping::default(),
        TaskScheduler::new(),
        RecordingFeedback::default(),
    );
    p.run_frame(&mut tree, FRAME);
    assert_eq!(p.arbiter().active_sequences(), 1);

    // Act
    p.remove_view(&mut tree, scene.content).unwrap();
    let reports: Vec<_> = (2..=5u32).map(|i| p.run_frame(&mut tree, FRAME * i)).collect();

    // Assert
    assert!(!tree.contains(scene.content));
    assert!(reports.iter().all(|r| r.claims.is_empty()));
    assert_eq!(p.arbiter().active_sequences(), 0);
}

#[test]
fn test_transparent_view_is_not_hit_and_not_focusable() {
    let mut tree = ViewTree::new();
    let root = tree.add_root("root", Rect::new(0.0, 0.0, 200.0, 100.0));
    let left = tree.add_child(root, "left", Rect::new(0.0, 0.0, 100.0, 100.0)).unwrap();
    let right = tree.add_child(root, "right", Rect::new(100.0, 0.0, 100.0, 100.0)).unwrap();
    for id in [left, right] {
        tree.get_mut(id).unwrap().set_focusable(true);
    }
    tree.get_mut(right).unwrap().set_alpha(0.0);
    let frames = vec![ScriptedFrame::new().press(ControllerButton::Right)];
    let feedback = RecordingFeedback::default();
    let mut p = processor_with(
        frames,
        FrameSettings::default(),
        KeyboardMapping::default(),
        TaskScheduler::new(),
        feedback.clone(),
    );
    p.give_focus(&mut tree, left, Duration::ZERO);

    let report = p.run_frame(&mut tree, FRAME);

    assert_eq!(report.navigation, Some(Navigation::Blocked { shaken: Some(left) }));
    assert_eq!(feedback.played(), vec![FeedbackKind::FocusError]);
}

#[test]
fn test_rumble_start_and_stop_reach_the_source() {
    let mut p = processor_with(
        Vec::new(),
        FrameSettings::default(),
        KeyboardMapping::default(),
        TaskScheduler::new(),
        RecordingFeedback::default(),
    );

    p.rumble(0, 0x4000, 0x8000);
    p.rumble(0, 0, 0);

    let log = p.source().rumble_commands();
    assert_eq!(log.len(), 2);
    assert_eq!((log[1].low_frequency, log[1].high_frequency), (0, 0));
}
