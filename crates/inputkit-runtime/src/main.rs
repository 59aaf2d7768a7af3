//! inputkit headless runtime entry point.
//!
//! Loads the configuration, builds the demo scene, and replays a scripted
//! input session through the frame processor at the configured frame rate.
//! The session ends when the script runs out or on Ctrl-C; the background
//! task loop is stopped cleanly either way.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context;
use inputkit_core::{FocusManager, Navigation, TaskScheduler, ViewTree};
use inputkit_runtime::application::feedback::TracingFeedback;
use inputkit_runtime::application::frame::FrameProcessor;
use inputkit_runtime::demo;
use inputkit_runtime::infrastructure::input_source::mock::ScriptedInputSource;
use inputkit_runtime::infrastructure::storage::config::load_config;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// How long a blocked-navigation rumble lasts, in frames.
const RUMBLE_FRAMES: u32 = 6;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;

    // RUST_LOG wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.runtime.log_level)),
        )
        .init();

    let settings = config.runtime_settings().context("invalid configuration")?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        frame_rate = config.runtime.frame_rate,
        demo_frames = settings.demo_frames,
        "inputkit runtime starting"
    );

    let seed = settings.shake_seed.unwrap_or_else(clock_seed);
    let focus = FocusManager::new(settings.focus, Box::new(ChaCha8Rng::seed_from_u64(seed)));
    let tasks = TaskScheduler::new();

    let mut tree = ViewTree::new();
    let scene = demo::build_scene(&mut tree, &tasks).context("failed to build the demo scene")?;
    let source = ScriptedInputSource::new(demo::scripted_session(settings.demo_frames));
    let mut processor = FrameProcessor::new(
        source,
        settings.frame,
        focus,
        settings.keyboard.clone(),
        tasks.clone(),
        Box::new(TracingFeedback),
    );
    if let Some(first) = scene.sidebar_items.first() {
        processor.give_focus(&mut tree, *first, Duration::ZERO);
    }

    let task_loop = tasks
        .start_async_loop(settings.async_poll_interval)
        .context("failed to start the async task loop")?;

    // Shared running flag – set to false on Ctrl+C
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, shutting down");
            running_clone.store(false, Ordering::SeqCst);
        }
    });

    let mut interval = tokio::time::interval(settings.frame_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let started = tokio::time::Instant::now();
    let mut frames = 0u32;
    let mut rumble_until: Option<u32> = None;

    while running.load(Ordering::SeqCst) && frames < settings.demo_frames {
        interval.tick().await;
        let report = processor.run_frame(&mut tree, started.elapsed());
        frames += 1;

        if !report.claims.is_empty() {
            debug!(frame = frames, claims = report.claims.len(), "gestures claimed");
        }
        if let Some(Navigation::Blocked { .. }) = report.navigation {
            processor.rumble(0, 0x4000, 0x8000);
            rumble_until = Some(frames + RUMBLE_FRAMES);
        }
        if rumble_until.is_some_and(|end| frames >= end) {
            processor.rumble(0, 0, 0);
            rumble_until = None;
        }
    }

    task_loop.stop().context("async task loop did not stop cleanly")?;
    info!(frames, focused = ?processor.focus().focused(), "inputkit runtime stopped");
    Ok(())
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
