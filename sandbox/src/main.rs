// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


// Drives a runtime the way a game loop would: a render thread queues
// notifications while the logic thread runs frames.

use anyhow::Result;
use cadence_runtime::{
    ClosureTask, Curve, DelayTask, Event, EventType, FrameClock, InterpolateTask, Listener,
    Runtime, RuntimeConfig, SignalEvent, TaskRef,
};
use clap::Parser;
use std::any::Any;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const GAME_OVER: EventType = 0x01;
const FRAME_PACING: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "sandbox", version, about = "Cadence runtime demo")]
struct Cli {
    /// Number of logic frames to run.
    #[arg(long, default_value_t = 180)]
    frames: u32,

    /// Fixed seconds per logic frame. Measured from the wall clock when omitted.
    #[arg(long)]
    dt: Option<f32>,

    /// JSON runtime configuration.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Queued by the render thread once per presented frame.
#[derive(Debug)]
struct FramePresented {
    index: u64,
}

impl FramePresented {
    const TYPE: EventType = 0x02;
}

impl Event for FramePresented {
    fn event_type(&self) -> EventType {
        Self::TYPE
    }

    fn name(&self) -> &'static str {
        "FramePresented"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => RuntimeConfig::from_file(path)?,
        None => RuntimeConfig::default(),
    };
    let mut runtime = Runtime::new(config);

    let presented = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&presented);
    let on_presented = Listener::infallible(move |event| {
        if let Some(frame) = event.downcast_ref::<FramePresented>() {
            counter.store(frame.index, Ordering::Relaxed);
        }
    });
    runtime
        .events()
        .add_listener(&on_presented, FramePresented::TYPE);

    let on_game_over = Listener::infallible(|event| {
        log::info!("'{}' received at t={:.2}s.", event.name(), event.timestamp());
    });
    runtime.events().add_listener(&on_game_over, GAME_OVER);

    // Fade in, hold, then announce the end.
    let fade = TaskRef::new(
        InterpolateTask::new(0.0, 1.0, 1.0, |alpha| log::debug!("Fade alpha: {alpha:.3}"))
            .with_curve(Curve::EaseInOutSine),
    );
    let events = Arc::clone(runtime.events());
    let announce = ClosureTask::new(move || {
        events.trigger(SignalEvent::new(GAME_OVER, "GameOver").at(2.0).shared(), 0.5);
    })
    .named("AnnounceGameOver");
    runtime
        .submitter()
        .submit(fade.then(TaskRef::new(DelayTask::new(0.5))).then(TaskRef::new(announce)));

    let running = Arc::new(AtomicBool::new(true));
    let render = {
        let running = Arc::clone(&running);
        let events = Arc::clone(runtime.events());
        thread::Builder::new()
            .name("render".to_string())
            .spawn(move || {
                let mut index = 0;
                while running.load(Ordering::Relaxed) {
                    index += 1;
                    events.queue(Arc::new(FramePresented { index }));
                    thread::sleep(Duration::from_millis(8));
                }
            })?
    };

    let mut clock = FrameClock::new();
    for _ in 0..cli.frames {
        thread::sleep(FRAME_PACING);
        let dt = cli.dt.unwrap_or_else(|| clock.delta());
        let report = runtime.frame(dt);
        if report.tick.succeeded + report.tick.failed > 0 {
            log::info!(
                "Frame {}: {} chain(s) succeeded, {} failed.",
                runtime.frame_count(),
                report.tick.succeeded,
                report.tick.failed
            );
        }
    }

    running.store(false, Ordering::Relaxed);
    if render.join().is_err() {
        log::error!("Render thread panicked.");
    }
    log::info!(
        "Last presented frame seen by the logic thread: {}.",
        presented.load(Ordering::Relaxed)
    );
    runtime.shutdown();
    Ok(())
}
