//! Replays a recorded pointer trace and logs the move events it produces.
//!
//! Run with `RUST_LOG=info` (or `debug` to see sessions and frames).

mod trace;

use std::{
    env,
    rc::Rc,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use tokio::time;
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceId, ElementState, MouseButton, WindowEvent},
};

use glide_dom::{Document, PointerTranslator};
use glide_frames::Frames;
use glide_input::{MoveEvents, MoveKind};

use trace::{Step, Trace};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .context("Usage: glide-replay <trace.toml>")?;
    let trace = Trace::load(&path)?;
    replay(&trace).await
}

async fn replay(trace: &Trace) -> Result<()> {
    let doc = Rc::new(Document::new());
    let element = doc.create_element(Document::ROOT)?;
    let bounds = trace.element_bounds();
    let frames = Rc::new(trace.config.frames());
    let events = MoveEvents::with_config(doc.clone(), frames.clone(), &trace.config)?;

    let subscriptions: Vec<_> = MoveKind::ALL
        .iter()
        .map(|kind| {
            events.subscribe(element, *kind, |event| {
                info!(
                    "{}: page ({}, {}), delta ({}, {})",
                    event.kind, event.page_x, event.page_y, event.delta_x, event.delta_y
                );
                Ok(())
            })
        })
        .collect();

    let mut translator = PointerTranslator::new(trace.scale_factor);
    for step in &trace.steps {
        let window_event = match *step {
            Step::Move { x, y } => cursor_moved(x, y),
            Step::Press => mouse_input(ElementState::Pressed),
            Step::Release => mouse_input(ElementState::Released),
            Step::Frame => {
                let fired = frames.run(Instant::now())?;
                debug!("Frame ran {fired} callbacks");
                continue;
            }
            Step::Wait { ms } => {
                wait(&frames, Duration::from_millis(ms)).await?;
                continue;
            }
        };

        let hit_test = |pos| {
            if bounds.contains(pos) {
                element
            } else {
                Document::ROOT
            }
        };
        let Some(event) = translator.translate(&window_event, Instant::now(), hit_test) else {
            warn!("Ignoring {step:?} before the first cursor movement");
            continue;
        };
        doc.dispatch(event)?;
    }

    for subscription in subscriptions {
        events.unsubscribe(subscription);
    }
    info!(
        "Replayed {} steps, {} bindings left",
        trace.steps.len(),
        events.binding_count()
    );
    Ok(())
}

/// Sleep for `duration`, firing timer frames as they become due.
async fn wait(frames: &Frames, duration: Duration) -> Result<()> {
    let until = Instant::now() + duration;
    while let Some(deadline) = frames.next_deadline().filter(|d| *d <= until) {
        time::sleep_until(time::Instant::from_std(deadline)).await;
        frames.run(Instant::now())?;
    }
    time::sleep_until(time::Instant::from_std(until)).await;
    Ok(())
}

fn cursor_moved(x: f64, y: f64) -> WindowEvent {
    WindowEvent::CursorMoved {
        device_id: DeviceId::dummy(),
        position: PhysicalPosition::new(x, y),
    }
}

fn mouse_input(state: ElementState) -> WindowEvent {
    WindowEvent::MouseInput {
        device_id: DeviceId::dummy(),
        state,
        button: MouseButton::Left,
    }
}
