//! Rendering backend that drives frames without a window.

use std::time::Duration;

use anyhow::Result as AnyResult;
use tile_defence_rendering::{FrameControl, FrameInput, Presentation, RenderingBackend, Scene};
use tracing::{debug, info, warn};

/// Presents frames at a fixed host step until the callback exits or the
/// frame budget runs out.
#[derive(Clone, Copy, Debug)]
pub(crate) struct HeadlessBackend {
    tick: Duration,
    max_frames: u64,
}

impl HeadlessBackend {
    pub(crate) fn new(tick: Duration, max_frames: u64) -> Self {
        Self { tick, max_frames }
    }
}

impl RenderingBackend for HeadlessBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl,
    {
        let Presentation {
            window_title,
            mut scene,
            ..
        } = presentation;
        info!(title = %window_title, tick_ms = self.tick.as_millis(), "headless run started");

        for frame in 0..self.max_frames {
            if update_scene(self.tick, FrameInput::default(), &mut scene) == FrameControl::Exit {
                debug!(frame, "headless run finished");
                return Ok(());
            }
        }

        warn!(
            frames = self.max_frames,
            headline = scene.headline(),
            "frame budget exhausted before the match ended"
        );
        Ok(())
    }
}
