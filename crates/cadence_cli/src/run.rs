//! Headless host loop
//!
//! Plays a sequence file with a fixed frame delta, standing in for a
//! renderer's per-frame update.

use anyhow::Result;
use cadence_animation::PlaybackState;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::{MarkerLog, SequenceFile};

/// Cap for sequences that would otherwise play forever
pub const DEFAULT_MAX_SECONDS: f32 = 30.0;

/// Options for a simulated run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub fps: u32,
    /// Stop after this many frames
    pub frames: Option<u64>,
    /// Stop after this much simulated time
    pub seconds: Option<f32>,
    /// Report every Nth frame (the last frame is always reported)
    pub every: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fps: 60,
            frames: None,
            seconds: None,
            every: 1,
        }
    }
}

impl RunOptions {
    /// Frame budget for this run
    fn frame_limit(&self) -> u64 {
        let fps = self.fps.max(1) as f32;
        match (self.frames, self.seconds) {
            (Some(frames), _) => frames,
            (None, Some(seconds)) => (seconds.max(0.0) * fps).ceil() as u64,
            (None, None) => (DEFAULT_MAX_SECONDS * fps).ceil() as u64,
        }
    }
}

/// Snapshot of the animated record after one frame
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub index: u64,
    pub time: f32,
    pub step: usize,
    pub state: &'static str,
    pub fields: BTreeMap<String, f32>,
}

/// Outcome of a run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub name: String,
    pub frames: u64,
    pub time: f32,
    pub finished: bool,
    pub cycles: u32,
    pub markers: Vec<String>,
    pub fields: BTreeMap<String, f32>,
}

fn state_name(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Idle => "idle",
        PlaybackState::Playing => "playing",
        PlaybackState::Stopped => "stopped",
        PlaybackState::Finished => "finished",
    }
}

/// Play `file`, handing every reported frame to `on_frame`.
///
/// Without an explicit frame or time budget the run ends when the
/// sequence finishes, or after [`DEFAULT_MAX_SECONDS`].
pub fn simulate(
    file: &SequenceFile,
    options: &RunOptions,
    mut on_frame: impl FnMut(&Frame) -> Result<()>,
) -> Result<RunReport> {
    let markers = MarkerLog::default();
    let mut anim = file.build(markers.clone())?;

    let dt = 1.0 / options.fps.max(1) as f32;
    let limit = options.frame_limit();
    let until_finished = options.frames.is_none() && options.seconds.is_none();
    let every = options.every.max(1);

    tracing::info!(
        name = %file.sequence.name,
        fps = options.fps,
        limit,
        "starting run"
    );

    let mut index = 0;
    while index < limit {
        anim.update(dt);
        index += 1;

        let done = until_finished && anim.is_finished();
        if index % every == 0 || index == limit || done {
            let frame = Frame {
                index,
                time: index as f32 * dt,
                step: anim.current_step(),
                state: state_name(anim.state()),
                fields: anim.target().iter().map(|(k, v)| (k.to_string(), v)).collect(),
            };
            on_frame(&frame)?;
        }
        if done {
            break;
        }
    }

    if until_finished && !anim.is_finished() {
        tracing::warn!(
            seconds = DEFAULT_MAX_SECONDS,
            "sequence still playing at the default time cap"
        );
    }

    let markers = markers.lock().map(|log| log.clone()).unwrap_or_default();
    Ok(RunReport {
        name: file.sequence.name.clone(),
        frames: index,
        time: index as f32 * dt,
        finished: anim.is_finished(),
        cycles: anim.completed_cycles(),
        markers,
        fields: anim
            .target()
            .iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    })
}
