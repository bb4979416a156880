//! JSON-lines input replay.
//!
//! Each line is `{"at_ms": <u64>, "event": {"type": ..., ...}}`. Blank lines
//! and lines starting with `#` are skipped. Every record produces one
//! [`ReplayStep`] written as a JSON line. Frame records can also feed a
//! [`FrameRateMonitor`], whose samples are reported alongside the frame.

use std::io::{BufRead, Write};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use aivar_nav::{EventDisposition, InputEvent, NavigationSnapshot, RowFrame, RowNavigator};
use aivar_session::{FpsSample, FrameRateMonitor};

use crate::error::SiteError;

/// Marker for the animation tick record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FrameTick {
    Frame,
}

/// Event carried by one script record.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ScriptEvent {
    Input(InputEvent),
    /// Advance animation time and render.
    Frame(FrameTick),
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScriptRecord {
    pub at_ms: u64,
    pub event: ScriptEvent,
}

impl ScriptRecord {
    pub fn parse(line: &str, line_number: usize) -> Result<Self, SiteError> {
        serde_json::from_str(line).map_err(|e| SiteError::Script {
            line: line_number,
            message: e.to_string(),
        })
    }
}

/// Output for one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayStep {
    pub at_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disposition: Option<EventDisposition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<RowFrame>,
    /// Set when a frame closed a frame rate measurement window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<FpsSample>,
    pub snapshot: NavigationSnapshot,
}

pub struct Replayer {
    navigator: RowNavigator,
    monitor: Option<FrameRateMonitor>,
}

impl Replayer {
    pub fn new(navigator: RowNavigator) -> Self {
        Self {
            navigator,
            monitor: None,
        }
    }

    /// Count frame records against `monitor`.
    pub fn with_frame_monitor(mut self, monitor: FrameRateMonitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn navigator(&self) -> &RowNavigator {
        &self.navigator
    }

    pub fn step(&mut self, record: ScriptRecord) -> ReplayStep {
        let now = Duration::from_millis(record.at_ms);
        let (disposition, frame, fps) = match record.event {
            ScriptEvent::Input(event) => (Some(self.navigator.handle(event, now)), None, None),
            ScriptEvent::Frame(_) => {
                let frame = self.navigator.frame(now);
                let fps = self.monitor.as_mut().and_then(|m| m.record_frame(now));
                (None, Some(frame), fps)
            }
        };

        ReplayStep {
            at_ms: record.at_ms,
            disposition,
            frame,
            fps,
            snapshot: self.navigator.snapshot(),
        }
    }

    /// Replay a whole script. Returns the number of records processed.
    pub fn run(&mut self, input: impl BufRead, mut output: impl Write) -> Result<usize, SiteError> {
        let mut count = 0;
        for (index, line) in input.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let record = ScriptRecord::parse(line, index + 1)?;
            let step = self.step(record);
            serde_json::to_writer(&mut output, &step)?;
            writeln!(output)?;
            count += 1;
        }
        output.flush()?;
        tracing::info!("Replayed {} records", count);
        Ok(count)
    }
}
