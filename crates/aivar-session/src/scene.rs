//! Embedded 3D scene loading and frame rate monitoring.
//!
//! Scene failures are contained here: the hero shows a fallback and the
//! rest of the page keeps working.

use std::time::Duration;

use futures::future::BoxFuture;
use serde::Serialize;

use aivar_core::{SceneConfig, SessionError};

/// Shown in place of a scene that failed to load.
pub const SCENE_FALLBACK: &str = "3D content unavailable";

/// Renderer that fetches and mounts a scene.
pub trait SceneSource: Send + Sync {
    fn load(&self, url: String) -> BoxFuture<'static, Result<(), SessionError>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum SceneState {
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SceneLoader {
    url: String,
    state: SceneState,
}

impl SceneLoader {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            url: config.url.clone(),
            state: SceneState::Loading,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> &SceneState {
        &self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.state == SceneState::Loaded
    }

    /// Fallback text to show instead of the scene, if any.
    pub fn fallback(&self) -> Option<&'static str> {
        matches!(self.state, SceneState::Failed(_)).then_some(SCENE_FALLBACK)
    }

    pub async fn load(&mut self, source: &dyn SceneSource) -> &SceneState {
        self.state = SceneState::Loading;
        match source.load(self.url.clone()).await {
            Ok(()) => self.on_load(),
            Err(e) => self.on_error(&e),
        }
        &self.state
    }

    pub fn on_load(&mut self) {
        tracing::info!("Scene loaded: {}", self.url);
        self.state = SceneState::Loaded;
    }

    pub fn on_error(&mut self, error: &SessionError) {
        tracing::warn!("Scene failed to load: {}", error);
        self.state = SceneState::Failed(error.to_string());
    }
}

// =============================================================================
// Frame Rate Monitor
// =============================================================================

/// Result of one measurement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FpsSample {
    pub fps: u32,
    /// 0 to 100.
    pub score: u32,
    pub warning: bool,
}

/// Counts rendered frames in windows of at least one second.
#[derive(Debug, Clone)]
pub struct FrameRateMonitor {
    enabled: bool,
    threshold: u32,
    starts_at: Duration,
    window_start: Option<Duration>,
    frames: u32,
    last: Option<FpsSample>,
}

impl FrameRateMonitor {
    /// Monitoring begins `warmup_ms` after `loaded_at`.
    pub fn new(config: &SceneConfig, loaded_at: Duration) -> Self {
        Self {
            enabled: config.monitoring,
            threshold: config.fps_threshold,
            starts_at: loaded_at + Duration::from_millis(config.warmup_ms),
            window_start: None,
            frames: 0,
            last: None,
        }
    }

    pub fn is_monitoring(&self, now: Duration) -> bool {
        self.enabled && now >= self.starts_at
    }

    pub fn last_sample(&self) -> Option<FpsSample> {
        self.last
    }

    /// Performance score of the last window, 100 before any measurement.
    pub fn score(&self) -> u32 {
        self.last.map_or(100, |s| s.score)
    }

    pub fn warning(&self) -> bool {
        self.last.is_some_and(|s| s.warning)
    }

    /// Record a rendered frame. Returns a sample when a window closes.
    pub fn record_frame(&mut self, now: Duration) -> Option<FpsSample> {
        if !self.is_monitoring(now) {
            return None;
        }
        let Some(window_start) = self.window_start else {
            self.window_start = Some(now);
            return None;
        };

        self.frames += 1;
        let elapsed = now.saturating_sub(window_start);
        if elapsed < Duration::from_secs(1) {
            return None;
        }

        let fps = (f64::from(self.frames) * 1000.0 / elapsed.as_millis() as f64).round() as u32;
        let sample = FpsSample {
            fps,
            score: fps.saturating_mul(2).min(100),
            warning: fps < self.threshold,
        };
        if sample.warning {
            tracing::warn!("Scene performance warning: {} FPS", fps);
        }

        self.frames = 0;
        self.window_start = Some(now);
        self.last = Some(sample);
        Some(sample)
    }
}
