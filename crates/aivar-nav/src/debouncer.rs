//! Gesture classification.
//!
//! Turns raw wheel deltas and touch start/end pairs into at most one
//! [`NavigationIntent`] per qualifying gesture. Timestamps are monotonic
//! offsets from an arbitrary origin.

use std::time::Duration;

use aivar_core::{NavigationConfig, NavigationIntent, Rejection};

/// Classifies gestures, enforcing a minimum magnitude and a cooldown
/// between accepted intents.
#[derive(Debug, Clone)]
pub struct GestureDebouncer {
    threshold: f64,
    cooldown: Duration,
    /// Timestamp of the last intent that moved the page.
    last_accepted: Option<Duration>,
}

impl GestureDebouncer {
    pub fn new(threshold: f64, cooldown: Duration) -> Self {
        Self {
            threshold,
            cooldown,
            last_accepted: None,
        }
    }

    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(config.scroll_threshold, config.cooldown())
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn last_accepted(&self) -> Option<Duration> {
        self.last_accepted
    }

    /// Classify a wheel event and start the cooldown if it yields an
    /// intent. Positive deltas advance.
    pub fn classify_wheel(&mut self, delta_y: f64, now: Duration) -> NavigationIntent {
        let intent = self
            .try_classify_wheel(delta_y, now)
            .unwrap_or(NavigationIntent::None);
        self.commit(intent, now)
    }

    /// Classify a wheel event without touching the cooldown timer.
    ///
    /// Call [`accept`](Self::accept) once the intent has actually moved the
    /// page.
    pub fn try_classify_wheel(
        &self,
        delta_y: f64,
        now: Duration,
    ) -> Result<NavigationIntent, Rejection> {
        self.classify(delta_y, now)
    }

    /// Classify a finished touch. `start_y` is `None` when no touch sequence
    /// is active, which always yields `None`.
    ///
    /// Swiping up (start below end on screen) advances.
    pub fn classify_touch(
        &mut self,
        start_y: Option<f64>,
        end_y: f64,
        now: Duration,
    ) -> NavigationIntent {
        let intent = self
            .try_classify_touch(start_y, end_y, now)
            .unwrap_or(NavigationIntent::None);
        self.commit(intent, now)
    }

    pub fn try_classify_touch(
        &self,
        start_y: Option<f64>,
        end_y: f64,
        now: Duration,
    ) -> Result<NavigationIntent, Rejection> {
        let start_y = start_y.ok_or(Rejection::NoActiveTouch)?;
        self.classify(start_y - end_y, now)
    }

    /// Start the cooldown from `now`.
    pub fn accept(&mut self, now: Duration) {
        self.last_accepted = Some(now);
    }

    fn commit(&mut self, intent: NavigationIntent, now: Duration) -> NavigationIntent {
        if intent.is_some() {
            self.accept(now);
        }
        intent
    }

    fn classify(&self, delta: f64, now: Duration) -> Result<NavigationIntent, Rejection> {
        if let Some(last) = self.last_accepted {
            if now.saturating_sub(last) < self.cooldown {
                return Err(Rejection::CoolingDown);
            }
        }

        if delta.is_nan() || delta.abs() < self.threshold {
            return Err(Rejection::BelowThreshold);
        }

        if delta > 0.0 {
            Ok(NavigationIntent::Advance)
        } else {
            Ok(NavigationIntent::Retreat)
        }
    }

    /// Forget the cooldown timer.
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}

/// Tracks the active touch sequence inside the navigable region.
#[derive(Debug, Clone, Default)]
pub struct TouchTracker {
    start_y: Option<f64>,
}

impl TouchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn touch_start(&mut self, y: f64) {
        self.start_y = y.is_finite().then_some(y);
    }

    /// Returns `true` when default scrolling must be suppressed, i.e. the
    /// touch started inside the region.
    pub fn touch_move(&self) -> bool {
        self.start_y.is_some()
    }

    /// Finish the sequence, returning the recorded start (if any).
    pub fn touch_end(&mut self) -> Option<f64> {
        self.start_y.take()
    }

    pub fn touch_cancel(&mut self) {
        self.start_y = None;
    }

    pub fn is_active(&self) -> bool {
        self.start_y.is_some()
    }
}
