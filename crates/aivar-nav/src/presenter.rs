//! Animated row presenter.
//!
//! Drives the exit/enter pair for one transition at a time. The previous row
//! exits first, then the target row enters (wait mode), so exactly one row is
//! visible in any frame. Completion is reported exactly once per transition.
//!
//! Offsets are fractions of the viewport height: `0.0` is centered, `-1.0`
//! fully above, `+1.0` fully below.

use std::time::Duration;

use serde::Serialize;

use aivar_core::{Direction, EntryDirectionPolicy, NavigationConfig, PresenterError};

use crate::machine::Transition;

/// Durations of the two halves of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionTiming {
    pub exit: Duration,
    pub enter: Duration,
}

impl TransitionTiming {
    pub fn from_config(config: &NavigationConfig) -> Self {
        Self {
            exit: config.exit_duration(),
            enter: config.enter_duration(),
        }
    }

    /// No animation: transitions complete on the next tick.
    pub fn instant() -> Self {
        Self {
            exit: Duration::ZERO,
            enter: Duration::ZERO,
        }
    }

    pub fn total(&self) -> Duration {
        self.exit + self.enter
    }
}

/// Which half of the transition a frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Settled,
    Exiting,
    Entering,
}

/// The visible row for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RowFrame {
    pub index: usize,
    pub offset: f64,
    pub phase: Phase,
}

/// Reported when a transition's exit+enter pair has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionComplete {
    pub target: usize,
}

#[derive(Debug, Clone, Copy)]
struct ActiveTransition {
    from: usize,
    target: usize,
    direction: Direction,
    started_at: Duration,
}

/// Single-slot transition driver.
#[derive(Debug, Clone)]
pub struct AnimatedRowPresenter {
    policy: EntryDirectionPolicy,
    timing: TransitionTiming,
    mounted: usize,
    active: Option<ActiveTransition>,
}

impl AnimatedRowPresenter {
    pub fn new(policy: EntryDirectionPolicy, timing: TransitionTiming) -> Self {
        Self {
            policy,
            timing,
            mounted: 0,
            active: None,
        }
    }

    pub fn from_config(config: &NavigationConfig, animations: bool) -> Self {
        let timing = if animations {
            TransitionTiming::from_config(config)
        } else {
            TransitionTiming::instant()
        };
        Self::new(config.entry_direction, timing)
    }

    /// Row that is mounted when no transition is in flight.
    pub fn mounted(&self) -> usize {
        self.mounted
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    /// Target of the in-flight transition.
    pub fn target(&self) -> Option<usize> {
        self.active.map(|a| a.target)
    }

    /// Start a transition. Only one may be in flight.
    pub fn begin(&mut self, transition: Transition, now: Duration) -> Result<(), PresenterError> {
        if let Some(active) = self.active {
            return Err(PresenterError::Busy {
                target: active.target,
            });
        }

        self.active = Some(ActiveTransition {
            from: transition.from,
            target: transition.target,
            direction: transition.direction,
            started_at: now,
        });
        Ok(())
    }

    /// Mount `index` directly, abandoning any in-flight transition without
    /// reporting its completion.
    pub fn remount(&mut self, index: usize) {
        if let Some(active) = self.active.take() {
            tracing::debug!("Abandoning transition {} -> {}", active.from, active.target);
        }
        self.mounted = index;
    }

    /// Advance time. Returns the completion exactly once, when the pair
    /// has finished; the previous row is unmounted at that point.
    pub fn tick(&mut self, now: Duration) -> Option<TransitionComplete> {
        let active = self.active?;
        if now.saturating_sub(active.started_at) < self.timing.total() {
            return None;
        }

        self.active = None;
        self.mounted = active.target;
        Some(TransitionComplete {
            target: active.target,
        })
    }

    /// Complete the in-flight transition immediately, for renderers that
    /// run the animation themselves and report when it ends.
    pub fn finish(&mut self) -> Option<TransitionComplete> {
        let active = self.active.take()?;
        self.mounted = active.target;
        Some(TransitionComplete {
            target: active.target,
        })
    }

    /// The visible row at `now`.
    pub fn frame(&self, now: Duration) -> RowFrame {
        let Some(active) = self.active else {
            return RowFrame {
                index: self.mounted,
                offset: 0.0,
                phase: Phase::Settled,
            };
        };

        // Exit toward the top when moving forward, the bottom otherwise;
        // enter from the opposite edge.
        let edge = match (self.policy, active.direction) {
            (EntryDirectionPolicy::Fixed, _) | (_, Direction::Forward) => 1.0,
            _ => -1.0,
        };

        let elapsed = now.saturating_sub(active.started_at);
        if elapsed < self.timing.exit {
            let t = progress(elapsed, self.timing.exit);
            RowFrame {
                index: active.from,
                offset: -edge * ease_in(t),
                phase: Phase::Exiting,
            }
        } else {
            let t = progress(elapsed - self.timing.exit, self.timing.enter);
            RowFrame {
                index: active.target,
                offset: edge * (1.0 - ease_out(t)),
                phase: Phase::Entering,
            }
        }
    }
}

fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

fn ease_in(t: f64) -> f64 {
    t * t * t
}

fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn presenter(policy: EntryDirectionPolicy) -> AnimatedRowPresenter {
        AnimatedRowPresenter::new(
            policy,
            TransitionTiming {
                exit: ms(200),
                enter: ms(400),
            },
        )
    }

    fn forward(from: usize, target: usize) -> Transition {
        Transition {
            from,
            target,
            direction: Direction::Forward,
        }
    }

    fn backward(from: usize, target: usize) -> Transition {
        Transition {
            from,
            target,
            direction: Direction::Backward,
        }
    }

    #[test]
    fn test_settled_frame() {
        let p = presenter(EntryDirectionPolicy::Directional);
        let frame = p.frame(ms(0));
        assert_eq!(frame.index, 0);
        assert_eq!(frame.offset, 0.0);
        assert_eq!(frame.phase, Phase::Settled);
    }

    #[test]
    fn test_single_slot() {
        let mut p = presenter(EntryDirectionPolicy::Directional);
        p.begin(forward(0, 1), ms(0)).unwrap();
        assert_eq!(
            p.begin(forward(1, 2), ms(10)),
            Err(PresenterError::Busy { target: 1 })
        );
        assert_eq!(p.target(), Some(1));
    }

    #[test]
    fn test_completion_fires_once() {
        let mut p = presenter(EntryDirectionPolicy::Directional);
        p.begin(forward(0, 1), ms(100)).unwrap();

        assert_eq!(p.tick(ms(300)), None);
        assert_eq!(p.tick(ms(699)), None);
        assert_eq!(p.tick(ms(700)), Some(TransitionComplete { target: 1 }));
        assert_eq!(p.tick(ms(800)), None);
        assert_eq!(p.mounted(), 1);
        assert!(!p.is_busy());
    }

    #[test]
    fn test_forward_exits_up_enters_from_below() {
        let mut p = presenter(EntryDirectionPolicy::Directional);
        p.begin(forward(0, 1), ms(0)).unwrap();

        let exiting = p.frame(ms(100));
        assert_eq!(exiting.index, 0);
        assert_eq!(exiting.phase, Phase::Exiting);
        assert!(exiting.offset < 0.0);

        let entering = p.frame(ms(250));
        assert_eq!(entering.index, 1);
        assert_eq!(entering.phase, Phase::Entering);
        assert!(entering.offset > 0.0);

        assert_eq!(p.frame(ms(600)).offset, 0.0);
    }

    #[test]
    fn test_backward_exits_down_enters_from_above() {
        let mut p = presenter(EntryDirectionPolicy::Directional);
        p.begin(backward(2, 1), ms(0)).unwrap();
        assert!(p.frame(ms(100)).offset > 0.0);
        assert!(p.frame(ms(300)).offset < 0.0);
    }

    #[test]
    fn test_fixed_policy_always_enters_from_below() {
        let mut p = presenter(EntryDirectionPolicy::Fixed);
        p.begin(backward(2, 1), ms(0)).unwrap();
        assert!(p.frame(ms(100)).offset < 0.0);
        assert!(p.frame(ms(300)).offset > 0.0);
    }

    #[test]
    fn test_offsets_are_monotonic() {
        let mut p = presenter(EntryDirectionPolicy::Directional);
        p.begin(forward(0, 1), ms(0)).unwrap();

        let mut last_exit = 0.0;
        for t in (0..200).step_by(20) {
            let offset = p.frame(ms(t)).offset;
            assert!(offset <= last_exit);
            last_exit = offset;
        }
        let mut last_enter = f64::MAX;
        for t in (200..=600).step_by(40) {
            let offset = p.frame(ms(t)).offset;
            assert!(offset <= last_enter);
            assert!((0.0..=1.0).contains(&offset));
            last_enter = offset;
        }
    }

    #[test]
    fn test_instant_timing_completes_on_next_tick() {
        let mut p = AnimatedRowPresenter::new(
            EntryDirectionPolicy::Directional,
            TransitionTiming::instant(),
        );
        p.begin(forward(0, 1), ms(50)).unwrap();
        assert_eq!(p.frame(ms(50)).offset, 0.0);
        assert_eq!(p.tick(ms(50)), Some(TransitionComplete { target: 1 }));
    }

    #[test]
    fn test_remount_abandons_transition() {
        let mut p = presenter(EntryDirectionPolicy::Directional);
        p.begin(backward(6, 5), ms(0)).unwrap();
        p.remount(4);
        assert!(!p.is_busy());
        assert_eq!(
            p.frame(ms(50)),
            RowFrame {
                index: 4,
                offset: 0.0,
                phase: Phase::Settled
            }
        );
        assert_eq!(p.tick(ms(600)), None);
    }

    #[test]
    fn test_remount_while_settled() {
        let mut p = presenter(EntryDirectionPolicy::Directional);
        p.remount(3);
        assert_eq!(p.frame(ms(0)).index, 3);
    }
}
