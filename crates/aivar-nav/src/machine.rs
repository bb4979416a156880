//! Row navigation state machine.
//!
//! `Idle(current)` accepts intents; `Transitioning(from, target, direction)`
//! drops them until the presenter reports completion. The visible row and the
//! animated row therefore never diverge, at the cost of dropping rapid
//! repeated gestures.

use serde::Serialize;

use aivar_core::{DeviceChangePolicy, Direction, NavigationIntent, Rejection};

// =============================================================================
// Navigation State
// =============================================================================

/// Navigation state. Initial: `Idle { current: 0 }`. No terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NavigationState {
    /// Ready for the next intent.
    Idle { current: usize },
    /// A transition is animating; intents are dropped.
    Transitioning {
        from: usize,
        target: usize,
        direction: Direction,
    },
}

impl Default for NavigationState {
    fn default() -> Self {
        NavigationState::Idle { current: 0 }
    }
}

impl NavigationState {
    /// The row index the page is on. During a transition this is already
    /// the target row.
    pub fn current_row_index(&self) -> usize {
        match *self {
            NavigationState::Idle { current } => current,
            NavigationState::Transitioning { target, .. } => target,
        }
    }

    /// The animation lock.
    pub fn is_animating(&self) -> bool {
        matches!(self, NavigationState::Transitioning { .. })
    }

    /// Pure transition function.
    ///
    /// Returns the next state, or why the intent left the state unchanged.
    pub fn apply_intent(
        self,
        intent: NavigationIntent,
        max_row_index: usize,
    ) -> Result<NavigationState, Rejection> {
        let current = match self {
            NavigationState::Transitioning { .. } => return Err(Rejection::TransitionInProgress),
            NavigationState::Idle { current } => current,
        };

        let target = match intent {
            NavigationIntent::Advance if current < max_row_index => current + 1,
            NavigationIntent::Retreat if current > 0 => current - 1,
            NavigationIntent::Advance | NavigationIntent::Retreat => {
                return Err(Rejection::OutOfBounds)
            }
            NavigationIntent::None => return Err(Rejection::BelowThreshold),
        };

        Ok(NavigationState::Transitioning {
            from: current,
            target,
            direction: intent.direction(),
        })
    }

    /// Completion of the in-flight transition. A no-op while idle.
    pub fn on_transition_complete(self) -> NavigationState {
        match self {
            NavigationState::Transitioning { target, .. } => {
                NavigationState::Idle { current: target }
            }
            idle => idle,
        }
    }
}

// =============================================================================
// Transition
// =============================================================================

/// An accepted transition, handed to the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub from: usize,
    pub target: usize,
    pub direction: Direction,
}

// =============================================================================
// State Machine
// =============================================================================

/// Owns the [`NavigationState`] and the active row bound.
#[derive(Debug, Clone)]
pub struct RowNavigationStateMachine {
    state: NavigationState,
    max_row_index: usize,
    /// Direction of the last accepted transition.
    direction: Direction,
}

impl RowNavigationStateMachine {
    pub fn new(max_row_index: usize) -> Self {
        Self {
            state: NavigationState::default(),
            max_row_index,
            direction: Direction::Still,
        }
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn current_row_index(&self) -> usize {
        self.state.current_row_index()
    }

    pub fn is_animating(&self) -> bool {
        self.state.is_animating()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn max_row_index(&self) -> usize {
        self.max_row_index
    }

    /// Apply an intent. On success the lock is taken and the transition
    /// must be completed with [`on_transition_complete`](Self::on_transition_complete).
    pub fn apply_intent(&mut self, intent: NavigationIntent) -> Result<Transition, Rejection> {
        let next = self.state.apply_intent(intent, self.max_row_index)?;
        let NavigationState::Transitioning {
            from,
            target,
            direction,
        } = next
        else {
            return Err(Rejection::TransitionInProgress);
        };

        tracing::debug!("Row transition {} -> {} ({:?})", from, target, direction);
        self.state = next;
        self.direction = direction;
        Ok(Transition {
            from,
            target,
            direction,
        })
    }

    /// Release the lock. Returns the row now shown, or `None` if there was
    /// no transition in flight.
    pub fn on_transition_complete(&mut self) -> Option<usize> {
        if !self.state.is_animating() {
            tracing::debug!("Transition completion while idle, ignoring");
            return None;
        }
        self.state = self.state.on_transition_complete();
        Some(self.state.current_row_index())
    }

    /// Change the row bound (device class switch).
    ///
    /// Rows still within the new bound are kept. A row beyond it is moved
    /// according to `policy`. A transition touching a row beyond the bound
    /// is settled on the spot, since its rows belong to the old set.
    /// Returns the row to mount if the state was adjusted.
    pub fn set_max_row_index(
        &mut self,
        max_row_index: usize,
        policy: DeviceChangePolicy,
    ) -> Option<usize> {
        self.max_row_index = max_row_index;

        let (highest, current) = match self.state {
            NavigationState::Idle { current } => (current, current),
            NavigationState::Transitioning { from, target, .. } => (from.max(target), target),
        };
        if highest <= max_row_index {
            return None;
        }

        let adjusted = if current <= max_row_index {
            current
        } else {
            match policy {
                DeviceChangePolicy::Clamp => max_row_index,
                DeviceChangePolicy::Reset => 0,
            }
        };
        tracing::debug!(
            "State {:?} beyond new bound {}, settling on {}",
            self.state,
            max_row_index,
            adjusted
        );

        self.state = NavigationState::Idle { current: adjusted };
        Some(adjusted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use NavigationIntent::{Advance, Retreat};

    fn settled(max: usize, start: usize) -> RowNavigationStateMachine {
        let mut m = RowNavigationStateMachine::new(max);
        for _ in 0..start {
            m.apply_intent(Advance).unwrap();
            m.on_transition_complete();
        }
        m
    }

    #[test]
    fn test_initial_state() {
        let m = RowNavigationStateMachine::new(4);
        assert_eq!(m.state(), NavigationState::Idle { current: 0 });
        assert!(!m.is_animating());
        assert_eq!(m.direction(), Direction::Still);
    }

    #[test]
    fn test_advance_takes_lock() {
        let mut m = RowNavigationStateMachine::new(4);
        let t = m.apply_intent(Advance).unwrap();
        assert_eq!(
            t,
            Transition {
                from: 0,
                target: 1,
                direction: Direction::Forward
            }
        );
        assert!(m.is_animating());
        assert_eq!(m.current_row_index(), 1);

        assert_eq!(m.on_transition_complete(), Some(1));
        assert_eq!(m.state(), NavigationState::Idle { current: 1 });
        assert_eq!(m.direction(), Direction::Forward);
    }

    #[test]
    fn test_intents_dropped_while_locked() {
        let mut m = RowNavigationStateMachine::new(4);
        m.apply_intent(Advance).unwrap();
        let locked = m.state();

        for intent in [Advance, Retreat, NavigationIntent::None] {
            assert_eq!(m.apply_intent(intent), Err(Rejection::TransitionInProgress));
            assert_eq!(m.state(), locked);
        }
    }

    #[test]
    fn test_boundaries_are_rejected_not_wrapped() {
        let mut m = RowNavigationStateMachine::new(4);
        assert_eq!(m.apply_intent(Retreat), Err(Rejection::OutOfBounds));
        assert_eq!(m.state(), NavigationState::Idle { current: 0 });

        let mut m = settled(4, 4);
        assert_eq!(m.apply_intent(Advance), Err(Rejection::OutOfBounds));
        assert_eq!(m.state(), NavigationState::Idle { current: 4 });
    }

    #[test]
    fn test_none_intent_is_noop() {
        let mut m = settled(4, 2);
        assert!(m.apply_intent(NavigationIntent::None).is_err());
        assert_eq!(m.state(), NavigationState::Idle { current: 2 });
    }

    #[test]
    fn test_completion_while_idle_is_noop() {
        let mut m = settled(4, 1);
        assert_eq!(m.on_transition_complete(), None);
        assert_eq!(m.state(), NavigationState::Idle { current: 1 });
    }

    #[test]
    fn test_advance_then_retreat_round_trip() {
        let mut m = settled(4, 2);
        m.apply_intent(Advance).unwrap();
        m.on_transition_complete();
        let t = m.apply_intent(Retreat).unwrap();
        assert_eq!(t.direction, Direction::Backward);
        m.on_transition_complete();
        assert_eq!(m.current_row_index(), 2);
    }

    #[test]
    fn test_repeated_advances_never_exceed_max() {
        let mut m = RowNavigationStateMachine::new(4);
        let mut last = 0;
        for _ in 0..10 {
            let _ = m.apply_intent(Advance);
            m.on_transition_complete();
            assert!(m.current_row_index() >= last);
            assert!(m.current_row_index() <= 4);
            last = m.current_row_index();
        }
        assert_eq!(last, 4);

        for _ in 0..10 {
            let _ = m.apply_intent(Retreat);
            m.on_transition_complete();
            assert!(m.current_row_index() <= last);
            last = m.current_row_index();
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn test_larger_bound_keeps_index() {
        let mut m = settled(4, 3);
        assert_eq!(m.set_max_row_index(6, DeviceChangePolicy::Clamp), None);
        assert_eq!(m.current_row_index(), 3);
        assert_eq!(m.max_row_index(), 6);
    }

    #[test]
    fn test_smaller_bound_clamps() {
        let mut m = settled(6, 6);
        assert_eq!(m.set_max_row_index(4, DeviceChangePolicy::Clamp), Some(4));
        assert_eq!(m.state(), NavigationState::Idle { current: 4 });
        assert_eq!(m.apply_intent(Advance), Err(Rejection::OutOfBounds));
    }

    #[test]
    fn test_smaller_bound_resets() {
        let mut m = settled(6, 5);
        assert_eq!(m.set_max_row_index(4, DeviceChangePolicy::Reset), Some(0));
        assert_eq!(m.current_row_index(), 0);
    }

    #[test]
    fn test_smaller_bound_settles_transition() {
        let mut m = settled(6, 5);
        m.apply_intent(Advance).unwrap();
        assert_eq!(m.set_max_row_index(4, DeviceChangePolicy::Clamp), Some(4));
        assert_eq!(m.state(), NavigationState::Idle { current: 4 });
        assert_eq!(m.on_transition_complete(), None);
    }

    #[test]
    fn test_smaller_bound_settles_transition_leaving_stale_row() {
        // 6 -> 5 on mobile, then the desktop bound drops both rows.
        let mut m = settled(6, 6);
        m.apply_intent(Retreat).unwrap();
        assert_eq!(m.set_max_row_index(4, DeviceChangePolicy::Clamp), Some(4));
        assert_eq!(m.state(), NavigationState::Idle { current: 4 });

        // 5 -> 4: the target survives, the exiting row does not.
        let mut m = settled(6, 5);
        m.apply_intent(Retreat).unwrap();
        assert_eq!(m.set_max_row_index(4, DeviceChangePolicy::Reset), Some(4));
        assert_eq!(m.state(), NavigationState::Idle { current: 4 });
    }

    #[test]
    fn test_transition_within_smaller_bound_is_kept() {
        let mut m = settled(6, 2);
        m.apply_intent(Advance).unwrap();
        assert_eq!(m.set_max_row_index(4, DeviceChangePolicy::Clamp), None);
        assert!(m.is_animating());
        assert_eq!(m.on_transition_complete(), Some(3));
    }

    #[test]
    fn test_pure_transition_function() {
        let idle = NavigationState::Idle { current: 0 };
        let next = idle.apply_intent(Advance, 4).unwrap();
        assert_eq!(
            next,
            NavigationState::Transitioning {
                from: 0,
                target: 1,
                direction: Direction::Forward
            }
        );
        assert_eq!(next.on_transition_complete(), NavigationState::Idle { current: 1 });
        assert_eq!(idle.on_transition_complete(), idle);
    }
}
