//! Row navigator.
//!
//! Wires input events through the debouncer and state machine into the
//! presenter, and broadcasts a [`NavigationSnapshot`] after every change.
//!
//! Mutation = notification: every method that changes navigation state
//! publishes the new snapshot via `tokio::sync::watch`.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;

use aivar_core::{
    DeviceClass, Direction, NavigationConfig, NavigationIntent, Rejection, RowContent,
    RowContentProvider,
};

use crate::debouncer::{GestureDebouncer, TouchTracker};
use crate::input::InputEvent;
use crate::machine::{RowNavigationStateMachine, Transition};
use crate::presenter::{AnimatedRowPresenter, RowFrame};

// =============================================================================
// Outcomes
// =============================================================================

/// What an input event did to navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    /// A transition was accepted.
    Started(Transition),
    /// The input was dropped.
    Dropped {
        #[serde(serialize_with = "serialize_rejection")]
        reason: Rejection,
    },
    /// The event carries no navigation.
    Ignored,
}

fn serialize_rejection<S: serde::Serializer>(r: &Rejection, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(r)
}

impl NavigationOutcome {
    fn dropped(reason: Rejection) -> Self {
        NavigationOutcome::Dropped { reason }
    }
}

/// Result of handling one input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EventDisposition {
    /// The caller must suppress the browser's default scroll/pan.
    pub prevent_default: bool,
    pub outcome: NavigationOutcome,
}

impl EventDisposition {
    fn ignored(prevent_default: bool) -> Self {
        Self {
            prevent_default,
            outcome: NavigationOutcome::Ignored,
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Observable navigation state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationSnapshot {
    pub current_row_index: usize,
    pub is_animating: bool,
    pub direction: Direction,
    pub device_class: DeviceClass,
    pub row_count: usize,
}

// =============================================================================
// Row Navigator
// =============================================================================

pub struct RowNavigator {
    config: NavigationConfig,
    content: Arc<dyn RowContentProvider>,
    device: DeviceClass,
    debouncer: GestureDebouncer,
    touch: TouchTracker,
    machine: RowNavigationStateMachine,
    presenter: AnimatedRowPresenter,
    tx: watch::Sender<NavigationSnapshot>,
}

impl RowNavigator {
    /// Create a navigator at row 0 for a viewport of the given width.
    pub fn new(
        config: &NavigationConfig,
        animations: bool,
        content: Arc<dyn RowContentProvider>,
        width: u32,
    ) -> Self {
        let device = DeviceClass::from_width(width, config.mobile_max_width);
        let machine = RowNavigationStateMachine::new(content.max_row_index(device).unwrap_or(0));
        let mut navigator = Self {
            config: config.clone(),
            content,
            device,
            debouncer: GestureDebouncer::from_config(config),
            touch: TouchTracker::new(),
            machine,
            presenter: AnimatedRowPresenter::from_config(config, animations),
            tx: watch::channel(empty_snapshot(device)).0,
        };
        navigator.publish();
        tracing::info!(
            "Row navigator ready: {:?}, {} rows",
            device,
            navigator.rows().len()
        );
        navigator
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<NavigationSnapshot> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> NavigationSnapshot {
        NavigationSnapshot {
            current_row_index: self.machine.current_row_index(),
            is_animating: self.machine.is_animating(),
            direction: self.machine.direction(),
            device_class: self.device,
            row_count: self.rows().len(),
        }
    }

    pub fn device_class(&self) -> DeviceClass {
        self.device
    }

    pub fn machine(&self) -> &RowNavigationStateMachine {
        &self.machine
    }

    /// Active row set.
    pub fn rows(&self) -> &[RowContent] {
        self.content.rows(self.device)
    }

    /// Content of the current row.
    pub fn current_row(&self) -> Option<&RowContent> {
        self.rows().get(self.machine.current_row_index())
    }

    /// Dispatch any input event.
    pub fn handle(&mut self, event: InputEvent, now: Duration) -> EventDisposition {
        match event {
            InputEvent::Wheel { delta_y } => self.wheel(delta_y, now),
            InputEvent::TouchStart { y } => self.touch_start(y),
            InputEvent::TouchMove => self.touch_move(),
            InputEvent::TouchEnd { y } => self.touch_end(y, now),
            InputEvent::TouchCancel => self.touch_cancel(),
            InputEvent::Resize { width } => self.resize(width),
        }
    }

    /// Wheel events are always intercepted so the page never scrolls.
    pub fn wheel(&mut self, delta_y: f64, now: Duration) -> EventDisposition {
        if self.machine.is_animating() {
            return self.drop_input(true, Rejection::TransitionInProgress);
        }
        let outcome = match self.debouncer.try_classify_wheel(delta_y, now) {
            Ok(intent) => self.navigate(intent, now),
            Err(reason) => self.log_drop(reason),
        };
        EventDisposition {
            prevent_default: true,
            outcome,
        }
    }

    /// Touch handling is only active on mobile.
    pub fn touch_start(&mut self, y: f64) -> EventDisposition {
        if self.device.is_mobile() {
            self.touch.touch_start(y);
        }
        EventDisposition::ignored(false)
    }

    pub fn touch_move(&self) -> EventDisposition {
        EventDisposition::ignored(self.device.is_mobile() && self.touch.touch_move())
    }

    pub fn touch_end(&mut self, y: f64, now: Duration) -> EventDisposition {
        if !self.device.is_mobile() {
            return EventDisposition::ignored(false);
        }
        let start = self.touch.touch_end();
        if start.is_none() {
            return self.drop_input(false, Rejection::NoActiveTouch);
        }
        if self.machine.is_animating() {
            return self.drop_input(false, Rejection::TransitionInProgress);
        }
        let outcome = match self.debouncer.try_classify_touch(start, y, now) {
            Ok(intent) => self.navigate(intent, now),
            Err(reason) => self.log_drop(reason),
        };
        EventDisposition {
            prevent_default: false,
            outcome,
        }
    }

    pub fn touch_cancel(&mut self) -> EventDisposition {
        self.touch.touch_cancel();
        EventDisposition::ignored(false)
    }

    /// Reclassify the viewport.
    ///
    /// The current row is kept unless it lies beyond the new row bound, in
    /// which case the configured device-change policy applies. A transition
    /// involving such a row is settled immediately.
    pub fn resize(&mut self, width: u32) -> EventDisposition {
        let device = DeviceClass::from_width(width, self.config.mobile_max_width);
        if device == self.device {
            return EventDisposition::ignored(false);
        }

        tracing::info!("Device class changed: {:?} -> {:?}", self.device, device);
        self.device = device;
        if !device.is_mobile() {
            self.touch.touch_cancel();
        }

        let max = self.content.max_row_index(device).unwrap_or(0);
        if let Some(index) = self
            .machine
            .set_max_row_index(max, self.config.on_device_change)
        {
            self.presenter.remount(index);
        }
        self.publish();
        EventDisposition::ignored(false)
    }

    /// Advance animation time and return the row to draw. Releases the
    /// lock when the presenter finishes the transition.
    pub fn frame(&mut self, now: Duration) -> RowFrame {
        if self.presenter.tick(now).is_some() {
            self.complete_transition();
        }
        self.presenter.frame(now)
    }

    /// Completion callback for renderers that animate rows themselves.
    ///
    /// Returns the row now shown, or `None` if nothing was in flight.
    pub fn on_exit_complete(&mut self) -> Option<usize> {
        self.presenter.finish()?;
        self.complete_transition()
    }

    fn complete_transition(&mut self) -> Option<usize> {
        let index = self.machine.on_transition_complete();
        if index.is_some() {
            self.publish();
        }
        index
    }

    fn navigate(&mut self, intent: NavigationIntent, now: Duration) -> NavigationOutcome {
        let transition = match self.machine.apply_intent(intent) {
            Ok(transition) => transition,
            Err(reason) => return self.log_drop(reason),
        };
        // Only gestures that move the page start the cooldown.
        self.debouncer.accept(now);

        if let Err(e) = self.presenter.begin(transition, now) {
            // The machine lock should make this unreachable.
            tracing::warn!("{}", e);
        }
        self.publish();
        NavigationOutcome::Started(transition)
    }

    fn drop_input(&self, prevent_default: bool, reason: Rejection) -> EventDisposition {
        EventDisposition {
            prevent_default,
            outcome: self.log_drop(reason),
        }
    }

    fn log_drop(&self, reason: Rejection) -> NavigationOutcome {
        tracing::debug!("Input dropped: {}", reason);
        NavigationOutcome::dropped(reason)
    }

    fn publish(&self) {
        let snapshot = self.snapshot();
        self.tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

fn empty_snapshot(device: DeviceClass) -> NavigationSnapshot {
    NavigationSnapshot {
        current_row_index: 0,
        is_animating: false,
        direction: Direction::Still,
        device_class: device,
        row_count: 0,
    }
}
