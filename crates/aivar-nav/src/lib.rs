//! Row navigation for the AIVAR landing site.
//!
//! Wheel and touch input flows through a [`GestureDebouncer`] into the
//! [`RowNavigationStateMachine`], which hands accepted transitions to the
//! [`AnimatedRowPresenter`]. [`RowNavigator`] wires the three together and
//! publishes a [`NavigationSnapshot`] on every change.

mod carousel;
mod debouncer;
mod input;
mod machine;
mod navigator;
mod presenter;

pub use carousel::{CarouselEntry, CarouselState, CAROUSEL_LOCK};
pub use debouncer::{GestureDebouncer, TouchTracker};
pub use input::InputEvent;
pub use machine::{NavigationState, RowNavigationStateMachine, Transition};
pub use navigator::{EventDisposition, NavigationOutcome, NavigationSnapshot, RowNavigator};
pub use presenter::{AnimatedRowPresenter, Phase, RowFrame, TransitionComplete, TransitionTiming};
