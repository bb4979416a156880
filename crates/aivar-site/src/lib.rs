//! Headless driver for the AIVAR landing site.
//!
//! Replays recorded input against a [`RowNavigator`](aivar_nav::RowNavigator)
//! and reports the navigation state after every record.

pub mod error;
pub mod replay;

pub use error::SiteError;
pub use replay::{Replayer, ReplayStep, ScriptEvent, ScriptRecord};
