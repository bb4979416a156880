//! Core types for the AIVAR landing site.
//!
//! This crate contains shared data structures used across all AIVAR crates:
//! - Navigation intents and directions
//! - Viewport classification
//! - Row content and the content provider interface
//! - Configuration types
//! - Error types

mod config;
mod content;
mod error;
mod intent;
mod viewport;

pub use config::{
    config_dir, config_path, DeviceChangePolicy, EntryDirectionPolicy, FeatureFlags,
    NavigationConfig, SceneConfig, SiteConfig, SsoConfig, SsoSettings, VoiceAgentConfig,
};
pub use content::{RowContent, RowContentProvider, StaticRows, Tile};
pub use error::{ConfigError, PresenterError, Rejection, SessionError};
pub use intent::{Direction, NavigationIntent};
pub use viewport::{DeviceClass, ScreenSize};
