//! Viewport classification.

use serde::{Deserialize, Serialize};

/// Device class derived from the viewport width.
///
/// Changes which row content set is active, and therefore the row count.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    Desktop,
    Mobile,
}

impl DeviceClass {
    /// Classify a viewport width. Widths up to and including
    /// `mobile_max_width` count as mobile.
    pub fn from_width(width: u32, mobile_max_width: u32) -> Self {
        if width <= mobile_max_width {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn is_mobile(self) -> bool {
        matches!(self, DeviceClass::Mobile)
    }
}

/// Coarse screen size buckets used by the header carousel.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ScreenSize {
    /// Compact mode for very small screens.
    Xs,
    Sm,
    Md,
    #[default]
    Lg,
    Xl,
}

impl ScreenSize {
    pub fn from_width(width: u32) -> Self {
        match width {
            0..=359 => ScreenSize::Xs,
            360..=767 => ScreenSize::Sm,
            768..=1023 => ScreenSize::Md,
            1024..=1439 => ScreenSize::Lg,
            _ => ScreenSize::Xl,
        }
    }

    /// The carousel switches to its narrow layout below `md`.
    pub fn is_narrow(self) -> bool {
        self < ScreenSize::Md
    }
}
