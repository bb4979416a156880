//! Header carousel selection.

use std::time::Duration;

use serde::Serialize;

use aivar_core::ScreenSize;

/// Lock held after each accepted change.
pub const CAROUSEL_LOCK: Duration = Duration::from_millis(300);

/// One carousel button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CarouselEntry {
    pub id: u32,
    pub label: &'static str,
}

impl CarouselEntry {
    /// Logo file name: the label with whitespace removed.
    pub fn logo_file(&self) -> String {
        let mut name: String = self.label.split_whitespace().collect();
        name.push_str(".png");
        name
    }
}

static ENTRIES: [CarouselEntry; 3] = [
    CarouselEntry {
        id: 1,
        label: "AI SHARING",
    },
    CarouselEntry {
        id: 2,
        label: "AIVAR STORE",
    },
    CarouselEntry {
        id: 3,
        label: "AIVAR METALAND",
    },
];

/// Active entry and click lock for the header carousel.
#[derive(Debug, Clone)]
pub struct CarouselState {
    active: usize,
    locked_until: Option<Duration>,
    screen: ScreenSize,
}

impl Default for CarouselState {
    fn default() -> Self {
        Self::new(ScreenSize::default())
    }
}

impl CarouselState {
    pub fn new(screen: ScreenSize) -> Self {
        Self {
            // Center entry.
            active: 1,
            locked_until: None,
            screen,
        }
    }

    pub fn entries(&self) -> &'static [CarouselEntry] {
        &ENTRIES
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &'static CarouselEntry {
        &ENTRIES[self.active]
    }

    pub fn screen_size(&self) -> ScreenSize {
        self.screen
    }

    pub fn resize(&mut self, width: u32) {
        self.screen = ScreenSize::from_width(width);
    }

    pub fn is_animating(&self, now: Duration) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    /// Select an entry. Returns the new active index, or `None` when the
    /// click is ignored (already active, locked, or out of range).
    pub fn click(&mut self, index: usize, now: Duration) -> Option<usize> {
        if index == self.active || index >= ENTRIES.len() || self.is_animating(now) {
            return None;
        }

        tracing::debug!("Carousel {} -> {}", self.active, index);
        self.active = index;
        self.locked_until = Some(now + CAROUSEL_LOCK);
        Some(index)
    }

    pub fn previous(&mut self, now: Duration) -> Option<usize> {
        let len = ENTRIES.len();
        self.click((self.active + len - 1) % len, now)
    }

    pub fn next(&mut self, now: Duration) -> Option<usize> {
        self.click((self.active + 1) % ENTRIES.len(), now)
    }

    /// Release an expired lock.
    pub fn tick(&mut self, now: Duration) {
        if !self.is_animating(now) {
            self.locked_until = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_defaults_to_center() {
        let c = CarouselState::default();
        assert_eq!(c.active_index(), 1);
        assert_eq!(c.active().label, "AIVAR STORE");
        assert_eq!(c.entries().len(), 3);
    }

    #[test]
    fn test_click_active_is_noop() {
        let mut c = CarouselState::default();
        assert_eq!(c.click(1, ms(0)), None);
        assert!(!c.is_animating(ms(0)));
    }

    #[test]
    fn test_click_locks() {
        let mut c = CarouselState::default();
        assert_eq!(c.click(0, ms(0)), Some(0));
        assert!(c.is_animating(ms(299)));
        assert_eq!(c.click(2, ms(100)), None);
        assert_eq!(c.click(2, ms(300)), Some(2));
    }

    #[test]
    fn test_wraps() {
        let mut c = CarouselState::default();
        assert_eq!(c.next(ms(0)), Some(2));
        assert_eq!(c.next(ms(1000)), Some(0));
        assert_eq!(c.previous(ms(2000)), Some(2));
    }

    #[test]
    fn test_out_of_range() {
        let mut c = CarouselState::default();
        assert_eq!(c.click(3, ms(0)), None);
    }

    #[test]
    fn test_tick_clears_lock() {
        let mut c = CarouselState::default();
        c.next(ms(0));
        c.tick(ms(100));
        assert!(c.is_animating(ms(100)));
        c.tick(ms(400));
        assert!(!c.is_animating(ms(0)));
    }

    #[test]
    fn test_screen_size() {
        let mut c = CarouselState::new(ScreenSize::Xl);
        c.resize(320);
        assert_eq!(c.screen_size(), ScreenSize::Xs);
        assert!(c.screen_size().is_narrow());
    }

    #[test]
    fn test_logo_file() {
        assert_eq!(ENTRIES[2].logo_file(), "AIVARMETALAND.png");
    }
}
