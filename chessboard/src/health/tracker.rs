//! Debounced connectivity state.
//!
//! Transitions are pure: feed samples into [`HealthTracker::observe`] and
//! hide deadlines into [`HealthTracker::hide_elapsed`]; the caller owns the
//! timers.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HealthStatus {
    #[default]
    Unknown,
    Up,
    Down,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Unknown => write!(f, "unknown"),
            HealthStatus::Up => write!(f, "up"),
            HealthStatus::Down => write!(f, "down"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerEvent {
    Shown(HealthStatus),
    Hidden,
}

/// Identifies the banner a hide timer was armed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideToken(u64);

/// What the user currently sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HealthDisplay {
    pub status: HealthStatus,
    pub banner_visible: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HealthTracker {
    status: HealthStatus,
    ever_up: bool,
    banner_visible: bool,
    generation: u64,
}

impl HealthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }

    pub fn display(&self) -> HealthDisplay {
        HealthDisplay {
            status: self.status,
            banner_visible: self.banner_visible,
        }
    }

    /// Record a raw sample. Returns the banner event it causes, if any.
    ///
    /// A banner is shown on every flip, and on any sample while the
    /// backend has never been seen up and no banner is showing.
    pub fn observe(&mut self, sample: HealthStatus) -> Option<BannerEvent> {
        if sample == HealthStatus::Unknown {
            return None;
        }

        let flipped = sample != self.status;
        let show = flipped || (!self.ever_up && !self.banner_visible);

        self.status = sample;
        if sample == HealthStatus::Up {
            self.ever_up = true;
        }

        if !show {
            return None;
        }

        self.banner_visible = true;
        self.generation += 1;
        Some(BannerEvent::Shown(sample))
    }

    /// Token for the pending auto-hide, present only while an `Up` banner
    /// is showing.
    pub fn hide_token(&self) -> Option<HideToken> {
        (self.banner_visible && self.status == HealthStatus::Up).then_some(HideToken(self.generation))
    }

    /// The hide delay for `token` ran out. Ignored if a newer banner has
    /// been shown since the token was issued.
    pub fn hide_elapsed(&mut self, token: HideToken) -> Option<BannerEvent> {
        if token.0 != self.generation || !self.banner_visible {
            return None;
        }
        self.banner_visible = false;
        Some(BannerEvent::Hidden)
    }
}
