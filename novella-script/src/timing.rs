//! Easing curves and the `"<ms>@<easing>"` duration token.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Unrecognised names fall back to linear.
    pub fn from_name(name: &str) -> Easing {
        match name {
            "ease-in" => Easing::EaseIn,
            "ease-out" => Easing::EaseOut,
            "ease-in-out" => Easing::EaseInOut,
            _ => Easing::Linear,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
        }
    }

    /// Maps a progress fraction in `[0, 1]` to the eased fraction.
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => t * (2.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
        }
    }
}

/// Parsed `"<ms>@<easing>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSpec {
    pub ms: u32,
    pub easing: Easing,
}

impl TimeSpec {
    /// A missing or non-numeric duration is 0 ms; a missing easing is linear.
    pub fn parse(raw: &str) -> TimeSpec {
        let mut parts = raw.split('@');
        let ms = parts.next().and_then(|p| p.trim().parse::<i64>().ok()).unwrap_or(0);
        let easing = parts.next().map(Easing::from_name).unwrap_or_default();
        TimeSpec { ms: ms.clamp(0, u32::MAX as i64) as u32, easing }
    }
}

/// Number of fixed ticks a timed effect takes: `max(1, duration / tick)`.
pub fn step_count(duration_ms: u32, tick_ms: u32) -> u32 {
    (duration_ms / tick_ms.max(1)).max(1)
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
