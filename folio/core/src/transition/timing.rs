//! Easing and Timeline Segments
//!
//! Choreographed transitions are described as one normalized timeline
//! (0.0 at rest, 1.0 fully shown) with each layer occupying a segment of it.

use serde::{Deserialize, Serialize};

/// Easing functions for transition progress
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EasingFunction {
    /// No easing (constant speed)
    #[default]
    Linear,

    /// Fast start, slow end
    EaseOut,

    /// Slow start and end
    EaseInOut,

    /// Cubic ease out
    EaseOutCubic,

    /// Overshoot then settle, the spring-like entrance
    EaseOutBack,
}

impl EasingFunction {
    /// Apply the easing function to a progress value (0.0 to 1.0)
    ///
    /// `EaseOutBack` briefly exceeds 1.0 on the way.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::EaseOut => 1.0 - (1.0 - t).powi(2),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseOutBack => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                let t_minus_1 = t - 1.0;
                1.0 + c3 * t_minus_1.powi(3) + c1 * t_minus_1.powi(2)
            }
        }
    }
}

/// A layer's slice of a normalized timeline
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Where the layer starts moving, as a fraction of the timeline
    pub start: f32,
    /// How long it moves, as a fraction of the timeline
    pub length: f32,
    /// Curve applied within the segment
    pub easing: EasingFunction,
}

impl Segment {
    /// Segment covering the whole timeline
    #[must_use]
    pub const fn full(easing: EasingFunction) -> Self {
        Self {
            start: 0.0,
            length: 1.0,
            easing,
        }
    }

    /// Segment starting at `start` and lasting `length`
    #[must_use]
    pub const fn new(start: f32, length: f32, easing: EasingFunction) -> Self {
        Self {
            start,
            length,
            easing,
        }
    }

    /// Eased progress of this layer at timeline `position`
    #[must_use]
    pub fn progress(&self, position: f32) -> f32 {
        if self.length <= 0.0 {
            return if position >= self.start { 1.0 } else { 0.0 };
        }
        let local = (position - self.start) / self.length;
        self.easing.apply(local)
    }

    /// Timeline position at which this layer finishes
    #[must_use]
    pub fn end(&self) -> f32 {
        self.start + self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_easing_boundaries() {
        for easing in [
            EasingFunction::Linear,
            EasingFunction::EaseOut,
            EasingFunction::EaseInOut,
            EasingFunction::EaseOutCubic,
            EasingFunction::EaseOutBack,
        ] {
            assert!(
                easing.apply(0.0).abs() < 0.001,
                "{easing:?} at 0.0 = {}",
                easing.apply(0.0)
            );
            assert!(
                (easing.apply(1.0) - 1.0).abs() < 0.001,
                "{easing:?} at 1.0 = {}",
                easing.apply(1.0)
            );
        }
    }

    #[test]
    fn test_ease_out_back_overshoots() {
        let peak = (1..100)
            .map(|i| EasingFunction::EaseOutBack.apply(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
    }

    #[test]
    fn test_segment_progress() {
        let segment = Segment::new(0.25, 0.5, EasingFunction::Linear);
        assert_eq!(segment.progress(0.0), 0.0);
        assert_eq!(segment.progress(0.25), 0.0);
        assert!((segment.progress(0.5) - 0.5).abs() < f32::EPSILON);
        assert_eq!(segment.progress(0.75), 1.0);
        assert_eq!(segment.progress(1.0), 1.0);
        assert!((segment.end() - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_length_segment_steps() {
        let segment = Segment::new(0.5, 0.0, EasingFunction::Linear);
        assert_eq!(segment.progress(0.49), 0.0);
        assert_eq!(segment.progress(0.5), 1.0);
    }
}
