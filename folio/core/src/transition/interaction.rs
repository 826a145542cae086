//! Hover and press micro-interactions for icon links and buttons.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::timing::EasingFunction;
use crate::motion::MotionPreference;

/// Scale while hovered
pub const HOVER_SCALE: f32 = 1.10;

/// Vertical lift while hovered, in pixels (negative is up)
pub const HOVER_LIFT_PX: f32 = -4.0;

/// Scale while pressed
pub const PRESS_SCALE: f32 = 0.95;

/// Travel time between interaction states
pub const INTERACTION_DURATION: Duration = Duration::from_millis(300);

/// Target transform for an element and how long to take getting there
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionTransform {
    /// Uniform scale
    pub scale: f32,
    /// Vertical offset in pixels
    pub translate_y: f32,
    /// Time to reach this transform
    pub duration: Duration,
    /// Curve to reach it with
    pub easing: EasingFunction,
}

impl InteractionTransform {
    /// Untransformed rest state
    #[must_use]
    pub fn rest(motion: MotionPreference) -> Self {
        micro_interaction(false, false, motion)
    }
}

/// Transform for the given pointer state.
///
/// Press overrides the hover scale but keeps the hover lift. Reduced motion
/// reaches the same transform with a zero duration.
#[must_use]
pub fn micro_interaction(hovered: bool, pressed: bool, motion: MotionPreference) -> InteractionTransform {
    let scale = match (hovered, pressed) {
        (_, true) => PRESS_SCALE,
        (true, false) => HOVER_SCALE,
        (false, false) => 1.0,
    };
    let translate_y = if hovered { HOVER_LIFT_PX } else { 0.0 };

    InteractionTransform {
        scale,
        translate_y,
        duration: motion.scale(INTERACTION_DURATION),
        easing: EasingFunction::EaseOut,
    }
}
