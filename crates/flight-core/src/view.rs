// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Zoom and reset transform for the globe background.

/// Neutral scale.
pub const NEUTRAL_SCALE: f32 = 1.0;
/// Scale change per zoom step.
pub const SCALE_STEP: f32 = 0.2;
/// Degrees of globe rotation per unit of scale.
pub const ROTATION_PER_SCALE_DEG: f32 = 20.0;

const MIN_STEPS: i8 = -2; // 0.6
const MAX_STEPS: i8 = 4; // 1.8

/// Bounded scale/rotation applied to the background graphic.
///
/// Scale is tracked as a whole number of steps so repeated zooming never
/// drifts past the bounds through float rounding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewControls {
    steps: i8,
    rotated: bool,
}

impl ViewControls {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn scale(&self) -> f32 {
        NEUTRAL_SCALE + f32::from(self.steps) * SCALE_STEP
    }

    /// Rotation of the globe in degrees. Zero until the first zoom and after reset.
    #[must_use]
    pub fn rotation_degrees(&self) -> f32 {
        if self.rotated {
            self.scale() * ROTATION_PER_SCALE_DEG
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn can_zoom_in(&self) -> bool {
        self.steps < MAX_STEPS
    }

    #[must_use]
    pub fn can_zoom_out(&self) -> bool {
        self.steps > MIN_STEPS
    }

    /// Returns false when already at the upper bound.
    pub fn zoom_in(&mut self) -> bool {
        if !self.can_zoom_in() {
            return false;
        }
        self.steps += 1;
        self.rotated = true;
        true
    }

    /// Returns false when already at the lower bound.
    pub fn zoom_out(&mut self) -> bool {
        if !self.can_zoom_out() {
            return false;
        }
        self.steps -= 1;
        self.rotated = true;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
