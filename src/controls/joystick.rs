//! Virtual joysticks and brake button

use glam::Vec2;

use super::ControlSignal;
use super::touch::{SurfaceRect, TouchClaim, TouchPoint};
use crate::clamp_unit;

/// Which axes a stick reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickAxes {
    /// Full 2D deflection, limited to the unit disc
    Both,
    /// Vertical deflection only, limited to [-1, 1]
    Vertical,
}

/// A single on-screen joystick
#[derive(Debug, Clone)]
pub struct Joystick {
    claim: TouchClaim,
    axes: StickAxes,
    base: SurfaceRect,
    value: Vec2,
}

impl Joystick {
    pub fn new(axes: StickAxes) -> Self {
        Self {
            claim: TouchClaim::default(),
            axes,
            base: SurfaceRect::new(Vec2::ZERO, 1.0),
            value: Vec2::ZERO,
        }
    }

    /// Touch landed on the stick base; `base` is its current on-screen footprint
    pub fn start(&mut self, touches: &[TouchPoint], base: SurfaceRect) {
        if let Some(touch) = self.claim.claim(touches) {
            self.base = base;
            self.sample(touch.pos());
        }
    }

    pub fn move_to(&mut self, touches: &[TouchPoint]) {
        if let Some(touch) = self.claim.find(touches) {
            self.sample(touch.pos());
        }
    }

    /// Returns true if the stick was released (and recentred)
    pub fn end(&mut self, changed: &[TouchPoint]) -> bool {
        if self.claim.release_if_ended(changed) {
            self.value = Vec2::ZERO;
            true
        } else {
            false
        }
    }

    pub fn release(&mut self) {
        self.claim.release();
        self.value = Vec2::ZERO;
    }

    fn sample(&mut self, touch: Vec2) {
        if self.base.radius <= 0.0 || !touch.is_finite() {
            self.value = Vec2::ZERO;
            return;
        }
        let raw = (touch - self.base.center) / self.base.radius;
        self.value = match self.axes {
            StickAxes::Both => {
                if raw.length() > 1.0 {
                    raw.normalize()
                } else {
                    raw
                }
            }
            StickAxes::Vertical => Vec2::new(0.0, clamp_unit(raw.y)),
        };
    }

    /// Deflection in stick units (screen-down is +y)
    pub fn value(&self) -> Vec2 {
        self.value
    }

    /// Knob translation in pixels for the DOM
    pub fn knob_offset(&self) -> Vec2 {
        self.value * self.base.radius
    }

    pub fn is_held(&self) -> bool {
        self.claim.is_claimed()
    }
}

/// Left stick steers, right stick drives, separate brake button
#[derive(Debug, Clone)]
pub struct DualJoystick {
    pub steer: Joystick,
    pub drive: Joystick,
    brake: TouchClaim,
}

impl Default for DualJoystick {
    fn default() -> Self {
        Self::new()
    }
}

impl DualJoystick {
    pub fn new() -> Self {
        Self {
            steer: Joystick::new(StickAxes::Both),
            drive: Joystick::new(StickAxes::Vertical),
            brake: TouchClaim::default(),
        }
    }

    pub fn brake_start(&mut self, touches: &[TouchPoint]) {
        self.brake.claim(touches);
    }

    pub fn brake_end(&mut self, changed: &[TouchPoint]) {
        self.brake.release_if_ended(changed);
    }

    pub fn brake_held(&self) -> bool {
        self.brake.is_claimed()
    }

    pub fn release_all(&mut self) {
        self.steer.release();
        self.drive.release();
        self.brake.release();
    }

    pub fn signal(&self) -> ControlSignal {
        ControlSignal {
            steering: clamp_unit(self.steer.value().x),
            // Pushing up (negative screen y) accelerates
            pedal: clamp_unit(-self.drive.value().y),
            brake: self.brake.is_claimed(),
        }
    }
}
