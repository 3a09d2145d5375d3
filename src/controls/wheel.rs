//! Steering wheel and pedal controls
//!
//! Dragging horizontally from where the wheel was first touched steers; the
//! pedals are momentary and mutually exclusive.

use serde::{Deserialize, Serialize};

use super::ControlSignal;
use super::touch::{TouchClaim, TouchPoint};
use crate::clamp_unit;

/// Horizontal drag (pixels) that reaches full lock
pub const WHEEL_DRAG_RANGE: f32 = 100.0;
/// Visual wheel rotation at full lock (degrees)
pub const WHEEL_MAX_ROTATION_DEG: f32 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pedal {
    Throttle,
    Brake,
}

/// Wheel + pedals control state
#[derive(Debug, Clone, Default)]
pub struct WheelPedals {
    wheel: TouchClaim,
    /// Client X of the claiming touch when it landed
    origin_x: f32,
    steering: f32,
    throttle: bool,
    brake: bool,
}

impl WheelPedals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Touch landed on the wheel
    pub fn wheel_start(&mut self, touches: &[TouchPoint]) {
        if let Some(touch) = self.wheel.claim(touches) {
            self.origin_x = touch.x;
        }
    }

    /// Touch moved; only the claiming touch steers
    pub fn wheel_move(&mut self, touches: &[TouchPoint]) {
        if let Some(touch) = self.wheel.find(touches) {
            self.steering = clamp_unit((touch.x - self.origin_x) / WHEEL_DRAG_RANGE);
        }
    }

    /// Touch lifted; the wheel recentres when its own touch ends
    pub fn wheel_end(&mut self, changed: &[TouchPoint]) {
        if self.wheel.release_if_ended(changed) {
            self.steering = 0.0;
        }
    }

    /// Pedal touch-start. Pressing one pedal lifts the other.
    pub fn press(&mut self, pedal: Pedal) {
        self.throttle = pedal == Pedal::Throttle;
        self.brake = pedal == Pedal::Brake;
    }

    /// Any touch-end anywhere lifts both pedals
    pub fn release_pedals(&mut self) {
        self.throttle = false;
        self.brake = false;
    }

    pub fn release_all(&mut self) {
        self.wheel.release();
        self.steering = 0.0;
        self.release_pedals();
    }

    pub fn steering(&self) -> f32 {
        self.steering
    }

    /// CSS rotation for the on-screen wheel
    pub fn wheel_rotation_deg(&self) -> f32 {
        self.steering * WHEEL_MAX_ROTATION_DEG
    }

    pub fn pedal_active(&self, pedal: Pedal) -> bool {
        match pedal {
            Pedal::Throttle => self.throttle,
            Pedal::Brake => self.brake,
        }
    }

    pub fn signal(&self) -> ControlSignal {
        let pedal = if self.throttle {
            1.0
        } else if self.brake {
            -1.0
        } else {
            0.0
        };
        ControlSignal {
            steering: self.steering,
            pedal,
            brake: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_steers_and_clamps() {
        let mut wheel = WheelPedals::new();
        wheel.wheel_start(&[TouchPoint::new(1, 200.0, 500.0)]);

        wheel.wheel_move(&[TouchPoint::new(1, 250.0, 480.0)]);
        assert!((wheel.steering() - 0.5).abs() < 1e-6);
        assert!((wheel.wheel_rotation_deg() - 45.0).abs() < 1e-4);

        wheel.wheel_move(&[TouchPoint::new(1, -100.0, 480.0)]);
        assert_eq!(wheel.steering(), -1.0);
    }

    #[test]
    fn test_foreign_touch_does_not_steer() {
        let mut wheel = WheelPedals::new();
        wheel.wheel_start(&[TouchPoint::new(1, 200.0, 500.0)]);
        wheel.wheel_move(&[TouchPoint::new(9, 400.0, 500.0)]);
        assert_eq!(wheel.steering(), 0.0);

        // Ending the foreign touch leaves the wheel claimed
        wheel.wheel_move(&[TouchPoint::new(1, 260.0, 500.0)]);
        wheel.wheel_end(&[TouchPoint::new(9, 400.0, 500.0)]);
        assert!(wheel.steering() > 0.0);
    }

    #[test]
    fn test_wheel_release_recentres() {
        let mut wheel = WheelPedals::new();
        wheel.wheel_start(&[TouchPoint::new(3, 0.0, 0.0)]);
        wheel.wheel_move(&[TouchPoint::new(3, 80.0, 0.0)]);
        wheel.wheel_end(&[TouchPoint::new(3, 80.0, 0.0)]);
        assert_eq!(wheel.steering(), 0.0);
        assert_eq!(wheel.wheel_rotation_deg(), 0.0);
    }

    #[test]
    fn test_pedals_are_exclusive() {
        let mut wheel = WheelPedals::new();
        wheel.press(Pedal::Throttle);
        assert_eq!(wheel.signal().pedal, 1.0);

        wheel.press(Pedal::Brake);
        assert!(!wheel.pedal_active(Pedal::Throttle));
        assert_eq!(wheel.signal().pedal, -1.0);

        wheel.release_pedals();
        assert_eq!(wheel.signal().pedal, 0.0);
    }
}
