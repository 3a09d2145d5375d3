//! Touch input layer
//!
//! Touch callbacks write into a small fixed set of control fields. The frame
//! driver samples a [`ControlSignal`] from them at the start of every frame;
//! nothing is queued, so the latest touch position always wins.

pub mod joystick;
pub mod touch;
pub mod wheel;

pub use joystick::{DualJoystick, Joystick, StickAxes};
pub use touch::{SurfaceRect, TouchClaim, TouchPoint};
pub use wheel::{Pedal, WheelPedals};

use serde::{Deserialize, Serialize};

use crate::settings::ControlMode;

/// Normalized control input for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlSignal {
    /// Steering in [-1, 1], positive steers right
    pub steering: f32,
    /// Accelerate (+) / brake (-) in [-1, 1]
    pub pedal: f32,
    /// Dedicated brake button
    pub brake: bool,
}

impl ControlSignal {
    pub const NEUTRAL: Self = Self {
        steering: 0.0,
        pedal: 0.0,
        brake: false,
    };

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }

    /// Throttle amount in [0, 1]; zero while the brake button is held
    pub fn throttle(&self) -> f32 {
        if self.brake { 0.0 } else { self.pedal.max(0.0) }
    }

    /// Brake amount in [0, 1]
    pub fn braking(&self) -> f32 {
        if self.brake { 1.0 } else { (-self.pedal).max(0.0) }
    }
}

/// An on-screen control element that receives touches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    SteeringWheel,
    ThrottlePedal,
    BrakePedal,
    SteerStick,
    DriveStick,
    BrakeButton,
}

impl Surface {
    /// DOM id of the element
    pub fn element_id(&self) -> &'static str {
        match self {
            Surface::SteeringWheel => "steering-wheel",
            Surface::ThrottlePedal => "throttle-pedal",
            Surface::BrakePedal => "brake-pedal",
            Surface::SteerStick => "left-stick",
            Surface::DriveStick => "right-stick",
            Surface::BrakeButton => "brake-button",
        }
    }
}

/// The active control scheme
#[derive(Debug, Clone)]
pub enum ControlScheme {
    Wheel(WheelPedals),
    Joystick(DualJoystick),
}

impl ControlScheme {
    pub fn for_mode(mode: ControlMode) -> Self {
        match mode {
            ControlMode::Wheel => ControlScheme::Wheel(WheelPedals::new()),
            ControlMode::Joystick => ControlScheme::Joystick(DualJoystick::new()),
        }
    }

    pub fn mode(&self) -> ControlMode {
        match self {
            ControlScheme::Wheel(_) => ControlMode::Wheel,
            ControlScheme::Joystick(_) => ControlMode::Joystick,
        }
    }

    /// Elements this scheme listens on
    pub fn surfaces(&self) -> &'static [Surface] {
        match self {
            ControlScheme::Wheel(_) => &[
                Surface::SteeringWheel,
                Surface::ThrottlePedal,
                Surface::BrakePedal,
            ],
            ControlScheme::Joystick(_) => &[
                Surface::SteerStick,
                Surface::DriveStick,
                Surface::BrakeButton,
            ],
        }
    }

    /// Touch-start on `surface`. `rect` is the element's footprint.
    pub fn touch_start(&mut self, surface: Surface, touches: &[TouchPoint], rect: SurfaceRect) {
        match (self, surface) {
            (ControlScheme::Wheel(w), Surface::SteeringWheel) => w.wheel_start(touches),
            (ControlScheme::Wheel(w), Surface::ThrottlePedal) => w.press(Pedal::Throttle),
            (ControlScheme::Wheel(w), Surface::BrakePedal) => w.press(Pedal::Brake),
            (ControlScheme::Joystick(j), Surface::SteerStick) => j.steer.start(touches, rect),
            (ControlScheme::Joystick(j), Surface::DriveStick) => j.drive.start(touches, rect),
            (ControlScheme::Joystick(j), Surface::BrakeButton) => j.brake_start(touches),
            _ => {}
        }
    }

    pub fn touch_move(&mut self, surface: Surface, touches: &[TouchPoint]) {
        match (self, surface) {
            (ControlScheme::Wheel(w), Surface::SteeringWheel) => w.wheel_move(touches),
            (ControlScheme::Joystick(j), Surface::SteerStick) => j.steer.move_to(touches),
            (ControlScheme::Joystick(j), Surface::DriveStick) => j.drive.move_to(touches),
            _ => {}
        }
    }

    pub fn touch_end(&mut self, surface: Surface, changed: &[TouchPoint]) {
        match (self, surface) {
            (ControlScheme::Wheel(w), Surface::SteeringWheel) => w.wheel_end(changed),
            (ControlScheme::Joystick(j), Surface::SteerStick) => {
                j.steer.end(changed);
            }
            (ControlScheme::Joystick(j), Surface::DriveStick) => {
                j.drive.end(changed);
            }
            (ControlScheme::Joystick(j), Surface::BrakeButton) => j.brake_end(changed),
            _ => {}
        }
    }

    /// A touch ended anywhere in the document
    pub fn document_touch_end(&mut self) {
        if let ControlScheme::Wheel(w) = self {
            w.release_pedals();
        }
    }

    /// Touch-cancel or focus loss: everything back to neutral
    pub fn release_all(&mut self) {
        match self {
            ControlScheme::Wheel(w) => w.release_all(),
            ControlScheme::Joystick(j) => j.release_all(),
        }
    }

    pub fn signal(&self) -> ControlSignal {
        match self {
            ControlScheme::Wheel(w) => w.signal(),
            ControlScheme::Joystick(j) => j.signal(),
        }
    }
}
