//! Touch bookkeeping shared by every control surface

use glam::Vec2;

/// A single touch sample in client (CSS pixel) coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub id: i32,
    pub x: f32,
    pub y: f32,
}

impl TouchPoint {
    pub fn new(id: i32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Screen-space footprint of a circular control (joystick base)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub center: Vec2,
    pub radius: f32,
}

impl SurfaceRect {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Tracks the one touch identifier that owns a control surface.
///
/// The first touch to land claims the surface; only a touch-end carrying the
/// same identifier releases it. Other fingers on the same element are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchClaim {
    id: Option<i32>,
}

impl TouchClaim {
    /// Claim the surface with the first of `touches` if it is free
    pub fn claim(&mut self, touches: &[TouchPoint]) -> Option<TouchPoint> {
        if self.id.is_some() {
            return None;
        }
        let touch = touches.first().copied()?;
        self.id = Some(touch.id);
        Some(touch)
    }

    /// The sample belonging to the owning touch, if present
    pub fn find(&self, touches: &[TouchPoint]) -> Option<TouchPoint> {
        let id = self.id?;
        touches.iter().find(|t| t.id == id).copied()
    }

    /// Release if the owning touch is among the ended touches
    pub fn release_if_ended(&mut self, changed: &[TouchPoint]) -> bool {
        if self.find(changed).is_some() {
            self.id = None;
            true
        } else {
            false
        }
    }

    pub fn release(&mut self) {
        self.id = None;
    }

    pub fn is_claimed(&self) -> bool {
        self.id.is_some()
    }

    pub fn id(&self) -> Option<i32> {
        self.id
    }
}
