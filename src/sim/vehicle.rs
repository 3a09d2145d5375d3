//! Arcade vehicle physics
//!
//! Scalar speed integration with clamping; steering only rotates the heading a
//! little, with authority growing with speed.

use super::state::VehicleState;
use crate::consts::*;
use crate::controls::ControlSignal;
use crate::{clamp_unit, forward_from_yaw};

impl VehicleState {
    /// Apply pedals to speed for one frame of `dt` seconds
    pub fn integrate_speed(&mut self, control: &ControlSignal, dt: f32) {
        let throttle = control.throttle();
        let braking = control.braking();

        if throttle > 0.0 {
            let mut accel = THROTTLE_ACCEL * throttle;
            if self.speed < 0.0 {
                // Recover from reverse faster
                accel *= 2.0;
            }
            self.acceleration = accel;
            self.speed += accel * dt;
        } else if braking > 0.0 {
            let mut accel = -BRAKE_DECEL * braking;
            if self.speed < 0.0 {
                accel *= 0.5;
            }
            self.acceleration = accel;
            self.speed += accel * dt;
        } else if self.speed.abs() < STOP_SNAP_SPEED {
            self.acceleration = 0.0;
            self.speed = 0.0;
        } else {
            self.acceleration = -self.speed.signum() * COAST_DECEL;
            let next = self.speed + self.acceleration * dt;
            // Rolling resistance stops the car but never reverses it
            self.speed = if next * self.speed <= 0.0 { 0.0 } else { next };
        }

        self.speed = self.speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    /// Turn the steering input into a steering angle and heading
    pub fn apply_steering(&mut self, steering: f32) {
        let authority = (self.speed.abs() / STEERING_REFERENCE_SPEED).min(1.0);
        self.steering_angle = clamp_unit(steering) * MAX_STEERING * authority;
        self.heading = self.base_yaw - self.steering_angle * HEADING_GAIN;
    }

    /// Move along the heading. In a scrolling world only the lateral part of
    /// the motion moves the vehicle; the agents carry the rest.
    pub fn advance(&mut self, dt: f32, scrolling: bool) {
        let step = forward_from_yaw(self.heading) * self.speed * dt;
        if scrolling {
            self.position.x += step.x;
        } else {
            self.position += step;
        }
        self.odometer += step.dot(self.track_forward());
    }

    /// One full physics update
    pub fn update(&mut self, control: &ControlSignal, dt: f32, scrolling: bool) {
        self.integrate_speed(control, dt);
        self.apply_steering(control.steering);
        self.advance(dt, scrolling);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use proptest::prelude::*;

    use crate::sim::state::Gear;

    fn throttle() -> ControlSignal {
        ControlSignal {
            pedal: 1.0,
            ..Default::default()
        }
    }

    fn brake() -> ControlSignal {
        ControlSignal {
            pedal: -1.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_throttle_from_rest_for_one_second() {
        let mut vehicle = VehicleState::new(0.0);
        vehicle.integrate_speed(&throttle(), 1.0);
        assert!((vehicle.speed - 5.0).abs() < 1e-6);
        assert_eq!(vehicle.gear(), Gear::Neutral);

        vehicle.integrate_speed(&throttle(), 0.1);
        assert_eq!(vehicle.gear(), Gear::Drive);
    }

    #[test]
    fn test_throttle_doubles_in_reverse() {
        let mut vehicle = VehicleState::new(0.0);
        vehicle.speed = -10.0;
        vehicle.integrate_speed(&throttle(), 1.0);
        assert!((vehicle.speed - 0.0).abs() < 1e-6);
        assert_eq!(vehicle.acceleration, 10.0);
    }

    #[test]
    fn test_brake_halved_in_reverse() {
        let mut vehicle = VehicleState::new(0.0);
        vehicle.speed = 20.0;
        vehicle.integrate_speed(&brake(), 1.0);
        assert!((vehicle.speed - 10.0).abs() < 1e-6);

        vehicle.speed = -2.0;
        vehicle.integrate_speed(&brake(), 1.0);
        assert!((vehicle.speed + 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_brake_button_beats_stick() {
        let mut vehicle = VehicleState::new(0.0);
        vehicle.speed = 30.0;
        let control = ControlSignal {
            steering: 0.0,
            pedal: 1.0,
            brake: true,
        };
        vehicle.integrate_speed(&control, 1.0);
        assert!((vehicle.speed - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_coasting_snaps_to_zero() {
        let mut vehicle = VehicleState::new(0.0);
        vehicle.speed = 0.9;
        vehicle.integrate_speed(&ControlSignal::NEUTRAL, 0.016);
        assert_eq!(vehicle.speed, 0.0);

        vehicle.speed = -0.5;
        vehicle.integrate_speed(&ControlSignal::NEUTRAL, 0.016);
        assert_eq!(vehicle.speed, 0.0);
    }

    #[test]
    fn test_coasting_never_reverses() {
        let mut vehicle = VehicleState::new(0.0);
        vehicle.speed = 1.5;
        vehicle.integrate_speed(&ControlSignal::NEUTRAL, 1.0);
        assert_eq!(vehicle.speed, 0.0);
    }

    #[test]
    fn test_zero_dt_is_a_no_op() {
        let mut vehicle = VehicleState::new(0.0);
        vehicle.speed = 40.0;
        vehicle.update(&throttle(), 0.0, false);
        assert_eq!(vehicle.speed, 40.0);
        assert_eq!(vehicle.position, Vec3::ZERO);
    }

    #[test]
    fn test_no_steering_at_rest() {
        let mut vehicle = VehicleState::new(0.0);
        vehicle.apply_steering(1.0);
        assert_eq!(vehicle.steering_angle, 0.0);
        assert_eq!(vehicle.heading, 0.0);
    }

    #[test]
    fn test_steering_authority_scales_with_speed() {
        let mut vehicle = VehicleState::new(0.0);
        vehicle.speed = 25.0;
        vehicle.apply_steering(1.0);
        assert!((vehicle.steering_angle - 0.015).abs() < 1e-6);

        vehicle.speed = 200.0;
        vehicle.apply_steering(1.0);
        assert!((vehicle.steering_angle - MAX_STEERING).abs() < 1e-6);
        // Steering right yaws away from +X
        assert!(vehicle.heading < 0.0);
    }

    #[test]
    fn test_advance_along_track() {
        let mut vehicle = VehicleState::new(0.0);
        vehicle.speed = 10.0;
        vehicle.advance(0.5, false);
        assert!((vehicle.position - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
        assert!((vehicle.odometer - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_scrolling_pins_longitudinal_position() {
        let mut vehicle = VehicleState::new(std::f32::consts::PI);
        vehicle.speed = 100.0;
        vehicle.apply_steering(1.0);
        vehicle.advance(0.1, true);
        assert_eq!(vehicle.position.z, 0.0);
        // Facing -Z, steering right moves toward +X
        assert!(vehicle.position.x > 0.0);
        assert!(vehicle.odometer > 9.0);
    }

    proptest! {
        #[test]
        fn prop_speed_stays_in_range(
            start in MIN_SPEED..MAX_SPEED,
            pedal in -1.0f32..1.0,
            brake in any::<bool>(),
            steering in -1.0f32..1.0,
            dt in 0.0f32..5.0,
        ) {
            let mut vehicle = VehicleState::new(0.0);
            vehicle.speed = start;
            let control = ControlSignal { steering, pedal, brake };
            for _ in 0..10 {
                vehicle.update(&control, dt, false);
                prop_assert!(vehicle.speed >= MIN_SPEED && vehicle.speed <= MAX_SPEED);
                prop_assert!(vehicle.speed.is_finite());
            }
        }
    }
}
