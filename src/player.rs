use std::f64::consts::{FRAC_PI_2, PI, SQRT_2};

use crate::camera::CameraPlane;
use crate::geometry::{Point, wrap_angle};
use crate::input::{InputState, Key};

/// Camera plane and motion tuning for a [`Player`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSettings {
    pub plane_width: f64,
    pub plane_distance: f64,
    /// Pixels per second.
    pub speed: f64,
    /// Radians per second.
    pub turn_speed: f64,
}

#[derive(Clone, Debug)]
pub struct Player {
    position: Point,
    heading: f64, // radians, 0 is down, counter-clockwise
    plane: CameraPlane,
    settings: PlayerSettings,
}

impl Player {
    pub fn new(position: Point, heading: f64, settings: PlayerSettings) -> Self {
        let heading = wrap_angle(heading);
        Self {
            position,
            heading,
            plane: CameraPlane::around(
                position,
                heading,
                settings.plane_width,
                settings.plane_distance,
            ),
            settings,
        }
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    #[inline]
    pub fn heading(&self) -> f64 {
        self.heading
    }

    #[inline]
    pub fn camera_plane(&self) -> CameraPlane {
        self.plane
    }

    #[inline]
    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    /// Unit view direction.
    #[inline]
    pub fn forward(&self) -> Point {
        Point::from_heading(self.heading)
    }

    /// Move to `position`, carrying the camera plane along.
    pub fn place(&mut self, position: Point) {
        self.plane = self.plane.translated(position - self.position);
        self.position = position;
    }

    /// Turn by `delta` radians, swinging the camera plane around the player.
    pub fn turn(&mut self, delta: f64) {
        let heading = wrap_angle(self.heading + delta);
        self.plane = self
            .plane
            .rotated_about(self.position, heading - self.heading);
        self.heading = heading;
    }

    pub fn face(&mut self, heading: f64) {
        self.turn(heading - self.heading);
    }

    /// Apply this frame's rotation and return where the movement keys would
    /// take the player. The position itself is left for the caller to commit
    /// with [`Player::place`] once the destination has been validated.
    pub fn propose_move(&mut self, dt: f64, input: &InputState) -> Point {
        let mut turn = 0.0;
        if input.is_held(Key::TurnLeft) {
            turn += 1.0;
        }
        if input.is_held(Key::TurnRight) {
            turn -= 1.0;
        }
        if turn != 0.0 {
            self.turn(turn * self.settings.turn_speed * dt);
        }

        let forward = input.is_held(Key::Forward) || input.is_held(Key::Back);
        let sideways = input.is_held(Key::StrafeLeft) || input.is_held(Key::StrafeRight);
        let mut step = self.settings.speed * dt;
        // diagonal movement is no faster than moving along one axis
        if forward && sideways {
            step /= SQRT_2;
        }

        let mut offset = Point::default();
        for (key, relative) in [
            (Key::Forward, 0.0),
            (Key::StrafeLeft, FRAC_PI_2),
            (Key::Back, PI),
            (Key::StrafeRight, -FRAC_PI_2),
        ] {
            if input.is_held(key) {
                offset += Point::from_heading(self.heading + relative) * step;
            }
        }
        self.position + offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn settings() -> PlayerSettings {
        PlayerSettings {
            plane_width: 30.0,
            plane_distance: 20.0,
            speed: 100.0,
            turn_speed: PI,
        }
    }

    #[test]
    fn rotation_keeps_plane_rigid() {
        let eye = Point::new(100.0, 100.0);
        let mut player = Player::new(eye, PI, settings());
        let before = player.camera_plane();
        player.turn(0.7);
        let after = player.camera_plane();

        for (old, new) in [(before.left, after.left), (before.right, after.right)] {
            assert!((old.distance(eye) - new.distance(eye)).abs() < EPS);
            assert!(new.distance(old.rotated_about(eye, 0.7)) < EPS);
        }
        assert!((after.width() - 30.0).abs() < EPS);
    }

    #[test]
    fn placing_translates_plane() {
        let mut player = Player::new(Point::new(10.0, 10.0), 1.0, settings());
        let before = player.camera_plane();
        player.place(Point::new(40.0, -5.0));
        let after = player.camera_plane();
        let offset = Point::new(30.0, -15.0);
        assert!(after.left.distance(before.left + offset) < EPS);
        assert!(after.right.distance(before.right + offset) < EPS);
    }

    #[test]
    fn heading_wraps() {
        let mut player = Player::new(Point::default(), 0.1, settings());
        player.turn(-0.2);
        assert!((player.heading() - (2.0 * PI - 0.1)).abs() < EPS);
        player.face(7.0 * PI);
        assert!((player.heading() - PI).abs() < EPS);
    }

    #[test]
    fn forward_moves_along_heading() {
        let mut player = Player::new(Point::new(50.0, 50.0), 0.0, settings());
        let target = player.propose_move(0.5, &InputState::holding(&[Key::Forward]));
        assert!(target.distance(Point::new(50.0, 100.0)) < EPS);
        // proposing does not move
        assert_eq!(player.position(), Point::new(50.0, 50.0));
    }

    #[test]
    fn diagonal_is_normalised() {
        let mut player = Player::new(Point::default(), 0.0, settings());
        let target =
            player.propose_move(1.0, &InputState::holding(&[Key::Forward, Key::StrafeLeft]));
        assert!((target.length() - 100.0).abs() < EPS);
        // facing down, strafing left goes towards +x
        assert!(target.x > 0.0 && target.y > 0.0);
    }

    #[test]
    fn turning_is_scaled_by_time() {
        let mut player = Player::new(Point::default(), 1.0, settings());
        player.propose_move(0.25, &InputState::holding(&[Key::TurnLeft]));
        assert!((player.heading() - (1.0 + PI / 4.0)).abs() < EPS);
        player.propose_move(0.5, &InputState::holding(&[Key::TurnRight]));
        assert!((player.heading() - (1.0 - PI / 4.0)).abs() < EPS);
    }
}
