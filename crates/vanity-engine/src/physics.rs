//! Balloon motion model: idle-gated bob/sway animation plus a single-step
//! spring toward the float position above the player.
//!
//! Pure functions over a parameter struct so the model is testable without a
//! world. One step per game tick (50 ms).

use vanity_world::Location;

/// Seconds per game tick at 20 TPS.
pub const TICK_SECONDS: f32 = 0.05;

/// Tuning parameters for the balloon motion model.
#[derive(Debug, Clone)]
pub struct BalloonPhysics {
    /// Per-tick player displacement below which the player counts as idle.
    pub idle_threshold: f32,
    /// Seconds of stillness required for the idle ramp to saturate.
    pub idle_cap: f32,
    /// Angular speed of the vertical bob (rad/s).
    pub bob_speed: f32,
    /// Angular speed of the horizontal sway (rad/s).
    pub sway_speed: f32,
    pub bob_amplitude: f32,
    pub sway_amplitude: f32,
    /// Idle-scaled pull toward a rest position behind the player (blocks).
    pub idle_pull_back: f32,
    /// Fraction of the follow distance covered per tick.
    pub spring_gain: f32,
    /// Cap on the distance covered in one tick (blocks).
    pub spring_max_step: f32,
    /// Follow distances below this leave the balloon in place.
    pub dead_zone: f32,
    /// Beyond this distance from the player the balloon snaps home.
    pub snap_distance: f32,
    /// Degrees of tilt per block of horizontal follow offset.
    pub tilt_gain: f32,
    /// Extra idle sway tilt amplitude (degrees).
    pub idle_tilt: f32,
}

impl Default for BalloonPhysics {
    fn default() -> Self {
        Self {
            idle_threshold: 0.1,
            idle_cap: 2.0,
            bob_speed: 2.0,
            sway_speed: 1.5,
            bob_amplitude: 0.15,
            sway_amplitude: 0.1,
            idle_pull_back: -0.5,
            spring_gain: 0.3,
            spring_max_step: 0.5,
            dead_zone: 0.1,
            snap_distance: 5.0,
            tilt_gain: 30.0,
            idle_tilt: 15.0,
        }
    }
}

/// Result of one motion step.
#[derive(Debug, Clone, Copy)]
pub struct BalloonStep {
    /// Where the balloon body ends up this tick.
    pub target: Location,
    /// Head-pose Euler angles in degrees `(pitch, yaw, roll)`.
    pub tilt: (f32, f32, f32),
    /// The hard-snap ceiling was exceeded and the spring was bypassed.
    pub snapped: bool,
}

impl BalloonPhysics {
    /// Advance the idle timer: accumulate while the player is still, reset
    /// to zero the moment they move.
    pub fn advance_idle(&self, idle_time: f32, movement: f32) -> f32 {
        if movement < self.idle_threshold {
            idle_time + TICK_SECONDS
        } else {
            0.0
        }
    }

    /// Smooth 0→1 ramp into idle-only animation.
    pub fn idle_factor(&self, idle_time: f32) -> f32 {
        idle_time.min(self.idle_cap) / self.idle_cap
    }

    /// Advance a phase accumulator, wrapping at 2π.
    pub fn advance_phase(&self, phase: f32, speed: f32) -> f32 {
        (phase + speed * TICK_SECONDS) % std::f32::consts::TAU
    }

    /// Bob/sway offset around the float position, rotated into the player's
    /// facing and faded in by the idle factor.
    pub fn animation_offset(
        &self,
        idle: f32,
        bob_phase: f32,
        sway_phase: f32,
        yaw_deg: f32,
    ) -> (f32, f32, f32) {
        let bob = idle * self.bob_amplitude * bob_phase.sin();
        let sway = idle * self.sway_amplitude * sway_phase.sin();
        let yaw = yaw_deg.to_radians();
        (
            sway * yaw.cos(),
            bob,
            sway * yaw.sin() + self.idle_pull_back * idle,
        )
    }

    /// One spring step along the follow vector: a fraction of the distance,
    /// capped, and zero inside the dead zone.
    pub fn spring_step(&self, follow: (f32, f32, f32)) -> (f32, f32, f32) {
        let (dx, dy, dz) = follow;
        let distance = (dx * dx + dy * dy + dz * dz).sqrt();
        if distance <= self.dead_zone {
            return (0.0, 0.0, 0.0);
        }
        let step = (distance * self.spring_gain).min(self.spring_max_step);
        let scale = step / distance;
        (dx * scale, dy * scale, dz * scale)
    }

    /// Tilt from the horizontal follow components (scaled, inverted) plus a
    /// small idle sway contribution; yaw mirrors the player exactly.
    pub fn tilt(
        &self,
        spring: (f32, f32, f32),
        idle: f32,
        sway_phase: f32,
        yaw_deg: f32,
    ) -> (f32, f32, f32) {
        let pitch = -spring.2 * self.tilt_gain;
        let roll = -spring.0 * self.tilt_gain + idle * self.idle_tilt * sway_phase.sin();
        (pitch, yaw_deg, roll)
    }

    /// Run one full motion step.
    ///
    /// The rest position is the player plus float height plus the idle
    /// animation offset; the balloon springs toward it, and snaps straight
    /// home if it has fallen too far behind (rubber-banding guard).
    pub fn step(
        &self,
        player: &Location,
        balloon: &Location,
        height: f32,
        idle: f32,
        bob_phase: f32,
        sway_phase: f32,
    ) -> BalloonStep {
        let (ax, ay, az) = self.animation_offset(idle, bob_phase, sway_phase, player.yaw);
        let rest = player.offset(ax, ay + height, az);
        let follow = (
            rest.x - balloon.x,
            rest.y - balloon.y,
            rest.z - balloon.z,
        );
        let spring = self.spring_step(follow);

        let mut target = Location {
            world: player.world,
            x: balloon.x + spring.0,
            y: balloon.y + spring.1,
            z: balloon.z + spring.2,
            yaw: player.yaw,
            pitch: 0.0,
        };

        let snapped = target.distance(player) > self.snap_distance;
        if snapped {
            target = player.offset(0.0, height, 0.0);
        }

        BalloonStep {
            target,
            tilt: self.tilt(spring, idle, sway_phase, player.yaw),
            snapped,
        }
    }
}
