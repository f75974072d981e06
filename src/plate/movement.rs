//! Plate kinematics: velocity, rotation drift, collision response.

use glam::Vec2;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::world::WorldDimension;

/// Translational velocity stored as a unit direction plus a speed scalar,
/// a pending collision impulse, and a circular-drift rotation direction.
///
/// Keeping direction and magnitude separate lets collisions perturb the
/// heading without losing the plate's cruise speed, and lets friction act
/// on the magnitude alone.
#[derive(Debug, Clone)]
pub struct Movement {
    dir: Vec2,
    speed: f32,
    impulse: Vec2,
    rot_dir: f32,
    world_side: f32,
}

impl Movement {
    /// Draws a random initial heading and rotation direction from the
    /// plate's random stream.
    pub fn new(rng: &mut ChaCha8Rng, world: WorldDimension, initial_speed: f32) -> Self {
        let angle = std::f32::consts::TAU * rng.random::<f32>();
        let rot_dir = if rng.random::<u32>() & 1 == 1 { 1.0 } else { -1.0 };
        let speed = initial_speed * (1.0 - rng.random::<f32>() * 1e-5);
        Self {
            dir: Vec2::new(angle.cos(), angle.sin()),
            speed,
            impulse: Vec2::ZERO,
            rot_dir,
            world_side: (world.width() + world.height()) as f32 / 2.0,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Full velocity vector: direction × speed.
    pub fn velocity(&self) -> Vec2 {
        self.dir * self.speed
    }

    pub fn velocity_x(&self) -> f32 {
        self.dir.x * self.speed
    }

    pub fn velocity_y(&self) -> f32 {
        self.dir.y * self.speed
    }

    /// X component of the unit direction when `positive`, else zero.
    /// Subduction uses this to strip the motion the two plates share.
    pub fn velocity_on_x(&self, positive: bool) -> f32 {
        if positive {
            self.dir.x
        } else {
            0.0
        }
    }

    /// Y component of the unit direction when `positive`, else zero.
    pub fn velocity_on_y(&self, positive: bool) -> f32 {
        if positive {
            self.dir.y
        } else {
            0.0
        }
    }

    /// Dot product of the argument with the plate's unit direction.
    pub fn dot(&self, dx: f32, dy: f32) -> f32 {
        self.dir.x * dx + self.dir.y * dy
    }

    pub fn add_impulse(&mut self, dv: Vec2) {
        self.impulse += dv;
    }

    /// Impulse exchange between two colliding plates.
    ///
    /// `ap` and `bp` are the collision point's offsets from this plate's
    /// and the other plate's centers of mass; their difference gives the
    /// collision normal, pointing into the other plate. `coll_mass` is
    /// the mass of the colliding crust. Nothing happens when the centers
    /// coincide or the plates are already separating.
    pub fn collide(
        &mut self,
        other: &mut Movement,
        this_mass: f64,
        other_mass: f64,
        ap: Vec2,
        bp: Vec2,
        coll_mass: f32,
        restitution: f32,
    ) {
        if this_mass <= 0.0 || other_mass <= 0.0 || coll_mass <= 0.0 {
            return;
        }

        let n = ap - bp;
        if n.length_squared() <= 0.0 {
            return;
        }
        let n = n.normalize();

        let rel = self.velocity() - other.velocity();
        let rel_dot_n = rel.dot(n);
        if rel_dot_n <= 0.0 {
            return;
        }

        // Impulse J = -(1+e) (v_rel . n) / (n.n (1/m_b + 1/m_coll));
        // the lighter party receives the greater change in momentum.
        let denom = 1.0 / other_mass as f32 + 1.0 / coll_mass;
        let j = -(1.0 + restitution) * rel_dot_n / denom;

        self.add_impulse(n * (j / this_mass as f32));
        other.add_impulse(-n * (j / other_mass as f32));

        // The impulse's torque about our center decides which way the
        // plate curls from now on.
        let torque = ap.perp_dot(n * j);
        if torque != 0.0 {
            self.rot_dir = torque.signum();
        }
    }

    /// Slows the plate after deformation consumed part of its kinetic
    /// energy. Scales the speed by `1 - deformed/total`, clamped to
    /// `[0, 1]`; no-op when the plate has no mass.
    pub fn apply_friction(&mut self, deformed_mass: f32, total_mass: f32) {
        if total_mass <= 0.0 {
            return;
        }
        let factor = (1.0 - deformed_mass / total_mass).clamp(0.0, 1.0);
        self.speed *= factor;
    }

    /// Advances the kinematic state by one time step: folds pending
    /// impulses into the heading, renormalizes, absorbs the length change
    /// into the speed (floored at zero), then applies the circular drift.
    pub fn step(&mut self) {
        self.dir += self.impulse;
        self.impulse = Vec2::ZERO;

        let len = self.dir.length();
        if len > f32::EPSILON {
            self.dir /= len;
            self.speed = (self.speed + len - 1.0).max(0.0);
        }

        // Plates orbit slightly instead of marching in straight lines;
        // the turn radius scales with the world's mean side.
        let alpha = self.rot_dir * self.speed / (self.world_side * 0.33);
        self.dir = Vec2::from_angle(alpha * self.speed).rotate(self.dir);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn movement(seed: u64) -> Movement {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Movement::new(&mut rng, WorldDimension::new(64, 64), 1.0)
    }

    #[test]
    fn test_initial_direction_is_unit() {
        let m = movement(7);
        assert!((m.velocity().length() - m.speed()).abs() < 1e-5);
        assert!(m.speed() > 0.99 && m.speed() <= 1.0);
    }

    #[test]
    fn test_dot_matches_direction() {
        let m = movement(7);
        let v = m.velocity() / m.speed();
        assert!((m.dot(v.x, v.y) - 1.0).abs() < 1e-5);
        assert!(m.dot(-v.x, -v.y) < 0.0);
    }

    #[test]
    fn test_velocity_on_axis_gating() {
        let m = movement(3);
        assert_eq!(m.velocity_on_x(false), 0.0);
        assert_eq!(m.velocity_on_y(false), 0.0);
        assert!((m.velocity_on_x(true) * m.speed() - m.velocity_x()).abs() < 1e-6);
    }

    #[test]
    fn test_friction_slows_and_clamps() {
        let mut m = movement(11);
        let before = m.speed();
        m.apply_friction(1.0, 4.0);
        assert!((m.speed() - before * 0.75).abs() < 1e-6);

        m.apply_friction(10.0, 4.0);
        assert_eq!(m.speed(), 0.0);
    }

    #[test]
    fn test_friction_ignores_null_mass() {
        let mut m = movement(11);
        let before = m.speed();
        m.apply_friction(1.0, 0.0);
        assert_eq!(m.speed(), before);
    }

    #[test]
    fn test_step_keeps_direction_unit() {
        let mut m = movement(5);
        for _ in 0..32 {
            m.step();
            assert!((m.velocity().length() - m.speed()).abs() < 1e-4);
        }
    }

    #[test]
    fn test_collision_pushes_plates_apart() {
        let mut a = movement(1);
        let mut b = movement(2);

        // Head-on along x: a moves +x, b sits still.
        a.dir = Vec2::X;
        a.speed = 1.0;
        b.dir = Vec2::X;
        b.speed = 0.0;

        let ap = Vec2::new(2.0, 0.0);
        let bp = Vec2::new(-2.0, 0.0);
        a.collide(&mut b, 10.0, 10.0, ap, bp, 5.0, 0.0);

        assert!(a.impulse.x < 0.0, "giver slows down");
        assert!(b.impulse.x > 0.0, "receiver is pushed away");
    }

    #[test]
    fn test_collision_ignores_separating_plates() {
        let mut a = movement(1);
        let mut b = movement(2);
        a.dir = Vec2::NEG_X;
        a.speed = 1.0;
        b.dir = Vec2::X;
        b.speed = 1.0;

        a.collide(&mut b, 10.0, 10.0, Vec2::new(2.0, 0.0), Vec2::new(-2.0, 0.0), 5.0, 0.0);
        assert_eq!(a.impulse, Vec2::ZERO);
        assert_eq!(b.impulse, Vec2::ZERO);
    }
}
