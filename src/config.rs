//! Tunable parameters of the plate engine.

use serde::{Deserialize, Serialize};

/// Parameters controlling crust classification, plate kinematics, and
/// erosion strength.
///
/// The defaults reproduce the behavior of the classic plate-tectonics
/// terrain model; the named constructors offer rough presets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateParams {
    /// Minimum crust thickness that counts as continental crust. Flood
    /// fill only claims cells at or above this when discovering
    /// continents.
    pub continent_base: f32,
    /// Speed every plate starts with, in world cells per step.
    pub initial_speed: f32,
    /// Coefficient of restitution for plate collisions.
    /// 1 = fully elastic, 0 = plates stick together.
    pub restitution: f32,
    /// Fraction of the excess above the erosion floor a river removes
    /// from its source cell each step.
    pub river_erosion: f32,
    /// Multiplicative gain the erosion noise pass applies to every cell.
    pub noise_gain: f32,
    /// Amplitude of the random decay drawn per cell by the noise pass.
    pub noise_jitter: f32,
}

impl Default for PlateParams {
    fn default() -> Self {
        Self {
            continent_base: 1.0,
            initial_speed: 1.0,
            restitution: 0.0,
            river_erosion: 0.2,
            noise_gain: 0.1,
            noise_jitter: 0.2,
        }
    }
}

impl PlateParams {
    /// Parameters for a geologically active world: faster plates,
    /// stronger rivers.
    pub fn active() -> Self {
        Self {
            initial_speed: 1.5,
            river_erosion: 0.3,
            ..Default::default()
        }
    }

    /// Parameters for a quiet world: slow plates, gentle erosion.
    pub fn stable() -> Self {
        Self {
            initial_speed: 0.6,
            river_erosion: 0.1,
            noise_jitter: 0.1,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params() {
        let params = PlateParams::default();
        assert_eq!(params.continent_base, 1.0);
        assert_eq!(params.restitution, 0.0);
    }

    #[test]
    fn test_active_params() {
        let params = PlateParams::active();
        assert!(params.initial_speed > PlateParams::default().initial_speed);
    }

    #[test]
    fn test_stable_params() {
        let params = PlateParams::stable();
        assert!(params.river_erosion < PlateParams::default().river_erosion);
    }
}
