//! AI tuning parameters.

use bevy::prelude::*;

/// Global AI parameters (detection, engagement, chase speed).
#[derive(Resource, Debug, Clone, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct AiConfig {
    /// Idle agents start hating hostile actors inside this radius (meters)
    pub detect_range: f32,
    /// Foes farther than this stop being appropriate (meters, None = unlimited)
    pub max_engagement_range: Option<f32>,
    /// Straight-line chase speed (m/s)
    pub chase_speed: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            detect_range: 10.0,
            max_engagement_range: Some(20.0),
            chase_speed: 4.0,
        }
    }
}
