//! # Unified Configuration System
//!
//! Every configurable part of the crate has a serde struct here. They can be
//! loaded on their own or together through [`ApplicationConfig`], from TOML or
//! RON picked by file extension (see [`Config`]).
//!
//! ## Configuration Categories
//!
//! - **Frustum Config**: projection model, field of view, clip distances
//! - **Scene Config**: scene graph capacity and culling switch
//! - **Engine Config**: logging and tick rate of the host loop
//!
//! A TOML application config looks like:
//!
//! ```toml
//! [engine]
//! log_level = "debug"
//! tick_rate_hz = 60
//!
//! [frustum]
//! projection = "perspective"
//! fovy_degrees = 60.0
//! near = 0.1
//! far = 100.0
//! aspect = 1.7777778
//! radius = 10.0
//! lens_shift = [0.0, 0.0]
//! depth_range = "zero_to_one"
//!
//! [scene]
//! initial_capacity = 256
//! enable_culling = true
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Vec2};
use crate::frustum::{DepthRange, Frustum, ProjectionKind};

pub use crate::config::{Config, ConfigError, ConfigFormat};

/// # Frustum Configuration
///
/// Camera projection parameters in human units (degrees). Converted onto a
/// [`Frustum`] with [`FrustumConfig::apply_to`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrustumConfig {
    /// Perspective or orthographic
    pub projection: ProjectionKind,
    /// Vertical field of view in degrees
    pub fovy_degrees: f32,
    /// Near clip distance
    pub near: f32,
    /// Far clip distance
    pub far: f32,
    /// Viewport width / height
    pub aspect: f32,
    /// Orthographic half-height
    pub radius: f32,
    /// Off-axis shift of the view window, in window half-sizes
    pub lens_shift: [f32; 2],
    /// Clip-space depth convention
    pub depth_range: DepthRange,
}

impl Default for FrustumConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionKind::Perspective,
            fovy_degrees: 60.0,
            near: 0.1,
            far: 100.0,
            aspect: 16.0 / 9.0,
            radius: 10.0,
            lens_shift: [0.0, 0.0],
            depth_range: DepthRange::ZeroToOne,
        }
    }
}

impl FrustumConfig {
    /// Copy every parameter onto `frustum`; takes effect on its next update
    pub fn apply_to(&self, frustum: &mut Frustum) {
        frustum.set_kind(self.projection);
        frustum.set_fovy(utils::deg_to_rad(self.fovy_degrees));
        frustum.set_near(self.near);
        frustum.set_far(self.far);
        frustum.set_aspect(self.aspect);
        frustum.set_radius(self.radius);
        frustum.set_lens_shift(Vec2::new(self.lens_shift[0], self.lens_shift[1]));
        frustum.set_depth_range(self.depth_range);
    }

    /// Build a fresh frustum from this configuration
    pub fn to_frustum(&self) -> Frustum {
        let mut frustum = Frustum::new();
        self.apply_to(&mut frustum);
        frustum
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl Config for FrustumConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.near > 0.0) {
            return Err(invalid("near", format!("must be positive, got {}", self.near)));
        }
        if !(self.far > self.near) {
            return Err(invalid("far", format!("must exceed near ({}), got {}", self.near, self.far)));
        }
        if !(self.aspect > 0.0) {
            return Err(invalid("aspect", format!("must be positive, got {}", self.aspect)));
        }
        match self.projection {
            ProjectionKind::Perspective if !(self.fovy_degrees > 0.0 && self.fovy_degrees < 180.0) => Err(invalid(
                "fovy_degrees",
                format!("must be in (0, 180), got {}", self.fovy_degrees),
            )),
            ProjectionKind::Orthographic if !(self.radius > 0.0) => {
                Err(invalid("radius", format!("must be positive, got {}", self.radius)))
            }
            _ => Ok(()),
        }
    }
}

/// # Scene Configuration
///
/// Scene graph sizing and culling behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Node slots reserved up front
    pub initial_capacity: usize,
    /// When false every renderable is reported visible
    pub enable_culling: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 64,
            enable_culling: true,
        }
    }
}

impl Config for SceneConfig {}

/// # Engine Configuration
///
/// Settings of the host loop driving the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log filter passed to `env_logger` (`error` .. `trace`)
    pub log_level: String,
    /// Simulation ticks per second
    pub tick_rate_hz: u32,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            tick_rate_hz: 60,
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set tick rate
    pub fn with_tick_rate(mut self, hz: u32) -> Self {
        self.tick_rate_hz = hz;
        self
    }

    /// Parsed log level
    pub fn level_filter(&self) -> Result<log::LevelFilter, ConfigError> {
        log::LevelFilter::from_str(&self.log_level)
            .map_err(|_| invalid("log_level", format!("unknown level `{}`", self.log_level)))
    }

    /// Seconds per tick
    pub fn tick_seconds(&self) -> f32 {
        1.0 / self.tick_rate_hz.max(1) as f32
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for EngineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.level_filter()?;
        if self.tick_rate_hz == 0 {
            return Err(invalid("tick_rate_hz", "must be at least 1"));
        }
        Ok(())
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all subsystems.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Camera frustum configuration
    pub frustum: FrustumConfig,
    /// Scene graph configuration
    pub scene: SceneConfig,
}

impl Config for ApplicationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.engine.validate()?;
        self.frustum.validate()?;
        self.scene.validate()
    }
}
