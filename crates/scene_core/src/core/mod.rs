//! # Core Module
//!
//! Shared configuration types used by the scene, the camera and the host
//! application.

pub mod config;

pub use config::{ApplicationConfig, Config, ConfigError, ConfigFormat, EngineConfig, FrustumConfig, SceneConfig};
