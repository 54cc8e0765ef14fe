//! Fleet culling demo
//!
//! Flies a frigate with escort formations past a chase camera and logs, per
//! tick, how many nodes propagation touched and how many renderables
//! survived frustum culling. No window is opened.
//!
//! Usage: `cull_demo [config.toml|config.ron]`

use scene_core::core::config::{ApplicationConfig, Config, ConfigError};
use scene_core::debug::DebugDraw;
use scene_core::foundation::logging;
use scene_core::foundation::math::Vec4;
use scene_core::prelude::*;

// Fleet configuration
const ESCORTS_PER_FORMATION: usize = 5;
const FORMATIONS: usize = 4;
const FORMATION_ORBIT_RADIUS: f32 = 15.0;
const FORMATION_ORBIT_SPEED: f32 = 0.5;
const FRIGATE_SPEED: f32 = 5.0;
const FRIGATE_START_Z: f32 = -120.0;
const SIMULATED_SECONDS: f32 = 40.0;
const CAMERA_HEIGHT: f32 = 12.0;
const CAMERA_DISTANCE: f32 = 30.0;

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("scene: {0}")]
    Scene(#[from] SceneError),

    #[error("camera: {0}")]
    Frustum(#[from] FrustumError),
}

struct Fleet {
    frigate: NodeKey,
    formations: Vec<NodeKey>,
}

fn build_fleet(scene: &mut SceneGraph) -> Result<Fleet, DemoError> {
    let frigate = scene.create_child_of_root("frigate");
    scene.set_translate(frigate, Vec3::new(0.0, 0.0, FRIGATE_START_Z))?;
    scene.set_bounds(frigate, Aabb::new(Vec3::zeros(), Vec3::new(3.0, 2.0, 10.0)))?;

    let mut formations = Vec::with_capacity(FORMATIONS);
    for f in 0..FORMATIONS {
        let pivot = scene.create_node(frigate, format!("formation_{f}"))?;
        let angle = f as f32 / FORMATIONS as f32 * std::f32::consts::TAU;
        scene.set_rotate(pivot, Quat::from_axis_angle(&Vec3::z_axis(), angle))?;

        // V formation: a leader and two trailing wings
        for s in 0..ESCORTS_PER_FORMATION {
            let escort = scene.create_node(pivot, format!("escort_{f}_{s}"))?;
            let wing = ((s + 1) / 2) as f32;
            let side = if s % 2 == 0 { 1.0 } else { -1.0 };
            scene.set_translate(escort, Vec3::new(FORMATION_ORBIT_RADIUS + side * wing * 2.0, 0.0, wing * 3.0))?;
            scene.set_bounds(escort, Sphere::new(Vec3::zeros(), 2.0))?;
        }
        formations.push(pivot);
    }

    Ok(Fleet { frigate, formations })
}

fn run(config: &ApplicationConfig) -> Result<(), DemoError> {
    let mut scene = SceneGraph::with_config(&config.scene);
    let fleet = build_fleet(&mut scene)?;
    log::info!("Built fleet with {} nodes ({} renderables)", scene.len(), scene.renderable_count());

    let mut camera = Camera::from_config(
        &config.frustum,
        Vec3::new(0.0, CAMERA_HEIGHT, CAMERA_DISTANCE),
        Vec3::zeros(),
    );
    let mut debug_draw = DebugDraw::new();
    let mut visible = Vec::new();

    let dt = config.engine.tick_seconds();
    let ticks = (SIMULATED_SECONDS / dt) as usize;
    let orbit = Quat::from_axis_angle(&Vec3::z_axis(), FORMATION_ORBIT_SPEED * dt);

    for tick in 0..ticks {
        scene.translate(fleet.frigate, Vec3::new(0.0, 0.0, FRIGATE_SPEED * dt))?;
        for &pivot in &fleet.formations {
            scene.rotate(pivot, orbit)?;
        }
        let propagation = scene.update_transforms();

        camera.track_node(&scene, fleet.frigate)?;
        camera.update()?;

        visible.clear();
        let culling = scene.cull(&camera.frustum, &mut visible);

        debug_draw.clear();
        debug_draw.draw_frustum(&camera.frustum, Vec4::new(1.0, 1.0, 0.0, 1.0));
        for &key in &visible {
            if let (Some(bounds), Some(transform)) = (scene.bounds(key), scene.world_transform(key)) {
                debug_draw.draw_bounds(bounds, &transform, Vec4::new(0.0, 1.0, 0.0, 1.0));
            }
        }

        if tick % config.engine.tick_rate_hz.max(1) as usize == 0 {
            log::info!(
                "t={:5.1}s frigate z={:7.1} recomputed {:3}/{:3} visible {:3}/{:3} debug lines {}",
                tick as f32 * dt,
                scene.derived_translate(fleet.frigate).map_or(0.0, |t| t.z),
                propagation.recomputed,
                propagation.visited,
                culling.visible,
                culling.tested,
                debug_draw.lines().len()
            );
        }
    }

    Ok(())
}

fn load_config() -> Result<ApplicationConfig, DemoError> {
    match std::env::args().nth(1) {
        Some(path) => Ok(ApplicationConfig::load_from_file(path)?),
        None => Ok(ApplicationConfig::default()),
    }
}

fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(err) => {
            logging::init();
            log::error!("Failed to load configuration: {}", err);
            std::process::exit(1);
        }
    };

    logging::init_with_level(&config.engine.log_level);

    if let Err(err) = run(&config) {
        log::error!("Demo failed: {}", err);
        std::process::exit(1);
    }
}
