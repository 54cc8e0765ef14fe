//! Per-frame data flow: edit the scene, propagate, update the camera, cull.

use approx::assert_relative_eq;
use scene_core::core::config::ConfigFormat;
use scene_core::prelude::*;

const EPSILON: f32 = 1e-4;

/// A frigate with a row of escorts parented to it
fn fleet(scene: &mut SceneGraph, escorts: usize) -> (NodeKey, Vec<NodeKey>) {
    let frigate = scene.create_child_of_root("frigate");
    scene.set_bounds(frigate, Aabb::new(Vec3::zeros(), Vec3::new(2.0, 1.0, 6.0))).unwrap();

    let escorts = (0..escorts)
        .map(|i| {
            let escort = scene.create_node(frigate, format!("escort_{i}")).unwrap();
            let side = if i % 2 == 0 { 1.0 } else { -1.0 };
            scene.set_translate(escort, Vec3::new(side * 4.0, 0.0, 3.0 * i as f32)).unwrap();
            scene.set_bounds(escort, Sphere::new(Vec3::zeros(), 1.0)).unwrap();
            escort
        })
        .collect();

    (frigate, escorts)
}

#[test]
fn test_fleet_is_visible_then_leaves_view() {
    let mut scene = SceneGraph::new();
    let (frigate, escorts) = fleet(&mut scene, 4);
    scene.set_translate(frigate, Vec3::new(0.0, 0.0, -40.0)).unwrap();

    let first = scene.update_transforms();
    assert_eq!(first.recomputed, scene.len());

    let mut camera = Camera::new(Vec3::new(0.0, 5.0, 0.0), Vec3::zeros());
    camera.track_node(&scene, frigate).unwrap();
    camera.update().unwrap();

    let mut visible = Vec::new();
    let stats = scene.cull(&camera.frustum, &mut visible);
    assert_eq!(stats, VisibilityStats { tested: 5, visible: 5 });
    assert_eq!(visible[0], frigate);
    assert_eq!(&visible[1..], escorts.as_slice());

    // Only the frigate is edited; its escorts follow in the same pass
    scene.translate(frigate, Vec3::new(0.0, 0.0, 80.0)).unwrap();
    let second = scene.update_transforms();
    assert_eq!(second.recomputed, 5);
    assert_relative_eq!(
        scene.derived_translate(escorts[0]).unwrap(),
        Vec3::new(4.0, 0.0, 40.0),
        epsilon = EPSILON
    );

    camera.update().unwrap();
    assert!(scene.query_visible(&camera.frustum).is_empty());
}

#[test]
fn test_propagation_is_idempotent_across_frames() {
    let mut scene = SceneGraph::new();
    let (frigate, escorts) = fleet(&mut scene, 3);
    scene.set_rotate(frigate, Quat::from_axis_angle(&Vec3::y_axis(), 0.4)).unwrap();
    scene.set_scale(frigate, Vec3::new(1.5, 1.5, 1.5)).unwrap();
    scene.update_transforms();

    let snapshot: Vec<Mat4> = escorts.iter().map(|&e| *scene.full_transform(e).unwrap()).collect();
    let again = scene.update_transforms();
    assert_eq!(again.recomputed, 0);
    for (&escort, before) in escorts.iter().zip(&snapshot) {
        assert_eq!(scene.full_transform(escort).unwrap(), before);
    }
}

#[test]
fn test_destroyed_escort_is_never_reported() {
    let mut scene = SceneGraph::new();
    let (frigate, escorts) = fleet(&mut scene, 2);
    scene.set_translate(frigate, Vec3::new(0.0, 0.0, -30.0)).unwrap();
    scene.update_transforms();

    let mut camera = Camera::new(Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
    camera.update().unwrap();

    scene.destroy_node(escorts[1]).unwrap();
    assert_eq!(scene.query_visible(&camera.frustum), vec![frigate, escorts[0]]);
}

#[test]
fn test_configured_orthographic_camera_culls_by_box() {
    let text = r#"
        [engine]
        log_level = "warn"

        [frustum]
        projection = "orthographic"
        radius = 5.0
        aspect = 1.0
        near = 1.0
        far = 50.0

        [scene]
        enable_culling = true
    "#;
    let config = ApplicationConfig::load_from_str(text, ConfigFormat::Toml).unwrap();

    let mut scene = SceneGraph::with_config(&config.scene);
    let inside = scene.create_child_of_root("inside");
    scene.set_translate(inside, Vec3::new(4.0, 0.0, -10.0)).unwrap();
    scene.set_bounds(inside, SquareAabb::new(Vec3::zeros(), 0.5)).unwrap();
    let outside = scene.create_child_of_root("outside");
    scene.set_translate(outside, Vec3::new(7.0, 0.0, -10.0)).unwrap();
    scene.set_bounds(outside, SquareAabb::new(Vec3::zeros(), 0.5)).unwrap();
    scene.update_transforms();

    let mut camera = Camera::from_config(&config.frustum, Vec3::zeros(), Vec3::new(0.0, 0.0, -1.0));
    camera.update().unwrap();

    assert_eq!(scene.query_visible(&camera.frustum), vec![inside]);
}

#[test]
fn test_projection_override_with_gl_depth_matches_built_in_planes() {
    let mut built_in = Camera::new(Vec3::new(1.0, 2.0, 3.0), Vec3::zeros());
    built_in.update().unwrap();

    // Same frustum expressed with a [-1, 1] depth projection
    let f = built_in.frustum.clone();
    let gl_projection = Mat4::new_perspective(f.aspect(), f.fovy(), f.near(), f.far());
    let mut overridden = built_in.clone();
    overridden.frustum.set_depth_range(DepthRange::NegativeOneToOne);
    overridden.frustum.set_projection_override(gl_projection);
    overridden.update().unwrap();

    for index in PlaneIndex::ALL {
        let a = built_in.frustum.plane(index);
        let b = overridden.frustum.plane(index);
        assert_relative_eq!(a.normal, b.normal, epsilon = EPSILON);
        assert_relative_eq!(a.distance, b.distance, epsilon = 1e-2);
    }
}
