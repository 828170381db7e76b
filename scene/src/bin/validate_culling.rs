//! Quick hierarchy and culling smoke utility

use scene::prelude::*;
use std::env;
use std::sync::Arc;

fn main() {
    scene::init_logging();

    let args: Vec<String> = env::args().collect();
    let sphere_count: usize = args
        .get(1)
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(1024);

    // Hierarchy: parent at the origin, child offset one unit along +X.
    let mut universe = SimpleUniverse::new();
    let parent = universe.spawn(0, Mat4::IDENTITY);
    let child = universe.spawn(1, Mat4::from_translation(Vec3::X));

    let mut hierarchy = Hierarchy::new();
    hierarchy.set_parent(&mut universe, child, Some(parent));

    universe.set_world_transform(parent, Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
    hierarchy.process_moved(&mut universe);

    let child_position = universe.world_transform(child).w_axis.truncate();
    println!("child world position after parent move: {child_position}");
    if (child_position - Vec3::new(6.0, 0.0, 0.0)).length() > 1e-4 {
        eprintln!("✗ hierarchy propagation produced an unexpected position");
        std::process::exit(1);
    }

    // Culling: a diagonal line of unit spheres against a centered volume.
    let dispatcher = Arc::new(RayonDispatcher::new());
    let mut culler = SphereCuller::new(dispatcher);
    for slot in 0..sphere_count {
        let center = Vec3::splat(slot as f32 * 0.5);
        culler.add_static(Sphere::new(center, 1.0), slot);
    }

    let frustum = Frustum::from_matrix(Mat4::orthographic_rh(
        -100.0, 100.0, -100.0, 100.0, -100.0, 100.0,
    ));

    culler.cull_to_frustum(&frustum);
    let sync_visible = culler.result().len();

    culler.cull_to_frustum_async(&frustum);
    let async_visible = culler.result_async().len();

    println!("spheres: {sphere_count}");
    println!("visible (sync): {sync_visible}");
    println!("visible (async): {async_visible}");

    if sync_visible == async_visible {
        println!("✓ synchronous and dispatched culls agree");
    } else {
        eprintln!("✗ result mismatch between synchronous and dispatched culls");
        std::process::exit(1);
    }
}
