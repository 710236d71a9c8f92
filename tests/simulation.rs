use std::io::Cursor;

use approx::assert_relative_eq;
use hullsim::mesh::obj::{read_obj, read_obj_objects};
use hullsim::prelude::*;

const CUBE_OBJ: &str = "\
# unit cube
o cube
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 1 4 3 2
f 5 6 7 8
f 1 2 6 5
f 3 4 8 7
f 1 5 8 4
f 2 3 7 6
";

const SPLIT_CUBE_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 1 4 3
f 1 3 2
f 5 6 7
f 5 7 8
f 1 2 6
f 1 6 5
f 3 4 8
f 3 8 7
f 1 5 8
f 1 8 4
f 2 3 7
f 2 7 6
";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[test]
fn cube_from_obj_has_unit_mass_properties() {
    let mesh = read_obj(Cursor::new(CUBE_OBJ), None).unwrap();
    assert_eq!(mesh.num_faces(), 6);
    assert_eq!(mesh.num_edges(), 24);

    let collider = Collider::hull(mesh, 1.0).unwrap();
    assert_relative_eq!(collider.mass(), 1.0, epsilon = 1e-5);
    assert!(collider.centroid().abs_diff_eq(Vec3::splat(0.5), 1e-5));
    let inertia = collider.inertia();
    assert!(inertia.approx_eq(Mat3::from_diagonal(Vec3::splat(1.0 / 6.0)), 1e-5));
}

#[test]
fn triangulated_obj_merges_back_to_quads() {
    init_tracing();
    let raw = read_obj(Cursor::new(SPLIT_CUBE_OBJ), None).unwrap();
    assert_eq!(raw.num_faces(), 12);

    let merged = read_obj(Cursor::new(SPLIT_CUBE_OBJ), Some(DEFAULT_MERGE_TOLERANCE)).unwrap();
    assert_eq!(merged.num_faces(), 6);
    assert_eq!(merged.num_edges(), 24);
    assert!(merged.validate().is_ok());

    let a = Collider::hull(raw, 1.0).unwrap();
    let b = Collider::hull(merged, 1.0).unwrap();
    assert_relative_eq!(a.mass(), b.mass(), epsilon = 1e-5);
}

#[test]
fn objects_are_split_on_request() {
    let two = format!("{CUBE_OBJ}o second\nv 2 0 0\nv 3 0 0\nv 2 1 0\nv 2 0 1\nf 9 11 10\nf 9 10 12\nf 9 12 11\nf 10 11 12\n");
    let meshes = read_obj_objects(Cursor::new(two), None).unwrap();
    assert_eq!(meshes.len(), 2);
    assert_eq!(meshes[0].num_faces(), 6);
    assert_eq!(meshes[1].num_faces(), 4);
    assert_eq!(meshes[1].num_vertices(), 4);
}

#[test]
fn dropped_cube_falls_and_sleeps_below_floor() {
    init_tracing();
    let mesh = read_obj(Cursor::new(CUBE_OBJ), None).unwrap();
    let mut world = World::new(SimConfig::default().with_floor_height(-1.0));
    let cube = world
        .spawn_hull(mesh, RigidBodyDesc::dynamic(), 1.0)
        .unwrap();
    let floor = world.create_body(RigidBodyDesc::fixed());

    let mut last = world.body(cube).unwrap().position.y;
    for _ in 0..30 {
        world.step(1.0 / 60.0);
        let y = world.body(cube).unwrap().position.y;
        assert!(y <= last);
        last = y;
    }
    assert!(last < 0.0);

    for _ in 0..600 {
        world.step(1.0 / 60.0);
    }
    let body = world.body(cube).unwrap();
    assert!(!body.is_awake);
    assert_eq!(body.velocity, Vec3::ZERO);
    assert!(body.position.y < -1.0);
    assert_eq!(world.body(floor).unwrap().position, Vec3::ZERO);
}

#[test]
fn spinning_hull_keeps_its_centroid() {
    let mesh = read_obj(Cursor::new(CUBE_OBJ), None).unwrap();
    let mut world = World::new(SimConfig::zero_gravity().with_damping(1.0));
    let desc = RigidBodyDesc::dynamic().with_angular_velocity(Vec3::new(0.3, 1.0, -0.5));
    let cube = world.spawn_hull(mesh, desc, 1.0).unwrap();

    for _ in 0..240 {
        world.step(1.0 / 60.0);
    }
    let body = world.body(cube).unwrap();
    assert!(body.centroid.abs_diff_eq(Vec3::splat(0.5), 1e-4));
    assert_relative_eq!(body.orientation.length(), 1.0, epsilon = 1e-5);
    let centroid = body.local_to_global_point(Vec3::splat(0.5));
    assert!(centroid.abs_diff_eq(body.centroid, 1e-4));
}

#[test]
fn particles_report_contacts_from_both_shapes() {
    let mesh = read_obj(Cursor::new(CUBE_OBJ), None).unwrap();
    let mut world = World::new(SimConfig::zero_gravity());
    world
        .spawn_hull(mesh, RigidBodyDesc::fixed(), 2.0)
        .unwrap();
    let ball = world.create_body(RigidBodyDesc::dynamic().with_position(Vec3::new(5.0, 0.0, 0.0)));
    world
        .attach_collider(ball, Collider::sphere(1.0, 1.0).unwrap())
        .unwrap();

    let particles = [
        Particle::new(7, Vec3::new(1.0, 1.98, 1.0)),
        Particle::new(8, Vec3::new(5.0, 0.5, 0.0)),
        Particle::new(9, Vec3::new(-3.0, 0.0, 0.0)),
    ];
    let contacts = world.query_particles(&particles);
    assert_eq!(contacts.len(), 2);

    let top = contacts.iter().find(|c| c.particle.0 == 7).unwrap();
    assert!(top.normal.abs_diff_eq(Vec3::Y, 1e-5));
    assert_relative_eq!(top.depth, 0.02, epsilon = 1e-4);

    let side = contacts.iter().find(|c| c.particle.0 == 8).unwrap();
    assert!(side.normal.abs_diff_eq(Vec3::Y, 1e-5));
    assert_relative_eq!(side.depth, 0.5, epsilon = 1e-5);
}
