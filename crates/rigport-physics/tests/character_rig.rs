//! End-to-end: object dump -> armature -> rig description -> Rapier

use rigport_asset::AssetEnvironment;
use rigport_core::{ImportSettings, PathHash, PhysicsSettings, RigportError};
use rigport_import::{search_animations, search_environment, skinned_mesh, vertex_groups};
use rigport_physics::{
    emit_armature, emit_physics, PhysicsWorld, RapierRig, RigScene, SceneSink,
};

fn load() -> AssetEnvironment {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/character.json");
    AssetEnvironment::load(path).unwrap()
}

#[test]
fn test_search_environment() {
    let env = load();
    let scene = search_environment(&env, &ImportSettings::default());

    assert_eq!(scene.armatures.len(), 1);
    assert_eq!(scene.armatures[0].name, "chr");
    assert_eq!(scene.static_meshes.len(), 1);
    assert_eq!(scene.static_meshes[0].name, "Stage");
    assert_eq!(scene.static_meshes[0].mesh.as_deref(), Some("stage_floor"));

    assert_eq!(scene.failures.len(), 1);
    assert_eq!(scene.failures[0].root, "Broken");
    assert!(matches!(
        &scene.failures[0].error,
        RigportError::UnresolvedPivot { bone, path_id: 65 } if bone == "Tail"
    ));

    let clips: Vec<String> = search_animations(&env).into_iter().map(|c| c.name).collect();
    assert_eq!(clips, vec!["idle"]);
}

#[test]
fn test_hash_identity_and_skin() {
    let env = load();
    let scene = search_environment(&env, &ImportSettings::default());
    let armature = scene.armature("chr").unwrap();

    let head = armature
        .by_hash(PathHash::of("chr/Position/Hips/Head"))
        .unwrap();
    assert_eq!(head.name, "Head");
    assert!(armature.warnings().is_empty());

    let mesh = skinned_mesh(&env, armature).unwrap().unwrap();
    assert_eq!(mesh.name, "chr_body");
    let groups = vertex_groups(armature, &mesh.bone_name_hashes).unwrap();
    assert_eq!(groups, vec!["Position", "Hips", "Head"]);

    let hair = armature.by_name("HairA").unwrap();
    assert_eq!(
        hair.physics.as_ref().and_then(|p| p.pivot.as_deref()),
        Some("Head")
    );
}

#[test]
fn test_emit_and_simulate() {
    let env = load();
    let mut scene = search_environment(&env, &ImportSettings::default());
    let mut armature = scene.take_armature("chr").unwrap();

    let import = ImportSettings::default();
    let settings = PhysicsSettings::default();
    let mut rig = RigScene::new();
    let bones = emit_armature(&mut armature, &import, &settings, &mut rig);
    assert_eq!(bones, 6);

    let report = emit_physics(&mut armature, &import, &settings, &mut rig);
    assert_eq!(report.colliders, 2);
    assert_eq!(report.pivots, 1);
    assert_eq!(report.targets, 2);
    assert_eq!(report.springs, 2);
    assert_eq!(report.no_collision_links, 1);
    assert!(rig.has_body("Head_rigidbody"));
    assert!(rig.has_body("ArmL_rigidbody"));
    assert!(rig.has_body("chr_Head_pivot_rigidbody"));

    // Head sits at engine (0, 1.5, 0) under Position, host (0, 0, 1.5)
    let pivot = rig.body("chr_Head_pivot_rigidbody").unwrap();
    assert!((pivot.position[2] - 1.5).abs() < 1e-5, "{:?}", pivot.position);

    let text = rig.to_toml().unwrap();
    let reparsed = RigScene::from_toml_str(&text).unwrap();
    assert_eq!(reparsed.bodies.len(), rig.bodies.len());
    assert_eq!(reparsed.springs, rig.springs);

    let mut world = PhysicsWorld::new();
    let rapier = RapierRig::instantiate(&reparsed, &mut world).unwrap();
    world.advance(1.0 / 60.0, 30);
    let poses = rapier.bone_poses(&world);
    assert_eq!(poses.len(), 2);
    for pose in &poses {
        assert!(pose.position.iter().all(|v| v.is_finite()));
        // Hair stays within reach of its pivot
        let dz = pose.position[2] - 1.5;
        assert!(dz.abs() < 0.5, "{} at {:?}", pose.bone, pose.position);
    }
}
