/// Integration tests for followers and the scene
///
/// These tests run the per-frame update loop and check that lancers settle
/// into their slots, ignore small leader jiggles and stop when released.
use formations::config::{LEADER_START, Settings};
use formations::scene::{Scene, Steering};
use formations::{FormationKind, MotionState, Vec2};

const DT: f64 = 0.05;

fn scene() -> Scene {
    let positions = vec![
        Vec2::new(20.0, 20.0),
        Vec2::new(600.0, 40.0),
        Vec2::new(40.0, 600.0),
        Vec2::new(610.0, 610.0),
        Vec2::new(320.0, 20.0),
        Vec2::new(20.0, 320.0),
        Vec2::new(500.0, 500.0),
        Vec2::new(150.0, 450.0),
        Vec2::new(450.0, 150.0),
    ];
    Scene::with_positions(Settings::default(), positions)
}

fn run(scene: &mut Scene, frames: usize) {
    for _ in 0..frames {
        scene.update(DT, Steering::default());
    }
}

fn assert_settled(scene: &Scene) {
    let reached = scene.settings().tuning.reached_threshold;
    for lancer in &scene.lancers {
        let slot = lancer.slot().expect("lancer has a slot");
        assert!(
            lancer.unit.position().distance(slot) <= reached,
            "lancer {} at {:?}, slot {:?}",
            lancer.unit_id,
            lancer.unit.position(),
            slot
        );
        assert_eq!(lancer.unit.state, MotionState::Idle);
    }
}

#[test]
fn test_every_formation_settles() {
    for kind in FormationKind::ALL {
        let mut scene = scene();
        scene.assign_formation(kind).unwrap();
        run(&mut scene, 400);
        assert_settled(&scene);
        assert_eq!(scene.moving_lancers(), 0, "{kind:?}");
    }
}

#[test]
fn test_circle_surrounds_leader() {
    let mut scene = scene();
    scene.assign_formation(FormationKind::Circle).unwrap();
    run(&mut scene, 400);

    for lancer in &scene.lancers {
        let distance = lancer.unit.position().distance(LEADER_START);
        assert!((distance - 100.0).abs() <= 5.0, "distance {distance}");
    }
}

#[test]
fn test_small_leader_moves_do_not_disturb_formation() {
    let mut scene = scene();
    scene.assign_formation(FormationKind::Square).unwrap();
    run(&mut scene, 400);
    let settled: Vec<Vec2> = scene.lancers.iter().map(|l| l.unit.position()).collect();

    scene.leader.set_position(LEADER_START + Vec2::new(20.0, -10.0));
    run(&mut scene, 10);

    let after: Vec<Vec2> = scene.lancers.iter().map(|l| l.unit.position()).collect();
    assert_eq!(settled, after);
    assert_eq!(scene.moving_lancers(), 0);
}

#[test]
fn test_formation_follows_leader_move_order() {
    let mut scene = scene();
    scene.assign_formation(FormationKind::Wedge).unwrap();
    run(&mut scene, 400);

    let destination = Vec2::new(150.0, 450.0);
    scene.toggle_leader_selection();
    scene.click(destination);
    run(&mut scene, 600);

    assert!(scene.leader.is_idle());
    assert!(scene.leader.position().distance(destination) < 10.0);
    for lancer in &scene.lancers {
        let anchor = lancer.anchor().unwrap();
        assert!(anchor.distance(scene.leader.position()) <= 30.0);
    }
    assert_settled(&scene);
}

#[test]
fn test_cancel_stops_lancers_mid_walk() {
    let mut scene = scene();
    scene.assign_formation(FormationKind::Line).unwrap();
    run(&mut scene, 3);
    assert!(scene.moving_lancers() > 0);

    scene.cancel_formation();
    let stopped: Vec<Vec2> = scene.lancers.iter().map(|l| l.unit.position()).collect();
    run(&mut scene, 20);

    let after: Vec<Vec2> = scene.lancers.iter().map(|l| l.unit.position()).collect();
    assert_eq!(stopped, after);
    assert_eq!(scene.moving_lancers(), 0);
}

#[test]
fn test_idle_lancers_face_enemy() {
    let mut scene = scene();
    scene.assign_formation(FormationKind::Multiline).unwrap();
    run(&mut scene, 400);

    let enemy_x = scene.enemy.position().x;
    for lancer in &scene.lancers {
        assert_eq!(lancer.unit.flip_x, enemy_x <= lancer.unit.position().x);
    }
}

#[test]
fn test_switching_formations_reassigns_everyone() {
    let mut scene = scene();
    scene.assign_formation(FormationKind::Circle).unwrap();
    run(&mut scene, 400);
    scene.assign_formation(FormationKind::DirectedLine).unwrap();

    for lancer in &scene.lancers {
        let formation = lancer.formation().unwrap();
        assert_eq!(formation.kind(), FormationKind::DirectedLine);
    }
    run(&mut scene, 400);
    assert_settled(&scene);
}
