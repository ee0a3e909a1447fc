/// Integration tests for formation geometry
///
/// These tests check the shape each formation gives a group: ring symmetry,
/// square outline, line split, rotation with the target, row ordering and
/// wedge arms.
use formations::{
    CircleFormation, DirectedLineFormation, Formation, FormationError, FormationKind,
    FormationParams, LineFormation, MultilineFormation, PositionSource, SquareFormation, Vec2,
    WedgeFormation,
};
use proptest::prelude::*;
use std::f64::consts::{PI, TAU};
use std::rc::Rc;

const EPS: f64 = 1e-9;

fn target_at(position: Vec2) -> Rc<dyn PositionSource> {
    Rc::new(position)
}

fn rotate(v: Vec2, angle: f64) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

#[test]
fn test_circle_slots_evenly_spaced() {
    let leader = Vec2::new(320.0, 240.0);
    for group_size in 2..=12 {
        let formation = CircleFormation::new(group_size).unwrap();
        let offsets: Vec<Vec2> = (0..group_size)
            .map(|i| formation.position_for(leader, i) - leader)
            .collect();

        for offset in &offsets {
            assert!((offset.length() - 100.0).abs() < EPS);
        }

        let step = TAU / group_size as f64;
        for pair in offsets.windows(2) {
            let between = pair[0].angle_to(pair[1]).abs();
            assert!((between - step).abs() < 1e-9 || (between - (TAU - step)).abs() < 1e-9);
        }

        let sum: Vec2 = offsets.iter().map(|o| o.normalize()).sum();
        assert!(sum.length() < 1e-9, "group {group_size}: sum {sum:?}");
    }
}

#[test]
fn test_square_corners_are_exact() {
    let formation = SquareFormation::new(8).unwrap();
    let corners = [
        (1, Vec2::new(100.0, -100.0)),
        (3, Vec2::new(-100.0, -100.0)),
        (5, Vec2::new(-100.0, 100.0)),
        (7, Vec2::new(100.0, 100.0)),
    ];
    for (unit_index, corner) in corners {
        assert_eq!(formation.position_for(Vec2::ZERO, unit_index), corner);
    }
}

#[test]
fn test_square_every_slot_on_outline() {
    for group_size in 1..=24 {
        let formation = SquareFormation::new(group_size).unwrap();
        for unit_index in 0..group_size {
            let leader = Vec2::new(50.0, 50.0);
            let offset = formation.position_for(leader, unit_index) - leader;
            let edge = offset.x.abs().max(offset.y.abs());
            assert!((edge - 100.0).abs() < 1e-9, "{group_size}/{unit_index}: {offset:?}");
        }
    }
}

#[test]
fn test_line_left_right_split() {
    let formation = LineFormation::new(10).unwrap();
    for unit_index in 0..10 {
        let offset = formation.position_for(Vec2::ZERO, unit_index);
        assert_eq!(offset.y, 0.0);
        if unit_index < 5 {
            assert!(offset.x > 0.0);
        } else {
            assert!(offset.x <= 0.0);
        }
        let multiple = offset.x / 60.0;
        assert!((multiple - multiple.round()).abs() < EPS);
    }
    assert_eq!(formation.position_for(Vec2::ZERO, 0).x, 60.0);
    assert_eq!(formation.position_for(Vec2::ZERO, 5).x, -60.0);
    assert_eq!(formation.position_for(Vec2::ZERO, 9).x, -300.0);
}

#[test]
fn test_multiline_rows() {
    let leader = Vec2::new(200.0, 200.0);
    let target = Vec2::new(200.0, 0.0);
    let formation = MultilineFormation::new(9, target_at(target), 3).unwrap();

    let direction = (target - leader).normalize();
    let lateral_axis = Vec2::new(direction.y, -direction.x);
    let depth = |i: usize| -(formation.position_for(leader, i) - leader).dot(direction);
    let lateral = |i: usize| (formation.position_for(leader, i) - leader).dot(lateral_axis);

    for row in 0..3 {
        let first = row * 3;
        // Same depth within a row, one unit space deeper per row
        for i in first..first + 3 {
            assert!((depth(i) - 60.0 * (row + 1) as f64).abs() < EPS);
        }
        assert!(lateral(first) < lateral(first + 1));
        assert!(lateral(first + 1) < lateral(first + 2));
    }
    assert!(depth(0) < depth(3) && depth(3) < depth(6));
}

#[test]
fn test_multiline_construction_limits() {
    let target = target_at(Vec2::new(1.0, 0.0));
    assert_eq!(
        MultilineFormation::new(9, target.clone(), 0).unwrap_err(),
        FormationError::UnitsPerLineTooSmall(0)
    );
    assert_eq!(
        MultilineFormation::new(9, target.clone(), 1).unwrap_err(),
        FormationError::UnitsPerLineTooSmall(1)
    );
    assert!(MultilineFormation::new(9, target, 2).is_ok());
}

#[test]
fn test_wedge_arms_diverge() {
    let leader = Vec2::new(100.0, 400.0);
    let target = Vec2::new(500.0, 100.0);
    let formation = WedgeFormation::new(10, target_at(target)).unwrap();

    let direction = (target - leader).normalize();
    let lateral_axis = Vec2::new(direction.y, -direction.x);
    let depth = |i: usize| -(formation.position_for(leader, i) - leader).dot(direction);
    let spread = |i: usize| (formation.position_for(leader, i) - leader).dot(lateral_axis).abs();

    for i in 0..8 {
        assert!(depth(i + 2) > depth(i));
        assert!(spread(i + 2) > spread(i));
    }
    // Pairs share a depth on opposite sides
    assert!((depth(0) - depth(1)).abs() < EPS);
    let side = |i: usize| (formation.position_for(leader, i) - leader).dot(lateral_axis);
    assert!(side(0) < 0.0 && side(1) > 0.0);
}

#[test]
fn test_degenerate_target_uses_default_direction() {
    let leader = Vec2::new(10.0, 10.0);
    let params = FormationParams::default();
    for kind in FormationKind::ALL {
        let formation = kind.build(&params, target_at(leader)).unwrap();
        for unit_index in 0..params.group_size {
            assert!(formation.position_for(leader, unit_index).is_finite());
        }
    }

    // Facing +x: the wedge trails to the left
    let wedge = WedgeFormation::new(2, target_at(leader)).unwrap();
    assert!(wedge.position_for(leader, 0).x < leader.x);
}

#[test]
fn test_repeated_calls_are_identical() {
    let params = FormationParams::default();
    let target = target_at(Vec2::new(600.0, 320.0));
    let leader = Vec2::new(300.0, 300.0);
    for kind in FormationKind::ALL {
        let formation = kind.build(&params, target.clone()).unwrap();
        for unit_index in 0..params.group_size {
            assert_eq!(
                formation.position_for(leader, unit_index),
                formation.position_for(leader, unit_index)
            );
        }
    }
}

proptest! {
    #[test]
    fn test_directed_line_rotates_with_target(
        angle in -PI..PI,
        distance in 1.0f64..500.0,
        group_size in 1usize..16,
        unit_index in 0usize..16,
    ) {
        let leader = Vec2::new(250.0, 250.0);
        let base = Vec2::new(distance, 0.0);

        let straight = DirectedLineFormation::new(group_size, target_at(leader + base)).unwrap();
        let turned = DirectedLineFormation::new(group_size, target_at(leader + rotate(base, angle))).unwrap();

        let before = straight.position_for(leader, unit_index) - leader;
        let after = turned.position_for(leader, unit_index) - leader;

        prop_assert!((rotate(before, angle) - after).length() < 1e-6);
        prop_assert!((before.length() - after.length()).abs() < 1e-6);
    }

    #[test]
    fn test_directed_kinds_rotate_with_target(
        angle in -PI..PI,
        unit_index in 0usize..16,
    ) {
        let leader = Vec2::new(-40.0, 75.0);
        let base = Vec2::new(120.0, 0.0);
        let params = FormationParams::default();

        for kind in [FormationKind::Multiline, FormationKind::Wedge] {
            let straight = kind.build(&params, target_at(leader + base)).unwrap();
            let turned = kind.build(&params, target_at(leader + rotate(base, angle))).unwrap();

            let before = straight.position_for(leader, unit_index) - leader;
            let after = turned.position_for(leader, unit_index) - leader;
            prop_assert!((rotate(before, angle) - after).length() < 1e-6);
        }
    }

    #[test]
    fn test_slots_move_with_leader(
        dx in -300.0f64..300.0,
        dy in -300.0f64..300.0,
        unit_index in 0usize..9,
    ) {
        // Undirected formations are pure translations of the leader
        let shift = Vec2::new(dx, dy);
        for formation in [
            Box::new(CircleFormation::new(9).unwrap()) as Box<dyn Formation>,
            Box::new(SquareFormation::new(9).unwrap()) as Box<dyn Formation>,
            Box::new(LineFormation::new(9).unwrap()) as Box<dyn Formation>,
        ] {
            let a = formation.position_for(Vec2::ZERO, unit_index);
            let b = formation.position_for(shift, unit_index);
            prop_assert!((b - a - shift).length() < 1e-9);
        }
    }
}
