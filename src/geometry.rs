//! Vector helpers shared by formations and unit movement.
//!
//! World space is y-down, matching the terminal and most 2D engines.

use glam::DVec2;
use std::cell::Cell;
use std::rc::Rc;

pub type Vec2 = DVec2;

/// Anything with a position that can be read on demand.
///
/// Directed formations hold one of these instead of a copied vector so the
/// facing follows the target as it moves.
pub trait PositionSource {
    fn position(&self) -> Vec2;
}

impl PositionSource for Cell<Vec2> {
    fn position(&self) -> Vec2 {
        self.get()
    }
}

impl PositionSource for Vec2 {
    fn position(&self) -> Vec2 {
        *self
    }
}

/// Position owned by one unit and read by others.
pub type SharedPosition = Rc<Cell<Vec2>>;

pub fn shared_position(position: Vec2) -> SharedPosition {
    Rc::new(Cell::new(position))
}

/// Unit vector from `from` to `to`, or +x when the points coincide.
pub fn facing(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).try_normalize().unwrap_or(Vec2::X)
}

/// Right-hand normal in y-down space: `(x, y) -> (y, -x)`.
pub fn normal(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// Step from `current` toward `target` by at most `max_step`, never
/// overshooting.
pub fn move_toward(current: Vec2, target: Vec2, max_step: f64) -> Vec2 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_step || distance == 0.0 {
        target
    } else {
        current + delta * (max_step / distance)
    }
}
