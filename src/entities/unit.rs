use std::rc::Rc;

use crate::geometry::{PositionSource, SharedPosition, Vec2, move_toward, shared_position};

pub const UNIT_SPEED: f64 = 100.0;
pub const LEADER_SPEED: f64 = UNIT_SPEED + 20.0;
/// A move order counts as done once the unit is this close.
pub const ARRIVAL_DISTANCE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Idle,
    Move,
}

/// A unit on the yard: leader, enemy, or the body of a lancer.
///
/// The position is shared so formations and followers can read it live.
pub struct Unit {
    position: SharedPosition,
    pub state: MotionState,
    /// Sprite faces left when set
    pub flip_x: bool,
    pub speed: f64,
    /// Pending move order
    pub target_pos: Option<Vec2>,
    /// Unit to look at while not travelling
    pub face_towards: Option<Rc<dyn PositionSource>>,
}

impl std::fmt::Debug for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unit")
            .field("position", &self.position())
            .field("state", &self.state)
            .field("flip_x", &self.flip_x)
            .field("speed", &self.speed)
            .field("target_pos", &self.target_pos)
            .finish()
    }
}

impl Unit {
    pub fn new(position: Vec2, speed: f64) -> Self {
        Self {
            position: shared_position(position),
            state: MotionState::Idle,
            flip_x: false,
            speed,
            target_pos: None,
            face_towards: None,
        }
    }

    pub fn with_flip(mut self, flip_x: bool) -> Self {
        self.flip_x = flip_x;
        self
    }

    pub fn position(&self) -> Vec2 {
        self.position.get()
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position.set(position);
    }

    /// Live handle to this unit's position.
    pub fn handle(&self) -> Rc<dyn PositionSource> {
        self.position.clone()
    }

    pub fn is_idle(&self) -> bool {
        self.state == MotionState::Idle
    }

    pub fn enter_state(&mut self, state: MotionState) {
        self.state = state;
    }

    /// Orders the unit to walk to `position`; [`Unit::update`] carries it out.
    pub fn order_move(&mut self, position: Vec2) {
        self.target_pos = Some(position);
    }

    /// Takes one step toward `position` and reports whether the unit has
    /// arrived.
    pub fn move_unit_to(&mut self, position: Vec2, speed: f64, dt: f64) -> bool {
        if self.is_idle() {
            self.enter_state(MotionState::Move);
        }

        let current = move_toward(self.position(), position, speed * dt);
        self.set_position(current);

        self.flip_x = position.x <= current.x;

        position.distance(current) < ARRIVAL_DISTANCE
    }

    /// Advances the pending move order, or turns toward the watched unit
    /// when standing still.
    pub fn update(&mut self, dt: f64) {
        if let Some(target_pos) = self.target_pos {
            if self.move_unit_to(target_pos, self.speed, dt) {
                self.target_pos = None;
                self.enter_state(MotionState::Idle);
            }
        }

        if self.is_idle() {
            self.face_target();
        }
    }

    /// Flips the sprite so it looks at `face_towards`, if set.
    pub fn face_target(&mut self) {
        if let Some(target) = &self.face_towards {
            self.flip_x = target.position().x <= self.position().x;
        }
    }
}
