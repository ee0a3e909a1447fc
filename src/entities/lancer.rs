use std::rc::Rc;

use super::formation::Formation;
use super::unit::{MotionState, UNIT_SPEED, Unit};
use crate::geometry::Vec2;

/// Leader movement smaller than this leaves the formation anchor in place.
pub const JITTER_THRESHOLD: f64 = 30.0;
/// Followers closer than this to their slot stand still.
pub const REACHED_THRESHOLD: f64 = 5.0;

/// Thresholds controlling how eagerly followers chase their slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowTuning {
    pub jitter_threshold: f64,
    pub reached_threshold: f64,
}

impl Default for FollowTuning {
    fn default() -> Self {
        Self {
            jitter_threshold: JITTER_THRESHOLD,
            reached_threshold: REACHED_THRESHOLD,
        }
    }
}

/// A follower that keeps its slot in the formation around the leader.
#[derive(Debug)]
pub struct Lancer {
    pub unit: Unit,
    /// Sequential id, starting from 0
    pub unit_id: usize,
    formation: Option<Rc<dyn Formation>>,
    /// Anchor for slot calculation, lags behind the leader
    old_leader_position: Option<Vec2>,
    pub tuning: FollowTuning,
}

impl Lancer {
    pub fn new(position: Vec2, unit_id: usize) -> Self {
        Self {
            unit: Unit::new(position, UNIT_SPEED),
            unit_id,
            formation: None,
            old_leader_position: None,
            tuning: FollowTuning::default(),
        }
    }

    pub fn with_tuning(mut self, tuning: FollowTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn formation(&self) -> Option<&Rc<dyn Formation>> {
        self.formation.as_ref()
    }

    pub fn set_formation(&mut self, formation: Rc<dyn Formation>) {
        self.formation = Some(formation);
    }

    /// Drops the formation and stops on the spot.
    pub fn clear_formation(&mut self) {
        self.formation = None;
        self.unit.target_pos = None;
        self.unit.enter_state(MotionState::Idle);
    }

    pub fn anchor(&self) -> Option<Vec2> {
        self.old_leader_position
    }

    /// Slot this lancer is heading for, if it has a formation.
    pub fn slot(&self) -> Option<Vec2> {
        let formation = self.formation.as_ref()?;
        let anchor = self.old_leader_position?;
        Some(formation.position_for(anchor, self.unit_id))
    }

    /// One frame of following. `leader_position` is read fresh every frame.
    pub fn update(&mut self, leader_position: Vec2, dt: f64) {
        let anchor_is_stale = match self.old_leader_position {
            Some(old) => old.distance(leader_position) > self.tuning.jitter_threshold,
            None => true,
        };
        if anchor_is_stale {
            self.old_leader_position = Some(leader_position);
        }

        match self.slot() {
            Some(slot) if slot.distance(self.unit.position()) > self.tuning.reached_threshold => {
                let speed = self.unit.speed;
                let reached = self.unit.move_unit_to(slot, speed, dt);
                if reached && !self.unit.is_idle() {
                    self.unit.enter_state(MotionState::Idle);
                }
            }
            Some(_) => {
                if !self.unit.is_idle() {
                    self.unit.enter_state(MotionState::Idle);
                }
            }
            None => {}
        }

        if self.unit.is_idle() {
            self.unit.face_target();
        }
    }
}
