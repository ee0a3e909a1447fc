//! The yard: a leader, the enemy it faces, and the lancers following it.

use log::{debug, info};
use rand::Rng;

use crate::config::{
    ENEMY_START, LEADER_PICK_RADIUS, LEADER_START, Settings, YARD_HEIGHT, YARD_WIDTH,
};
use crate::entities::{FormationError, FormationKind, LEADER_SPEED, Lancer, MotionState, Unit};
use crate::geometry::Vec2;

/// Directions held down this frame, one per controllable unit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Steering {
    pub leader: Vec2,
    pub enemy: Vec2,
}

pub struct Scene {
    pub leader: Unit,
    pub enemy: Unit,
    pub lancers: Vec<Lancer>,
    leader_selected: bool,
    active_formation: Option<FormationKind>,
    settings: Settings,
    /// Last message worth showing in the HUD
    pub status: String,
}

impl Scene {
    pub fn new(settings: Settings) -> Self {
        Self::with_rng(settings, &mut rand::rng())
    }

    /// Builds the scene, scattering lancers across the yard with `rng`.
    pub fn with_rng<R: Rng>(settings: Settings, rng: &mut R) -> Self {
        let group_size = settings.formation.group_size;
        let positions = (0..group_size)
            .map(|_| {
                Vec2::new(
                    rng.random_range(0.0..YARD_WIDTH),
                    rng.random_range(0.0..YARD_HEIGHT),
                )
            })
            .collect();
        Self::with_positions(settings, positions)
    }

    /// Builds the scene with one lancer per entry of `positions`.
    pub fn with_positions(settings: Settings, positions: Vec<Vec2>) -> Self {
        let mut leader = Unit::new(LEADER_START, LEADER_SPEED);
        let mut enemy = Unit::new(ENEMY_START, LEADER_SPEED).with_flip(true);

        // Leaders face each other
        leader.face_towards = Some(enemy.handle());
        enemy.face_towards = Some(leader.handle());

        let lancers = positions
            .into_iter()
            .enumerate()
            .map(|(unit_id, position)| {
                let mut lancer = Lancer::new(position, unit_id).with_tuning(settings.tuning);
                lancer.unit.face_towards = Some(enemy.handle());
                lancer
            })
            .collect::<Vec<_>>();

        info!(
            "Scene ready with {} lancers, leader at {:?}",
            lancers.len(),
            leader.position()
        );

        Self {
            leader,
            enemy,
            lancers,
            leader_selected: false,
            active_formation: None,
            settings,
            status: String::from("Select a formation"),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn active_formation(&self) -> Option<FormationKind> {
        self.active_formation
    }

    pub fn leader_selected(&self) -> bool {
        self.leader_selected
    }

    /// Builds one formation of `kind` facing the enemy and hands it to
    /// every lancer.
    pub fn assign_formation(&mut self, kind: FormationKind) -> Result<(), FormationError> {
        let formation = kind.build(&self.settings.formation, self.enemy.handle())?;
        for lancer in &mut self.lancers {
            lancer.set_formation(formation.clone());
        }
        self.active_formation = Some(kind);
        self.status = format!("{} formation", kind.get_name());
        info!("Assigned {:?} formation to {} lancers", kind, self.lancers.len());
        Ok(())
    }

    /// Releases every lancer from its formation.
    pub fn cancel_formation(&mut self) {
        for lancer in &mut self.lancers {
            lancer.clear_formation();
        }
        self.active_formation = None;
        self.status = String::from("Formation cancelled");
        info!("Formation cancelled");
    }

    pub fn toggle_leader_selection(&mut self) {
        self.leader_selected = !self.leader_selected;
        debug!("Leader selected: {}", self.leader_selected);
    }

    /// Handles a click at `position` in world space.
    ///
    /// Clicking the leader toggles its selection. Clicking elsewhere in the
    /// yard while it is selected sends it there.
    pub fn click(&mut self, position: Vec2) {
        if position.distance(self.leader.position()) <= LEADER_PICK_RADIUS {
            self.toggle_leader_selection();
        } else if self.leader_selected && in_yard(position) {
            debug!("Leader ordered to {:?}", position);
            self.leader.order_move(position);
            self.leader_selected = false;
        }
    }

    /// Advances the whole scene by `dt` seconds.
    pub fn update(&mut self, dt: f64, steering: Steering) {
        steer(&mut self.leader, steering.leader, dt);
        steer(&mut self.enemy, steering.enemy, dt);

        self.leader.update(dt);
        self.enemy.update(dt);

        let leader_position = self.leader.position();
        for lancer in &mut self.lancers {
            lancer.update(leader_position, dt);
        }
    }

    /// Lancers currently walking toward their slot.
    pub fn moving_lancers(&self) -> usize {
        self.lancers.iter().filter(|l| !l.unit.is_idle()).count()
    }
}

fn in_yard(position: Vec2) -> bool {
    (0.0..=YARD_WIDTH).contains(&position.x) && (0.0..=YARD_HEIGHT).contains(&position.y)
}

fn clamp_to_yard(position: Vec2) -> Vec2 {
    position.clamp(Vec2::ZERO, Vec2::new(YARD_WIDTH, YARD_HEIGHT))
}

/// Moves `unit` directly along `direction`, overriding any move order.
fn steer(unit: &mut Unit, direction: Vec2, dt: f64) {
    let Some(direction) = direction.try_normalize() else {
        // Let go of the keys: stop unless a move order is running
        if unit.target_pos.is_none() && !unit.is_idle() {
            unit.enter_state(MotionState::Idle);
        }
        return;
    };

    unit.target_pos = None;
    let step = direction * unit.speed * dt;
    let destination = clamp_to_yard(unit.position() + step);
    let speed = unit.speed;
    unit.move_unit_to(destination, speed, dt);
}
