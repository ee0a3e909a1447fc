mod formation;
mod game_state;
mod lancer;
mod unit;

// Re-export all public types
pub use formation::{
    CIRCLE_RADIUS, CircleFormation, DEFAULT_UNIT_SPACE, DEFAULT_UNITS_PER_LINE,
    DirectedLineFormation, Formation, FormationError, FormationKind, FormationParams,
    LineFormation, MultilineFormation, SQUARE_SIZE, SquareFormation, WedgeFormation,
};
pub use game_state::GameState;
pub use lancer::{FollowTuning, JITTER_THRESHOLD, Lancer, REACHED_THRESHOLD};
pub use unit::{ARRIVAL_DISTANCE, LEADER_SPEED, MotionState, UNIT_SPEED, Unit};
