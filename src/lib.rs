// Library exports for testing
pub use entities::{
    CircleFormation, DirectedLineFormation, Formation, FormationError, FormationKind,
    FormationParams, Lancer, LineFormation, MotionState, MultilineFormation, SquareFormation,
    Unit, WedgeFormation,
};
pub use geometry::{PositionSource, Vec2};

pub mod app;
pub mod config;
pub mod entities;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod renderer;
pub mod scene;
