//! Command line options and the validated settings derived from them.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::entities::{
    DEFAULT_UNIT_SPACE, DEFAULT_UNITS_PER_LINE, FollowTuning, FormationError, FormationParams,
    JITTER_THRESHOLD, REACHED_THRESHOLD,
};
use crate::geometry::Vec2;

/// Playable yard, in world units
pub const YARD_WIDTH: f64 = 640.0;
pub const YARD_HEIGHT: f64 = 640.0;

pub const LEADER_START: Vec2 = Vec2::new(300.0, 300.0);
pub const ENEMY_START: Vec2 = Vec2::new(YARD_WIDTH - 10.0, YARD_HEIGHT / 2.0);

/// Clicks this close to the leader select it.
pub const LEADER_PICK_RADIUS: f64 = 48.0;

pub const DEFAULT_GROUP_SIZE: usize = 9;

/// Arrange a squad of lancers into formations around their leader
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Number of lancers following the leader
    #[arg(long, default_value_t = DEFAULT_GROUP_SIZE)]
    pub group_size: usize,

    /// Distance between neighbouring slots in line formations
    #[arg(long, default_value_t = DEFAULT_UNIT_SPACE)]
    pub unit_space: f64,

    /// Lancers per row in the multiline formation (at least 2)
    #[arg(long, default_value_t = DEFAULT_UNITS_PER_LINE)]
    pub units_per_line: usize,

    /// Leader movement ignored before followers re-anchor
    #[arg(long, default_value_t = JITTER_THRESHOLD)]
    pub jitter_threshold: f64,

    /// Distance at which a lancer counts as being in its slot
    #[arg(long, default_value_t = REACHED_THRESHOLD)]
    pub reached_threshold: f64,

    /// Sleep between frames, in milliseconds
    #[arg(long, default_value_t = 8)]
    pub frame_ms: u64,

    /// File receiving log output
    #[arg(long, default_value = "formations.log")]
    pub log_file: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Draw each lancer's id
    #[arg(long)]
    pub debug_ids: bool,
}

impl Cli {
    pub fn settings(&self) -> Result<Settings, FormationError> {
        let formation = FormationParams {
            group_size: self.group_size,
            unit_space: self.unit_space,
            units_per_line: self.units_per_line,
        };
        formation.validate()?;

        Ok(Settings {
            formation,
            tuning: FollowTuning {
                jitter_threshold: self.jitter_threshold,
                reached_threshold: self.reached_threshold,
            },
            frame_time: Duration::from_millis(self.frame_ms),
            show_ids: self.debug_ids,
        })
    }
}

/// Everything the scene and the main loop need to know up front.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub formation: FormationParams,
    pub tuning: FollowTuning,
    pub frame_time: Duration,
    pub show_ids: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            formation: FormationParams::default(),
            tuning: FollowTuning::default(),
            frame_time: Duration::from_millis(8),
            show_ids: false,
        }
    }
}
