use std::fmt;
use std::rc::Rc;

use thiserror::Error;

use crate::geometry::{PositionSource, Vec2, facing, normal};

/// Distance between neighbouring slots in line-based formations.
pub const DEFAULT_UNIT_SPACE: f64 = 60.0;
/// Row width used by [`MultilineFormation`] unless told otherwise.
pub const DEFAULT_UNITS_PER_LINE: usize = 3;
pub const CIRCLE_RADIUS: f64 = 100.0;
/// Side length of the square formation.
pub const SQUARE_SIZE: f64 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum FormationError {
    #[error("a formation needs at least one unit")]
    EmptyGroup,
    #[error("units per line must be at least 2, got {0}")]
    UnitsPerLineTooSmall(usize),
    #[error("unit space must be a positive finite distance, got {0}")]
    InvalidUnitSpace(f64),
}

/// A strategy mapping a follower index to its slot around the leader.
///
/// Implementations are immutable after construction. Directed formations
/// read their target's position on every call.
pub trait Formation: fmt::Debug {
    fn kind(&self) -> FormationKind;

    /// Absolute position the unit with `unit_index` should occupy when the
    /// leader stands at `leader_position`.
    fn position_for(&self, leader_position: Vec2, unit_index: usize) -> Vec2;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormationKind {
    Circle,
    Square,
    Line,
    DirectedLine,
    Multiline,
    Wedge,
}

impl FormationKind {
    pub const ALL: [FormationKind; 6] = [
        FormationKind::Circle,
        FormationKind::Square,
        FormationKind::Line,
        FormationKind::DirectedLine,
        FormationKind::Multiline,
        FormationKind::Wedge,
    ];

    pub fn get_name(&self) -> &'static str {
        match self {
            FormationKind::Circle => "Circle",
            FormationKind::Square => "Square",
            FormationKind::Line => "Line",
            FormationKind::DirectedLine => "Directed line",
            FormationKind::Multiline => "Multiline",
            FormationKind::Wedge => "Wedge",
        }
    }

    /// Whether the formation faces a target rather than a fixed axis.
    pub fn is_directed(&self) -> bool {
        matches!(
            self,
            FormationKind::DirectedLine | FormationKind::Multiline | FormationKind::Wedge
        )
    }

    /// Builds one shared instance of this formation for a whole group.
    pub fn build(
        self,
        params: &FormationParams,
        target: Rc<dyn PositionSource>,
    ) -> Result<Rc<dyn Formation>, FormationError> {
        if !matches!(self, FormationKind::Circle | FormationKind::Square) {
            check_unit_space(params.unit_space)?;
        }

        let formation: Rc<dyn Formation> = match self {
            FormationKind::Circle => Rc::new(CircleFormation::new(params.group_size)?),
            FormationKind::Square => Rc::new(SquareFormation::new(params.group_size)?),
            FormationKind::Line => Rc::new(
                LineFormation::new(params.group_size)?.with_unit_space(params.unit_space),
            ),
            FormationKind::DirectedLine => Rc::new(
                DirectedLineFormation::new(params.group_size, target)?
                    .with_unit_space(params.unit_space),
            ),
            FormationKind::Multiline => Rc::new(
                MultilineFormation::new(params.group_size, target, params.units_per_line)?
                    .with_unit_space(params.unit_space),
            ),
            FormationKind::Wedge => Rc::new(
                WedgeFormation::new(params.group_size, target)?.with_unit_space(params.unit_space),
            ),
        };
        Ok(formation)
    }
}

/// Parameters shared by every formation a group can be given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormationParams {
    pub group_size: usize,
    pub unit_space: f64,
    pub units_per_line: usize,
}

impl Default for FormationParams {
    fn default() -> Self {
        Self {
            group_size: 9,
            unit_space: DEFAULT_UNIT_SPACE,
            units_per_line: DEFAULT_UNITS_PER_LINE,
        }
    }
}

impl FormationParams {
    /// Checks the parameters against the same rules the constructors apply.
    pub fn validate(&self) -> Result<(), FormationError> {
        check_group_size(self.group_size)?;
        check_unit_space(self.unit_space)?;
        check_units_per_line(self.units_per_line)
    }
}

fn check_group_size(group_size: usize) -> Result<(), FormationError> {
    if group_size == 0 {
        return Err(FormationError::EmptyGroup);
    }
    Ok(())
}

fn check_unit_space(unit_space: f64) -> Result<(), FormationError> {
    if !unit_space.is_finite() || unit_space <= 0.0 {
        return Err(FormationError::InvalidUnitSpace(unit_space));
    }
    Ok(())
}

fn check_units_per_line(units_per_line: usize) -> Result<(), FormationError> {
    if units_per_line < 2 {
        return Err(FormationError::UnitsPerLineTooSmall(units_per_line));
    }
    Ok(())
}

fn tan_deg(degrees: f64) -> f64 {
    degrees.to_radians().tan()
}

/// Ring of evenly spaced units around the leader.
#[derive(Debug, Clone)]
pub struct CircleFormation {
    pub radius: f64,
    pub group_size: usize,
}

impl CircleFormation {
    pub fn new(group_size: usize) -> Result<Self, FormationError> {
        check_group_size(group_size)?;
        Ok(Self {
            radius: CIRCLE_RADIUS,
            group_size,
        })
    }
}

impl Formation for CircleFormation {
    fn kind(&self) -> FormationKind {
        FormationKind::Circle
    }

    fn position_for(&self, leader_position: Vec2, unit_index: usize) -> Vec2 {
        let angle = std::f64::consts::TAU * unit_index as f64 / self.group_size as f64;
        leader_position + Vec2::new(self.radius * angle.cos(), -self.radius * angle.sin())
    }
}

/// Units spread over the outline of an axis-aligned square.
#[derive(Debug, Clone)]
pub struct SquareFormation {
    /// Length of one side
    pub size: f64,
    pub group_size: usize,
}

impl SquareFormation {
    pub fn new(group_size: usize) -> Result<Self, FormationError> {
        check_group_size(group_size)?;
        Ok(Self {
            size: SQUARE_SIZE,
            group_size,
        })
    }

    /// Projects an angle in degrees onto the square outline.
    ///
    /// Top and bottom sides measure the angle from the vertical axis, since
    /// `tan` runs off to infinity near 90 and 270 degrees.
    fn offset_for_angle(&self, angle: f64) -> Vec2 {
        let half = self.size / 2.0;

        // right side
        if !(45.0..=315.0).contains(&angle) {
            Vec2::new(half, -half * tan_deg(angle))
        } else if angle == 45.0 {
            Vec2::new(half, -half)
        // top side
        } else if angle <= 90.0 {
            Vec2::new(half * tan_deg(90.0 - angle), -half)
        } else if angle < 135.0 {
            Vec2::new(-half * tan_deg(angle - 90.0), -half)
        } else if angle == 135.0 {
            Vec2::new(-half, -half)
        // left side
        } else if angle < 225.0 {
            Vec2::new(-half, half * tan_deg(angle))
        } else if angle == 225.0 {
            Vec2::new(-half, half)
        // bottom side
        } else if angle <= 270.0 {
            Vec2::new(-half * tan_deg(270.0 - angle), half)
        } else if angle < 315.0 {
            Vec2::new(half * tan_deg(angle - 270.0), half)
        } else {
            Vec2::new(half, half)
        }
    }
}

impl Formation for SquareFormation {
    fn kind(&self) -> FormationKind {
        FormationKind::Square
    }

    fn position_for(&self, leader_position: Vec2, unit_index: usize) -> Vec2 {
        let angle = (unit_index as f64 * 360.0 / self.group_size as f64) % 360.0;
        leader_position + self.offset_for_angle(angle)
    }
}

/// Horizontal line through the leader: the first half of the group to the
/// right, the rest to the left.
#[derive(Debug, Clone)]
pub struct LineFormation {
    pub unit_space: f64,
    pub group_size: usize,
    /// Split point between the two sides; not rounded, so odd and even
    /// group sizes split differently.
    pub middle_pos: f64,
}

impl LineFormation {
    pub fn new(group_size: usize) -> Result<Self, FormationError> {
        check_group_size(group_size)?;
        Ok(Self {
            unit_space: DEFAULT_UNIT_SPACE,
            group_size,
            middle_pos: group_size as f64 / 2.0,
        })
    }

    pub fn with_unit_space(mut self, unit_space: f64) -> Self {
        self.unit_space = unit_space;
        self
    }

    /// Signed distance from the leader in unit spaces. Positive is the
    /// right side.
    pub fn slot_factor(&self, unit_index: usize) -> f64 {
        let index = unit_index as f64;
        if index < self.middle_pos {
            1.0 + index
        } else {
            -(1.0 + index - self.middle_pos)
        }
    }
}

impl Formation for LineFormation {
    fn kind(&self) -> FormationKind {
        FormationKind::Line
    }

    fn position_for(&self, leader_position: Vec2, unit_index: usize) -> Vec2 {
        leader_position + Vec2::new(self.unit_space * self.slot_factor(unit_index), 0.0)
    }
}

/// Line through the leader, laid across the leader-to-target axis.
#[derive(Clone)]
pub struct DirectedLineFormation {
    pub line: LineFormation,
    pub target: Rc<dyn PositionSource>,
}

impl DirectedLineFormation {
    pub fn new(group_size: usize, target: Rc<dyn PositionSource>) -> Result<Self, FormationError> {
        Ok(Self {
            line: LineFormation::new(group_size)?,
            target,
        })
    }

    pub fn with_unit_space(mut self, unit_space: f64) -> Self {
        self.line = self.line.with_unit_space(unit_space);
        self
    }
}

impl fmt::Debug for DirectedLineFormation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectedLineFormation")
            .field("line", &self.line)
            .field("target", &self.target.position())
            .finish()
    }
}

impl Formation for DirectedLineFormation {
    fn kind(&self) -> FormationKind {
        FormationKind::DirectedLine
    }

    fn position_for(&self, leader_position: Vec2, unit_index: usize) -> Vec2 {
        let direction = facing(leader_position, self.target.position());
        let formation_normal = normal(direction) * self.line.unit_space;
        leader_position + formation_normal * self.line.slot_factor(unit_index)
    }
}

/// Rows of `units_per_line` units stacked behind the leader, facing the
/// target.
#[derive(Clone)]
pub struct MultilineFormation {
    pub unit_space: f64,
    pub group_size: usize,
    pub target: Rc<dyn PositionSource>,
    pub units_per_line: usize,
    pub middle_pos: usize,
}

impl MultilineFormation {
    pub fn new(
        group_size: usize,
        target: Rc<dyn PositionSource>,
        units_per_line: usize,
    ) -> Result<Self, FormationError> {
        check_group_size(group_size)?;
        check_units_per_line(units_per_line)?;
        Ok(Self {
            unit_space: DEFAULT_UNIT_SPACE,
            group_size,
            target,
            units_per_line,
            middle_pos: units_per_line / 2,
        })
    }

    pub fn with_unit_space(mut self, unit_space: f64) -> Self {
        self.unit_space = unit_space;
        self
    }

    /// Row index (0 is the row closest to the leader) and position within
    /// the row (0 is leftmost).
    pub fn line_and_position(&self, unit_index: usize) -> (usize, usize) {
        (
            unit_index / self.units_per_line,
            unit_index % self.units_per_line,
        )
    }
}

impl fmt::Debug for MultilineFormation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultilineFormation")
            .field("unit_space", &self.unit_space)
            .field("group_size", &self.group_size)
            .field("target", &self.target.position())
            .field("units_per_line", &self.units_per_line)
            .finish()
    }
}

impl Formation for MultilineFormation {
    fn kind(&self) -> FormationKind {
        FormationKind::Multiline
    }

    fn position_for(&self, leader_position: Vec2, unit_index: usize) -> Vec2 {
        // P = leader + N * (p_i - middle) - L * (1 + l_i)
        let direction = facing(leader_position, self.target.position());
        let formation_normal = normal(direction) * self.unit_space;
        let line_vector = direction * self.unit_space;

        let (line_index, position_in_line) = self.line_and_position(unit_index);
        let lateral = position_in_line as f64 - self.middle_pos as f64;

        leader_position + formation_normal * lateral - line_vector * (1 + line_index) as f64
    }
}

/// V shape trailing the leader, arms alternating left and right.
#[derive(Clone)]
pub struct WedgeFormation {
    pub unit_space: f64,
    pub group_size: usize,
    pub target: Rc<dyn PositionSource>,
}

impl WedgeFormation {
    pub fn new(group_size: usize, target: Rc<dyn PositionSource>) -> Result<Self, FormationError> {
        check_group_size(group_size)?;
        Ok(Self {
            unit_space: DEFAULT_UNIT_SPACE,
            group_size,
            target,
        })
    }

    pub fn with_unit_space(mut self, unit_space: f64) -> Self {
        self.unit_space = unit_space;
        self
    }
}

impl fmt::Debug for WedgeFormation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WedgeFormation")
            .field("unit_space", &self.unit_space)
            .field("group_size", &self.group_size)
            .field("target", &self.target.position())
            .finish()
    }
}

impl Formation for WedgeFormation {
    fn kind(&self) -> FormationKind {
        FormationKind::Wedge
    }

    fn position_for(&self, leader_position: Vec2, unit_index: usize) -> Vec2 {
        let direction = facing(leader_position, self.target.position());
        let formation_normal = normal(direction) * self.unit_space;
        let line_vector = direction * self.unit_space;

        let line_index = (unit_index / 2 + 1) as f64;
        let side = if unit_index % 2 == 0 { -1.0 } else { 1.0 };

        leader_position - line_vector * line_index + formation_normal * (side * line_index)
    }
}
