use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::config::{YARD_HEIGHT, YARD_WIDTH};
use crate::entities::{FormationKind, GameState, Unit};
use crate::geometry::Vec2;
use crate::scene::Scene;

/// Width of the formation menu on the right
pub const PANEL_WIDTH: u16 = 28;

/// Screen regions, computed the same way for drawing and for mouse hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub yard: Rect,
    pub panel: Rect,
    pub footer: Rect,
}

impl ScreenLayout {
    pub fn new(area: Rect) -> Self {
        let body_height = area.height.saturating_sub(2);
        let panel_width = PANEL_WIDTH.min(area.width);
        let yard_width = area.width - panel_width;

        Self {
            header: Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.min(1),
            },
            yard: Rect {
                x: area.x,
                y: area.y + 1,
                width: yard_width,
                height: body_height,
            },
            panel: Rect {
                x: area.x + yard_width,
                y: area.y + 1,
                width: panel_width,
                height: body_height,
            },
            footer: Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(1),
                width: area.width,
                height: area.height.min(1),
            },
        }
    }
}

/// Maps world coordinates onto the cells inside the yard border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub cells: Rect,
}

impl Viewport {
    pub fn new(area: Rect) -> Self {
        let yard = ScreenLayout::new(area).yard;
        Self {
            cells: Block::default().borders(Borders::ALL).inner(yard),
        }
    }

    fn scale(&self) -> Option<(f64, f64)> {
        if self.cells.width < 2 || self.cells.height < 2 {
            return None;
        }
        Some((
            f64::from(self.cells.width - 1) / YARD_WIDTH,
            f64::from(self.cells.height - 1) / YARD_HEIGHT,
        ))
    }

    pub fn world_to_cell(&self, position: Vec2) -> Option<(u16, u16)> {
        let (sx, sy) = self.scale()?;
        if !(0.0..=YARD_WIDTH).contains(&position.x) || !(0.0..=YARD_HEIGHT).contains(&position.y)
        {
            return None;
        }
        let column = (position.x * sx).round() as u16;
        let row = (position.y * sy).round() as u16;
        Some((self.cells.x + column, self.cells.y + row))
    }

    pub fn cell_to_world(&self, column: u16, row: u16) -> Option<Vec2> {
        let (sx, sy) = self.scale()?;
        let inside = column >= self.cells.x
            && column < self.cells.x + self.cells.width
            && row >= self.cells.y
            && row < self.cells.y + self.cells.height;
        if !inside {
            return None;
        }
        Some(Vec2::new(
            f64::from(column - self.cells.x) / sx,
            f64::from(row - self.cells.y) / sy,
        ))
    }
}

/// View struct that holds all state needed for rendering
pub struct RenderView<'a> {
    pub game_state: GameState,
    pub scene: &'a Scene,
    pub area: Rect,
    pub fps: u32,
    pub show_ids: bool,
}

/// Handles all rendering responsibilities for the game
#[derive(Default)]
pub struct GameRenderer {}

impl GameRenderer {
    pub fn new() -> Self {
        Self {}
    }

    /// Main render method that dispatches to state-specific renderers
    pub fn render(&self, frame: &mut Frame, view: &RenderView) {
        match view.game_state {
            GameState::Playing => self.render_game(frame, view),
            GameState::Paused => self.render_paused(frame, view),
        }
    }

    fn render_game(&self, frame: &mut Frame, view: &RenderView) {
        let layout = ScreenLayout::new(view.area);
        let viewport = Viewport::new(view.area);
        let scene = view.scene;

        let yard_block = Block::default()
            .borders(Borders::ALL)
            .title(" Yard ")
            .border_style(Style::default().fg(Color::Green));
        frame.render_widget(yard_block, layout.yard);

        let buffer = frame.buffer_mut();
        draw_grass(buffer, viewport.cells);

        // Slots first so units are drawn over them
        for slot in scene.lancers.iter().filter_map(|l| l.slot()) {
            put(buffer, &viewport, slot, "·", Style::default().fg(Color::DarkGray));
        }

        if let Some(target_pos) = scene.leader.target_pos {
            put(buffer, &viewport, target_pos, "x", Style::default().fg(Color::Yellow));
        }

        for lancer in &scene.lancers {
            let color = if lancer.unit.is_idle() {
                Color::Cyan
            } else {
                Color::LightYellow
            };
            let glyph = if view.show_ids {
                lancer.unit_id.to_string()
            } else {
                facing_glyph(&lancer.unit).to_string()
            };
            put(buffer, &viewport, lancer.unit.position(), &glyph, Style::default().fg(color));
        }

        put(
            buffer,
            &viewport,
            scene.enemy.position(),
            "E",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        );

        let mut leader_style = Style::default()
            .fg(Color::LightBlue)
            .add_modifier(Modifier::BOLD);
        if scene.leader_selected() {
            leader_style = leader_style.add_modifier(Modifier::REVERSED);
        }
        put(buffer, &viewport, scene.leader.position(), "L", leader_style);

        self.render_header(frame, view, layout.header);
        self.render_panel(frame, view, layout.panel);

        // Controls hint at bottom
        let controls = Line::from(vec![Span::styled(
            "[1-6: Formation] [0: Cancel] [Space/Click: Select+Move] [WASD: Leader] [IJKL: Enemy] [G: Ids] [P: Pause] [Q: Quit]",
            Style::default().fg(Color::DarkGray),
        )]);
        frame.render_widget(Paragraph::new(controls).centered(), layout.footer);
    }

    fn render_header(&self, frame: &mut Frame, view: &RenderView, area: Rect) {
        let scene = view.scene;
        let formation = scene
            .active_formation()
            .map(|kind| kind.get_name())
            .unwrap_or("None");

        let stats = Line::from(vec![
            Span::styled("Formation: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                formation,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  Lancers: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", scene.lancers.len()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("  FPS: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{}", view.fps),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);

        frame.render_widget(Paragraph::new(stats), area);
    }

    fn render_panel(&self, frame: &mut Frame, view: &RenderView, area: Rect) {
        let scene = view.scene;
        let mut lines = vec![Line::from("Formations").bold().white(), Line::from("")];

        for (index, kind) in FormationKind::ALL.iter().enumerate() {
            let label = format!("[{}] {}", index + 1, kind.get_name());
            let line = if scene.active_formation() == Some(*kind) {
                Line::from(label).bold().black().on_light_blue()
            } else {
                Line::from(label).light_blue()
            };
            lines.push(line);
        }
        lines.push(Line::from("[0] Cancel formation").light_red());
        lines.push(Line::from(""));

        let leader_state = if scene.leader.is_idle() {
            "idle"
        } else {
            "moving"
        };
        lines.push(Line::from(format!("Leader: {leader_state}")).gray());
        lines.push(
            Line::from(format!(
                "Selected: {}",
                if scene.leader_selected() { "yes" } else { "no" }
            ))
            .gray(),
        );
        lines.push(
            Line::from(format!(
                "Moving: {}/{}",
                scene.moving_lancers(),
                scene.lancers.len()
            ))
            .gray(),
        );
        lines.push(Line::from(""));
        lines.push(Line::from(scene.status.clone()).yellow());

        frame.render_widget(
            Paragraph::new(lines).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            ),
            area,
        );
    }

    /// Renders the pause screen with overlay
    fn render_paused(&self, frame: &mut Frame, view: &RenderView) {
        // First render the game screen
        self.render_game(frame, view);

        let area = view.area;
        let pause_text = vec![
            Line::from(""),
            Line::from("PAUSED").centered().bold().yellow(),
            Line::from(""),
            Line::from("Press P to resume").centered().white(),
        ];

        let pause_area = Rect {
            x: area.x + (area.width / 2).saturating_sub(15),
            y: area.y + (area.height / 2).saturating_sub(3),
            width: area.width.min(30),
            height: area.height.min(6),
        };

        frame.render_widget(
            Paragraph::new(pause_text)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow)),
                )
                .alignment(Alignment::Center),
            pause_area,
        );
    }
}

fn facing_glyph(unit: &Unit) -> char {
    if unit.flip_x { '<' } else { '>' }
}

/// Sparse grass pattern so motion is easier to follow
fn draw_grass(buffer: &mut Buffer, cells: Rect) {
    let style = Style::default().fg(Color::Rgb(40, 90, 40));
    for row in (cells.y..cells.y + cells.height).step_by(2) {
        for column in (cells.x + (row % 4) / 2..cells.x + cells.width).step_by(4) {
            buffer.set_string(column, row, "'", style);
        }
    }
}

/// Writes `text` at the cell under `position`, clipped to the yard.
fn put(buffer: &mut Buffer, viewport: &Viewport, position: Vec2, text: &str, style: Style) {
    let Some((column, row)) = viewport.world_to_cell(position) else {
        return;
    };
    let room = (viewport.cells.x + viewport.cells.width).saturating_sub(column) as usize;
    buffer.set_stringn(column, row, text, room, style);
}
