use color_eyre::Result;
use log::{info, warn};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::time::Instant;

use crate::config::Settings;
use crate::entities::GameState;
use crate::input::{InputAction, InputManager};
use crate::renderer::{GameRenderer, RenderView, Viewport};
use crate::scene::{Scene, Steering};

/// Longest frame the simulation will integrate in one step
const MAX_FRAME_SECS: f64 = 0.1;

/// The main application which holds the state and logic of the application.
pub struct App {
    running: bool,
    game_state: GameState,
    scene: Scene,
    settings: Settings,
    show_ids: bool,
    /// Last drawn terminal area, used to map clicks into the yard
    area: Rect,
    /// Frames info
    last_frame_time: Instant,
    fps: u32,
    /// internal components
    input_manager: InputManager,
    renderer: GameRenderer,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(settings: Settings, release_events: bool) -> Self {
        Self {
            running: true,
            game_state: GameState::Playing,
            scene: Scene::new(settings.clone()),
            show_ids: settings.show_ids,
            settings,
            area: Rect::default(),
            last_frame_time: Instant::now(),
            fps: 0,
            input_manager: InputManager::new(release_events),
            renderer: GameRenderer::new(),
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
        while self.running {
            // Calculate FPS
            let now = Instant::now();
            let frame_time = now.duration_since(self.last_frame_time);
            self.last_frame_time = now;
            if frame_time.as_micros() > 0 {
                self.fps = (1_000_000 / frame_time.as_micros()) as u32;
            }

            terminal.draw(|frame| {
                self.area = frame.area();
                let view = RenderView {
                    game_state: self.game_state,
                    scene: &self.scene,
                    area: self.area,
                    fps: self.fps,
                    show_ids: self.show_ids,
                };
                self.renderer.render(frame, &view);
            })?;

            // Poll input events and get actions
            self.input_manager.poll_events(&self.game_state)?;
            let actions = self.input_manager.get_actions();
            self.process_actions(&actions);

            if self.game_state == GameState::Playing {
                let steering = self.input_manager.steering(&self.game_state);
                let dt = frame_time.as_secs_f64().min(MAX_FRAME_SECS);
                self.update(dt, steering);
            }

            // Small sleep to maintain ~60 FPS and prevent CPU spinning
            std::thread::sleep(self.settings.frame_time);
        }
        Ok(())
    }

    /// Process input actions and update game state accordingly
    fn process_actions(&mut self, actions: &[InputAction]) {
        for action in actions {
            match action {
                InputAction::Quit => {
                    self.running = false;
                }
                InputAction::Pause => {
                    self.game_state = GameState::Paused;
                }
                InputAction::Resume => {
                    self.game_state = GameState::Playing;
                }
                InputAction::Restart => {
                    info!("Restarting scene");
                    self.scene = Scene::new(self.settings.clone());
                }
                InputAction::SelectFormation(kind) => {
                    if let Err(err) = self.scene.assign_formation(*kind) {
                        warn!("Could not assign {:?} formation: {}", kind, err);
                        self.scene.status = err.to_string();
                    }
                }
                InputAction::CancelFormation => {
                    self.scene.cancel_formation();
                }
                InputAction::ToggleLeaderSelection => {
                    self.scene.toggle_leader_selection();
                }
                InputAction::ToggleIds => {
                    self.show_ids = !self.show_ids;
                }
                InputAction::Click { column, row } => {
                    let viewport = Viewport::new(self.area);
                    if let Some(position) = viewport.cell_to_world(*column, *row) {
                        self.scene.click(position);
                    }
                }
            }
        }
    }

    fn update(&mut self, dt: f64, steering: Steering) {
        self.scene.update(dt, steering);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::FormationKind;

    fn app() -> App {
        let mut app = App::new(Settings::default(), true);
        app.area = Rect::new(0, 0, 100, 40);
        app
    }

    #[test]
    fn test_pause_resume_quit() {
        let mut app = app();
        app.process_actions(&[InputAction::Pause]);
        assert_eq!(app.game_state, GameState::Paused);
        app.process_actions(&[InputAction::Resume, InputAction::Quit]);
        assert_eq!(app.game_state, GameState::Playing);
        assert!(!app.running);
    }

    #[test]
    fn test_select_and_cancel_formation() {
        let mut app = app();
        app.process_actions(&[InputAction::SelectFormation(FormationKind::Square)]);
        assert_eq!(app.scene.active_formation(), Some(FormationKind::Square));

        app.process_actions(&[InputAction::CancelFormation]);
        assert_eq!(app.scene.active_formation(), None);
    }

    #[test]
    fn test_click_on_leader_selects_it() {
        let mut app = app();
        let viewport = Viewport::new(app.area);
        let (column, row) = viewport
            .world_to_cell(app.scene.leader.position())
            .unwrap();

        app.process_actions(&[InputAction::Click { column, row }]);
        assert!(app.scene.leader_selected());

        // Click in the yard's top-left cell sends the leader there
        let cells = viewport.cells;
        app.process_actions(&[InputAction::Click {
            column: cells.x,
            row: cells.y,
        }]);
        assert!(!app.scene.leader_selected());
        assert_eq!(
            app.scene.leader.target_pos,
            Some(crate::geometry::Vec2::ZERO)
        );
    }

    #[test]
    fn test_click_on_panel_does_nothing() {
        let mut app = app();
        app.process_actions(&[InputAction::ToggleLeaderSelection]);
        app.process_actions(&[InputAction::Click { column: 90, row: 10 }]);
        assert!(app.scene.leader_selected());
        assert_eq!(app.scene.leader.target_pos, None);
    }

    #[test]
    fn test_restart_rebuilds_scene() {
        let mut app = app();
        app.process_actions(&[InputAction::SelectFormation(FormationKind::Wedge)]);
        app.process_actions(&[InputAction::Restart]);
        assert_eq!(app.scene.active_formation(), None);
        assert_eq!(app.scene.lancers.len(), 9);
    }

    #[test]
    fn test_toggle_ids() {
        let mut app = app();
        assert!(!app.show_ids);
        app.process_actions(&[InputAction::ToggleIds]);
        assert!(app.show_ids);
    }
}
