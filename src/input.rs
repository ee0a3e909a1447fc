use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use std::time::{Duration, Instant};

use crate::entities::{FormationKind, GameState};
use crate::geometry::Vec2;
use crate::scene::Steering;

/// Represents semantic game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    SelectFormation(FormationKind),
    CancelFormation,
    ToggleLeaderSelection,
    ToggleIds,
    /// Left click at a terminal cell
    Click { column: u16, row: u16 },
    Pause,
    Resume,
    Restart,
    Quit,
}

/// How long a key stays held after its last press when the terminal never
/// reports releases. Covers the gap between auto-repeat presses.
const HOLD_WINDOW: Duration = Duration::from_millis(100);

/// Tracks the state of keys that can be held down for continuous input.
/// Each entry is the instant the key was last seen pressed.
#[derive(Debug, Default)]
struct KeyState {
    up: Option<Instant>,
    down: Option<Instant>,
    left: Option<Instant>,
    right: Option<Instant>,
    enemy_up: Option<Instant>,
    enemy_down: Option<Instant>,
    enemy_left: Option<Instant>,
    enemy_right: Option<Instant>,
}

impl KeyState {
    /// Lets go of keys not pressed again within [`HOLD_WINDOW`] of `now`.
    fn expire(&mut self, now: Instant) {
        for key in [
            &mut self.up,
            &mut self.down,
            &mut self.left,
            &mut self.right,
            &mut self.enemy_up,
            &mut self.enemy_down,
            &mut self.enemy_left,
            &mut self.enemy_right,
        ] {
            if key.is_some_and(|seen| now.saturating_duration_since(seen) > HOLD_WINDOW) {
                *key = None;
            }
        }
    }
}

/// Manages input polling and translates raw terminal events into game actions
pub struct InputManager {
    key_state: KeyState,
    oneshot_actions: Vec<InputAction>,
    /// Without release events a held key is only seen as repeated presses,
    /// so keys expire a short while after their last press.
    release_events: bool,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(true)
    }
}

impl InputManager {
    pub fn new(release_events: bool) -> Self {
        Self {
            key_state: KeyState::default(),
            oneshot_actions: Vec::new(),
            release_events,
        }
    }

    /// Polls for all input events and stores one-shot actions
    /// Should be called once per frame before getting actions
    pub fn poll_events(&mut self, game_state: &GameState) -> color_eyre::Result<()> {
        // Clear previous one-shot actions
        self.oneshot_actions.clear();

        // Poll for all available events without blocking
        while event::poll(Duration::from_millis(0))? {
            let event = event::read()?;
            self.handle_event(event, game_state);
        }

        self.expire_held(Instant::now());
        Ok(())
    }

    /// Feeds one terminal event through the key and mouse handlers
    pub fn handle_event(&mut self, event: Event, game_state: &GameState) {
        self.handle_event_at(event, game_state, Instant::now());
    }

    fn handle_event_at(&mut self, event: Event, game_state: &GameState, now: Instant) {
        match event {
            Event::Key(key_event) => self.handle_key_event(key_event, game_state, now),
            Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event, game_state),
            _ => {}
        }
    }

    fn handle_mouse_event(&mut self, mouse_event: MouseEvent, game_state: &GameState) {
        if *game_state != GameState::Playing {
            return;
        }
        if let MouseEventKind::Down(MouseButton::Left) = mouse_event.kind {
            self.oneshot_actions.push(InputAction::Click {
                column: mouse_event.column,
                row: mouse_event.row,
            });
        }
    }

    /// Processes a key event and updates key state and one-shot actions
    fn handle_key_event(&mut self, key_event: KeyEvent, game_state: &GameState, now: Instant) {
        match key_event.kind {
            KeyEventKind::Press => {
                self.handle_key_press(key_event, game_state, now);
            }
            KeyEventKind::Release => {
                self.set_held(key_event.code, None);
            }
            _ => {}
        }
    }

    /// Handles key press events
    fn handle_key_press(&mut self, key_event: KeyEvent, game_state: &GameState, now: Instant) {
        // Check for quit keys first (works in any state)
        if matches!(
            key_event.code,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
        ) || (key_event.code == KeyCode::Char('c')
            && key_event.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.oneshot_actions.push(InputAction::Quit);
            return;
        }

        if matches!(key_event.code, KeyCode::Char('p') | KeyCode::Char('P')) {
            self.oneshot_actions.push(match game_state {
                GameState::Playing => InputAction::Pause,
                GameState::Paused => InputAction::Resume,
            });
            return;
        }

        if *game_state != GameState::Playing {
            return;
        }

        let action = match key_event.code {
            KeyCode::Char(digit @ '1'..='6') => {
                let index = digit as usize - '1' as usize;
                Some(InputAction::SelectFormation(FormationKind::ALL[index]))
            }
            KeyCode::Char('0') | KeyCode::Char('c') | KeyCode::Char('C') => {
                Some(InputAction::CancelFormation)
            }
            KeyCode::Char(' ') | KeyCode::Enter => Some(InputAction::ToggleLeaderSelection),
            KeyCode::Char('g') | KeyCode::Char('G') => Some(InputAction::ToggleIds),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(InputAction::Restart),
            _ => None,
        };

        match action {
            Some(action) => self.oneshot_actions.push(action),
            None => self.set_held(key_event.code, Some(now)),
        }
    }

    /// Updates held-key state. Opposite directions cancel each other on press.
    fn set_held(&mut self, code: KeyCode, seen: Option<Instant>) {
        let keys = &mut self.key_state;
        let (key, opposite) = match code {
            // Leader - WASD and arrows
            KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => {
                (&mut keys.up, &mut keys.down)
            }
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => {
                (&mut keys.down, &mut keys.up)
            }
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => {
                (&mut keys.left, &mut keys.right)
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
                (&mut keys.right, &mut keys.left)
            }
            // Enemy - IJKL
            KeyCode::Char('i') | KeyCode::Char('I') => {
                (&mut keys.enemy_up, &mut keys.enemy_down)
            }
            KeyCode::Char('k') | KeyCode::Char('K') => {
                (&mut keys.enemy_down, &mut keys.enemy_up)
            }
            KeyCode::Char('j') | KeyCode::Char('J') => {
                (&mut keys.enemy_left, &mut keys.enemy_right)
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                (&mut keys.enemy_right, &mut keys.enemy_left)
            }
            _ => return,
        };
        *key = seen;
        if seen.is_some() {
            *opposite = None;
        }
    }

    /// Drops held keys whose auto-repeat stopped. Terminals that report
    /// releases keep keys until the release arrives.
    fn expire_held(&mut self, now: Instant) {
        if !self.release_events {
            self.key_state.expire(now);
        }
    }

    /// Returns the one-shot actions gathered by the last poll
    pub fn get_actions(&self) -> Vec<InputAction> {
        self.oneshot_actions.clone()
    }

    /// Directions held for the leader and the enemy (y grows downward)
    pub fn steering(&self, game_state: &GameState) -> Steering {
        if *game_state != GameState::Playing {
            return Steering::default();
        }
        let keys = &self.key_state;
        Steering {
            leader: axis(keys.left, keys.right, keys.up, keys.down),
            enemy: axis(
                keys.enemy_left,
                keys.enemy_right,
                keys.enemy_up,
                keys.enemy_down,
            ),
        }
    }
}

fn axis(
    left: Option<Instant>,
    right: Option<Instant>,
    up: Option<Instant>,
    down: Option<Instant>,
) -> Vec2 {
    let held = |key: Option<Instant>| f64::from(u8::from(key.is_some()));
    Vec2::new(held(right) - held(left), held(down) - held(up))
}
