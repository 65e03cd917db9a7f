use super::input::{ActionStates, InputAction, InputEvent};
use super::Canvas;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GameState {
    #[default]
    Menu,
    Loading,
    IngamePlaying,
    IngameDialogue,
    GameOver,
    Exit,
}

impl GameState {
    pub fn as_str(self) -> &'static str {
        match self {
            GameState::Menu => "menu",
            GameState::Loading => "loading",
            GameState::IngamePlaying => "ingame_playing",
            GameState::IngameDialogue => "ingame_dialogue",
            GameState::GameOver => "game_over",
            GameState::Exit => "exit",
        }
    }
}

/// Continuous input state for one simulation tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSnapshot {
    actions: ActionStates,
    window_size: (u32, u32),
}

impl InputSnapshot {
    pub fn new(actions: ActionStates, window_size: (u32, u32)) -> Self {
        Self {
            actions,
            window_size,
        }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }
}

/// The loop drives exactly one `Game`. Per frame: every queued
/// [`InputEvent`] goes to `handle_input`, then zero or more `step_frame`
/// ticks run, then `render_frame` draws once.
pub trait Game {
    fn handle_input(&mut self, event: InputEvent);

    fn step_frame(&mut self, input: &InputSnapshot);

    fn render_frame(&self, canvas: &mut dyn Canvas);

    fn on_window_change(&mut self, window_size: (u32, u32));

    fn state(&self) -> GameState;

    fn debug_summary(&self) -> Option<String> {
        None
    }

    fn shutdown(&mut self) {}
}
