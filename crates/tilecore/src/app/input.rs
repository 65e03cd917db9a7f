use winit::keyboard::KeyCode;

/// Continuous inputs sampled once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Run,
    Attack,
    CastProjectile,
}

const ACTION_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveUp => 0,
            InputAction::MoveDown => 1,
            InputAction::MoveLeft => 2,
            InputAction::MoveRight => 3,
            InputAction::Run => 4,
            InputAction::Attack => 5,
            InputAction::CastProjectile => 6,
        }
    }

    pub(crate) fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyW | KeyCode::ArrowUp => Some(Self::MoveUp),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(Self::MoveDown),
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(Self::MoveLeft),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(Self::MoveRight),
            KeyCode::ShiftLeft | KeyCode::ShiftRight => Some(Self::Run),
            KeyCode::Space => Some(Self::Attack),
            KeyCode::Digit1 => Some(Self::CastProjectile),
            _ => None,
        }
    }
}

/// Discrete inputs. Only key-down transitions produce one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    MouseDown { x: f32, y: f32 },
    ReturnToMenu,
    ResetLevel,
    DialogueTest,
    Interact,
    ToggleCamera,
    Quit,
}

impl InputEvent {
    pub(crate) fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::Escape => Some(Self::Quit),
            KeyCode::KeyM => Some(Self::ReturnToMenu),
            KeyCode::KeyR => Some(Self::ResetLevel),
            KeyCode::KeyT => Some(Self::DialogueTest),
            KeyCode::KeyE => Some(Self::Interact),
            KeyCode::KeyV => Some(Self::ToggleCamera),
            _ => None,
        }
    }
}
