//! Per-frame input snapshots
//!
//! Buttons are stored as explicit named fields. [`Button`] provides the
//! mapping table from a numeric index to a field, so code that wants to loop
//! over every button never has to alias the struct as an array.

/// Number of controller slots in an [`InputFrame`]: the keyboard plus four gamepads.
pub const CONTROLLER_COUNT: usize = 5;

/// Slot reserved for the keyboard.
pub const KEYBOARD_CONTROLLER: usize = 0;

/// Number of tracked mouse buttons.
pub const MOUSE_BUTTON_COUNT: usize = 5;

/// State of one digital button over a single tick.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    /// Press and release edges observed during this tick
    pub half_transition_count: u32,
    /// Whether the button was held when the tick ended
    pub ended_down: bool,
}

impl ButtonState {
    /// True if the button went down at least once during this tick.
    pub fn was_pressed(&self) -> bool {
        self.half_transition_count > 1 || (self.half_transition_count == 1 && self.ended_down)
    }
}

/// Logical controller buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    ActionUp,
    ActionDown,
    ActionLeft,
    ActionRight,
    LeftShoulder,
    RightShoulder,
    Back,
    Start,
}

impl Button {
    pub const COUNT: usize = 12;

    /// Every button in index order.
    pub const ALL: [Button; Self::COUNT] = [
        Button::MoveUp,
        Button::MoveDown,
        Button::MoveLeft,
        Button::MoveRight,
        Button::ActionUp,
        Button::ActionDown,
        Button::ActionLeft,
        Button::ActionRight,
        Button::LeftShoulder,
        Button::RightShoulder,
        Button::Back,
        Button::Start,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Named button fields of one controller.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerButtons {
    pub move_up: ButtonState,
    pub move_down: ButtonState,
    pub move_left: ButtonState,
    pub move_right: ButtonState,
    pub action_up: ButtonState,
    pub action_down: ButtonState,
    pub action_left: ButtonState,
    pub action_right: ButtonState,
    pub left_shoulder: ButtonState,
    pub right_shoulder: ButtonState,
    pub back: ButtonState,
    pub start: ButtonState,
}

impl ControllerButtons {
    pub fn button(&self, button: Button) -> &ButtonState {
        match button {
            Button::MoveUp => &self.move_up,
            Button::MoveDown => &self.move_down,
            Button::MoveLeft => &self.move_left,
            Button::MoveRight => &self.move_right,
            Button::ActionUp => &self.action_up,
            Button::ActionDown => &self.action_down,
            Button::ActionLeft => &self.action_left,
            Button::ActionRight => &self.action_right,
            Button::LeftShoulder => &self.left_shoulder,
            Button::RightShoulder => &self.right_shoulder,
            Button::Back => &self.back,
            Button::Start => &self.start,
        }
    }

    pub fn button_mut(&mut self, button: Button) -> &mut ButtonState {
        match button {
            Button::MoveUp => &mut self.move_up,
            Button::MoveDown => &mut self.move_down,
            Button::MoveLeft => &mut self.move_left,
            Button::MoveRight => &mut self.move_right,
            Button::ActionUp => &mut self.action_up,
            Button::ActionDown => &mut self.action_down,
            Button::ActionLeft => &mut self.action_left,
            Button::ActionRight => &mut self.action_right,
            Button::LeftShoulder => &mut self.left_shoulder,
            Button::RightShoulder => &mut self.right_shoulder,
            Button::Back => &mut self.back,
            Button::Start => &mut self.start,
        }
    }

    /// Indexed access, `None` past the last button.
    pub fn get(&self, index: usize) -> Option<&ButtonState> {
        Button::from_index(index).map(|button| self.button(button))
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ButtonState> {
        Button::from_index(index).map(move |button| self.button_mut(button))
    }

    /// Iterate `(button, state)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Button, &ButtonState)> {
        Button::ALL.into_iter().map(move |button| (button, self.button(button)))
    }
}

/// One controller as seen by the game for a single tick.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerSnapshot {
    pub is_connected: bool,
    pub is_analog: bool,
    /// Left stick X averaged over the tick, in `-1.0..=1.0`
    pub stick_average_x: f32,
    /// Left stick Y averaged over the tick, in `-1.0..=1.0`, up is positive
    pub stick_average_y: f32,
    pub buttons: ControllerButtons,
}

/// Everything the game sees from the outside world in one tick.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputFrame {
    pub mouse_buttons: [ButtonState; MOUSE_BUTTON_COUNT],
    pub mouse_x: i32,
    pub mouse_y: i32,
    pub mouse_z: i32,
    /// Simulation time this tick represents
    pub seconds_to_advance: f32,
    pub controllers: [ControllerSnapshot; CONTROLLER_COUNT],
}

impl InputFrame {
    pub fn controller(&self, index: usize) -> Option<&ControllerSnapshot> {
        self.controllers.get(index)
    }

    pub fn controller_mut(&mut self, index: usize) -> Option<&mut ControllerSnapshot> {
        self.controllers.get_mut(index)
    }

    pub fn keyboard(&self) -> &ControllerSnapshot {
        &self.controllers[KEYBOARD_CONTROLLER]
    }

    pub fn keyboard_mut(&mut self) -> &mut ControllerSnapshot {
        &mut self.controllers[KEYBOARD_CONTROLLER]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_index_roundtrip() {
        for (i, button) in Button::ALL.iter().enumerate() {
            assert_eq!(button.index(), i);
            assert_eq!(Button::from_index(i), Some(*button));
        }
        assert_eq!(Button::from_index(Button::COUNT), None);
    }

    #[test]
    fn test_indexed_access_hits_named_field() {
        let mut buttons = ControllerButtons::default();
        if let Some(state) = buttons.get_mut(Button::ActionLeft.index()) {
            state.ended_down = true;
            state.half_transition_count = 1;
        }
        assert!(buttons.action_left.ended_down);
        assert_eq!(buttons.action_left.half_transition_count, 1);
        assert_eq!(buttons.iter().filter(|(_, s)| s.ended_down).count(), 1);
    }

    #[test]
    fn test_was_pressed() {
        let press = ButtonState {
            half_transition_count: 1,
            ended_down: true,
        };
        let release = ButtonState {
            half_transition_count: 1,
            ended_down: false,
        };
        let tap = ButtonState {
            half_transition_count: 2,
            ended_down: false,
        };
        assert!(press.was_pressed());
        assert!(!release.was_pressed());
        assert!(tap.was_pressed());
        assert!(!ButtonState::default().was_pressed());
    }

    #[test]
    fn test_keyboard_slot() {
        let mut frame = InputFrame::default();
        frame.keyboard_mut().is_connected = true;
        assert!(frame.controllers[KEYBOARD_CONTROLLER].is_connected);
        assert!(frame.controller(CONTROLLER_COUNT).is_none());
    }
}
