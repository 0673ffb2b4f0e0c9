//! Shared types for the Handmade platform layer
//!
//! This crate contains the `#[repr(C)]` types that cross the boundary between
//! the platform executable and the hot-reloadable game module:
//! - Game memory, frame buffer and sound buffer views
//! - Per-frame input snapshots for the keyboard and gamepads
//! - Entry-point signatures and their exported symbol names
//!
//! Nothing in here owns memory. The platform allocates everything and lends
//! raw views to the game module once per call.

pub mod abi;
pub mod input;

pub use abi::{
    GET_SOUND_SAMPLES_SYMBOL, GameGetSoundSamplesFn, GameMemory, GameOffscreenBuffer,
    GameSoundBuffer, GameUpdateAndRenderFn, UPDATE_AND_RENDER_SYMBOL,
};
pub use input::{
    Button, ButtonState, CONTROLLER_COUNT, ControllerButtons, ControllerSnapshot, InputFrame,
    KEYBOARD_CONTROLLER, MOUSE_BUTTON_COUNT,
};
