//! Handmade Platform - OS glue around the Handmade core
//!
//! - [`audio`] - cpal output stream exposed as a circular [`SoundDevice`](handmade_core::SoundDevice)
//! - [`input`] - Keyboard, mouse and gamepad mapping into input snapshots
//! - [`present`] - Scaled blit of the back buffer through `pixels`
//! - [`app`] - The winit application driving one tick per loop iteration

pub mod app;
pub mod audio;
pub mod input;
pub mod present;

pub use app::{HandmadeApp, PlatformOptions, run};
