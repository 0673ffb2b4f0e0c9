//! Window, event pump and the per-tick driver
//!
//! winit owns the thread. Window events are applied to the tick's input as
//! they arrive; once the queue drains, `about_to_wait` runs one full tick.
//! The frame pacer inside the tick does the waiting, so the event loop polls.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use handmade_core::config::{self, PlatformConfig};
use handmade_core::{GameCodeLoader, HandmadeLoop, ReplayMode, SoundDevice, SystemClock};
use tracing::{debug, error, info, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

#[cfg(feature = "gamepad")]
use crate::input::GamepadInput;
use crate::audio::open_sound_device;
use crate::input::{KeyboardInput, PlatformCommand};
use crate::present::Presenter;

const REPLAY_FILE_NAME: &str = "loop_edit.hmrp";

/// Everything the platform needs before the window exists.
#[derive(Debug, Clone)]
pub struct PlatformOptions {
    pub config: PlatformConfig,
    /// Game library to load and watch
    pub game_library: PathBuf,
    /// Where loaded library copies are placed
    pub temp_dir: PathBuf,
}

/// State that only exists once a window is up.
struct Running {
    window: Arc<Window>,
    presenter: Presenter,
    platform: HandmadeLoop<SystemClock>,
    sound: Box<dyn SoundDevice>,
}

pub struct HandmadeApp {
    config: PlatformConfig,
    loader: GameCodeLoader,
    keyboard: KeyboardInput,
    #[cfg(feature = "gamepad")]
    gamepads: Option<GamepadInput>,
    running: Option<Running>,
    fatal: Option<anyhow::Error>,
}

impl HandmadeApp {
    pub fn new(options: PlatformOptions) -> Self {
        Self {
            loader: GameCodeLoader::new(options.game_library, options.temp_dir),
            config: options.config,
            keyboard: KeyboardInput::default(),
            #[cfg(feature = "gamepad")]
            gamepads: GamepadInput::new(),
            running: None,
            fatal: None,
        }
    }

    /// The error that ended the loop, if any.
    pub fn finish(self) -> Result<()> {
        match self.fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn replay_path(&self) -> PathBuf {
        self.config
            .debug
            .replay_dir
            .clone()
            .or_else(config::data_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join(REPLAY_FILE_NAME)
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let video = &self.config.video;
        let attributes = Window::default_attributes()
            .with_title("Handmade")
            .with_inner_size(PhysicalSize::new(video.width, video.height));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .context("failed to create window")?,
        );

        let presenter = Presenter::new(Arc::clone(&window), video.width, video.height)
            .context("failed to create presenter")?;

        let refresh_hz = window
            .current_monitor()
            .and_then(|monitor| monitor.refresh_rate_millihertz())
            .map(|millihertz| millihertz.div_ceil(1000));
        let game_update_hz = video.game_update_hz(refresh_hz);
        info!(
            "Monitor refresh {:?} Hz, game update {:.2} Hz",
            refresh_hz, game_update_hz
        );

        let mut platform = HandmadeLoop::new(
            SystemClock::new(),
            &self.config,
            game_update_hz,
            self.replay_path(),
        )
        .context("failed to start platform")?;

        let state = platform.audio().state();
        let mut sound = open_sound_device(state.samples_per_second, state.buffer_size);
        platform.start_audio(sound.as_mut());

        if !self.loader.poll_and_log() && !self.loader.is_loaded() {
            warn!(
                "Running without game code until {} can be loaded",
                self.loader.source_path().display()
            );
        }

        Ok(Running {
            window,
            presenter,
            platform,
            sound,
        })
    }

    fn handle_command(running: &mut Running, command: PlatformCommand) {
        match command {
            PlatformCommand::TogglePause => running.platform.toggle_pause(),
            PlatformCommand::ToggleReplay => {
                let mode = running.platform.toggle_replay();
                let title = match mode {
                    ReplayMode::Idle => "Handmade",
                    ReplayMode::Recording => "Handmade [recording]",
                    ReplayMode::Playing => "Handmade [playback]",
                };
                running.window.set_title(title);
            }
        }
    }

    /// One full tick: reload, input, update, audio, wait, present.
    fn tick(&mut self) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        if self.config.game.poll_reload {
            self.loader.poll_and_log();
        }

        #[cfg(feature = "gamepad")]
        if let Some(gamepads) = self.gamepads.as_mut() {
            let (old, new) = running.platform.input_mut();
            gamepads.poll(old, new);
        }

        let report = running
            .platform
            .run_frame(self.loader.game(), running.sound.as_mut());
        if !report.paused
            && let Err(e) = running.presenter.present(running.platform.frame_buffer())
        {
            warn!("Present failed: {}", e);
        }
        running.platform.end_frame(running.sound.as_mut());
    }
}

impl ApplicationHandler for HandmadeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        event_loop.set_control_flow(ControlFlow::Poll);
        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => {
                error!("{:#}", e);
                self.fatal = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        let (_, new) = running.platform.input_mut();

        match event {
            WindowEvent::CloseRequested => {
                info!("Window close requested");
                running.platform.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                debug!("Window resized to {}x{}", size.width, size.height);
                if let Err(e) = running.presenter.resize_surface(size.width, size.height) {
                    warn!("Failed to resize surface: {}", e);
                }
                running.platform.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let command =
                    self.keyboard
                        .handle_key(new, code, event.state.is_pressed(), event.repeat);
                if let Some(command) = command {
                    Self::handle_command(running, command);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.keyboard.handle_cursor(new, position.x, position.y);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.keyboard
                    .handle_mouse_button(new, button, state.is_pressed());
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.keyboard.handle_wheel(new, delta);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self
            .running
            .as_ref()
            .is_some_and(|running| running.platform.is_stopped())
        {
            event_loop.exit();
            return;
        }
        self.tick();
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = self.running.as_mut() {
            running.platform.stop();
        }
    }
}

/// Open the window and run until it is closed.
pub fn run(options: PlatformOptions) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = HandmadeApp::new(options);
    event_loop
        .run_app(&mut app)
        .context("event loop terminated with an error")?;
    app.finish()
}
