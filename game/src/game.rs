//! Per-tick game logic

use handmade_shared::{ControllerSnapshot, InputFrame};

use crate::render::{Bitmap, pack_color};
use crate::sound::output_sine;
use crate::world::{RawPosition, TILES_COUNT_X, TILES_COUNT_Y, World};

pub const PLAYER_SPEED: f32 = 64.0;
pub const BASE_TONE_HZ: f32 = 256.0;

/// Lives at the start of permanent storage.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameState {
    pub player_tilemap_x: i32,
    pub player_tilemap_y: i32,
    pub player_x: f32,
    pub player_y: f32,
    pub tone_hz: f32,
    pub tone_phase: f32,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            player_tilemap_x: 0,
            player_tilemap_y: 0,
            player_x: 150.0,
            player_y: 150.0,
            tone_hz: BASE_TONE_HZ,
            tone_phase: 0.0,
        }
    }
}

impl GameState {
    pub fn update_and_render(&mut self, input: &InputFrame, bitmap: &mut Bitmap<'_>) {
        let world = World::default();
        for controller in input.controllers.iter().filter(|c| c.is_connected) {
            if controller.is_analog {
                self.tone_hz = BASE_TONE_HZ + 128.0 * controller.stick_average_y;
            }
            self.move_player(&world, controller, input.seconds_to_advance);
        }
        self.render(&world, bitmap);
    }

    pub fn get_sound_samples(&mut self, samples_per_second: u32, samples: &mut [i16]) {
        output_sine(&mut self.tone_phase, self.tone_hz, samples_per_second, samples);
    }

    fn player_size(world: &World) -> (f32, f32) {
        (0.75 * world.tile_width, world.tile_height)
    }

    fn move_player(&mut self, world: &World, controller: &ControllerSnapshot, seconds: f32) {
        let buttons = &controller.buttons;
        let mut dx = 0.0;
        let mut dy = 0.0;
        if buttons.move_up.ended_down {
            dy = -1.0;
        }
        if buttons.move_down.ended_down {
            dy = 1.0;
        }
        if buttons.move_left.ended_down {
            dx = -1.0;
        }
        if buttons.move_right.ended_down {
            dx = 1.0;
        }
        if dx == 0.0 && dy == 0.0 {
            return;
        }

        let (player_width, _) = Self::player_size(world);
        let at = |x: f32| RawPosition {
            tilemap_x: self.player_tilemap_x,
            tilemap_y: self.player_tilemap_y,
            x,
            y: self.player_y + seconds * PLAYER_SPEED * dy,
        };
        let new_x = self.player_x + seconds * PLAYER_SPEED * dx;
        let center = at(new_x);

        // Bottom center and both bottom corners must land on open floor.
        if world.is_point_empty(center)
            && world.is_point_empty(at(new_x - 0.5 * player_width))
            && world.is_point_empty(at(new_x + 0.5 * player_width))
        {
            let moved = world.raw_position(world.canonical_position(center));
            self.player_tilemap_x = moved.tilemap_x;
            self.player_tilemap_y = moved.tilemap_y;
            self.player_x = moved.x;
            self.player_y = moved.y;
        }
    }

    fn render(&self, world: &World, bitmap: &mut Bitmap<'_>) {
        bitmap.clear(pack_color(1.0, 0.0, 1.0));

        if let Some(tilemap) = world.tilemap(self.player_tilemap_x, self.player_tilemap_y) {
            for row in 0..TILES_COUNT_Y {
                for col in 0..TILES_COUNT_X {
                    let gray = if tilemap.is_empty(col, row) { 0.5 } else { 1.0 };
                    let min_x = world.upper_left_x + col as f32 * world.tile_width;
                    let min_y = world.upper_left_y + row as f32 * world.tile_height;
                    bitmap.fill_rect(
                        min_x,
                        min_y,
                        min_x + world.tile_width,
                        min_y + world.tile_height,
                        pack_color(gray, gray, gray),
                    );
                }
            }
        }

        let (width, height) = Self::player_size(world);
        let left = self.player_x - 0.5 * width;
        let top = self.player_y - height;
        bitmap.fill_rect(
            left,
            top,
            left + width,
            top + height,
            pack_color(1.0, 1.0, 0.0),
        );
    }
}
