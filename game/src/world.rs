//! Tile world: a grid of tile maps, each 17x9 tiles of 60 pixels

pub const TILES_COUNT_X: usize = 17;
pub const TILES_COUNT_Y: usize = 9;
pub const TILEMAPS_COUNT_X: i32 = 2;
pub const TILEMAPS_COUNT_Y: i32 = 2;

type Tiles = [[u8; TILES_COUNT_X]; TILES_COUNT_Y];

#[rustfmt::skip]
const TILES_00: Tiles = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1],
    [1, 1, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 1, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 1, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 0, 1, 0, 0, 1],
    [1, 0, 0, 0, 0, 1, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1],
];

#[rustfmt::skip]
const TILES_01: Tiles = [
    [1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

#[rustfmt::skip]
const TILES_10: Tiles = [
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1],
];

#[rustfmt::skip]
const TILES_11: Tiles = [
    [1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
];

/// Row-major by tile map `y`, then `x`.
const TILEMAPS: [&Tiles; 4] = [&TILES_00, &TILES_10, &TILES_01, &TILES_11];

/// One screen's worth of tiles. Nonzero tiles are walls.
#[derive(Debug, Clone, Copy)]
pub struct Tilemap {
    tiles: &'static Tiles,
}

impl Tilemap {
    pub fn tile(&self, x: usize, y: usize) -> Option<u8> {
        self.tiles.get(y)?.get(x).copied()
    }

    pub fn is_empty(&self, x: usize, y: usize) -> bool {
        self.tile(x, y) == Some(0)
    }
}

/// A position in window pixels, relative to a tile map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPosition {
    pub tilemap_x: i32,
    pub tilemap_y: i32,
    pub x: f32,
    pub y: f32,
}

/// A position as a tile map, a tile within it and an offset within the tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalPosition {
    pub tilemap_x: i32,
    pub tilemap_y: i32,
    pub tile_x: usize,
    pub tile_y: usize,
    pub tile_rel_x: f32,
    pub tile_rel_y: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct World {
    pub upper_left_x: f32,
    pub upper_left_y: f32,
    pub tile_width: f32,
    pub tile_height: f32,
}

impl Default for World {
    fn default() -> Self {
        Self {
            upper_left_x: -30.0,
            upper_left_y: 0.0,
            tile_width: 60.0,
            tile_height: 60.0,
        }
    }
}

impl World {
    pub fn tilemap(&self, tilemap_x: i32, tilemap_y: i32) -> Option<Tilemap> {
        if !(0..TILEMAPS_COUNT_X).contains(&tilemap_x) || !(0..TILEMAPS_COUNT_Y).contains(&tilemap_y)
        {
            return None;
        }
        let index = (tilemap_y * TILEMAPS_COUNT_X + tilemap_x) as usize;
        Some(Tilemap {
            tiles: TILEMAPS[index],
        })
    }

    /// Resolve a raw position that may have stepped off its tile map onto the
    /// neighbouring one.
    pub fn canonical_position(&self, pos: RawPosition) -> CanonicalPosition {
        let (tilemap_x, tile_x, tile_rel_x) = canonical_axis(
            pos.tilemap_x,
            pos.x - self.upper_left_x,
            self.tile_width,
            TILES_COUNT_X,
        );
        let (tilemap_y, tile_y, tile_rel_y) = canonical_axis(
            pos.tilemap_y,
            pos.y - self.upper_left_y,
            self.tile_height,
            TILES_COUNT_Y,
        );
        CanonicalPosition {
            tilemap_x,
            tilemap_y,
            tile_x,
            tile_y,
            tile_rel_x,
            tile_rel_y,
        }
    }

    /// Back to window pixels relative to the position's own tile map.
    pub fn raw_position(&self, pos: CanonicalPosition) -> RawPosition {
        RawPosition {
            tilemap_x: pos.tilemap_x,
            tilemap_y: pos.tilemap_y,
            x: self.upper_left_x + self.tile_width * pos.tile_x as f32 + pos.tile_rel_x,
            y: self.upper_left_y + self.tile_height * pos.tile_y as f32 + pos.tile_rel_y,
        }
    }

    /// Points outside the world count as walls.
    pub fn is_point_empty(&self, pos: RawPosition) -> bool {
        let canonical = self.canonical_position(pos);
        self.tilemap(canonical.tilemap_x, canonical.tilemap_y)
            .is_some_and(|tilemap| tilemap.is_empty(canonical.tile_x, canonical.tile_y))
    }
}

/// Steps at most one tile map over, which is all a single tick can move.
fn canonical_axis(tilemap: i32, offset: f32, tile_size: f32, count: usize) -> (i32, usize, f32) {
    let tile = (offset / tile_size).floor() as i32;
    let tile_rel = (offset - tile as f32 * tile_size).clamp(0.0, tile_size);
    let count = count as i32;
    let (tilemap, tile) = if tile < 0 {
        (tilemap - 1, tile + count)
    } else if tile >= count {
        (tilemap + 1, tile - count)
    } else {
        (tilemap, tile)
    };
    (tilemap, tile.clamp(0, count - 1) as usize, tile_rel)
}
