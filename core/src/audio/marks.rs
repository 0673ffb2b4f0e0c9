//! Cursor history for the audio sync display

use ringbuf::{
    HeapRb,
    traits::{Consumer, Observer, RingBuffer},
};

use super::device::Cursors;
use super::sync::WritePlan;
use crate::frame_buffer::FrameBuffer;

/// Cursor positions recorded over one tick. Diagnostic only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugTimeMark {
    pub output_play_cursor: u32,
    pub output_write_cursor: u32,
    pub output_location: u32,
    pub output_byte_count: u32,
    pub expected_flip_play_cursor: u32,
    pub flip_play_cursor: u32,
    pub flip_write_cursor: u32,
}

/// Fixed-size ring of recent [`DebugTimeMark`]s, oldest overwritten first.
pub struct TimeMarkRing {
    marks: HeapRb<DebugTimeMark>,
    pending: Option<DebugTimeMark>,
}

impl TimeMarkRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            marks: HeapRb::new(capacity.max(1)),
            pending: None,
        }
    }

    /// Remember where this tick's audio went.
    pub fn record_output(&mut self, plan: &WritePlan) {
        self.pending = Some(DebugTimeMark {
            output_play_cursor: plan.cursors.play,
            output_write_cursor: plan.cursors.write,
            output_location: plan.byte_to_lock,
            output_byte_count: plan.bytes_to_write,
            expected_flip_play_cursor: plan.frame_flip_byte,
            ..Default::default()
        });
    }

    /// Close out the tick with the cursors seen right after the flip.
    pub fn record_flip(&mut self, cursors: Cursors) {
        let mut mark = self.pending.take().unwrap_or_default();
        mark.flip_play_cursor = cursors.play;
        mark.flip_write_cursor = cursors.write;
        self.marks.push_overwrite(mark);
    }

    /// Marks from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &DebugTimeMark> {
        self.marks.iter()
    }

    pub fn len(&self) -> usize {
        self.marks.occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

const PAD_X: u32 = 16;
const PAD_Y: u32 = 16;
const ROW_HEIGHT: u32 = 48;

const WHITE: u32 = 0x00FF_FFFF;
const RED: u32 = 0x00FF_0000;
const YELLOW: u32 = 0x00FF_FF00;
const MAGENTA: u32 = 0x00FF_00FF;

/// Draw the recorded cursors as vertical lines across the top of the frame.
///
/// Row 0: play (white) and write (red) cursors when audio was planned.
/// Row 1: the written range (magenta).
/// Row 2: the predicted flip cursor (yellow).
/// Row 3: play and write cursors right after the flip.
pub fn draw_sync_display(buffer: &mut FrameBuffer, marks: &TimeMarkRing, buffer_size: u32) {
    if buffer.width() <= 2 * PAD_X || buffer_size == 0 {
        return;
    }
    let scale = (buffer.width() - 2 * PAD_X) as f32 / buffer_size as f32;
    let x_of = |byte: u32| PAD_X + (scale * byte as f32) as u32;
    let row = |index: u32| {
        let top = PAD_Y + index * ROW_HEIGHT;
        (top, top + ROW_HEIGHT - 4)
    };

    for mark in marks.iter() {
        let (top, bottom) = row(0);
        buffer.draw_vertical(x_of(mark.output_play_cursor), top, bottom, WHITE);
        buffer.draw_vertical(x_of(mark.output_write_cursor), top, bottom, RED);

        let (top, bottom) = row(1);
        let end = (mark.output_location as u64 + mark.output_byte_count as u64) % buffer_size as u64;
        buffer.draw_vertical(x_of(mark.output_location), top, bottom, MAGENTA);
        buffer.draw_vertical(x_of(end as u32), top, bottom, MAGENTA);

        let (top, bottom) = row(2);
        buffer.draw_vertical(x_of(mark.expected_flip_play_cursor), top, bottom, YELLOW);

        let (top, bottom) = row(3);
        buffer.draw_vertical(x_of(mark.flip_play_cursor), top, bottom, WHITE);
        buffer.draw_vertical(x_of(mark.flip_write_cursor), top, bottom, RED);
    }
}
