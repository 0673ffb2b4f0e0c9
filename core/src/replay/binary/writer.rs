//! Binary replay format writer

use byteorder::{LittleEndian, WriteBytesExt};
use handmade_shared::{ButtonState, ControllerSnapshot, InputFrame};
use std::io::{self, Write};

use super::{REPLAY_MAGIC, REPLAY_VERSION};

/// Writer for binary replay format
pub struct ReplayWriter<W: Write> {
    writer: W,
    frames: u64,
}

impl<W: Write> ReplayWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, frames: 0 }
    }

    /// Write the header followed by the memory snapshot
    pub fn write_header(&mut self, memory: &[u8]) -> io::Result<()> {
        self.writer.write_all(&REPLAY_MAGIC)?;
        self.writer.write_u16::<LittleEndian>(REPLAY_VERSION)?;
        self.writer.write_u16::<LittleEndian>(0)?; // reserved
        self.writer.write_u64::<LittleEndian>(memory.len() as u64)?;
        self.writer.write_all(memory)
    }

    /// Append one tick of input
    pub fn write_frame(&mut self, frame: &InputFrame) -> io::Result<()> {
        for button in &frame.mouse_buttons {
            self.write_button(button)?;
        }
        self.writer.write_i32::<LittleEndian>(frame.mouse_x)?;
        self.writer.write_i32::<LittleEndian>(frame.mouse_y)?;
        self.writer.write_i32::<LittleEndian>(frame.mouse_z)?;
        self.writer.write_f32::<LittleEndian>(frame.seconds_to_advance)?;
        for controller in &frame.controllers {
            self.write_controller(controller)?;
        }
        self.frames += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn write_controller(&mut self, controller: &ControllerSnapshot) -> io::Result<()> {
        self.writer.write_u8(controller.is_connected as u8)?;
        self.writer.write_u8(controller.is_analog as u8)?;
        self.writer.write_f32::<LittleEndian>(controller.stick_average_x)?;
        self.writer.write_f32::<LittleEndian>(controller.stick_average_y)?;
        for (_, button) in controller.buttons.iter() {
            self.write_button(button)?;
        }
        Ok(())
    }

    fn write_button(&mut self, button: &ButtonState) -> io::Result<()> {
        self.writer.write_u32::<LittleEndian>(button.half_transition_count)?;
        self.writer.write_u8(button.ended_down as u8)
    }
}
