//! Binary replay format reader

use byteorder::{LittleEndian, ReadBytesExt};
use handmade_shared::{Button, ButtonState, ControllerSnapshot, InputFrame};
use std::io::{self, Read, Seek, SeekFrom};

use super::{REPLAY_MAGIC, REPLAY_VERSION};
use crate::memory::GameMemoryRegion;
use crate::replay::ReplayError;

/// Reader for binary replay format
pub struct ReplayReader<R: Read + Seek> {
    reader: R,
    dump_start: u64,
    memory_size: u64,
}

impl<R: Read + Seek> ReplayReader<R> {
    /// Read and validate the header. `expected_memory_size` must match the
    /// size the file was recorded with.
    pub fn open(mut reader: R, expected_memory_size: u64) -> Result<Self, ReplayError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != REPLAY_MAGIC {
            return Err(ReplayError::BadMagic);
        }
        let version = reader.read_u16::<LittleEndian>()?;
        if version != REPLAY_VERSION {
            return Err(ReplayError::UnsupportedVersion(version));
        }
        let _reserved = reader.read_u16::<LittleEndian>()?;
        let memory_size = reader.read_u64::<LittleEndian>()?;
        if memory_size != expected_memory_size {
            return Err(ReplayError::MemorySizeMismatch {
                expected: expected_memory_size,
                found: memory_size,
            });
        }
        let dump_start = reader.stream_position()?;
        Ok(Self {
            reader,
            dump_start,
            memory_size,
        })
    }

    /// Load the snapshot into `memory` and rewind to the first input record
    pub fn restore_memory(&mut self, memory: &mut GameMemoryRegion) -> Result<(), ReplayError> {
        if memory.total_size() as u64 != self.memory_size {
            return Err(ReplayError::MemorySizeMismatch {
                expected: memory.total_size() as u64,
                found: self.memory_size,
            });
        }
        self.reader.seek(SeekFrom::Start(self.dump_start))?;
        let mut snapshot = vec![0u8; self.memory_size as usize];
        self.reader.read_exact(&mut snapshot)?;
        memory.restore(&snapshot);
        Ok(())
    }

    /// Next recorded tick, or `None` at a clean end of stream
    pub fn next_frame(&mut self) -> Result<Option<InputFrame>, ReplayError> {
        let record_start = self.reader.stream_position()?;
        let first_count = match self.reader.read_u32::<LittleEndian>() {
            Ok(count) => count,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                // Only a stream ending exactly on a record boundary is clean.
                if self.reader.seek(SeekFrom::End(0))? == record_start {
                    return Ok(None);
                }
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        let mut frame = InputFrame::default();
        frame.mouse_buttons[0] = ButtonState {
            half_transition_count: first_count,
            ended_down: self.reader.read_u8()? != 0,
        };
        for button in frame.mouse_buttons.iter_mut().skip(1) {
            *button = self.read_button()?;
        }
        frame.mouse_x = self.reader.read_i32::<LittleEndian>()?;
        frame.mouse_y = self.reader.read_i32::<LittleEndian>()?;
        frame.mouse_z = self.reader.read_i32::<LittleEndian>()?;
        frame.seconds_to_advance = self.reader.read_f32::<LittleEndian>()?;
        for controller in frame.controllers.iter_mut() {
            *controller = self.read_controller()?;
        }
        Ok(Some(frame))
    }

    fn read_controller(&mut self) -> io::Result<ControllerSnapshot> {
        let mut controller = ControllerSnapshot {
            is_connected: self.reader.read_u8()? != 0,
            is_analog: self.reader.read_u8()? != 0,
            stick_average_x: self.reader.read_f32::<LittleEndian>()?,
            stick_average_y: self.reader.read_f32::<LittleEndian>()?,
            ..Default::default()
        };
        for button in Button::ALL {
            *controller.buttons.button_mut(button) = self.read_button()?;
        }
        Ok(controller)
    }

    fn read_button(&mut self) -> io::Result<ButtonState> {
        Ok(ButtonState {
            half_transition_count: self.reader.read_u32::<LittleEndian>()?,
            ended_down: self.reader.read_u8()? != 0,
        })
    }
}
