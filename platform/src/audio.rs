//! Circular sound device on top of a cpal output stream
//!
//! cpal pulls samples through a callback, so the ring lives on our side: the
//! callback reads from it at the play cursor and the frame loop writes into it
//! through [`SoundDevice::lock_region`]. The write cursor is the play cursor
//! plus one callback's worth of audio, which is what the stream has already
//! committed to the hardware.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use handmade_core::audio::{BYTES_PER_SAMPLE, CHANNELS};
use handmade_core::{Cursors, SoundDevice, SoundDeviceError, SoundRing};
use tracing::{debug, error, info};

/// Ring shared between the frame loop and the audio callback.
struct SharedRing {
    bytes: Mutex<Vec<u8>>,
    ring: SoundRing,
    play_cursor: AtomicU32,
    /// Largest callback seen so far, in bytes
    chunk_bytes: AtomicU32,
    failed: AtomicBool,
}

impl SharedRing {
    fn new(size: u32, min_latency: u32) -> Self {
        Self {
            bytes: Mutex::new(vec![0; size as usize]),
            ring: SoundRing::new(size),
            play_cursor: AtomicU32::new(0),
            chunk_bytes: AtomicU32::new(min_latency),
            failed: AtomicBool::new(false),
        }
    }

    /// Play `out.len()` interleaved samples and advance the play cursor.
    ///
    /// Never blocks: while the frame loop holds the ring this callback plays
    /// silence and leaves the play cursor where it is.
    fn render<T: Copy>(&self, out: &mut [T], silence: T, convert: impl Fn(i16) -> T) {
        let Ok(bytes) = self.bytes.try_lock() else {
            out.fill(silence);
            return;
        };
        let size = self.ring.size() as usize;
        let mut at = self.play_cursor.load(Ordering::Acquire) as usize;
        for sample in out.iter_mut() {
            *sample = convert(i16::from_le_bytes([bytes[at], bytes[at + 1]]));
            at = (at + 2) % size;
        }
        drop(bytes);

        let consumed = (out.len() * 2) as u32;
        self.chunk_bytes.fetch_max(consumed, Ordering::Relaxed);
        self.play_cursor.store(at as u32, Ordering::Release);
    }
}

/// A [`SoundDevice`] backed by the default cpal output device.
pub struct CpalSoundDevice {
    shared: Arc<SharedRing>,
    stream: Option<cpal::Stream>,
}

impl CpalSoundDevice {
    /// Open the default output device at `samples_per_second`, 16-bit stereo,
    /// with a ring of `buffer_size` bytes.
    pub fn open(samples_per_second: u32, buffer_size: u32) -> Result<Self, SoundDeviceError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(SoundDeviceError::Unavailable)?;
        let supported = device
            .default_output_config()
            .map_err(|e| SoundDeviceError::Stream(e.to_string()))?;

        let config = cpal::StreamConfig {
            channels: CHANNELS as u16,
            sample_rate: cpal::SampleRate(samples_per_second),
            buffer_size: cpal::BufferSize::Default,
        };

        // Until the first callback reports its size, assume 10ms in flight.
        let min_latency = (samples_per_second / 100) * BYTES_PER_SAMPLE;
        let mut device_ring = Self::detached(buffer_size, min_latency);
        let shared = Arc::clone(&device_ring.shared);
        let on_error = |e: cpal::StreamError| error!("Audio stream error: {}", e);

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => {
                let shared_error = Arc::clone(&shared);
                device.build_output_stream(
                    &config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        shared.render(data, 0.0, |s| f32::from(s) / 32768.0);
                    },
                    move |e| {
                        shared_error.failed.store(true, Ordering::Release);
                        on_error(e);
                    },
                    None,
                )
            }
            cpal::SampleFormat::I16 => {
                let shared_error = Arc::clone(&shared);
                device.build_output_stream(
                    &config,
                    move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                        shared.render(data, 0, |s| s);
                    },
                    move |e| {
                        shared_error.failed.store(true, Ordering::Release);
                        on_error(e);
                    },
                    None,
                )
            }
            cpal::SampleFormat::U16 => {
                let shared_error = Arc::clone(&shared);
                device.build_output_stream(
                    &config,
                    move |data: &mut [u16], _: &cpal::OutputCallbackInfo| {
                        // 0x8000 is silence for unsigned samples
                        shared.render(data, 0x8000, |s| (s as i32 + 0x8000) as u16);
                    },
                    move |e| {
                        shared_error.failed.store(true, Ordering::Release);
                        on_error(e);
                    },
                    None,
                )
            }
            format => {
                return Err(SoundDeviceError::Stream(format!(
                    "unsupported sample format {:?}",
                    format
                )));
            }
        }
        .map_err(|e| SoundDeviceError::Stream(e.to_string()))?;

        // Built streams may start on their own on some hosts; hold it until
        // the ring has been cleared.
        if let Err(e) = stream.pause() {
            debug!("Could not pause new audio stream: {}", e);
        }

        info!(
            "Audio output: {} Hz, {:?}, {} byte ring",
            samples_per_second,
            supported.sample_format(),
            buffer_size
        );
        device_ring.stream = Some(stream);
        Ok(device_ring)
    }

    /// A ring with no stream behind it. Its play cursor only moves through
    /// [`Self::play`].
    pub fn detached(buffer_size: u32, min_latency: u32) -> Self {
        Self {
            shared: Arc::new(SharedRing::new(buffer_size, min_latency)),
            stream: None,
        }
    }

    /// Consume `samples` interleaved samples as the stream callback would.
    pub fn play(&self, out: &mut [i16]) {
        self.shared.render(out, 0, |s| s);
    }
}

impl SoundDevice for CpalSoundDevice {
    fn buffer_size(&self) -> u32 {
        self.shared.ring.size()
    }

    fn current_cursors(&mut self) -> Result<Cursors, SoundDeviceError> {
        if self.shared.failed.load(Ordering::Acquire) {
            return Err(SoundDeviceError::Stream("output stream failed".into()));
        }
        let play = self.shared.play_cursor.load(Ordering::Acquire);
        let latency = self.shared.chunk_bytes.load(Ordering::Relaxed);
        let latency = latency - latency % BYTES_PER_SAMPLE;
        Ok(Cursors {
            play,
            write: self.shared.ring.add(play, latency),
        })
    }

    fn lock_region(
        &mut self,
        offset: u32,
        len: u32,
        fill: &mut dyn FnMut(&mut [u8], &mut [u8]),
    ) -> Result<(), SoundDeviceError> {
        let size = self.shared.ring.size();
        if offset >= size || len > size {
            return Err(SoundDeviceError::Lock { offset, len });
        }
        let mut bytes = self
            .shared
            .bytes
            .lock()
            .map_err(|_| SoundDeviceError::Lock { offset, len })?;

        let ((_, first_len), (_, second_len)) = self.shared.ring.split_region(offset, len);
        let (head, tail) = bytes.split_at_mut(offset as usize);
        fill(
            &mut tail[..first_len as usize],
            &mut head[..second_len as usize],
        );
        Ok(())
    }

    fn start_playback(&mut self) -> Result<(), SoundDeviceError> {
        let stream = self.stream.as_ref().ok_or(SoundDeviceError::Unavailable)?;
        stream
            .play()
            .map_err(|e| SoundDeviceError::Stream(e.to_string()))
    }
}

/// Stand-in when no output device could be opened. Every query fails, so
/// the frame loop treats sound as invalid and keeps running silently.
#[derive(Debug, Default)]
pub struct NullSoundDevice {
    buffer_size: u32,
}

impl NullSoundDevice {
    pub fn new(buffer_size: u32) -> Self {
        Self { buffer_size }
    }
}

impl SoundDevice for NullSoundDevice {
    fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    fn current_cursors(&mut self) -> Result<Cursors, SoundDeviceError> {
        Err(SoundDeviceError::Unavailable)
    }

    fn lock_region(
        &mut self,
        _offset: u32,
        _len: u32,
        _fill: &mut dyn FnMut(&mut [u8], &mut [u8]),
    ) -> Result<(), SoundDeviceError> {
        Err(SoundDeviceError::Unavailable)
    }

    fn start_playback(&mut self) -> Result<(), SoundDeviceError> {
        Err(SoundDeviceError::Unavailable)
    }
}

/// Open the real device, or fall back to [`NullSoundDevice`].
pub fn open_sound_device(samples_per_second: u32, buffer_size: u32) -> Box<dyn SoundDevice> {
    match CpalSoundDevice::open(samples_per_second, buffer_size) {
        Ok(device) => Box::new(device),
        Err(e) => {
            tracing::warn!("No audio output, running silent: {}", e);
            Box::new(NullSoundDevice::new(buffer_size))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_all(device: &mut CpalSoundDevice, offset: u32, len: u32, value: u8) {
        device
            .lock_region(offset, len, &mut |first, second| {
                first.fill(value);
                second.fill(value);
            })
            .unwrap();
    }

    #[test]
    fn test_write_cursor_leads_by_callback_size() {
        let mut device = CpalSoundDevice::detached(64, 8);
        assert_eq!(device.current_cursors().unwrap(), Cursors { play: 0, write: 8 });

        let mut out = [0i16; 8];
        device.play(&mut out);
        assert_eq!(
            device.current_cursors().unwrap(),
            Cursors {
                play: 16,
                write: 32
            }
        );
    }

    #[test]
    fn test_play_wraps_and_reads_written_samples() {
        let mut device = CpalSoundDevice::detached(16, 4);
        write_all(&mut device, 12, 8, 0x01);

        let mut skip = [0i16; 6];
        device.play(&mut skip);
        let mut out = [0i16; 4];
        device.play(&mut out);

        assert_eq!(out, [0x0101; 4]);
        assert_eq!(device.current_cursors().unwrap().play, 4);
    }

    #[test]
    fn test_contended_ring_plays_silence() {
        let shared = SharedRing::new(16, 4);
        shared.bytes.lock().unwrap().fill(0x01);

        let held = shared.bytes.lock().unwrap();
        let mut out = [7u16; 4];
        shared.render(&mut out, 0x8000, |s| (s as i32 + 0x8000) as u16);
        drop(held);
        assert_eq!(out, [0x8000; 4]);
        assert_eq!(shared.play_cursor.load(Ordering::Acquire), 0);

        shared.render(&mut out, 0x8000, |s| (s as i32 + 0x8000) as u16);
        assert_eq!(out, [0x8101; 4]);
        assert_eq!(shared.play_cursor.load(Ordering::Acquire), 8);
    }

    #[test]
    fn test_lock_region_splits_at_end() {
        let mut device = CpalSoundDevice::detached(16, 4);
        let mut spans = (0, 0);
        device
            .lock_region(12, 8, &mut |first, second| {
                spans = (first.len(), second.len());
            })
            .unwrap();
        assert_eq!(spans, (4, 4));
    }

    #[test]
    fn test_lock_region_rejects_out_of_range() {
        let mut device = CpalSoundDevice::detached(16, 4);
        let err = device.lock_region(16, 4, &mut |_, _| {}).unwrap_err();
        assert_eq!(err, SoundDeviceError::Lock { offset: 16, len: 4 });
        assert!(device.lock_region(0, 17, &mut |_, _| {}).is_err());
    }

    #[test]
    fn test_detached_device_cannot_start() {
        let mut device = CpalSoundDevice::detached(16, 4);
        assert_eq!(device.start_playback(), Err(SoundDeviceError::Unavailable));
    }

    #[test]
    fn test_null_device_always_fails() {
        let mut device = NullSoundDevice::new(1024);
        assert_eq!(device.buffer_size(), 1024);
        assert!(device.current_cursors().is_err());
        assert!(device.lock_region(0, 4, &mut |_, _| {}).is_err());
    }
}
