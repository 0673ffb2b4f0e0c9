//! Tone synthesis

use std::f32::consts::TAU;

pub const TONE_VOLUME: f32 = 3000.0;

/// Write a sine at `tone_hz` into interleaved stereo `samples`.
///
/// `phase` is carried between calls so consecutive writes join without clicks.
pub fn output_sine(phase: &mut f32, tone_hz: f32, samples_per_second: u32, samples: &mut [i16]) {
    if samples_per_second == 0 || tone_hz <= 0.0 {
        samples.fill(0);
        return;
    }
    let step = TAU * tone_hz / samples_per_second as f32;
    for frame in samples.chunks_exact_mut(2) {
        let value = (phase.sin() * TONE_VOLUME) as i16;
        frame[0] = value;
        frame[1] = value;
        *phase += step;
        if *phase > TAU {
            *phase -= TAU;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_match_and_stay_in_volume() {
        let mut phase = 0.0;
        let mut samples = vec![0i16; 960];
        output_sine(&mut phase, 256.0, 48_000, &mut samples);

        for frame in samples.chunks_exact(2) {
            assert_eq!(frame[0], frame[1]);
            assert!(frame[0].unsigned_abs() <= TONE_VOLUME as u16);
        }
        assert!(samples.iter().any(|&s| s != 0));
        assert!((0.0..=TAU).contains(&phase));
    }

    #[test]
    fn test_phase_continues_across_calls() {
        let mut whole_phase = 0.0;
        let mut whole = vec![0i16; 400];
        output_sine(&mut whole_phase, 300.0, 48_000, &mut whole);

        let mut split_phase = 0.0;
        let mut first = vec![0i16; 200];
        let mut second = vec![0i16; 200];
        output_sine(&mut split_phase, 300.0, 48_000, &mut first);
        output_sine(&mut split_phase, 300.0, 48_000, &mut second);

        assert_eq!(&whole[..200], &first[..]);
        assert_eq!(&whole[200..], &second[..]);
    }

    #[test]
    fn test_silent_without_rate() {
        let mut phase = 1.0;
        let mut samples = vec![7i16; 8];
        output_sine(&mut phase, 256.0, 0, &mut samples);
        assert!(samples.iter().all(|&s| s == 0));
        assert_eq!(phase, 1.0);
    }
}
