/// Sound engine: procedural 8-bit style cues via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).

use crate::sim::resolver::Outcome;

/// One sound cue per move outcome.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cue {
    Step,
    Bump,
    Scare,
    Defeat,
    Victory,
}

impl Cue {
    pub fn for_outcome(outcome: Outcome) -> Cue {
        match outcome {
            Outcome::Relocate => Cue::Step,
            Outcome::Blocked => Cue::Bump,
            Outcome::Reset => Cue::Scare,
            Outcome::Defeat => Cue::Defeat,
            Outcome::Victory => Cue::Victory,
        }
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Cue;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    /// Pre-generated WAV buffers for each cue.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_step: Arc<Vec<u8>>,
        sfx_bump: Arc<Vec<u8>>,
        sfx_scare: Arc<Vec<u8>>,
        sfx_defeat: Arc<Vec<u8>>,
        sfx_victory: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("no audio output, sound disabled: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_step: Arc::new(make_wav(&gen_step())),
                sfx_bump: Arc::new(make_wav(&gen_bump())),
                sfx_scare: Arc::new(make_wav(&gen_scare())),
                sfx_defeat: Arc::new(make_wav(&gen_defeat())),
                sfx_victory: Arc::new(make_wav(&gen_victory())),
            })
        }

        pub fn play(&self, cue: Cue) {
            let buf = match cue {
                Cue::Step => &self.sfx_step,
                Cue::Bump => &self.sfx_bump,
                Cue::Scare => &self.sfx_scare,
                Cue::Defeat => &self.sfx_defeat,
                Cue::Victory => &self.sfx_victory,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn samples(duration: f32) -> usize {
        (SAMPLE_RATE as f32 * duration) as usize
    }

    /// Footstep: very short soft tick
    fn gen_step() -> Vec<f32> {
        let n = samples(0.03);
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                (t * 180.0 * TAU).sin() * env * env * 0.2
            })
            .collect()
    }

    /// Wall bump: low thud with a fast decay
    fn gen_bump() -> Vec<f32> {
        let n = samples(0.14);
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                let freq = 110.0 - p * 50.0;
                (t * freq * TAU).sin() * (1.0 - p).powf(2.0) * 0.45
            })
            .collect()
    }

    /// Bats: fluttering noise with a wobbling pitch
    fn gen_scare() -> Vec<f32> {
        let n = samples(0.5);
        let mut rng: u32 = 2024;
        (0..n)
            .map(|i| {
                let p = i as f32 / n as f32;
                let t = i as f32 / SAMPLE_RATE as f32;
                let flutter = ((t * 28.0 * TAU).sin() * 0.5 + 0.5).powf(3.0);
                let freq = 1400.0 + (t * 9.0 * TAU).sin() * 400.0;
                let tone = (t * freq * TAU).sin();
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                (tone * 0.5 + noise * 0.5) * flutter * (1.0 - p) * 0.25
            })
            .collect()
    }

    /// Dino: sad descending tone
    fn gen_defeat() -> Vec<f32> {
        let notes = [440.0_f32, 370.0, 311.0, 261.0]; // A4→F#4→Eb4→C4
        let mut out = Vec::new();
        for &freq in &notes {
            let n = samples(0.12);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                out.push((t * freq * TAU).sin() * env * 0.3);
            }
        }
        // Final fade
        let fade_len = out.len() / 4;
        let total = out.len();
        for (k, s) in out[total - fade_len..].iter_mut().enumerate() {
            *s *= (fade_len - k) as f32 / fade_len as f32;
        }
        out
    }

    /// Wheel: victory ascending fanfare
    fn gen_victory() -> Vec<f32> {
        let notes = [523.0_f32, 659.0, 784.0, 1047.0]; // C5→E5→G5→C6
        let mut out = Vec::new();
        for &freq in &notes {
            let n = samples(0.1);
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                let wave = (t * freq * TAU).sin() * 0.6
                    + (t * freq * 2.0 * TAU).sin() * 0.3
                    + (t * freq * 3.0 * TAU).sin() * 0.1;
                out.push(wave * env * 0.3);
            }
        }
        // Sustain the last note
        let n = samples(0.25);
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            out.push((t * 1047.0 * TAU).sin() * env * 0.3);
        }
        out
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _cue: Cue) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_outcome_has_a_cue() {
        assert_eq!(Cue::for_outcome(Outcome::Blocked), Cue::Bump);
        assert_eq!(Cue::for_outcome(Outcome::Reset), Cue::Scare);
        assert_eq!(Cue::for_outcome(Outcome::Relocate), Cue::Step);
        assert_eq!(Cue::for_outcome(Outcome::Defeat), Cue::Defeat);
        assert_eq!(Cue::for_outcome(Outcome::Victory), Cue::Victory);
    }
}
