//! Procedural audio output as WAV.
//!
//! Two generators: an ambient pad keyed off prompt keywords (terminal
//! texture strategy) and a carrier-tone voice shaped by word envelopes
//! (terminal vocals strategy). Both are deterministic for a given input.
//!
//! Uses the `hound` crate for WAV writing.

use std::f32::consts::PI;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

/// Fade length at the edges of the pad, in seconds.
const PAD_FADE_SECS: f32 = 1.0;

/// Normalization target below full scale.
const NORMALIZE_TARGET: f32 = 0.7;

/// Speech rate used to size the voice output, in words per minute.
const VOICE_WORDS_PER_MINUTE: f32 = 190.0;

/// Write an ambient pad keyed off the prompt.
///
/// The prompt only selects between a few harmonic recipes; the output
/// for a given (prompt, duration, rate) is fully deterministic.
pub fn write_pad_wav(
    path: &Path,
    prompt: &str,
    duration_secs: u32,
    sample_rate: u32,
    channels: u16,
) -> Result<(), hound::Error> {
    let total = (sample_rate * duration_secs.max(1)) as usize;
    let mut samples = vec![0.0f32; total];
    let prompt_lower = prompt.to_lowercase();

    let calm = ["ambient", "calm", "peaceful", "meditation"];
    let rhythmic = ["techno", "electronic", "edm", "house"];

    if calm.iter().any(|w| prompt_lower.contains(w)) {
        // Slow, ethereal pads.
        mix_sine(&mut samples, sample_rate, 110.0, 0.2);
        mix_sine(&mut samples, sample_rate, 220.0, 0.15);
        mix_sine(&mut samples, sample_rate, 330.0, 0.1);
        mix_sine(&mut samples, sample_rate, 165.0, 0.05);
    } else if rhythmic.iter().any(|w| prompt_lower.contains(w)) {
        // Bass pulse at 120 BPM.
        let beat_interval = (sample_rate / 2) as usize;
        let burst = (sample_rate / 10) as usize;
        for start in (0..total).step_by(beat_interval) {
            let end = (start + burst).min(total);
            for (offset, sample) in samples[start..end].iter_mut().enumerate() {
                let t = offset as f32 / sample_rate as f32;
                *sample += 0.6 * (2.0 * PI * 80.0 * t).sin();
            }
        }
    } else {
        // Generic melodic content: C major triad.
        mix_sine(&mut samples, sample_rate, 262.0, 0.3);
        mix_sine(&mut samples, sample_rate, 330.0, 0.2);
        mix_sine(&mut samples, sample_rate, 392.0, 0.15);
    }

    apply_fade(&mut samples, (sample_rate as f32 * PAD_FADE_SECS) as usize);
    normalize(&mut samples, NORMALIZE_TARGET);
    write_samples(path, &samples, sample_rate, channels)
}

/// Write a robotic voice track shaped by the lyrics.
///
/// A 150 Hz carrier with harmonics, amplitude-modulated into word-like
/// bursts, then low-pass filtered for a vowel-ish timbre. Duration is
/// estimated from the word count at a fixed speech rate.
pub fn write_voice_wav(path: &Path, lyrics: &str, sample_rate: u32) -> Result<(), hound::Error> {
    let words = lyrics.split_whitespace().count().max(1);
    let duration_secs = (words as f32 / VOICE_WORDS_PER_MINUTE * 60.0).max(2.0);
    let total = (sample_rate as f32 * duration_secs) as usize;

    let base_freq = 150.0f32;
    let mut samples = vec![0.0f32; total];
    mix_sine(&mut samples, sample_rate, base_freq, 1.0);
    mix_sine(&mut samples, sample_rate, base_freq * 2.0, 0.3);
    mix_sine(&mut samples, sample_rate, base_freq * 3.0, 0.15);

    // Word-like rhythm: attack/sustain/release per word.
    let word_len = total / words;
    if word_len > 0 {
        let attack = word_len / 10;
        let release = word_len / 5;
        for w in 0..words {
            let start = w * word_len;
            let end = ((w + 1) * word_len).min(total);
            for i in start..end {
                let pos = i - start;
                let env = if pos < attack && attack > 0 {
                    0.3 + 0.7 * pos as f32 / attack as f32
                } else if pos >= (end - start).saturating_sub(release) && release > 0 {
                    let tail = (end - start) - pos;
                    0.3 + 0.7 * tail as f32 / release as f32
                } else {
                    1.0
                };
                samples[i] *= env * 0.4;
            }
        }
    }

    lowpass(&mut samples, sample_rate, 2_000.0);
    normalize(&mut samples, NORMALIZE_TARGET);
    write_samples(path, &samples, sample_rate, 1)
}

/// Add a sine component to the buffer.
fn mix_sine(samples: &mut [f32], sample_rate: u32, freq: f32, amplitude: f32) {
    for (i, sample) in samples.iter_mut().enumerate() {
        let t = i as f32 / sample_rate as f32;
        *sample += amplitude * (2.0 * PI * freq * t).sin();
    }
}

/// Linear fade-in and fade-out at the buffer edges.
fn apply_fade(samples: &mut [f32], fade_len: usize) {
    let fade = fade_len.min(samples.len() / 2);
    if fade == 0 {
        return;
    }
    let len = samples.len();
    for i in 0..fade {
        let gain = i as f32 / fade as f32;
        samples[i] *= gain;
        samples[len - 1 - i] *= gain;
    }
}

/// Scale the buffer so its peak hits the target level.
fn normalize(samples: &mut [f32], target: f32) {
    let peak = samples.iter().fold(0.0f32, |max, s| max.max(s.abs()));
    if peak > 0.0 {
        let gain = target / peak;
        for sample in samples.iter_mut() {
            *sample *= gain;
        }
    }
}

/// One-pole low-pass filter.
fn lowpass(samples: &mut [f32], sample_rate: u32, cutoff_hz: f32) {
    let alpha = 1.0 - (-2.0 * PI * cutoff_hz / sample_rate as f32).exp();
    let mut state = 0.0f32;
    for sample in samples.iter_mut() {
        state += alpha * (*sample - state);
        *sample = state;
    }
}

/// Write mono samples as a 16-bit WAV, duplicating across channels.
fn write_samples(
    path: &Path,
    samples: &[f32],
    sample_rate: u32,
    channels: u16,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(value)?;
        }
    }
    writer.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn pad_exceeds_size_floor_and_matches_spec() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("texture.wav");

        write_pad_wav(&path, "dreamy synthwave", 2, 44_100, 2).unwrap();

        assert!(std::fs::metadata(&path).unwrap().len() > 10_000);
        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().sample_rate, 44_100);
    }

    #[test]
    fn pad_varies_with_prompt_keywords() {
        let dir = tempdir().unwrap();
        let calm = dir.path().join("calm.wav");
        let edm = dir.path().join("edm.wav");

        write_pad_wav(&calm, "peaceful ambient drones", 1, 22_050, 1).unwrap();
        write_pad_wav(&edm, "hard techno", 1, 22_050, 1).unwrap();

        assert_ne!(std::fs::read(&calm).unwrap(), std::fs::read(&edm).unwrap());
    }

    #[test]
    fn voice_duration_scales_with_word_count() {
        let dir = tempdir().unwrap();
        let short = dir.path().join("short.wav");
        let long = dir.path().join("long.wav");

        write_voice_wav(&short, "hello", 22_050).unwrap();
        let many_words = "star ".repeat(100);
        write_voice_wav(&long, &many_words, 22_050).unwrap();

        let short_len = hound::WavReader::open(&short).unwrap().duration();
        let long_len = hound::WavReader::open(&long).unwrap().duration();
        assert!(long_len > short_len);
    }

    #[test]
    fn voice_has_two_second_minimum() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("voice.wav");

        write_voice_wav(&path, "hi", 22_050).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let secs = reader.duration() as f32 / reader.spec().sample_rate as f32;
        assert!(secs >= 2.0);
    }

    #[test]
    fn normalize_hits_target_peak() {
        let mut samples = vec![0.1, -0.2, 0.05];
        normalize(&mut samples, 0.7);
        let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.7).abs() < 1e-6);
    }
}
