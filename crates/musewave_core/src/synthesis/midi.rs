//! Procedural melody output as a Standard MIDI File.
//!
//! Generates a I-V-vi-IV chord progression with an arpeggiated lead an
//! octave above each chord root. Output is SMF format 0 (single track).
//!
//! Uses the `midly` crate for MIDI writing.

use std::path::Path;

use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

/// Beats each chord is held for.
const BEATS_PER_CHORD: u32 = 4;

/// Chord velocity.
const CHORD_VELOCITY: u8 = 80;

/// Lead line velocity.
const LEAD_VELOCITY: u8 = 100;

/// Map a key name to its root MIDI note (octave 4).
fn key_root(key: &str) -> u8 {
    match key.split_whitespace().next().unwrap_or("C") {
        "C" => 60,
        "C#" => 61,
        "D" => 62,
        "D#" => 63,
        "E" => 64,
        "F" => 65,
        "F#" => 66,
        "G" => 67,
        "G#" => 68,
        "A" => 69,
        "A#" => 70,
        "B" => 71,
        _ => 60,
    }
}

/// I - V - vi - IV progression as triads over the given root.
fn progression(root: u8) -> [[u8; 3]; 4] {
    [
        [root, root + 4, root + 7],
        [root + 7, root + 11, root + 14],
        [root + 9, root + 12, root + 16],
        [root + 5, root + 9, root + 12],
    ]
}

/// One note event at an absolute tick, before delta conversion.
struct NoteEvent {
    tick: u32,
    on: bool,
    key: u8,
    vel: u8,
}

/// Write a chord-progression melody to a MIDI file.
pub fn write_progression_midi(
    path: &Path,
    duration_secs: u32,
    bpm: u32,
    key: &str,
) -> std::io::Result<()> {
    let smf = progression_smf(duration_secs, bpm, key);
    smf.save(path)
}

/// Build the progression as an in-memory SMF.
fn progression_smf(duration_secs: u32, bpm: u32, key: &str) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::SingleTrack,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let root = key_root(key);
    let chords = progression(root);
    let total_beats = (duration_secs * bpm / 60).max(BEATS_PER_CHORD);
    let ticks_per_beat = TICKS_PER_QUARTER as u32;

    let mut events: Vec<NoteEvent> = Vec::new();
    let mut beat = 0u32;
    'outer: loop {
        for chord in &chords {
            let start = beat * ticks_per_beat;
            let end = (beat + BEATS_PER_CHORD) * ticks_per_beat;

            for &note in chord {
                events.push(NoteEvent {
                    tick: start,
                    on: true,
                    key: note,
                    vel: CHORD_VELOCITY,
                });
                events.push(NoteEvent {
                    tick: end,
                    on: false,
                    key: note,
                    vel: 0,
                });
            }

            // Arpeggiated lead an octave above the chord root.
            let lead = chord[0] + 12;
            for (i, offset) in [0u8, 2, 4, 2].iter().enumerate() {
                let note_start = start + i as u32 * ticks_per_beat;
                events.push(NoteEvent {
                    tick: note_start,
                    on: true,
                    key: lead + offset,
                    vel: LEAD_VELOCITY,
                });
                events.push(NoteEvent {
                    tick: note_start + ticks_per_beat,
                    on: false,
                    key: lead + offset,
                    vel: 0,
                });
            }

            beat += BEATS_PER_CHORD;
            if beat >= total_beats {
                break 'outer;
            }
        }
    }

    // Note-offs first at equal ticks so repeated pitches are not cut off.
    events.sort_by_key(|e| (e.tick, e.on));

    let mut track: Track<'static> = Vec::new();
    let tempo_us = 60_000_000 / bpm;
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::Tempo(u24::new(tempo_us))),
    });

    let channel = u4::new(0);
    let mut last_tick = 0u32;
    for event in events {
        let delta = event.tick - last_tick;
        last_tick = event.tick;

        let message = if event.on {
            MidiMessage::NoteOn {
                key: u7::new(event.key),
                vel: u7::new(event.vel),
            }
        } else {
            MidiMessage::NoteOff {
                key: u7::new(event.key),
                vel: u7::new(0),
            }
        };

        track.push(TrackEvent {
            delta: u28::new(delta),
            kind: TrackEventKind::Midi { channel, message },
        });
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);

    smf
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_a_parseable_midi_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("melody.mid");

        write_progression_midi(&path, 30, 120, "C").unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.len() >= 200);
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.tracks.len(), 1);
    }

    #[test]
    fn output_is_deterministic() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.mid");
        let b = dir.path().join("b.mid");

        write_progression_midi(&a, 30, 120, "D").unwrap();
        write_progression_midi(&b, 30, 120, "D").unwrap();

        assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
    }

    #[test]
    fn short_duration_still_produces_one_progression_round() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tiny.mid");

        write_progression_midi(&path, 1, 120, "C").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn unknown_key_defaults_to_c() {
        assert_eq!(key_root("H minor"), 60);
        assert_eq!(key_root("G"), 67);
        assert_eq!(key_root("F# major"), 66);
    }
}
