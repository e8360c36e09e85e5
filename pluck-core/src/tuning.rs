//! # Musical Tuning Module
//!
//! Note naming, cents math, and the standard-tuning string table for a
//! six-string guitar. All calculations use equal temperament with
//! A4 = 440 Hz.
//!
//! ## Features
//! - Chromatic note naming for arbitrary frequencies
//! - Cent deviation calculations for tuning accuracy
//! - Open-string table computed from equal temperament
//! - Octave folding toward a locked target string

use once_cell::sync::Lazy;

/// Placeholder shown when no pitch is available.
pub const NO_NOTE: &str = "—";

/// Chromatic note names, starting at C.
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A single open string of the instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuitarString {
    /// Note name (e.g. "A2")
    pub name: &'static str,
    /// Equal-tempered frequency in Hz
    pub frequency: f32,
}

/// Statically computed open strings for standard tuning, low E to high E.
///
/// The frequencies are derived from the MIDI note numbers of the open
/// strings using f = 440 * 2^((midi - 69) / 12), so E2 comes out at
/// 82.41 Hz, A2 at exactly 110 Hz, and so on up to E4 at 329.63 Hz.
static STANDARD_TUNING: Lazy<[GuitarString; 6]> = Lazy::new(|| {
    const STRINGS: [(&str, i32); 6] = [
        ("E2", 40),
        ("A2", 45),
        ("D3", 50),
        ("G3", 55),
        ("B3", 59),
        ("E4", 64),
    ];
    STRINGS.map(|(name, midi)| GuitarString {
        name,
        frequency: 440.0 * 2.0_f32.powf((midi - 69) as f32 / 12.0),
    })
});

/// The six open strings of standard tuning, low E to high E.
pub fn standard_tuning() -> &'static [GuitarString; 6] {
    &STANDARD_TUNING
}

/// Finds the open string closest to a given frequency.
///
/// Used for automatic string detection when no target is locked.
///
/// # Arguments
/// * `freq` - Input frequency in Hz
pub fn nearest_string(freq: f32) -> GuitarString {
    *STANDARD_TUNING
        .iter()
        .min_by(|a, b| {
            let diff_a = (a.frequency - freq).abs();
            let diff_b = (b.frequency - freq).abs();
            diff_a.partial_cmp(&diff_b).unwrap()
        })
        .unwrap() // This is safe as the table is never empty.
}

/// Names the equal-tempered note nearest to a frequency.
///
/// The note is derived through the MIDI number,
/// midi = round(12 * log2(f / 440) + 69), with the octave changing at C.
/// Non-positive frequencies have no note and map to [`NO_NOTE`].
///
/// # Arguments
/// * `frequency` - Input frequency in Hz
///
/// # Returns
/// * Note name with octave (e.g. "E2", "G#3"), or "—"
pub fn note_name(frequency: f32) -> String {
    if frequency <= 0.0 {
        return NO_NOTE.to_string();
    }
    let midi = (12.0 * (frequency / 440.0).log2() + 69.0).round() as i32;
    let name = NOTE_NAMES[midi.rem_euclid(12) as usize];
    let octave = midi.div_euclid(12) - 1;
    format!("{}{}", name, octave)
}

/// Calculates the deviation from a target frequency in cents.
///
/// Cents are a logarithmic unit of pitch measurement where:
/// - 100 cents = 1 semitone
/// - 1200 cents = 1 octave
/// - Positive values indicate sharpness, negative values indicate flatness
///
/// # Arguments
/// * `freq` - Measured frequency in Hz
/// * `target_freq` - Target frequency in Hz
pub fn cents_deviation(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}

/// Folds a detected frequency into the octave of a target frequency.
///
/// Autocorrelation occasionally locks onto the first or second harmonic
/// instead of the fundamental. Halving while above 1.5x the target and
/// doubling while below 0.75x resolves that ambiguity; the result always
/// lands in [0.75 * target, 1.5 * target] for positive inputs.
///
/// # Arguments
/// * `frequency` - Detected frequency in Hz
/// * `target` - Frequency of the locked string in Hz
pub fn fold_to_octave(mut frequency: f32, target: f32) -> f32 {
    if frequency <= 0.0 || target <= 0.0 {
        return frequency;
    }
    while frequency > target * 1.5 {
        frequency /= 2.0;
    }
    while frequency < target * 0.75 {
        frequency *= 2.0;
    }
    frequency
}
