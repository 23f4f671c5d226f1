//! Symbol lookup tables: base amplitude and octave weighting.

use crate::params::VOICE_COUNT;

/// Base amplitude for any symbol outside the table
pub const DEFAULT_BASE_AMPLITUDE: f64 = 0.18;

/// Base amplitude before vortex gain
pub fn base_amplitude(symbol: char) -> f64 {
    match symbol {
        '0' => 1.00,
        'F' => 0.95,
        'E' => 0.90,
        'D' => 0.85,
        'C' => 0.80,
        'B' => 0.75,
        'A' => 0.70,
        '9' => 0.60,
        '8' => 0.55,
        '7' => 0.50,
        '6' => 0.45,
        '5' => 0.35,
        '4' => 0.25,
        '3' => 0.22,
        '2' => 0.28,
        '1' => 0.20,
        'T' => 0.40,
        'S' => 0.35,
        'L' => 0.00,
        '.' => 0.00,
        ':' => 0.15,
        'm' => 0.00,
        _ => DEFAULT_BASE_AMPLITUDE,
    }
}

/// Which voices a symbol leans on
///
/// Voice 0 is the deepest octave, voice 3 the tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OctaveGroup {
    Deep,
    Mid,
    Bright,
    Silence,
    Uniform,
}

impl OctaveGroup {
    pub fn of(symbol: char) -> Self {
        match symbol {
            '1' | '2' | 'T' | 'S' => Self::Deep,
            '3' | '4' | '5' | '6' | '7' | 'a' => Self::Mid,
            '0' | '8' | '9' | 'F' | 'E' | 'D' | 'C' => Self::Bright,
            'L' | '.' | 'm' => Self::Silence,
            _ => Self::Uniform,
        }
    }

    fn raw_weights(self) -> [f64; VOICE_COUNT] {
        match self {
            Self::Deep => [0.55, 0.30, 0.10, 0.05],
            Self::Mid => [0.25, 0.40, 0.25, 0.10],
            Self::Bright => [0.10, 0.25, 0.30, 0.35],
            Self::Silence => [0.0; VOICE_COUNT],
            Self::Uniform => [0.25; VOICE_COUNT],
        }
    }
}

/// Per-voice weights for a symbol, normalized to sum 1 (silence stays all zero)
pub fn octave_weights(symbol: char) -> [f64; VOICE_COUNT] {
    let mut weights = OctaveGroup::of(symbol).raw_weights();
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        return weights;
    }
    for w in weights.iter_mut() {
        *w /= sum;
    }
    weights
}
