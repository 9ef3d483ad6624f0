//! Tone sequences for UI feedback.

/// Notes played together, e.g. `&["C5", "D4"]`.
pub type Chord = &'static [&'static str];

/// A fixed melody and its per-step duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sequence {
    pub steps: &'static [Chord],
    pub step_ms: u32,
}

pub const STARTUP: Sequence = Sequence {
    steps: &[&["C3"], &["F3"], &["A3"], &["F3", "A3", "C3"], &["F3", "A3", "C3"]],
    step_ms: 130,
};
pub const NEXT: Sequence = Sequence {
    steps: &[&["C5", "D4"], &["A4"]],
    step_ms: 80,
};
pub const PREVIOUS: Sequence = Sequence {
    steps: &[&["B3", "C5"], &["A4"]],
    step_ms: 80,
};
pub const JUMP: Sequence = Sequence {
    steps: &[&["G3"]],
    step_ms: 100,
};
pub const UNMUTE: Sequence = Sequence {
    steps: &[&["C4"], &["G4"], &["G4"]],
    step_ms: 100,
};
pub const RELOAD: Sequence = Sequence {
    steps: &[&["F3"], &["A3"], &["C3"]],
    step_ms: 100,
};
pub const LAUNCH: Sequence = Sequence {
    steps: &[&["C4"], &["B4"], &["C5"], &["C5"]],
    step_ms: 100,
};

/// Fire-and-forget tone playback.
pub trait Beeper {
    fn play(&mut self, steps: &[Chord], step_ms: u32, volume: u8);
}

/// Plays `sequence` when UI sound is enabled.
pub fn chime<B: Beeper>(beeper: &mut B, sequence: Sequence, enabled: bool, volume: u8) {
    if enabled {
        beeper.play(sequence.steps, sequence.step_ms, volume);
    }
}
