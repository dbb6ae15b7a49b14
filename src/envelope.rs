//! Time-driven ADSR envelope used for the brightness of every lit note.
//!
//! The envelope never reads a clock. Callers hand it a monotonically
//! non-decreasing timestamp on every [`AdsrEnvelope::tick`], and each phase
//! measures its progress from the first tick it sees. That makes the phase
//! durations independent of how often the render loop runs: a late tick
//! delays progress, it never stretches or shortens a phase.
//!
//! ```text
//!  output
//!   1.0 ┐   ╱╲
//!       │  ╱  ╲
//!    S  │ ╱    ╲__________
//!       │╱                ╲
//!   0.0 └──────────────────╲──→ time
//!        A   D    S        R
//! ```

/// Phase of an [`AdsrEnvelope`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeState {
    #[default]
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Linear attack/decay/sustain/release envelope with output in `[0, 1]`.
#[derive(Debug, Clone, Default)]
pub struct AdsrEnvelope {
    state: EnvelopeState,
    output: f32,
    /// Anchor of the current phase, set by the first tick of that phase.
    last_time: Option<u64>,
    /// Output value the current phase started from.
    start: f32,
    target: f32,
    attack_time: u64,
    decay_time: u64,
    sustain_level: f32,
    release_time: u64,
}

/// Linear interpolation from `start` to `target` over `duration`.
///
/// A zero duration is an infinite rate and lands on `target` immediately,
/// so degenerate timings never divide by zero.
fn ramp(start: f32, target: f32, elapsed: u64, duration: u64) -> f32 {
    if duration == 0 || elapsed >= duration {
        return target;
    }
    start + (target - start) * (elapsed as f32 / duration as f32)
}

impl AdsrEnvelope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart the envelope from silence in the attack phase.
    ///
    /// Times are in the caller's tick unit. `sustain_level` is clamped to
    /// `[0, 1]`. The release time is stored and only used once
    /// [`note_off`](Self::note_off) arrives.
    pub fn note_on(
        &mut self,
        attack_time: u64,
        decay_time: u64,
        sustain_level: f32,
        release_time: u64,
    ) {
        self.state = EnvelopeState::Attack;
        self.output = 0.0;
        self.last_time = None;
        self.start = 0.0;
        self.target = 1.0;
        self.attack_time = attack_time;
        self.decay_time = decay_time;
        self.sustain_level = if sustain_level.is_nan() {
            0.0
        } else {
            sustain_level.clamp(0.0, 1.0)
        };
        self.release_time = release_time;
    }

    /// Enter the release phase from wherever the envelope currently is.
    ///
    /// Does nothing while idle. An envelope that is already silent releases
    /// on its next tick.
    pub fn note_off(&mut self) {
        if self.state == EnvelopeState::Idle {
            return;
        }
        self.state = EnvelopeState::Release;
        self.last_time = None;
        self.start = self.output;
        self.target = 0.0;
    }

    /// Advance the envelope to `time`.
    pub fn tick(&mut self, time: u64) {
        if self.state == EnvelopeState::Idle {
            return;
        }
        let anchor = *self.last_time.get_or_insert(time);
        let elapsed = time.saturating_sub(anchor);

        match self.state {
            EnvelopeState::Idle => {}
            EnvelopeState::Attack => {
                self.output = ramp(self.start, self.target, elapsed, self.attack_time);
                if self.output >= self.target {
                    self.output = self.target;
                    self.start = self.target;
                    self.target = self.sustain_level;
                    self.last_time = None;
                    self.state = EnvelopeState::Decay;
                }
            }
            EnvelopeState::Decay => {
                self.output = ramp(self.start, self.target, elapsed, self.decay_time);
                if self.output <= self.target {
                    self.output = self.target;
                    self.last_time = None;
                    self.state = EnvelopeState::Sustain;
                }
            }
            EnvelopeState::Sustain => {
                // Re-anchor every tick so a later release starts its own clock.
                self.last_time = None;
                if self.sustain_level == 0.0 {
                    self.output = 0.0;
                    self.state = EnvelopeState::Idle;
                }
            }
            EnvelopeState::Release => {
                self.output = ramp(self.start, self.target, elapsed, self.release_time);
                if self.output <= self.target {
                    self.output = 0.0;
                    self.last_time = None;
                    self.state = EnvelopeState::Idle;
                }
            }
        }
    }

    /// Current intensity in `[0, 1]`; zero while idle.
    pub fn output(&self) -> f32 {
        self.output
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == EnvelopeState::Idle
    }
}
