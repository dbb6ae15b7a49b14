use log::{debug, warn};

use super::{ch, NoteSink, Pedal, CHANNELS};
use crate::error::ParameterError;

pub const DEFAULT_SOFTEN_FACTOR: f32 = 2.0 / 3.0;

/// Soft pedal: attenuates the velocity of notes struck while pressed.
///
/// It never touches note-offs or note durations.
#[derive(Debug)]
pub struct SoftPedal<S> {
    pressed: [bool; CHANNELS],
    soften_factor: f32,
    downstream: S,
}

impl<S: NoteSink> SoftPedal<S> {
    pub fn new(downstream: S) -> Self {
        Self {
            pressed: [false; CHANNELS],
            soften_factor: DEFAULT_SOFTEN_FACTOR,
            downstream,
        }
    }

    pub fn soften_factor(&self) -> f32 {
        self.soften_factor
    }

    /// Set the velocity multiplier; values outside `(0, 1]` are rejected.
    pub fn set_soften_factor(&mut self, factor: f32) -> Result<(), ParameterError> {
        if !(factor > 0.0 && factor <= 1.0) {
            warn!("rejecting soften factor {factor}");
            return Err(ParameterError::SoftenFactor(factor));
        }
        self.soften_factor = factor;
        Ok(())
    }

    pub fn downstream(&self) -> &S {
        &self.downstream
    }

    pub fn downstream_mut(&mut self) -> &mut S {
        &mut self.downstream
    }

    pub fn set_downstream(&mut self, downstream: S) -> S {
        std::mem::replace(&mut self.downstream, downstream)
    }

    pub fn into_downstream(self) -> S {
        self.downstream
    }

    fn soften(&self, velocity: u8) -> u8 {
        ((velocity & 0x7F) as f32 * self.soften_factor)
            .round()
            .clamp(0.0, 127.0) as u8
    }
}

impl<S: NoteSink> Pedal for SoftPedal<S> {
    fn press(&mut self, channel: u8) {
        debug!("soft pedal pressed on channel {}", channel & 0x0F);
        self.pressed[ch(channel)] = true;
    }

    fn release(&mut self, channel: u8) {
        debug!("soft pedal released on channel {}", channel & 0x0F);
        self.pressed[ch(channel)] = false;
    }

    fn is_pressed(&self, channel: u8) -> bool {
        self.pressed[ch(channel)]
    }
}

impl<S: NoteSink> NoteSink for SoftPedal<S> {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let velocity = if self.pressed[ch(channel)] {
            self.soften(velocity)
        } else {
            velocity
        };
        self.downstream.note_on(channel & 0x0F, note & 0x7F, velocity);
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        self.downstream.note_off(channel & 0x0F, note & 0x7F);
    }
}
