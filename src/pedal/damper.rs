use log::debug;

use super::{ch, NoteSet, NoteSink, Pedal, CHANNELS};

#[derive(Debug, Clone, Copy, Default)]
struct DamperChannel {
    pressed: bool,
    held: NoteSet,
}

/// Damper (sustain) pedal: while pressed, every note-off is held back and
/// replayed when the pedal is released, no matter when the note was struck.
#[derive(Debug)]
pub struct DamperPedal<S> {
    channels: [DamperChannel; CHANNELS],
    downstream: S,
}

impl<S: NoteSink> DamperPedal<S> {
    pub fn new(downstream: S) -> Self {
        Self {
            channels: [DamperChannel::default(); CHANNELS],
            downstream,
        }
    }

    /// Whether `note` has a pending note-off on `channel`.
    pub fn is_held(&self, channel: u8, note: u8) -> bool {
        self.channels[ch(channel)].held.contains(note)
    }

    pub fn held_notes(&self, channel: u8) -> NoteSet {
        self.channels[ch(channel)].held
    }

    pub fn downstream(&self) -> &S {
        &self.downstream
    }

    pub fn downstream_mut(&mut self) -> &mut S {
        &mut self.downstream
    }

    /// Replace the downstream sink, returning the previous one.
    pub fn set_downstream(&mut self, downstream: S) -> S {
        std::mem::replace(&mut self.downstream, downstream)
    }

    pub fn into_downstream(self) -> S {
        self.downstream
    }
}

impl<S: NoteSink> Pedal for DamperPedal<S> {
    fn press(&mut self, channel: u8) {
        debug!("damper pressed on channel {}", channel & 0x0F);
        self.channels[ch(channel)].pressed = true;
    }

    fn release(&mut self, channel: u8) {
        let state = &mut self.channels[ch(channel)];
        state.pressed = false;
        let held = state.held.take();
        debug!(
            "damper released on channel {}, flushing {} notes",
            channel & 0x0F,
            held.len()
        );
        for note in held.iter() {
            self.downstream.note_off(channel & 0x0F, note);
        }
    }

    fn is_pressed(&self, channel: u8) -> bool {
        self.channels[ch(channel)].pressed
    }
}

impl<S: NoteSink> NoteSink for DamperPedal<S> {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        // Re-striking a held note cancels its pending note-off.
        self.channels[ch(channel)].held.remove(note);
        self.downstream.note_on(channel & 0x0F, note & 0x7F, velocity);
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        let state = &mut self.channels[ch(channel)];
        if state.pressed {
            state.held.insert(note);
        } else {
            self.downstream.note_off(channel & 0x0F, note & 0x7F);
        }
    }
}
