use log::debug;

use super::{ch, NoteSet, NoteSink, Pedal, CHANNELS};

#[derive(Debug, Clone, Copy, Default)]
struct SostenutoChannel {
    pressed: bool,
    /// Notes physically down right now, regardless of the pedal.
    pre_pedal: NoteSet,
    /// Snapshot of `pre_pedal` taken when the pedal went down.
    pedal: NoteSet,
    held: NoteSet,
}

/// Sostenuto pedal: only the notes already down when the pedal is pressed
/// are sustained. Notes struck afterwards behave as if no pedal were down.
#[derive(Debug)]
pub struct SostenutoPedal<S> {
    channels: [SostenutoChannel; CHANNELS],
    downstream: S,
}

impl<S: NoteSink> SostenutoPedal<S> {
    pub fn new(downstream: S) -> Self {
        Self {
            channels: [SostenutoChannel::default(); CHANNELS],
            downstream,
        }
    }

    pub fn is_held(&self, channel: u8, note: u8) -> bool {
        self.channels[ch(channel)].held.contains(note)
    }

    /// Notes captured by the current press on `channel`.
    pub fn captured_notes(&self, channel: u8) -> NoteSet {
        self.channels[ch(channel)].pedal
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
}

impl<S: NoteSink> Pedal for SostenutoPedal<S> {
    fn press(&mut self, channel: u8) {
        let state = &mut self.channels[ch(channel)];
        state.pressed = true;
        state.pedal = state.pre_pedal;
        debug!(
            "sostenuto pressed on channel {}, capturing {} notes",
            channel & 0x0F,
            state.pedal.len()
        );
    }

    fn release(&mut self, channel: u8) {
        let state = &mut self.channels[ch(channel)];
        state.pressed = false;
        state.pedal.clear();
        let held = state.held.take();
        debug!("sostenuto released on channel {}", channel & 0x0F);
        for note in held.iter() {
            self.downstream.note_off(channel & 0x0F, note);
        }
    }

    fn is_pressed(&self, channel: u8) -> bool {
        self.channels[ch(channel)].pressed
    }
}

impl<S: NoteSink> NoteSink for SostenutoPedal<S> {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        let state = &mut self.channels[ch(channel)];
        state.pre_pedal.insert(note);
        if state.pressed {
            state.held.remove(note);
        }
        self.downstream.note_on(channel & 0x0F, note & 0x7F, velocity);
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        let state = &mut self.channels[ch(channel)];
        state.pre_pedal.remove(note);
        if state.pressed && state.pedal.contains(note) {
            state.held.insert(note);
        } else {
            self.downstream.note_off(channel & 0x0F, note & 0x7F);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pedal::NoteMessage::{self, NoteOff};

    fn pedal() -> SostenutoPedal<Vec<NoteMessage>> {
        SostenutoPedal::new(Vec::new())
    }

    fn offs(pedal: &SostenutoPedal<Vec<NoteMessage>>) -> Vec<u8> {
        pedal
            .downstream()
            .iter()
            .filter_map(|m| match m {
                NoteOff { note, .. } => Some(*note),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn captures_notes_down_at_press() {
        let mut pedal = pedal();
        pedal.note_on(0, 60, 100);
        pedal.press(0);
        pedal.note_off(0, 60);
        assert!(pedal.is_held(0, 60));
        assert!(offs(&pedal).is_empty());

        pedal.release(0);
        assert_eq!(offs(&pedal), vec![60]);
        assert!(pedal.captured_notes(0).is_empty());
    }

    #[test]
    fn ignores_notes_struck_after_press() {
        let mut pedal = pedal();
        pedal.press(0);
        pedal.note_on(0, 64, 100);
        pedal.note_off(0, 64);
        assert!(!pedal.is_held(0, 64));
        assert_eq!(offs(&pedal), vec![64]);
        assert!(pedal.is_pressed(0));
    }

    #[test]
    fn notes_released_before_press_are_not_captured() {
        let mut pedal = pedal();
        pedal.note_on(0, 60, 100);
        pedal.note_off(0, 60);
        pedal.press(0);
        assert!(pedal.captured_notes(0).is_empty());
    }

    #[test]
    fn restrike_of_captured_note_stays_captured() {
        let mut pedal = pedal();
        pedal.note_on(0, 60, 100);
        pedal.press(0);
        pedal.note_off(0, 60);
        pedal.note_on(0, 60, 100);
        assert!(!pedal.is_held(0, 60));
        pedal.note_off(0, 60);
        assert!(pedal.is_held(0, 60));
        assert!(offs(&pedal).is_empty());
    }

    #[test]
    fn mixed_captured_and_free_notes() {
        let mut pedal = pedal();
        pedal.note_on(0, 48, 100);
        pedal.note_on(0, 52, 100);
        pedal.press(0);
        pedal.note_on(0, 55, 100);
        for note in [48, 52, 55] {
            pedal.note_off(0, note);
        }
        assert_eq!(offs(&pedal), vec![55]);
        pedal.release(0);
        assert_eq!(offs(&pedal), vec![55, 48, 52]);
    }

    #[test]
    fn held_is_subset_of_captured() {
        let mut pedal = pedal();
        for note in [40, 41, 42] {
            pedal.note_on(3, note, 100);
        }
        pedal.press(3);
        for note in [41, 42, 43, 44] {
            pedal.note_on(3, note, 100);
            pedal.note_off(3, note);
        }
        let captured = pedal.captured_notes(3);
        for note in 0..128u8 {
            if pedal.is_held(3, note) {
                assert!(captured.contains(note));
            }
        }
    }

    #[test]
    fn channels_are_independent() {
        let mut pedal = pedal();
        pedal.note_on(0, 60, 100);
        pedal.note_on(1, 60, 100);
        pedal.press(1);
        pedal.note_off(0, 60);
        pedal.note_off(1, 60);
        assert_eq!(offs(&pedal), vec![60]);
        assert!(pedal.is_held(1, 60));
        assert!(!pedal.is_held(0, 60));
    }
}
