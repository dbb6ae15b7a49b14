//! Piano pedal emulation over a stream of note-on/note-off messages.
//!
//! Every pedal sits between an event source and exactly one downstream
//! [`NoteSink`]. It forwards note-ons (possibly transformed) and decides per
//! channel whether a note-off goes through now or is held back until the
//! pedal is released. Pedals are sinks themselves, so they chain:
//!
//! ```text
//! MIDI ─→ SoftPedal ─→ SostenutoPedal ─→ DamperPedal ─→ LightEngine
//! ```

mod damper;
mod soft;
mod sostenuto;

pub use damper::DamperPedal;
pub use soft::{SoftPedal, DEFAULT_SOFTEN_FACTOR};
pub use sostenuto::SostenutoPedal;

pub use crate::mapper::CHANNELS;

/// Receiver of the (possibly rewritten) note stream.
pub trait NoteSink {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8);
    fn note_off(&mut self, channel: u8, note: u8);
}

impl<S: NoteSink + ?Sized> NoteSink for &mut S {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        (**self).note_on(channel, note, velocity);
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        (**self).note_off(channel, note);
    }
}

impl<S: NoteSink + ?Sized> NoteSink for Box<S> {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        (**self).note_on(channel, note, velocity);
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        (**self).note_off(channel, note);
    }
}

/// A forwarded note message, for queue-based pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
}

impl NoteMessage {
    /// Replay this message into `sink`.
    pub fn dispatch<S: NoteSink + ?Sized>(self, sink: &mut S) {
        match self {
            NoteMessage::NoteOn {
                channel,
                note,
                velocity,
            } => sink.note_on(channel, note, velocity),
            NoteMessage::NoteOff { channel, note } => sink.note_off(channel, note),
        }
    }
}

/// Queues every message it receives.
impl NoteSink for Vec<NoteMessage> {
    fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
        self.push(NoteMessage::NoteOn { channel, note, velocity });
    }

    fn note_off(&mut self, channel: u8, note: u8) {
        self.push(NoteMessage::NoteOff { channel, note });
    }
}

/// Press/release control shared by all pedals. Channels are masked to 0-15.
pub trait Pedal {
    fn press(&mut self, channel: u8);
    fn release(&mut self, channel: u8);
    fn is_pressed(&self, channel: u8) -> bool;

    /// Press for `value >= 64`, release otherwise, as for MIDI switch controllers.
    fn set_from_controller(&mut self, channel: u8, value: u8) {
        if value >= 64 {
            self.press(channel);
        } else {
            self.release(channel);
        }
    }
}

/// Dense set over the 128 MIDI note numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoteSet(u128);

impl NoteSet {
    pub const fn new() -> Self {
        Self(0)
    }

    fn bit(note: u8) -> u128 {
        1u128 << (note & 0x7F)
    }

    pub fn insert(&mut self, note: u8) {
        self.0 |= Self::bit(note);
    }

    pub fn remove(&mut self, note: u8) -> bool {
        let present = self.contains(note);
        self.0 &= !Self::bit(note);
        present
    }

    pub fn contains(&self, note: u8) -> bool {
        self.0 & Self::bit(note) != 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Empty the set, returning its former contents.
    pub fn take(&mut self) -> NoteSet {
        std::mem::take(self)
    }

    /// Notes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        let bits = self.0;
        (0..128u8).filter(move |&note| bits & (1u128 << note) != 0)
    }
}

pub(crate) fn ch(channel: u8) -> usize {
    (channel & 0x0F) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_set_membership() {
        let mut set = NoteSet::new();
        assert!(set.is_empty());
        set.insert(0);
        set.insert(127);
        set.insert(60);
        assert!(set.contains(60));
        assert!(!set.contains(61));
        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 60, 127]);
        assert!(set.remove(60));
        assert!(!set.remove(60));
    }

    #[test]
    fn note_set_masks_out_of_range() {
        let mut set = NoteSet::new();
        set.insert(0x80 | 5);
        assert!(set.contains(5));
    }

    #[test]
    fn take_leaves_empty_set() {
        let mut set = NoteSet::new();
        set.insert(3);
        let taken = set.take();
        assert!(set.is_empty());
        assert!(taken.contains(3));
    }

    #[test]
    fn messages_replay_into_a_sink() {
        let mut queue: Vec<NoteMessage> = Vec::new();
        queue.note_on(1, 60, 100);
        queue.note_off(1, 60);

        let mut replayed: Vec<NoteMessage> = Vec::new();
        for message in queue.iter().copied() {
            message.dispatch(&mut replayed);
        }
        assert_eq!(queue, replayed);
    }
}
